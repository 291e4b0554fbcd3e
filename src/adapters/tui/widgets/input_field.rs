use ratatui::{
    layout::Position,
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// A labelled text input with an inline validation message underneath.
/// Needs four rows: three for the bordered input, one for the error.
pub struct InputField<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub focused: bool,
    pub error: Option<&'a str>,
}

impl InputField<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1)])
            .split(area);

        let border_style = match (self.error, self.focused) {
            (Some(_), _) => Style::default().fg(Color::Red),
            (None, true) => Style::default().fg(Color::Yellow),
            (None, false) => Style::default().fg(Color::Gray),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        let paragraph = if self.value.is_empty() {
            Paragraph::new(self.label).style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(self.value)
        };
        frame.render_widget(paragraph.block(block), chunks[0]);

        if self.focused {
            let cursor_x = chunks[0].x + 1 + self.value.chars().count() as u16;
            if cursor_x < chunks[0].x + chunks[0].width.saturating_sub(1) {
                frame.set_cursor_position(Position {
                    x: cursor_x,
                    y: chunks[0].y + 1,
                });
            }
        }

        if let Some(error) = self.error {
            let message = Paragraph::new(error).style(Style::default().fg(Color::Red));
            frame.render_widget(message, chunks[1]);
        }
    }
}
