use ratatui::{
    layout::Position,
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Single-line title filter shown above the task table.
pub struct FilterBar {
    query: String,
    is_focused: bool,
}

impl FilterBar {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            is_focused: false,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn insert_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn delete_char(&mut self) {
        self.query.pop();
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.is_focused {
            "Filter by title (focused)"
        } else {
            "Filter by title (press / to focus)"
        };

        let border_style = if self.is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let filter_text = if self.query.is_empty() {
            if self.is_focused {
                "Type to filter tasks..."
            } else {
                "Filter by title..."
            }
        } else {
            self.query.as_str()
        };

        let text_style = if self.query.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let paragraph = Paragraph::new(filter_text).block(block).style(text_style);

        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.query.chars().count() as u16;
            let cursor_y = area.y + 1;

            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(Position {
                    x: cursor_x,
                    y: cursor_y,
                });
            }
        }
    }
}
