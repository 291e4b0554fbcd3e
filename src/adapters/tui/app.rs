use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::{
    event::{AppEvent, EventHandler},
    widgets::{FilterBar, InputField},
};
use crate::application::{AppResult, TaskStore};
use crate::domain::{
    derive_page, DraftField, FormField, RowEdit, SaveOutcome, Task, TaskForm, TaskId, TaskPage,
    ViewState,
};
use chrono::{DateTime, Local, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    CreateTask,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::List => "/",
            Route::CreateTask => "/createTask",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFocus {
    Table,
    Filter,
    Editing(DraftField),
}

/// Completion of a store operation, delivered back to the UI loop.
#[derive(Debug)]
pub enum StoreEvent {
    Loaded(AppResult<usize>),
    Added(AppResult<Task>),
    Edited(TaskId, AppResult<Option<Task>>),
    Deleted(TaskId, AppResult<bool>),
}

#[derive(Debug, Clone, PartialEq)]
struct StatusMessage {
    text: String,
    is_error: bool,
}

pub struct App {
    store: Arc<TaskStore>,
    completions_tx: mpsc::UnboundedSender<StoreEvent>,
    completions_rx: mpsc::UnboundedReceiver<StoreEvent>,

    // Shell
    route: Route,
    show_help: bool,
    status: Option<StatusMessage>,

    // List view
    tasks: Vec<Task>,
    loaded_at: Option<DateTime<Utc>>,
    view: ViewState,
    page: TaskPage,
    row_edit: RowEdit,
    list_focus: ListFocus,
    table_state: TableState,
    filter_bar: FilterBar,
    saves_in_flight: usize,

    // Creation view
    form: TaskForm,
    form_focus: FormField,
}

impl App {
    pub fn new(store: Arc<TaskStore>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let view = ViewState::default();
        let page = derive_page(&[], &view);

        Self {
            store,
            completions_tx,
            completions_rx,
            route: Route::List,
            show_help: false,
            status: None,
            tasks: Vec::new(),
            loaded_at: None,
            view,
            page,
            row_edit: RowEdit::Viewing,
            list_focus: ListFocus::Table,
            table_state: TableState::default(),
            filter_bar: FilterBar::new(),
            saves_in_flight: 0,
            form: TaskForm::default(),
            form_focus: FormField::Title,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Shell mount: kicks off the initial load without waiting for it.
    pub fn mount(&mut self) {
        self.reload();
    }

    fn spawn_store_op<F, Fut>(&self, op: F)
    where
        F: FnOnce(Arc<TaskStore>) -> Fut + Send + 'static,
        Fut: Future<Output = StoreEvent> + Send + 'static,
    {
        let store = self.store.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let event = op(store).await;
            if tx.send(event).is_err() {
                tracing::warn!("UI loop is gone, dropping store completion");
            }
        });
    }

    fn reload(&mut self) {
        self.spawn_store_op(|store| async move { StoreEvent::Loaded(store.load().await) });
    }

    /// Applies every completion that has already arrived.
    pub async fn process_completions(&mut self) {
        while let Ok(event) = self.completions_rx.try_recv() {
            self.apply_completion(event).await;
        }
    }

    pub async fn apply_completion(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Loaded(Ok(count)) => self.set_info(format!("Loaded {count} tasks")),
            StoreEvent::Loaded(Err(e)) => self.set_error(format!("Failed to load tasks: {e}")),
            StoreEvent::Added(Ok(task)) => self.set_info(format!("Added task {}", task.id)),
            StoreEvent::Added(Err(e)) => self.set_error(format!("Failed to add task: {e}")),
            StoreEvent::Edited(id, result) => {
                self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
                match result {
                    Ok(Some(_)) => self.set_info(format!("Saved task {id}")),
                    Ok(None) => self.set_info(format!("Task {id} is no longer listed")),
                    Err(e) => self.set_error(format!("Failed to save task {id}: {e}")),
                }
            }
            StoreEvent::Deleted(id, Ok(_)) => self.set_info(format!("Deleted task {id}")),
            StoreEvent::Deleted(id, Err(e)) => {
                self.set_error(format!("Failed to delete task {id}: {e}"))
            }
        }

        self.tasks = self.store.snapshot().await;
        self.loaded_at = self.store.loaded_at().await;

        if let Some(id) = self.row_edit.editing_id() {
            if !self.tasks.iter().any(|task| task.id == id) {
                self.row_edit.cancel();
                self.list_focus = ListFocus::Table;
                self.set_error(format!("Task {id} was removed while being edited"));
            }
        }

        self.refresh_page();
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            is_error: false,
        });
    }

    fn set_error(&mut self, text: String) {
        tracing::warn!("{}", text);
        self.status = Some(StatusMessage {
            text,
            is_error: true,
        });
    }

    fn refresh_page(&mut self) {
        self.page = derive_page(&self.tasks, &self.view);

        let rows = self.page.rows.len();
        let selection = match self.table_state.selected() {
            _ if rows == 0 => None,
            Some(selected) if selected >= rows => Some(rows - 1),
            Some(selected) => Some(selected),
            None => Some(0),
        };
        self.table_state.select(selection);
    }

    fn selected_task(&self) -> Option<&Task> {
        self.table_state
            .selected()
            .and_then(|index| self.page.rows.get(index))
    }

    fn navigate(&mut self, route: Route) {
        tracing::debug!("Navigating to {}", route.path());
        self.route = route;
        self.form = TaskForm::default();
        self.form_focus = FormField::Title;
    }

    /// Returns `true` when the app should quit.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        if event == AppEvent::Quit {
            return true;
        }

        if event == AppEvent::Tick {
            return false;
        }

        // The last outcome stays up until the next key press
        self.status = None;

        if self.show_help {
            self.show_help = false;
            return false;
        }

        match self.route {
            Route::List => self.handle_list_event(event),
            Route::CreateTask => {
                self.handle_form_event(event);
                false
            }
        }
    }

    fn handle_list_event(&mut self, event: AppEvent) -> bool {
        match self.list_focus {
            ListFocus::Table => return self.handle_table_event(event),
            ListFocus::Filter => self.handle_filter_event(event),
            ListFocus::Editing(field) => self.handle_edit_event(field, event),
        }
        false
    }

    fn handle_table_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Character('q') => return true,
            AppEvent::Character('?') => self.show_help = true,
            AppEvent::Character('/') | AppEvent::Tab => self.focus_filter(true),
            AppEvent::Character('n') => self.navigate(Route::CreateTask),
            AppEvent::Character('r') => self.reload(),
            AppEvent::Character('s') => {
                self.view.toggle_sort_field();
                self.refresh_page();
            }
            AppEvent::Character('o') => {
                self.view.toggle_sort_order();
                self.refresh_page();
            }
            AppEvent::Character('e') | AppEvent::Enter => self.begin_edit(),
            AppEvent::Character('d') => self.delete_selected(),
            AppEvent::Character('j') | AppEvent::NextRow => self.next_row(),
            AppEvent::Character('k') | AppEvent::PreviousRow => self.previous_row(),
            AppEvent::Character('h') | AppEvent::Character('[') | AppEvent::PreviousPage => {
                self.previous_page()
            }
            AppEvent::Character('l') | AppEvent::Character(']') | AppEvent::NextPage => {
                self.next_page()
            }
            _ => {}
        }
        false
    }

    fn handle_filter_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Character(c) => {
                self.filter_bar.insert_char(c);
                self.apply_filter();
            }
            AppEvent::Backspace => {
                self.filter_bar.delete_char();
                self.apply_filter();
            }
            AppEvent::CloseModal => {
                // Esc from the filter clears it
                self.filter_bar.clear();
                self.apply_filter();
                self.focus_filter(false);
            }
            AppEvent::Enter | AppEvent::Tab | AppEvent::BackTab | AppEvent::NextRow => {
                self.focus_filter(false)
            }
            AppEvent::PreviousPage => self.previous_page(),
            AppEvent::NextPage => self.next_page(),
            _ => {}
        }
    }

    fn handle_edit_event(&mut self, field: DraftField, event: AppEvent) {
        match event {
            AppEvent::Character(c) => {
                if let Some(draft) = self.row_edit.draft_mut(field) {
                    draft.push(c);
                }
            }
            AppEvent::Backspace => {
                if let Some(draft) = self.row_edit.draft_mut(field) {
                    draft.pop();
                }
            }
            AppEvent::Tab | AppEvent::BackTab => {
                self.list_focus = ListFocus::Editing(field.toggled());
            }
            AppEvent::Enter => self.save_edit(),
            AppEvent::CloseModal => self.cancel_edit(),
            _ => {}
        }
    }

    fn handle_form_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Character(c) => self.form.push_char(self.form_focus, c),
            AppEvent::Backspace => self.form.pop_char(self.form_focus),
            AppEvent::Tab | AppEvent::BackTab | AppEvent::NextRow | AppEvent::PreviousRow => {
                self.form_focus = self.form_focus.toggled();
            }
            AppEvent::Enter => self.submit_form(),
            AppEvent::CloseModal => self.navigate(Route::List),
            _ => {}
        }
    }

    fn focus_filter(&mut self, focused: bool) {
        self.list_focus = if focused {
            ListFocus::Filter
        } else {
            ListFocus::Table
        };
        self.filter_bar.set_focused(focused);
    }

    fn apply_filter(&mut self) {
        self.view.set_filter(self.filter_bar.query());
        self.refresh_page();
    }

    fn next_row(&mut self) {
        let rows = self.page.rows.len();
        if rows == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some((current + 1) % rows));
    }

    fn previous_row(&mut self) {
        let rows = self.page.rows.len();
        if rows == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        self.table_state
            .select(Some(if current == 0 { rows - 1 } else { current - 1 }));
    }

    // Disabled buttons do nothing.
    fn previous_page(&mut self) {
        if self.page.has_previous() {
            self.view.previous_page();
            self.refresh_page();
        }
    }

    fn next_page(&mut self) {
        if self.page.has_next() {
            self.view.next_page(self.page.total_pages);
            self.refresh_page();
        }
    }

    fn begin_edit(&mut self) {
        if let Some(task) = self.selected_task() {
            self.row_edit = RowEdit::begin(task);
            self.list_focus = ListFocus::Editing(DraftField::Title);
        }
    }

    fn save_edit(&mut self) {
        self.list_focus = ListFocus::Table;

        match self.row_edit.save(&self.tasks) {
            SaveOutcome::Commit { id, title, body } => {
                self.saves_in_flight += 1;
                self.spawn_store_op(move |store| async move {
                    let result = store.edit(id, title, body).await;
                    StoreEvent::Edited(id, result)
                });
            }
            SaveOutcome::Missing(id) => {
                self.set_error(format!("Task {id} no longer exists, edit discarded"))
            }
            SaveOutcome::NotEditing => {}
        }
    }

    fn cancel_edit(&mut self) {
        self.row_edit.cancel();
        self.list_focus = ListFocus::Table;
    }

    fn delete_selected(&mut self) {
        if self.row_edit != RowEdit::Viewing {
            return;
        }
        if let Some(id) = self.selected_task().map(|task| task.id) {
            self.spawn_store_op(move |store| async move {
                let result = store.delete(id).await;
                StoreEvent::Deleted(id, result)
            });
        }
    }

    /// Navigation does not wait for the add to resolve.
    fn submit_form(&mut self) {
        if let Some(new_task) = self.form.submit() {
            self.spawn_store_op(move |store| async move {
                StoreEvent::Added(store.add(&new_task).await)
            });
            self.navigate(Route::List);
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        match self.route {
            Route::List => self.render_list(frame),
            Route::CreateTask => self.render_form(frame),
        }

        if self.show_help {
            self.render_help(frame);
        }
    }

    fn render_list(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Filter and sort controls
                Constraint::Min(0),    // Task table
                Constraint::Length(1), // Pagination
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        let control_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(30)])
            .split(main_chunks[0]);

        self.filter_bar.render(frame, control_chunks[0]);
        self.render_sort_controls(frame, control_chunks[1]);
        self.render_task_table(frame, main_chunks[1]);
        self.render_pagination(frame, main_chunks[2]);
        self.render_status_bar(frame, main_chunks[3]);
    }

    fn render_sort_controls(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Sort (s/o)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));

        let text = format!(
            "By {} {}",
            self.view.sort_field.label(),
            self.view.sort_order.arrow()
        );
        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Blue));
        frame.render_widget(paragraph, area);
    }

    fn render_task_table(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.list_focus == ListFocus::Filter {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::Green)
        };

        let block = Block::default()
            .title(format!("Task List ({})", self.page.total_matches))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        if self.page.rows.is_empty() {
            let paragraph = Paragraph::new("No items to display")
                .block(block)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let header_cells = ["Task", "Description", "Actions"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = self
            .page
            .rows
            .iter()
            .map(|task| Self::task_row(task, &self.row_edit, self.list_focus))
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Percentage(45),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn task_row(task: &Task, row_edit: &RowEdit, focus: ListFocus) -> Row<'static> {
        match row_edit {
            RowEdit::Editing {
                id,
                draft_title,
                draft_body,
            } if *id == task.id => {
                let draft_style = |field: DraftField| {
                    if focus == ListFocus::Editing(field) {
                        Style::default().fg(Color::Black).bg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::White).bg(Color::DarkGray)
                    }
                };

                Row::new(vec![
                    Cell::from(draft_title.clone()).style(draft_style(DraftField::Title)),
                    Cell::from(draft_body.replace('\n', " ")).style(draft_style(DraftField::Body)),
                    Cell::from("Enter save · Esc cancel").style(Style::default().fg(Color::Green)),
                ])
            }
            _ => Row::new(vec![
                Cell::from(task.title.clone()),
                Cell::from(task.body.replace('\n', " ")).style(Style::default().fg(Color::Gray)),
                Cell::from("e edit · d delete").style(Style::default().fg(Color::DarkGray)),
            ]),
        }
    }

    fn render_pagination(&self, frame: &mut Frame, area: Rect) {
        if self.page.total_matches == 0 {
            return;
        }

        let button_style = |enabled: bool| {
            if enabled {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        let line = Line::from(vec![
            Span::styled("◀ Previous", button_style(self.page.has_previous())),
            Span::raw(format!(
                "   Page {} of {}   ",
                self.page.current_page, self.page.total_pages
            )),
            Span::styled("Next ▶", button_style(self.page.has_next())),
        ]);

        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn key_hints(&self) -> &'static str {
        match self.list_focus {
            ListFocus::Table => "j/k: move | h/l: page | e: edit | d: delete | n: new | /: filter | s/o: sort | r: reload | q: quit | ?: help",
            ListFocus::Filter => "Type to filter | Enter: back to tasks | Esc: clear filter",
            ListFocus::Editing(_) => "Tab: switch field | Enter: save | Esc: cancel",
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();

        if self.saves_in_flight > 0 {
            spans.push(Span::styled(
                "Saving... ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
        }

        match &self.status {
            Some(status) => {
                let color = if status.is_error {
                    Color::Red
                } else {
                    Color::Green
                };
                spans.push(Span::styled(status.text.clone(), Style::default().fg(color)));
            }
            None => spans.push(Span::styled(
                self.key_hints(),
                Style::default().fg(Color::DarkGray),
            )),
        }

        spans.push(Span::styled(
            format!(" | {} matches", self.page.total_matches),
            Style::default().fg(Color::DarkGray),
        ));

        if let Some(loaded_at) = self.loaded_at {
            spans.push(Span::styled(
                format!(
                    " | loaded {}",
                    loaded_at.with_timezone(&Local).format("%H:%M:%S")
                ),
                Style::default().fg(Color::DarkGray),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_form(&self, frame: &mut Frame) {
        let area = Self::centered_rect(60, 70, frame.area());

        let block = Block::default()
            .title("Add New Task")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Back hint
                Constraint::Length(4), // Title input + error
                Constraint::Length(4), // Description input + error
                Constraint::Length(1), // Submit
                Constraint::Min(0),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new("← Esc: back to list").style(Style::default().fg(Color::Gray)),
            chunks[0],
        );

        for (field, label, area) in [
            (FormField::Title, "Task Title", chunks[1]),
            (FormField::Body, "Description", chunks[2]),
        ] {
            InputField {
                label,
                value: self.form.value(field),
                focused: self.form_focus == field,
                error: self.form.errors.get(field),
            }
            .render(frame, area);
        }

        frame.render_widget(
            Paragraph::new("[ Enter: Add Task ]")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            chunks[3],
        );
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());

        frame.render_widget(Clear, popup_area);

        let help_text = [
            "Task List Help",
            "",
            "Navigation:",
            "  j/k or ↑/↓     - Move up/down in the current page",
            "  h/l or ←/→     - Previous/next page",
            "  n              - Open the new task form",
            "",
            "Filter and sort:",
            "  /              - Focus the title filter",
            "  Esc            - Clear the filter",
            "  s              - Sort by title or description",
            "  o              - Toggle ascending/descending",
            "",
            "Task Actions:",
            "  e or Enter     - Edit the selected task in place",
            "  Tab            - Switch between title and description while editing",
            "  Enter / Esc    - Save / cancel the edit",
            "  d              - Delete the selected task",
            "  r              - Reload tasks",
            "",
            "General:",
            "  ?              - Show this help",
            "  q              - Quit",
            "  Ctrl+C         - Force quit application",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }

    #[cfg(test)]
    async fn wait_for_completion(&mut self) {
        if let Some(event) = self.completions_rx.recv().await {
            self.apply_completion(event).await;
        }
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.mount();

    let result = event_loop(&mut terminal, &mut app).await;

    // Restore the terminal even when the loop failed
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut event_handler = EventHandler::new();

    loop {
        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next_event().await?;
        if app.handle_event(event) {
            break;
        }

        app.process_completions().await;

        if event_handler.should_quit() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BODY_REQUIRED, TITLE_REQUIRED};
    use crate::ports::{MockTaskRepository, RepositoryError};
    use mockall::predicate::eq;
    use ratatui::backend::TestBackend;

    fn sample(count: u64) -> Vec<Task> {
        (1..=count)
            .map(|i| Task::new(i, format!("task {i:02}"), format!("body {i:02}")))
            .collect()
    }

    async fn mounted_app(mut repo: MockTaskRepository, count: u64) -> App {
        repo.expect_list_tasks()
            .times(1)
            .returning(move || Ok(sample(count)));
        let mut app = App::new(Arc::new(TaskStore::new(Arc::new(repo))));
        app.mount();
        app.wait_for_completion().await;
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(AppEvent::Character(c));
        }
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_mount_loads_first_page() {
        let app = mounted_app(MockTaskRepository::new(), 10).await;

        assert_eq!(app.route(), Route::List);
        assert_eq!(app.page.total_pages, 2);
        assert_eq!(app.page.rows.len(), 7);
        assert_eq!(app.table_state.selected(), Some(0));
        assert!(app.loaded_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_load_is_reported_in_status() {
        let mut repo = MockTaskRepository::new();
        repo.expect_list_tasks()
            .returning(|| Err(RepositoryError::Network("offline".into())));
        let mut app = App::new(Arc::new(TaskStore::new(Arc::new(repo))));

        app.mount();
        app.wait_for_completion().await;

        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("offline"));
        assert!(screen(&mut app).contains("No items to display"));
    }

    #[tokio::test]
    async fn test_paging_respects_disabled_buttons() {
        let mut app = mounted_app(MockTaskRepository::new(), 10).await;

        app.handle_event(AppEvent::PreviousPage);
        assert_eq!(app.page.current_page, 1);

        app.handle_event(AppEvent::NextPage);
        assert_eq!(app.page.current_page, 2);
        assert_eq!(app.page.rows.len(), 3);

        app.handle_event(AppEvent::NextPage);
        assert_eq!(app.page.current_page, 2);
        assert!(screen(&mut app).contains("Page 2 of 2"));
    }

    #[tokio::test]
    async fn test_filter_narrows_rows_and_esc_clears() {
        let mut app = mounted_app(MockTaskRepository::new(), 10).await;

        app.handle_event(AppEvent::Character('/'));
        type_text(&mut app, "TASK 1");
        assert_eq!(app.page.total_matches, 1);
        assert_eq!(app.page.rows[0].id, TaskId(10));

        app.handle_event(AppEvent::CloseModal);
        assert_eq!(app.page.total_matches, 10);
        assert_eq!(app.list_focus, ListFocus::Table);
    }

    #[tokio::test]
    async fn test_quit_key_only_quits_from_table() {
        let mut app = mounted_app(MockTaskRepository::new(), 3).await;

        app.handle_event(AppEvent::Character('/'));
        assert!(!app.handle_event(AppEvent::Character('q')));
        assert_eq!(app.view.filter, "q");

        app.handle_event(AppEvent::Enter);
        assert!(app.handle_event(AppEvent::Character('q')));
    }

    #[tokio::test]
    async fn test_sort_toggles_reorder_rows() {
        let mut app = mounted_app(MockTaskRepository::new(), 3).await;

        app.handle_event(AppEvent::Character('o'));
        let ids: Vec<u64> = app.page.rows.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(screen(&mut app).contains("By Title ↑"));

        app.handle_event(AppEvent::Character('s'));
        assert!(screen(&mut app).contains("By Description ↑"));
    }

    #[tokio::test]
    async fn test_save_edit_updates_only_that_task() {
        let mut repo = MockTaskRepository::new();
        repo.expect_update_task()
            .withf(|task: &Task| *task == Task::new(3, "task 03!", "body 03"))
            .times(1)
            .returning(|task| Ok(task.clone()));
        let mut app = mounted_app(repo, 5).await;

        app.handle_event(AppEvent::NextRow);
        app.handle_event(AppEvent::NextRow);
        app.handle_event(AppEvent::Character('e'));
        assert!(app.row_edit.is_editing(TaskId(3)));

        type_text(&mut app, "!");
        app.handle_event(AppEvent::Enter);
        assert_eq!(app.row_edit, RowEdit::Viewing);
        assert_eq!(app.saves_in_flight, 1);
        assert!(screen(&mut app).contains("Saving..."));

        app.wait_for_completion().await;

        assert_eq!(app.saves_in_flight, 0);
        let mut expected = sample(5);
        expected[2].title = "task 03!".into();
        assert_eq!(app.tasks, expected);
    }

    #[tokio::test]
    async fn test_tab_switches_draft_field() {
        let mut repo = MockTaskRepository::new();
        repo.expect_update_task()
            .withf(|task: &Task| task.title == "task 01" && task.body == "body 0")
            .times(1)
            .returning(|task| Ok(task.clone()));
        let mut app = mounted_app(repo, 2).await;

        app.handle_event(AppEvent::Enter);
        app.handle_event(AppEvent::Tab);
        app.handle_event(AppEvent::Backspace);
        app.handle_event(AppEvent::Enter);
        app.wait_for_completion().await;

        assert_eq!(app.tasks[0].body, "body 0");
    }

    #[tokio::test]
    async fn test_cancel_edit_leaves_collection() {
        let mut app = mounted_app(MockTaskRepository::new(), 5).await;

        app.handle_event(AppEvent::Character('e'));
        type_text(&mut app, "changed");
        app.handle_event(AppEvent::CloseModal);

        assert_eq!(app.row_edit, RowEdit::Viewing);
        assert_eq!(app.tasks, sample(5));
        assert_eq!(app.list_focus, ListFocus::Table);
    }

    #[tokio::test]
    async fn test_delete_removes_row_from_view() {
        let mut repo = MockTaskRepository::new();
        repo.expect_delete_task()
            .with(eq(TaskId(5)))
            .times(1)
            .returning(|_| Ok(()));
        let mut app = mounted_app(repo, 8).await;

        for _ in 0..4 {
            app.handle_event(AppEvent::NextRow);
        }
        app.handle_event(AppEvent::Character('d'));
        app.wait_for_completion().await;

        assert!(app.tasks.iter().all(|task| task.id != TaskId(5)));
        assert!(app.page.rows.iter().all(|task| task.id != TaskId(5)));
        assert_eq!(app.page.rows.len(), 7);
        assert_eq!(app.page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_save_after_task_vanished_sends_nothing() {
        let mut app = mounted_app(MockTaskRepository::new(), 3).await;

        app.handle_event(AppEvent::Character('e'));
        assert!(app.row_edit.is_editing(TaskId(1)));

        // The local snapshot no longer has the edited task.
        app.tasks.retain(|task| task.id != TaskId(1));
        app.handle_event(AppEvent::Enter);

        assert_eq!(app.row_edit, RowEdit::Viewing);
        assert_eq!(app.saves_in_flight, 0);
        assert!(app.status.clone().unwrap().text.contains("no longer exists"));
    }

    #[tokio::test]
    async fn test_reload_dropping_edited_task_cancels_edit() {
        let mut repo = MockTaskRepository::new();
        let mut calls = 0;
        repo.expect_list_tasks().times(2).returning(move || {
            calls += 1;
            let mut tasks = sample(3);
            if calls > 1 {
                tasks.retain(|task| task.id != TaskId(1));
            }
            Ok(tasks)
        });
        let mut app = App::new(Arc::new(TaskStore::new(Arc::new(repo))));
        app.mount();
        app.wait_for_completion().await;

        app.handle_event(AppEvent::Character('e'));
        app.handle_event(AppEvent::Tab);
        assert_eq!(app.list_focus, ListFocus::Editing(DraftField::Body));

        app.reload();
        app.wait_for_completion().await;

        assert_eq!(app.row_edit, RowEdit::Viewing);
        assert_eq!(app.list_focus, ListFocus::Table);
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Task 1 was removed while being edited");
    }

    #[tokio::test]
    async fn test_delete_completion_of_edited_task_cancels_edit() {
        let mut repo = MockTaskRepository::new();
        repo.expect_delete_task()
            .with(eq(TaskId(2)))
            .times(1)
            .returning(|_| Ok(()));
        let mut app = mounted_app(repo, 3).await;

        app.handle_event(AppEvent::NextRow);
        app.handle_event(AppEvent::Enter);
        assert!(app.row_edit.is_editing(TaskId(2)));

        // A delete issued before the edit started lands now.
        let removed = app.store.delete(TaskId(2)).await.unwrap();
        app.apply_completion(StoreEvent::Deleted(TaskId(2), Ok(removed)))
            .await;

        assert_eq!(app.row_edit, RowEdit::Viewing);
        assert_eq!(app.list_focus, ListFocus::Table);
        assert!(app
            .status
            .clone()
            .unwrap()
            .text
            .contains("was removed while being edited"));
        assert_eq!(app.page.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_status_clears_on_next_key() {
        let mut app = mounted_app(MockTaskRepository::new(), 3).await;
        assert!(app.status.is_some());

        app.handle_event(AppEvent::Tick);
        assert!(app.status.is_some());

        app.handle_event(AppEvent::NextRow);
        assert!(app.status.is_none());
        assert!(screen(&mut app).contains("j/k: move"));
    }

    #[tokio::test]
    async fn test_create_form_validation_blocks_submit() {
        let mut app = mounted_app(MockTaskRepository::new(), 1).await;

        app.handle_event(AppEvent::Character('n'));
        assert_eq!(app.route(), Route::CreateTask);

        type_text(&mut app, "   ");
        app.handle_event(AppEvent::Enter);

        assert_eq!(app.route(), Route::CreateTask);
        assert_eq!(app.form.errors.title, Some(TITLE_REQUIRED));
        assert_eq!(app.form.errors.body, Some(BODY_REQUIRED));
        let rendered = screen(&mut app);
        assert!(rendered.contains(TITLE_REQUIRED));
        assert!(rendered.contains(BODY_REQUIRED));

        type_text(&mut app, "x");
        assert_eq!(app.form.errors.title, None);
        assert_eq!(app.form.errors.body, Some(BODY_REQUIRED));
    }

    #[tokio::test]
    async fn test_create_form_submits_and_navigates_immediately() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task()
            .withf(|task: &crate::domain::NewTask| task.title == "New" && task.body == " b ")
            .times(1)
            .returning(|task| Ok(Task::new(101, task.title.clone(), task.body.clone())));
        let mut app = mounted_app(repo, 2).await;

        app.handle_event(AppEvent::Character('n'));
        type_text(&mut app, "New");
        app.handle_event(AppEvent::Tab);
        type_text(&mut app, " b ");
        app.handle_event(AppEvent::Enter);

        assert_eq!(app.route(), Route::List);
        assert_eq!(app.form, TaskForm::default());
        assert_eq!(app.tasks.len(), 2);

        app.wait_for_completion().await;

        assert_eq!(app.tasks.len(), 3);
        assert_eq!(app.tasks[2].id, TaskId(101));
    }

    #[tokio::test]
    async fn test_back_from_form_discards_input() {
        let mut app = mounted_app(MockTaskRepository::new(), 1).await;

        app.handle_event(AppEvent::Character('n'));
        type_text(&mut app, "draft");
        app.handle_event(AppEvent::CloseModal);

        assert_eq!(app.route(), Route::List);
        assert_eq!(app.form, TaskForm::default());
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let mut app = mounted_app(MockTaskRepository::new(), 1).await;

        app.handle_event(AppEvent::Character('?'));
        assert!(screen(&mut app).contains("Task List Help"));

        assert!(!app.handle_event(AppEvent::Character('q')));
        assert!(!app.show_help);
    }
}
