//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task store, the
//! local storage handle and the header clock, maps key presses to store
//! operations, and renders the task table.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::warn;

use crate::{
    clock::{format_clock, Clock},
    config::Config,
    error::StorageError,
    export::write_export,
    fields::{Field, TaskType},
    storage::{load_tasks_csv, save_tasks, LocalStorage},
    store::TaskStore,
    task::Task,
    tui::{
        colors::{DARK_PURPLE, DARK_RED, GOLD, SLATE},
        enums::AppState,
        input::InputField,
        utils::centered_rect,
    },
};

/// Action keys shown under the header.
const ACTION_HINTS: &str =
    "a add  d delete  Enter edit  f finish  o sort  s save  i import  w download  x clear  h help  q quit";

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    store: TaskStore,
    storage: LocalStorage,
    export_path: PathBuf,
    table_state: TableState,
    column: Field,
    editor: InputField,
    status_message: String,
    clock: Clock,
    clock_display: String,
}

impl App {
    /// Create the app with an empty task list. Saved tasks are only loaded on import.
    pub fn new(config: &Config) -> Result<Self, StorageError> {
        let storage = LocalStorage::open(&config.storage_path)?;
        Ok(App {
            state: AppState::Table,
            store: TaskStore::new(),
            storage,
            export_path: config.export_path.clone(),
            table_state: TableState::default(),
            column: Field::Content,
            editor: InputField::new(),
            status_message: String::new(),
            clock: Clock::start(config.clock_interval),
            clock_display: format_clock(chrono::Local::now()),
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn selected_task(&self) -> Option<&Task> {
        self.table_state
            .selected()
            .and_then(|i| self.store.tasks().get(i))
    }

    fn selected_id(&self) -> Option<u64> {
        self.selected_task().map(|t| t.id)
    }

    /// Select the row holding `id`, if it is still present.
    fn select_id(&mut self, id: u64) {
        let pos = self.store.tasks().iter().position(|t| t.id == id);
        self.table_state.select(pos);
    }

    /// Keep the selection inside the table after rows disappear.
    fn clamp_selection(&mut self) {
        let len = self.store.len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    /// Pull the latest clock reading into the header.
    pub fn tick(&mut self) {
        if let Some(now) = self.clock.latest() {
            self.clock_display = format_clock(now);
        }
    }

    fn add_task(&mut self) {
        match self.store.add() {
            Ok(id) => {
                self.select_id(id);
                self.set_status_message(format!("Added task {}", id));
            }
            Err(e) => {
                warn!("add failed: {e}");
                self.set_status_message(format!("Add failed: {e}"));
            }
        }
    }

    fn mark_finish(&mut self) {
        match self.store.mark_finish() {
            Ok(id) => {
                self.select_id(id);
                self.set_status_message(format!("Finish time stamped as task {}", id));
            }
            Err(e) => {
                warn!("finish stamp failed: {e}");
                self.set_status_message(format!("Finish stamp failed: {e}"));
            }
        }
    }

    fn delete_selected_task(&mut self) {
        let Some(id) = self.selected_id() else {
            self.set_status_message("No task selected");
            return;
        };
        self.store.delete(id);
        self.clamp_selection();
        self.set_status_message(format!("Deleted task {}", id));
    }

    fn sort_tasks(&mut self) {
        let selected = self.selected_id();
        self.store.sort();
        if let Some(id) = selected {
            self.select_id(id);
        }
        self.set_status_message("Sorted by date");
    }

    fn clear_tasks(&mut self) {
        self.store.clear();
        self.table_state.select(None);
        self.set_status_message("Cleared all tasks");
    }

    fn save_tasks(&mut self) {
        match save_tasks(&mut self.storage, &self.store) {
            Ok(()) => self.set_status_message(format!("Saved {} task(s)", self.store.len())),
            Err(e) => {
                warn!("save failed: {e}");
                self.set_status_message(format!("Save failed: {e}"));
            }
        }
    }

    fn import_tasks(&mut self) {
        let Some(csv) = load_tasks_csv(&self.storage).map(str::to_string) else {
            self.set_status_message("Nothing saved yet");
            return;
        };
        match self.store.import_from(&csv) {
            Ok(count) => {
                self.table_state.select(None);
                self.clamp_selection();
                self.set_status_message(format!("Imported {} task(s)", count));
            }
            Err(e) => {
                warn!("import failed: {e}");
                self.set_status_message(format!("Import failed: {e}"));
            }
        }
    }

    fn export_tasks(&mut self) {
        match write_export(&self.export_path, self.store.tasks()) {
            Ok(count) => self.set_status_message(format!(
                "Downloaded {} task(s) to {}",
                count,
                self.export_path.display()
            )),
            Err(e) => {
                warn!("export failed: {e}");
                self.set_status_message(format!("Download failed: {e}"));
            }
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) if down => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    /// Open the selected cell for editing, or cycle the type selector.
    fn activate_cell(&mut self, forward: bool) {
        let Some(task) = self.selected_task() else {
            self.set_status_message("No task selected");
            return;
        };
        let (id, kind) = (task.id, task.kind);
        match self.column {
            Field::Type => {
                let next = if forward { kind.next() } else { kind.prev() };
                self.apply_edit(id, Field::Type, next.as_str());
            }
            Field::Date => {
                self.editor = InputField::with_value(&task.date);
                self.state = AppState::Editing;
            }
            Field::Content => {
                self.editor = InputField::with_value(&task.content);
                self.state = AppState::Editing;
            }
        }
    }

    fn apply_edit(&mut self, id: u64, field: Field, value: &str) {
        match self.store.edit_field(id, field, value) {
            Ok(true) => self.set_status_message(format!("Updated {} of task {}", field.name(), id)),
            Ok(false) if value.is_empty() => {
                self.set_status_message(format!("Empty {} ignored", field.name()))
            }
            Ok(false) => {}
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    /// Commit the editor into the selected record, as when the cell loses focus.
    fn commit_edit(&mut self) {
        let value = self.editor.finish();
        self.state = AppState::Table;
        if let Some(id) = self.selected_id() {
            self.apply_edit(id, self.column, &value);
        }
    }

    fn cancel_edit(&mut self) {
        self.editor.finish();
        self.state = AppState::Table;
        self.set_status_message("Edit cancelled");
    }

    fn handle_table_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Left => self.column = self.column.left(),
            KeyCode::Right => self.column = self.column.right(),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('+') => self.activate_cell(true),
            KeyCode::Char('-') if self.column == Field::Type => self.activate_cell(false),
            KeyCode::Char('a') => self.add_task(),
            KeyCode::Char('f') => self.mark_finish(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected_task(),
            KeyCode::Char('o') => self.sort_tasks(),
            KeyCode::Char('s') => self.save_tasks(),
            KeyCode::Char('i') => self.import_tasks(),
            KeyCode::Char('w') => self.export_tasks(),
            KeyCode::Char('x') => self.state = AppState::ConfirmClear,
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_edit_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Tab => {
                self.commit_edit();
                self.column = self.column.right();
            }
            KeyCode::BackTab => {
                self.commit_edit();
                self.column = self.column.left();
            }
            KeyCode::Up => {
                self.commit_edit();
                self.move_selection(false);
            }
            KeyCode::Down => {
                self.commit_edit();
                self.move_selection(true);
            }
            KeyCode::Left => self.editor.move_cursor_left(),
            KeyCode::Right => self.editor.move_cursor_right(),
            KeyCode::Home => self.editor.move_cursor_home(),
            KeyCode::End => self.editor.move_cursor_end(),
            KeyCode::Backspace => self.editor.handle_backspace(),
            KeyCode::Delete => self.editor.handle_delete(),
            KeyCode::Char(c) => self.editor.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.clear_tasks();
                self.state = AppState::Table;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::Table;
            }
            _ => {}
        }
    }

    /// Dispatch one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.state != AppState::Editing {
            self.status_message.clear();
        }
        match self.state {
            AppState::Table => return self.handle_table_input(key),
            AppState::Editing => self.handle_edit_input(key),
            AppState::Help => self.state = AppState::Table,
            AppState::ConfirmClear => self.handle_confirm_input(key),
        }
        false
    }

    /// Poll for and handle keyboard events.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key.code, key.modifiers));
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header_text = vec![
            Line::from(vec![
                Span::styled("TASK LOG", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(
                    format!("Now: {}", self.clock_display),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
                ),
            ]),
            Line::from(Span::styled(ACTION_HINTS, Style::default().fg(Color::Gray))),
        ];

        let header = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_task_table(&mut self, f: &mut Frame, area: Rect) {
        let header_cells = ["ID", "Date", "Type", "Content"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(SLATE).fg(Color::White))
            .height(1);

        let selected = self.table_state.selected();
        let editing = self.state == AppState::Editing;
        let rows: Vec<Row> = self
            .store
            .tasks()
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let is_selected = selected == Some(i);
                let cell = |field: Field, text: String| {
                    let mut style = Style::default();
                    if is_selected && field == self.column {
                        style = if editing {
                            Style::default().bg(GOLD).fg(Color::Black)
                        } else {
                            Style::default().add_modifier(Modifier::REVERSED)
                        };
                    }
                    Cell::from(text).style(style)
                };
                let editor_or = |field: Field, text: &str| {
                    if editing && is_selected && field == self.column {
                        self.editor.display_with_cursor()
                    } else {
                        text.replace('\n', " ")
                    }
                };

                let row_style = match task.kind {
                    TaskType::Finish => Style::default().fg(Color::White).bg(DARK_PURPLE),
                    _ => Style::default().fg(Color::White),
                };
                Row::new(vec![
                    Cell::from(task.id.to_string()),
                    cell(Field::Date, editor_or(Field::Date, &task.date)),
                    cell(Field::Type, task.kind.as_str().to_string()),
                    cell(Field::Content, editor_or(Field::Content, &task.content)),
                ])
                .style(row_style)
            })
            .collect();

        let widths = [
            Constraint::Length(5),  // ID
            Constraint::Length(21), // Date
            Constraint::Length(13), // Type
            Constraint::Min(20),    // Content
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}) - Press 'h' for help",
                self.store.len()
            )))
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Task Log Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Table:", bold)),
            Line::from("  ↑/↓, k/j     Select row"),
            Line::from("  ←/→          Select column (date, type, content)"),
            Line::from("  Enter        Edit date/content, next type"),
            Line::from("  +/-          Next/previous type"),
            Line::from("  a            Add task stamped with the current time"),
            Line::from("  f            Stamp finish time"),
            Line::from("  d/Del        Delete selected task"),
            Line::from("  o            Sort by date"),
            Line::from("  s            Save to local storage"),
            Line::from("  i            Import from local storage"),
            Line::from("  w            Download CSV to the export file"),
            Line::from("  x            Clear all tasks"),
            Line::from("  q/Esc/Ctrl+C Quit"),
            Line::from(""),
            Line::from(Span::styled("Editing:", bold)),
            Line::from("  Enter/Tab/↑/↓  Commit (empty values are ignored)"),
            Line::from("  Esc            Cancel"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Clear all {} task(s)?", self.store.len()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("Unsaved tasks will be lost."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::Table => format!(
                    "Tasks: {} | Column: {} | Press 'h' for help",
                    self.store.len(),
                    self.column.name()
                ),
                AppState::Editing => {
                    format!("Editing {} (Enter to commit, Esc to cancel)", self.column.name())
                }
                AppState::Help => "Help".to_string(),
                AppState::ConfirmClear => "Confirm Action".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(SLATE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Draw the whole screen for the current state.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // header
                Constraint::Min(0),    // table
                Constraint::Length(1), // status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.state {
            AppState::Table | AppState::Editing => self.render_task_table(f, chunks[1]),
            AppState::Help => self.render_help(f, chunks[1]),
            AppState::ConfirmClear => {
                self.render_task_table(f, chunks[1]);
                self.render_confirm(f, chunks[1]);
            }
        }
        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.tick();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
