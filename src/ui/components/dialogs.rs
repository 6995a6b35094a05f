//! Overlay dialogs

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use super::super::app::{App, InputMode};
use super::super::layout::LayoutManager;
use crate::constants::DIALOG_TITLE_DEBUG_LOGS;
use crate::logger::Logger;

/// Creates a styled main dialog block
fn create_dialog_block<'a>(title: &'a str, theme_color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_style(Style::default().fg(theme_color).add_modifier(Modifier::BOLD))
        .style(Style::default().fg(theme_color))
}

/// Single-line text input for adds and edits
pub struct InputDialog;

impl InputDialog {
    pub fn title(mode: InputMode) -> &'static str {
        match mode {
            InputMode::Normal => "",
            InputMode::AddProject => " New project ",
            InputMode::AddTodo => " New todo ",
            InputMode::RenameProject(_) => " Rename project ",
            InputMode::EditDescription(_) => " Project description (empty clears) ",
            InputMode::EditTodo(_) => " Edit todo ",
        }
    }

    pub fn render(f: &mut Frame, app: &App) {
        if app.input_mode == InputMode::Normal {
            return;
        }

        let area = LayoutManager::centered_rect_lines(60, 3, f.area());
        f.render_widget(Clear, area);

        let cursor_char = "█";
        let input = Paragraph::new(format!("{}{}", app.input, cursor_char))
            .block(create_dialog_block(Self::title(app.input_mode), Color::Cyan))
            .style(Style::default().fg(Color::White));
        f.render_widget(input, area);
    }
}

/// Recent log lines, newest first
pub struct LogsDialog;

impl LogsDialog {
    pub fn render(f: &mut Frame, logger: &Logger) {
        let area = LayoutManager::centered_rect_lines(80, f.area().height.saturating_sub(4), f.area());
        f.render_widget(Clear, area);

        let logs = logger.get_logs();
        let items: Vec<ListItem> = if logs.is_empty() {
            vec![ListItem::new(Line::from("No log entries"))]
        } else {
            logs.into_iter().map(|line| ListItem::new(Line::from(line))).collect()
        };

        let list = List::new(items)
            .block(create_dialog_block(DIALOG_TITLE_DEBUG_LOGS, Color::Yellow).title_alignment(Alignment::Center))
            .style(Style::default().fg(Color::Gray));
        f.render_widget(list, area);
    }
}
