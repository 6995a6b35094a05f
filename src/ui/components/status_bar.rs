//! Status bar component

use ratatui::{
    layout::Alignment,
    style::{Color, Style},
    widgets::{Block, Paragraph},
    Frame,
};

use super::super::app::{App, InputMode};
use crate::constants::{HELP_INPUT, HELP_NORMAL};

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar: sync state, the last mutation outcome, or key help
    pub fn render(f: &mut Frame, area: ratatui::layout::Rect, app: &App, pending: usize, rejected: usize) {
        let (status_text, status_color) = if app.syncing {
            ("🔄 Syncing...".to_string(), Color::Yellow)
        } else if app.input_mode != InputMode::Normal {
            (HELP_INPUT.to_string(), Color::Gray)
        } else if let Some(status) = &app.status {
            let color = if status.is_error { Color::Red } else { Color::Green };
            (status.text.clone(), color)
        } else if rejected > 0 {
            (format!("⚠️  {rejected} rejected, reverting on next sync • {HELP_NORMAL}"), Color::Yellow)
        } else if pending > 0 {
            (format!("⏳ {pending} pending • {HELP_NORMAL}"), Color::Gray)
        } else {
            (HELP_NORMAL.to_string(), Color::Gray)
        };

        let status_bar = Paragraph::new(status_text)
            .block(Block::default())
            .alignment(Alignment::Center)
            .style(Style::default().fg(status_color));

        f.render_widget(status_bar, area);
    }
}
