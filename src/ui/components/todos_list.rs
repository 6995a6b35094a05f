//! Todos list component

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::super::app::{App, Pane};
use crate::constants::{EMPTY_TODOS, ERROR_PROJECT_NOT_FOUND};

/// Todos list component
pub struct TodosList;

impl TodosList {
    /// Render the todos of the current project, with its description on top
    pub fn render(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
        let border_color = if app.focus == Pane::Todos { Color::Cyan } else { Color::Gray };
        let title = match app.selected_project() {
            Some(project) => format!("📝 {}", project.name),
            None => "📝 Todos".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title)
            .title_alignment(Alignment::Center);

        if app.project_missing {
            let missing = Paragraph::new(ERROR_PROJECT_NOT_FOUND)
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red));
            f.render_widget(missing, area);
            return;
        }

        let description = app.selected_project().and_then(|project| project.description.clone());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if description.is_some() { 2 } else { 0 }),
                Constraint::Min(0),
            ])
            .split(inner);

        if let Some(description) = description {
            let paragraph = Paragraph::new(description)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, chunks[0]);
        }

        if app.todos.is_empty() {
            f.render_widget(
                Paragraph::new(EMPTY_TODOS).style(Style::default().fg(Color::DarkGray)),
                chunks[1],
            );
            return;
        }

        let items: Vec<ListItem> = app
            .todos
            .iter()
            .map(|todo| {
                let (checkbox, style) = if todo.completed {
                    (
                        "[x] ",
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    ("[ ] ", Style::default().fg(Color::White))
                };
                let mut spans = vec![Span::raw(checkbox), Span::styled(todo.text.clone(), style)];
                if todo.id < 0 {
                    spans.push(Span::styled(" ⏳", Style::default().fg(Color::Yellow)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("→ ");

        f.render_stateful_widget(list, chunks[1], &mut app.todo_list_state.clone());
    }
}
