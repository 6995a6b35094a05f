//! Projects list component

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::super::app::{App, Pane};
use super::super::layout::{truncate, LayoutManager};
use crate::constants::EMPTY_PROJECTS;

/// Projects list component
pub struct ProjectsList;

impl ProjectsList {
    /// Render the projects list
    pub fn render(f: &mut Frame, area: ratatui::layout::Rect, app: &App) {
        let (_sidebar_width, max_name_width) = LayoutManager::sidebar_constraints(area.width);
        let border_color = if app.focus == Pane::Projects { Color::Cyan } else { Color::Gray };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title("📁 Projects")
            .title_alignment(Alignment::Center);

        if app.projects.is_empty() {
            let hint = Paragraph::new(EMPTY_PROJECTS)
                .block(block)
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(hint, area);
            return;
        }

        let project_items: Vec<ListItem> = app
            .projects
            .iter()
            .map(|project| {
                // provisional ids are negative until the server confirms
                let icon = if project.id < 0 { "⏳" } else { "📁" };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{icon} ")),
                    Span::styled(
                        truncate(&project.name, max_name_width as usize),
                        Style::default().fg(Color::White),
                    ),
                ]))
            })
            .collect();

        let projects_list = List::new(project_items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("→ ");

        f.render_stateful_widget(projects_list, area, &mut app.project_list_state.clone());
    }
}
