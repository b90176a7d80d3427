// src/tui/widgets/tasks.rs — Task table

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::types::Task;
use crate::store::TaskFilter;
use crate::tui::theme::Theme;

pub fn render(
    f: &mut Frame,
    area: Rect,
    tasks: &[&Task],
    filter: TaskFilter,
    state: &mut TableState,
) {
    let block = Block::default()
        .title(format!(" Tasks: {} ({}) ", filter, tasks.len()))
        .borders(Borders::ALL)
        .border_style(Theme::border());

    if tasks.is_empty() {
        let text = match filter {
            TaskFilter::All => "  Peaceful space. No tasks yet. Press a to add one.",
            TaskFilter::Completed => "  Nothing completed yet.",
            TaskFilter::Pending => "  Nothing pending.",
        };
        let p = Paragraph::new(Line::from(Span::styled(text, Theme::text_dim()))).block(block);
        f.render_widget(p, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("").style(Theme::table_header()),
        Cell::from("ID").style(Theme::table_header()),
        Cell::from("Title").style(Theme::table_header()),
        Cell::from("Category").style(Theme::table_header()),
        Cell::from("Updated").style(Theme::table_header()),
    ]);

    let rows: Vec<Row> = tasks
        .iter()
        .map(|t| {
            let title_style = if t.status { Theme::done() } else { Theme::text() };
            Row::new(vec![
                Cell::from(if t.status { "[x]" } else { "[ ]" }).style(Theme::status(t.status)),
                Cell::from(t.id.to_string()).style(Theme::text_dim()),
                Cell::from(truncate(&t.title, 60)).style(title_style),
                Cell::from(t.category.clone().unwrap_or_default()).style(Theme::text_dim()),
                Cell::from(
                    t.updated_at
                        .or(t.created_at)
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".into()),
                )
                .style(Theme::text_dim()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Theme::table_selected())
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, state);
}

/// Shorten to at most `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
