// src/tui/widgets/header.rs — Dashboard counters

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::types::DashboardStats;
use crate::tui::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, stats: Option<&DashboardStats>, base_url: &str) {
    let block = Block::default()
        .title(" Your Daily Focus ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let mut spans = match stats {
        Some(stats) => vec![
            Span::styled(" Completed: ", Theme::text_dim()),
            Span::styled(stats.tasks_completed.to_string(), Theme::success()),
            Span::styled("   Pending: ", Theme::text_dim()),
            Span::styled(stats.pending_tasks.to_string(), Theme::warning()),
            Span::styled("   Upcoming deadlines: ", Theme::text_dim()),
            Span::styled(stats.upcoming_deadlines.to_string(), Theme::text()),
        ],
        None => vec![Span::styled(" Stats unavailable", Theme::text_dim())],
    };
    spans.push(Span::styled(format!("   {base_url}"), Theme::text_dim()));

    let p = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(p, area);
}
