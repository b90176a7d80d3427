// src/tui/theme.rs — Colors and styles for the dashboard

use ratatui::style::{Color, Modifier, Style};

/// Emerald palette.
pub struct Theme;

impl Theme {
    pub const EMERALD: Color = Color::Rgb(16, 185, 129);
    pub const EMERALD_LIGHT: Color = Color::Rgb(167, 243, 208);
    pub const EMERALD_DARK: Color = Color::Rgb(6, 78, 59);
    pub const TEXT: Color = Color::Rgb(236, 253, 245);
    pub const GRAY: Color = Color::Rgb(110, 140, 130);
    pub const DIM: Color = Color::Rgb(60, 90, 80);
    pub const RED: Color = Color::Rgb(248, 113, 113);
    pub const AMBER: Color = Color::Rgb(251, 191, 36);

    pub fn tab_active() -> Style {
        Style::default()
            .fg(Theme::EMERALD)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive() -> Style {
        Style::default().fg(Theme::GRAY)
    }

    pub fn header() -> Style {
        Style::default()
            .fg(Theme::EMERALD_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Theme::DIM)
    }

    /// Border of the box that currently takes keyboard input.
    pub fn border_focus() -> Style {
        Style::default().fg(Theme::EMERALD)
    }

    pub fn text() -> Style {
        Style::default().fg(Theme::TEXT)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Theme::GRAY)
    }

    pub fn success() -> Style {
        Style::default().fg(Theme::EMERALD)
    }

    pub fn warning() -> Style {
        Style::default().fg(Theme::AMBER)
    }

    pub fn error() -> Style {
        Style::default().fg(Theme::RED)
    }

    /// Title of a completed task.
    pub fn done() -> Style {
        Style::default()
            .fg(Theme::GRAY)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::EMERALD)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn table_selected() -> Style {
        Style::default().bg(Theme::EMERALD_DARK).fg(Theme::TEXT)
    }

    pub fn key_hint() -> Style {
        Style::default().fg(Theme::EMERALD)
    }

    pub fn key_desc() -> Style {
        Style::default().fg(Theme::GRAY)
    }

    /// Completion flag of a task.
    pub fn status(done: bool) -> Style {
        if done {
            Self::success()
        } else {
            Self::warning()
        }
    }
}
