// src/tui/app.rs — Dashboard state, event loop, and rendering.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, TableState, Tabs},
    Frame, Terminal,
};

use crate::api::types::TaskDraft;
use crate::cli::AppContext;
use crate::infra::logger;
use crate::store::TaskFilter;
use crate::views::DashboardView;

use super::theme::Theme;
use super::widgets;

/// What a key press asks the loop to do next.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Refresh,
    Toggle(i64),
    Delete(i64),
    Create(String),
}

enum Mode {
    Browse,
    /// Typing the title of a new task.
    Adding(String),
}

struct App {
    dashboard: DashboardView,
    table_state: TableState,
    mode: Mode,
    notice: Option<String>,
    base_url: String,
}

impl App {
    fn new(dashboard: DashboardView, base_url: String) -> Self {
        let mut app = Self {
            dashboard,
            table_state: TableState::default(),
            mode: Mode::Browse,
            notice: None,
            base_url,
        };
        app.clamp_selection();
        app
    }

    fn visible_len(&self) -> usize {
        self.dashboard.tasks().visible().len()
    }

    fn selected_id(&self) -> Option<i64> {
        let i = self.table_state.selected()?;
        self.dashboard.tasks().visible().get(i).map(|t| t.id)
    }

    /// Keep the selection on a real row after the list changes.
    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            let i = self.table_state.selected().unwrap_or(0).min(len - 1);
            self.table_state.select(Some(i));
        }
    }

    fn scroll_down(&mut self) {
        let i = self.table_state.selected().unwrap_or(0);
        let max = self.visible_len().saturating_sub(1);
        self.table_state.select(Some((i + 1).min(max)));
    }

    fn scroll_up(&mut self) {
        let i = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(i.saturating_sub(1)));
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if let Mode::Adding(ref mut title) = self.mode {
            match key.code {
                KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Enter => {
                    let title = std::mem::take(title);
                    self.mode = Mode::Browse;
                    return Action::Create(title);
                }
                KeyCode::Backspace => {
                    title.pop();
                }
                KeyCode::Char(c) => title.push(c),
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => {
                let filter = self.dashboard.tasks_mut().cycle_filter();
                self.notice = Some(format!("Showing {filter} tasks"));
                self.clamp_selection();
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Char('a') => self.mode = Mode::Adding(String::new()),
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    return Action::Toggle(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    return Action::Delete(id);
                }
            }
            KeyCode::Char('r') => return Action::Refresh,
            _ => {}
        }
        Action::None
    }

    async fn perform(&mut self, action: Action) {
        let tasks = self.dashboard.tasks_mut();
        let outcome = match action {
            Action::None | Action::Quit => return,
            Action::Refresh => tasks.refresh().await.map(|_| "Refreshed".to_string()),
            Action::Toggle(id) => tasks
                .toggle(id)
                .await
                .map(|t| format!("#{} is now {}", t.id, t.status_label().to_lowercase())),
            Action::Delete(id) => tasks.delete(id).await.map(|_| format!("Deleted #{id}")),
            Action::Create(title) => match tasks.create(TaskDraft::new(title)).await {
                Ok(Some(t)) => Ok(format!("Added #{}", t.id)),
                Ok(None) => Ok("Title was empty; nothing added".to_string()),
                Err(e) => Err(e),
            },
        };

        self.notice = Some(match outcome {
            Ok(message) => message,
            Err(e) => self
                .dashboard
                .tasks_mut()
                .take_alert()
                .or_else(|| self.dashboard.tasks().error().map(str::to_string))
                .unwrap_or_else(|| e.to_string()),
        });
        self.dashboard.refresh_stats().await;
        self.clamp_selection();
    }
}

/// Launch the dashboard. Returns when the user quits or the session ends.
pub async fn run_dashboard(ctx: &AppContext) -> anyhow::Result<()> {
    let mut dashboard = ctx.dashboard_view();
    if !dashboard.mount().await {
        anyhow::bail!("Not signed in");
    }
    dashboard.tasks_mut().start_polling();
    let _push = ctx.push_listener();

    let mut app = App::new(dashboard, ctx.api.base_url().to_string());

    logger::mute();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, &mut app, ctx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    logger::unmute();

    app.dashboard.tasks_mut().stop_polling();
    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ctx: &AppContext,
) -> anyhow::Result<()> {
    loop {
        if app.dashboard.tasks_mut().try_apply_updates() > 0 {
            app.dashboard.refresh_stats().await;
            app.clamp_selection();
        }

        if !ctx.session().is_authenticated() {
            anyhow::bail!("Session expired");
        }

        terminal.draw(|f| render(f, app))?;

        // Short poll so background refreshes show up promptly.
        let ready = tokio::task::block_in_place(|| event::poll(Duration::from_millis(250)))?;
        if !ready {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            match app.handle_key(key) {
                Action::Quit => return Ok(()),
                action => app.perform(action).await,
            }
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────

fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter tabs
            Constraint::Length(3), // Counters
            Constraint::Min(6),    // Task table
            Constraint::Length(3), // Input / notice
            Constraint::Length(1), // Key hints
        ])
        .split(f.area());

    render_filter_tabs(f, chunks[0], app.dashboard.tasks().filter());
    widgets::header::render(f, chunks[1], app.dashboard.stats(), &app.base_url);

    let visible = app.dashboard.tasks().visible();
    let filter = app.dashboard.tasks().filter();
    widgets::tasks::render(f, chunks[2], &visible, filter, &mut app.table_state);

    render_status(f, chunks[3], app);
    render_footer(f, chunks[4]);
}

fn render_filter_tabs(f: &mut Frame, area: Rect, active: TaskFilter) {
    let titles: Vec<Line> = TaskFilter::ALL
        .iter()
        .map(|filter| {
            let label = format!(" {} ", filter.label());
            if *filter == active {
                Line::from(Span::styled(label, Theme::tab_active()))
            } else {
                Line::from(Span::styled(label, Theme::tab_inactive()))
            }
        })
        .collect();

    let selected = TaskFilter::ALL
        .iter()
        .position(|f| *f == active)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(Span::styled(" TaskSphere ", Theme::header()))
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        )
        .select(selected)
        .highlight_style(Theme::tab_active())
        .divider(Span::styled(" | ", Theme::text_dim()));

    f.render_widget(tabs, area);
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let (title, text, border) = match app.mode {
        Mode::Adding(ref title) => (
            " New task (Enter to add, Esc to cancel) ",
            Span::styled(format!("{title}_"), Theme::text()),
            Theme::border_focus(),
        ),
        Mode::Browse => {
            let text = match (app.dashboard.tasks().error(), app.notice.as_deref()) {
                (Some(err), _) => Span::styled(err.to_string(), Theme::error()),
                (None, Some(notice)) => Span::styled(notice.to_string(), Theme::text()),
                (None, None) => Span::styled("", Theme::text_dim()),
            };
            (" Status ", text, Theme::border())
        }
    };

    let p = Paragraph::new(Line::from(text)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border),
    );
    f.render_widget(p, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" q", Theme::key_hint()),
        Span::styled(" quit  ", Theme::key_desc()),
        Span::styled("Tab", Theme::key_hint()),
        Span::styled(" filter  ", Theme::key_desc()),
        Span::styled("j/k", Theme::key_hint()),
        Span::styled(" move  ", Theme::key_desc()),
        Span::styled("space", Theme::key_hint()),
        Span::styled(" toggle  ", Theme::key_desc()),
        Span::styled("a", Theme::key_hint()),
        Span::styled(" add  ", Theme::key_desc()),
        Span::styled("d", Theme::key_hint()),
        Span::styled(" delete  ", Theme::key_desc()),
        Span::styled("r", Theme::key_hint()),
        Span::styled(" refresh", Theme::key_desc()),
    ]);

    f.render_widget(Paragraph::new(hints), area);
}
