// src/cli/status.rs — Configuration, session and backend status

use crate::cli::AppContext;
use crate::infra::paths;

pub async fn show_status(ctx: &AppContext) -> anyhow::Result<()> {
    println!("tasksphere v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config_path = paths::config_file_path();
    if config_path.exists() {
        println!("  Config:     {} (loaded)", config_path.display());
    } else {
        println!("  Config:     (using defaults)");
    }
    println!("  Backend:    {}", ctx.api.base_url());
    println!(
        "  Polling:    every {}s{}",
        ctx.poll_interval().as_secs(),
        match ctx.config.sync.push_path {
            Some(ref path) => format!(", push at {path}"),
            None => String::new(),
        }
    );

    let signed_in = ctx.session().is_authenticated();
    println!(
        "  Session:    {} ({})",
        if signed_in { "signed in" } else { "signed out" },
        paths::session_file_path().display()
    );

    match ctx.api.health().await {
        Ok(health) => println!(
            "  Reachable:  yes ({}{})",
            health.status,
            if health.message.is_empty() {
                String::new()
            } else {
                format!(": {}", health.message)
            }
        ),
        Err(e) => println!("  Reachable:  no ({e})"),
    }

    if signed_in {
        match ctx.api.stats().await {
            Ok(stats) => {
                println!();
                println!("  Tasks:");
                println!("    Completed:  {}", stats.tasks_completed);
                println!("    Pending:    {}", stats.pending_tasks);
                println!("    Upcoming:   {}", stats.upcoming_deadlines);
            }
            Err(e) if e.is_unauthorized() => {
                println!();
                println!("  Session was rejected by the backend and has been cleared.");
            }
            Err(e) => tracing::warn!("Failed to load stats: {}", e),
        }
    }

    Ok(())
}
