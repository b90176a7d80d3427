// src/main.rs — TaskSphere entry point

use clap::Parser;

use tasksphere::auth::Route;
use tasksphere::cli::{self, AppContext, Cli, Commands};
use tasksphere::infra::config::Config;
use tasksphere::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // TASKSPHERE_LOG / RUST_LOG win over --log-level
    logger::init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Falls back to defaults if no config.toml
    let mut config = if let Some(ref path) = cli.config {
        let mut config = Config::load_from(std::path::Path::new(path))?;
        config.apply_api_url_override(std::env::var("TASKSPHERE_API_URL").ok());
        config
    } else {
        Config::load()?
    };
    config.apply_api_url_override(cli.api_url);

    let command = cli.command.unwrap_or(Commands::Dashboard);
    let ctx = AppContext::from_config(config, initial_route(&command))?;

    let signs_in = matches!(
        command,
        Commands::Login { .. } | Commands::Register { .. } | Commands::Logout
    );

    let result = match command {
        Commands::Login { email } => cli::auth::run_login(&ctx, email).await,
        Commands::Register { email } => cli::auth::run_register(&ctx, email).await,
        Commands::Logout => {
            cli::auth::run_logout(&ctx);
            Ok(())
        }
        Commands::Tasks { action } => cli::tasks::run_tasks(&ctx, action).await,
        Commands::Chat { new } => cli::chat::run_chat(&ctx, new).await,
        Commands::Dashboard => tasksphere::tui::run_dashboard(&ctx).await,
        Commands::Status => cli::status::show_status(&ctx).await,
    };

    if !signs_in && ctx.sent_to_login() {
        eprintln!("Run `tasksphere login` to sign in again.");
    }
    result
}

fn initial_route(command: &Commands) -> Route {
    match command {
        Commands::Login { .. } | Commands::Logout => Route::Login,
        Commands::Register { .. } => Route::Register,
        Commands::Tasks { .. } => Route::Tasks,
        Commands::Chat { .. } => Route::Chat,
        Commands::Dashboard | Commands::Status => Route::Dashboard,
    }
}
