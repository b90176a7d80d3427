// src/cli/mod.rs — CLI definition (clap derive)

pub mod auth;
pub mod chat;
pub mod context;
pub mod status;
pub mod tasks;

use clap::{Parser, Subcommand};

use crate::store::TaskFilter;
pub use context::AppContext;

#[derive(Parser)]
#[command(name = "tasksphere", about = "TaskSphere tasks and assistant, in the terminal", version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Backend base URL (overrides config and TASKSPHERE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log level used when RUST_LOG / TASKSPHERE_LOG are unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Defaults to `dashboard`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// List and change tasks
    Tasks {
        #[command(subcommand)]
        action: Option<TasksAction>,
    },
    /// Talk to the assistant
    Chat {
        /// Start a new conversation instead of resuming the latest one
        #[arg(long)]
        new: bool,
    },
    /// Live task dashboard (TUI)
    Dashboard,
    /// Show configuration, session and backend status
    Status,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum TasksAction {
    /// Print the task list
    List {
        #[arg(long, value_enum)]
        filter: Option<TaskFilter>,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Mark a task completed
    Done { id: i64 },
    /// Mark a task pending again
    Undo { id: i64 },
    /// Change a task's fields
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete a task
    Rm { id: i64 },
    /// Print the list and keep it up to date until Ctrl-C
    Watch {
        #[arg(long, value_enum)]
        filter: Option<TaskFilter>,
    },
}
