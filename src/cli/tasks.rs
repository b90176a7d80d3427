// src/cli/tasks.rs — `tasksphere tasks ...`

use anyhow::{anyhow, bail};

use crate::api::types::{Task, TaskDraft, TaskEdit};
use crate::cli::{AppContext, TasksAction};
use crate::infra::errors::ApiError;
use crate::views::TasksView;

pub async fn run_tasks(ctx: &AppContext, action: Option<TasksAction>) -> anyhow::Result<()> {
    let mut view = ctx.tasks_view();
    if let Err(e) = view.load().await {
        return Err(anyhow!(
            "{}",
            view.error().map(str::to_string).unwrap_or_else(|| e.to_string())
        ));
    }

    match action.unwrap_or(TasksAction::List { filter: None }) {
        TasksAction::List { filter } => {
            if let Some(filter) = filter {
                view.set_filter(filter);
            }
            print_tasks(&view);
        }
        TasksAction::Add {
            title,
            description,
            category,
        } => {
            let draft = TaskDraft::new(title)
                .with_description(description.unwrap_or_default())
                .with_category(category.unwrap_or_default());
            match view.create(draft).await {
                Ok(Some(task)) => println!("  Added #{}: {}", task.id, task.title),
                Ok(None) => bail!("Task title cannot be empty"),
                Err(e) => return Err(failure(&mut view, e)),
            }
        }
        TasksAction::Done { id } => set_status(&mut view, id, true).await?,
        TasksAction::Undo { id } => set_status(&mut view, id, false).await?,
        TasksAction::Edit {
            id,
            title,
            description,
            category,
        } => {
            let edit = TaskEdit {
                title,
                description,
                status: None,
                category,
            };
            if edit.is_empty() {
                bail!("Nothing to change (use --title, --description or --category)");
            }
            match view.update(id, &edit).await {
                Ok(task) => println!("  Updated #{}: {}", task.id, task.title),
                Err(e) => return Err(failure(&mut view, e)),
            }
        }
        TasksAction::Rm { id } => match view.delete(id).await {
            Ok(()) => println!("  Deleted #{id}"),
            Err(e) => return Err(failure(&mut view, e)),
        },
        TasksAction::Watch { filter } => {
            if let Some(filter) = filter {
                view.set_filter(filter);
            }
            watch(ctx, &mut view).await?;
        }
    }
    Ok(())
}

async fn set_status(view: &mut TasksView, id: i64, done: bool) -> anyhow::Result<()> {
    let Some(task) = view.tasks().get(id) else {
        bail!("No task with id {id}");
    };
    if task.status == done {
        println!("  #{} is already {}", id, task.status_label().to_lowercase());
        return Ok(());
    }
    match view.toggle(id).await {
        Ok(task) => {
            println!("  #{} {} ({})", task.id, task.title, task.status_label());
            Ok(())
        }
        Err(e) => Err(failure(view, e)),
    }
}

/// Print the list, then reprint it whenever a refresh lands.
async fn watch(ctx: &AppContext, view: &mut TasksView) -> anyhow::Result<()> {
    print_tasks(view);
    view.start_polling();
    let _push = ctx.push_listener();
    println!(
        "\n  Watching (every {}s). Ctrl-C to stop.",
        ctx.poll_interval().as_secs()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = view.next_update() => match update {
                Some(Ok(())) => {
                    println!("\n  -- {} --", chrono::Local::now().format("%H:%M:%S"));
                    print_tasks(view);
                }
                Some(Err(e)) if e.is_unauthorized() || matches!(e, ApiError::NotAuthenticated) => {
                    bail!("Session expired");
                }
                Some(Err(_)) => {}
                None => break,
            },
        }
    }

    view.stop_polling();
    Ok(())
}

fn failure(view: &mut TasksView, e: ApiError) -> anyhow::Error {
    if e.is_unauthorized() {
        return anyhow!("Session expired");
    }
    match view.take_alert() {
        Some(alert) => anyhow!(alert),
        None => anyhow!(e),
    }
}

pub fn print_tasks(view: &TasksView) {
    let visible = view.visible();
    if visible.is_empty() {
        if view.tasks().is_empty() {
            println!("  No tasks yet.");
        } else {
            println!("  No {} tasks.", view.filter());
        }
        return;
    }

    for task in &visible {
        println!("{}", format_task(task));
    }
    println!();
    println!(
        "  {} shown ({}), {} of {} completed",
        visible.len(),
        view.filter(),
        view.tasks().completed_count(),
        view.tasks().len()
    );
}

pub fn format_task(task: &Task) -> String {
    let mark = if task.status { "x" } else { " " };
    let mut line = format!("  [{mark}] #{:<4} {}", task.id, task.title);
    if let Some(ref category) = task.category {
        line.push_str(&format!("  ({category})"));
    }
    if let Some(ref description) = task.description {
        if !description.is_empty() {
            line.push_str(&format!("\n            {description}"));
        }
    }
    line
}
