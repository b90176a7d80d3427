// src/cli/chat.rs — Interactive assistant REPL

use anyhow::bail;

use crate::api::types::{ChatMessage, Sender};
use crate::cli::AppContext;
use crate::views::chat::{ChatError, ChatInit, ChatView, QUICK_ACTIONS};

/// Run the chat REPL until EOF or `/quit`.
pub async fn run_chat(ctx: &AppContext, new: bool) -> anyhow::Result<()> {
    let view = ctx.chat_view();
    let (mount, lifetime) = crate::views::mount();

    let init = tokio::select! {
        init = view.init(&lifetime) => init,
        _ = tokio::signal::ctrl_c() => {
            mount.unmount();
            ChatInit::Cancelled
        }
    };

    match init {
        ChatInit::Unauthenticated => bail!("Not signed in"),
        ChatInit::Cancelled => return Ok(()),
        ChatInit::Resumed { .. } if !new => print_transcript(&view.messages()),
        _ => {}
    }

    if new {
        match view.open_new_conversation().await {
            Ok(id) => tracing::debug!("Started conversation {}", id),
            Err(ChatError::Unauthorized) => bail!("Session expired"),
            Err(e) => {
                // The first send will create one instead.
                tracing::warn!("Could not start a new conversation: {}", e);
                view.new_conversation()?;
            }
        }
    }

    eprintln!(
        "tasksphere v{} | {} | /help for commands\n",
        env!("CARGO_PKG_VERSION"),
        describe_conversation(view.conversation_id()),
    );

    while let Some(input) = read_input("> ") {
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        if trimmed.starts_with('/') {
            match handle_slash_command(trimmed, &view) {
                SlashOutcome::Handled => continue,
                SlashOutcome::Send(prompt) => {
                    if !send(&view, &prompt).await? {
                        break;
                    }
                }
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        if !send(&view, trimmed).await? {
            break;
        }
    }

    Ok(())
}

/// Returns false when the chat has to end.
async fn send(view: &ChatView, message: &str) -> anyhow::Result<bool> {
    match view.send(message).await {
        Ok(reply) => {
            println!("{reply}\n");
            Ok(true)
        }
        Err(ChatError::Failed(text)) => {
            eprintln!("{text}\n");
            Ok(true)
        }
        Err(ChatError::Unauthorized) | Err(ChatError::NotAuthenticated) => {
            bail!("Session expired")
        }
        Err(e) => {
            eprintln!("  {e}");
            Ok(true)
        }
    }
}

enum SlashOutcome {
    Handled,
    Send(String),
}

fn handle_slash_command(input: &str, view: &ChatView) -> SlashOutcome {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" => {
            println!("  /new          Start a new conversation");
            println!("  /quick [n]    Show quick actions, or use action n");
            println!("  /history      Show this conversation");
            println!("  /quit         Leave the chat");
        }
        "/new" => match view.new_conversation() {
            Ok(()) => println!("  New conversation. The next message starts it."),
            Err(e) => eprintln!("  {e}"),
        },
        "/history" => print_transcript(&view.messages()),
        "/quick" => {
            if arg.is_empty() {
                for (i, action) in QUICK_ACTIONS.iter().enumerate() {
                    println!("  {}. {:<16} {}", i + 1, action.label, action.prompt.trim_end());
                }
                return SlashOutcome::Handled;
            }
            let Some(action) = arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(ChatView::quick_action)
            else {
                eprintln!("  Unknown quick action '{arg}'. Try /quick to list them.");
                return SlashOutcome::Handled;
            };

            // Prompts ending in a space expect the user to finish them.
            if action.prompt.ends_with(' ') {
                let rest = read_input(action.prompt).unwrap_or_default();
                return SlashOutcome::Send(format!("{}{}", action.prompt, rest.trim()));
            }
            return SlashOutcome::Send(action.prompt.to_string());
        }
        other => eprintln!("  Unknown command {other}. Try /help."),
    }
    SlashOutcome::Handled
}

fn describe_conversation(id: Option<i64>) -> String {
    match id {
        Some(id) => format!("conversation #{id}"),
        None => "new conversation".into(),
    }
}

fn print_transcript(messages: &[ChatMessage]) {
    for message in messages {
        let who = match message.sender {
            Sender::User => "you",
            Sender::Assistant => "assistant",
        };
        println!("{who}: {}\n", message.content);
    }
}

fn read_input(prompt: &str) -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("{prompt}");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
