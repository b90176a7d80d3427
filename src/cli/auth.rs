// src/cli/auth.rs — login / register / logout commands

use anyhow::bail;

use crate::cli::AppContext;
use crate::infra::paths;

pub async fn run_login(ctx: &AppContext, email: Option<String>) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_email()?,
    };
    let password = prompt_password(false)?;

    paths::ensure_dirs().await?;

    let mut view = ctx.login_view();
    if view.submit(&email, &password).await {
        println!("  Signed in as {}.", email.trim());
        Ok(())
    } else {
        bail!("{}", view.error().unwrap_or("Login failed"))
    }
}

pub async fn run_register(ctx: &AppContext, email: Option<String>) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_email()?,
    };
    let password = prompt_password(true)?;

    let mut view = ctx.register_view();
    if view.submit(&email, &password).await {
        println!("  {}", view.success().unwrap_or("Registered."));
        println!("  Run `tasksphere login --email {}` to sign in.", email.trim());
        Ok(())
    } else {
        bail!("{}", view.error().unwrap_or("Registration failed"))
    }
}

pub fn run_logout(ctx: &AppContext) {
    let was_signed_in = ctx.session().is_authenticated();
    ctx.session().sign_out();
    if was_signed_in {
        println!("  Signed out.");
    } else {
        println!("  Not signed in.");
    }
}

fn prompt_email() -> anyhow::Result<String> {
    match inquire::Text::new("Email address:").prompt_skippable()? {
        Some(email) if !email.trim().is_empty() => Ok(email.trim().to_string()),
        _ => bail!("No email address given"),
    }
}

fn prompt_password(confirm: bool) -> anyhow::Result<String> {
    let prompt = inquire::Password::new("Password:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked);
    let prompt = if confirm {
        prompt.with_custom_confirmation_message("Confirm password:")
    } else {
        prompt.without_confirmation()
    };

    match prompt.prompt_skippable()? {
        Some(password) if !password.is_empty() => Ok(password),
        _ => bail!("No password given"),
    }
}
