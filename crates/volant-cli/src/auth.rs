//! Account subcommands: login, register, logout, whoami.

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{Input, Password};

use volant_api::SessionData;

use crate::context;

/// Arguments for `volant login`.
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: Option<String>,
}

/// Arguments for `volant register`.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Account email
    #[arg(long)]
    pub email: Option<String>,

    /// Username for the new account
    #[arg(long)]
    pub username: Option<String>,
}

fn prompt_email(provided: Option<String>, non_interactive: bool) -> Result<String> {
    if let Some(email) = provided {
        return Ok(email);
    }
    if non_interactive {
        anyhow::bail!("--email is required in non-interactive mode");
    }
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    Ok(email)
}

fn prompt_password(non_interactive: bool) -> Result<String> {
    if non_interactive {
        std::env::var("VOLANT_PASSWORD").map_err(|_| {
            anyhow::anyhow!("VOLANT_PASSWORD env var is required in non-interactive mode")
        })
    } else {
        let password: String = Password::new().with_prompt("Password").interact()?;
        Ok(password)
    }
}

/// Authenticate and persist the session.
pub fn login(args: LoginArgs, api_url: Option<&str>, non_interactive: bool) -> Result<()> {
    let (mut client, store, url) = context::anonymous(api_url)?;
    let email = prompt_email(args.email, non_interactive)?;
    let password = prompt_password(non_interactive)?;

    let resp = client.login(&email, &password).context("login failed")?;

    store.save(&SessionData {
        access_token: resp.access_token,
        refresh_token: resp.refresh_token,
        api_url: url,
        user: resp.user.clone(),
    })?;

    println!("Logged in as {} ({})", resp.user.username, resp.user.email);
    Ok(())
}

/// Create an account and persist the session.
pub fn register(args: RegisterArgs, api_url: Option<&str>, non_interactive: bool) -> Result<()> {
    let (mut client, store, url) = context::anonymous(api_url)?;
    let email = prompt_email(args.email, non_interactive)?;

    let username = match args.username {
        Some(username) => username,
        None if non_interactive => anyhow::bail!("--username is required in non-interactive mode"),
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = prompt_password(non_interactive)?;

    let resp = client
        .register(&email, &password, &username)
        .context("registration failed")?;

    store.save(&SessionData {
        access_token: resp.access_token,
        refresh_token: resp.refresh_token,
        api_url: url,
        user: resp.user.clone(),
    })?;

    println!("Account created: {} ({})", resp.user.username, resp.user.email);
    Ok(())
}

/// Forget the saved session. The tunnel, if up, is left alone.
pub fn logout() -> Result<()> {
    let store = volant_api::SessionStore::default_location()?;
    store.delete()?;
    println!("Logged out");
    Ok(())
}

/// Show the logged-in user's profile and usage.
pub fn whoami(api_url: Option<&str>) -> Result<()> {
    let (client, _store, session) = context::authenticated(api_url)?;
    let user = &session.user;

    println!("{} <{}>", user.username, user.email);
    if !user.subscription_tier.is_empty() {
        println!("  tier: {}", user.subscription_tier);
    }
    println!("  transferred: {:.2} GB", user.data_transferred_gb);
    println!("  connections: {}", user.connection_count);

    if let Ok(stats) = client.user_stats() {
        println!(
            "  sessions: {} total, {} active",
            stats.total_sessions, stats.active_sessions
        );
    }
    Ok(())
}
