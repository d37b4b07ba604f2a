//! Authentication commands.

use super::{explain_resume_failure, login_or_explain, tolerate_fetch_failure, Context};
use crate::output::{self, row};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use follow_back_engine::{Credentials, Phase, SessionOwner};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use tracing::info;

/// Environment variable read before prompting for the password.
pub const PASSWORD_ENV: &str = "FOLLOWBACK_PASSWORD";

/// Read the identifier (unless given) and the password.
///
/// The password comes from `FOLLOWBACK_PASSWORD` when set, otherwise from a
/// hidden prompt.
pub fn prompt_credentials(identifier: Option<String>) -> Result<Credentials> {
    let identifier = match identifier {
        Some(identifier) => identifier,
        None => {
            print!("Handle or email: ");
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            input
        }
    };
    if identifier.trim().is_empty() {
        bail!("Handle or email is required");
    }

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("App password: ")?,
    };
    if password.is_empty() {
        bail!("Password is required");
    }

    Ok(Credentials::new(identifier, password))
}

/// Log in unless the stored session still works.
pub async fn login(ctx: &Context, identifier: Option<String>) -> Result<()> {
    let mut controller = ctx.controller()?;
    if let Err(e) = controller.start().await {
        tolerate_fetch_failure(e, controller.phase())?;
    }

    if controller.phase().is_logged_in() {
        if let Some(owner) = controller.session_owner() {
            output::print_success(&format!("Already logged in as {}", owner.handle), ctx.format);
            return Ok(());
        }
    }
    explain_resume_failure(ctx, &controller);

    let credentials = prompt_credentials(identifier)?;
    login_or_explain(ctx, &mut controller, credentials).await?;

    match controller.session_owner() {
        Some(owner) => {
            output::print_success(&format!("Logged in as {}", owner.handle), ctx.format)
        }
        None => output::print_success("Logged in", ctx.format),
    }
    Ok(())
}

/// Forget the stored session.
///
/// Nothing is held in memory between invocations, so clearing the session
/// file is the whole logout.
pub fn logout(ctx: &Context) -> Result<()> {
    let store = ctx.session_store()?;
    let meta = store.session_meta().ok().flatten();
    store.clear_session()?;

    match meta {
        Some(meta) => {
            info!(did = %meta.did, "Logged out");
            output::print_success(&format!("Logged out {}", meta.handle), ctx.format);
        }
        None => output::print_success(ctx.text("text.notLoggedIn"), ctx.format),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatusView {
    phase: Phase,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<SessionOwner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_followed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    already_followed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    muted_followers: Option<usize>,
    #[serde(skip)]
    not_logged_in: String,
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", row("Phase", &format!("{:?}", self.phase)))?;
        if !self.message.is_empty() {
            write!(f, "{}", row("Message", &self.message))?;
        }
        match &self.owner {
            Some(owner) => {
                write!(f, "{}", row("Account", &owner.handle))?;
                write!(f, "{}", row("DID", &owner.did))?;
            }
            None => write!(f, "{}", row("Account", &self.not_logged_in))?,
        }
        if let Some(saved_at) = self.saved_at {
            write!(f, "{}", row("Session saved", &saved_at.to_rfc3339()))?;
        }
        for (label, count) in [
            ("Not followed", self.not_followed),
            ("Followed back", self.already_followed),
            ("Muted", self.muted_followers),
        ] {
            if let Some(count) = count {
                write!(f, "{}", row(label, &count.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Resume the stored session and report where the lifecycle ended up.
pub async fn status(ctx: &Context) -> Result<()> {
    let mut controller = ctx.controller()?;
    if let Err(e) = controller.start().await {
        tolerate_fetch_failure(e, controller.phase())?;
    }

    let phase = controller.phase();
    let saved_at = ctx
        .session_store()?
        .session_meta()
        .ok()
        .flatten()
        .map(|meta| meta.saved_at);
    let reconciliation = controller.reconciliation();

    let view = StatusView {
        phase,
        message: ctx.text(phase.message_key()).to_string(),
        owner: controller.session_owner(),
        saved_at,
        not_followed: reconciliation.map(|r| r.not_followed.len()),
        already_followed: reconciliation.map(|r| r.already_followed.len()),
        muted_followers: reconciliation.map(|r| r.muted_followers),
        not_logged_in: ctx.text("text.notLoggedIn").to_string(),
    };
    output::print(&view, ctx.format);
    Ok(())
}
