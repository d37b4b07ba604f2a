//! CLI command implementations.

mod auth;
mod follow;

pub use auth::{login, logout, status};
pub use follow::{follow_back, list};

use crate::messages;
use crate::output::OutputFormat;
use anyhow::{Context as _, Result};
use bsky_xrpc::XrpcClient;
use follow_back_engine::{
    EngineError, EngineSettings, FollowBackController, Phase, ResumeFailurePolicy,
};
use followback_config_and_utils::{Config, Lang, Paths};
use followback_storage::{create_session_store, SessionStore};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Everything a command needs, resolved once in `main`.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub lang: Lang,
    pub format: OutputFormat,
}

impl Context {
    pub fn text<'a>(&self, key: &'a str) -> &'a str {
        messages::text(self.lang, key)
    }

    pub fn session_store(&self) -> Result<SessionStore> {
        create_session_store(&self.paths).context("Failed to open session storage")
    }

    /// Wire a controller to the configured service and the session file.
    ///
    /// In text mode phase messages are printed to stderr as they happen.
    pub fn controller(&self) -> Result<FollowBackController> {
        let service_url = self.config.service_url()?;
        let client = XrpcClient::new(
            service_url,
            Duration::from_secs(self.config.request_timeout_secs),
        )?;
        let store = self.session_store()?;

        let mut controller = FollowBackController::new(
            Arc::new(client),
            Arc::new(store),
            engine_settings(&self.config),
        );

        if self.format == OutputFormat::Text {
            let lang = self.lang;
            controller.set_phase_observer(Box::new(move |change| {
                let message = messages::text(lang, change.message_key);
                if !message.is_empty() {
                    eprintln!("{}", message);
                }
            }));
        }
        Ok(controller)
    }
}

/// Map the user configuration onto engine tunables.
pub fn engine_settings(config: &Config) -> EngineSettings {
    EngineSettings {
        page_limit: config.effective_page_limit(),
        max_auth_attempts: config.max_auth_attempts,
        resume_failure_policy: if config.short_circuit_on_resume_failure {
            ResumeFailurePolicy::ShortCircuit
        } else {
            ResumeFailurePolicy::RetryAnyway
        },
    }
}

/// Resume or log in, then make sure a snapshot is available.
///
/// A failed fetch is retried once before giving up.
async fn ensure_fetched(ctx: &Context, controller: &mut FollowBackController) -> Result<()> {
    if let Err(e) = controller.start().await {
        tolerate_fetch_failure(e, controller.phase())?;
    }
    explain_resume_failure(ctx, controller);
    if controller.phase().is_logged_out() {
        let credentials = auth::prompt_credentials(None)?;
        login_or_explain(ctx, controller, credentials).await?;
    }

    if controller.phase() == Phase::FetchFollowersFailed {
        warn!("Retrying relationship fetch");
        controller
            .retry_fetch()
            .await
            .context(ctx.text("message.fetchFollowersFailed").to_string())?;
    }
    Ok(())
}

/// Tell the user a stored session was rejected before asking them to log in.
fn explain_resume_failure(ctx: &Context, controller: &FollowBackController) {
    if let Some(e) = controller.resume_failure() {
        warn!(error = %e, "Stored session rejected");
        if ctx.format == OutputFormat::Text {
            eprintln!("{}", ctx.text("text.sessionExpired"));
        }
    }
}

/// Submit credentials, turning a rejection into the localized login message.
async fn login_or_explain(
    ctx: &Context,
    controller: &mut FollowBackController,
    credentials: follow_back_engine::Credentials,
) -> Result<()> {
    match controller.submit_login(credentials).await {
        Ok(()) => Ok(()),
        Err(e @ EngineError::LoginFailed(_)) => {
            Err(anyhow::Error::new(e).context(ctx.text("message.loginFailed").to_string()))
        }
        Err(e) => tolerate_fetch_failure(e, controller.phase()),
    }
}

/// A fetch failure leaves the session in place; callers decide whether to
/// retry. Everything else is an error.
fn tolerate_fetch_failure(err: EngineError, phase: Phase) -> Result<()> {
    match err {
        EngineError::FetchFailed(ref api) if phase == Phase::FetchFollowersFailed => {
            warn!(error = %api, "Relationship fetch failed");
            Ok(())
        }
        other => Err(other.into()),
    }
}

/// Ask user for confirmation.
fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
