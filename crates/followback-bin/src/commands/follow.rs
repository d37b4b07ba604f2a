//! Listing and follow-back commands.

use super::{confirm, ensure_fetched, Context};
use crate::output::{self, heading, row, OutputFormat};
use anyhow::{anyhow, bail, Result};
use follow_back_engine::{Actor, BulkFollowReport, FollowOutcome, Reconciliation};
use followback_config_and_utils::Lang;
use serde::Serialize;
use std::fmt::{self, Write as _};

fn actor_line(actor: &Actor) -> String {
    format!("  {} (@{})\n", actor.label(), actor.handle)
}

#[derive(Serialize)]
struct ListView<'a> {
    #[serde(flatten)]
    reconciliation: &'a Reconciliation,
    #[serde(skip)]
    lang: Lang,
}

impl fmt::Display for ListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.reconciliation;
        let text = |key| crate::messages::text(self.lang, key);

        write!(
            f,
            "{}",
            heading(&format!("{} {}", text("text.numNotFollowing"), r.not_followed.len()))
        )?;
        if r.not_followed.is_empty() {
            writeln!(f, "  {}", text("text.alreadyFollowingAll"))?;
        }
        for actor in &r.not_followed {
            write!(f, "{}", actor_line(actor))?;
        }

        write!(
            f,
            "{}",
            heading(&format!("{} {}", text("text.alreadyFollowing"), r.already_followed.len()))
        )?;
        for actor in &r.already_followed {
            write!(f, "{}", actor_line(actor))?;
        }

        writeln!(f)?;
        write!(
            f,
            "{}",
            row(text("text.mutedFollowers"), &r.muted_followers.to_string())
        )
    }
}

/// Fetch and print both partitions of the follower list.
pub async fn list(ctx: &Context) -> Result<()> {
    let mut controller = ctx.controller()?;
    ensure_fetched(ctx, &mut controller).await?;

    let reconciliation = controller
        .reconciliation()
        .filter(|_| controller.phase().has_fetched_followers())
        .ok_or_else(|| anyhow!(ctx.text("message.fetchFollowersFailed").to_string()))?;
    output::print(
        &ListView {
            reconciliation,
            lang: ctx.lang,
        },
        ctx.format,
    );
    Ok(())
}

#[derive(Serialize)]
struct FailureView {
    did: String,
    handle: String,
    error: String,
}

#[derive(Serialize)]
struct FollowBackView {
    followed: Vec<Actor>,
    failures: Vec<FailureView>,
    /// Followers still not followed after re-reconciling.
    remaining: usize,
    #[serde(skip)]
    lang: Lang,
}

impl FollowBackView {
    fn new(report: BulkFollowReport, remaining: usize, lang: Lang) -> Self {
        let failures = report
            .failures
            .into_iter()
            .map(|failure| FailureView {
                did: failure.actor.did,
                handle: failure.actor.handle,
                error: failure.error.to_string(),
            })
            .collect();
        Self {
            followed: report.followed,
            failures,
            remaining,
            lang,
        }
    }
}

impl fmt::Display for FollowBackView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |key| crate::messages::text(self.lang, key);

        writeln!(f)?;
        writeln!(f, "{}", text("message.followedBack"))?;
        for (key, count) in [
            ("text.followed", self.followed.len()),
            ("text.failed", self.failures.len()),
            ("text.remaining", self.remaining),
        ] {
            write!(f, "{}", row(text(key), &count.to_string()))?;
        }

        if !self.failures.is_empty() {
            write!(f, "{}", heading(text("text.followFailed")))?;
            for failure in &self.failures {
                writeln!(f, "  @{}: {}", failure.handle, failure.error)?;
            }
        }
        Ok(())
    }
}

fn progress_line(index: usize, total: usize, actor: &Actor, outcome: &FollowOutcome<'_>) -> String {
    let mut line = format!("[{}/{}] ", index, total);
    match outcome {
        FollowOutcome::Followed => {
            let _ = write!(line, "✓ {} (@{})", actor.label(), actor.handle);
        }
        FollowOutcome::Failed(error) => {
            let _ = write!(line, "✗ {} (@{}): {}", actor.label(), actor.handle, error);
        }
    }
    line
}

/// Follow back every follower not yet followed.
pub async fn follow_back(ctx: &Context, yes: bool) -> Result<()> {
    if !yes && ctx.format == OutputFormat::Json {
        bail!("--yes is required with --format json");
    }

    let mut controller = ctx.controller()?;
    ensure_fetched(ctx, &mut controller).await?;

    let targets = match controller.reconciliation() {
        Some(reconciliation) => reconciliation.not_followed.clone(),
        None => bail!(ctx.text("message.fetchFollowersFailed").to_string()),
    };
    if targets.is_empty() {
        output::print_success(ctx.text("text.alreadyFollowingAll"), ctx.format);
        return Ok(());
    }

    if !yes {
        print!(
            "{}",
            heading(&format!("{} {}", ctx.text("text.numNotFollowing"), targets.len()))
        );
        for actor in &targets {
            print!("{}", actor_line(actor));
        }
        println!();
        if !confirm(ctx.text("ui.confirmFollowAll")) {
            output::print_success(ctx.text("ui.cancelled"), ctx.format);
            return Ok(());
        }
    }

    let format = ctx.format;
    let report = controller
        .start_follow_back(|progress| {
            if format == OutputFormat::Text {
                println!(
                    "{}",
                    progress_line(progress.index, progress.total, progress.actor, &progress.outcome)
                );
            }
        })
        .await?;

    let remaining = controller
        .reconciliation()
        .map(|r| r.not_followed.len())
        .unwrap_or_default();
    let failed = report.failures.len();
    output::print(&FollowBackView::new(report, remaining, ctx.lang), ctx.format);

    if failed > 0 {
        bail!("{} {}", ctx.text("text.followFailed"), failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use follow_back_engine::{ApiError, FollowFailure};

    fn actor(did: &str, handle: &str) -> Actor {
        Actor::new(did, handle)
    }

    #[test]
    fn test_progress_line() {
        let a = actor("did:plc:a", "alice.bsky.social").with_display_name("Alice");
        assert_eq!(
            progress_line(1, 3, &a, &FollowOutcome::Followed),
            "[1/3] ✓ Alice (@alice.bsky.social)"
        );

        let err = ApiError::Transport("timed out".into());
        let b = actor("did:plc:b", "bob.bsky.social");
        assert_eq!(
            progress_line(2, 3, &b, &FollowOutcome::Failed(&err)),
            "[2/3] ✗ bob (@bob.bsky.social): Transport error: timed out"
        );
    }

    #[test]
    fn test_list_view_text() {
        let reconciliation = Reconciliation {
            not_followed: vec![actor("did:plc:x", "x.bsky.social")],
            already_followed: vec![actor("did:plc:y", "y.bsky.social")],
            muted_followers: 1,
        };
        let text = ListView {
            reconciliation: &reconciliation,
            lang: Lang::En,
        }
        .to_string();

        assert!(text.contains("Followers you don't follow back: 1"));
        assert!(text.contains("x (@x.bsky.social)"));
        assert!(text.contains("Followers you follow back: 1"));
        assert!(text.contains("Muted followers skipped:"));
        assert!(!text.contains("You already follow back"));
    }

    #[test]
    fn test_list_view_json_flattens_reconciliation() {
        let reconciliation = Reconciliation {
            not_followed: vec![],
            already_followed: vec![actor("did:plc:y", "y.bsky.social")],
            muted_followers: 0,
        };
        let json = serde_json::to_value(ListView {
            reconciliation: &reconciliation,
            lang: Lang::Ja,
        })
        .unwrap();

        assert!(json["not_followed"].as_array().unwrap().is_empty());
        assert_eq!(json["already_followed"][0]["did"], "did:plc:y");
        assert!(json.get("lang").is_none());
    }

    #[test]
    fn test_follow_back_view_lists_failures() {
        let report = BulkFollowReport {
            followed: vec![actor("did:plc:a", "a.bsky.social")],
            failures: vec![FollowFailure {
                actor: actor("did:plc:b", "b.bsky.social"),
                error: ApiError::Rejected {
                    status: 500,
                    error: "InternalServerError".into(),
                    message: "oops".into(),
                },
            }],
        };
        let view = FollowBackView::new(report, 1, Lang::En);
        let text = view.to_string();

        assert!(text.contains("Followed back."));
        assert!(text.contains("Could not follow:"));
        assert!(text.contains("@b.bsky.social: Request rejected (HTTP 500"));
        assert!(text.contains("Followed:"));
        assert!(text.contains("Remaining:"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["remaining"], 1);
        assert_eq!(json["failures"][0]["did"], "did:plc:b");
    }

    #[test]
    fn test_follow_back_summary_is_localized() {
        let report = BulkFollowReport {
            followed: vec![actor("did:plc:a", "a.bsky.social")],
            failures: vec![],
        };
        let text = FollowBackView::new(report, 0, Lang::Ja).to_string();

        assert!(text.contains("フォローバックしました。"));
        assert!(text.contains("フォロー済み:"));
        assert!(text.contains("残り:"));
        assert!(!text.contains("Followed"));
        assert!(!text.contains("Remaining"));
    }
}
