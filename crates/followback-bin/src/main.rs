//! followback - follow back every Bluesky account that follows you.

mod commands;
mod messages;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use followback_config_and_utils::{init_logging, Config, Lang, Paths};
use tracing::debug;

/// followback - Follow back your Bluesky followers.
#[derive(Parser)]
#[command(name = "followback")]
#[command(about = "Follow back every Bluesky account that follows you")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Message language (en or ja)
    #[arg(long, global = true, value_parser = parse_lang)]
    lang: Option<Lang>,

    /// Mirror the log level to stderr instead of only warnings
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a handle (or email) and app password
    Login {
        /// Handle or email; prompted when omitted
        #[arg(short, long)]
        identifier: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the session and follower counts
    Status,

    /// List followers you do and don't follow back
    List,

    /// Follow back every follower you don't follow yet
    FollowBack {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_lang(code: &str) -> Result<Lang, String> {
    Lang::from_code(code).ok_or_else(|| format!("unsupported language '{}' (expected en or ja)", code))
}

async fn run(cli: Cli) -> Result<()> {
    let paths = Paths::new()?;
    let mut config = Config::load(&paths)?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let log_file = init_logging(&config.log_level, Some(paths.log_file()), cli.verbose);
    debug!(service_url = %config.service_url, log_file = ?log_file, "Configuration loaded");

    let lang = cli.lang.unwrap_or_else(|| config.effective_lang());
    debug!(lang = lang.code(), "Message language selected");
    let ctx = commands::Context {
        paths,
        config,
        lang,
        format: cli.format,
    };

    match cli.command {
        Commands::Login { identifier } => commands::login(&ctx, identifier).await,
        Commands::Logout => commands::logout(&ctx),
        Commands::Status => commands::status(&ctx).await,
        Commands::List => commands::list(&ctx).await,
        Commands::FollowBack { yes } => commands::follow_back(&ctx, yes).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e), format);
        std::process::exit(1);
    }
}
