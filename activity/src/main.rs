//! Recent-activity README updater.
//!
//! Fetches the configured user's GitHub events, merges them with the window
//! persisted in the `ACTIVITY_EVENTS` repository variable, and rewrites the
//! `<!--START_SECTION:activity-->` section of the README, committing the change.

use std::path::{Path, PathBuf};
use std::time::Duration;

use activity::exit_codes;
use activity::io::config::{ActivityConfig, TOKEN_ENV, load_config};
use activity::io::git::{Git, GitPublisher};
use activity::io::github::GithubClient;
use activity::logging;
use activity::run::{RunOptions, run_once};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "activity",
    version,
    about = "Update a README section with recent GitHub activity"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch activity, update the README section, commit and push.
    Run {
        /// TOML config file (missing file means defaults).
        #[arg(short, long, default_value = "activity.toml")]
        config: PathBuf,
        /// README to update, relative to the working directory.
        #[arg(long)]
        readme: Option<PathBuf>,
        /// Render the section without writing the window, the README, or committing.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            config,
            readme,
            dry_run,
        } => cmd_run(&config, readme, dry_run),
    }
}

fn cmd_run(config_path: &Path, readme: Option<PathBuf>, dry_run: bool) -> Result<i32> {
    let cfg = resolve_config(config_path, readme)?;
    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| anyhow!("{TOKEN_ENV} must be set to a GitHub token"))?;

    let client = GithubClient::new(
        &cfg.api_base,
        &token,
        Duration::from_secs(cfg.request_timeout_secs),
    )?;
    let root = std::env::current_dir().context("resolve working directory")?;
    let publisher = GitPublisher::new(
        Git::new(&root, Duration::from_secs(cfg.git_timeout_secs)),
        cfg.committer_name.clone(),
        cfg.committer_email.clone(),
    );

    let outcome = run_once(
        &root,
        &cfg,
        &client,
        &client,
        &publisher,
        RunOptions { dry_run },
    )?;

    if dry_run {
        for entry in &outcome.entries {
            println!("{entry}");
        }
    }
    if outcome.status.is_success() {
        println!("{}", outcome.status.message());
    } else {
        eprintln!("{}", outcome.status.message());
    }
    if outcome.published.is_some() {
        println!("Pushed to remote repository");
    }
    Ok(outcome.status.exit_code())
}

/// Defaults, then the TOML file, then `INPUT_*` environment, then CLI flags.
fn resolve_config(config_path: &Path, readme: Option<PathBuf>) -> Result<ActivityConfig> {
    let mut cfg = load_config(config_path)?;
    cfg.apply_action_inputs(|name| std::env::var(name).ok())?;
    if let Some(readme) = readme {
        cfg.readme_path = readme;
    }
    cfg.validate()?;
    Ok(cfg)
}
