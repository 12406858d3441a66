//! CLI for the watched toggler.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use watched_core::config::{self, WatchedConfig};
use watched_core::request::Action;
use watched_core::target::Focus;

use commands::{run_actions, run_config, run_url};

/// Top-level CLI for the watched toggler.
#[derive(Debug, Parser)]
#[command(name = "watched")]
#[command(about = "Mark media as watched through the jukebox watched script", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/watched/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Overrides file applied on top of the config (also read from $WATCHED_OVERRIDES).
    #[arg(long, global = true, value_name = "PATH")]
    pub overrides: Option<PathBuf>,

    /// Print results as JSON lines.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Which media item a request is about.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Href of the focused media link; its file name without extension is used.
    #[arg(long, value_name = "URL")]
    pub href: Option<String>,

    /// Base file name of the page, used when no link has focus.
    #[arg(long, value_name = "NAME")]
    pub base: Option<String>,
}

impl TargetArgs {
    pub fn focus(&self) -> Focus {
        Focus::from(self.href.clone())
    }

    pub fn base_filename(&self) -> &str {
        self.base.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Report whether the marker exists.
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Create the marker if absent, delete it if present.
    Toggle {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Create the marker (checks first; skipped if it already exists).
    Mark {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the request URL for an action without sending it.
    Url {
        /// check, toggle or mark (or 0, 1, 2).
        action: Action,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run several actions in one session, waiting for each reply.
    Session {
        /// Actions in order: check, toggle, mark (or 0, 1, 2).
        #[arg(required = true, num_args = 1..)]
        actions: Vec<Action>,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

/// Base config plus the overrides layer, if one is named.
fn load_config(cli: &Cli) -> Result<WatchedConfig> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_or_init_at(path)?,
        None => config::load_or_init()?,
    };
    let overrides_path = cli
        .overrides
        .clone()
        .or_else(|| std::env::var_os(config::OVERRIDES_ENV).map(PathBuf::from));
    if let Some(path) = overrides_path {
        let overrides = config::load_overrides(&path)?;
        cfg.apply_overrides(&overrides);
    }
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(&cli)?;
        tracing::debug!("loaded config: {:?}", cfg);
        let json = cli.json;

        match cli.command {
            CliCommand::Check { target } => {
                run_actions(cfg, &target, &[Action::Check], json).await?
            }
            CliCommand::Toggle { target } => {
                run_actions(cfg, &target, &[Action::Toggle], json).await?
            }
            CliCommand::Mark { target } => {
                // A fresh session knows nothing; learn the status so an existing
                // marker is not toggled away.
                run_actions(cfg, &target, &[Action::Check, Action::CreateOnly], json).await?
            }
            CliCommand::Url { action, target } => run_url(&cfg, &target, action, json)?,
            CliCommand::Session { actions, target } => {
                run_actions(cfg, &target, &actions, json).await?
            }
            CliCommand::Config => run_config(cli.config.as_deref(), &cfg)?,
        }

        Ok(())
    }
}
