//! Web shell command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Validate a generator config
//! webshell check shell.toml
//!
//! # Permission plan for an older Android host
//! webshell plan shell.toml --tier 28
//!
//! # Page-side bridge script for iOS
//! webshell shim --host ios
//!
//! # Replay a recorded session on a virtual clock
//! webshell simulate shell.toml session.txt --offline
//!
//! # Ten seeded connectivity chaos runs
//! webshell chaos shell.toml --seed 100 --runs 10
//! ```

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use webshell_cli::{CliError, commands, replay, script};
use webshell_core::{HostPlatform, ShellConfig};

/// Web shell tooling
#[derive(Parser, Debug)]
#[command(name = "webshell")]
#[command(about = "Inspect, plan and simulate generated web shells")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a config, then print a summary
    Check {
        /// Generator config (TOML)
        config: PathBuf,
    },

    /// Print the ordered permission batch and the follow-up
    Plan {
        /// Generator config (TOML)
        config: PathBuf,

        /// Capability tier to plan for instead of the configured one
        #[arg(long)]
        tier: Option<u32>,
    },

    /// Print the page-side bridge script
    Shim {
        /// Host whose message transport the script binds
        #[arg(long, value_enum, default_value = "android")]
        host: Host,
    },

    /// Replay a session script through the runtime
    Simulate {
        /// Generator config (TOML)
        config: PathBuf,

        /// Session script
        script: PathBuf,

        /// Boot without connectivity
        #[arg(long)]
        offline: bool,
    },

    /// Run seeded connectivity chaos and print a JSON report
    Chaos {
        /// Generator config (TOML)
        config: PathBuf,

        /// First seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Consecutive seeds to run
        #[arg(long, default_value = "1")]
        runs: u64,

        /// Operations per run
        #[arg(long, default_value = "1000")]
        steps: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Host {
    Android,
    Ios,
}

impl From<Host> for HostPlatform {
    fn from(host: Host) -> Self {
        match host {
            Host::Android => Self::Android,
            Host::Ios => Self::Ios,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Reports go to stdout; keep logs off it.
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Check { config } => {
            commands::check(&ShellConfig::load(&config)?, &mut out)?;
        },
        Command::Plan { config, tier } => {
            commands::plan(&ShellConfig::load(&config)?, tier, &mut out)?;
        },
        Command::Shim { host } => commands::shim(host.into(), &mut out)?,
        Command::Simulate { config, script: path, offline } => {
            let config = ShellConfig::load(&config)?;
            let text = std::fs::read_to_string(&path)
                .map_err(|source| CliError::ScriptUnreadable { path: path.clone(), source })?;
            let parsed = script::parse(&text)?;

            tracing::info!(commands = parsed.len(), "replaying session");
            let summary = replay(config, &parsed, !offline, &mut out).await?;
            writeln!(
                out,
                "{} command(s), {} skipped, {} action(s), {}ms virtual, final state {:?}{}",
                summary.commands,
                summary.skipped,
                summary.actions,
                summary.elapsed.as_millis(),
                summary.final_state,
                if summary.exited { ", exited" } else { "" }
            )?;
        },
        Command::Chaos { config, seed, runs, steps } => {
            commands::chaos(&ShellConfig::load(&config)?, seed, runs, steps, &mut out)?;
        },
    }

    out.flush()?;
    Ok(())
}
