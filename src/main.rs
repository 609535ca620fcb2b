//! gvm - import, inspect and roll game values from the command line

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gvm::values::format_number;
use gvm::{GameValueManager, GvmConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Game value manager
#[derive(Parser, Debug)]
#[command(name = "gvm", version, about = "Evaluate tabletop character sheet values")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fixed dice seed (overrides the configuration)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a document and print an owner's sheet as JSON
    Sheet {
        /// Import document
        doc: PathBuf,

        #[arg(short, long)]
        owner: Option<String>,
    },
    /// Invoke a value, optionally with registered effects
    Invoke {
        /// Import document
        doc: PathBuf,

        /// Value name
        name: String,

        #[arg(short, long)]
        owner: Option<String>,

        /// Effect to apply (can be specified multiple times)
        #[arg(short, long = "effect")]
        effects: Vec<String>,

        /// Number of invocations
        #[arg(short = 'n', long, default_value_t = 1)]
        times: u32,
    },
    /// Evaluate a roll string such as "1d20 + #DEX"
    Roll {
        expression: String,

        /// Document providing the values referenced by #NAME tokens
        #[arg(short, long)]
        doc: Option<PathBuf>,

        #[arg(short, long)]
        owner: Option<String>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gvm=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_manager(config: &GvmConfig, doc: Option<&Path>) -> Result<GameValueManager> {
    let mut gvm = GameValueManager::from_config(config);
    if let Some(path) = doc {
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        gvm.import_json(&document)
            .with_context(|| format!("Failed to import {}", path.display()))?;
    }
    Ok(gvm)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let mut config = GvmConfig::load(args.config.as_deref()).context("Invalid configuration")?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    match args.command {
        Command::Sheet { doc, owner } => {
            let gvm = load_manager(&config, Some(doc.as_path()))?;
            let sheet = gvm.output_sheet(owner.as_deref());
            println!("{}", serde_json::to_string_pretty(&sheet)?);
        }
        Command::Invoke {
            doc,
            name,
            owner,
            effects,
            times,
        } => {
            let mut gvm = load_manager(&config, Some(doc.as_path()))?;
            let id = gvm.get_id_by_name(&name, owner.as_deref())?;
            let effects: Vec<&str> = effects.iter().map(String::as_str).collect();
            for _ in 0..times {
                let value = gvm.invoke_with_effects(id, &effects)?;
                println!("{}", format_number(value));
            }
            info!(summary = %gvm.display(id)?, "invoked");
        }
        Command::Roll {
            expression,
            doc,
            owner,
        } => {
            let mut gvm = load_manager(&config, doc.as_deref())?;
            let value = gvm.roll(&expression, owner.as_deref())?;
            println!("{}", format_number(value));
        }
    }

    Ok(())
}
