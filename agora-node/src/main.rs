// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

mod config;
mod genesis;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use agora_common::Amount;
use agora_ledger::Ledger;
use agora_peers::MemoryBlockStorage;

use config::Config;
use genesis::{build_genesis, key_from_seed, GenesisAllocation};

#[derive(Parser)]
#[command(name = "agora-node")]
#[command(about = "A federated-Byzantine-agreement ledger node", long_about = None)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, global = true, default_value = "agora.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a single-node ledger from genesis and print its status.
    Run,
    /// Print the resolved configuration and exit.
    Status,
}

fn load_config(path: &PathBuf) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::from_yaml_str("{}")?);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Config::from_yaml_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    agora_common::logger::init(&config.logging.join(","));

    match cli.command {
        Commands::Status => {
            println!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        Commands::Run => run(config),
    }
}

fn run(config: Config) -> Result<()> {
    let validator_key = key_from_seed(config.validator.seed.as_deref().unwrap_or("agora-genesis"));
    let genesis = build_genesis(&[GenesisAllocation {
        public_key: validator_key.public_key(),
        amount: Amount::new(1_000_000),
    }]);

    let storage = MemoryBlockStorage::new();
    let ledger: Ledger<MemoryBlockStorage> = Ledger::open(storage, genesis, 0)
        .map_err(|e| anyhow::anyhow!("failed to open ledger: {e}"))?;

    tracing::info!(
        height = ledger.get_block_height(),
        flash_enabled = config.flash.enabled,
        "agora node started"
    );
    println!("Chain height: {}", ledger.get_block_height());
    Ok(())
}
