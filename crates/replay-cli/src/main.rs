// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Replay CLI
//!
//! Developer tooling for the replay precompile: list selectors, build `run`
//! payloads, estimate call cost and hash preimages.

mod cli;
mod commands;
mod fs_config;

use anyhow::{Context, Result};
use clap::Parser;
use replay_core::config::ConfigService;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Args, Command};
use crate::fs_config::FsConfigStore;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let store = match args.config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new()?,
    };
    let service = ConfigService::new(store);
    let config = service.load_engine().context("loading engine config")?;
    debug!(?config, "engine config");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.cmd {
        Command::Interface { abi } => commands::interface(&mut out, abi.as_deref()),
        Command::EncodeRun {
            static_root,
            dynamic_root,
            events,
        } => commands::encode_run(&mut out, static_root, dynamic_root, events),
        Command::Cost { payload } => commands::cost(&mut out, &config, &payload),
        Command::Hash { file, blake3 } => commands::hash(&mut out, &config, &file, blake3),
        Command::Config { init } => commands::config(&mut out, &service, init),
    }
}
