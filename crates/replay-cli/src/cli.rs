// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line surface.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use replay_cas::PreimageHash;
use replay_core::Action;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding engine.json (defaults to the platform config dir)
    #[clap(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List methods with their signatures and selectors
    Interface {
        /// JSON ABI (bare array or artifact) to list instead of the built-in one
        #[clap(long)]
        abi: Option<PathBuf>,
    },
    /// Print the hex call payload for `run`
    EncodeRun {
        /// Static state root (32-byte hex)
        #[clap(long = "static", value_parser = parse_hash)]
        static_root: PreimageHash,
        /// Dynamic state root (32-byte hex)
        #[clap(long = "dynamic", value_parser = parse_hash)]
        dynamic_root: PreimageHash,
        /// Activity event as channel:press:duration, repeatable
        #[clap(long = "event", value_parser = parse_action)]
        events: Vec<Action>,
    },
    /// Print whether a payload mutates state and its pre-flight cost
    Cost {
        /// Hex call payload, `0x` prefix optional
        payload: String,
    },
    /// Print the preimage hash of a file
    Hash {
        /// File to hash
        file: PathBuf,
        /// Use BLAKE3 instead of the configured digest
        #[clap(long)]
        blake3: bool,
    },
    /// Print the effective engine config
    Config {
        /// Write the effective config back to disk
        #[clap(long)]
        init: bool,
    },
}

/// Decode hex with an optional `0x` prefix.
pub fn parse_hex(raw: &str) -> Result<Vec<u8>> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).with_context(|| format!("invalid hex: {raw}"))
}

/// Parse a 32-byte preimage hash.
pub fn parse_hash(raw: &str) -> Result<PreimageHash> {
    let bytes = parse_hex(raw)?;
    let array: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .with_context(|| format!("hash must be 32 bytes, got {}", bytes.len()))?;
    Ok(PreimageHash(array))
}

/// Parse `channel:press:duration`, e.g. `0:true:60`.
pub fn parse_action(raw: &str) -> Result<Action> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [channel, press, duration] = parts.as_slice() else {
        bail!("expected channel:press:duration, got {raw}");
    };
    let press = match *press {
        "1" | "true" | "press" => true,
        "0" | "false" | "release" => false,
        other => bail!("press must be true/false, got {other}"),
    };
    Ok(Action::new(
        channel.parse().with_context(|| format!("bad channel in {raw}"))?,
        press,
        duration.parse().with_context(|| format!("bad duration in {raw}"))?,
    ))
}
