// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subcommand implementations. Each writes its report to `out`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use replay_abi::{selector_hex, Interface};
use replay_cas::{HashAlgorithm, PreimageHash};
use replay_core::config::{ConfigService, ConfigStore};
use replay_core::methods::{encode_call, Run, RunArgs};
use replay_core::{
    standard_interface, Action, ChannelStates, EngineConfig, Machine, MachineError, MachineFactory, MethodRouter,
};
use tracing::debug;

use crate::cli::parse_hex;

/// Machine type for routers that only answer queries.
pub enum Detached {}

impl Machine for Detached {
    fn set_input_state(&mut self, _: ChannelStates) {
        match *self {}
    }

    fn step_once(&mut self) {
        match *self {}
    }

    fn serialize_dynamic_state(&self) -> Result<Vec<u8>, MachineError> {
        match *self {}
    }
}

/// Factory that never produces a machine.
#[derive(Debug, Clone, Copy)]
pub struct DetachedFactory;

impl MachineFactory for DetachedFactory {
    type Machine = Detached;

    fn reconstruct(&self, _: &[u8], _: &[u8]) -> Result<Detached, MachineError> {
        Err(MachineError::InvalidStatic("no machine attached".into()))
    }
}

pub fn interface(out: &mut impl Write, abi: Option<&Path>) -> Result<()> {
    let iface = match abi {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Interface::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => standard_interface()?,
    };
    let mut table = Table::new();
    table.set_header(vec!["selector", "signature", "mutability"]);
    for method in iface.methods() {
        table.add_row(vec![
            selector_hex(&method.selector()),
            method.signature(),
            format!("{:?}", method.mutability).to_lowercase(),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

pub fn encode_run(
    out: &mut impl Write,
    static_root: PreimageHash,
    dynamic_root: PreimageHash,
    activity: Vec<Action>,
) -> Result<()> {
    let payload = encode_call::<Run>(&RunArgs {
        static_root,
        dynamic_root,
        activity,
    })?;
    writeln!(out, "0x{}", hex::encode(payload))?;
    Ok(())
}

pub fn cost(out: &mut impl Write, config: &EngineConfig, payload: &str) -> Result<()> {
    let payload = parse_hex(payload)?;
    let router = MethodRouter::standard(config, DetachedFactory)?;
    writeln!(out, "mutates_state: {}", router.mutates_state(&payload))?;
    writeln!(out, "required_cost: {}", router.required_cost(&payload))?;
    Ok(())
}

pub fn hash(out: &mut impl Write, config: &EngineConfig, file: &Path, blake3: bool) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let algorithm = if blake3 { HashAlgorithm::Blake3 } else { config.hash };
    debug!(?algorithm, len = bytes.len(), "hashing");
    writeln!(out, "0x{}", algorithm.digest(&bytes))?;
    Ok(())
}

pub fn config<S: ConfigStore>(out: &mut impl Write, service: &ConfigService<S>, init: bool) -> Result<()> {
    let config = service.load_engine()?;
    if init {
        service.save_engine(&config)?;
    }
    writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
    Ok(())
}
