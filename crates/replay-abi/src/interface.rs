// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Method descriptors, selectors and JSON ABI loading.
//!
//! An [`Interface`] is an immutable set of [`MethodDescriptor`]s. It is built
//! once, either in code or from a Solidity JSON ABI document, and handed to
//! the router by reference.

use serde::Deserialize;
use thiserror::Error;

use crate::types::ParamType;

/// Leading four bytes of a call payload.
pub type Selector = [u8; 4];

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> Selector {
    let hash = keccak_hash::keccak(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.0[..4]);
    out
}

/// Lowercase hex rendering of a selector, `0x`-prefixed.
pub fn selector_hex(selector: &Selector) -> String {
    let mut out = String::from("0x");
    for byte in selector {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Declared state mutability of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads nothing, writes nothing.
    Pure,
    /// Reads state only.
    View,
    /// May write state.
    Nonpayable,
    /// May write state and receive value.
    Payable,
}

impl StateMutability {
    /// Whether calls may write state.
    pub fn mutates_state(self) -> bool {
        matches!(self, Self::Nonpayable | Self::Payable)
    }
}

/// Named positional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name (informational).
    pub name: String,
    /// Declared type.
    pub ty: ParamType,
}

impl Param {
    /// Build a parameter.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Schema of one callable method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Positional inputs.
    pub inputs: Vec<Param>,
    /// Positional outputs.
    pub outputs: Vec<Param>,
    /// Declared mutability.
    pub mutability: StateMutability,
}

impl MethodDescriptor {
    /// Canonical signature, e.g. `getPreimage(uint256,bytes32)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|p| p.ty.canonical()).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    /// Selector derived from [`signature`](Self::signature).
    pub fn selector(&self) -> Selector {
        selector(&self.signature())
    }

    /// Input types, in order.
    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.ty.clone()).collect()
    }

    /// Output types, in order.
    pub fn output_types(&self) -> Vec<ParamType> {
        self.outputs.iter().map(|p| p.ty.clone()).collect()
    }
}

/// Errors raised while building an [`Interface`].
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// Document is not valid JSON or not an ABI shape.
    #[error("[ABI_JSON] {0}")]
    Json(#[from] serde_json::Error),
    /// Type string is not supported by this codec.
    #[error("[ABI_UNSUPPORTED_TYPE] {0}")]
    UnsupportedType(String),
    /// Two functions share a name (overloads are not supported).
    #[error("[ABI_DUPLICATE_METHOD] {0}")]
    DuplicateMethod(String),
}

/// Immutable set of method descriptors, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interface {
    methods: Vec<MethodDescriptor>,
}

impl Interface {
    /// Build from descriptors. Names must be unique.
    pub fn new(mut methods: Vec<MethodDescriptor>) -> Result<Self, InterfaceError> {
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = methods.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(InterfaceError::DuplicateMethod(pair[0].name.clone()));
        }
        Ok(Self { methods })
    }

    /// Parse a JSON ABI: either a bare entry array or an artifact with an `abi` field.
    ///
    /// Entries other than functions (events, errors, constructors) are ignored.
    pub fn from_json(json: &str) -> Result<Self, InterfaceError> {
        let entries = match serde_json::from_str::<AbiDocument>(json)? {
            AbiDocument::Bare(entries) | AbiDocument::Artifact { abi: entries } => entries,
        };
        let methods = entries
            .into_iter()
            .filter(|entry| entry.kind == "function")
            .map(AbiEntry::into_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(methods)
    }

    /// All descriptors, sorted by name.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Look up a descriptor by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods
            .binary_search_by(|m| m.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.methods[idx])
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AbiDocument {
    Bare(Vec<AbiEntry>),
    Artifact { abi: Vec<AbiEntry> },
}

fn default_kind() -> String {
    "function".to_owned()
}

#[derive(Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default = "default_kind")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    constant: bool,
}

impl AbiEntry {
    fn into_descriptor(self) -> Result<MethodDescriptor, InterfaceError> {
        // Pre-0.5 documents only carry `constant`.
        let mutability = self.state_mutability.unwrap_or(if self.constant {
            StateMutability::View
        } else {
            StateMutability::Nonpayable
        });
        Ok(MethodDescriptor {
            name: self.name,
            inputs: params(self.inputs)?,
            outputs: params(self.outputs)?,
            mutability,
        })
    }
}

#[derive(Deserialize)]
struct AbiParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

fn params(raw: Vec<AbiParam>) -> Result<Vec<Param>, InterfaceError> {
    raw.into_iter()
        .map(|p| {
            let ty = parse_type(&p.ty, &p.components)?;
            Ok(Param { name: p.name, ty })
        })
        .collect()
}

/// Parse a JSON ABI type string; `tuple` types take their fields from `components`.
fn parse_type(ty: &str, components: &[AbiParam]) -> Result<ParamType, InterfaceError> {
    if let Some(inner) = ty.strip_suffix("[]") {
        return Ok(ParamType::Array(Box::new(parse_type(inner, components)?)));
    }
    let unsupported = || InterfaceError::UnsupportedType(ty.to_owned());
    match ty {
        "bool" => Ok(ParamType::Bool),
        "bytes" => Ok(ParamType::Bytes),
        "uint" => Ok(ParamType::Uint(256)),
        "tuple" => components
            .iter()
            .map(|c| parse_type(&c.ty, &c.components))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamType::Tuple),
        _ => {
            if let Some(bits) = ty.strip_prefix("uint") {
                let bits: u16 = bits.parse().map_err(|_| unsupported())?;
                if bits == 0 || bits > 256 || bits % 8 != 0 {
                    return Err(unsupported());
                }
                Ok(ParamType::Uint(bits))
            } else if let Some(width) = ty.strip_prefix("bytes") {
                let width: usize = width.parse().map_err(|_| unsupported())?;
                if width == 0 || width > 32 {
                    return Err(unsupported());
                }
                Ok(ParamType::FixedBytes(width))
            } else {
                Err(unsupported())
            }
        }
    }
}
