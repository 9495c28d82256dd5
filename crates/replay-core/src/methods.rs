// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The four precompile methods and their typed argument records.
//!
//! Each method is a unit type implementing [`PrecompileMethod`]: its wire
//! schema comes from the `Args` / `Output` types, so decoding yields a named
//! record and a handler never inspects an untyped value list. [`Handler`] is
//! the closed set of methods the router can bind a descriptor to.

use replay_abi::{
    with_selector, AbiParams, Bytes, DecodeError, EncodeError, Interface, InterfaceError, MethodDescriptor,
    Param, ParamType, Selector, StateMutability, Uint256,
};
use replay_cas::{BlobStore, PreimageHash};

use crate::activity::Action;
use crate::cost::GasSchedule;
use crate::error::PrecompileError;
use crate::machine::MachineFactory;
use crate::replay::ReplayEngine;

/// JSON ABI of the standard method surface.
pub const STANDARD_ABI: &str = include_str!("../abi/Replay.json");

/// One callable method with a static schema.
pub trait PrecompileMethod {
    /// Method name as it appears in the signature.
    const NAME: &'static str;
    /// Declared mutability.
    const MUTABILITY: StateMutability;
    /// Input parameter names, positionally.
    const INPUT_NAMES: &'static [&'static str];
    /// Output parameter names, positionally.
    const OUTPUT_NAMES: &'static [&'static str];

    /// Decoded arguments.
    type Args: AbiParams;
    /// Result record.
    type Output: AbiParams;

    /// Pre-flight cost of a call with `args`.
    fn required_cost(args: &Self::Args, gas: &GasSchedule) -> u64;

    /// Perform the call.
    fn execute<S, F>(
        args: Self::Args,
        store: &mut S,
        replay: &ReplayEngine<F>,
    ) -> Result<Self::Output, PrecompileError>
    where
        S: BlobStore + ?Sized,
        F: MachineFactory;
}

fn params(names: &[&str], types: Vec<ParamType>) -> Vec<Param> {
    names.iter().zip(types).map(|(name, ty)| Param::new(*name, ty)).collect()
}

/// Descriptor derived from a method's static schema.
pub fn descriptor<M: PrecompileMethod>() -> MethodDescriptor {
    MethodDescriptor {
        name: M::NAME.to_owned(),
        inputs: params(M::INPUT_NAMES, M::Args::param_types()),
        outputs: params(M::OUTPUT_NAMES, M::Output::param_types()),
        mutability: M::MUTABILITY,
    }
}

/// Selector of `M`'s canonical signature.
pub fn selector_of<M: PrecompileMethod>() -> Selector {
    descriptor::<M>().selector()
}

/// Full call payload (`selector || args`) for `M`.
pub fn encode_call<M: PrecompileMethod>(args: &M::Args) -> Result<Vec<u8>, EncodeError> {
    Ok(with_selector(selector_of::<M>(), &args.encode_params()?))
}

/// Decode the result payload of a successful `M` call.
pub fn decode_output<M: PrecompileMethod>(data: &[u8]) -> Result<M::Output, DecodeError> {
    M::Output::decode_params(data)
}

/// `run(bytes32 staticHash, bytes32 dynHash, (uint8,bool,uint32)[] activity)`.
#[derive(Debug, Clone, Copy)]
pub struct Run;

/// Arguments of [`Run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Root of the static machine state.
    pub static_root: PreimageHash,
    /// Root of the dynamic machine state.
    pub dynamic_root: PreimageHash,
    /// Events to replay, in order.
    pub activity: Vec<Action>,
}

type RunWire = ([u8; 32], [u8; 32], Vec<Action>);

impl AbiParams for RunArgs {
    fn param_types() -> Vec<ParamType> {
        RunWire::param_types()
    }

    fn decode_params(data: &[u8]) -> Result<Self, DecodeError> {
        let (static_root, dynamic_root, activity) = RunWire::decode_params(data)?;
        Ok(Self {
            static_root: PreimageHash(static_root),
            dynamic_root: PreimageHash(dynamic_root),
            activity,
        })
    }

    fn encode_params(&self) -> Result<Vec<u8>, EncodeError> {
        (self.static_root.0, self.dynamic_root.0, self.activity.clone()).encode_params()
    }
}

impl PrecompileMethod for Run {
    const NAME: &'static str = "run";
    const MUTABILITY: StateMutability = StateMutability::Nonpayable;
    const INPUT_NAMES: &'static [&'static str] = &["staticHash", "dynHash", "activity"];
    const OUTPUT_NAMES: &'static [&'static str] = &["newDynHash"];

    type Args = RunArgs;
    type Output = ([u8; 32],);

    fn required_cost(args: &RunArgs, gas: &GasSchedule) -> u64 {
        gas.run(&args.activity)
    }

    fn execute<S, F>(args: RunArgs, store: &mut S, replay: &ReplayEngine<F>) -> Result<Self::Output, PrecompileError>
    where
        S: BlobStore + ?Sized,
        F: MachineFactory,
    {
        let root = replay.run(store, args.static_root, args.dynamic_root, &args.activity)?;
        Ok((root.0,))
    }
}

/// `addPreimage(bytes preimage) -> bytes32`.
#[derive(Debug, Clone, Copy)]
pub struct AddPreimage;

/// Arguments of [`AddPreimage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPreimageArgs {
    /// Bytes to store.
    pub preimage: Vec<u8>,
}

impl AbiParams for AddPreimageArgs {
    fn param_types() -> Vec<ParamType> {
        <(Bytes,)>::param_types()
    }

    fn decode_params(data: &[u8]) -> Result<Self, DecodeError> {
        let (Bytes(preimage),) = <(Bytes,)>::decode_params(data)?;
        Ok(Self { preimage })
    }

    fn encode_params(&self) -> Result<Vec<u8>, EncodeError> {
        (Bytes(self.preimage.clone()),).encode_params()
    }
}

impl PrecompileMethod for AddPreimage {
    const NAME: &'static str = "addPreimage";
    const MUTABILITY: StateMutability = StateMutability::Nonpayable;
    const INPUT_NAMES: &'static [&'static str] = &["preimage"];
    const OUTPUT_NAMES: &'static [&'static str] = &["hash"];

    type Args = AddPreimageArgs;
    type Output = ([u8; 32],);

    fn required_cost(args: &AddPreimageArgs, gas: &GasSchedule) -> u64 {
        gas.add_preimage(args.preimage.len())
    }

    fn execute<S, F>(args: AddPreimageArgs, store: &mut S, _: &ReplayEngine<F>) -> Result<Self::Output, PrecompileError>
    where
        S: BlobStore + ?Sized,
        F: MachineFactory,
    {
        Ok((store.add(&args.preimage).0,))
    }
}

/// `getPreimageSize(bytes32 hash) -> uint256`.
#[derive(Debug, Clone, Copy)]
pub struct GetPreimageSize;

/// Arguments of [`GetPreimageSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPreimageSizeArgs {
    /// Preimage to measure.
    pub hash: PreimageHash,
}

impl AbiParams for GetPreimageSizeArgs {
    fn param_types() -> Vec<ParamType> {
        <([u8; 32],)>::param_types()
    }

    fn decode_params(data: &[u8]) -> Result<Self, DecodeError> {
        let (hash,) = <([u8; 32],)>::decode_params(data)?;
        Ok(Self {
            hash: PreimageHash(hash),
        })
    }

    fn encode_params(&self) -> Result<Vec<u8>, EncodeError> {
        (self.hash.0,).encode_params()
    }
}

impl PrecompileMethod for GetPreimageSize {
    const NAME: &'static str = "getPreimageSize";
    const MUTABILITY: StateMutability = StateMutability::View;
    const INPUT_NAMES: &'static [&'static str] = &["hash"];
    const OUTPUT_NAMES: &'static [&'static str] = &["size"];

    type Args = GetPreimageSizeArgs;
    type Output = (Uint256,);

    fn required_cost(_: &GetPreimageSizeArgs, gas: &GasSchedule) -> u64 {
        gas.get_preimage_size()
    }

    fn execute<S, F>(
        args: GetPreimageSizeArgs,
        store: &mut S,
        _: &ReplayEngine<F>,
    ) -> Result<Self::Output, PrecompileError>
    where
        S: BlobStore + ?Sized,
        F: MachineFactory,
    {
        if !store.has(&args.hash) {
            return Err(PrecompileError::NotFound(args.hash));
        }
        Ok((Uint256(store.size(&args.hash)?),))
    }
}

/// `getPreimage(uint256 expectedSize, bytes32 hash) -> bytes`.
#[derive(Debug, Clone, Copy)]
pub struct GetPreimage;

/// Arguments of [`GetPreimage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPreimageArgs {
    /// Size the caller asserts the preimage has.
    pub expected_size: u64,
    /// Preimage to read.
    pub hash: PreimageHash,
}

impl AbiParams for GetPreimageArgs {
    fn param_types() -> Vec<ParamType> {
        <(Uint256, [u8; 32])>::param_types()
    }

    fn decode_params(data: &[u8]) -> Result<Self, DecodeError> {
        let (Uint256(expected_size), hash) = <(Uint256, [u8; 32])>::decode_params(data)?;
        Ok(Self {
            expected_size,
            hash: PreimageHash(hash),
        })
    }

    fn encode_params(&self) -> Result<Vec<u8>, EncodeError> {
        (Uint256(self.expected_size), self.hash.0).encode_params()
    }
}

impl PrecompileMethod for GetPreimage {
    const NAME: &'static str = "getPreimage";
    const MUTABILITY: StateMutability = StateMutability::View;
    const INPUT_NAMES: &'static [&'static str] = &["expectedSize", "hash"];
    const OUTPUT_NAMES: &'static [&'static str] = &["preimage"];

    type Args = GetPreimageArgs;
    type Output = (Bytes,);

    fn required_cost(args: &GetPreimageArgs, gas: &GasSchedule) -> u64 {
        gas.get_preimage(args.expected_size)
    }

    fn execute<S, F>(args: GetPreimageArgs, store: &mut S, _: &ReplayEngine<F>) -> Result<Self::Output, PrecompileError>
    where
        S: BlobStore + ?Sized,
        F: MachineFactory,
    {
        if !store.has(&args.hash) {
            return Err(PrecompileError::NotFound(args.hash));
        }
        let actual = store.size(&args.hash)?;
        if actual != args.expected_size {
            return Err(PrecompileError::SizeMismatch {
                expected: args.expected_size,
                actual,
            });
        }
        Ok((Bytes(store.get(&args.hash)?.to_vec()),))
    }
}

/// The closed set of methods a descriptor can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Handler {
    /// [`Run`].
    Run,
    /// [`AddPreimage`].
    AddPreimage,
    /// [`GetPreimageSize`].
    GetPreimageSize,
    /// [`GetPreimage`].
    GetPreimage,
}

/// Evaluate `$body` with `$m` aliased to the method type behind `$handler`.
macro_rules! with_method {
    ($handler:expr, $m:ident => $body:expr) => {
        match $handler {
            $crate::methods::Handler::Run => {
                type $m = $crate::methods::Run;
                $body
            }
            $crate::methods::Handler::AddPreimage => {
                type $m = $crate::methods::AddPreimage;
                $body
            }
            $crate::methods::Handler::GetPreimageSize => {
                type $m = $crate::methods::GetPreimageSize;
                $body
            }
            $crate::methods::Handler::GetPreimage => {
                type $m = $crate::methods::GetPreimage;
                $body
            }
        }
    };
}
pub(crate) use with_method;

impl Handler {
    /// Every handler, in declaration order.
    pub const ALL: [Self; 4] = [Self::Run, Self::AddPreimage, Self::GetPreimageSize, Self::GetPreimage];

    /// Handler bound to a method name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|handler| handler.name() == name)
    }

    /// Method name.
    pub fn name(self) -> &'static str {
        with_method!(self, M => M::NAME)
    }

    /// Declared mutability.
    pub fn mutability(self) -> StateMutability {
        with_method!(self, M => M::MUTABILITY)
    }

    /// Descriptor derived from the static schema.
    pub fn descriptor(self) -> MethodDescriptor {
        with_method!(self, M => descriptor::<M>())
    }
}

/// Interface listing every built-in method.
pub fn standard_interface() -> Result<Interface, InterfaceError> {
    Interface::new(Handler::ALL.into_iter().map(Handler::descriptor).collect())
}
