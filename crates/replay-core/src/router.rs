// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Selector dispatch.

use std::collections::BTreeMap;

use replay_abi::{split_selector, AbiParams, Interface, Selector};
use replay_cas::{BlobStore, StagedTier};
use tracing::{debug, instrument, warn};

use crate::config::EngineConfig;
use crate::cost::GasSchedule;
use crate::error::{PrecompileError, RouterError};
use crate::machine::MachineFactory;
use crate::methods::{standard_interface, with_method, Handler, PrecompileMethod};
use crate::replay::ReplayEngine;

/// Fixed selector table bound to typed handlers.
///
/// Built once; the table never changes afterwards. Queries
/// ([`mutates_state`](Self::mutates_state), [`required_cost`](Self::required_cost))
/// fall back to `false` / `0` on unroutable payloads, while
/// [`execute`](Self::execute) fails with [`PrecompileError::InvalidSelector`].
#[derive(Debug)]
pub struct MethodRouter<F> {
    routes: BTreeMap<Selector, Handler>,
    gas: GasSchedule,
    replay: ReplayEngine<F>,
}

impl<F: MachineFactory> MethodRouter<F> {
    /// Bind every method in `interface` to its handler.
    ///
    /// Fails if a method has no handler, if its declared types or mutability
    /// disagree with the handler, or if two methods share a selector.
    pub fn new(interface: &Interface, config: &EngineConfig, factory: F) -> Result<Self, RouterError> {
        let mut routes = BTreeMap::new();
        for method in interface.methods() {
            let handler = Handler::from_name(&method.name)
                .ok_or_else(|| RouterError::MissingHandler(method.name.clone()))?;
            let expected = handler.descriptor();
            if method.input_types() != expected.input_types() || method.output_types() != expected.output_types() {
                return Err(RouterError::SchemaMismatch {
                    method: method.name.clone(),
                    declared: method.signature(),
                    expected: expected.signature(),
                });
            }
            if method.mutability.mutates_state() != expected.mutability.mutates_state() {
                return Err(RouterError::MutabilityMismatch {
                    method: method.name.clone(),
                    declared: method.mutability.mutates_state(),
                });
            }
            let selector = method.selector();
            if let Some(first) = routes.insert(selector, handler) {
                return Err(RouterError::SelectorCollision {
                    selector,
                    first: first.name().to_owned(),
                    second: method.name.clone(),
                });
            }
        }
        debug!(methods = routes.len(), "router built");
        Ok(Self {
            routes,
            gas: config.gas,
            replay: ReplayEngine::new(factory, config),
        })
    }

    /// Router over every built-in method.
    pub fn standard(config: &EngineConfig, factory: F) -> Result<Self, RouterError> {
        Self::new(&standard_interface()?, config, factory)
    }

    /// Registered selectors and their handlers, ordered by selector.
    pub fn routes(&self) -> impl Iterator<Item = (&Selector, &Handler)> {
        self.routes.iter()
    }

    fn route<'p>(&self, payload: &'p [u8]) -> Option<(Handler, &'p [u8])> {
        let (selector, args) = split_selector(payload)?;
        self.routes.get(&selector).map(|handler| (*handler, args))
    }

    /// Whether executing `payload` may write to the store.
    ///
    /// Unroutable payloads report `false`.
    pub fn mutates_state(&self, payload: &[u8]) -> bool {
        self.route(payload).map_or_else(
            || {
                warn!(len = payload.len(), "mutates_state: unknown selector, defaulting to false");
                false
            },
            |(handler, _)| handler.mutability().mutates_state(),
        )
    }

    /// Pre-flight cost of executing `payload`.
    ///
    /// Unroutable payloads and undecodable arguments cost `0`.
    pub fn required_cost(&self, payload: &[u8]) -> u64 {
        let Some((handler, args)) = self.route(payload) else {
            warn!(len = payload.len(), "required_cost: unknown selector, defaulting to 0");
            return 0;
        };
        let cost = with_method!(handler, M => self.cost_of::<M>(args));
        debug!(method = handler.name(), cost, "required_cost");
        cost
    }

    fn cost_of<M: PrecompileMethod>(&self, args: &[u8]) -> u64 {
        M::Args::decode_params(args).map_or(0, |args| M::required_cost(&args, &self.gas))
    }

    /// Decode, run and encode one call against `store`.
    ///
    /// Writes go straight to `store`; see [`execute_staged`](Self::execute_staged)
    /// for all-or-nothing semantics.
    #[instrument(skip_all, fields(len = payload.len()))]
    pub fn execute<S: BlobStore + ?Sized>(&self, store: &mut S, payload: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let Some((handler, args)) = self.route(payload) else {
            return Err(PrecompileError::InvalidSelector {
                selector: split_selector(payload).map(|(selector, _)| selector),
            });
        };
        debug!(method = handler.name(), "dispatch");
        with_method!(handler, M => self.call::<M, S>(store, args))
    }

    fn call<M: PrecompileMethod, S: BlobStore + ?Sized>(&self, store: &mut S, args: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let args = M::Args::decode_params(args)?;
        let output = M::execute(args, store, &self.replay)?;
        Ok(output.encode_params()?)
    }

    /// Like [`execute`](Self::execute), but buffers writes and applies them
    /// only if the call succeeds.
    pub fn execute_staged<S: BlobStore>(&self, store: &mut S, payload: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let mut staged = StagedTier::new(&mut *store);
        let output = self.execute(&mut staged, payload)?;
        let pending = staged.pending_len();
        staged.commit();
        debug!(pending, "staged writes committed");
        Ok(output)
    }
}
