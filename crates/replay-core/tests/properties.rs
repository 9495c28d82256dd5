// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cost monotonicity and router totality.
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use replay_cas::{MemoryTier, PreimageHash};
use replay_core::{Action, EngineConfig, GasSchedule, MethodRouter};
use replay_dry_tests::{run_call, TickFactory};

fn action() -> impl Strategy<Value = Action> {
    (any::<u8>(), any::<bool>(), 0u32..10_000).prop_map(|(c, p, d)| Action::new(c, p, d))
}

proptest! {
    #[test]
    fn appending_an_event_never_lowers_cost(
        activity in prop::collection::vec(action(), 0..32),
        extra in action(),
    ) {
        let gas = GasSchedule::default();
        let mut longer = activity.clone();
        longer.push(extra);
        prop_assert!(gas.run(&longer) >= gas.run(&activity));
    }

    #[test]
    fn lengthening_an_event_never_lowers_cost(
        activity in prop::collection::vec(action(), 1..32),
        index in any::<prop::sample::Index>(),
        bump in 0u32..1_000_000,
    ) {
        let gas = GasSchedule::default();
        let mut longer = activity.clone();
        let slot = &mut longer[index.index(activity.len())];
        slot.duration = slot.duration.saturating_add(bump);
        prop_assert!(gas.run(&longer) >= gas.run(&activity));
    }

    #[test]
    fn router_cost_agrees_with_schedule(activity in prop::collection::vec(action(), 0..16)) {
        let router = MethodRouter::standard(&EngineConfig::default(), TickFactory).unwrap();
        let call = run_call(PreimageHash::default(), PreimageHash::default(), &activity).unwrap();
        prop_assert_eq!(router.required_cost(&call), GasSchedule::default().run(&activity));
    }

    #[test]
    fn router_is_total_on_arbitrary_payloads(payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let router = MethodRouter::standard(&EngineConfig::default(), TickFactory).unwrap();
        let mut store = MemoryTier::new();
        let _ = router.mutates_state(&payload);
        let _ = router.required_cost(&payload);
        let _ = router.execute(&mut store, &payload);
    }
}
