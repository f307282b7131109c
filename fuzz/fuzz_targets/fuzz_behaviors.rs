#![no_main]

//! Capability fuzzer.
//!
//! Feeds arbitrary floats, NaN and infinities included, to every entity
//! capability. Each call must either succeed with a sane result or fail
//! without touching the entity.

use arbitrary::Arbitrary;
use creature_horizon::{
    CreatureCluster, CreatureUnit, Fusion, HorizonEntity, LoseGold, Move, StealGold,
};
use libfuzzer_sys::fuzz_target;

/// A single capability call.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum Op {
    Move(f64),
    Lose(f64),
    Steal(f64),
    Fuse(f64),
}

/// Structured input for capability fuzzing.
#[derive(Arbitrary, Debug)]
struct BehaviorInput {
    x: f64,
    gold: f64,
    ops: Vec<Op>,
}

fuzz_target!(|input: BehaviorInput| {
    let mut cluster = CreatureCluster::with_state(1, input.x, input.gold);

    for op in input.ops.into_iter().take(256) {
        let before = cluster;
        let result = match op {
            Op::Move(factor) => cluster.move_by(factor).map(|_| ()),
            Op::Lose(percentage) => cluster.lose_gold(percentage).map(|lost| {
                assert!(lost >= 0.0, "lost negative gold {lost}");
            }),
            Op::Steal(amount) => cluster.steal_gold(amount).map(|credited| {
                assert!(credited >= 0.0, "credited negative gold {credited}");
            }),
            Op::Fuse(gold) => cluster
                .fuse(&CreatureUnit::with_state(2, 0.0, gold))
                .map(|_| ()),
        };

        if result.is_err() {
            assert_eq!(
                (cluster.x().to_bits(), cluster.gold().to_bits()),
                (before.x().to_bits(), before.gold().to_bits()),
                "failed {op:?} changed the entity"
            );
        }
        if matches!(op, Op::Move(_)) {
            assert_eq!(cluster.gold().to_bits(), before.gold().to_bits(), "move changed gold");
        }
    }
});
