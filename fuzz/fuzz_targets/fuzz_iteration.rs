#![no_main]

//! Whole-iteration fuzzer.
//!
//! Builds a world from fuzzer-chosen positions and gold, then drives it with
//! fuzzer-chosen factors (out-of-range ones included). A failed iteration
//! must leave the world untouched; a successful one must keep every horizon
//! invariant and conserve total gold.

use arbitrary::Arbitrary;
use creature_horizon::simulation::{check_invariants, total_gold};
use creature_horizon::{
    CreatureCluster, CreatureUnit, Entity, Guardian, Horizon, SequenceRandom, Simulation,
};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated entity.
#[derive(Arbitrary, Debug, Clone, Copy)]
struct FuzzEntity {
    cluster: bool,
    x: i32,
    gold: u32,
}

/// Structured input for iteration fuzzing.
#[derive(Arbitrary, Debug)]
struct IterationInput {
    entities: Vec<FuzzEntity>,
    guardian_x: i32,
    guardian_gold: u32,
    factors: Vec<f64>,
    iterations: u8,
}

fuzz_target!(|input: IterationInput| {
    let entities: Vec<Entity> = input
        .entities
        .iter()
        .take(32)
        .zip(1u32..)
        .map(|(e, id)| {
            let (x, gold) = (f64::from(e.x), f64::from(e.gold));
            if e.cluster {
                Entity::from(CreatureCluster::with_state(id, x, gold))
            } else {
                Entity::from(CreatureUnit::with_state(id, x, gold))
            }
        })
        .collect();
    let guardian_id = u32::try_from(entities.len()).unwrap_or(u32::MAX - 1) + 1;
    let guardian = Guardian::with_state(
        guardian_id,
        f64::from(input.guardian_x),
        f64::from(input.guardian_gold),
    );

    let mut horizon = Horizon::new(entities, Some(guardian));
    let initial = total_gold(&horizon);
    let mut simulation = Simulation::new(SequenceRandom::new(input.factors));

    for _ in 0..input.iterations.min(64) {
        let before = horizon.clone();
        match simulation.run_iteration(&mut horizon) {
            Ok(outcome) => {
                assert_eq!(outcome.entities_remaining, horizon.len());
                let violations = check_invariants(&horizon);
                assert!(violations.is_empty(), "Invariants violated: {violations:?}");
                assert!(
                    (total_gold(&horizon) - initial).abs() <= initial.max(1.0) * 1e-9,
                    "gold not conserved"
                );
            }
            Err(_) => {
                assert_eq!(horizon, before, "failed iteration changed the world");
                if horizon.status().is_terminal() {
                    break;
                }
            }
        }
    }
});
