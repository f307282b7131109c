// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Creature Horizon: a deterministic one-dimensional creature economy.
//!
//! Creatures carrying gold random-walk along an infinite line. Creatures that
//! meet fuse into clusters, survivors rob their nearest neighbor, and a
//! guardian hunts clusters. A simulation succeeds once the guardian is richer
//! than whatever is left.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Batch Runner (rayon)            │
//! ├─────────────────────────────────────┤
//! │     Simulation Engine               │
//! ├─────────────────────────────────────┤
//! │     Horizon + Entities              │
//! ├─────────────────────────────────────┤
//! │     RandomPort (factor source)      │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use creature_horizon::{Simulation, SimulationConfig, XorShiftRandom};
//!
//! let mut simulation = Simulation::new(XorShiftRandom::new(42));
//! let config = SimulationConfig { creatures: 5, max_iterations: 1_000 };
//! let run = simulation.run_full_simulation(&config).unwrap();
//! assert!(run.iterations <= 1_000);
//! ```

pub mod batch;
pub mod entity;
pub mod error;
pub mod horizon;
pub mod random;
pub mod simulation;

pub use error::{ErrorKind, SimResult, SimulationError};

// Re-export key types at crate root for convenience
pub use batch::{BatchConfig, BatchStats, run_batch, run_seeded};
pub use entity::{
    CreatureCluster, CreatureUnit, Entity, EntityId, EntityKey, EntityKind, Fusion, Guardian,
    HorizonEntity, LoseGold, Move, StealGold,
};
pub use horizon::{COLLISION_RANGE, Horizon, ParseStatusError, SimulationStatus};
pub use random::{RandomPort, SequenceRandom, XorShiftRandom};
pub use simulation::{IterationOutcome, Simulation, SimulationConfig, SimulationRun};
