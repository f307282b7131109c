//! The guardian: a fixed predator that feeds on clusters.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Move, StealGold};

/// Starting position of the guardian, far outside the creatures' collision
/// neighborhood.
pub const GUARDIAN_START_X: f64 = 5_000_000.0;

/// Predator entity. It moves and steals like a creature but cannot lose gold,
/// so it only ever grows richer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    id: EntityId,
    x: f64,
    gold: f64,
}

impl Guardian {
    /// Create a guardian at [`GUARDIAN_START_X`] with no gold.
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            x: GUARDIAN_START_X,
            gold: 0.0,
        }
    }

    /// Create a guardian with explicit position and gold.
    #[must_use]
    pub const fn with_state(id: EntityId, x: f64, gold: f64) -> Self {
        Self { id, x, gold }
    }
}

impl_horizon_entity!(Guardian);

impl Move for Guardian {}
impl StealGold for Guardian {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::HorizonEntity;

    #[test]
    fn test_guardian_creation() {
        let guardian = Guardian::new(11);
        assert_eq!(guardian.id(), 11);
        assert!((guardian.x() - GUARDIAN_START_X).abs() < f64::EPSILON);
        assert!(guardian.gold().abs() < f64::EPSILON);
    }

    #[test]
    fn test_guardian_moves_by_its_gold() {
        let mut guardian = Guardian::with_state(1, 100.0, 0.0);
        guardian.move_by(1.0).unwrap();
        assert!((guardian.x() - 100.0).abs() < f64::EPSILON);

        guardian.steal_gold(50.0).unwrap();
        guardian.move_by(-0.5).unwrap();
        assert!((guardian.x() - 75.0).abs() < f64::EPSILON);
    }
}
