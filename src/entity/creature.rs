//! Creatures: individual units and the clusters they fuse into.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Fusion, HorizonEntity, LoseGold, Move, StealGold};

/// Gold every creature starts with.
pub const INITIAL_CREATURE_GOLD: f64 = 1_000_000.0;

/// An individual creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreatureUnit {
    id: EntityId,
    x: f64,
    gold: f64,
}

impl CreatureUnit {
    /// Create a creature at the origin holding [`INITIAL_CREATURE_GOLD`].
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            x: 0.0,
            gold: INITIAL_CREATURE_GOLD,
        }
    }

    /// Create a creature with explicit position and gold.
    #[must_use]
    pub const fn with_state(id: EntityId, x: f64, gold: f64) -> Self {
        Self { id, x, gold }
    }
}

impl_horizon_entity!(CreatureUnit);

impl Move for CreatureUnit {}
impl StealGold for CreatureUnit {}
impl LoseGold for CreatureUnit {}

/// A group of creatures produced by fusion.
///
/// Clusters behave like units and can additionally absorb other entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreatureCluster {
    id: EntityId,
    x: f64,
    gold: f64,
}

impl CreatureCluster {
    /// Create an empty cluster at the origin.
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            x: 0.0,
            gold: 0.0,
        }
    }

    /// Create a cluster with explicit position and gold.
    #[must_use]
    pub const fn with_state(id: EntityId, x: f64, gold: f64) -> Self {
        Self { id, x, gold }
    }

    /// Start a cluster from `seed`, inheriting its id, position and gold.
    #[must_use]
    pub fn seeded_from(seed: &dyn HorizonEntity) -> Self {
        Self::with_state(seed.id(), seed.x(), seed.gold())
    }
}

impl_horizon_entity!(CreatureCluster);

impl Move for CreatureCluster {}
impl StealGold for CreatureCluster {}
impl LoseGold for CreatureCluster {}
impl Fusion for CreatureCluster {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_creation() {
        let unit = CreatureUnit::new(3);
        assert_eq!(unit.id(), 3);
        assert!(unit.x().abs() < f64::EPSILON);
        assert!((unit.gold() - 1_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_cluster() {
        let cluster = CreatureCluster::new(8);
        assert_eq!(cluster.id(), 8);
        assert!(cluster.gold().abs() < f64::EPSILON);
    }

    #[test]
    fn test_seeded_cluster_inherits_state() {
        let seed = CreatureUnit::with_state(5, -120.5, 330.0);
        let cluster = CreatureCluster::seeded_from(&seed);

        assert_eq!(cluster.id(), 5);
        assert!((cluster.x() + 120.5).abs() < f64::EPSILON);
        assert!((cluster.gold() - 330.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cluster_absorbs_several() {
        let mut cluster = CreatureCluster::with_state(1, 0.0, 100.0);
        for (id, gold) in [(2, 200.0), (3, 300.0), (4, 0.0)] {
            cluster.fuse(&CreatureUnit::with_state(id, 0.0, gold)).unwrap();
        }
        assert!((cluster.gold() - 600.0).abs() < f64::EPSILON);
    }
}
