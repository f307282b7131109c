//! The horizon: every active entity, the guardian and the simulation status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{CreatureUnit, Entity, EntityId, EntityKey, Guardian, HorizonEntity};
use crate::error::{SimResult, SimulationError};

/// Radius within which entities are considered to be at the same place.
pub const COLLISION_RANGE: f64 = 25_000.0;

/// Lifecycle of a simulation.
///
/// `Running` is the only non-terminal status. Once a simulation is
/// `Successful` or `Failed` it never runs again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimulationStatus {
    /// More iterations are needed.
    #[default]
    Running,
    /// The guardian ended up richer than every survivor.
    Successful,
    /// A survivor ended up at least as rich as the guardian.
    Failed,
}

impl SimulationStatus {
    /// Whether no further iteration is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Successful => "Successful",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown simulation status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for SimulationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Running, Self::Successful, Self::Failed]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Complete snapshot of a simulated world.
///
/// Entities are kept in creation and fusion order, not in spatial order. That
/// order decides every "first match" rule in the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Horizon {
    entities: Vec<Entity>,
    guardian: Option<Guardian>,
    status: SimulationStatus,
}

impl Horizon {
    /// Create a running horizon from existing parts.
    ///
    /// A guardian also listed among `entities` is tracked: the list entry
    /// takes the guardian's state.
    #[must_use]
    pub fn new(entities: Vec<Entity>, guardian: Option<Guardian>) -> Self {
        let mut horizon = Self {
            entities,
            guardian,
            status: SimulationStatus::Running,
        };
        horizon.sync_tracked_guardian();
        horizon
    }

    /// Create a running horizon with `count` creatures (ids `1..=count`) and a
    /// guardian with id `guardian_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidCreatureCount`] if `count` is zero.
    pub fn populated(count: usize, guardian_id: EntityId) -> SimResult<Self> {
        let invalid = SimulationError::InvalidCreatureCount {
            count,
            min: 1,
            max: EntityId::MAX as usize,
        };
        if count == 0 {
            return Err(invalid);
        }
        let ids = EntityId::try_from(count).map_err(|_| invalid)?;

        let entities = (1..=ids).map(|id| Entity::from(CreatureUnit::new(id))).collect();
        Ok(Self::new(entities, Some(Guardian::new(guardian_id))))
    }

    /// Active entities in list order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable access to the active entities. The list itself can only grow or
    /// shrink through [`Horizon::add_entity`] and the removal methods.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Number of active entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The guardian, if present.
    #[must_use]
    pub const fn guardian(&self) -> Option<&Guardian> {
        self.guardian.as_ref()
    }

    /// Mutable access to the guardian, if present.
    pub fn guardian_mut(&mut self) -> Option<&mut Guardian> {
        self.guardian.as_mut()
    }

    /// Identity of the guardian, if present.
    #[must_use]
    pub fn guardian_key(&self) -> Option<EntityKey> {
        self.guardian.map(|g| Entity::Guardian(g).key())
    }

    /// Whether `entity` is the guardian, tracked as a regular entity or not.
    #[must_use]
    pub fn is_guardian(&self, entity: &Entity) -> bool {
        self.guardian_key() == Some(entity.key())
    }

    /// State of `entity` as seen by the engine.
    ///
    /// The guardian is authoritative: a tracked copy resolves to the
    /// guardian's current state. Every other entity is returned as is.
    #[must_use]
    pub fn current_state(&self, entity: &Entity) -> Entity {
        match self.guardian {
            Some(guardian) if self.is_guardian(entity) => Entity::Guardian(guardian),
            _ => *entity,
        }
    }

    /// Copy the guardian's state onto every list entry tracking it.
    pub fn sync_tracked_guardian(&mut self) {
        let Some(guardian) = self.guardian else {
            return;
        };
        let current = Entity::Guardian(guardian);
        for entity in &mut self.entities {
            if entity.is_same(&current) {
                *entity = current;
            }
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> SimulationStatus {
        self.status
    }

    /// Move to `next`.
    ///
    /// Staying in the same status is always allowed; a terminal status can
    /// never be left.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidTransition`] when leaving a terminal
    /// status.
    pub fn transition(&mut self, next: SimulationStatus) -> SimResult<()> {
        if self.status.is_terminal() && next != self.status {
            return Err(SimulationError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Whether an entity with this identity is active.
    #[must_use]
    pub fn contains(&self, key: EntityKey) -> bool {
        self.index_of(key).is_some()
    }

    /// Current state of the active entity with this identity.
    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.iter().find(|e| e.key() == key)
    }

    /// Mutable access to the active entity with this identity.
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.key() == key)
    }

    pub(crate) fn index_of(&self, key: EntityKey) -> Option<usize> {
        self.entities.iter().position(|e| e.key() == key)
    }

    /// Append an entity.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::DuplicateEntity`] if an entity with the same
    /// id is already active.
    pub fn add_entity(&mut self, entity: Entity) -> SimResult<()> {
        if self.entities.iter().any(|e| e.id() == entity.id()) {
            return Err(SimulationError::DuplicateEntity(entity.id()));
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Remove the entity with the same identity as `entity`.
    ///
    /// Returns the removed value, or `None` if it was not active.
    pub fn remove_entity(&mut self, entity: &Entity) -> Option<Entity> {
        let index = self.index_of(entity.key())?;
        Some(self.entities.remove(index))
    }

    /// Remove every entity sharing an identity with one in `to_remove`.
    ///
    /// Returns how many entities were removed.
    pub fn remove_entities(&mut self, to_remove: &[Entity]) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !to_remove.iter().any(|r| r.is_same(e)));
        before - self.entities.len()
    }

    /// Entities located exactly at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidPosition`] for NaN or infinite
    /// positions.
    #[allow(clippy::float_cmp)]
    pub fn entities_at(&self, position: f64) -> SimResult<Vec<Entity>> {
        if !position.is_finite() {
            return Err(SimulationError::InvalidPosition(position));
        }
        Ok(self
            .entities
            .iter()
            .filter(|e| e.x() == position)
            .copied()
            .collect())
    }

    /// Entities with `|x - center| <= range`, in list order.
    ///
    /// The guardian is appended when it is within range, unless it is already
    /// tracked as a regular entity. Either way it is matched on its own
    /// position, never on a stale list copy.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidPosition`] for a non-finite center and
    /// [`SimulationError::InvalidRange`] for a negative or non-finite range.
    pub fn entities_within_range(&self, center: f64, range: f64) -> SimResult<Vec<Entity>> {
        if !center.is_finite() {
            return Err(SimulationError::InvalidPosition(center));
        }
        if !range.is_finite() || range < 0.0 {
            return Err(SimulationError::InvalidRange(range));
        }

        let within = |e: &Entity| (e.x() - center).abs() <= range;
        let mut found: Vec<Entity> = self
            .entities
            .iter()
            .map(|e| self.current_state(e))
            .filter(within)
            .collect();

        let tracked = self.entities.iter().any(|e| self.is_guardian(e));
        let untracked = self.guardian.filter(|_| !tracked).map(Entity::Guardian);
        if let Some(guardian) = untracked.filter(within) {
            found.push(guardian);
        }

        Ok(found)
    }

    /// Sum of the gold held by active entities, guardian excluded even when
    /// tracked.
    #[must_use]
    pub fn entity_gold(&self) -> f64 {
        self.entities
            .iter()
            .filter(|e| !self.is_guardian(e))
            .map(HorizonEntity::gold)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CreatureCluster;

    fn unit(id: EntityId, x: f64, gold: f64) -> Entity {
        Entity::from(CreatureUnit::with_state(id, x, gold))
    }

    fn spread_horizon() -> Horizon {
        Horizon::new(
            vec![
                unit(1, 10.0, 100.0),
                unit(2, 15.0, 100.0),
                unit(3, 20.0, 100.0),
                unit(4, 21.0, 100.0),
            ],
            Some(Guardian::with_state(9, 40.0, 0.0)),
        )
    }

    #[test]
    fn test_populated() {
        let horizon = Horizon::populated(5, 6).unwrap();
        assert_eq!(horizon.len(), 5);
        assert_eq!(horizon.status(), SimulationStatus::Running);
        assert_eq!(horizon.guardian().unwrap().id(), 6);
        let ids: Vec<_> = horizon.entities().iter().map(HorizonEntity::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_populated_rejects_zero() {
        assert!(Horizon::populated(0, 1).is_err());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut horizon = Horizon::new(vec![unit(1, 0.0, 1.0)], None);
        let err = horizon
            .add_entity(Entity::from(CreatureCluster::new(1)))
            .unwrap_err();
        assert_eq!(err, SimulationError::DuplicateEntity(1));
        assert_eq!(horizon.len(), 1);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut horizon = spread_horizon();
        let cluster_with_same_id = Entity::from(CreatureCluster::new(1));

        assert!(horizon.remove_entity(&cluster_with_same_id).is_none());
        assert_eq!(horizon.len(), 4);

        let removed = horizon.remove_entity(&unit(1, 0.0, 0.0)).unwrap();
        assert_eq!(removed.id(), 1);
        assert_eq!(horizon.len(), 3);
    }

    #[test]
    fn test_remove_entities() {
        let mut horizon = spread_horizon();
        let to_remove = [unit(2, 0.0, 0.0), unit(4, 0.0, 0.0), unit(99, 0.0, 0.0)];
        assert_eq!(horizon.remove_entities(&to_remove), 2);

        let ids: Vec<_> = horizon.entities().iter().map(HorizonEntity::id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_entities_at_exact_match() {
        let horizon = spread_horizon();
        let found = horizon.entities_at(15.0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), 2);
        assert!(horizon.entities_at(15.000_001).unwrap().is_empty());
    }

    #[test]
    fn test_entities_at_rejects_non_finite() {
        let horizon = spread_horizon();
        assert!(horizon.entities_at(f64::NAN).is_err());
        assert!(horizon.entities_at(f64::INFINITY).is_err());
    }

    #[test]
    fn test_range_is_inclusive() {
        let horizon = spread_horizon();
        let found = horizon.entities_within_range(15.0, 5.0).unwrap();
        let ids: Vec<_> = found.iter().map(HorizonEntity::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_range_is_exact_search() {
        let horizon = spread_horizon();
        let found = horizon.entities_within_range(10.0, 0.0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), 1);
    }

    #[test]
    fn test_range_includes_guardian() {
        let horizon = spread_horizon();
        let found = horizon.entities_within_range(40.0, 1.0).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].is_guardian());
    }

    #[test]
    fn test_range_does_not_duplicate_tracked_guardian() {
        let mut horizon = spread_horizon();
        let guardian = *horizon.guardian().unwrap();
        horizon.add_entity(Entity::from(guardian)).unwrap();

        let found = horizon.entities_within_range(40.0, 1.0).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_range_uses_real_guardian_position() {
        let stale = Guardian::with_state(9, 0.0, 0.0);
        let mut horizon = Horizon::new(
            vec![unit(1, 10.0, 100.0)],
            Some(Guardian::with_state(9, 5_000_000.0, 0.0)),
        );
        horizon.entities.push(Entity::from(stale));

        let near_copy = horizon.entities_within_range(0.0, 100.0).unwrap();
        assert_eq!(near_copy.len(), 1);
        assert_eq!(near_copy[0].id(), 1);

        let near_guardian = horizon.entities_within_range(5_000_000.0, 1.0).unwrap();
        assert_eq!(near_guardian.len(), 1);
        assert!(near_guardian[0].is_guardian());
        assert!((near_guardian[0].x() - 5_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_syncs_tracked_guardian() {
        let horizon = Horizon::new(
            vec![unit(1, 0.0, 100.0), Entity::from(Guardian::with_state(9, 0.0, 0.0))],
            Some(Guardian::with_state(9, 40.0, 70.0)),
        );

        let tracked = horizon.entities()[1];
        assert!(horizon.is_guardian(&tracked));
        assert!((tracked.x() - 40.0).abs() < f64::EPSILON);
        assert!((tracked.gold() - 70.0).abs() < f64::EPSILON);
        assert!((horizon.entity_gold() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_range_accepts_negative_center() {
        let horizon = Horizon::new(vec![unit(1, -30.0, 1.0)], None);
        assert_eq!(horizon.entities_within_range(-25.0, 5.0).unwrap().len(), 1);
    }

    #[test]
    fn test_range_rejects_bad_arguments() {
        let horizon = spread_horizon();
        assert!(matches!(
            horizon.entities_within_range(f64::NAN, 5.0),
            Err(SimulationError::InvalidPosition(_))
        ));
        assert!(matches!(
            horizon.entities_within_range(10.0, -5.0),
            Err(SimulationError::InvalidRange(_))
        ));
        assert!(matches!(
            horizon.entities_within_range(10.0, f64::INFINITY),
            Err(SimulationError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_range_query_leaves_horizon_unchanged() {
        let horizon = spread_horizon();
        let before = horizon.clone();
        let _ = horizon.entities_within_range(15.0, 10.0).unwrap();
        assert_eq!(horizon, before);
    }

    #[test]
    fn test_status_transitions() {
        let mut horizon = Horizon::default();
        horizon.transition(SimulationStatus::Running).unwrap();
        horizon.transition(SimulationStatus::Failed).unwrap();
        horizon.transition(SimulationStatus::Failed).unwrap();
        assert_eq!(
            horizon.transition(SimulationStatus::Running),
            Err(SimulationError::InvalidTransition {
                from: SimulationStatus::Failed,
                to: SimulationStatus::Running,
            })
        );
        assert!(horizon.transition(SimulationStatus::Successful).is_err());
    }

    #[test]
    fn test_status_text() {
        assert_eq!(SimulationStatus::Successful.to_string(), "Successful");
        assert_eq!("failed".parse::<SimulationStatus>().unwrap(), SimulationStatus::Failed);
        assert_eq!(" RUNNING ".parse::<SimulationStatus>().unwrap(), SimulationStatus::Running);
        assert!("done".parse::<SimulationStatus>().is_err());
    }
}
