//! Local interactions: predation, fusion, neighbor theft and the status rule.

use tracing::trace;

use crate::entity::{CreatureCluster, Entity, EntityId, EntityKey, Fusion, HorizonEntity, StealGold};
use crate::error::SimResult;
use crate::horizon::{COLLISION_RANGE, Horizon, SimulationStatus};
use crate::simulation::THEFT_PERCENTAGE;

/// What happened when interactions were resolved at a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Nothing changed.
    Quiet,
    /// The guardian consumed a cluster.
    Predation {
        /// Id of the consumed cluster.
        cluster: EntityId,
        /// Gold moved to the guardian.
        gold: f64,
    },
    /// Entities fused into a single cluster.
    Fusion {
        /// Id of the resulting cluster.
        cluster: EntityId,
        /// Number of entities absorbed into it.
        absorbed: usize,
        /// Whether the cluster was created by this fusion.
        created: bool,
    },
}

/// Outcome of [`resolve_interactions_at`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// State of the entity left standing, if anything was in range.
    pub survivor: Option<Entity>,
    /// What changed.
    pub resolution: Resolution,
}

impl Interaction {
    const fn quiet(survivor: Option<Entity>) -> Self {
        Self {
            survivor,
            resolution: Resolution::Quiet,
        }
    }
}

/// A completed neighbor theft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theft {
    /// Identity of the thief.
    pub thief: EntityKey,
    /// Identity of the victim.
    pub victim: EntityKey,
    /// Gold moved from victim to thief.
    pub amount: f64,
}

/// Resolve the interactions among everything within [`COLLISION_RANGE`] of
/// `position`.
///
/// Rules, in priority order:
///
/// 1. If the guardian itself and at least one cluster are in range, the guardian
///    takes all the gold of the first cluster in list order, which is removed.
///    The guardian survives.
/// 2. With at most one entity in range nothing happens; it survives.
/// 3. Otherwise every in-range entity except a guardian fuses. The first
///    cluster among them absorbs the rest. With no cluster, a new one is
///    seeded from the first entity (inheriting its id, position and gold),
///    absorbs the others, and replaces them at the end of the list. Fewer
///    than two fusion candidates leave the horizon untouched.
///
/// # Errors
///
/// Returns [`crate::SimulationError::InvalidPosition`] for a non-finite position, or
/// the error of a gold transfer involving non-finite gold. On error the
/// horizon is unchanged.
pub fn resolve_interactions_at(horizon: &mut Horizon, position: f64) -> SimResult<Interaction> {
    let in_range = horizon.entities_within_range(position, COLLISION_RANGE)?;

    let guardian_present = horizon
        .guardian()
        .is_some_and(|g| (g.x() - position).abs() <= COLLISION_RANGE);
    let prey = if guardian_present {
        in_range.iter().find(|e| e.is_cluster()).copied()
    } else {
        None
    };
    if let Some(victim) = prey {
        return consume_cluster(horizon, &victim);
    }

    if in_range.len() <= 1 {
        return Ok(Interaction::quiet(in_range.first().copied()));
    }

    let candidates: Vec<Entity> = in_range.iter().filter(|e| !e.is_guardian()).copied().collect();
    if candidates.len() <= 1 {
        return Ok(Interaction::quiet(
            candidates.first().or_else(|| in_range.first()).copied(),
        ));
    }

    fuse_candidates(horizon, &candidates)
}

fn consume_cluster(horizon: &mut Horizon, victim: &Entity) -> SimResult<Interaction> {
    let Some(guardian) = horizon.guardian_mut() else {
        return Ok(Interaction::quiet(None));
    };
    let gold = victim.gold();
    guardian.steal_gold(gold)?;
    let survivor = Entity::from(*guardian);
    horizon.remove_entity(victim);

    trace!(cluster = victim.id(), gold, "Guardian consumed cluster");
    Ok(Interaction {
        survivor: Some(survivor),
        resolution: Resolution::Predation {
            cluster: victim.id(),
            gold,
        },
    })
}

fn fuse_candidates(horizon: &mut Horizon, candidates: &[Entity]) -> SimResult<Interaction> {
    let base = candidates.iter().find_map(|e| match e {
        Entity::CreatureCluster(cluster) => Some(*cluster),
        Entity::CreatureUnit(_) | Entity::Guardian(_) => None,
    });

    let (mut cluster, absorbed, created): (CreatureCluster, Vec<Entity>, bool) = match base {
        Some(cluster) => {
            let base = Entity::from(cluster);
            let others = candidates.iter().filter(|e| !e.is_same(&base)).copied().collect();
            (cluster, others, false)
        }
        None => match candidates.split_first() {
            Some((seed, rest)) => (CreatureCluster::seeded_from(seed), rest.to_vec(), true),
            None => return Ok(Interaction::quiet(None)),
        },
    };

    // Fuse into a local copy so a bad transfer leaves the horizon untouched.
    for other in &absorbed {
        cluster.fuse(other)?;
    }

    let merged = Entity::from(cluster);
    if created {
        horizon.remove_entities(candidates);
        horizon.add_entity(merged)?;
    } else {
        horizon.remove_entities(&absorbed);
        if let Some(slot) = horizon.get_mut(merged.key()) {
            *slot = merged;
        }
    }

    trace!(
        cluster = cluster.id(),
        absorbed = absorbed.len(),
        created,
        gold = cluster.gold(),
        "Fusion"
    );
    Ok(Interaction {
        survivor: Some(merged),
        resolution: Resolution::Fusion {
            cluster: cluster.id(),
            absorbed: absorbed.len(),
            created,
        },
    })
}

/// Nearest active entity to `entity`, itself excluded.
///
/// Ties go to the first candidate in list order. A tracked guardian is
/// placed at the guardian's own position. Returns `None` when no other entity
/// is active.
#[must_use]
pub fn find_nearest_neighbor(horizon: &Horizon, entity: &Entity) -> Option<Entity> {
    let origin = horizon.current_state(entity).x();
    let mut nearest = None;
    let mut best = f64::MAX;

    for candidate in horizon.entities().iter().filter(|c| !c.is_same(entity)) {
        let candidate = horizon.current_state(candidate);
        let distance = (candidate.x() - origin).abs();
        if distance < best {
            best = distance;
            nearest = Some(candidate);
        }
    }

    nearest
}

fn thief_mut(horizon: &mut Horizon, key: EntityKey) -> Option<&mut dyn StealGold> {
    if horizon.guardian_key() == Some(key) {
        return horizon.guardian_mut().map(|g| g as &mut dyn StealGold);
    }
    horizon.get_mut(key).and_then(Entity::as_steal_gold_mut)
}

/// Let `attacker` rob its nearest neighbor of [`THEFT_PERCENTAGE`] of their
/// gold.
///
/// Nothing happens when the attacker is no longer on the horizon, has no
/// neighbor, or the neighbor cannot lose gold. The attacker gains exactly
/// what the victim lost.
///
/// # Errors
///
/// Returns the error of a gold transfer involving non-finite gold.
pub fn treat_neighbor_theft(horizon: &mut Horizon, attacker: &Entity) -> SimResult<Option<Theft>> {
    let thief = attacker.key();
    if thief_mut(horizon, thief).is_none() {
        return Ok(None);
    }
    let Some(victim) = find_nearest_neighbor(horizon, attacker) else {
        return Ok(None);
    };

    let Some(loser) = horizon
        .get_mut(victim.key())
        .and_then(Entity::as_lose_gold_mut)
    else {
        return Ok(None);
    };
    let amount = loser.lose_gold(THEFT_PERCENTAGE)?;

    if let Some(thief) = thief_mut(horizon, thief) {
        thief.steal_gold(amount)?;
    }

    trace!(thief = attacker.id(), victim = victim.id(), amount, "Neighbor theft");
    Ok(Some(Theft {
        thief,
        victim: victim.key(),
        amount,
    }))
}

/// Status implied by the current horizon.
///
/// An empty horizon is `Successful`. With exactly one entity left the run is
/// `Successful` when the guardian is strictly richer than it and `Failed`
/// otherwise; a missing guardian counts as holding no gold. Anything else is
/// still `Running`.
#[must_use]
pub fn evaluate_status(horizon: &Horizon) -> SimulationStatus {
    match horizon.entities() {
        [] => SimulationStatus::Successful,
        [last] => {
            let guardian_gold = horizon.guardian().map_or(0.0, HorizonEntity::gold);
            if guardian_gold > last.gold() {
                SimulationStatus::Successful
            } else {
                SimulationStatus::Failed
            }
        }
        _ => SimulationStatus::Running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CreatureUnit, EntityKind, Guardian};
    use crate::error::SimulationError;

    fn unit(id: EntityId, x: f64, gold: f64) -> Entity {
        Entity::from(CreatureUnit::with_state(id, x, gold))
    }

    fn cluster(id: EntityId, x: f64, gold: f64) -> Entity {
        Entity::from(CreatureCluster::with_state(id, x, gold))
    }

    fn ids(horizon: &Horizon) -> Vec<(EntityKind, EntityId)> {
        horizon.entities().iter().map(|e| (e.kind(), e.id())).collect()
    }

    #[test]
    fn test_predation_takes_first_cluster_only() {
        let mut horizon = Horizon::new(
            vec![unit(1, 0.0, 10.0), cluster(2, 5.0, 300.0), cluster(3, 6.0, 400.0)],
            Some(Guardian::with_state(4, 10.0, 1.0)),
        );

        let interaction = resolve_interactions_at(&mut horizon, 0.0).unwrap();

        assert_eq!(
            interaction.resolution,
            Resolution::Predation {
                cluster: 2,
                gold: 300.0
            }
        );
        assert!(interaction.survivor.unwrap().is_guardian());
        assert!((horizon.guardian().unwrap().gold() - 301.0).abs() < f64::EPSILON);
        assert_eq!(
            ids(&horizon),
            vec![(EntityKind::CreatureUnit, 1), (EntityKind::CreatureCluster, 3)]
        );
    }

    #[test]
    fn test_stale_guardian_copy_cannot_prey() {
        let mut horizon = Horizon::new(
            vec![Entity::from(Guardian::with_state(9, 0.0, 0.0)), cluster(1, 10.0, 1000.0)],
            Some(Guardian::with_state(9, 0.0, 0.0)),
        );
        // Move the guardian away without refreshing the tracked copy
        horizon.guardian_mut().unwrap().set_x(5_000_000.0);

        let interaction = resolve_interactions_at(&mut horizon, 0.0).unwrap();

        assert_eq!(interaction.resolution, Resolution::Quiet);
        assert_eq!(interaction.survivor.unwrap().id(), 1);
        assert!(horizon.guardian().unwrap().gold().abs() < f64::EPSILON);
        assert!((horizon.entities()[1].gold() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tracked_guardian_preys_from_real_position() {
        let mut horizon = Horizon::new(
            vec![Entity::from(Guardian::with_state(9, 0.0, 0.0)), cluster(1, 5_000_010.0, 1000.0)],
            Some(Guardian::with_state(9, 0.0, 0.0)),
        );
        horizon.guardian_mut().unwrap().set_x(5_000_000.0);

        let interaction = resolve_interactions_at(&mut horizon, 5_000_000.0).unwrap();

        assert_eq!(
            interaction.resolution,
            Resolution::Predation {
                cluster: 1,
                gold: 1000.0
            }
        );
        assert!((horizon.guardian().unwrap().gold() - 1000.0).abs() < f64::EPSILON);
        assert_eq!(ids(&horizon), vec![(EntityKind::Guardian, 9)]);
    }

    #[test]
    fn test_guardian_ignores_units() {
        let mut horizon = Horizon::new(
            vec![unit(1, 0.0, 10.0)],
            Some(Guardian::with_state(2, 0.0, 0.0)),
        );

        let interaction = resolve_interactions_at(&mut horizon, 0.0).unwrap();

        // Unit and guardian in range, but guardians never fuse.
        assert_eq!(interaction.resolution, Resolution::Quiet);
        assert_eq!(interaction.survivor.unwrap().id(), 1);
        assert_eq!(horizon.len(), 1);
    }

    #[test]
    fn test_lone_entity_survives() {
        let mut horizon = Horizon::new(vec![unit(1, 0.0, 10.0), unit(2, 25_001.0, 10.0)], None);

        let interaction = resolve_interactions_at(&mut horizon, 0.0).unwrap();
        assert_eq!(interaction.resolution, Resolution::Quiet);
        assert_eq!(interaction.survivor.unwrap().id(), 1);
    }

    #[test]
    fn test_nothing_in_range() {
        let mut horizon = Horizon::new(vec![unit(1, 0.0, 10.0)], None);
        let interaction = resolve_interactions_at(&mut horizon, 100_000.0).unwrap();
        assert!(interaction.survivor.is_none());
    }

    #[test]
    fn test_lone_guardian_survives() {
        let mut horizon = Horizon::new(vec![], Some(Guardian::with_state(1, 0.0, 0.0)));
        let interaction = resolve_interactions_at(&mut horizon, 0.0).unwrap();
        assert!(interaction.survivor.unwrap().is_guardian());
    }

    #[test]
    fn test_units_fuse_into_new_cluster() {
        let mut horizon = Horizon::new(
            vec![
                unit(1, 100.0, 10.0),
                unit(2, 0.0, 20.0),
                unit(3, 25_000.0, 30.0),
                unit(4, 90_000.0, 1.0),
            ],
            None,
        );

        let interaction = resolve_interactions_at(&mut horizon, 0.0).unwrap();

        assert_eq!(
            interaction.resolution,
            Resolution::Fusion {
                cluster: 1,
                absorbed: 2,
                created: true
            }
        );
        assert_eq!(
            ids(&horizon),
            vec![(EntityKind::CreatureUnit, 4), (EntityKind::CreatureCluster, 1)]
        );
        let merged = horizon.entities()[1];
        assert!((merged.gold() - 60.0).abs() < f64::EPSILON);
        assert!((merged.x() - 100.0).abs() < f64::EPSILON);
        assert_eq!(interaction.survivor, Some(merged));
    }

    #[test]
    fn test_existing_cluster_absorbs_in_place() {
        let mut horizon = Horizon::new(
            vec![
                unit(1, 0.0, 10.0),
                cluster(2, 5.0, 100.0),
                unit(3, 7.0, 5.0),
                cluster(4, 9.0, 50.0),
            ],
            None,
        );

        let interaction = resolve_interactions_at(&mut horizon, 0.0).unwrap();

        assert_eq!(
            interaction.resolution,
            Resolution::Fusion {
                cluster: 2,
                absorbed: 3,
                created: false
            }
        );
        assert_eq!(ids(&horizon), vec![(EntityKind::CreatureCluster, 2)]);
        assert!((horizon.entities()[0].gold() - 165.0).abs() < f64::EPSILON);
        assert!((horizon.entities()[0].x() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fusion_keeps_guardian_out() {
        let mut horizon = Horizon::new(
            vec![unit(1, 0.0, 10.0), unit(2, 1.0, 10.0)],
            Some(Guardian::with_state(3, 2.0, 7.0)),
        );

        resolve_interactions_at(&mut horizon, 0.0).unwrap();

        assert_eq!(horizon.len(), 1);
        assert!((horizon.entities()[0].gold() - 20.0).abs() < f64::EPSILON);
        assert!((horizon.guardian().unwrap().gold() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fusion_with_bad_gold_changes_nothing() {
        let mut horizon = Horizon::new(vec![unit(1, 0.0, 10.0), unit(2, 1.0, f64::NAN)], None);
        let before = horizon.clone();

        assert!(resolve_interactions_at(&mut horizon, 0.0).is_err());
        assert_eq!(horizon.len(), before.len());
        assert_eq!(ids(&horizon), ids(&before));
    }

    #[test]
    fn test_resolve_rejects_non_finite_position() {
        let mut horizon = Horizon::default();
        assert!(matches!(
            resolve_interactions_at(&mut horizon, f64::NAN),
            Err(SimulationError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_nearest_neighbor_first_wins_ties() {
        let horizon = Horizon::new(
            vec![unit(1, 0.0, 1.0), unit(2, -10.0, 1.0), unit(3, 10.0, 1.0), unit(4, 50.0, 1.0)],
            None,
        );
        let me = horizon.entities()[0];
        assert_eq!(find_nearest_neighbor(&horizon, &me).unwrap().id(), 2);
    }

    #[test]
    fn test_nearest_neighbor_alone() {
        let horizon = Horizon::new(vec![unit(1, 0.0, 1.0)], Some(Guardian::new(2)));
        let me = horizon.entities()[0];
        assert!(find_nearest_neighbor(&horizon, &me).is_none());
    }

    #[test]
    fn test_theft_moves_half() {
        let mut horizon = Horizon::new(vec![unit(1, 0.0, 100.0), unit(2, 30_000.0, 1000.0)], None);
        let attacker = horizon.entities()[0];

        let theft = treat_neighbor_theft(&mut horizon, &attacker).unwrap().unwrap();

        assert!((theft.amount - 500.0).abs() < f64::EPSILON);
        assert_eq!(theft.victim.id, 2);
        assert!((horizon.entities()[0].gold() - 600.0).abs() < f64::EPSILON);
        assert!((horizon.entities()[1].gold() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_theft_from_broke_neighbor() {
        let mut horizon = Horizon::new(vec![unit(1, 0.0, 100.0), unit(2, 30_000.0, 0.0)], None);
        let attacker = horizon.entities()[0];

        let theft = treat_neighbor_theft(&mut horizon, &attacker).unwrap().unwrap();
        assert!(theft.amount.abs() < f64::EPSILON);
        assert!((horizon.entities()[0].gold() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tracked_guardian_cannot_be_robbed() {
        let mut horizon = Horizon::new(
            vec![unit(1, 0.0, 100.0), Entity::from(Guardian::with_state(2, 1.0, 500.0))],
            None,
        );
        let attacker = horizon.entities()[0];

        assert!(treat_neighbor_theft(&mut horizon, &attacker).unwrap().is_none());
        assert!((horizon.entities()[1].gold() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inactive_attacker_steals_nothing() {
        let mut horizon = Horizon::new(vec![unit(2, 10.0, 100.0)], None);
        let ghost = unit(1, 0.0, 100.0);

        assert!(treat_neighbor_theft(&mut horizon, &ghost).unwrap().is_none());
        assert!((horizon.entities()[0].gold() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_horizon_guardian_can_rob() {
        let guardian = Guardian::with_state(9, 0.0, 0.0);
        let mut horizon = Horizon::new(vec![unit(1, 10.0, 100.0)], Some(guardian));

        let theft = treat_neighbor_theft(&mut horizon, &Entity::from(guardian))
            .unwrap()
            .unwrap();
        assert!((theft.amount - 50.0).abs() < f64::EPSILON);
        assert!((horizon.guardian().unwrap().gold() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_evaluate_status() {
        let mut horizon = Horizon::new(vec![], Some(Guardian::with_state(9, 0.0, 0.0)));
        assert_eq!(evaluate_status(&horizon), SimulationStatus::Successful);

        horizon.add_entity(unit(1, 0.0, 10.0)).unwrap();
        assert_eq!(evaluate_status(&horizon), SimulationStatus::Failed);

        horizon.guardian_mut().unwrap().steal_gold(10.0).unwrap();
        // Equal gold is still a failure
        assert_eq!(evaluate_status(&horizon), SimulationStatus::Failed);

        horizon.guardian_mut().unwrap().steal_gold(0.5).unwrap();
        assert_eq!(evaluate_status(&horizon), SimulationStatus::Successful);

        horizon.add_entity(unit(2, 0.0, 10.0)).unwrap();
        assert_eq!(evaluate_status(&horizon), SimulationStatus::Running);
    }

    #[test]
    fn test_evaluate_status_without_guardian() {
        let horizon = Horizon::new(vec![unit(1, 0.0, 0.0)], None);
        assert_eq!(evaluate_status(&horizon), SimulationStatus::Failed);
    }
}
