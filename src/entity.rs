//! Entities that live on the horizon.
//!
//! Behavior is composed from small capability traits instead of a class
//! hierarchy:
//!
//! | Variant           | Move | StealGold | LoseGold | Fusion |
//! |-------------------|------|-----------|----------|--------|
//! | `CreatureUnit`    | yes  | yes       | yes      | no     |
//! | `CreatureCluster` | yes  | yes       | yes      | yes    |
//! | `Guardian`        | yes  | yes       | no       | no     |
//!
//! [`Entity`] is the tagged union stored by the horizon. The engine asks it for
//! a capability (`as_move_mut`, `as_lose_gold_mut`, ...) and acts only when the
//! variant provides one.

use serde::{Deserialize, Serialize};

/// Implement [`HorizonEntity`] for a struct with `id`, `x` and `gold` fields.
macro_rules! impl_horizon_entity {
    ($ty:ty) => {
        impl $crate::entity::HorizonEntity for $ty {
            #[inline]
            fn id(&self) -> $crate::entity::EntityId {
                self.id
            }

            #[inline]
            fn x(&self) -> f64 {
                self.x
            }

            #[inline]
            fn set_x(&mut self, x: f64) {
                self.x = x;
            }

            #[inline]
            fn gold(&self) -> f64 {
                self.gold
            }

            #[inline]
            fn set_gold(&mut self, gold: f64) {
                self.gold = gold;
            }
        }
    };
}

mod behavior;
mod creature;
mod guardian;

pub use behavior::{Fusion, HorizonEntity, LoseGold, Move, StealGold};
pub use creature::{CreatureCluster, CreatureUnit, INITIAL_CREATURE_GOLD};
pub use guardian::{GUARDIAN_START_X, Guardian};

/// Identifier of an entity. Unique among active entities.
pub type EntityId = u32;

/// Variant tag of an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// An individual creature.
    CreatureUnit,
    /// A group of creatures produced by fusion.
    CreatureCluster,
    /// The fixed predator.
    Guardian,
}

/// Identity of an entity: its variant plus its id.
///
/// A cluster inherits the id of the creature it was seeded from, so the id
/// alone does not tell the original creature and its cluster apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Variant of the entity.
    pub kind: EntityKind,
    /// Id of the entity.
    pub id: EntityId,
}

/// Any entity that can be placed on the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    /// An individual creature.
    CreatureUnit(CreatureUnit),
    /// A fused group of creatures.
    CreatureCluster(CreatureCluster),
    /// A guardian tracked as a regular entity.
    Guardian(Guardian),
}

impl Entity {
    /// Variant tag of this entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::CreatureUnit(_) => EntityKind::CreatureUnit,
            Self::CreatureCluster(_) => EntityKind::CreatureCluster,
            Self::Guardian(_) => EntityKind::Guardian,
        }
    }

    /// Identity of this entity.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: self.kind(),
            id: self.id(),
        }
    }

    /// Whether both values denote the same entity.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Whether this entity is a creature cluster.
    #[must_use]
    pub const fn is_cluster(&self) -> bool {
        matches!(self, Self::CreatureCluster(_))
    }

    /// Whether this entity is a guardian.
    #[must_use]
    pub const fn is_guardian(&self) -> bool {
        matches!(self, Self::Guardian(_))
    }

    /// Borrow the movement capability, if any.
    pub fn as_move_mut(&mut self) -> Option<&mut dyn Move> {
        match self {
            Self::CreatureUnit(unit) => Some(unit as &mut dyn Move),
            Self::CreatureCluster(cluster) => Some(cluster as &mut dyn Move),
            Self::Guardian(guardian) => Some(guardian as &mut dyn Move),
        }
    }

    /// Borrow the theft capability, if any.
    pub fn as_steal_gold_mut(&mut self) -> Option<&mut dyn StealGold> {
        match self {
            Self::CreatureUnit(unit) => Some(unit as &mut dyn StealGold),
            Self::CreatureCluster(cluster) => Some(cluster as &mut dyn StealGold),
            Self::Guardian(guardian) => Some(guardian as &mut dyn StealGold),
        }
    }

    /// Borrow the gold loss capability, if any. Guardians cannot be drained.
    pub fn as_lose_gold_mut(&mut self) -> Option<&mut dyn LoseGold> {
        match self {
            Self::CreatureUnit(unit) => Some(unit as &mut dyn LoseGold),
            Self::CreatureCluster(cluster) => Some(cluster as &mut dyn LoseGold),
            Self::Guardian(_) => None,
        }
    }

    /// Borrow the fusion capability, if any. Only clusters absorb others.
    pub fn as_fusion_mut(&mut self) -> Option<&mut dyn Fusion> {
        match self {
            Self::CreatureCluster(cluster) => Some(cluster as &mut dyn Fusion),
            Self::CreatureUnit(_) | Self::Guardian(_) => None,
        }
    }

    fn state(&self) -> &dyn HorizonEntity {
        match self {
            Self::CreatureUnit(unit) => unit,
            Self::CreatureCluster(cluster) => cluster,
            Self::Guardian(guardian) => guardian,
        }
    }

    fn state_mut(&mut self) -> &mut dyn HorizonEntity {
        match self {
            Self::CreatureUnit(unit) => unit,
            Self::CreatureCluster(cluster) => cluster,
            Self::Guardian(guardian) => guardian,
        }
    }
}

impl HorizonEntity for Entity {
    fn id(&self) -> EntityId {
        self.state().id()
    }

    fn x(&self) -> f64 {
        self.state().x()
    }

    fn set_x(&mut self, x: f64) {
        self.state_mut().set_x(x);
    }

    fn gold(&self) -> f64 {
        self.state().gold()
    }

    fn set_gold(&mut self, gold: f64) {
        self.state_mut().set_gold(gold);
    }
}

impl From<CreatureUnit> for Entity {
    fn from(unit: CreatureUnit) -> Self {
        Self::CreatureUnit(unit)
    }
}

impl From<CreatureCluster> for Entity {
    fn from(cluster: CreatureCluster) -> Self {
        Self::CreatureCluster(cluster)
    }
}

impl From<Guardian> for Entity {
    fn from(guardian: Guardian) -> Self {
        Self::Guardian(guardian)
    }
}
