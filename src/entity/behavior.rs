//! Capability traits shared by entity variants.
//!
//! Each capability is a default-method algorithm that touches an entity only
//! through the [`HorizonEntity`] accessors. A variant opts into a capability
//! with an empty `impl`.

use crate::entity::EntityId;
use crate::error::{SimResult, SimulationError};

/// Minimal state of anything placed on the horizon.
pub trait HorizonEntity {
    /// Identifier of the entity.
    fn id(&self) -> EntityId;

    /// Position on the line.
    fn x(&self) -> f64;

    /// Set the position on the line.
    fn set_x(&mut self, x: f64);

    /// Gold held.
    fn gold(&self) -> f64;

    /// Set the gold held.
    fn set_gold(&mut self, gold: f64);
}

/// Random walk proportional to wealth.
pub trait Move: HorizonEntity {
    /// Shift the entity by `factor * gold` and return the new position.
    ///
    /// Gold is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidMoveFactor`] if `factor` is not a
    /// finite number within `[-1, 1]`.
    fn move_by(&mut self, factor: f64) -> SimResult<f64> {
        if !factor.is_finite() || !(-1.0..=1.0).contains(&factor) {
            return Err(SimulationError::InvalidMoveFactor(factor));
        }

        let x = self.x() + factor * self.gold();
        self.set_x(x);
        Ok(x)
    }
}

/// Gold can be taken from this entity.
pub trait LoseGold: HorizonEntity {
    /// Remove `percentage` of the current gold and return the amount removed.
    ///
    /// An entity with no gold loses nothing. Gold never drops below zero.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidLossPercentage`] unless
    /// `0 < percentage <= 1`, even when the entity holds no gold, and
    /// [`SimulationError::NonFiniteGold`] if the entity holds NaN or infinite
    /// gold.
    fn lose_gold(&mut self, percentage: f64) -> SimResult<f64> {
        if !(percentage > 0.0 && percentage <= 1.0) {
            return Err(SimulationError::InvalidLossPercentage(percentage));
        }

        let gold = self.gold();
        if !gold.is_finite() {
            return Err(SimulationError::NonFiniteGold(gold));
        }
        if gold <= 0.0 {
            return Ok(0.0);
        }

        let lost = gold * percentage;
        self.set_gold((gold - lost).max(0.0));
        Ok(lost)
    }
}

/// Gold can be credited to this entity.
pub trait StealGold: HorizonEntity {
    /// Add `amount` to the gold held and return the amount credited.
    ///
    /// Non-positive amounts are ignored and credit nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NonFiniteAmount`] if `amount` is NaN or
    /// infinite.
    fn steal_gold(&mut self, amount: f64) -> SimResult<f64> {
        if !amount.is_finite() {
            return Err(SimulationError::NonFiniteAmount(amount));
        }
        if amount <= 0.0 {
            return Ok(0.0);
        }

        self.set_gold(self.gold() + amount);
        Ok(amount)
    }
}

/// This entity can absorb another one.
pub trait Fusion: HorizonEntity {
    /// Add the gold of `other` to this entity and return the amount absorbed.
    ///
    /// Removing `other` from the horizon is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NonFiniteGold`] if `other` holds NaN or
    /// infinite gold.
    fn fuse(&mut self, other: &dyn HorizonEntity) -> SimResult<f64> {
        let absorbed = other.gold();
        if !absorbed.is_finite() {
            return Err(SimulationError::NonFiniteGold(absorbed));
        }

        self.set_gold(self.gold() + absorbed);
        Ok(absorbed)
    }
}
