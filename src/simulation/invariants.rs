//! Horizon invariants - sanity checks that detect engine bugs.
//!
//! Gold only ever changes hands: it is moved by theft, fusion and predation
//! but never created or destroyed. Combined with the per-entity checks below,
//! any violation points at a bug rather than at an unlucky run.

use std::collections::HashSet;

use crate::entity::{Entity, HorizonEntity};
use crate::horizon::Horizon;

/// Invariant violation error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

/// Gold held by every active entity plus the guardian.
///
/// Constant across iterations, up to floating point rounding.
#[must_use]
pub fn total_gold(horizon: &Horizon) -> f64 {
    horizon.entity_gold() + horizon.guardian().map_or(0.0, HorizonEntity::gold)
}

/// Check all horizon invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(horizon: &Horizon) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();

    for entity in horizon.entities() {
        if !seen.insert(entity.id()) {
            violations.push(InvariantViolation {
                message: format!("Entity id {} is active more than once", entity.id()),
            });
        }

        if !entity.x().is_finite() {
            violations.push(InvariantViolation {
                message: format!("Entity {} has non-finite position {}", entity.id(), entity.x()),
            });
        }

        if !entity.gold().is_finite() || entity.gold() < 0.0 {
            violations.push(InvariantViolation {
                message: format!("Entity {} has invalid gold {}", entity.id(), entity.gold()),
            });
        }
    }

    if let Some(guardian) = horizon.guardian() {
        if !guardian.x().is_finite() {
            violations.push(InvariantViolation {
                message: format!("Guardian has non-finite position {}", guardian.x()),
            });
        }
        if !guardian.gold().is_finite() || guardian.gold() < 0.0 {
            violations.push(InvariantViolation {
                message: format!("Guardian has invalid gold {}", guardian.gold()),
            });
        }

        let current = Entity::Guardian(*guardian);
        let stale = horizon
            .entities()
            .iter()
            .filter(|e| e.is_same(&current) && **e != current)
            .count();
        if stale > 0 {
            violations.push(InvariantViolation {
                message: format!("{stale} tracked copies of guardian {} are stale", guardian.id()),
            });
        }
    }

    // A finished world has at most one survivor left.
    if horizon.status().is_terminal() && horizon.len() > 1 {
        violations.push(InvariantViolation {
            message: format!(
                "Status {} with {} active entities",
                horizon.status(),
                horizon.len()
            ),
        });
    }

    violations
}

/// Assert all horizon invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(horizon: &Horizon) {
    let violations = check_invariants(horizon);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Horizon invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_horizon: &Horizon) {}
