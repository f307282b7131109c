//! Error types for the simulation engine.
//!
//! Every fallible operation returns [`SimulationError`] through [`SimResult`].
//! Errors fall into two kinds (see [`ErrorKind`]): validation errors for
//! out-of-domain arguments and state errors for operations attempted on a
//! finished simulation. Neither kind is retried or swallowed by the engine.

use crate::entity::EntityId;
use crate::horizon::SimulationStatus;

/// Broad classification of a [`SimulationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An argument was outside its accepted domain.
    Validation,
    /// The operation is not allowed in the current simulation status.
    State,
}

/// Errors raised by entity behaviors, the horizon and the engine.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// A movement factor was non-finite or outside `[-1, 1]`.
    #[error("move factor must be finite and within [-1, 1], got {0}")]
    InvalidMoveFactor(f64),

    /// A gold loss percentage was outside `(0, 1]`.
    #[error("loss percentage must be within (0, 1], got {0}")]
    InvalidLossPercentage(f64),

    /// A stolen amount was not a finite number.
    #[error("stolen amount must be finite, got {0}")]
    NonFiniteAmount(f64),

    /// An entity offered for fusion holds non-finite gold.
    #[error("gold of the absorbed entity must be finite, got {0}")]
    NonFiniteGold(f64),

    /// A position argument was NaN or infinite.
    #[error("position must be finite, got {0}")]
    InvalidPosition(f64),

    /// A search range was negative or non-finite.
    #[error("range must be finite and non-negative, got {0}")]
    InvalidRange(f64),

    /// The requested number of creatures is outside the accepted bounds.
    #[error("creature count must be between {min} and {max}, got {count}")]
    InvalidCreatureCount {
        /// Requested count.
        count: usize,
        /// Smallest accepted count.
        min: usize,
        /// Largest accepted count.
        max: usize,
    },

    /// An entity with the same identity is already active.
    #[error("entity {0} is already present in the horizon")]
    DuplicateEntity(EntityId),

    /// An iteration was requested on a simulation that already finished.
    #[error("simulation cannot run because its status is {0}")]
    NotRunning(SimulationStatus),

    /// A status change would leave a terminal status.
    #[error("status cannot change from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: SimulationStatus,
        /// Requested status.
        to: SimulationStatus,
    },
}

impl SimulationError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotRunning(_) | Self::InvalidTransition { .. } => ErrorKind::State,
            Self::InvalidMoveFactor(_)
            | Self::InvalidLossPercentage(_)
            | Self::NonFiniteAmount(_)
            | Self::NonFiniteGold(_)
            | Self::InvalidPosition(_)
            | Self::InvalidRange(_)
            | Self::InvalidCreatureCount { .. }
            | Self::DuplicateEntity(_) => ErrorKind::Validation,
        }
    }

    /// Whether this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(SimulationError::InvalidMoveFactor(2.0).kind(), ErrorKind::Validation);
        assert_eq!(SimulationError::DuplicateEntity(3).kind(), ErrorKind::Validation);
        assert_eq!(
            SimulationError::NotRunning(SimulationStatus::Failed).kind(),
            ErrorKind::State
        );
        assert!(!SimulationError::NotRunning(SimulationStatus::Successful).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = SimulationError::NotRunning(SimulationStatus::Successful);
        assert_eq!(
            err.to_string(),
            "simulation cannot run because its status is Successful"
        );

        let err = SimulationError::InvalidCreatureCount {
            count: 11,
            min: 1,
            max: 10,
        };
        assert!(err.to_string().contains("between 1 and 10"));
    }
}
