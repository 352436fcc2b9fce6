//! Error types for the simulation.
//!
//! All fallible operations return [`SimError`] through the [`Result`] alias.

use crate::sim::AnimalId;

/// Errors raised while configuring or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A direction was requested between two coincident points.
    #[error("cannot compute a direction between two coincident positions")]
    DegenerateDirection,

    /// An animal was asked to eat itself.
    #[error("animal {animal} cannot want to eat itself")]
    InvalidRelation {
        /// The self-referencing animal.
        animal: AnimalId,
    },

    /// Targeting picked a focus that is neither prey nor hunter.
    #[error("focus {focus} of animal {animal} is neither prey nor hunter")]
    InvalidFocusRelation {
        /// The animal doing the targeting.
        animal: AnimalId,
        /// The focus it selected.
        focus: AnimalId,
    },

    /// A named override could not be understood.
    #[error("invalid syntax: {0}")]
    InvalidSyntax(String),

    /// A relative placement outside `0..=100`.
    #[error("relative position must be between 0-100, got {0}")]
    InvalidPlacement(f64),

    /// An animal parameter outside its allowed range.
    #[error("animal '{animal}' has an invalid {field}")]
    InvalidParameter {
        /// Name of the misconfigured animal.
        animal: String,
        /// The offending parameter.
        field: &'static str,
    },

    /// An animal name or id that is not in the population.
    #[error("'{0}' hasn't been defined yet")]
    UnknownAnimal(String),

    /// Two animals in a scenario share a name.
    #[error("animal name '{0}' is used more than once")]
    DuplicateName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;
