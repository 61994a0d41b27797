//! Error type shared by the placement engine and the entity store.

use super::types::EntityKind;

/// Errors raised by engine operations.
///
/// Every operation that returns one of these leaves the entity store untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Map width or height is not a positive, finite number of meters.
    InvalidExtent { width: f64, height: f64 },
    /// Auto-placement step is not a positive, finite number of meters.
    InvalidStep(f64),
    /// Auto-placement step would produce more grid positions than allowed.
    GridTooDense { step: f64, candidates: f64 },
    /// No entity of the given kind carries this id.
    UnknownEntity { kind: EntityKind, id: String },
    /// Barrier exists but has no vertex at this index.
    InvalidVertex { id: String, index: usize },
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::InvalidExtent { width, height } => {
                write!(f, "Invalid map size {} x {} m: both dimensions must be positive", width, height)
            }
            PlannerError::InvalidStep(step) => write!(f, "Invalid placement step {} m: must be positive", step),
            PlannerError::GridTooDense { step, candidates } => {
                write!(f, "Placement step {} m is too small for this map ({:.0} grid positions)", step, candidates)
            }
            PlannerError::UnknownEntity { kind, id } => write!(f, "No {} with id '{}'", kind, id),
            PlannerError::InvalidVertex { id, index } => write!(f, "Barrier '{}' has no vertex {}", id, index),
        }
    }
}

impl std::error::Error for PlannerError {}
