//! Error types for variant planning and filter-graph compilation.

use thiserror::Error;

/// Result type for this crate's fallible operations.
pub type MixingResult<T> = Result<T, MixingError>;

/// Errors raised by the planner and compiler (spec §7).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MixingError {
    #[error("need at least 2 clips to plan a variant, got {0}")]
    InsufficientInputs(usize),

    #[error("invalid clip inventory: {missing_ids:?} not found, {missing_files:?} not on disk")]
    InvalidInventory {
        missing_ids: Vec<String>,
        missing_files: Vec<String>,
    },

    #[error("output_count must be positive, got {0}")]
    InvalidOutputCount(u32),

    #[error("fixed_duration must be positive when duration_type=fixed, got {0}")]
    InvalidFixedDuration(f64),

    #[error(
        "compiler consistency error: {input_specifiers} input specifier(s) but {plan_order_len} clip(s) in plan order"
    )]
    InputCountMismatch {
        input_specifiers: usize,
        plan_order_len: usize,
    },

    #[error("no trim window available for clip {0} under smart trimming")]
    MissingTrimWindow(String),
}

impl MixingError {
    pub fn invalid_inventory(missing_ids: Vec<String>, missing_files: Vec<String>) -> Self {
        Self::InvalidInventory {
            missing_ids,
            missing_files,
        }
    }
}
