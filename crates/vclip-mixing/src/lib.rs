#![deny(unreachable_patterns)]
//! Variant planning and filter-graph compilation.
//!
//! Pure, synchronous, CPU-only: this crate performs no I/O and spawns no
//! tasks. The planner enumerates or samples `(order, speed, trim)` plans
//! from a clip inventory and settings; the compiler turns one plan into a
//! concrete encoder argument vector and filter-graph expression.

pub mod canvas;
pub mod command;
pub mod compiler;
pub mod duration;
pub mod error;
pub mod order;
pub mod planner;
pub mod quantity;
pub mod rng;
pub mod speed;

pub use canvas::{resolve_bitrate_tier, resolve_canvas, resolve_metadata_preset, BitrateTier, Canvas};
pub use command::MultiInputCommand;
pub use compiler::{CompiledCommand, FilterGraphCompiler};
pub use duration::compute_trim_windows;
pub use error::{MixingError, MixingResult};
pub use order::{generate_orders, OrderFlags};
pub use planner::VariantPlanner;
pub use quantity::max_distinct_plans;
pub use rng::PlannerRng;
pub use speed::generate_speeds;
