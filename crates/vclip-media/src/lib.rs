#![deny(unreachable_patterns)]
//! FFmpeg process execution: command building, progress parsing, and
//! cancellation/timeout-aware process management.
//!
//! This crate holds the only I/O edge the variant-mixing core touches: it
//! spawns the external encoder and streams its `-progress pipe:2` output.
//! Plan enumeration and filter-graph assembly are `vclip-mixing`'s concern;
//! this crate never builds a filter graph itself.

pub mod command;
pub mod error;
pub mod progress;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use progress::{FfmpegProgress, ProgressCallback};
