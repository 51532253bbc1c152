#![deny(unreachable_patterns)]
//! Drives the variant planner and filter-graph compiler to produce and run
//! encoder invocations: the per-output loop, cancellation, retry, and the
//! collaborator traits (`EncoderLauncher`, `JobStatusSink`,
//! `OutputRecordSink`) the driver is tested against (spec §4.7, §5, §6).

pub mod config;
pub mod driver;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod retry;
pub mod sink;

pub use config::WorkerConfig;
pub use driver::JobDriver;
pub use error::{EncoderFailure, EncoderFailureFamily, WorkerError, WorkerResult};
pub use launcher::{EncodeOutcome, EncoderLauncher, FfmpegEncoderLauncher, RecorderLauncher};
pub use logging::JobLogger;
pub use retry::{retry_async, FailureTracker, RetryConfig, RetryResult};
pub use sink::{
    JobStatusSink, LoggingRecordSink, LoggingStatusSink, OutputRecord, OutputRecordSink,
    RecordingOutputSink, RecordingStatusSink,
};
