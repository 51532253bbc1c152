#![deny(unreachable_patterns)]
//! Shared data models for the variant planner and filter-graph compiler.
//!
//! This crate provides Serde-serializable types for:
//! - Clips and Groups (the input inventory)
//! - MixingSettings (the closed option set, §3)
//! - Plan and TrimWindow (planner output, §3)
//! - Job identity and status (§6)

pub mod clip;
pub mod job;
pub mod plan;
pub mod settings;

pub use clip::{Clip, ClipId, Group, GroupId};
pub use job::{JobId, JobStatus};
pub use plan::{EffectiveSettings, Plan, TrimWindow};
pub use settings::{
    parse_or_default, AspectRatio, AudioMode, Bitrate, BTreeSpeeds, ClosedEnumField,
    DurationDistributionMode, DurationType, FrameRate, GroupMixingMode, MetadataSource,
    MixingSettings, Resolution, SettingsError,
};
