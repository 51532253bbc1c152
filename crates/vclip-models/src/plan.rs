//! Plan and TrimWindow — one concrete output variant (spec §3).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clip::ClipId;
use crate::settings::MixingSettings;

/// A derived settings value attached to every emitted [`Plan`].
///
/// The planner consumes [`MixingSettings`] by value and never mutates the
/// caller's copy (§9 Design Notes — "Cyclic-ish mutation of settings inside
/// the planner"); this is the owned, per-plan derivative instead. Transition
/// and color-grading effects are out of scope for this core (spec §1, §9)
/// and are force-disabled here regardless of any caller input, matching the
/// source's "neutered settings copy" belt-and-braces behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub settings: MixingSettings,
    pub transitions_enabled: bool,
    pub color_grading_enabled: bool,
}

impl EffectiveSettings {
    pub fn neutered(settings: MixingSettings) -> Self {
        Self {
            settings,
            transitions_enabled: false,
            color_grading_enabled: false,
        }
    }
}

/// One concrete choice of order, per-clip speed, and effective settings for
/// a single output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: usize,
    pub order: Vec<ClipId>,
    pub speeds: HashMap<ClipId, f64>,
    pub settings: EffectiveSettings,
}

impl Plan {
    pub fn new(
        id: usize,
        order: Vec<ClipId>,
        speeds: HashMap<ClipId, f64>,
        settings: EffectiveSettings,
    ) -> Self {
        Self {
            id,
            order,
            speeds,
            settings,
        }
    }

    /// A plan is complete only when every id in `order` has a speed entry
    /// and the id sets have equal cardinality (spec §3 invariant, testable
    /// property 2).
    pub fn is_complete(&self) -> bool {
        self.order.len() == self.speeds.len()
            && self.order.iter().all(|id| self.speeds.contains_key(id))
    }

    pub fn first_clip(&self) -> Option<&ClipId> {
        self.order.first()
    }
}

/// Per-clip trim window in the clip's original timeline, computed only when
/// `smart_trimming` is on and `duration_type = fixed` (spec §3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    pub trim_start_src: f64,
    pub trim_end_src: f64,
    pub target_duration: f64,
}

impl TrimWindow {
    /// `clip_id` is carried separately by the caller (compiler indexes
    /// windows by clip id); this constructor validates the core invariant:
    /// `0 <= trim_start_src < trim_end_src <= clip_duration` and
    /// `trim_end_src - trim_start_src >= 0.1`.
    pub fn new(trim_start_src: f64, trim_end_src: f64, target_duration: f64) -> Self {
        Self {
            trim_start_src,
            trim_end_src,
            target_duration,
        }
    }

    pub fn source_duration(&self) -> f64 {
        self.trim_end_src - self.trim_start_src
    }

    pub fn is_valid(&self, clip_duration: f64) -> bool {
        self.trim_start_src >= 0.0
            && self.trim_start_src < self.trim_end_src
            && self.trim_end_src <= clip_duration + 1e-9
            && self.source_duration() >= 0.1 - 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{
        AspectRatio, AudioMode, Bitrate, BTreeSpeeds, DurationDistributionMode, DurationType,
        FrameRate, GroupMixingMode, MetadataSource, Resolution,
    };

    fn dummy_settings() -> MixingSettings {
        MixingSettings {
            order_mixing: false,
            speed_mixing: false,
            different_starting_video: false,
            allowed_speeds: BTreeSpeeds::new(vec![1.0]).unwrap(),
            group_mixing: false,
            group_mixing_mode: GroupMixingMode::Strict,
            metadata_source: MetadataSource::Normal,
            bitrate: Bitrate::Medium,
            resolution: Resolution::Hd,
            frame_rate: FrameRate::Fps30,
            aspect_ratio: AspectRatio::Original,
            duration_type: DurationType::Original,
            fixed_duration: 0.0,
            duration_distribution_mode: DurationDistributionMode::Proportional,
            smart_trimming: false,
            audio_mode: AudioMode::Keep,
            output_count: 1,
        }
    }

    #[test]
    fn plan_completeness_requires_matching_id_sets() {
        let mut speeds = HashMap::new();
        speeds.insert(ClipId::new("a"), 1.0);
        let plan = Plan::new(
            0,
            vec![ClipId::new("a"), ClipId::new("b")],
            speeds,
            EffectiveSettings::neutered(dummy_settings()),
        );
        assert!(!plan.is_complete());
    }

    #[test]
    fn plan_is_complete_when_ids_match() {
        let mut speeds = HashMap::new();
        speeds.insert(ClipId::new("a"), 1.0);
        speeds.insert(ClipId::new("b"), 1.0);
        let plan = Plan::new(
            0,
            vec![ClipId::new("a"), ClipId::new("b")],
            speeds,
            EffectiveSettings::neutered(dummy_settings()),
        );
        assert!(plan.is_complete());
    }

    #[test]
    fn effective_settings_always_neuters_transitions_and_color() {
        let effective = EffectiveSettings::neutered(dummy_settings());
        assert!(!effective.transitions_enabled);
        assert!(!effective.color_grading_enabled);
    }

    #[test]
    fn trim_window_validity() {
        let w = TrimWindow::new(1.0, 5.0, 4.0);
        assert!(w.is_valid(10.0));
        assert!(!w.is_valid(4.0)); // end exceeds clip duration

        let too_short = TrimWindow::new(1.0, 1.05, 0.05);
        assert!(!too_short.is_valid(10.0));
    }
}
