//! VariantPlanner — composes [`crate::order`] and [`crate::speed`], applies
//! different-starting-video fairness, and emits exactly
//! `min(output_count, available_distinct_combinations)` plans (spec §4.5).

use std::collections::{BTreeMap, HashMap, VecDeque};

use vclip_models::{Clip, ClipId, EffectiveSettings, Group, MixingSettings, Plan, SettingsError};

use crate::error::{MixingError, MixingResult};
use crate::order::{generate_orders, OrderFlags};
use crate::rng::PlannerRng;
use crate::speed::generate_speeds;

/// A cap on the cartesian expansion of orders × speed maps into plan
/// candidates, so a pathological `(order_mixing, speed_mixing)` combo on a
/// larger-than-expected inventory can't allocate unboundedly before
/// selection narrows it down to `output_count`.
const CANDIDATE_CAP: usize = 10_000;

type Candidate = (Vec<ClipId>, HashMap<ClipId, f64>);

/// Enumerates or samples plans for one job.
pub struct VariantPlanner;

impl VariantPlanner {
    /// Flat clip list mode (no groups).
    pub fn plan(clips: &[Clip], settings: &MixingSettings, seed: u64) -> MixingResult<Vec<Plan>> {
        Self::plan_with_groups(clips, None, settings, seed)
    }

    /// Composes orders and speeds, applying fairness selection, and emits
    /// `Plan`s with a neutered [`EffectiveSettings`] attached to each.
    pub fn plan_with_groups(
        clips: &[Clip],
        groups: Option<&[Group]>,
        settings: &MixingSettings,
        seed: u64,
    ) -> MixingResult<Vec<Plan>> {
        settings
            .validate_arithmetic()
            .map_err(map_settings_error)?;

        let total_clips = match groups {
            Some(groups) if settings.group_mixing => {
                groups.iter().map(|g| g.clips.len()).sum::<usize>()
            }
            _ => clips.len(),
        };
        if total_clips < 2 {
            return Err(MixingError::InsufficientInputs(total_clips));
        }

        let mut rng = PlannerRng::from_seed(seed);

        let flags = OrderFlags {
            order_mixing: settings.order_mixing,
            different_starting_video: settings.different_starting_video,
            group_mixing: settings.group_mixing,
            group_mixing_mode: settings.group_mixing_mode,
        };
        let orders = generate_orders(clips, groups, flags, settings.output_count, &mut rng);

        let clip_ids: Vec<ClipId> = clips.iter().map(|c| c.id.clone()).collect();
        let fallback_ids: Vec<ClipId> = if clip_ids.is_empty() {
            orders.iter().flatten().cloned().collect::<std::collections::BTreeSet<_>>().into_iter().collect()
        } else {
            clip_ids
        };
        let speed_maps = generate_speeds(
            &fallback_ids,
            settings.allowed_speeds.as_slice(),
            settings.speed_mixing,
            settings.output_count,
        );

        let candidates = build_candidates(orders, speed_maps);
        let selected = select_plans(
            candidates,
            settings.output_count as usize,
            settings.different_starting_video,
            &mut rng,
        );

        Ok(selected
            .into_iter()
            .enumerate()
            .map(|(id, (order, speeds))| {
                Plan::new(id, order, speeds, EffectiveSettings::neutered(settings.clone()))
            })
            .collect())
    }
}

/// `MixingSettings::validate_arithmetic` only ever returns these two
/// variants; the other `SettingsError` cases belong to per-field parsing
/// and never surface here.
fn map_settings_error(err: SettingsError) -> MixingError {
    match err {
        SettingsError::InvalidOutputCount(n) => MixingError::InvalidOutputCount(n as u32),
        SettingsError::InvalidFixedDuration(d) => MixingError::InvalidFixedDuration(d),
        other => unreachable!("validate_arithmetic produced unexpected variant: {other:?}"),
    }
}

fn build_candidates(orders: Vec<Vec<ClipId>>, speed_maps: Vec<HashMap<ClipId, f64>>) -> Vec<Candidate> {
    if orders.is_empty() || speed_maps.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    'outer: for order in &orders {
        for speed_map in &speed_maps {
            let filtered: HashMap<ClipId, f64> = order
                .iter()
                .filter_map(|id| speed_map.get(id).map(|s| (id.clone(), *s)))
                .collect();
            if filtered.len() == order.len() {
                out.push((order.clone(), filtered));
                if out.len() >= CANDIDATE_CAP {
                    break 'outer;
                }
            }
        }
    }
    out
}

/// Selects exactly `min(output_count, candidates.len())` candidates. When
/// oversupply exists: round-robin-by-first-clip-bucket fairness if
/// `different_starting_video` is on (spec §4.5), else a uniform
/// shuffle-and-truncate (spec §4.5, §5 — one of the three randomness sites).
fn select_plans(
    mut candidates: Vec<Candidate>,
    output_count: usize,
    different_starting_video: bool,
    rng: &mut PlannerRng,
) -> Vec<Candidate> {
    if candidates.len() <= output_count {
        return candidates;
    }
    if different_starting_video {
        return round_robin_by_first_clip(candidates, output_count, rng);
    }
    rng.shuffle(&mut candidates);
    candidates.truncate(output_count);
    candidates
}

fn round_robin_by_first_clip(
    candidates: Vec<Candidate>,
    output_count: usize,
    rng: &mut PlannerRng,
) -> Vec<Candidate> {
    let mut buckets: BTreeMap<ClipId, VecDeque<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        if let Some(first) = candidate.0.first().cloned() {
            buckets.entry(first).or_default().push_back(candidate);
        }
    }
    for bucket in buckets.values_mut() {
        let mut as_vec: Vec<Candidate> = bucket.drain(..).collect();
        rng.shuffle(&mut as_vec);
        *bucket = as_vec.into();
    }

    let mut out = Vec::with_capacity(output_count);
    loop {
        let mut progressed = false;
        for bucket in buckets.values_mut() {
            if out.len() >= output_count {
                return out;
            }
            if let Some(candidate) = bucket.pop_front() {
                out.push(candidate);
                progressed = true;
            }
        }
        if !progressed {
            return out;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::{
        AspectRatio, AudioMode, Bitrate, BTreeSpeeds, DurationDistributionMode, DurationType,
        FrameRate, GroupMixingMode, MetadataSource, Resolution,
    };

    fn settings(output_count: u32) -> MixingSettings {
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
            output_count,
        }
    }

    fn clips(ids: &[&str]) -> Vec<Clip> {
        ids.iter().map(|id| Clip::new(*id, format!("{id}.mp4"), 10.0)).collect()
    }

    #[test]
    fn rejects_single_clip_inputs() {
        let result = VariantPlanner::plan(&clips(&["a"]), &settings(1), 1);
        assert!(matches!(result, Err(MixingError::InsufficientInputs(1))));
    }

    #[test]
    fn two_clips_one_output_yields_one_complete_plan() {
        let plans = VariantPlanner::plan(&clips(&["a", "b"]), &settings(1), 1).unwrap();
        assert_eq!(plans.len(), 1);
        assert!(plans[0].is_complete());
        assert_eq!(plans[0].order, vec![ClipId::new("a"), ClipId::new("b")]);
    }

    #[test]
    fn order_mixing_with_two_clips_caps_at_two_distinct_plans() {
        let mut s = settings(4);
        s.order_mixing = true;
        let plans = VariantPlanner::plan(&clips(&["a", "b"]), &s, 1).unwrap();
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn different_starting_video_three_clips_gives_distinct_firsts() {
        let mut s = settings(3);
        s.different_starting_video = true;
        let plans = VariantPlanner::plan(&clips(&["a", "b", "c"]), &s, 7).unwrap();
        assert_eq!(plans.len(), 3);
        let mut firsts: Vec<_> = plans.iter().map(|p| p.order[0].clone()).collect();
        firsts.sort();
        firsts.dedup();
        assert_eq!(firsts.len(), 3);
    }

    #[test]
    fn every_plan_carries_neutered_settings() {
        let plans = VariantPlanner::plan(&clips(&["a", "b"]), &settings(1), 1).unwrap();
        assert!(!plans[0].settings.transitions_enabled);
        assert!(!plans[0].settings.color_grading_enabled);
    }

    #[test]
    fn oversupply_without_fairness_shuffles_and_truncates() {
        let mut s = settings(3);
        s.order_mixing = true;
        let clips = clips(&["a", "b", "c", "d"]);
        let plans = VariantPlanner::plan(&clips, &s, 5).unwrap();
        assert_eq!(plans.len(), 3);
        for plan in &plans {
            assert!(plan.is_complete());
        }
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let mut s = settings(5);
        s.order_mixing = true;
        s.different_starting_video = true;
        let clips = clips(&["a", "b", "c", "d"]);
        let first = VariantPlanner::plan(&clips, &s, 99).unwrap();
        let second = VariantPlanner::plan(&clips, &s, 99).unwrap();
        assert_eq!(first, second);
    }
}
