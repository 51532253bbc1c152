//! SmartDurationSolver — per-clip trim windows for a fixed target duration
//! (spec §4.4).

use std::collections::HashMap;

use vclip_models::{ClipId, DurationDistributionMode, TrimWindow};

const MIN_WINDOW_SECONDS: f64 = 0.1;

/// Computes a [`TrimWindow`] per clip in `order` so that, modulo clamping,
/// the sum of realised source-timeline durations (scaled back up by speed)
/// equals `fixed_duration`.
///
/// `durations` and `speeds` must both be indexed by the ids in `order`;
/// callers (the compiler) are responsible for that alignment having
/// already been validated.
pub fn compute_trim_windows(
    order: &[ClipId],
    durations: &HashMap<ClipId, f64>,
    speeds: &HashMap<ClipId, f64>,
    fixed_duration: f64,
    mode: DurationDistributionMode,
) -> HashMap<ClipId, TrimWindow> {
    let n = order.len();
    if n == 0 {
        return HashMap::new();
    }

    // Step 1: adjusted duration per clip.
    let adjusted: Vec<f64> = order
        .iter()
        .map(|id| durations[id] / speeds[id])
        .collect();
    let total_adjusted: f64 = adjusted.iter().sum();

    // Step 2: target per clip.
    let targets = compute_targets(&adjusted, total_adjusted, fixed_duration, mode, n);

    let mut out = HashMap::with_capacity(n);
    for (i, id) in order.iter().enumerate() {
        let speed = speeds[id];
        let clip_duration = durations[id];
        let adj = adjusted[i];
        let target = targets[i];

        // Step 3: centred trim in the adjusted timeline.
        let (trim_start_adj, trim_end_adj) = if adj > target {
            let excess = adj - target;
            let start = excess / 2.0;
            (start, start + target)
        } else {
            (0.0, adj)
        };

        // Step 4: convert to the source timeline by dividing by speed.
        let mut trim_start_src = trim_start_adj / speed;
        let mut trim_end_src = trim_end_adj / speed;

        // Step 5: clamp to the source clip, with a minimum-window guard.
        if trim_end_src > clip_duration {
            trim_end_src = clip_duration;
            let window = target.min(clip_duration);
            trim_start_src = (trim_end_src - window).max(0.0);
        }
        if trim_end_src - trim_start_src < MIN_WINDOW_SECONDS {
            trim_start_src = 0.0;
            trim_end_src = clip_duration;
        }

        out.insert(id.clone(), TrimWindow::new(trim_start_src, trim_end_src, target));
    }
    out
}

fn compute_targets(
    adjusted: &[f64],
    total_adjusted: f64,
    fixed_duration: f64,
    mode: DurationDistributionMode,
    n: usize,
) -> Vec<f64> {
    match mode {
        DurationDistributionMode::Equal => vec![fixed_duration / n as f64; n],
        DurationDistributionMode::Proportional => adjusted
            .iter()
            .map(|&a| {
                if total_adjusted > 0.0 {
                    a * fixed_duration / total_adjusted
                } else {
                    fixed_duration / n as f64
                }
            })
            .collect(),
        DurationDistributionMode::Weighted => {
            let weight = |i: usize| -> f64 {
                if i == 0 || i == n - 1 {
                    1.5
                } else {
                    1.0
                }
            };
            let total_weight: f64 = (0..n).map(weight).sum();
            (0..n).map(|i| weight(i) * fixed_duration / total_weight).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps(ids: &[&str], values: &[f64]) -> HashMap<ClipId, f64> {
        ids.iter()
            .map(|s| ClipId::new(*s))
            .zip(values.iter().copied())
            .collect()
    }

    #[test]
    fn proportional_distribution_centres_trim_symmetrically() {
        let order = vec![ClipId::new("a"), ClipId::new("b")];
        let durations = maps(&["a", "b"], &[30.0, 30.0]);
        let speeds = maps(&["a", "b"], &[1.0, 1.0]);
        let windows = compute_trim_windows(
            &order,
            &durations,
            &speeds,
            20.0,
            DurationDistributionMode::Proportional,
        );
        let a = windows[&ClipId::new("a")];
        let b = windows[&ClipId::new("b")];
        assert!((a.source_duration() - 10.0).abs() < 1e-9);
        assert!((b.source_duration() - 10.0).abs() < 1e-9);
        assert!((a.trim_start_src - 10.0).abs() < 1e-9);
        assert!((a.trim_end_src - 20.0).abs() < 1e-9);
    }

    #[test]
    fn equal_distribution_gives_identical_targets() {
        let order = vec![ClipId::new("a"), ClipId::new("b"), ClipId::new("c")];
        let durations = maps(&["a", "b", "c"], &[10.0, 20.0, 30.0]);
        let speeds = maps(&["a", "b", "c"], &[1.0, 1.0, 1.0]);
        let windows = compute_trim_windows(
            &order,
            &durations,
            &speeds,
            9.0,
            DurationDistributionMode::Equal,
        );
        for id in &order {
            assert!((windows[id].target_duration - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn weighted_distribution_favors_endpoints() {
        let order = vec![ClipId::new("a"), ClipId::new("b"), ClipId::new("c")];
        let durations = maps(&["a", "b", "c"], &[30.0, 30.0, 30.0]);
        let speeds = maps(&["a", "b", "c"], &[1.0, 1.0, 1.0]);
        let windows = compute_trim_windows(
            &order,
            &durations,
            &speeds,
            14.0,
            DurationDistributionMode::Weighted,
        );
        assert!(windows[&ClipId::new("a")].target_duration > windows[&ClipId::new("b")].target_duration);
        assert!(windows[&ClipId::new("c")].target_duration > windows[&ClipId::new("b")].target_duration);
    }

    #[test]
    fn clip_shorter_than_target_yields_full_clip_window() {
        let order = vec![ClipId::new("a"), ClipId::new("b")];
        let durations = maps(&["a", "b"], &[2.0, 30.0]);
        let speeds = maps(&["a", "b"], &[1.0, 1.0]);
        let windows = compute_trim_windows(
            &order,
            &durations,
            &speeds,
            20.0,
            DurationDistributionMode::Equal,
        );
        let a = windows[&ClipId::new("a")];
        assert_eq!(a.trim_start_src, 0.0);
        assert_eq!(a.trim_end_src, 2.0);
    }

    #[test]
    fn speed_affects_source_window_via_division() {
        // Clip runs at 2x: 20s source plays back as 10s adjusted.
        let order = vec![ClipId::new("a")];
        let durations = maps(&["a"], &[20.0]);
        let speeds = maps(&["a"], &[2.0]);
        let windows = compute_trim_windows(
            &order,
            &durations,
            &speeds,
            5.0,
            DurationDistributionMode::Equal,
        );
        let a = windows[&ClipId::new("a")];
        // adjusted = 10, target = 5, excess = 5, start_adj = 2.5, end_adj = 7.5
        // src = adj / speed => start_src = 1.25, end_src = 3.75
        assert!((a.trim_start_src - 1.25).abs() < 1e-9);
        assert!((a.trim_end_src - 3.75).abs() < 1e-9);
    }
}
