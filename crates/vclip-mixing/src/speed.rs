//! SpeedGenerator — per-clip speed-multiplier maps (spec §4.3).

use std::collections::HashMap;

use vclip_models::ClipId;

/// Minimal-variation palette used when `speed_mixing` is off but more than
/// one output is requested — guarantees byte-distinct outputs without an
/// audible or visible speed change.
pub const MINIMAL_VARIATION_PALETTE: [f64; 5] = [0.95, 0.97, 1.00, 1.02, 1.05];

/// Produces `output_count` maps of clip-id to speed multiplier.
pub fn generate_speeds(
    clip_ids: &[ClipId],
    allowed_speeds: &[f64],
    speed_mixing: bool,
    output_count: u32,
) -> Vec<HashMap<ClipId, f64>> {
    if speed_mixing {
        return cartesian_odometer(clip_ids, allowed_speeds);
    }
    if output_count > 1 {
        return (0..output_count as usize)
            .map(|i| minimal_variation_map(clip_ids, i))
            .collect();
    }
    vec![all_ones(clip_ids)]
}

fn all_ones(clip_ids: &[ClipId]) -> HashMap<ClipId, f64> {
    clip_ids.iter().map(|id| (id.clone(), 1.0)).collect()
}

fn minimal_variation_map(clip_ids: &[ClipId], output_index: usize) -> HashMap<ClipId, f64> {
    clip_ids
        .iter()
        .enumerate()
        .map(|(clip_index, id)| {
            let palette_index = (output_index + clip_index) % MINIMAL_VARIATION_PALETTE.len();
            (id.clone(), MINIMAL_VARIATION_PALETTE[palette_index])
        })
        .collect()
}

/// Full Cartesian product over `allowed_speeds`, emitted in odometer order
/// (rightmost clip index increments fastest).
fn cartesian_odometer(clip_ids: &[ClipId], allowed_speeds: &[f64]) -> Vec<HashMap<ClipId, f64>> {
    if clip_ids.is_empty() || allowed_speeds.is_empty() {
        return Vec::new();
    }
    let n = clip_ids.len();
    let s = allowed_speeds.len();
    let mut indices = vec![0usize; n];
    let mut out = Vec::new();

    loop {
        let map: HashMap<ClipId, f64> = clip_ids
            .iter()
            .zip(indices.iter())
            .map(|(id, &idx)| (id.clone(), allowed_speeds[idx]))
            .collect();
        out.push(map);

        // Increment the rightmost digit, carrying as needed.
        let mut pos = n - 1;
        loop {
            indices[pos] += 1;
            if indices[pos] < s {
                break;
            }
            indices[pos] = 0;
            if pos == 0 {
                return out;
            }
            pos -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<ClipId> {
        names.iter().map(|n| ClipId::new(*n)).collect()
    }

    #[test]
    fn single_output_without_speed_mixing_is_all_ones() {
        let speeds = generate_speeds(&ids(&["a", "b"]), &[1.0, 1.5], false, 1);
        assert_eq!(speeds.len(), 1);
        assert!(speeds[0].values().all(|&v| v == 1.0));
    }

    #[test]
    fn minimal_variation_differs_across_outputs() {
        let speeds = generate_speeds(&ids(&["a", "b", "c"]), &[1.0], false, 5);
        assert_eq!(speeds.len(), 5);
        let distinct: std::collections::HashSet<_> = speeds
            .iter()
            .map(|m| {
                let mut v: Vec<_> = m.values().map(|f| (*f * 1000.0) as i64).collect();
                v.sort();
                v
            })
            .collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn cartesian_product_has_s_pow_n_entries_in_odometer_order() {
        let speeds = generate_speeds(&ids(&["a", "b"]), &[0.9, 1.0], true, 100);
        assert_eq!(speeds.len(), 4);
        // Odometer: last clip's index increments fastest.
        assert_eq!(speeds[0][&ClipId::new("a")], 0.9);
        assert_eq!(speeds[0][&ClipId::new("b")], 0.9);
        assert_eq!(speeds[1][&ClipId::new("b")], 1.0);
        assert_eq!(speeds[1][&ClipId::new("a")], 0.9);
        assert_eq!(speeds[2][&ClipId::new("a")], 1.0);
    }
}
