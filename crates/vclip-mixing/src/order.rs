//! OrderGenerator — clip-id sequence enumeration (spec §4.2).

use vclip_models::{Clip, ClipId, Group, GroupMixingMode};

use crate::rng::PlannerRng;

/// Flags consulted by the decision ladder.
#[derive(Debug, Clone, Copy)]
pub struct OrderFlags {
    pub order_mixing: bool,
    pub different_starting_video: bool,
    pub group_mixing: bool,
    pub group_mixing_mode: GroupMixingMode,
}

/// Produces clip-id sequences per the four-rule decision ladder. First
/// matching rule wins; see spec §4.2.
pub fn generate_orders(
    clips: &[Clip],
    groups: Option<&[Group]>,
    flags: OrderFlags,
    output_count: u32,
    rng: &mut PlannerRng,
) -> Vec<Vec<ClipId>> {
    let base: Vec<ClipId> = clips.iter().map(|c| c.id.clone()).collect();
    let n = base.len();

    // Rule 1: groups present and group_mixing.
    if flags.group_mixing {
        if let Some(groups) = groups {
            let non_empty: Vec<&Group> = groups.iter().filter(|g| !g.is_empty()).collect();
            if !non_empty.is_empty() {
                return generate_group_orders(&non_empty, flags.group_mixing_mode, output_count, rng);
            }
        }
    }

    // Rule 2: order_mixing on.
    if flags.order_mixing {
        let mut perms = all_permutations(&base);
        if flags.different_starting_video && perms.len() > 1 {
            return fair_partition_by_first(perms, n, output_count, rng);
        }
        perms.truncate(output_count as usize);
        return perms;
    }

    // Rule 3: different_starting_video without order_mixing -> rotations.
    if flags.different_starting_video {
        return (0..output_count as usize)
            .map(|i| rotate(&base, i % n.max(1)))
            .collect();
    }

    // Rule 4: default singleton.
    vec![base]
}

fn generate_group_orders(
    groups: &[&Group],
    mode: GroupMixingMode,
    output_count: u32,
    rng: &mut PlannerRng,
) -> Vec<Vec<ClipId>> {
    let mut out = Vec::with_capacity(output_count as usize);
    for _ in 0..output_count {
        let mut order_indices: Vec<usize> = (0..groups.len()).collect();
        if mode == GroupMixingMode::Random {
            rng.shuffle(&mut order_indices);
        }
        let mut sequence = Vec::new();
        for &idx in &order_indices {
            let group = groups[idx];
            if group.clips.is_empty() {
                continue;
            }
            let pick = rng.gen_index(group.clips.len());
            sequence.push(group.clips[pick].id.clone());
        }
        out.push(sequence);
    }
    out
}

/// Partitions `perms` by first element, shuffles each partition, then takes
/// up to `ceil(output_count / n)` from each partition in iteration order
/// until `output_count` is reached (spec §4.2 rule 2 fairness tiebreak).
fn fair_partition_by_first(
    perms: Vec<Vec<ClipId>>,
    n: usize,
    output_count: u32,
    rng: &mut PlannerRng,
) -> Vec<Vec<ClipId>> {
    use std::collections::BTreeMap;

    let mut buckets: BTreeMap<ClipId, Vec<Vec<ClipId>>> = BTreeMap::new();
    for perm in perms {
        if let Some(first) = perm.first().cloned() {
            buckets.entry(first).or_default().push(perm);
        }
    }
    for bucket in buckets.values_mut() {
        rng.shuffle(bucket);
    }

    let per_partition = output_count as usize / n.max(1) + if output_count as usize % n.max(1) != 0 { 1 } else { 0 };
    let mut out = Vec::with_capacity(output_count as usize);
    for bucket in buckets.values() {
        if out.len() >= output_count as usize {
            break;
        }
        let take = per_partition.min(bucket.len());
        for perm in bucket.iter().take(take) {
            if out.len() >= output_count as usize {
                break;
            }
            out.push(perm.clone());
        }
    }
    out
}

fn rotate(base: &[ClipId], offset: usize) -> Vec<ClipId> {
    let n = base.len();
    if n == 0 {
        return Vec::new();
    }
    (0..n).map(|i| base[(i + offset) % n].clone()).collect()
}

/// All permutations of `items`, via recursive Heap-style generation.
fn all_permutations(items: &[ClipId]) -> Vec<Vec<ClipId>> {
    let mut items = items.to_vec();
    let mut result = Vec::new();
    permute(&mut items, 0, &mut result);
    result
}

fn permute(items: &mut Vec<ClipId>, k: usize, out: &mut Vec<Vec<ClipId>>) {
    if k == items.len() {
        out.push(items.clone());
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, out);
        items.swap(k, i);
    }
}
