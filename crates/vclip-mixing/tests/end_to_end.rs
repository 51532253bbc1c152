//! End-to-end planner + compiler scenarios (spec §8).

use std::collections::HashMap;
use std::path::Path;

use vclip_mixing::{FilterGraphCompiler, MixingError, VariantPlanner};
use vclip_models::{
    AspectRatio, AudioMode, Bitrate, BTreeSpeeds, Clip, ClipId, DurationDistributionMode,
    DurationType, FrameRate, GroupMixingMode, MetadataSource, MixingSettings, Resolution,
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

fn on_disk_clip(id: &str, duration: f64) -> Clip {
    let path = std::env::temp_dir().join(format!("vclip-mixing-e2e-{id}.mp4"));
    std::fs::write(&path, b"fake").unwrap();
    Clip::new(id, path, duration)
}

/// Scenario 1: two clips, one mute HD output, no trim, no speed change.
#[test]
fn scenario_1_two_clip_mute_hd_default() {
    let a = on_disk_clip("e2e1a", 10.0);
    let b = on_disk_clip("e2e1b", 20.0);
    let mut s = settings(1);
    s.audio_mode = AudioMode::Mute;

    let plans = VariantPlanner::plan(&[a.clone(), b.clone()], &s, 1).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].order, vec![ClipId::new("e2e1a"), ClipId::new("e2e1b")]);
    assert_eq!(plans[0].speeds[&ClipId::new("e2e1a")], 1.0);
    assert_eq!(plans[0].speeds[&ClipId::new("e2e1b")], 1.0);

    let compiled =
        FilterGraphCompiler::compile(&plans[0], &[a, b], Path::new("scenario1.mp4")).unwrap();
    assert_eq!(compiled.args.iter().filter(|a| *a == "-i").count(), 2);
    assert!(compiled.args.contains(&"-an".to_string()));
    assert!(compiled.filter_graph.contains("scale=1280:720"));
    assert!(compiled.filter_graph.contains("pad=1280:720"));
    assert!(compiled.filter_graph.contains("concat=n=2:v=1:a=0[outv]"));
    assert!(!compiled.filter_graph.contains("trim="));
    assert!(!compiled.filter_graph.contains("setpts=(0"));
}

/// Scenario 2: three clips, fairness rotation without order mixing.
#[test]
fn scenario_2_rotation_without_order_mixing() {
    let clips = vec![
        on_disk_clip("e2e2a", 10.0),
        on_disk_clip("e2e2b", 10.0),
        on_disk_clip("e2e2c", 10.0),
    ];
    let mut s = settings(3);
    s.different_starting_video = true;

    let plans = VariantPlanner::plan(&clips, &s, 1).unwrap();
    let orders: Vec<Vec<ClipId>> = plans.iter().map(|p| p.order.clone()).collect();
    assert_eq!(
        orders,
        vec![
            vec![ClipId::new("e2e2a"), ClipId::new("e2e2b"), ClipId::new("e2e2c")],
            vec![ClipId::new("e2e2b"), ClipId::new("e2e2c"), ClipId::new("e2e2a")],
            vec![ClipId::new("e2e2c"), ClipId::new("e2e2a"), ClipId::new("e2e2b")],
        ]
    );
}

/// Scenario 3: smart trimming centres trims; no post-concat cap.
#[test]
fn scenario_3_smart_trimming_proportional() {
    let a = on_disk_clip("e2e3a", 30.0);
    let b = on_disk_clip("e2e3b", 30.0);
    let mut s = settings(1);
    s.duration_type = DurationType::Fixed;
    s.fixed_duration = 20.0;
    s.smart_trimming = true;
    s.duration_distribution_mode = DurationDistributionMode::Proportional;
    s.speed_mixing = false;

    let plans = VariantPlanner::plan(&[a.clone(), b.clone()], &s, 1).unwrap();
    let compiled =
        FilterGraphCompiler::compile(&plans[0], &[a, b], Path::new("scenario3.mp4")).unwrap();

    assert_eq!(compiled.filter_graph.matches("trim=10.000:20.000").count(), 2);
    assert!(!compiled.args.contains(&"-t".to_string()));
}

/// Scenario 4: fixed duration without smart trimming caps post-concat.
#[test]
fn scenario_4_fixed_duration_no_smart_trim() {
    let a = on_disk_clip("e2e4a", 30.0);
    let b = on_disk_clip("e2e4b", 30.0);
    let mut s = settings(1);
    s.duration_type = DurationType::Fixed;
    s.fixed_duration = 20.0;
    s.smart_trimming = false;

    let plans = VariantPlanner::plan(&[a.clone(), b.clone()], &s, 1).unwrap();
    let compiled =
        FilterGraphCompiler::compile(&plans[0], &[a, b], Path::new("scenario4.mp4")).unwrap();

    assert!(!compiled.filter_graph.contains("trim="));
    let pos = compiled.args.iter().position(|a| a == "-t").unwrap();
    assert_eq!(compiled.args[pos + 1], "20.000");
}

/// Scenario 5: a single-clip job is rejected before any plan is emitted.
#[test]
fn scenario_5_single_clip_job_rejected() {
    let a = on_disk_clip("e2e5a", 10.0);
    let s = settings(1);
    let result = VariantPlanner::plan(&[a], &s, 1);
    assert!(matches!(result, Err(MixingError::InsufficientInputs(1))));
}

/// Scenario 6: minimal-variation speeds for five outputs differ in at
/// least one value each, drawn from the five-element palette.
#[test]
fn scenario_6_minimal_variation_speeds_differ() {
    let clips = vec![
        on_disk_clip("e2e6a", 10.0),
        on_disk_clip("e2e6b", 10.0),
        on_disk_clip("e2e6c", 10.0),
    ];
    let mut s = settings(5);
    s.speed_mixing = false;

    let plans = VariantPlanner::plan(&clips, &s, 3).unwrap();
    assert_eq!(plans.len(), 5);

    let mut seen: HashMap<String, ()> = HashMap::new();
    for plan in &plans {
        let mut values: Vec<String> = plan.order.iter().map(|id| format!("{:.2}", plan.speeds[id])).collect();
        values.sort();
        seen.insert(values.join(","), ());
    }
    assert!(seen.len() > 1);
}
