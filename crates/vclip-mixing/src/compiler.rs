//! FilterGraphCompiler — turns one [`Plan`] plus settings plus a validated
//! clip inventory into an encoder argument vector and filter-graph string
//! (spec §4.6).

use std::collections::HashMap;
use std::path::Path;

use vclip_models::{AudioMode, Clip, ClipId, DurationType, Plan, TrimWindow};

use crate::canvas::{
    resolve_bitrate_tier, resolve_canvas, resolve_metadata_preset, AUDIO_BITRATE_KBPS,
    AUDIO_CHANNELS, AUDIO_SAMPLE_RATE, DEFAULT_AUDIO_CODEC, DEFAULT_VIDEO_CODEC, GOP_SIZE,
    MIN_KEYFRAME_INTERVAL, PIXEL_FORMAT,
};
use crate::command::MultiInputCommand;
use crate::duration::compute_trim_windows;
use crate::error::{MixingError, MixingResult};

const MIN_TRIM_WINDOW: f64 = 0.1;
const ATEMPO_EPSILON: f64 = 1e-9;

/// The result of compiling one plan: the argument vector ready to hand to
/// an encoder launcher, and the filter-graph expression embedded in it
/// (surfaced separately so tests can assert on it literally).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCommand {
    pub args: Vec<String>,
    pub filter_graph: String,
    /// Realized output duration in seconds, derived from the fixed-duration
    /// target or, for `DurationType::Original`, from the speed-adjusted
    /// clip durations the trim-window step already computed.
    pub output_duration_seconds: f64,
}

pub struct FilterGraphCompiler;

impl FilterGraphCompiler {
    /// Compiles `plan` against `inventory` into an argument vector writing
    /// to `output_path`.
    pub fn compile(
        plan: &Plan,
        inventory: &[Clip],
        output_path: &Path,
    ) -> MixingResult<CompiledCommand> {
        let by_id: HashMap<ClipId, &Clip> = inventory.iter().map(|c| (c.id.clone(), c)).collect();
        let resolved = validate_inventory(plan, &by_id)?;

        let settings = &plan.settings.settings;
        let canvas = resolve_canvas(settings.resolution, settings.aspect_ratio);
        let tier = resolve_bitrate_tier(settings.bitrate);
        let fps = settings.frame_rate.as_u32();

        let trim_windows = if settings.smart_trimming && settings.duration_type == DurationType::Fixed
        {
            let durations: HashMap<ClipId, f64> =
                resolved.iter().map(|c| (c.id.clone(), c.duration)).collect();
            compute_trim_windows(
                &plan.order,
                &durations,
                &plan.speeds,
                settings.fixed_duration,
                settings.duration_distribution_mode,
            )
        } else {
            HashMap::new()
        };

        let mut video_chains = Vec::with_capacity(resolved.len());
        let mut audio_chains = Vec::with_capacity(resolved.len());
        let mut command = MultiInputCommand::new(output_path);

        for (index, clip) in resolved.iter().enumerate() {
            command = command.add_input(&clip.path);

            let speed = *plan.speeds.get(&clip.id).unwrap_or(&1.0);
            let window = trim_windows.get(&clip.id);

            video_chains.push(build_video_chain(index, clip, window, speed, canvas, fps));

            if settings.audio_mode == AudioMode::Keep {
                audio_chains.push(build_audio_chain(index, speed));
            }
        }

        let concat_expr = build_concat_expr(resolved.len(), settings.audio_mode == AudioMode::Keep);

        let mut segments: Vec<String> = video_chains.clone();
        segments.extend(audio_chains.clone());
        segments.push(concat_expr.clone());
        let filter_graph = segments.join(";");

        command = command
            .filter_complex(filter_graph.clone())
            .map("[outv]");
        if settings.audio_mode == AudioMode::Keep {
            command = command.map("[outa]");
        }

        command = command
            .video_codec(DEFAULT_VIDEO_CODEC)
            .pixel_format(PIXEL_FORMAT)
            .movflags("+faststart")
            .gop(GOP_SIZE)
            .min_keyframe_interval(MIN_KEYFRAME_INTERVAL)
            .crf(tier.crf)
            .preset(tier.preset)
            .video_bitrate(tier.bitrate_kbps);

        command = if settings.audio_mode == AudioMode::Keep {
            command
                .audio_codec(DEFAULT_AUDIO_CODEC)
                .audio_bitrate(AUDIO_BITRATE_KBPS)
                .output_arg("-ar")
                .output_arg(AUDIO_SAMPLE_RATE.to_string())
                .output_arg("-ac")
                .output_arg(AUDIO_CHANNELS.to_string())
        } else {
            command.no_audio()
        };

        for (key, value) in resolve_metadata_preset(settings.metadata_source) {
            command = command.metadata(key, value);
        }

        if settings.duration_type == DurationType::Fixed && !settings.smart_trimming {
            command = command.duration_cap(settings.fixed_duration);
        }

        if command.input_count() != resolved.len() {
            return Err(MixingError::InputCountMismatch {
                input_specifiers: command.input_count(),
                plan_order_len: resolved.len(),
            });
        }

        let output_duration_seconds = if settings.duration_type == DurationType::Fixed {
            settings.fixed_duration
        } else {
            resolved
                .iter()
                .map(|clip| {
                    let speed = *plan.speeds.get(&clip.id).unwrap_or(&1.0);
                    clip.duration / speed
                })
                .sum()
        };

        let args = command.build_args();
        Ok(CompiledCommand {
            args,
            filter_graph,
            output_duration_seconds,
        })
    }
}

/// Resolves `plan.order` to `Clip`s, aggregating every missing id and every
/// clip whose file is unreachable into a single error (spec §4.6
/// validation gate).
fn validate_inventory<'a>(
    plan: &Plan,
    by_id: &HashMap<ClipId, &'a Clip>,
) -> MixingResult<Vec<&'a Clip>> {
    let mut missing_ids = Vec::new();
    let mut missing_files = Vec::new();
    let mut resolved = Vec::with_capacity(plan.order.len());

    for id in &plan.order {
        match by_id.get(id) {
            None => missing_ids.push(id.as_str().to_string()),
            Some(clip) => {
                if !clip.path.exists() {
                    missing_files.push(clip.path.to_string_lossy().to_string());
                } else {
                    resolved.push(*clip);
                }
            }
        }
    }

    if !missing_ids.is_empty() || !missing_files.is_empty() {
        return Err(MixingError::invalid_inventory(missing_ids, missing_files));
    }
    if resolved.len() < 2 {
        return Err(MixingError::InsufficientInputs(resolved.len()));
    }
    Ok(resolved)
}

fn build_video_chain(
    index: usize,
    clip: &Clip,
    window: Option<&TrimWindow>,
    speed: f64,
    canvas: crate::canvas::Canvas,
    fps: u32,
) -> String {
    let mut steps = Vec::new();

    if let Some(window) = window {
        let start = window.trim_start_src.max(0.0).min((clip.duration - MIN_TRIM_WINDOW).max(0.0));
        let end = window
            .trim_end_src
            .max(start + MIN_TRIM_WINDOW)
            .min(clip.duration);
        steps.push(format!("trim={start:.3}:{end:.3}"));
        steps.push("setpts=PTS-STARTPTS".to_string());
    }

    if (speed - 1.0).abs() > ATEMPO_EPSILON {
        steps.push(format!("setpts=({:.6})*PTS", 1.0 / speed));
    }

    steps.push(format!(
        "scale={}:{}:force_original_aspect_ratio=decrease",
        canvas.width, canvas.height
    ));
    steps.push(format!(
        "pad={}:{}:(ow-iw)/2:(oh-ih)/2:color=black",
        canvas.width, canvas.height
    ));
    steps.push(format!("fps={fps}"));

    format!("[{index}:v]{}[v{index}]", steps.join(","))
}

fn build_audio_chain(index: usize, speed: f64) -> String {
    let mut steps = vec![
        "aresample=48000".to_string(),
        "aformat=sample_fmts=fltp:sample_rates=48000:channel_layouts=stereo".to_string(),
    ];
    steps.extend(atempo_chain(speed));
    format!("[{index}:a:0?]{}[a{index}]", steps.join(","))
}

/// Chains `atempo` filters, halving or doubling the residual speed until
/// it lies in `[0.5, 2.0]` — the underlying audio tempo filter's supported
/// range (spec §4.3).
fn atempo_chain(speed: f64) -> Vec<String> {
    if (speed - 1.0).abs() < ATEMPO_EPSILON {
        return Vec::new();
    }
    let mut remaining = speed;
    let mut filters = Vec::new();
    while remaining > 2.0 {
        filters.push("atempo=2.0".to_string());
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        filters.push("atempo=0.5".to_string());
        remaining /= 0.5;
    }
    if (remaining - 1.0).abs() > ATEMPO_EPSILON {
        filters.push(format!("atempo={remaining:.6}"));
    }
    filters
}

fn build_concat_expr(n: usize, keep_audio: bool) -> String {
    let mut labels = String::new();
    for i in 0..n {
        labels.push_str(&format!("[v{i}]"));
        if keep_audio {
            labels.push_str(&format!("[a{i}]"));
        }
    }
    if keep_audio {
        format!("{labels}concat=n={n}:v=1:a=1[outv][outa]")
    } else {
        format!("{labels}concat=n={n}:v=1:a=0[outv]")
    }
}
