//! `vclip-mix` — CLI entry point for the variant planner and filter-graph
//! compiler (spec §6 "CLI surface").

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vclip_models::{
    parse_or_default, AspectRatio, AudioMode, Bitrate, BTreeSpeeds, Clip,
    DurationDistributionMode, DurationType, FrameRate, Group, GroupMixingMode, JobId,
    MetadataSource, MixingSettings, Resolution,
};
use vclip_worker::driver::JobDriver;
use vclip_worker::launcher::FfmpegEncoderLauncher;
use vclip_worker::sink::{LoggingRecordSink, LoggingStatusSink};
use vclip_worker::WorkerConfig;

/// Variant planner and filter-graph compiler: enumerates clip-order/
/// speed/trim variants and runs each through an FFmpeg encode.
#[derive(Parser, Debug)]
#[command(name = "vclip-mix")]
struct Cli {
    /// JSON file containing an array of clips (`Clip`'s serde form).
    #[arg(long, conflicts_with = "clips_dir")]
    clips_json: Option<PathBuf>,

    /// Directory containing a `manifest.json` clip array; clip paths are
    /// resolved relative to this directory.
    #[arg(long, conflicts_with = "clips_json")]
    clips_dir: Option<PathBuf>,

    /// JSON file containing an array of groups (`Group`'s serde form);
    /// clip paths inside each group resolve relative to this file's
    /// directory. Only consulted when `--group-mixing` is set.
    #[arg(long)]
    groups_json: Option<PathBuf>,

    /// Directory to write encoded outputs into.
    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,

    /// RNG seed; a fixed `(clips, settings, seed)` triple is reproducible.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long)]
    order_mixing: bool,
    #[arg(long)]
    speed_mixing: bool,
    #[arg(long)]
    different_starting_video: bool,
    #[arg(long)]
    group_mixing: bool,
    #[arg(long)]
    smart_trimming: bool,

    /// Comma-separated speed multipliers; must include 1.0.
    #[arg(long, default_value = "1.0", value_delimiter = ',')]
    allowed_speeds: Vec<f64>,

    #[arg(long, default_value = "random")]
    group_mixing_mode: String,
    #[arg(long, default_value = "normal")]
    metadata_source: String,
    #[arg(long, default_value = "medium")]
    bitrate: String,
    #[arg(long, default_value = "hd")]
    resolution: String,
    #[arg(long, default_value = "30")]
    frame_rate: String,
    #[arg(long, default_value = "original")]
    aspect_ratio: String,
    #[arg(long, default_value = "original")]
    duration_type: String,
    #[arg(long, default_value_t = 0.0)]
    fixed_duration: f64,
    #[arg(long, default_value = "proportional")]
    duration_distribution_mode: String,
    #[arg(long, default_value = "keep")]
    audio_mode: String,

    #[arg(long, default_value_t = 1)]
    output_count: u32,
}

fn resolve_enum<T: vclip_models::ClosedEnumField>(token: &str) -> T {
    let (value, warning) = parse_or_default(token);
    if let Some(warning) = warning {
        tracing::warn!(%warning, "falling back to documented default");
    }
    value
}

fn build_settings(cli: &Cli) -> Result<MixingSettings, Box<dyn std::error::Error>> {
    let allowed_speeds = BTreeSpeeds::new(cli.allowed_speeds.clone())?;

    Ok(MixingSettings {
        order_mixing: cli.order_mixing,
        speed_mixing: cli.speed_mixing,
        different_starting_video: cli.different_starting_video,
        allowed_speeds,
        group_mixing: cli.group_mixing,
        group_mixing_mode: resolve_enum::<GroupMixingMode>(&cli.group_mixing_mode),
        metadata_source: resolve_enum::<MetadataSource>(&cli.metadata_source),
        bitrate: resolve_enum::<Bitrate>(&cli.bitrate),
        resolution: resolve_enum::<Resolution>(&cli.resolution),
        frame_rate: resolve_enum::<FrameRate>(&cli.frame_rate),
        aspect_ratio: resolve_enum::<AspectRatio>(&cli.aspect_ratio),
        duration_type: resolve_enum::<DurationType>(&cli.duration_type),
        fixed_duration: cli.fixed_duration,
        duration_distribution_mode: resolve_enum::<DurationDistributionMode>(
            &cli.duration_distribution_mode,
        ),
        smart_trimming: cli.smart_trimming,
        audio_mode: resolve_enum::<AudioMode>(&cli.audio_mode),
        output_count: cli.output_count,
    })
}

fn load_clips(cli: &Cli) -> Result<Vec<Clip>, Box<dyn std::error::Error>> {
    let (manifest_path, base_dir) = match (&cli.clips_json, &cli.clips_dir) {
        (Some(path), None) => (path.clone(), path.parent().map(PathBuf::from)),
        (None, Some(dir)) => (dir.join("manifest.json"), Some(dir.clone())),
        _ => return Err("exactly one of --clips-json or --clips-dir is required".into()),
    };

    let raw = std::fs::read_to_string(&manifest_path)?;
    let mut clips: Vec<Clip> = serde_json::from_str(&raw)?;

    if let Some(base) = base_dir {
        for clip in &mut clips {
            if clip.path.is_relative() {
                clip.path = base.join(&clip.path);
            }
        }
    }

    Ok(clips)
}

fn load_groups(cli: &Cli) -> Result<Option<Vec<Group>>, Box<dyn std::error::Error>> {
    let Some(manifest_path) = &cli.groups_json else {
        return Ok(None);
    };

    let raw = std::fs::read_to_string(manifest_path)?;
    let mut groups: Vec<Group> = serde_json::from_str(&raw)?;

    if let Some(base) = manifest_path.parent() {
        for group in &mut groups {
            for clip in &mut group.clips {
                if clip.path.is_relative() {
                    clip.path = base.join(&clip.path);
                }
            }
        }
    }

    Ok(Some(groups))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive("vclip=info".parse().unwrap()))
        .init();

    let cli = Cli::parse();

    let clips = match load_clips(&cli) {
        Ok(clips) => clips,
        Err(e) => {
            tracing::error!(error = %e, "failed to load clip inventory");
            std::process::exit(1);
        }
    };

    let settings = match build_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "invalid settings");
            std::process::exit(1);
        }
    };

    let groups = match load_groups(&cli) {
        Ok(groups) => groups,
        Err(e) => {
            tracing::error!(error = %e, "failed to load group manifest");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&cli.output_dir) {
        tracing::error!(error = %e, "failed to create output directory");
        std::process::exit(1);
    }

    let config = WorkerConfig::from_env();
    let job_id = JobId::new();
    tracing::info!(%job_id, "starting mix job");

    let driver = JobDriver::new();
    let status_sink = LoggingStatusSink;
    let record_sink = LoggingRecordSink;

    let timeout_secs = config.job_timeout.as_secs();
    let result = driver
        .run_job(
            job_id,
            &clips,
            groups.as_deref(),
            &settings,
            cli.seed,
            &cli.output_dir,
            |cancel_rx| FfmpegEncoderLauncher::new(cancel_rx, Some(timeout_secs)),
            &status_sink,
            &record_sink,
        )
        .await;

    if let Err(e) = result {
        tracing::error!(error = %e, "mix job failed");
        std::process::exit(1);
    }
}
