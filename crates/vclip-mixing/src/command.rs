//! Multi-input encoder argument-vector builder.
//!
//! Distinct from `vclip_media::command::FfmpegCommand`, which wraps exactly
//! one `-i`. The compiler's plans always carry two or more inputs bound
//! together through a filter-graph `concat`, so this builder accumulates an
//! arbitrary number of inputs plus the assembled filter-complex expression
//! and the mapped output streams.

use std::path::{Path, PathBuf};

/// Builder for a multi-input encoder argument vector.
#[derive(Debug, Clone)]
pub struct MultiInputCommand {
    inputs: Vec<PathBuf>,
    filter_complex: Option<String>,
    maps: Vec<String>,
    output_args: Vec<String>,
    output: PathBuf,
    overwrite: bool,
    log_level: String,
}

impl MultiInputCommand {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            filter_complex: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    pub fn add_input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    pub fn filter_complex(mut self, expr: impl Into<String>) -> Self {
        self.filter_complex = Some(expr.into());
        self
    }

    pub fn map(mut self, label: impl Into<String>) -> Self {
        self.maps.push(label.into());
        self
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    pub fn video_bitrate(self, kbps: u32) -> Self {
        self.output_arg("-b:v").output_arg(format!("{kbps}k"))
    }

    pub fn audio_bitrate(self, kbps: u32) -> Self {
        self.output_arg("-b:a").output_arg(format!("{kbps}k"))
    }

    pub fn pixel_format(self, fmt: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(fmt)
    }

    pub fn gop(self, size: u32) -> Self {
        self.output_arg("-g").output_arg(size.to_string())
    }

    pub fn min_keyframe_interval(self, size: u32) -> Self {
        self.output_arg("-keyint_min").output_arg(size.to_string())
    }

    pub fn movflags(self, flags: impl Into<String>) -> Self {
        self.output_arg("-movflags").output_arg(flags)
    }

    pub fn metadata(self, key: &str, value: &str) -> Self {
        self.output_arg("-metadata")
            .output_arg(format!("{key}={value}"))
    }

    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    pub fn duration_cap(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{seconds:.3}"))
    }

    /// Number of `-i` input specifiers this command will emit (spec §4.6
    /// command sanity check).
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }
        args.push("-v".to_string());
        args.push(self.log_level.clone());
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().to_string());
        }

        if let Some(filter) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(filter.clone());
        }

        for label in &self.maps {
            args.push("-map".to_string());
            args.push(label.clone());
        }

        args.extend(self.output_args.clone());
        args.push("-threads".to_string());
        args.push("0".to_string());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}
