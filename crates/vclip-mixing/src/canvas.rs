//! Canvas resolution, bitrate/preset/CRF tiers, and metadata presets as
//! data rather than magic strings at each call site (spec §4.6, SPEC_FULL
//! §9 supplement — modeled the way the teacher models its FFmpeg filter
//! constants).

use std::collections::HashMap;

use vclip_models::{AspectRatio, Bitrate, MetadataSource};

pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const GOP_SIZE: u32 = 250;
pub const MIN_KEYFRAME_INTERVAL: u32 = 25;
pub const AUDIO_BITRATE_KBPS: u32 = 128;
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;
pub const AUDIO_CHANNELS: u32 = 2;

/// Output frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Resolves a canvas from `resolution` and `aspect_ratio` per spec §4.6:
/// vertical presets and the square preset override the base resolution
/// entirely; `original` and `youtube` keep/restate the base.
pub fn resolve_canvas(resolution: vclip_models::Resolution, aspect_ratio: AspectRatio) -> Canvas {
    use vclip_models::Resolution;

    let base = match resolution {
        Resolution::Sd => Canvas::new(854, 480),
        Resolution::Hd => Canvas::new(1280, 720),
        Resolution::FullHd => Canvas::new(1920, 1080),
    };

    match aspect_ratio {
        AspectRatio::TikTok | AspectRatio::InstagramReels | AspectRatio::YouTubeShorts => {
            Canvas::new(1080, 1920)
        }
        AspectRatio::InstagramSquare => Canvas::new(1080, 1080),
        AspectRatio::YouTube => Canvas::new(1920, 1080),
        AspectRatio::Original => base,
    }
}

/// Encoder preset, CRF, and target video bitrate for a [`Bitrate`] tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitrateTier {
    pub preset: &'static str,
    pub crf: u8,
    pub bitrate_kbps: u32,
}

pub fn resolve_bitrate_tier(bitrate: Bitrate) -> BitrateTier {
    match bitrate {
        Bitrate::Low => BitrateTier {
            preset: "faster",
            crf: 28,
            bitrate_kbps: 1_000,
        },
        Bitrate::Medium => BitrateTier {
            preset: "medium",
            crf: 23,
            bitrate_kbps: 4_000,
        },
        Bitrate::High => BitrateTier {
            preset: "slow",
            crf: 18,
            bitrate_kbps: 8_000,
        },
    }
}

/// Container metadata key/value pairs injected per `metadata_source`.
/// `normal` injects nothing.
pub fn resolve_metadata_preset(source: MetadataSource) -> HashMap<&'static str, &'static str> {
    match source {
        MetadataSource::Normal => HashMap::new(),
        MetadataSource::CapCut => HashMap::from([
            ("encoder", "CapCut 11.0.0"),
            ("software", "CapCut"),
            ("comment", "Exported by CapCut"),
            ("handler_name", "CapCutHandler"),
        ]),
        MetadataSource::Vn => HashMap::from([
            ("encoder", "VN Video Editor"),
            ("software", "VN"),
            ("comment", "Exported by VN"),
            ("handler_name", "VNHandler"),
        ]),
        MetadataSource::InShot => HashMap::from([
            ("encoder", "InShot Inc."),
            ("software", "InShot"),
            ("comment", "Exported by InShot"),
            ("handler_name", "InShotHandler"),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::Resolution;

    #[test]
    fn vertical_presets_override_base_resolution() {
        let canvas = resolve_canvas(Resolution::FullHd, AspectRatio::TikTok);
        assert_eq!(canvas, Canvas::new(1080, 1920));
    }

    #[test]
    fn original_keeps_base_resolution() {
        let canvas = resolve_canvas(Resolution::Sd, AspectRatio::Original);
        assert_eq!(canvas, Canvas::new(854, 480));
    }

    #[test]
    fn square_preset_is_1080_square() {
        assert_eq!(
            resolve_canvas(Resolution::Hd, AspectRatio::InstagramSquare),
            Canvas::new(1080, 1080)
        );
    }

    #[test]
    fn bitrate_tiers_match_spec_table() {
        assert_eq!(resolve_bitrate_tier(Bitrate::Low).crf, 28);
        assert_eq!(resolve_bitrate_tier(Bitrate::Medium).preset, "medium");
        assert_eq!(resolve_bitrate_tier(Bitrate::High).bitrate_kbps, 8_000);
    }

    #[test]
    fn normal_metadata_is_empty() {
        assert!(resolve_metadata_preset(MetadataSource::Normal).is_empty());
    }

    #[test]
    fn capcut_metadata_has_four_keys() {
        assert_eq!(resolve_metadata_preset(MetadataSource::CapCut).len(), 4);
    }
}
