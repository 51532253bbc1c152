//! MixingSettings — the closed option set the core consumes (spec §3).
//!
//! Modeled as a closed record of enum variants rather than a stringly-typed
//! dictionary (§9 Design Notes — "Union-of-booleans settings object"): each
//! enum field parses from a caller-supplied token through `FromStr`, and an
//! unrecognized token produces a single `SettingsError::UnknownEnumValue`
//! naming the accepted set, rather than silently doing the wrong thing.

use std::collections::BTreeSet;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a [`MixingSettings`] value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    #[error("unknown value {value:?} for field {field}; accepted: {accepted:?}")]
    UnknownEnumValue {
        field: &'static str,
        value: String,
        accepted: &'static [&'static str],
    },
    #[error("allowed_speeds must be non-empty and contain 1.0, got {0:?}")]
    InvalidAllowedSpeeds(Vec<f64>),
    #[error("output_count must be a positive integer, got {0}")]
    InvalidOutputCount(i64),
    #[error("fixed_duration must be positive when duration_type=fixed, got {0}")]
    InvalidFixedDuration(f64),
}

/// A field that can be parsed from a caller token, has a single documented
/// fallback default, and can enumerate its accepted tokens for error
/// messages (§6 "unknown tokens ... fall back to a documented default").
pub trait ClosedEnumField: Sized + Copy {
    const FIELD: &'static str;
    const ACCEPTED: &'static [&'static str];
    fn default_value() -> Self;
    fn parse_token(token: &str) -> Option<Self>;
}

/// Parse `token` into `T`, returning the documented default and a warning
/// message when the token is not recognized.
pub fn parse_or_default<T: ClosedEnumField>(token: &str) -> (T, Option<SettingsError>) {
    match T::parse_token(token) {
        Some(v) => (v, None),
        None => (
            T::default_value(),
            Some(SettingsError::UnknownEnumValue {
                field: T::FIELD,
                value: token.to_string(),
                accepted: T::ACCEPTED,
            }),
        ),
    }
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident { field = $field:literal, default = $default:ident,
            $($variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_token(s).ok_or(())
            }
        }

        impl ClosedEnumField for $name {
            const FIELD: &'static str = $field;
            const ACCEPTED: &'static [&'static str] = &[$($token),+];

            fn default_value() -> Self {
                Self::$default
            }

            fn parse_token(token: &str) -> Option<Self> {
                match token {
                    $($token => Some(Self::$variant)),+,
                    _ => None,
                }
            }
        }
    };
}

closed_enum!(
    /// How groups are walked when `group_mixing` is on.
    GroupMixingMode { field = "group_mixing_mode", default = Random,
        Strict => "strict",
        Random => "random",
    }
);

closed_enum!(
    /// Container metadata key/value preset.
    MetadataSource { field = "metadata_source", default = Normal,
        Normal => "normal",
        CapCut => "capcut",
        Vn => "vn",
        InShot => "inshot",
    }
);

closed_enum!(
    /// Target video bitrate / encoder preset tier.
    Bitrate { field = "bitrate", default = Medium,
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

closed_enum!(
    /// Base canvas resolution before aspect-ratio override.
    Resolution { field = "resolution", default = Hd,
        Sd => "sd",
        Hd => "hd",
        FullHd => "fullhd",
    }
);

closed_enum!(
    /// Output frames per second.
    FrameRate { field = "frame_rate", default = Fps30,
        Fps24 => "24",
        Fps30 => "30",
        Fps60 => "60",
    }
);

impl FrameRate {
    pub fn as_u32(&self) -> u32 {
        match self {
            FrameRate::Fps24 => 24,
            FrameRate::Fps30 => 30,
            FrameRate::Fps60 => 60,
        }
    }
}

closed_enum!(
    /// Output canvas aspect-ratio preset.
    AspectRatio { field = "aspect_ratio", default = Original,
        Original => "original",
        TikTok => "tiktok",
        InstagramReels => "instagram_reels",
        InstagramSquare => "instagram_square",
        YouTube => "youtube",
        YouTubeShorts => "youtube_shorts",
    }
);

closed_enum!(
    /// Whether output length is source-driven or target-driven.
    DurationType { field = "duration_type", default = Original,
        Original => "original",
        Fixed => "fixed",
    }
);

closed_enum!(
    /// How a fixed target duration is apportioned across clips.
    DurationDistributionMode { field = "duration_distribution_mode", default = Proportional,
        Proportional => "proportional",
        Equal => "equal",
        Weighted => "weighted",
    }
);

closed_enum!(
    /// Whether the filter graph produces an audio stream.
    AudioMode { field = "audio_mode", default = Keep,
        Keep => "keep",
        Mute => "mute",
    }
);

/// The closed option set the core consumes (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixingSettings {
    pub order_mixing: bool,
    pub speed_mixing: bool,
    pub different_starting_video: bool,
    /// Candidate speed multipliers; must include 1.0.
    pub allowed_speeds: BTreeSpeeds,
    pub group_mixing: bool,
    pub group_mixing_mode: GroupMixingMode,
    pub metadata_source: MetadataSource,
    pub bitrate: Bitrate,
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    pub aspect_ratio: AspectRatio,
    pub duration_type: DurationType,
    pub fixed_duration: f64,
    pub duration_distribution_mode: DurationDistributionMode,
    pub smart_trimming: bool,
    pub audio_mode: AudioMode,
    pub output_count: u32,
}

/// Newtype over a sorted, deduplicated set of positive speed multipliers.
/// A `BTreeSet<f64>` can't derive `Eq`/`Hash` directly because `f64` isn't
/// `Ord`; this wraps a `Vec<f64>` kept sorted and deduplicated by
/// construction so odometer enumeration (§4.3) is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BTreeSpeeds(Vec<f64>);

impl BTreeSpeeds {
    pub fn new(mut speeds: Vec<f64>) -> Result<Self, SettingsError> {
        speeds.retain(|s| s.is_finite() && *s > 0.0);
        speeds.sort_by(|a, b| a.partial_cmp(b).unwrap());
        speeds.dedup();
        if speeds.is_empty() || !speeds.iter().any(|s| (*s - 1.0).abs() < 1e-9) {
            return Err(SettingsError::InvalidAllowedSpeeds(speeds));
        }
        Ok(Self(speeds))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl MixingSettings {
    /// Arithmetic-level validation independent of any clip inventory
    /// (spec §7 "Planner arithmetic errors").
    pub fn validate_arithmetic(&self) -> Result<(), SettingsError> {
        if self.output_count == 0 {
            return Err(SettingsError::InvalidOutputCount(self.output_count as i64));
        }
        if self.duration_type == DurationType::Fixed && self.fixed_duration <= 0.0 {
            return Err(SettingsError::InvalidFixedDuration(self.fixed_duration));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_resolution_falls_back_to_hd_with_warning() {
        let (value, warning) = parse_or_default::<Resolution>("potato");
        assert_eq!(value, Resolution::Hd);
        assert!(warning.is_some());
    }

    #[test]
    fn known_token_parses_without_warning() {
        let (value, warning) = parse_or_default::<Bitrate>("high");
        assert_eq!(value, Bitrate::High);
        assert!(warning.is_none());
    }

    #[test]
    fn allowed_speeds_must_include_one() {
        assert!(BTreeSpeeds::new(vec![0.9, 1.1]).is_err());
        assert!(BTreeSpeeds::new(vec![1.0, 0.9, 1.1]).is_ok());
    }

    #[test]
    fn allowed_speeds_dedup_and_sort() {
        let speeds = BTreeSpeeds::new(vec![1.0, 1.0, 0.5, 2.0]).unwrap();
        assert_eq!(speeds.as_slice(), &[0.5, 1.0, 2.0]);
    }

    #[test]
    fn arithmetic_validation_rejects_zero_output_count() {
        let settings = sample_settings(0);
        assert!(settings.validate_arithmetic().is_err());
    }

    #[test]
    fn arithmetic_validation_rejects_nonpositive_fixed_duration_when_fixed() {
        let mut settings = sample_settings(1);
        settings.duration_type = DurationType::Fixed;
        settings.fixed_duration = 0.0;
        assert!(settings.validate_arithmetic().is_err());
    }

    fn sample_settings(output_count: u32) -> MixingSettings {
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
}
