//! Worker error types.
//!
//! Classifies encoder stderr the same way the teacher's `WorkerError`
//! classifies `yt-dlp`/network stderr into a permanent-vs-retryable split —
//! by matching known substrings against a user-message family, rather than
//! inspecting the exit code alone (spec §6, §7).

use thiserror::Error;

use vclip_mixing::MixingError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("job failed: {0}")]
    JobFailed(String),

    #[error("planning or compilation failed: {0}")]
    Mixing(#[from] MixingError),

    #[error("encoder exited with a failure: {0}")]
    EncoderFailed(EncoderFailure),

    #[error("media process error: {0}")]
    Media(#[from] vclip_media::MediaError),

    #[error("job was cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An encoder failure classified into one of the user-message families
/// listed in spec §6's "known error families" clause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{family}: {detail}")]
pub struct EncoderFailure {
    pub family: EncoderFailureFamily,
    pub detail: String,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderFailureFamily {
    MissingInput,
    InvalidFormat,
    UnreadableCodec,
    CorruptedMoov,
    UnsupportedCodec,
    Generic,
}

impl std::fmt::Display for EncoderFailureFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EncoderFailureFamily::MissingInput => "missing input file",
            EncoderFailureFamily::InvalidFormat => "invalid input format",
            EncoderFailureFamily::UnreadableCodec => "unreadable codec parameters",
            EncoderFailureFamily::CorruptedMoov => "corrupted moov atom",
            EncoderFailureFamily::UnsupportedCodec => "unsupported codec",
            EncoderFailureFamily::Generic => "encoder failure",
        };
        write!(f, "{label}")
    }
}

/// Classifies a non-zero encoder exit by matching its stderr tail against
/// known patterns (spec §6: "known error families").
pub fn classify_encoder_failure(stderr_tail: &str, exit_code: Option<i32>) -> EncoderFailure {
    let msg = stderr_tail.to_lowercase();

    let family = if msg.contains("no such file or directory") {
        EncoderFailureFamily::MissingInput
    } else if msg.contains("moov atom not found") || msg.contains("moov atom") {
        EncoderFailureFamily::CorruptedMoov
    } else if msg.contains("invalid data found when processing input") {
        EncoderFailureFamily::InvalidFormat
    } else if msg.contains("unsupported codec") || msg.contains("encoder not found") {
        EncoderFailureFamily::UnsupportedCodec
    } else if msg.contains("invalid argument") && msg.contains("codec") {
        EncoderFailureFamily::UnreadableCodec
    } else {
        EncoderFailureFamily::Generic
    };

    EncoderFailure {
        family,
        detail: stderr_tail.to_string(),
        exit_code,
    }
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    /// Check if error is retryable per the external retry policy
    /// collaborator (spec §7 — "retriable per the external retry policy").
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::EncoderFailed(failure) => {
                !matches!(failure.family, EncoderFailureFamily::UnsupportedCodec)
            }
            WorkerError::Media(_) => true,
            _ => false,
        }
    }

    /// Permanent failures are never retried regardless of attempts
    /// remaining (spec §7 — compiler consistency errors are "fatal,
    /// non-retriable").
    pub fn is_permanent_failure(&self) -> bool {
        matches!(
            self,
            WorkerError::Mixing(MixingError::InputCountMismatch { .. })
                | WorkerError::Mixing(MixingError::InsufficientInputs(_))
                | WorkerError::Mixing(MixingError::InvalidInventory { .. })
                | WorkerError::EncoderFailed(EncoderFailure {
                    family: EncoderFailureFamily::UnsupportedCodec,
                    ..
                })
        )
    }
}
