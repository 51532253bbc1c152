//! `EncoderLauncher` — the trait boundary between the JobDriver and
//! whatever actually runs the encoder process (spec §6). A concrete
//! `FfmpegEncoderLauncher` is provided for local/dev use; tests substitute
//! a recorder instead (spec §9 Design Notes — "Global encoder-path
//! configuration").

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use vclip_media::command::FfmpegRunner;

use crate::error::{classify_encoder_failure, EncoderFailure};

/// Outcome of one encoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeOutcome {
    Success,
    Failed(EncoderFailure),
    Cancelled,
}

#[async_trait]
pub trait EncoderLauncher: Send + Sync {
    async fn launch(&self, args: &[String]) -> EncodeOutcome;
}

/// Runs `ffmpeg` via [`vclip_media::command::FfmpegRunner`], honoring
/// cancellation and the configured per-job timeout exactly as the
/// teacher's runner does.
pub struct FfmpegEncoderLauncher {
    cancel_rx: watch::Receiver<bool>,
    timeout_secs: Option<u64>,
}

impl FfmpegEncoderLauncher {
    pub fn new(cancel_rx: watch::Receiver<bool>, timeout_secs: Option<u64>) -> Self {
        Self { cancel_rx, timeout_secs }
    }
}

#[async_trait]
impl EncoderLauncher for FfmpegEncoderLauncher {
    async fn launch(&self, args: &[String]) -> EncodeOutcome {
        let mut runner = FfmpegRunner::new().with_cancel(self.cancel_rx.clone());
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }

        match runner.run_args(args).await {
            Ok(()) => EncodeOutcome::Success,
            Err(vclip_media::MediaError::Cancelled) => EncodeOutcome::Cancelled,
            Err(vclip_media::MediaError::FfmpegFailed { message, stderr, exit_code }) => {
                let tail = stderr.unwrap_or(message);
                EncodeOutcome::Failed(classify_encoder_failure(&tail, exit_code))
            }
            Err(other) => EncodeOutcome::Failed(classify_encoder_failure(&other.to_string(), None)),
        }
    }
}

/// Captures the argument vector of every `launch` call without running
/// anything, for driver tests (spec §9 Design Notes — "tests then
/// substitute a recorder"). Cloning shares the same call log and outcome,
/// so a test can hand one clone to `run_job` and keep another to inspect
/// call counts after the job finishes.
#[derive(Default, Clone)]
pub struct RecorderLauncher {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    outcome: EncodeOutcome,
}

impl RecorderLauncher {
    pub fn new(outcome: EncodeOutcome) -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())), outcome }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("poisoned").clone()
    }
}

impl Default for EncodeOutcome {
    fn default() -> Self {
        EncodeOutcome::Success
    }
}

#[async_trait]
impl EncoderLauncher for RecorderLauncher {
    async fn launch(&self, args: &[String]) -> EncodeOutcome {
        self.calls.lock().expect("poisoned").push(args.to_vec());
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recorder_launcher_captures_args_and_returns_configured_outcome() {
        let launcher = RecorderLauncher::new(EncodeOutcome::Success);
        let outcome = launcher.launch(&["-i".to_string(), "a.mp4".to_string()]).await;
        assert_eq!(outcome, EncodeOutcome::Success);
        assert_eq!(launcher.calls(), vec![vec!["-i".to_string(), "a.mp4".to_string()]]);
    }
}
