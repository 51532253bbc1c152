//! `JobDriver` — the per-output loop that turns a plan list into encoder
//! invocations, checking cancellation before each output and reporting
//! progress as it goes (spec §4.7, §5).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::watch;
use vclip_mixing::FilterGraphCompiler;
use vclip_models::{Clip, Group, JobId, JobStatus, MixingSettings};

use crate::error::{EncoderFailure, WorkerError, WorkerResult};
use crate::launcher::{EncodeOutcome, EncoderLauncher};
use crate::retry::{retry_async, FailureTracker, RetryConfig, RetryResult};
use crate::sink::{JobStatusSink, OutputRecordSink, OutputRecord};

/// Percentage of a job's progress bar reserved for the encode loop itself;
/// the remaining 20 is reserved for finalization (spec §4.7).
const ENCODE_PROGRESS_SHARE: u8 = 80;

/// Drives one job's plans through compilation and encoding. Holds a
/// cancellation registry keyed by job id so an external caller can cancel
/// a job that is currently running (spec §5).
#[derive(Default)]
pub struct JobDriver {
    cancel_senders: Mutex<HashMap<JobId, watch::Sender<bool>>>,
}

impl JobDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation for `job_id` if it is currently registered.
    /// Returns `false` if no job with that id is running.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        match self.cancel_senders.lock().expect("poisoned").get(job_id) {
            Some(tx) => {
                let _ = tx.send(true);
                true
            }
            None => false,
        }
    }

    /// Plans, compiles, and encodes every output for one job.
    ///
    /// `groups` is consulted only when `settings.group_mixing` is set; pass
    /// `None` for the flat clip-list mode (spec §4.2 rule 1, §3 Group data
    /// model).
    ///
    /// `make_launcher` receives a fresh cancellation receiver and must
    /// produce the concrete [`EncoderLauncher`] to drive this job's
    /// encodes with — callers construct `FfmpegEncoderLauncher::new(rx,
    /// timeout)` in production and a `RecorderLauncher` in tests.
    #[allow(clippy::too_many_arguments)]
    pub async fn run_job<L, F>(
        &self,
        job_id: JobId,
        clips: &[Clip],
        groups: Option<&[Group]>,
        settings: &MixingSettings,
        seed: u64,
        output_dir: &Path,
        make_launcher: F,
        status_sink: &dyn JobStatusSink,
        record_sink: &dyn OutputRecordSink,
    ) -> WorkerResult<()>
    where
        L: EncoderLauncher,
        F: FnOnce(watch::Receiver<bool>) -> L,
    {
        let (tx, rx) = watch::channel(false);
        self.cancel_senders
            .lock()
            .expect("poisoned")
            .insert(job_id.clone(), tx);

        let result = self
            .run_job_inner(
                &job_id,
                clips,
                groups,
                settings,
                seed,
                output_dir,
                make_launcher(rx.clone()),
                &rx,
                status_sink,
                record_sink,
            )
            .await;

        self.cancel_senders.lock().expect("poisoned").remove(&job_id);
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_job_inner<L: EncoderLauncher>(
        &self,
        job_id: &JobId,
        clips: &[Clip],
        groups: Option<&[Group]>,
        settings: &MixingSettings,
        seed: u64,
        output_dir: &Path,
        launcher: L,
        cancel_rx: &watch::Receiver<bool>,
        status_sink: &dyn JobStatusSink,
        record_sink: &dyn OutputRecordSink,
    ) -> WorkerResult<()> {
        status_sink.update(job_id, JobStatus::Processing, 0, Some("planning"), None);

        let plans = vclip_mixing::VariantPlanner::plan_with_groups(clips, groups, settings, seed)?;
        let output_count = plans.len() as u8;
        let canvas = vclip_mixing::resolve_canvas(settings.resolution, settings.aspect_ratio);
        let mut failure_tracker = FailureTracker::new(2);

        // Group clips don't appear in the flat `clips` inventory, but the
        // compiler resolves every plan id against one inventory — merge
        // them in so group-mixed plans still validate (spec §4.2 rule 1).
        let compiler_inventory: Vec<Clip> = match groups {
            Some(groups) => {
                let mut merged = clips.to_vec();
                let mut seen: std::collections::HashSet<_> =
                    merged.iter().map(|c| c.id.clone()).collect();
                for group in groups {
                    for clip in &group.clips {
                        if seen.insert(clip.id.clone()) {
                            merged.push(clip.clone());
                        }
                    }
                }
                merged
            }
            None => clips.to_vec(),
        };

        for (i, plan) in plans.iter().enumerate() {
            if *cancel_rx.borrow() {
                status_sink.update(job_id, JobStatus::Cancelled, progress_for(i, plans.len()), None, None);
                return Err(WorkerError::Cancelled);
            }

            let progress = progress_for(i, plans.len());
            status_sink.update(
                job_id,
                JobStatus::Processing,
                progress,
                Some(&format!("compiling output {} of {}", i + 1, plans.len())),
                None,
            );

            let output_path = output_path_for(output_dir, job_id, i);
            let compiled = FilterGraphCompiler::compile(plan, &compiler_inventory, &output_path)?;

            if *cancel_rx.borrow() {
                status_sink.update(job_id, JobStatus::Cancelled, progress, None, None);
                return Err(WorkerError::Cancelled);
            }

            status_sink.update(
                job_id,
                JobStatus::Processing,
                progress,
                Some(&format!("encoding output {} of {}", i + 1, plans.len())),
                None,
            );

            let outcome = launch_with_retry(
                &launcher,
                &compiled.args,
                i,
                &mut failure_tracker,
                job_id,
            )
            .await;

            match outcome {
                EncodeOutcome::Success => {
                    failure_tracker.record_success();
                    let bytes = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
                    record_sink.record(OutputRecord {
                        job_id: job_id.clone(),
                        filename: output_path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default(),
                        bytes,
                        duration: compiled.output_duration_seconds,
                        width: canvas.width,
                        height: canvas.height,
                        fps: settings.frame_rate.as_u32(),
                        bitrate_kbps: vclip_mixing::resolve_bitrate_tier(settings.bitrate).bitrate_kbps,
                        settings_json: serde_json::to_string(&plan.settings)
                            .unwrap_or_else(|_| "{}".to_string()),
                    });
                }
                EncodeOutcome::Cancelled => {
                    status_sink.update(job_id, JobStatus::Cancelled, progress, None, None);
                    return Err(WorkerError::Cancelled);
                }
                EncodeOutcome::Failed(failure) => {
                    let err = WorkerError::EncoderFailed(failure);
                    status_sink.update(
                        job_id,
                        JobStatus::Failed,
                        progress,
                        None,
                        Some(&err.to_string()),
                    );
                    return Err(err);
                }
            }
        }

        status_sink.update(job_id, JobStatus::Completed, 100, Some("done"), None);
        let _ = output_count;
        Ok(())
    }
}

fn progress_for(completed: usize, output_count: usize) -> u8 {
    if output_count == 0 {
        return ENCODE_PROGRESS_SHARE;
    }
    ((completed as f64 / output_count as f64) * ENCODE_PROGRESS_SHARE as f64).floor() as u8
}

fn output_path_for(output_dir: &Path, job_id: &JobId, index: usize) -> PathBuf {
    output_dir.join(format!("{job_id}-{index}.mp4"))
}

#[derive(Debug)]
enum EncodeAttemptError {
    Cancelled,
    Encoder(EncoderFailure),
}

impl std::fmt::Display for EncodeAttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeAttemptError::Cancelled => write!(f, "cancelled"),
            EncodeAttemptError::Encoder(e) => write!(f, "{e}"),
        }
    }
}

/// Runs one encode attempt. A retryable, non-permanent failure (spec §4.7
/// step 6) is driven through the retry policy collaborator before the
/// caller gives up; anything else — success, cancellation, or a permanent
/// failure — is returned on the first attempt.
async fn launch_with_retry<L: EncoderLauncher>(
    launcher: &L,
    args: &[String],
    output_index: usize,
    failure_tracker: &mut FailureTracker,
    job_id: &JobId,
) -> EncodeOutcome {
    let failure = match launcher.launch(args).await {
        EncodeOutcome::Failed(failure) => failure,
        other => return other,
    };

    let classified = WorkerError::EncoderFailed(failure.clone());
    if classified.is_permanent_failure() || !classified.is_retryable() {
        return EncodeOutcome::Failed(failure);
    }

    if failure_tracker.record_failure() {
        tracing::warn!(
            %job_id,
            output = output_index,
            family = %failure.family,
            "encode attempt failed, retrying per retry policy",
        );
    }

    let retry_config =
        RetryConfig::new(format!("encode-output-{output_index}")).with_max_retries(2);
    match retry_async(&retry_config, || async {
        match launcher.launch(args).await {
            EncodeOutcome::Success => Ok(EncodeOutcome::Success),
            EncodeOutcome::Cancelled => Err(EncodeAttemptError::Cancelled),
            EncodeOutcome::Failed(f) => Err(EncodeAttemptError::Encoder(f)),
        }
    })
    .await
    {
        RetryResult::Success(outcome) => outcome,
        RetryResult::Failed {
            error: EncodeAttemptError::Cancelled,
            ..
        } => EncodeOutcome::Cancelled,
        RetryResult::Failed {
            error: EncodeAttemptError::Encoder(f),
            ..
        } => EncodeOutcome::Failed(f),
    }
}
