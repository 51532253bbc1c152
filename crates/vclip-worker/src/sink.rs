//! Output sinks: where a finished job's status updates and output records
//! go once the driver has nothing more interesting to do with them
//! (spec §6 "Job status sink" / "Output record sink").

use vclip_models::{JobId, JobStatus};

/// One successfully-encoded output (spec §9 supplement — a concrete struct
/// the driver can hand to the sink after each encode instead of a bag of
/// loose arguments).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub job_id: JobId,
    pub filename: String,
    pub bytes: u64,
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub settings_json: String,
}

/// Receives job status transitions as the driver's per-output loop runs.
pub trait JobStatusSink: Send + Sync {
    fn update(
        &self,
        job_id: &JobId,
        status: JobStatus,
        progress_percent: u8,
        message: Option<&str>,
        error: Option<&str>,
    );
}

/// Receives one record per successfully-produced output file.
pub trait OutputRecordSink: Send + Sync {
    fn record(&self, record: OutputRecord);
}

/// Logs every status transition via `tracing`; does not persist anything.
/// Suitable for local/dev use and as the default in the `vclip-mix` binary.
#[derive(Debug, Default)]
pub struct LoggingStatusSink;

impl JobStatusSink for LoggingStatusSink {
    fn update(
        &self,
        job_id: &JobId,
        status: JobStatus,
        progress_percent: u8,
        message: Option<&str>,
        error: Option<&str>,
    ) {
        match error {
            Some(err) => {
                tracing::error!(job_id = %job_id, %status, progress_percent, error = err, "job status");
            }
            None => {
                tracing::info!(
                    job_id = %job_id,
                    %status,
                    progress_percent,
                    message = message.unwrap_or(""),
                    "job status"
                );
            }
        }
    }
}

/// Logs every output record via `tracing`; does not persist anything.
#[derive(Debug, Default)]
pub struct LoggingRecordSink;

impl OutputRecordSink for LoggingRecordSink {
    fn record(&self, record: OutputRecord) {
        tracing::info!(
            job_id = %record.job_id,
            filename = %record.filename,
            bytes = record.bytes,
            duration = record.duration,
            "output produced"
        );
    }
}

/// In-memory sinks for tests: collect everything they see behind a mutex
/// rather than writing to `tracing`.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    updates: std::sync::Mutex<Vec<(JobId, JobStatus, u8, Option<String>, Option<String>)>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<(JobId, JobStatus, u8, Option<String>, Option<String>)> {
        self.updates.lock().expect("poisoned").clone()
    }
}

impl JobStatusSink for RecordingStatusSink {
    fn update(
        &self,
        job_id: &JobId,
        status: JobStatus,
        progress_percent: u8,
        message: Option<&str>,
        error: Option<&str>,
    ) {
        self.updates.lock().expect("poisoned").push((
            job_id.clone(),
            status,
            progress_percent,
            message.map(str::to_string),
            error.map(str::to_string),
        ));
    }
}

#[derive(Debug, Default)]
pub struct RecordingOutputSink {
    records: std::sync::Mutex<Vec<OutputRecord>>,
}

impl RecordingOutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<OutputRecord> {
        self.records.lock().expect("poisoned").clone()
    }
}

impl OutputRecordSink for RecordingOutputSink {
    fn record(&self, record: OutputRecord) {
        self.records.lock().expect("poisoned").push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_status_sink_captures_updates_in_order() {
        let sink = RecordingStatusSink::new();
        let job_id = JobId::from_string("job-1");
        sink.update(&job_id, JobStatus::Processing, 10, Some("starting"), None);
        sink.update(&job_id, JobStatus::Completed, 100, None, None);

        let updates = sink.updates();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].1, JobStatus::Processing);
        assert_eq!(updates[1].1, JobStatus::Completed);
    }

    #[test]
    fn recording_output_sink_captures_records() {
        let sink = RecordingOutputSink::new();
        sink.record(OutputRecord {
            job_id: JobId::from_string("job-1"),
            filename: "out-0.mp4".to_string(),
            bytes: 1024,
            duration: 12.5,
            width: 1920,
            height: 1080,
            fps: 30,
            bitrate_kbps: 4000,
            settings_json: "{}".to_string(),
        });
        assert_eq!(sink.records().len(), 1);
    }
}
