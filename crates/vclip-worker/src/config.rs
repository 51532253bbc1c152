//! Worker configuration.
//!
//! Trimmed from the teacher's `WorkerConfig` to the fields the JobDriver
//! actually reads — everything about neural/scene/download parallelism is
//! a concern this core doesn't have (SPEC_FULL §9 supplement).

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Per-job timeout; the core itself imposes none (spec §5), this is
    /// the collaborator-level bound the driver enforces around the whole
    /// encode loop.
    pub job_timeout: Duration,
    /// Grace period given to an in-flight encoder after cancellation
    /// before it is forcibly killed.
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(3600),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            job_timeout: Duration::from_secs(
                std::env::var("WORKER_JOB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            shutdown_timeout: Duration::from_secs(
                std::env::var("WORKER_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_timeouts() {
        let config = WorkerConfig::default();
        assert_eq!(config.job_timeout, Duration::from_secs(3600));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }
}
