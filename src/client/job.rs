use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{Client, SitehostError};
use crate::domain::{Job, JobId, JobType};
use crate::transport::{decode_get_job, encode_get_job};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Cadence for [`Client::wait_for_job`].
///
/// Defaults: 10 s between fetches, 3 s floor on that spacing, 60 min overall,
/// up to 60 consecutive "job does not exist" answers tolerated (a freshly
/// queued job may not be visible yet).
pub struct PollConfig {
    delay: Duration,
    min_interval: Duration,
    timeout: Duration,
    not_found_checks: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(10),
            min_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(60 * 60),
            not_found_checks: 60,
        }
    }
}

impl PollConfig {
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    /// Spacing actually used between two fetches.
    pub fn interval(&self) -> Duration {
        self.delay.max(self.min_interval)
    }

    pub fn overall_timeout(&self) -> Duration {
        self.timeout
    }
}

impl Client {
    /// Fetch the current status of a job.
    pub async fn get_job(&self, job_id: JobId, job_type: JobType) -> Result<Job, SitehostError> {
        self.execute(encode_get_job(job_id, job_type), decode_get_job)
            .await
    }

    /// Poll a job until it completes or fails, using the client's [`PollConfig`].
    ///
    /// A job ending in `Failed` is returned as `Ok`; inspect [`Job::state`].
    ///
    /// Errors:
    /// - [`SitehostError::Cancelled`] once `cancel` fires, even mid-request,
    /// - [`SitehostError::PollTimeout`] when the overall timeout elapses,
    /// - [`SitehostError::JobNotFound`] when the job stays invisible for too long,
    /// - any other error from a status fetch, immediately.
    pub async fn wait_for_job(
        &self,
        job_id: JobId,
        job_type: JobType,
        cancel: &CancellationToken,
    ) -> Result<Job, SitehostError> {
        self.wait_for_job_with(job_id, job_type, &self.poll, cancel)
            .await
    }

    pub async fn wait_for_job_with(
        &self,
        job_id: JobId,
        job_type: JobType,
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> Result<Job, SitehostError> {
        let poll = tokio::time::timeout(config.timeout, self.poll_job(job_id, job_type, config));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SitehostError::Cancelled { job_id }),
            result = poll => result.unwrap_or(Err(SitehostError::PollTimeout {
                job_id,
                timeout: config.timeout,
            })),
        }
    }

    async fn poll_job(
        &self,
        job_id: JobId,
        job_type: JobType,
        config: &PollConfig,
    ) -> Result<Job, SitehostError> {
        let mut attempt: u32 = 0;
        let mut missing: u32 = 0;
        loop {
            attempt += 1;
            match self.get_job(job_id, job_type).await {
                Ok(job) if job.state.is_terminal() => {
                    info!(%job_id, state = job.state.as_str(), attempt, "job finished");
                    return Ok(job);
                }
                Ok(job) => {
                    missing = 0;
                    debug!(%job_id, state = job.state.as_str(), attempt, "job still running");
                }
                Err(err) if err.is_not_found() => {
                    missing += 1;
                    if missing > config.not_found_checks {
                        return Err(SitehostError::JobNotFound {
                            job_id,
                            checks: missing,
                        });
                    }
                    warn!(%job_id, missing, "job not visible yet");
                }
                Err(err) => return Err(err),
            }
            tokio::time::sleep(config.interval()).await;
        }
    }
}
