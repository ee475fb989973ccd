use serde::Deserialize;

use crate::domain::{Job, JobId, JobLog, JobState, JobType};
use crate::transport::encode::{WireCall, keys};
use crate::transport::envelope::{TransportError, decode_envelope};
use crate::transport::scalar::{ApiDate, FlexUint};

pub const GET_JOB_PATH: &str = "/job/get.json";

#[derive(Debug, Deserialize)]
struct JobWire {
    created: ApiDate,
    started: ApiDate,
    completed: ApiDate,
    #[serde(default)]
    message: String,
    state: String,
    #[serde(default)]
    logs: Vec<JobLogWire>,
}

#[derive(Debug, Deserialize)]
struct JobLogWire {
    date: ApiDate,
    level: FlexUint<u32>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct JobIdWire {
    job_id: FlexUint<u64>,
}

impl From<JobWire> for Job {
    fn from(wire: JobWire) -> Self {
        Self {
            created: wire.created.0,
            started: wire.started.0,
            completed: wire.completed.0,
            message: wire.message,
            state: JobState::from_wire(&wire.state),
            logs: wire
                .logs
                .into_iter()
                .map(|log| JobLog {
                    date: log.date.0,
                    level: log.level.get(),
                    message: log.message,
                })
                .collect(),
        }
    }
}

pub fn encode_get_job(job_id: JobId, job_type: JobType) -> WireCall {
    WireCall::get(GET_JOB_PATH, &[keys::JOB_ID, keys::JOB_TYPE])
        .param(keys::JOB_ID, job_id.to_string())
        .param(keys::JOB_TYPE, job_type.as_str())
}

pub fn decode_get_job(body: &str) -> Result<Job, TransportError> {
    decode_envelope::<JobWire>(body).map(Job::from)
}

/// Decode the `{"job_id": "…"}` payload returned by asynchronous server calls.
pub fn decode_job_id(body: &str) -> Result<JobId, TransportError> {
    decode_envelope::<JobIdWire>(body).map(|wire| JobId::new(wire.job_id.get()))
}
