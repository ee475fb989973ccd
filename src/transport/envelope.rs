//! The `{return, msg, status}` wrapper every endpoint responds with.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

const NOT_FOUND_MESSAGES: &[&str] = &[
    "The specified job does not exist or you do not have access to it.",
    "Server not found.",
];

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// `path` names the offending field (`.` for the envelope itself).
    #[error("invalid JSON response at `{path}`: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// `status` was false (or missing); `message` is `msg` verbatim.
    #[error("{message}")]
    Rejected { message: String, not_found: bool },
}

impl From<serde_json::Error> for TransportError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            path: ".".to_owned(),
            source,
        }
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for TransportError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self::Json {
            path: err.path().to_string(),
            source: err.into_inner(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEnvelope<'a> {
    #[serde(default, borrow, rename = "return")]
    payload: Option<&'a RawValue>,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    status: bool,
}

fn open(body: &str) -> Result<RawEnvelope<'_>, TransportError> {
    let envelope: RawEnvelope<'_> = serde_json::from_str(body)?;
    if !envelope.status {
        let not_found = is_not_found(&envelope.msg);
        return Err(TransportError::Rejected {
            message: envelope.msg,
            not_found,
        });
    }
    Ok(envelope)
}

/// Decode `return` into `T` once `status` is true.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, TransportError> {
    let envelope = open(body)?;
    let payload = envelope.payload.map_or("null", RawValue::get);
    let mut de = serde_json::Deserializer::from_str(payload);
    let value = serde_path_to_error::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Check `status` for endpoints whose `return` carries nothing of interest.
pub fn decode_void_envelope(body: &str) -> Result<(), TransportError> {
    open(body).map(drop)
}

/// Whether `msg` is one of the API's "does not exist" messages.
pub fn is_not_found(message: &str) -> bool {
    let message = message.trim();
    let message = message.strip_prefix("Error:").map_or(message, str::trim_start);
    NOT_FOUND_MESSAGES.contains(&message)
}
