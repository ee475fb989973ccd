//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod api;
mod job;
mod paginate;
mod server;

#[cfg(test)]
mod fake;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};
use url::Url;

use crate::domain::{ApiKey, ClientId, JobId, ValidationError};
use crate::transport::{HttpMethod, TransportError, WireCall};

pub use job::PollConfig;

/// Production API root.
pub const DEFAULT_ENDPOINT: &str = "https://mysth.safeserver.net.nz/1.0";

pub const ENV_API_KEY: &str = "SITEHOST_API_KEY";
pub const ENV_CLIENT_ID: &str = "SITEHOST_CLIENT_ID";
pub const ENV_ENDPOINT: &str = "SITEHOST_API_ENDPOINT";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type TransportResult<'a> = BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> TransportResult<'a>;

    fn post_form<'a>(&'a self, url: &'a str, body: String) -> TransportResult<'a>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    async fn read(
        response: reqwest::Response,
    ) -> Result<HttpResponse, Box<dyn StdError + Send + Sync>> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportResult<'a> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            Self::read(response).await
        })
    }

    fn post_form<'a>(&'a self, url: &'a str, body: String) -> TransportResult<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(body)
                .send()
                .await?;
            Self::read(response).await
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`Client`].
///
/// Transport failures, API rejections and decode failures are kept apart so
/// callers can tell a flaky network from a refused request. A job that ends
/// in `Failed` is not an error; see [`Client::wait_for_job`].
pub enum SitehostError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, unreadable body).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The API answered `status: false`; `message` is its `msg` verbatim.
    #[error("API error: {message}")]
    Api { message: String },

    /// The API reported that the requested job or server does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Response body did not match the endpoint's expected shape.
    ///
    /// `path` is the field that failed (`.` when the envelope itself is
    /// malformed); codec failures quote the raw text in `source`.
    #[error("failed to decode {endpoint} response at `{path}`: {source}")]
    Decode {
        endpoint: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("job {job_id} did not finish within {timeout:?}")]
    PollTimeout { job_id: JobId, timeout: Duration },

    #[error("waiting for job {job_id} was cancelled")]
    Cancelled { job_id: JobId },

    #[error("job {job_id} was not found after {checks} consecutive checks")]
    JobNotFound { job_id: JobId, checks: u32 },
}

impl SitehostError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn from_transport(endpoint: &'static str, err: TransportError) -> Self {
        match err {
            TransportError::Json { path, source } => Self::Decode {
                endpoint,
                path,
                source,
            },
            TransportError::Rejected {
                message,
                not_found: true,
            } => Self::NotFound { message },
            TransportError::Rejected { message, .. } => Self::Api { message },
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidEndpoint {
        input: endpoint.to_owned(),
    };
    let url = Url::parse(endpoint).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

#[derive(Debug, Clone)]
/// Builder for [`Client`].
///
/// Use this when you need to customize the endpoint, timeout, user-agent or
/// job polling cadence.
pub struct ClientBuilder {
    api_key: ApiKey,
    client_id: ClientId,
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    poll: PollConfig,
}

impl ClientBuilder {
    pub fn new(api_key: ApiKey, client_id: ClientId) -> Self {
        Self {
            api_key,
            client_id,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            poll: PollConfig::default(),
        }
    }

    /// Override the API root (for example a staging host or a local mock).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Default cadence used by [`Client::wait_for_job`].
    pub fn poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn build(self) -> Result<Client, SitehostError> {
        let base_url = parse_endpoint(&self.endpoint)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| SitehostError::Transport(Box::new(err)))?;

        Ok(Client {
            api_key: self.api_key,
            client_id: self.client_id,
            base_url,
            http: Arc::new(ReqwestTransport { client }),
            poll: self.poll,
        })
    }
}

#[derive(Clone)]
/// High-level SiteHost client.
///
/// Every call is sent with the account's `apikey` and `client_id`. The client
/// is immutable once built and cheap to clone; concurrent calls share the
/// underlying connection pool.
pub struct Client {
    api_key: ApiKey,
    client_id: ClientId,
    base_url: String,
    http: Arc<dyn HttpTransport>,
    poll: PollConfig,
}

impl Client {
    /// Create a client against the production endpoint.
    ///
    /// For more customization, use [`Client::builder`].
    pub fn new(api_key: ApiKey, client_id: ClientId) -> Self {
        Self {
            api_key,
            client_id,
            base_url: DEFAULT_ENDPOINT.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
            poll: PollConfig::default(),
        }
    }

    pub fn builder(api_key: ApiKey, client_id: ClientId) -> ClientBuilder {
        ClientBuilder::new(api_key, client_id)
    }

    /// Build a client from `SITEHOST_API_KEY`, `SITEHOST_CLIENT_ID` and the
    /// optional `SITEHOST_API_ENDPOINT`.
    pub fn from_env() -> Result<Self, SitehostError> {
        let api_key = ApiKey::new(std::env::var(ENV_API_KEY).unwrap_or_default())?;
        let client_id = std::env::var(ENV_CLIENT_ID)
            .unwrap_or_default()
            .parse::<ClientId>()?;

        let mut builder = Self::builder(api_key, client_id);
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Send one call and decode its envelope. Never retried.
    async fn execute<T>(
        &self,
        call: WireCall,
        decode: fn(&str) -> Result<T, TransportError>,
    ) -> Result<T, SitehostError> {
        let encoded = call.encode(&self.api_key, self.client_id);
        let url = format!("{}{}", self.base_url, call.path);
        debug!(method = call.method.as_str(), path = call.path, "sending request");

        let response = match call.method {
            HttpMethod::Get => self.http.get(&format!("{url}?{encoded}")).await,
            HttpMethod::Post => self.http.post_form(&url, encoded).await,
        }
        .map_err(SitehostError::Transport)?;

        if !(200..=299).contains(&response.status) {
            debug!(path = call.path, status = response.status, "non-success status");
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(SitehostError::HttpStatus {
                status: response.status,
                body,
            });
        }

        trace!(path = call.path, body = %response.body, "received response");
        decode(&response.body).map_err(|err| SitehostError::from_transport(call.path, err))
    }
}
