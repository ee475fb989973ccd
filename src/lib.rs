//! Typed Rust client for the SiteHost control-plane HTTP API.
//!
//! The crate is split into a domain layer of strong types, a transport layer
//! that owns the wire-format quirks (ordered form encoding, the
//! `{return, msg, status}` envelope, loosely typed scalars) and a client layer
//! orchestrating requests, pagination and job polling.
//!
//! ```rust,no_run
//! use sitehost::{CancellationToken, Client, JobType, ListServers};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sitehost::SitehostError> {
//!     let client = Client::from_env()?;
//!     for server in client.list_servers(ListServers::default()).await? {
//!         println!("{} {} {}", server.name, server.label, server.state);
//!     }
//!
//!     let job = client
//!         .wait_for_job(sitehost::JobId::new(2568588), JobType::Daemon, &CancellationToken::new())
//!         .await?;
//!     println!("job finished: {:?}", job.state);
//!     Ok(())
//! }
//! ```
//!
//! Servers returned by [`Client::list_servers`] only carry the listing
//! columns (id, name, label, client, creation date, type, state, lock and
//! rescue flags, cores, ram, disk, location, product, primary IPs); the rest
//! stay at their defaults until fetched with [`Client::get_server`].
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{Client, ClientBuilder, PollConfig, SitehostError};
pub use domain::{
    ApiInfo, ApiKey, ApiTimestamp, CallOption, CanProvision, ClientId, DeleteServer, Dimensions,
    Image, ImageType, Job, JobId, JobLog, JobState, JobType, ListImages, ListServers, Location,
    MacAddress, OsFamily, PowerAction, ProductType, ProvisionServer, ProvisionedServer,
    ResourceGroup, Server, ServerName, ServerStateFilter, ServerStateInfo, UpdateServer,
    UpgradeResult, UpgradeServer, ValidationError,
};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ZERO_DATE, format_api_date, parse_api_date, parse_quoted_bool};
