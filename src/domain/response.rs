use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};

use crate::domain::value::{Dimensions, JobId, JobState, JobType, MacAddress};

/// Timestamp reported by the API. `None` is the `0000-00-00 00:00:00` sentinel.
pub type ApiTimestamp = Option<DateTime<Utc>>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiInfo {
    /// Modules the API key has access to (e.g. `Job`, `Server`).
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Job {
    pub created: ApiTimestamp,
    pub started: ApiTimestamp,
    pub completed: ApiTimestamp,
    pub message: String,
    pub state: JobState,
    pub logs: Vec<JobLog>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLog {
    pub date: ApiTimestamp,
    pub level: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// A server, as returned by either `get_server` or `list_servers`.
///
/// Listing rows only carry a subset of fields; see the crate docs for which
/// ones stay at their defaults.
pub struct Server {
    pub id: u64,
    pub name: String,
    pub label: String,
    pub client_id: u32,
    pub created: ApiTimestamp,
    pub server_type: String,
    pub state: String,
    pub locked: bool,
    pub rescue: bool,
    pub managed: bool,
    pub mirror: bool,
    pub email_logs: bool,
    pub cores: u32,
    /// Disk size in GB.
    pub disk: u32,
    /// Memory in MB.
    pub ram: u32,
    pub arch: String,
    pub distro: String,
    pub os: String,
    pub kernel: String,
    pub initrd: String,
    pub modules: String,
    pub root: String,
    pub notes: String,
    pub group_id: u32,
    pub ip_addr_limit: u32,
    pub location_code: String,
    pub location_name: String,
    pub product_code: String,
    pub product_name: String,
    pub product_type: String,
    pub maint_date: ApiTimestamp,
    pub maint_date_end: ApiTimestamp,
    pub vnc_port: u32,
    pub vnc_screen: Option<Dimensions>,
    pub subscription: Option<Subscription>,
    pub available_kernels: Vec<Kernel>,
    pub interfaces: Vec<String>,
    pub ips: Vec<ServerIp>,
    pub partitions: Vec<Partition>,
    pub last_job: Option<LastJob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIp {
    pub id: u64,
    pub server_id: u64,
    pub addr: IpAddr,
    pub prefix: u8,
    pub primary: bool,
    /// `4` or `6`; `0` when the endpoint did not report it.
    pub family: u8,
    pub ip_type: u32,
    pub bridge: String,
    pub mac: Option<MacAddress>,
    pub network_id: u64,
    pub network: Option<IpAddr>,
    pub gateway: Option<IpAddr>,
    pub netmask: Option<IpAddr>,
    pub broadcast: Option<IpAddr>,
    pub rdns: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Partition {
    pub id: u64,
    pub name: String,
    pub device: String,
    pub mountpoint: String,
    pub size: u64,
    pub new_size: u64,
    pub fstype: String,
    pub drbd: bool,
    pub backup: bool,
    pub disk_total: u64,
    pub disk_used: u64,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub alert_threshold: f64,
    pub partition_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Kernel {
    pub default: bool,
    pub hypervisor: String,
    pub initrd: String,
    pub kernel: String,
    pub modules: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subscription {
    pub code: String,
    pub name: String,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The most recent job run against a server.
pub struct LastJob {
    pub id: JobId,
    pub job_type: Option<JobType>,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStateInfo {
    pub state: String,
    pub rescue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of `provision_server`; `job_id` must be awaited before the server is usable.
pub struct ProvisionedServer {
    pub id: u64,
    pub job_id: JobId,
    pub name: String,
    pub password: String,
    pub addresses: Vec<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpgradeResult {
    pub cores: bool,
    pub disk: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    pub arch: String,
    pub code: String,
    pub distro: String,
    pub name: String,
    pub os: String,
    pub image_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub available_ips: u32,
    pub code: String,
    pub datacenter: String,
    pub ipv6: bool,
    pub label: String,
    pub os: Vec<String>,
    pub product_types: Vec<String>,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceGroup {
    pub id: u32,
    pub name: String,
    pub quotas: Vec<Quota>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Quota {
    pub id: u32,
    pub name: String,
    pub unit: String,
    pub attribute_type: u32,
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub objects: Vec<String>,
}
