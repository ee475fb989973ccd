use std::net::IpAddr;

use serde::{Deserialize, Deserializer};

use crate::domain::{
    CanProvision, DeleteServer, Image, JobId, JobType, Kernel, LastJob, ListImages, ListServers,
    Location, Partition, PowerAction, ProvisionServer, ProvisionedServer, Quota, ResourceGroup,
    Server, ServerIp, ServerName, ServerStateInfo, Subscription, UpdateServer, UpgradeResult,
    UpgradeServer,
};
use crate::transport::encode::{WireCall, keys};
use crate::transport::envelope::{TransportError, decode_envelope};
use crate::transport::scalar::{
    ApiDate, FlexBool, FlexFloat, FlexUint, ListOrMap, QuotedBool, WireDimensions, WireMac,
};

pub const LIST_SERVERS_PATH: &str = "/server/list_servers.json";

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total_pages: u32,
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PageWire<T> {
    #[serde(default)]
    total_pages: FlexUint<u32>,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// `""` and `null` both mean "no address".
fn blank_ip<'de, D>(deserializer: D) -> Result<Option<IpAddr>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerDetailWire {
    #[serde(alias = "server_id")]
    id: FlexUint<u64>,
    name: String,
    label: String,
    client_id: FlexUint<u32>,
    created: ApiDate,
    #[serde(rename = "type")]
    server_type: String,
    state: String,
    locked: FlexBool,
    rescue: FlexBool,
    managed: FlexBool,
    mirror: FlexBool,
    email_logs: QuotedBool,
    cores: FlexUint<u32>,
    disk: FlexUint<u32>,
    ram: FlexUint<u32>,
    arch: String,
    distro: String,
    os: String,
    kernel: String,
    initrd: String,
    modules: String,
    root: String,
    notes: String,
    group_id: FlexUint<u32>,
    ip_addr_limit: FlexUint<u32>,
    location_code: String,
    location_name: String,
    product_code: String,
    product_name: String,
    product_type: String,
    maint_date: ApiDate,
    maint_date_end: ApiDate,
    vnc_port: FlexUint<u32>,
    vnc_screen: Option<WireDimensions>,
    subscription: Option<SubscriptionWire>,
    available_kernels: Vec<KernelWire>,
    interfaces: Vec<String>,
    ips: Vec<ServerIpWire>,
    partitions: ListOrMap<PartitionWire>,
    last_job: Option<LastJobWire>,
}

#[derive(Debug, Deserialize)]
struct ServerIpWire {
    #[serde(default)]
    id: FlexUint<u64>,
    #[serde(default)]
    server_id: FlexUint<u64>,
    ip_addr: IpAddr,
    #[serde(default)]
    prefix: FlexUint<u8>,
    #[serde(default)]
    primary: FlexBool,
    #[serde(default)]
    addr_family: FlexUint<u8>,
    #[serde(default)]
    ip_type: FlexUint<u32>,
    #[serde(default)]
    bridge: String,
    #[serde(default)]
    mac_addr: Option<WireMac>,
    #[serde(default)]
    network_id: FlexUint<u64>,
    #[serde(default, deserialize_with = "blank_ip")]
    network: Option<IpAddr>,
    #[serde(default, deserialize_with = "blank_ip")]
    gateway: Option<IpAddr>,
    #[serde(default, deserialize_with = "blank_ip")]
    netmask: Option<IpAddr>,
    #[serde(default, deserialize_with = "blank_ip")]
    broadcast: Option<IpAddr>,
    #[serde(default)]
    rdns: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartitionWire {
    id: FlexUint<u64>,
    name: String,
    device: String,
    mountpoint: String,
    size: FlexUint<u64>,
    new_size: FlexUint<u64>,
    fstype: String,
    drbd: QuotedBool,
    backup: QuotedBool,
    disk_total: FlexUint<u64>,
    disk_used: FlexUint<u64>,
    inodes_total: FlexUint<u64>,
    inodes_used: FlexUint<u64>,
    alert_threshold: FlexFloat,
    #[serde(rename = "type")]
    partition_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KernelWire {
    default: FlexBool,
    hypervisor: String,
    initrd: String,
    kernel: String,
    modules: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubscriptionWire {
    code: String,
    name: String,
    price: FlexUint<u32>,
}

#[derive(Debug, Deserialize)]
struct LastJobWire {
    id: FlexUint<u64>,
    #[serde(default, rename = "type")]
    job_type: String,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSummaryWire {
    server_id: FlexUint<u64>,
    name: String,
    label: String,
    client_id: FlexUint<u32>,
    created: ApiDate,
    #[serde(rename = "type")]
    server_type: String,
    state: String,
    locked: FlexBool,
    rescue: FlexBool,
    managed: FlexBool,
    mirror: FlexBool,
    cores: FlexUint<u32>,
    disk: FlexUint<u32>,
    /// Gigabytes, possibly fractional (`"1.5"`).
    ram: FlexFloat,
    distro: String,
    arch: String,
    os: String,
    maint_date: ApiDate,
    maint_date_end: ApiDate,
    #[serde(alias = "location_code")]
    location: String,
    location_name: String,
    product_code: String,
    product_name: String,
    product_type: String,
    primary_ips: Vec<PrimaryIpWire>,
}

#[derive(Debug, Deserialize)]
struct PrimaryIpWire {
    ip_addr: IpAddr,
    #[serde(default)]
    prefix: FlexUint<u8>,
}

impl From<ServerIpWire> for ServerIp {
    fn from(wire: ServerIpWire) -> Self {
        Self {
            id: wire.id.get(),
            server_id: wire.server_id.get(),
            addr: wire.ip_addr,
            prefix: wire.prefix.get(),
            primary: wire.primary.0,
            family: wire.addr_family.get(),
            ip_type: wire.ip_type.get(),
            bridge: wire.bridge,
            mac: wire.mac_addr.map(|mac| mac.0),
            network_id: wire.network_id.get(),
            network: wire.network,
            gateway: wire.gateway,
            netmask: wire.netmask,
            broadcast: wire.broadcast,
            rdns: wire.rdns,
        }
    }
}

impl From<PartitionWire> for Partition {
    fn from(wire: PartitionWire) -> Self {
        Self {
            id: wire.id.get(),
            name: wire.name,
            device: wire.device,
            mountpoint: wire.mountpoint,
            size: wire.size.get(),
            new_size: wire.new_size.get(),
            fstype: wire.fstype,
            drbd: wire.drbd.0,
            backup: wire.backup.0,
            disk_total: wire.disk_total.get(),
            disk_used: wire.disk_used.get(),
            inodes_total: wire.inodes_total.get(),
            inodes_used: wire.inodes_used.get(),
            alert_threshold: wire.alert_threshold.0,
            partition_type: wire.partition_type,
        }
    }
}

impl From<ServerDetailWire> for Server {
    fn from(wire: ServerDetailWire) -> Self {
        Self {
            id: wire.id.get(),
            name: wire.name,
            label: wire.label,
            client_id: wire.client_id.get(),
            created: wire.created.0,
            server_type: wire.server_type,
            state: wire.state,
            locked: wire.locked.0,
            rescue: wire.rescue.0,
            managed: wire.managed.0,
            mirror: wire.mirror.0,
            email_logs: wire.email_logs.0,
            cores: wire.cores.get(),
            disk: wire.disk.get(),
            ram: wire.ram.get(),
            arch: wire.arch,
            distro: wire.distro,
            os: wire.os,
            kernel: wire.kernel,
            initrd: wire.initrd,
            modules: wire.modules,
            root: wire.root,
            notes: wire.notes,
            group_id: wire.group_id.get(),
            ip_addr_limit: wire.ip_addr_limit.get(),
            location_code: wire.location_code,
            location_name: wire.location_name,
            product_code: wire.product_code,
            product_name: wire.product_name,
            product_type: wire.product_type,
            maint_date: wire.maint_date.0,
            maint_date_end: wire.maint_date_end.0,
            vnc_port: wire.vnc_port.get(),
            vnc_screen: wire.vnc_screen.map(|screen| screen.0),
            subscription: wire.subscription.map(|sub| Subscription {
                code: sub.code,
                name: sub.name,
                price: sub.price.get(),
            }),
            available_kernels: wire
                .available_kernels
                .into_iter()
                .map(|kernel| Kernel {
                    default: kernel.default.0,
                    hypervisor: kernel.hypervisor,
                    initrd: kernel.initrd,
                    kernel: kernel.kernel,
                    modules: kernel.modules,
                })
                .collect(),
            interfaces: wire.interfaces,
            ips: wire.ips.into_iter().map(ServerIp::from).collect(),
            partitions: wire
                .partitions
                .into_vec()
                .into_iter()
                .map(Partition::from)
                .collect(),
            last_job: wire.last_job.map(|job| LastJob {
                id: JobId::new(job.id.get()),
                job_type: JobType::from_wire(&job.job_type),
                state: job.state,
            }),
        }
    }
}

/// Listing rows leave kernels, partitions, subscription, VNC, interfaces and
/// the non-primary IP details at their defaults.
impl From<ServerSummaryWire> for Server {
    fn from(wire: ServerSummaryWire) -> Self {
        let ips = wire
            .primary_ips
            .into_iter()
            .map(|ip| ServerIp {
                id: 0,
                server_id: wire.server_id.get(),
                family: if ip.ip_addr.is_ipv4() { 4 } else { 6 },
                addr: ip.ip_addr,
                prefix: ip.prefix.get(),
                primary: true,
                ip_type: 0,
                bridge: String::new(),
                mac: None,
                network_id: 0,
                network: None,
                gateway: None,
                netmask: None,
                broadcast: None,
                rdns: String::new(),
            })
            .collect();

        Self {
            id: wire.server_id.get(),
            name: wire.name,
            label: wire.label,
            client_id: wire.client_id.get(),
            created: wire.created.0,
            server_type: wire.server_type,
            state: wire.state,
            locked: wire.locked.0,
            rescue: wire.rescue.0,
            managed: wire.managed.0,
            mirror: wire.mirror.0,
            cores: wire.cores.get(),
            disk: wire.disk.get(),
            ram: gigabytes_to_megabytes(wire.ram.0),
            arch: wire.arch,
            distro: wire.distro,
            os: wire.os,
            maint_date: wire.maint_date.0,
            maint_date_end: wire.maint_date_end.0,
            location_code: wire.location,
            location_name: wire.location_name,
            product_code: wire.product_code,
            product_name: wire.product_name,
            product_type: wire.product_type,
            ips,
            ..Server::default()
        }
    }
}

fn gigabytes_to_megabytes(gb: f64) -> u32 {
    (gb * 1024.0).round().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[derive(Debug, Deserialize)]
struct AddIpWire {
    ip_addr: IpAddr,
}

#[derive(Debug, Deserialize)]
struct StateWire {
    state: String,
    #[serde(default)]
    rescue: FlexBool,
}

#[derive(Debug, Deserialize)]
struct ProvisionWire {
    server_id: FlexUint<u64>,
    job_id: FlexUint<u64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    ips: Vec<IpAddr>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpgradeWire {
    cores: FlexBool,
    disk: ListOrMap<FlexBool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageWire {
    arch: String,
    code: String,
    distro: String,
    name: String,
    os: String,
    #[serde(rename = "type")]
    image_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocationWire {
    available_ips: FlexUint<u32>,
    code: String,
    datacenter: String,
    ipv6: FlexBool,
    label: String,
    os: ListOrMap<String>,
    product_types: ListOrMap<String>,
    public: FlexBool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResourceGroupWire {
    group_id: FlexUint<u32>,
    group_name: String,
    quotas: Vec<QuotaWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuotaWire {
    attribute_id: FlexUint<u32>,
    attribute_name: String,
    attribute_unit: String,
    attribute_type: FlexUint<u32>,
    total_units: FlexUint<u64>,
    used_units: FlexUint<u64>,
    available_units: FlexUint<u64>,
    objects: Vec<String>,
}

pub fn encode_add_ip(name: &ServerName, ip: IpAddr) -> WireCall {
    WireCall::post("/server/add_ip.json", &[keys::CLIENT_ID, keys::NAME, keys::IP])
        .param(keys::NAME, name.as_str())
        .param(keys::IP, ip.to_string())
}

pub fn decode_add_ip(body: &str) -> Result<IpAddr, TransportError> {
    decode_envelope::<AddIpWire>(body).map(|wire| wire.ip_addr)
}

pub fn encode_can_provision(request: &CanProvision) -> WireCall {
    WireCall::post(
        "/server/can_provision.json",
        &[
            keys::PRODUCT_CODE,
            keys::LOCATION,
            keys::DISTRO,
            keys::ARCH,
            keys::CLIENT_ID,
        ],
    )
    .param(keys::PRODUCT_CODE, request.product_code())
    .param(keys::LOCATION, request.location_code())
    .param(keys::DISTRO, request.image_code())
    .options(request.options())
}

pub fn encode_change_state(name: &ServerName, action: PowerAction) -> WireCall {
    WireCall::post("/server/change_state.json", &[keys::CLIENT_ID, keys::NAME, keys::STATE])
        .param(keys::NAME, name.as_str())
        .param(keys::STATE, action.as_str())
}

pub fn encode_delete_server(request: &DeleteServer) -> WireCall {
    WireCall::post(
        "/server/delete.json",
        &[
            keys::CLIENT_ID,
            keys::NAME,
            keys::DELETE_SUBSCRIPTION,
            keys::FORCE,
        ],
    )
    .param(keys::NAME, request.name().as_str())
    .options(request.options())
}

pub fn encode_get_server(name: &ServerName) -> WireCall {
    WireCall::get("/server/get_server.json", &[keys::CLIENT_ID, keys::NAME])
        .param(keys::NAME, name.as_str())
}

pub fn decode_get_server(body: &str) -> Result<Server, TransportError> {
    decode_envelope::<ServerDetailWire>(body).map(Server::from)
}

pub fn encode_get_server_state(name: &ServerName) -> WireCall {
    WireCall::get("/server/get_state.json", &[keys::CLIENT_ID, keys::NAME])
        .param(keys::NAME, name.as_str())
}

pub fn decode_get_server_state(body: &str) -> Result<ServerStateInfo, TransportError> {
    decode_envelope::<StateWire>(body).map(|wire| ServerStateInfo {
        state: wire.state,
        rescue: wire.rescue.0,
    })
}

pub fn encode_list_images(request: &ListImages) -> WireCall {
    WireCall::get(
        "/server/list_images.json",
        &[keys::FILTER_TYPE, keys::FILTER_OS],
    )
    .options(request.options())
}

pub fn decode_list_images(body: &str) -> Result<Vec<Image>, TransportError> {
    let wire = decode_envelope::<Vec<ImageWire>>(body)?;
    Ok(wire
        .into_iter()
        .map(|image| Image {
            arch: image.arch,
            code: image.code,
            distro: image.distro,
            name: image.name,
            os: image.os,
            image_type: image.image_type,
        })
        .collect())
}

pub fn encode_list_locations() -> WireCall {
    WireCall::get("/server/list_locations.json", &[keys::CLIENT_ID])
}

pub fn decode_list_locations(body: &str) -> Result<Vec<Location>, TransportError> {
    let wire = decode_envelope::<Vec<LocationWire>>(body)?;
    Ok(wire
        .into_iter()
        .map(|location| Location {
            available_ips: location.available_ips.get(),
            code: location.code,
            datacenter: location.datacenter,
            ipv6: location.ipv6.0,
            label: location.label,
            os: location.os.into_vec(),
            product_types: location.product_types.into_vec(),
            public: location.public.0,
        })
        .collect())
}

pub fn encode_list_resources() -> WireCall {
    WireCall::get("/server/list_resources.json", &[keys::CLIENT_ID])
}

pub fn decode_list_resources(body: &str) -> Result<Vec<ResourceGroup>, TransportError> {
    let wire = decode_envelope::<Vec<ResourceGroupWire>>(body)?;
    Ok(wire
        .into_iter()
        .map(|group| ResourceGroup {
            id: group.group_id.get(),
            name: group.group_name,
            quotas: group
                .quotas
                .into_iter()
                .map(|quota| Quota {
                    id: quota.attribute_id.get(),
                    name: quota.attribute_name,
                    unit: quota.attribute_unit,
                    attribute_type: quota.attribute_type.get(),
                    total: quota.total_units.get(),
                    used: quota.used_units.get(),
                    available: quota.available_units.get(),
                    objects: quota.objects,
                })
                .collect(),
        })
        .collect())
}

/// `page` is `None` for the first request, which relies on the server default.
pub fn encode_list_servers(request: &ListServers, page: Option<u32>) -> WireCall {
    let call = WireCall::get(
        LIST_SERVERS_PATH,
        &[
            keys::CLIENT_ID,
            keys::FILTER_STATE,
            keys::FILTER_TYPE,
            keys::FILTER_NAME,
            keys::FILTER_LOCATION,
            keys::FILTER_PRODUCT_TYPE,
            keys::FILTER_PRODUCT_CODE,
            keys::FILTER_PAGE_NUMBER,
        ],
    )
    .options(request.options());
    match page {
        Some(page) => call.param(keys::FILTER_PAGE_NUMBER, page.to_string()),
        None => call,
    }
}

pub fn decode_list_servers(body: &str) -> Result<Page<Server>, TransportError> {
    let wire = decode_envelope::<PageWire<ServerSummaryWire>>(body)?;
    Ok(Page {
        total_pages: wire.total_pages.get(),
        items: wire.data.into_iter().map(Server::from).collect(),
    })
}

pub fn encode_provision_server(request: &ProvisionServer) -> WireCall {
    WireCall::post(
        "/server/provision.json",
        &[
            keys::CLIENT_ID,
            keys::LABEL,
            keys::LOCATION,
            keys::PRODUCT_CODE,
            keys::IMAGE,
            keys::PARAM_NAME,
            keys::PARAM_IPV4,
            keys::PARAM_IPV6,
            keys::PARAM_SSH_KEYS,
            keys::PARAM_CONTACT_ID,
            keys::PARAM_BACKUP,
            keys::PARAM_SEND_EMAIL,
        ],
    )
    .param(keys::LABEL, request.label())
    .param(keys::LOCATION, request.location_code())
    .param(keys::PRODUCT_CODE, request.product_code())
    .param(keys::IMAGE, request.image_code())
    .options(request.options())
}

pub fn decode_provision_server(body: &str) -> Result<ProvisionedServer, TransportError> {
    decode_envelope::<ProvisionWire>(body).map(|wire| ProvisionedServer {
        id: wire.server_id.get(),
        job_id: JobId::new(wire.job_id.get()),
        name: wire.name,
        password: wire.password,
        addresses: wire.ips,
    })
}

pub fn encode_update_server(request: &UpdateServer) -> WireCall {
    WireCall::post(
        "/server/update.json",
        &[
            keys::CLIENT_ID,
            keys::NAME,
            keys::UPDATE_LABEL,
            keys::UPDATE_NOTES,
            keys::UPDATE_VNC_SCREEN,
            keys::UPDATE_KERNEL,
        ],
    )
    .param(keys::NAME, request.name().as_str())
    .options(request.options())
}

pub fn encode_upgrade_server(request: &UpgradeServer) -> WireCall {
    WireCall::post(
        "/server/upgrade.json",
        &[
            keys::CLIENT_ID,
            keys::NAME,
            keys::UPGRADE_CORES,
            keys::UPGRADE_RAM,
        ],
    )
    .param(keys::NAME, request.name().as_str())
    .options(request.options())
}

pub fn decode_upgrade_server(body: &str) -> Result<UpgradeResult, TransportError> {
    decode_envelope::<Option<UpgradeWire>>(body).map(|wire| {
        let wire = wire.unwrap_or_default();
        UpgradeResult {
            cores: wire.cores.0,
            disk: wire
                .disk
                .into_map()
                .into_iter()
                .map(|(disk, upgraded)| (disk, upgraded.0))
                .collect(),
        }
    })
}

pub fn encode_upgrade_plan(name: &ServerName, plan: &str) -> WireCall {
    WireCall::post("/server/upgrade_plan.json", &[keys::CLIENT_ID, keys::NAME, keys::PLAN])
        .param(keys::NAME, name.as_str())
        .param(keys::PLAN, plan)
}
