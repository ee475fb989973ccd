use std::net::IpAddr;

use crate::domain::validation::ValidationError;
use crate::domain::value::{Dimensions, ServerName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Server operations that accept [`CallOption`]s.
pub enum Operation {
    CanProvision,
    DeleteServer,
    ListImages,
    ListServers,
    ProvisionServer,
    UpdateServer,
    UpgradeServer,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CanProvision => "can_provision",
            Self::DeleteServer => "delete_server",
            Self::ListImages => "list_images",
            Self::ListServers => "list_servers",
            Self::ProvisionServer => "provision_server",
            Self::UpdateServer => "update_server",
            Self::UpgradeServer => "upgrade_server",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Set of [`Operation`]s an option may be passed to.
pub struct Capabilities(u8);

impl Capabilities {
    const fn of(operations: &[Operation]) -> Self {
        let mut mask = 0;
        let mut idx = 0;
        while idx < operations.len() {
            mask |= operations[idx].bit();
            idx += 1;
        }
        Self(mask)
    }

    pub fn contains(self, operation: Operation) -> bool {
        self.0 & operation.bit() != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Power state used to filter server listings.
pub enum ServerStateFilter {
    On,
    Off,
    Other,
}

impl ServerStateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Distro,
    SaltContainer,
}

impl ImageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distro => "distro",
            Self::SaltContainer => "salt-container",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    Linux,
    Windows,
    CloudHosting,
    CloudContainer,
    VirtualDedicated,
    Dedicated,
    Colocated,
    EnterpriseCloud,
    PrivateCloud,
}

impl ProductType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "LINVPS",
            Self::Windows => "WINVPS",
            Self::CloudHosting => "CLHOST",
            Self::CloudContainer => "CLDCON",
            Self::VirtualDedicated => "VDSERV",
            Self::Dedicated => "SERVER",
            Self::Colocated => "COLO",
            Self::EnterpriseCloud => "CLENT",
            Self::PrivateCloud => "PCLOUD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    Windows,
}

impl OsFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// State transition requested through `change_state`.
pub enum PowerAction {
    PowerOn,
    PowerOff,
    RescueOn,
    RescueOff,
    Reboot,
}

impl PowerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PowerOn => "power_on",
            Self::PowerOff => "power_off",
            Self::RescueOn => "rescue_on",
            Self::RescueOff => "rescue_off",
            Self::Reboot => "reboot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One optional call parameter.
///
/// Each variant knows which operations accept it (see
/// [`CallOption::capabilities`]); request constructors reject the rest.
pub enum CallOption {
    Arch(String),
    ForceDelete,
    DeleteSubscription(String),
    FilterState(ServerStateFilter),
    FilterType(ImageType),
    FilterName(String),
    FilterLocation(String),
    FilterProductType(ProductType),
    FilterProductCode(String),
    FilterOs(OsFamily),
    ParamName(String),
    /// `Some` adds a concrete address of its family, `None` asks for `auto`
    /// allocation of both families.
    ParamIp(Option<IpAddr>),
    ParamSshKey(String),
    ParamContactId(u32),
    ParamBackup,
    ParamSendEmail,
    UpdateLabel(String),
    UpdateNote(String),
    UpdateVnc(Dimensions),
    UpdateKernel(String),
    UpgradeCores(u32),
    UpgradeRam(u32),
}

impl CallOption {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arch(_) => "arch",
            Self::ForceDelete => "force_delete",
            Self::DeleteSubscription(_) => "delete_subscription",
            Self::FilterState(_) => "filter_state",
            Self::FilterType(_) => "filter_type",
            Self::FilterName(_) => "filter_name",
            Self::FilterLocation(_) => "filter_location",
            Self::FilterProductType(_) => "filter_product_type",
            Self::FilterProductCode(_) => "filter_product_code",
            Self::FilterOs(_) => "filter_os",
            Self::ParamName(_) => "param_name",
            Self::ParamIp(_) => "param_ip",
            Self::ParamSshKey(_) => "param_ssh_key",
            Self::ParamContactId(_) => "param_contact_id",
            Self::ParamBackup => "param_backup",
            Self::ParamSendEmail => "param_send_email",
            Self::UpdateLabel(_) => "update_label",
            Self::UpdateNote(_) => "update_note",
            Self::UpdateVnc(_) => "update_vnc",
            Self::UpdateKernel(_) => "update_kernel",
            Self::UpgradeCores(_) => "upgrade_cores",
            Self::UpgradeRam(_) => "upgrade_ram",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        use Operation as Op;

        match self {
            Self::Arch(_) => Capabilities::of(&[Op::CanProvision]),
            Self::ForceDelete | Self::DeleteSubscription(_) => Capabilities::of(&[Op::DeleteServer]),
            Self::FilterType(_) => Capabilities::of(&[Op::ListServers, Op::ListImages]),
            Self::FilterState(_)
            | Self::FilterName(_)
            | Self::FilterLocation(_)
            | Self::FilterProductType(_)
            | Self::FilterProductCode(_) => Capabilities::of(&[Op::ListServers]),
            Self::FilterOs(_) => Capabilities::of(&[Op::ListImages]),
            Self::ParamName(_)
            | Self::ParamIp(_)
            | Self::ParamSshKey(_)
            | Self::ParamContactId(_)
            | Self::ParamBackup
            | Self::ParamSendEmail => Capabilities::of(&[Op::ProvisionServer]),
            Self::UpdateLabel(_)
            | Self::UpdateNote(_)
            | Self::UpdateVnc(_)
            | Self::UpdateKernel(_) => Capabilities::of(&[Op::UpdateServer]),
            Self::UpgradeCores(_) | Self::UpgradeRam(_) => Capabilities::of(&[Op::UpgradeServer]),
        }
    }

    pub fn accepted_by(&self, operation: Operation) -> bool {
        self.capabilities().contains(operation)
    }
}

fn check_options(
    operation: Operation,
    options: Vec<CallOption>,
) -> Result<Vec<CallOption>, ValidationError> {
    if let Some(rejected) = options.iter().find(|opt| !opt.accepted_by(operation)) {
        return Err(ValidationError::UnsupportedOption {
            option: rejected.name(),
            operation: operation.as_str(),
        });
    }
    Ok(options)
}

fn non_empty(field: &'static str, value: impl Into<String>) -> Result<String, ValidationError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value)
}

#[derive(Debug, Clone)]
pub struct CanProvision {
    product_code: String,
    location_code: String,
    image_code: String,
    options: Vec<CallOption>,
}

impl CanProvision {
    pub fn new(
        product_code: impl Into<String>,
        location_code: impl Into<String>,
        image_code: impl Into<String>,
        options: Vec<CallOption>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            product_code: non_empty("product_code", product_code)?,
            location_code: non_empty("location_code", location_code)?,
            image_code: non_empty("image_code", image_code)?,
            options: check_options(Operation::CanProvision, options)?,
        })
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    pub fn image_code(&self) -> &str {
        &self.image_code
    }

    pub fn options(&self) -> &[CallOption] {
        &self.options
    }
}

#[derive(Debug, Clone)]
pub struct DeleteServer {
    name: ServerName,
    options: Vec<CallOption>,
}

impl DeleteServer {
    pub fn new(name: ServerName, options: Vec<CallOption>) -> Result<Self, ValidationError> {
        Ok(Self {
            name,
            options: check_options(Operation::DeleteServer, options)?,
        })
    }

    pub fn name(&self) -> &ServerName {
        &self.name
    }

    pub fn options(&self) -> &[CallOption] {
        &self.options
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListImages {
    options: Vec<CallOption>,
}

impl ListImages {
    pub fn new(options: Vec<CallOption>) -> Result<Self, ValidationError> {
        Ok(Self {
            options: check_options(Operation::ListImages, options)?,
        })
    }

    pub fn options(&self) -> &[CallOption] {
        &self.options
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListServers {
    options: Vec<CallOption>,
}

impl ListServers {
    pub fn new(options: Vec<CallOption>) -> Result<Self, ValidationError> {
        Ok(Self {
            options: check_options(Operation::ListServers, options)?,
        })
    }

    pub fn options(&self) -> &[CallOption] {
        &self.options
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionServer {
    label: String,
    location_code: String,
    product_code: String,
    image_code: String,
    options: Vec<CallOption>,
}

impl ProvisionServer {
    pub fn new(
        label: impl Into<String>,
        location_code: impl Into<String>,
        product_code: impl Into<String>,
        image_code: impl Into<String>,
        options: Vec<CallOption>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            label: non_empty("label", label)?,
            location_code: non_empty("location_code", location_code)?,
            product_code: non_empty("product_code", product_code)?,
            image_code: non_empty("image_code", image_code)?,
            options: check_options(Operation::ProvisionServer, options)?,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn image_code(&self) -> &str {
        &self.image_code
    }

    pub fn options(&self) -> &[CallOption] {
        &self.options
    }
}

#[derive(Debug, Clone)]
pub struct UpdateServer {
    name: ServerName,
    options: Vec<CallOption>,
}

impl UpdateServer {
    pub fn new(name: ServerName, options: Vec<CallOption>) -> Result<Self, ValidationError> {
        Ok(Self {
            name,
            options: check_options(Operation::UpdateServer, options)?,
        })
    }

    pub fn name(&self) -> &ServerName {
        &self.name
    }

    pub fn options(&self) -> &[CallOption] {
        &self.options
    }
}

#[derive(Debug, Clone)]
pub struct UpgradeServer {
    name: ServerName,
    options: Vec<CallOption>,
}

impl UpgradeServer {
    pub fn new(name: ServerName, options: Vec<CallOption>) -> Result<Self, ValidationError> {
        Ok(Self {
            name,
            options: check_options(Operation::UpgradeServer, options)?,
        })
    }

    pub fn name(&self) -> &ServerName {
        &self.name
    }

    pub fn options(&self) -> &[CallOption] {
        &self.options
    }
}
