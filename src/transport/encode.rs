//! Ordered form/query encoding.
//!
//! The API reads parameters positionally in places, so the emitted order is
//! fixed per call: `apikey`, then the call's declared keys. `client_id` is
//! always available but only sent where a call declares it, at that position.

use std::collections::BTreeMap;
use std::net::IpAddr;

use url::form_urlencoded::byte_serialize;

use crate::domain::{ApiKey, CallOption, ClientId};

/// Wire parameter names.
pub mod keys {
    pub const CLIENT_ID: &str = "client_id";
    pub const NAME: &str = "name";
    pub const IP: &str = "ip";
    pub const STATE: &str = "state";
    pub const PLAN: &str = "plan";
    pub const JOB_ID: &str = "job_id";
    pub const JOB_TYPE: &str = "type";
    pub const FORCE: &str = "force";
    pub const DELETE_SUBSCRIPTION: &str = "delete_subscription";
    pub const ARCH: &str = "arch";

    pub const LABEL: &str = "label";
    pub const LOCATION: &str = "location";
    pub const PRODUCT_CODE: &str = "product_code";
    pub const IMAGE: &str = "image";
    pub const DISTRO: &str = "distro";

    pub const FILTER_STATE: &str = "filters[state]";
    pub const FILTER_TYPE: &str = "filters[type]";
    pub const FILTER_NAME: &str = "filters[name]";
    pub const FILTER_LOCATION: &str = "filters[location_code]";
    pub const FILTER_PRODUCT_TYPE: &str = "filters[product_type]";
    pub const FILTER_PRODUCT_CODE: &str = "filters[product_code]";
    pub const FILTER_OS: &str = "filters[os]";
    pub const FILTER_PAGE_NUMBER: &str = "filters[page_number]";

    pub const PARAM_NAME: &str = "params[name]";
    pub const PARAM_IPV4: &str = "params[ipv4][]";
    pub const PARAM_IPV6: &str = "params[ipv6][]";
    pub const PARAM_SSH_KEYS: &str = "params[ssh_keys][]";
    pub const PARAM_CONTACT_ID: &str = "params[contact_id]";
    pub const PARAM_BACKUP: &str = "params[backup]";
    pub const PARAM_SEND_EMAIL: &str = "params[send_email]";

    pub const UPDATE_LABEL: &str = "updates[label]";
    pub const UPDATE_NOTES: &str = "updates[notes]";
    pub const UPDATE_VNC_SCREEN: &str = "updates[vnc_screen]";
    pub const UPDATE_KERNEL: &str = "updates[kernel]";

    pub const UPGRADE_CORES: &str = "upgrades[cores]";
    pub const UPGRADE_RAM: &str = "upgrades[ram]";
}

/// Placeholder asking the API to allocate an address itself.
pub const AUTO: &str = "auto";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Parameter multimap; values of one key keep insertion order.
pub struct ParamSet {
    values: BTreeMap<String, Vec<String>>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value of `key`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_owned(), vec![value.into()]);
    }

    /// Append a value to `key`.
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .entry(key.to_owned())
            .or_default()
            .push(value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

/// Apply one option to the working set.
pub fn apply_option(params: &mut ParamSet, option: &CallOption) {
    match option {
        CallOption::Arch(arch) => params.set(keys::ARCH, arch.as_str()),
        CallOption::ForceDelete => params.set(keys::FORCE, "1"),
        CallOption::DeleteSubscription(mode) => {
            params.set(keys::DELETE_SUBSCRIPTION, mode.as_str())
        }
        CallOption::FilterState(state) => params.set(keys::FILTER_STATE, state.as_str()),
        CallOption::FilterType(image_type) => params.set(keys::FILTER_TYPE, image_type.as_str()),
        CallOption::FilterName(name) => params.set(keys::FILTER_NAME, name.as_str()),
        CallOption::FilterLocation(code) => params.set(keys::FILTER_LOCATION, code.as_str()),
        CallOption::FilterProductType(product) => {
            params.set(keys::FILTER_PRODUCT_TYPE, product.as_str())
        }
        CallOption::FilterProductCode(code) => {
            params.set(keys::FILTER_PRODUCT_CODE, code.as_str())
        }
        CallOption::FilterOs(os) => params.set(keys::FILTER_OS, os.as_str()),
        CallOption::ParamName(name) => params.set(keys::PARAM_NAME, name.as_str()),
        CallOption::ParamIp(ip) => apply_ip(params, *ip),
        CallOption::ParamSshKey(key) => params.add(keys::PARAM_SSH_KEYS, key.as_str()),
        CallOption::ParamContactId(id) => params.set(keys::PARAM_CONTACT_ID, id.to_string()),
        CallOption::ParamBackup => params.set(keys::PARAM_BACKUP, "1"),
        CallOption::ParamSendEmail => params.set(keys::PARAM_SEND_EMAIL, "1"),
        CallOption::UpdateLabel(label) => params.set(keys::UPDATE_LABEL, label.as_str()),
        CallOption::UpdateNote(note) => params.set(keys::UPDATE_NOTES, note.as_str()),
        CallOption::UpdateVnc(screen) => params.set(keys::UPDATE_VNC_SCREEN, screen.to_string()),
        CallOption::UpdateKernel(kernel) => params.set(keys::UPDATE_KERNEL, kernel.as_str()),
        CallOption::UpgradeCores(cores) => params.set(keys::UPGRADE_CORES, cores.to_string()),
        CallOption::UpgradeRam(ram) => params.set(keys::UPGRADE_RAM, ram.to_string()),
    }
}

fn apply_ip(params: &mut ParamSet, ip: Option<IpAddr>) {
    for key in [keys::PARAM_IPV4, keys::PARAM_IPV6] {
        if params.first(key) == Some(AUTO) {
            params.remove(key);
        }
    }
    match ip.map(|ip| ip.to_canonical()) {
        Some(IpAddr::V4(addr)) => params.add(keys::PARAM_IPV4, addr.to_string()),
        Some(IpAddr::V6(addr)) => params.add(keys::PARAM_IPV6, addr.to_string()),
        None => {
            params.set(keys::PARAM_IPV4, AUTO);
            params.set(keys::PARAM_IPV6, AUTO);
        }
    }
}

/// Encode `params` with `options` applied and credentials injected.
///
/// `apikey` always leads; every other key, `client_id` included, is emitted
/// only if `declared` lists it, in that order.
pub fn encode_params(
    mut params: ParamSet,
    options: &[CallOption],
    api_key: &ApiKey,
    client_id: ClientId,
    declared: &[&str],
) -> String {
    for option in options {
        apply_option(&mut params, option);
    }
    params.set(ApiKey::FIELD, api_key.as_str());
    params.set(ClientId::FIELD, client_id.to_string());

    let order = std::iter::once(ApiKey::FIELD).chain(
        declared
            .iter()
            .copied()
            .filter(|key| *key != ApiKey::FIELD),
    );

    let mut out = String::new();
    for key in order {
        for value in params.get(key) {
            if !out.is_empty() {
                out.push('&');
            }
            out.extend(byte_serialize(key.as_bytes()));
            out.push('=');
            out.extend(byte_serialize(value.as_bytes()));
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One endpoint invocation before authentication is attached.
pub struct WireCall {
    pub method: HttpMethod,
    pub path: &'static str,
    pub params: ParamSet,
    pub options: Vec<CallOption>,
    pub keys: &'static [&'static str],
}

impl WireCall {
    pub fn get(path: &'static str, keys: &'static [&'static str]) -> Self {
        Self::new(HttpMethod::Get, path, keys)
    }

    pub fn post(path: &'static str, keys: &'static [&'static str]) -> Self {
        Self::new(HttpMethod::Post, path, keys)
    }

    fn new(method: HttpMethod, path: &'static str, keys: &'static [&'static str]) -> Self {
        Self {
            method,
            path,
            params: ParamSet::new(),
            options: Vec::new(),
            keys,
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn options(mut self, options: &[CallOption]) -> Self {
        self.options.extend_from_slice(options);
        self
    }

    pub fn encode(&self, api_key: &ApiKey, client_id: ClientId) -> String {
        encode_params(
            self.params.clone(),
            &self.options,
            api_key,
            client_id,
            self.keys,
        )
    }
}
