use serde::Deserialize;

use crate::domain::ApiInfo;
use crate::transport::encode::WireCall;
use crate::transport::envelope::{TransportError, decode_envelope};

#[derive(Debug, Deserialize)]
struct ApiInfoWire {
    #[serde(default)]
    modules: Vec<String>,
}

pub fn encode_info() -> WireCall {
    WireCall::get("/api/get_info.json", &[])
}

pub fn decode_info(body: &str) -> Result<ApiInfo, TransportError> {
    decode_envelope::<ApiInfoWire>(body).map(|wire| ApiInfo {
        modules: wire.modules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiKey, ClientId};

    #[test]
    fn info_sends_only_the_api_key() {
        let encoded = encode_info().encode(&ApiKey::new("k").unwrap(), ClientId::new(1));
        assert_eq!(encoded, "apikey=k");
    }

    #[test]
    fn decodes_module_list() {
        let body = r#"{"return":{"modules":["API","Job","Server"]},"msg":"Successful","status":true}"#;
        assert_eq!(decode_info(body).unwrap().modules, ["API", "Job", "Server"]);
    }
}
