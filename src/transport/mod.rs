//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod api;
mod encode;
mod envelope;
mod job;
mod scalar;
mod server;

pub use api::{decode_info, encode_info};
pub use encode::{HttpMethod, WireCall};
pub use envelope::{TransportError, decode_void_envelope};
pub use job::{decode_get_job, decode_job_id, encode_get_job};
pub use scalar::{ZERO_DATE, format_api_date, parse_api_date, parse_quoted_bool};
pub use server::{
    Page, decode_add_ip, decode_get_server, decode_get_server_state, decode_list_images,
    decode_list_locations, decode_list_resources, decode_list_servers, decode_provision_server,
    decode_upgrade_server, encode_add_ip, encode_can_provision, encode_change_state,
    encode_delete_server, encode_get_server, encode_get_server_state, encode_list_images,
    encode_list_locations, encode_list_resources, encode_list_servers, encode_provision_server,
    encode_update_server, encode_upgrade_plan, encode_upgrade_server,
};
