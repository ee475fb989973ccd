//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{
    CallOption, CanProvision, Capabilities, DeleteServer, ImageType, ListImages, ListServers,
    Operation, OsFamily, PowerAction, ProductType, ProvisionServer, ServerStateFilter,
    UpdateServer, UpgradeServer,
};
pub use response::{
    ApiInfo, ApiTimestamp, Image, Job, JobLog, Kernel, LastJob, Location, Partition,
    ProvisionedServer, Quota, ResourceGroup, Server, ServerIp, ServerStateInfo, Subscription,
    UpgradeResult,
};
pub use validation::ValidationError;
pub use value::{
    ApiKey, ClientId, Dimensions, JobId, JobState, JobType, MacAddress, ScalarError, ServerName,
};
pub(crate) use value::parse_unsigned;
