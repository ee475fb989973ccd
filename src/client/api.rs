use crate::client::{Client, SitehostError};
use crate::domain::ApiInfo;
use crate::transport::{decode_info, encode_info};

impl Client {
    /// Modules the configured API key may access.
    pub async fn info(&self) -> Result<ApiInfo, SitehostError> {
        self.execute(encode_info(), decode_info).await
    }
}
