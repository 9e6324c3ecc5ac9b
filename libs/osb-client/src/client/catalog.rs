use http::{Method, StatusCode};

use super::OsbClient;
use crate::error::ClientError;
use crate::response;
use crate::types::CatalogResponse;

impl OsbClient {
    /// Fetch the broker's catalog.
    ///
    /// Fields the configured API version or alpha setting does not cover are
    /// stripped from the result.
    ///
    /// # Errors
    /// Transport failures, or an [`crate::HttpStatusCodeError`] for any
    /// status other than 200.
    pub async fn get_catalog(&self) -> Result<CatalogResponse, ClientError> {
        let request = self.builder(Method::GET, self.catalog_url())?.build();
        let response = self.execute(request).await?;

        match response.status {
            StatusCode::OK => {
                let mut catalog: CatalogResponse = response::decode(&response)?;
                catalog.prune(self.api_version, self.enable_alpha_features);
                Ok(catalog)
            }
            _ => Err(response::failure(&response)),
        }
    }
}
