use async_trait::async_trait;
use pazaryeri_core::config::ProviderConfig;
use pazaryeri_core::{decode_envelope, CatalogError, CatalogProvider, CatalogSnapshot};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Fetches the whole product collection with one GET. No query parameters are sent;
/// all filtering happens on the returned snapshot.
#[derive(Clone, Debug)]
pub struct HttpCatalogProvider {
    client: Client,
    url: String,
    timeout_secs: u64,
    api_token: Option<SecretString>,
}

impl HttpCatalogProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(config.timeout()).build().map_err(|error| {
            CatalogError::unavailable(format!("could not build http client: {error}"))
        })?;

        Ok(Self {
            client,
            url: config.products_url(),
            timeout_secs: config.timeout_secs,
            api_token: config.api_token.clone(),
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::ProviderTimeout { timeout_secs: self.timeout_secs }
        } else {
            CatalogError::unavailable(error.to_string())
        }
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|error| self.transport_error(error))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::bad_status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|error| self.transport_error(error))?;
        debug!(url = %self.url, bytes = body.len(), "catalog response received");
        decode_envelope(&body)
    }
}
