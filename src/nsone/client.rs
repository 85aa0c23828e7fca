use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::nsone::types::Zone;
use crate::validation::validate_zone_name;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct NsOneClient {
    http: Client,
    base_url: String, // e.g. "https://api.nsone.net/v1"
}

// Body NS1 sends alongside an error status.
#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl NsOneClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::from_reqwest(&config.base_url, config.build_http_client()?))
    }

    /// Use an already configured `reqwest::Client`. The API key header is the
    /// caller's business in that case.
    pub fn from_reqwest(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn zone_url(&self, zone: &str) -> Result<String> {
        validate_zone_name(zone)?;
        Ok(self.url(&format!("zones/{zone}")))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> Result<Response> {
        debug!("{} {}", method, url);

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await?;
        debug!("status {}", res.status());
        Ok(res)
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    async fn into_api_error(res: Response) -> Error {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => parsed.message,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        };
        warn!("NS1 request failed with {}: {}", status, message);
        Error::Api { status, message }
    }

    async fn expect_success(res: Response) -> Result<Response> {
        if res.status().is_success() {
            Ok(res)
        } else {
            Err(Self::into_api_error(res).await)
        }
    }

    /// All active zones with their basic configuration.
    pub async fn list_zones(&self) -> Result<Vec<Zone>> {
        let res = self
            .send::<()>(Method::GET, self.url("zones"), None)
            .await?;
        Self::decode(Self::expect_success(res).await?).await
    }

    /// A single zone. A 404 is not an error: the returned zone has an empty
    /// name and no id (see [`Zone::is_found`]).
    ///
    /// Names outside letters, digits, `-` and `_` labels (e.g. RFC 2317
    /// `0/26.2.0.192.in-addr.arpa`) fail with [`Error::InvalidZoneName`]
    /// without a request; the same holds for create, update and delete.
    pub async fn get_zone(&self, name: &str) -> Result<Zone> {
        let url = self.zone_url(name)?;
        let res = self.send::<()>(Method::GET, url, None).await?;
        if res.status() == StatusCode::NOT_FOUND {
            debug!("zone {} not found", name);
            return Ok(Zone::not_found());
        }

        let mut zone: Zone = Self::decode(Self::expect_success(res).await?).await?;
        if zone.zone.is_empty() {
            zone.zone = name.to_string();
        }
        Ok(zone)
    }

    /// Create `zone`. Its name is checked as in [`NsOneClient::get_zone`].
    pub async fn create_zone(&self, zone: &Zone) -> Result<()> {
        let url = self.zone_url(&zone.zone)?;
        let res = self.send(Method::PUT, url, Some(zone)).await?;
        Self::expect_success(res).await?;
        Ok(())
    }

    /// Replace the zone's configuration with `zone`.
    pub async fn update_zone(&self, zone: &Zone) -> Result<()> {
        let url = self.zone_url(&zone.zone)?;
        let res = self.send(Method::POST, url, Some(zone)).await?;
        Self::expect_success(res).await?;
        Ok(())
    }

    /// Destroy the zone and every record in it.
    pub async fn delete_zone(&self, name: &str) -> Result<()> {
        let url = self.zone_url(name)?;
        let res = self.send::<()>(Method::DELETE, url, None).await?;
        Self::expect_success(res).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_zone_urls() {
        let client = NsOneClient::from_reqwest("https://api.nsone.net/v1/", Client::new());
        assert_eq!(client.base_url(), "https://api.nsone.net/v1");
        assert_eq!(client.url("/zones"), "https://api.nsone.net/v1/zones");
        assert_eq!(
            client.zone_url("example.com").unwrap(),
            "https://api.nsone.net/v1/zones/example.com"
        );
    }

    #[test]
    fn refuses_path_injection() {
        let client = NsOneClient::from_reqwest("https://api.nsone.net/v1", Client::new());
        assert!(matches!(
            client.zone_url("example.com/../../account"),
            Err(Error::InvalidZoneName(_))
        ));
    }
}
