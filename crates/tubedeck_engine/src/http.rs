use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::registry::Registry;
use crate::{AddRequest, Collection, History, RegistryError, RegistryReply};

#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Root of the registry API; a trailing slash is added when missing.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081/".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    ids: &'a [String],
    #[serde(rename = "where")]
    collection: Collection,
}

#[derive(Serialize)]
struct StartBody<'a> {
    ids: &'a [String],
}

/// Registry reached over its JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    base: Url,
    client: reqwest::Client,
}

impl HttpRegistry {
    pub fn new(settings: RegistrySettings) -> Result<Self, RegistryError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| RegistryError::InvalidBaseUrl(format!("{}: {err}", settings.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(RegistryError::InvalidBaseUrl(settings.base_url));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RegistryError::Transport(err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, name: &str) -> Result<Url, RegistryError> {
        self.base
            .join(name)
            .map_err(|err| RegistryError::InvalidBaseUrl(err.to_string()))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        name: &str,
        body: &B,
    ) -> Result<RegistryReply, RegistryError> {
        let payload =
            serde_json::to_vec(body).map_err(|err| RegistryError::Decode(err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint(name)?)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }
}

#[async_trait::async_trait]
impl Registry for HttpRegistry {
    async fn add(&self, request: &AddRequest) -> Result<RegistryReply, RegistryError> {
        self.post("add", request).await
    }

    async fn delete_by_id(
        &self,
        collection: Collection,
        ids: &[String],
    ) -> Result<RegistryReply, RegistryError> {
        self.post("delete", &DeleteBody { ids, collection }).await
    }

    async fn start_by_id(&self, ids: &[String]) -> Result<RegistryReply, RegistryError> {
        self.post("start", &StartBody { ids }).await
    }

    async fn history(&self) -> Result<History, RegistryError> {
        let response = self
            .client
            .get(self.endpoint("history")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RegistryError> {
    let status = response.status();
    if !status.is_success() {
        return Err(RegistryError::HttpStatus(status.as_u16()));
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| RegistryError::Decode(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> RegistryError {
    if err.is_timeout() {
        return RegistryError::Timeout(err.to_string());
    }
    RegistryError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{HttpRegistry, RegistrySettings};
    use crate::RegistryError;

    fn registry(base_url: &str) -> Result<HttpRegistry, RegistryError> {
        HttpRegistry::new(RegistrySettings {
            base_url: base_url.to_string(),
            ..RegistrySettings::default()
        })
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let registry = registry("http://nas.local:8081/metube").unwrap();
        assert_eq!(registry.base_url().as_str(), "http://nas.local:8081/metube/");
        assert_eq!(
            registry.endpoint("add").unwrap().as_str(),
            "http://nas.local:8081/metube/add"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            registry("not a url"),
            Err(RegistryError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            registry("mailto:someone@example.com"),
            Err(RegistryError::InvalidBaseUrl(_))
        ));
    }
}
