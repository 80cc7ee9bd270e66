use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::{LookupError, LookupResult};
use crate::types::EnrichmentResult;

/// Marker the lookup service uses for "no value"
pub const NOT_AVAILABLE_MARKER: &str = "N/A";

/// Configuration for the remote metadata lookup service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Lookup endpoint, queried as `<endpoint>?t=<title>&apikey=<key>`
    pub endpoint: String,
    /// Base of the detail page link, joined as `<link_base>/<identifier>/`
    pub link_base: String,
    /// Credential used for the image lookup
    pub image_api_key: String,
    /// Credential used for the identifier lookup
    pub detail_api_key: String,
    /// HTTP client timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://www.omdbapi.com/".to_string(),
            link_base: "https://www.imdb.com/title".to_string(),
            image_api_key: String::new(),
            detail_api_key: String::new(),
            timeout_ms: 5_000,
        }
    }
}

/// Which response field a lookup is interested in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    /// `Poster`: image reference, used as-is
    Image,
    /// `imdbID`: identifier the detail link is built from
    Identifier,
}

impl LookupField {
    fn api_key(self, config: &LookupConfig) -> &str {
        match self {
            LookupField::Image => &config.image_api_key,
            LookupField::Identifier => &config.detail_api_key,
        }
    }

    fn label(self) -> &'static str {
        match self {
            LookupField::Image => "image",
            LookupField::Identifier => "identifier",
        }
    }
}

/// State of a single optional field in a lookup response
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<serde_json::Value>")]
pub enum FieldValue {
    /// Key missing, null, blank, or not a string
    #[default]
    Missing,
    /// Key present with the not-available marker
    NotAvailable,
    Present(String),
}

impl From<Option<serde_json::Value>> for FieldValue {
    fn from(value: Option<serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::String(s)) if s == NOT_AVAILABLE_MARKER => FieldValue::NotAvailable,
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => FieldValue::Present(s),
            _ => FieldValue::Missing,
        }
    }
}

impl FieldValue {
    pub fn into_option(self) -> Option<String> {
        match self {
            FieldValue::Present(value) => Some(value),
            FieldValue::Missing | FieldValue::NotAvailable => None,
        }
    }
}

/// The subset of the lookup response this crate consumes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(rename = "Poster", default)]
    pub poster: FieldValue,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: FieldValue,
}

impl LookupResponse {
    fn take(self, field: LookupField) -> FieldValue {
        match field {
            LookupField::Image => self.poster,
            LookupField::Identifier => self.imdb_id,
        }
    }
}

/// Anything that can produce enrichment metadata for a title.
///
/// `Err` is reserved for transport faults; ordinary absence is an `Ok` result
/// with `None` fields. A source that still found something despite a fault
/// returns it in `LookupError::Incomplete`.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    async fn fetch(&self, title: &str) -> LookupResult<EnrichmentResult>;
}

/// HTTP client for the remote lookup service
#[derive(Debug, Clone)]
pub struct EnrichmentClient {
    config: LookupConfig,
    client: Client,
}

impl Default for EnrichmentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrichmentClient {
    pub fn new() -> Self {
        Self::with_config(LookupConfig::default())
    }

    pub fn with_config(config: LookupConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn get_config(&self) -> &LookupConfig {
        &self.config
    }

    /// Poster URL for `title`, if the service has one
    pub async fn fetch_image(&self, title: &str) -> LookupResult<Option<String>> {
        let value = self.lookup(LookupField::Image, title).await?;
        Ok(value.into_option())
    }

    /// Detail page link for `title`, built from the remote identifier
    pub async fn fetch_detail_link(&self, title: &str) -> LookupResult<Option<String>> {
        let value = self.lookup(LookupField::Identifier, title).await?;
        Ok(value
            .into_option()
            .map(|id| format!("{}/{}/", self.config.link_base.trim_end_matches('/'), id)))
    }

    /// Issue one lookup and extract `field` from the response.
    ///
    /// Non-2xx statuses and unparseable bodies resolve to `FieldValue::Missing`.
    pub async fn lookup(&self, field: LookupField, title: &str) -> LookupResult<FieldValue> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("t", title), ("apikey", field.api_key(&self.config))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("{} lookup for '{}' returned HTTP {}", field.label(), title, status);
            return Ok(FieldValue::Missing);
        }

        let body = response.text().await?;
        let value = match serde_json::from_str::<LookupResponse>(&body) {
            Ok(parsed) => parsed.take(field),
            Err(e) => {
                log::debug!("{} lookup for '{}' returned an unparseable body: {}", field.label(), title, e);
                FieldValue::Missing
            }
        };

        log::debug!(
            "{} lookup for '{}' finished in {:?}: {:?}",
            field.label(),
            title,
            start_time.elapsed(),
            value
        );
        Ok(value)
    }
}

#[async_trait]
impl EnrichmentSource for EnrichmentClient {
    async fn fetch(&self, title: &str) -> LookupResult<EnrichmentResult> {
        let (image_ref, detail_link) = tokio::join!(self.fetch_image(title), self.fetch_detail_link(title));

        match (image_ref, detail_link) {
            (Ok(image_ref), Ok(detail_link)) => Ok(EnrichmentResult::new(title, image_ref, detail_link)),
            (Err(e), Err(_)) => Err(e),
            (Ok(image_ref), Err(e)) => {
                log::debug!("Detail lookup for '{}' failed, keeping image only: {}", title, e);
                Err(LookupError::incomplete(EnrichmentResult::new(title, image_ref, None), e))
            }
            (Err(e), Ok(detail_link)) => {
                log::debug!("Image lookup for '{}' failed, keeping detail link only: {}", title, e);
                Err(LookupError::incomplete(EnrichmentResult::new(title, None, detail_link), e))
            }
        }
    }
}

/// Convenience for callers that only need to know whether a fault was a timeout
pub fn is_timeout(error: &LookupError) -> bool {
    matches!(
        error,
        LookupError::Timeout { .. } | LookupError::Network { is_timeout: true, .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> LookupConfig {
        LookupConfig {
            endpoint: server.uri(),
            link_base: "https://www.imdb.com/title".to_string(),
            image_api_key: "image-key".to_string(),
            detail_api_key: "detail-key".to_string(),
            timeout_ms: 2_000,
        }
    }

    #[test]
    fn test_field_value_states() {
        let parsed: LookupResponse = serde_json::from_value(json!({
            "Poster": "N/A",
            "imdbID": "tt0499549"
        }))
        .unwrap();
        assert_eq!(parsed.poster, FieldValue::NotAvailable);
        assert_eq!(parsed.imdb_id, FieldValue::Present("tt0499549".to_string()));

        let parsed: LookupResponse = serde_json::from_value(json!({ "Response": "False" })).unwrap();
        assert_eq!(parsed.poster, FieldValue::Missing);
        assert_eq!(parsed.imdb_id, FieldValue::Missing);

        let parsed: LookupResponse = serde_json::from_value(json!({ "Poster": null, "imdbID": 42 })).unwrap();
        assert_eq!(parsed.poster, FieldValue::Missing);
        assert_eq!(parsed.imdb_id, FieldValue::Missing);
    }

    #[test]
    fn test_default_config() {
        let config = LookupConfig::default();
        assert_eq!(config.endpoint, "http://www.omdbapi.com/");
        assert_eq!(config.link_base, "https://www.imdb.com/title");
        assert_eq!(config.timeout_ms, 5_000);
    }

    #[tokio::test]
    async fn test_fetch_image_uses_image_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("t", "Avatar"))
            .and(query_param("apikey", "image-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": "Avatar",
                "Poster": "https://img.example/avatar.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_config(test_config(&server));
        let image = client.fetch_image("Avatar").await.unwrap();
        assert_eq!(image.as_deref(), Some("https://img.example/avatar.jpg"));
    }

    #[tokio::test]
    async fn test_fetch_detail_link_builds_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "detail-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "imdbID": "tt0499549" })))
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_config(test_config(&server));
        let link = client.fetch_detail_link("Avatar").await.unwrap();
        assert_eq!(link.as_deref(), Some("https://www.imdb.com/title/tt0499549/"));
    }

    #[tokio::test]
    async fn test_title_is_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("t", "Pirates of the Caribbean: At World's End"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Poster": "p.jpg" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_config(test_config(&server));
        let image = client.fetch_image("Pirates of the Caribbean: At World's End").await.unwrap();
        assert_eq!(image.as_deref(), Some("p.jpg"));
    }

    #[tokio::test]
    async fn test_missing_and_marker_fields_are_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": "Obscure",
                "Poster": "N/A"
            })))
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_config(test_config(&server));
        assert_eq!(client.fetch_image("Obscure").await.unwrap(), None);
        assert_eq!(client.fetch_detail_link("Obscure").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_config(test_config(&server));
        assert_eq!(client.fetch_image("Avatar").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_config(test_config(&server));
        assert_eq!(client.fetch_image("Avatar").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let config = LookupConfig {
            endpoint: "http://127.0.0.1:9/".to_string(),
            timeout_ms: 500,
            ..LookupConfig::default()
        };
        let client = EnrichmentClient::with_config(config);
        let result = client.fetch_image("Avatar").await;
        assert!(matches!(result, Err(LookupError::Network { .. })));
    }

    #[tokio::test]
    async fn test_fetch_combines_both_lookups() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Poster": "https://img.example/heat.jpg",
                "imdbID": "tt0113277"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_config(test_config(&server));
        let result = client.fetch("Heat").await.unwrap();
        assert_eq!(result.title, "Heat");
        assert_eq!(result.image_ref.as_deref(), Some("https://img.example/heat.jpg"));
        assert_eq!(result.detail_link.as_deref(), Some("https://www.imdb.com/title/tt0113277/"));
    }

    #[tokio::test]
    async fn test_fetch_keeps_image_when_detail_lookup_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "image-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Poster": "p.jpg" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "detail-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "imdbID": "tt0113277" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = LookupConfig {
            timeout_ms: 300,
            ..test_config(&server)
        };
        let client = EnrichmentClient::with_config(config);

        match client.fetch("Heat").await {
            Err(LookupError::Incomplete { result, cause }) => {
                assert_eq!(result.title, "Heat");
                assert_eq!(result.image_ref.as_deref(), Some("p.jpg"));
                assert_eq!(result.detail_link, None);
                assert!(is_timeout(&cause));
            }
            other => panic!("expected an incomplete lookup, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_fails_when_both_lookups_fail() {
        let config = LookupConfig {
            endpoint: "http://127.0.0.1:9/".to_string(),
            timeout_ms: 500,
            ..LookupConfig::default()
        };
        let client = EnrichmentClient::with_config(config);
        assert!(matches!(client.fetch("Heat").await, Err(LookupError::Network { .. })));
    }

    #[test]
    fn test_is_timeout() {
        assert!(is_timeout(&LookupError::Timeout { title: "x".into(), timeout_ms: 1 }));
        assert!(is_timeout(&LookupError::Network { message: "t".into(), is_timeout: true }));
        assert!(!is_timeout(&LookupError::Cancelled { title: "x".into() }));
    }
}
