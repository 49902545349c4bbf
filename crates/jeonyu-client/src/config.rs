use std::time::Duration;

pub const DEFAULT_JUSO_BASE_URL: &str = "https://business.juso.go.kr";
pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://apis.data.go.kr/1613000/BldRgstHubService";

/// Endpoints and credentials for both upstream services.
///
/// Keys are the decoded form issued by each portal; they are URL-encoded on
/// the way out.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub juso_base_url: String,
    pub juso_key: String,
    pub registry_base_url: String,
    pub registry_key: String,
    /// Address candidates requested per search.
    pub address_candidates: u32,
    /// `numOfRows` for registry pages.
    pub rows_per_page: u32,
    /// Upper bound on registry pages fetched per operation.
    pub max_pages: u32,
    /// Transport-level timeout per HTTP request.
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            juso_base_url: DEFAULT_JUSO_BASE_URL.into(),
            juso_key: String::new(),
            registry_base_url: DEFAULT_REGISTRY_BASE_URL.into(),
            registry_key: String::new(),
            address_candidates: 10,
            rows_per_page: 9999,
            max_pages: 10,
            http_timeout: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    pub fn with_keys(juso_key: impl Into<String>, registry_key: impl Into<String>) -> Self {
        Self {
            juso_key: juso_key.into(),
            registry_key: registry_key.into(),
            ..Self::default()
        }
    }
}
