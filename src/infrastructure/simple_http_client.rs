//! HTTP client for fetching menu pages
//!
//! One request per page: a failed fetch is reported to the caller and the
//! location is simply missing from that cycle.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::application::DocumentSource;
use crate::domain::location::DiningLocation;
use crate::infrastructure::config::{ScraperConfig, defaults, utils};

/// Transport failures while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid menu URL for base '{base}': {source}")]
    InvalidUrl {
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    pub fn from_scraper_config(scraper: &ScraperConfig) -> Self {
        Self {
            timeout_seconds: scraper.timeout_seconds,
            user_agent: scraper.user_agent.clone(),
            follow_redirects: scraper.follow_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            follow_redirects: true,
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;

        Ok(Self { client })
    }

    /// Fetch raw response from a URL; non-success statuses are errors
    pub async fn fetch_response(&self, url: &str) -> Result<Response, FetchError> {
        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Fetch HTML content as a string (Send-compatible, parse afterwards)
    pub async fn fetch_html_string(&self, url: &str) -> Result<String, FetchError> {
        let response = self.fetch_response(url).await?;

        let html_content = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        if html_content.is_empty() {
            return Err(FetchError::EmptyBody { url: url.to_string() });
        }

        debug!("Fetched {} bytes from {}", html_content.len(), url);
        Ok(html_content)
    }
}

/// Menu pages served by the dining site over HTTP
#[derive(Clone)]
pub struct HttpMenuSource {
    client: HttpClient,
    base_url: String,
}

impl HttpMenuSource {
    pub fn new(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub fn from_scraper_config(scraper: &ScraperConfig) -> Result<Self, FetchError> {
        let client = HttpClient::with_config(HttpClientConfig::from_scraper_config(scraper))?;
        Ok(Self::new(client, &scraper.base_url))
    }

    pub fn menu_url(&self, location: DiningLocation) -> Result<String, FetchError> {
        utils::menu_url(&self.base_url, location)
            .map(String::from)
            .map_err(|source| FetchError::InvalidUrl {
                base: self.base_url.clone(),
                source,
            })
    }
}

#[async_trait]
impl DocumentSource for HttpMenuSource {
    async fn fetch(&self, location: DiningLocation) -> Result<String, FetchError> {
        let url = self.menu_url(location)?;
        self.client.fetch_html_string(&url).await
    }

    fn source_url(&self, location: DiningLocation) -> Option<String> {
        self.menu_url(location).ok()
    }
}
