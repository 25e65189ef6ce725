use crate::WidgetCode;
use crate::opendota::LiveMatch;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const OPENDOTA_BASE: &str = "https://api.opendota.com";
const VK_BASE: &str = "https://api.vk.com";
const VK_API_VERSION: &str = "5.80";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the two endpoints a widget refresh touches: OpenDota's live
/// games feed and VK's `appWidgets.update` method.
#[derive(Debug, Clone)]
pub struct LiveApi {
    client: Client,
    fetch_timeout: Duration,
    publish_timeout: Option<Duration>,
    opendota_base: String,
    vk_base: String,
}

impl Default for LiveApi {
    fn default() -> Self {
        Self::with_client(
            Client::builder()
                .user_agent(concat!("dota-widget/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        )
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// VK accepted the request but refused it, e.g. a bad access token.
    Rejected { code: i64, message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Rejected { code, message } => {
                write!(f, "VK rejected widget update ({code}): {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            ApiError::Rejected { .. } => None,
        }
    }
}

/// VK method responses carry either `response` or `error`.
#[derive(Debug, Deserialize, Default)]
struct VkEnvelope {
    error: Option<VkError>,
}

#[derive(Debug, Deserialize, Default)]
struct VkError {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

impl LiveApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing [`reqwest::Client`]; timeouts are applied per request.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            fetch_timeout: FETCH_TIMEOUT,
            publish_timeout: None,
            opendota_base: OPENDOTA_BASE.to_owned(),
            vk_base: VK_BASE.to_owned(),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// `None` leaves the widget update unbounded.
    pub fn with_publish_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Point the client at other hosts, e.g. a local mock server.
    pub fn with_base_urls(mut self, opendota: impl Into<String>, vk: impl Into<String>) -> Self {
        self.opendota_base = opendota.into().trim_end_matches('/').to_owned();
        self.vk_base = vk.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn publish_timeout(&self) -> Option<Duration> {
        self.publish_timeout
    }

    /// Fetch every lobby OpenDota currently reports as live.
    pub async fn fetch_live_matches(&self) -> ApiResult<Vec<LiveMatch>> {
        let url = format!("{}/api/live", self.opendota_base);
        debug!("fetching live matches from {url}");

        let response = self
            .client
            .get(&url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.clone()))?
            .json::<Vec<LiveMatch>>()
            .await
            .map_err(|e| ApiError::Parsing(e, url))
    }

    /// Push widget code to the community widget via `appWidgets.update`.
    ///
    /// Only a transport failure or a VK `error` object is reported; the
    /// HTTP status and any other body are not inspected.
    pub async fn publish_widget(&self, widget: &WidgetCode, access_token: &str) -> ApiResult<()> {
        let url = format!("{}/method/appWidgets.update", self.vk_base);
        debug!("publishing {} widget ({} bytes of code)", widget.kind, widget.code.len());

        let mut request = self.client.get(&url).query(&[
            ("access_token", access_token),
            ("v", VK_API_VERSION),
            ("type", widget.kind.as_str()),
            ("code", widget.code.as_str()),
        ]);
        if let Some(timeout) = self.publish_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| ApiError::Network(e, url))?;

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<VkEnvelope>(&body) {
            Ok(VkEnvelope { error: Some(err) }) => Err(ApiError::Rejected {
                code: err.error_code,
                message: err.error_msg,
            }),
            _ => Ok(()),
        }
    }
}
