#[cfg(test)]
use std::collections::{HashMap, VecDeque};
#[cfg(test)]
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client as HttpClient;

use crate::platform::PlatformKind;
use crate::util::time::now_local;

pub mod types;

pub use types::{Heat, TrendBatch};
#[cfg(test)]
pub use types::TrendItem;
use types::{ApiResponse, SUCCESS_CODE};

pub const DEFAULT_BASE_URL: &str = "https://apis.tianapi.com";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Clone, Debug)]
pub struct TianApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for TianApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("api error {code}: {msg}")]
    Api { code: i64, msg: String },
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Http(err) }
    }
}

/// Source of trend batches, one request per platform.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn fetch(&self, platform: PlatformKind, api_key: &str) -> Result<TrendBatch, FetchError>;
}

#[derive(Clone)]
pub struct TianApiClient {
    http: HttpClient,
    cfg: TianApiConfig,
}

impl TianApiClient {
    pub fn new(cfg: TianApiConfig) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(FetchError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self, platform: PlatformKind) -> String {
        format!("{}{}", self.cfg.base_url.trim_end_matches('/'), platform.endpoint())
    }
}

#[async_trait]
impl TrendSource for TianApiClient {
    async fn fetch(&self, platform: PlatformKind, api_key: &str) -> Result<TrendBatch, FetchError> {
        let response = self
            .http
            .post(self.endpoint(platform))
            .form(&[("key", api_key)])
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        parse_response(platform, &bytes, now_local())
    }
}

/// Decodes a trends API body, rejecting non-success codes.
pub fn parse_response(platform: PlatformKind, body: &[u8], captured_at: NaiveDateTime) -> Result<TrendBatch, FetchError> {
    let parsed: ApiResponse = serde_json::from_slice(body)?;
    if parsed.code != SUCCESS_CODE {
        return Err(FetchError::Api {
            code: parsed.code,
            msg: parsed.msg.unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    let items = parsed
        .result
        .unwrap_or_default()
        .list
        .into_iter()
        .map(|raw| raw.into_item(platform))
        .collect();
    Ok(TrendBatch { platform, code: parsed.code, items, captured_at })
}

/// Canned responses keyed by platform; platforms with nothing queued fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockTrendSource {
    responses: Mutex<HashMap<PlatformKind, VecDeque<Result<TrendBatch, FetchError>>>>,
    calls: Mutex<Vec<(PlatformKind, String)>>,
}

#[cfg(test)]
impl MockTrendSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, platform: PlatformKind, resp: Result<TrendBatch, FetchError>) {
        self.responses.lock().unwrap().entry(platform).or_default().push_back(resp);
    }

    pub fn calls(&self) -> Vec<(PlatformKind, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl TrendSource for MockTrendSource {
    async fn fetch(&self, platform: PlatformKind, api_key: &str) -> Result<TrendBatch, FetchError> {
        self.calls.lock().unwrap().push((platform, api_key.to_string()));
        self.responses
            .lock()
            .unwrap()
            .get_mut(&platform)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Err(FetchError::Api { code: -1, msg: "mock queue empty".into() }))
    }
}
