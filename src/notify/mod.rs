#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_repr::Serialize_repr;

pub const DEFAULT_BASE_URL: &str = "https://wxpusher.zjiecode.com";
pub const DEFAULT_SUMMARY: &str = "微信热搜榜更新";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Application-level success code; HTTP status is not consulted.
pub const SUCCESS_CODE: i64 = 1000;

/// Message body codes accepted by the push API. Runs send markdown.
#[allow(dead_code)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize_repr)]
#[repr(u8)]
pub enum ContentType {
    Text = 1,
    Html = 2,
    #[default]
    Markdown = 3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PushPayload {
    pub uids: Vec<String>,
    pub content: String,
    pub content_type: ContentType,
    pub summary: String,
}

impl PushPayload {
    pub fn markdown(uids: Vec<String>, content: String, summary: impl Into<String>) -> Self {
        Self { uids, content, content_type: ContentType::Markdown, summary: summary.into() }
    }
}

/// Per-recipient record from the push response's `data` array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PushReceipt {
    pub msg: String,
    pub deliveries: Vec<Delivery>,
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("未设置目标用户UID")]
    NoRecipients,
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{msg} (code {code})")]
    Rejected { code: i64, msg: String },
}

impl PushError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { PushError::Timeout } else { PushError::Http(err) }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, payload: &PushPayload) -> Result<PushReceipt, PushError>;
}

#[derive(Clone, Debug)]
pub struct WxPusherConfig {
    pub app_token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl WxPusherConfig {
    pub fn new(app_token: impl Into<String>) -> Self {
        Self {
            app_token: app_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone)]
pub struct WxPusherClient {
    http: HttpClient,
    cfg: WxPusherConfig,
}

impl WxPusherClient {
    pub fn new(cfg: WxPusherConfig) -> Result<Self, PushError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(PushError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/send/message", self.cfg.base_url.trim_end_matches('/'))
    }

    fn build_api_request<'a>(&'a self, payload: &'a PushPayload) -> ApiSendRequest<'a> {
        ApiSendRequest {
            app_token: &self.cfg.app_token,
            content: &payload.content,
            summary: &payload.summary,
            content_type: payload.content_type,
            uids: &payload.uids,
        }
    }
}

#[async_trait]
impl Notifier for WxPusherClient {
    async fn push(&self, payload: &PushPayload) -> Result<PushReceipt, PushError> {
        if payload.uids.is_empty() {
            return Err(PushError::NoRecipients);
        }

        let response = self
            .http
            .post(self.endpoint())
            .json(&self.build_api_request(payload))
            .send()
            .await
            .map_err(PushError::from_reqwest)?;
        let bytes = response.bytes().await.map_err(PushError::from_reqwest)?;
        parse_response(&bytes)
    }
}

/// Interprets a push response body by its `code` field alone.
pub fn parse_response(body: &[u8]) -> Result<PushReceipt, PushError> {
    let parsed: ApiSendResponse = serde_json::from_slice(body)?;
    let msg = parsed.msg.unwrap_or_else(|| "未知错误".to_string());
    if parsed.code != Some(SUCCESS_CODE) {
        return Err(PushError::Rejected { code: parsed.code.unwrap_or_default(), msg });
    }
    Ok(PushReceipt { msg, deliveries: parsed.data.unwrap_or_default() })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiSendRequest<'a> {
    app_token: &'a str,
    content: &'a str,
    summary: &'a str,
    content_type: ContentType,
    uids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ApiSendResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Vec<Delivery>>,
}

/// Records every payload and answers from a queue; empty queue means success.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockNotifier {
    responses: Mutex<VecDeque<Result<PushReceipt, PushError>>>,
    calls: Mutex<Vec<PushPayload>>,
}

#[cfg(test)]
impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, resp: Result<PushReceipt, PushError>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> Vec<PushPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Notifier for MockNotifier {
    async fn push(&self, payload: &PushPayload) -> Result<PushReceipt, PushError> {
        self.calls.lock().unwrap().push(payload.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PushReceipt { msg: "处理成功".into(), deliveries: vec![] }))
    }
}
