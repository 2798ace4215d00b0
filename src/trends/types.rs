use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::platform::PlatformKind;
use crate::util::serde_utils::{string_from_string_or_number, u64_from_string_or_number};

/// Trends API success code.
pub const SUCCESS_CODE: i64 = 200;

/// Popularity metric, shaped per platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Heat {
    Text(String),
    Count(u64),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendItem {
    pub title: Option<String>,
    pub heat: Option<Heat>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendBatch {
    pub platform: PlatformKind,
    pub code: i64,
    pub items: Vec<TrendItem>,
    pub captured_at: NaiveDateTime,
}

impl TrendBatch {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

// Wire schema. Every field is optional; absent values take the stated default.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub result: Option<ApiResult>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiResult {
    #[serde(default)]
    pub list: Vec<ApiItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiItem {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub hotword: Option<String>,
    #[serde(default, deserialize_with = "string_from_string_or_number")]
    pub hotwordnum: Option<String>,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub hotindex: u64,
}

impl ApiItem {
    pub(crate) fn into_item(self, platform: PlatformKind) -> TrendItem {
        match platform {
            PlatformKind::Weixin => TrendItem { title: self.word, heat: None },
            PlatformKind::Weibo => {
                let heat = self
                    .hotwordnum
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .map(Heat::Text);
                TrendItem { title: self.hotword, heat }
            }
            PlatformKind::Douyin => TrendItem { title: self.word, heat: Some(Heat::Count(self.hotindex)) },
        }
    }
}
