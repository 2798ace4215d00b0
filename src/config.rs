use std::time::Duration;

use url::Url;

use crate::format::default_cap;
use crate::notify;
use crate::platform::{RunMode, UnknownMode};
use crate::trends;

pub const ENV_TIANAPI_KEY: &str = "TIANAPI_KEY";
pub const ENV_APP_TOKEN: &str = "WXPUSHER_APP_TOKEN";
pub const ENV_TARGET_UIDS: &str = "TARGET_UIDS";
pub const ENV_PUSH_MODE: &str = "PUSH_MODE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("请设置环境变量 {0}")]
    Missing(&'static str),
    #[error("{0} 中没有有效的UID (多个UID用逗号分隔)")]
    NoRecipients(&'static str),
    #[error(transparent)]
    Mode(#[from] UnknownMode),
    #[error("{var} 必须是正整数, 实际为 {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} 不是合法的URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
}

/// Values the command line may supply on top of the environment.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub mode: Option<String>,
    pub cap: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub api_key: String,
    pub app_token: String,
    pub uids: Vec<String>,
    pub mode: RunMode,
    pub item_cap: usize,
    pub summary: String,
    pub tianapi_base_url: String,
    pub wxpusher_base_url: String,
    pub push_timeout: Duration,
}

impl RunConfig {
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok(), overrides)
    }

    pub fn from_lookup<F>(lookup: F, overrides: &Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // empty counts as unset
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let required = |k: &'static str| get(k).ok_or(ConfigError::Missing(k));

        let api_key = required(ENV_TIANAPI_KEY)?;
        let app_token = required(ENV_APP_TOKEN)?;
        let uids = parse_uids(&required(ENV_TARGET_UIDS)?);
        if uids.is_empty() {
            return Err(ConfigError::NoRecipients(ENV_TARGET_UIDS));
        }

        let mode: RunMode = match overrides.mode.clone().or_else(|| get(ENV_PUSH_MODE)) {
            Some(m) => m.parse()?,
            None => RunMode::default(),
        };

        let item_cap = match overrides.cap {
            Some(0) => return Err(ConfigError::InvalidNumber { var: "--cap", value: "0".into() }),
            Some(n) => n,
            None => match get("TREND_ITEM_CAP") {
                Some(v) => positive("TREND_ITEM_CAP", &v)? as usize,
                None => default_cap(mode),
            },
        };

        let push_timeout = match get("WXPUSHER_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(positive("WXPUSHER_TIMEOUT_SECS", &v)?),
            None => Duration::from_secs(notify::DEFAULT_TIMEOUT_SECS),
        };

        Ok(RunConfig {
            api_key,
            app_token,
            uids,
            mode,
            item_cap,
            summary: get("WXPUSHER_SUMMARY").unwrap_or_else(|| notify::DEFAULT_SUMMARY.to_string()),
            tianapi_base_url: base_url("TIANAPI_BASE_URL", get("TIANAPI_BASE_URL"), trends::DEFAULT_BASE_URL)?,
            wxpusher_base_url: base_url("WXPUSHER_BASE_URL", get("WXPUSHER_BASE_URL"), notify::DEFAULT_BASE_URL)?,
            push_timeout,
        })
    }
}

/// Splits a comma separated UID list, trimming entries and dropping blanks.
pub fn parse_uids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value: value.to_string() }),
    }
}

fn base_url(var: &'static str, value: Option<String>, default: &str) -> Result<String, ConfigError> {
    let Some(v) = value else { return Ok(default.to_string()) };
    if Url::parse(v.trim()).is_err() {
        return Err(ConfigError::InvalidUrl { var, value: v });
    }
    Ok(v.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformKind;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn load(vars: &HashMap<String, String>, overrides: &Overrides) -> Result<RunConfig, ConfigError> {
        RunConfig::from_lookup(|k| vars.get(k).cloned(), overrides)
    }

    fn base() -> HashMap<String, String> {
        env(&[("TIANAPI_KEY", "k"), ("WXPUSHER_APP_TOKEN", "AT_x"), ("TARGET_UIDS", " UID_a, UID_b ,")])
    }

    #[test]
    fn defaults_to_all_mode_with_multi_cap() {
        let cfg = load(&base(), &Overrides::default()).unwrap();
        assert_eq!(cfg.mode, RunMode::All);
        assert_eq!(cfg.item_cap, 15);
        assert_eq!(cfg.uids, vec!["UID_a", "UID_b"]);
        assert_eq!(cfg.summary, "微信热搜榜更新");
        assert_eq!(cfg.tianapi_base_url, "https://apis.tianapi.com");
        assert_eq!(cfg.push_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_target_uids_is_reported_by_name() {
        let mut vars = base();
        vars.remove("TARGET_UIDS");
        let err = load(&vars, &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TARGET_UIDS")));
        assert_eq!(err.to_string(), "请设置环境变量 TARGET_UIDS");
    }

    #[test]
    fn separators_only_uid_list_is_rejected() {
        let mut vars = base();
        vars.insert("TARGET_UIDS".into(), " , ".into());
        let err = load(&vars, &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoRecipients("TARGET_UIDS")));
        assert_eq!(err.to_string(), "TARGET_UIDS 中没有有效的UID (多个UID用逗号分隔)");
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = base();
        vars.insert("TIANAPI_KEY".into(), "  ".into());
        assert!(matches!(load(&vars, &Overrides::default()), Err(ConfigError::Missing("TIANAPI_KEY"))));
    }

    #[test]
    fn argument_overrides_push_mode() {
        let mut vars = base();
        vars.insert("PUSH_MODE".into(), "weibo".into());
        let cfg = load(&vars, &Overrides::default()).unwrap();
        assert_eq!(cfg.mode, RunMode::Single(PlatformKind::Weibo));
        assert_eq!(cfg.item_cap, 20);

        let cfg = load(&vars, &Overrides { mode: Some("douyin".into()), cap: None }).unwrap();
        assert_eq!(cfg.mode, RunMode::Single(PlatformKind::Douyin));
    }

    #[test]
    fn unsupported_mode_is_a_config_error() {
        let err = load(&base(), &Overrides { mode: Some("bilibili".into()), cap: None }).unwrap_err();
        assert!(matches!(err, ConfigError::Mode(_)));
    }

    #[test]
    fn cap_precedence_and_validation() {
        let mut vars = base();
        vars.insert("TREND_ITEM_CAP".into(), "5".into());
        assert_eq!(load(&vars, &Overrides::default()).unwrap().item_cap, 5);
        assert_eq!(load(&vars, &Overrides { mode: None, cap: Some(8) }).unwrap().item_cap, 8);
        assert!(load(&vars, &Overrides { mode: None, cap: Some(0) }).is_err());

        vars.insert("TREND_ITEM_CAP".into(), "lots".into());
        assert!(matches!(load(&vars, &Overrides::default()), Err(ConfigError::InvalidNumber { .. })));
    }

    #[test]
    fn base_urls_are_validated_and_trimmed() {
        let mut vars = base();
        vars.insert("WXPUSHER_BASE_URL".into(), "http://127.0.0.1:8080/".into());
        assert_eq!(load(&vars, &Overrides::default()).unwrap().wxpusher_base_url, "http://127.0.0.1:8080");

        vars.insert("TIANAPI_BASE_URL".into(), "not a url".into());
        assert!(matches!(load(&vars, &Overrides::default()), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn parse_uids_drops_blank_entries() {
        assert_eq!(parse_uids("a,,b , "), vec!["a", "b"]);
        assert!(parse_uids(" , ").is_empty());
    }
}
