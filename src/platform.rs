use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Trend sources the trends API exposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Weixin,
    Weibo,
    Douyin,
}

impl PlatformKind {
    /// Iteration order for combined pushes.
    pub const ALL: [PlatformKind; 3] = [PlatformKind::Weixin, PlatformKind::Weibo, PlatformKind::Douyin];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Weixin => "weixin",
            PlatformKind::Weibo => "weibo",
            PlatformKind::Douyin => "douyin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformKind::Weixin => "微信",
            PlatformKind::Weibo => "微博",
            PlatformKind::Douyin => "抖音",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PlatformKind::Weixin => "📱",
            PlatformKind::Weibo => "🔥",
            PlatformKind::Douyin => "🎵",
        }
    }

    /// Path on the trends API host.
    pub fn endpoint(&self) -> &'static str {
        match self {
            PlatformKind::Weixin => "/wxhottopic/index",
            PlatformKind::Weibo => "/weibohot/index",
            PlatformKind::Douyin => "/douyinhot/index",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        PlatformKind::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// What a single run pushes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "platform")]
pub enum RunMode {
    #[default]
    All,
    Single(PlatformKind),
}

impl RunMode {
    pub const SUPPORTED: &'static str = "all, weixin, weibo, douyin";

    pub fn platforms(&self) -> Vec<PlatformKind> {
        match self {
            RunMode::All => PlatformKind::ALL.to_vec(),
            RunMode::Single(p) => vec![*p],
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::All => f.write_str("all"),
            RunMode::Single(p) => write!(f, "{p}"),
        }
    }
}

impl FromStr for RunMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(RunMode::All);
        }
        s.parse::<PlatformKind>()
            .map(RunMode::Single)
            .map_err(|_| UnknownMode(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("不支持的推送模式: {0} (支持的模式: {})", RunMode::SUPPORTED)]
pub struct UnknownMode(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_platform() {
        assert_eq!(PlatformKind::Weixin.endpoint(), "/wxhottopic/index");
        assert_eq!(PlatformKind::Weibo.endpoint(), "/weibohot/index");
        assert_eq!(PlatformKind::Douyin.endpoint(), "/douyinhot/index");
    }

    #[test]
    fn parse_modes_case_insensitively() {
        assert_eq!("all".parse::<RunMode>().unwrap(), RunMode::All);
        assert_eq!(" ALL ".parse::<RunMode>().unwrap(), RunMode::All);
        assert_eq!("Weibo".parse::<RunMode>().unwrap(), RunMode::Single(PlatformKind::Weibo));
        assert_eq!("douyin".parse::<RunMode>().unwrap(), RunMode::Single(PlatformKind::Douyin));
    }

    #[test]
    fn unknown_mode_lists_supported() {
        let err = "tiktok".parse::<RunMode>().unwrap_err();
        assert_eq!(err, UnknownMode("tiktok".into()));
        let msg = err.to_string();
        assert!(msg.contains("tiktok"));
        assert!(msg.contains("all, weixin, weibo, douyin"));
    }

    #[test]
    fn all_mode_iterates_in_fixed_order() {
        assert_eq!(
            RunMode::All.platforms(),
            vec![PlatformKind::Weixin, PlatformKind::Weibo, PlatformKind::Douyin]
        );
        assert_eq!(RunMode::Single(PlatformKind::Weibo).platforms(), vec![PlatformKind::Weibo]);
    }
}
