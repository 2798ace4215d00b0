use std::env;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

static FORCE_JSON: OnceLock<bool> = OnceLock::new();

/// `--json` wins over TREND_OUTPUT_FORMAT.
pub fn set_json_mode(v: bool) {
    let _ = FORCE_JSON.set(v);
}

impl OutputConfig {
    pub fn from_env() -> Self {
        Self::resolve(
            *FORCE_JSON.get().unwrap_or(&false),
            env::var("TREND_OUTPUT_FORMAT").ok().as_deref(),
            env::var("TREND_OUTPUT_PRETTY").ok().as_deref(),
        )
    }

    fn resolve(force_json: bool, format: Option<&str>, pretty: Option<&str>) -> Self {
        let format = match format {
            _ if force_json => OutputFormat::Json,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = match pretty {
            Some(v) if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") => true,
            _ => false,
        };
        OutputConfig { format, pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_format_and_pretty() {
        assert_eq!(OutputConfig::resolve(false, None, None), OutputConfig { format: OutputFormat::Text, pretty: false });
        assert_eq!(OutputConfig::resolve(false, Some("json"), Some("YES")).format, OutputFormat::Json);
        assert!(OutputConfig::resolve(false, Some("json"), Some("YES")).pretty);
        assert_eq!(OutputConfig::resolve(true, Some("text"), None).format, OutputFormat::Json);
    }
}
