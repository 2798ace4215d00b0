use std::fmt::Write as _;

use crate::platform::{PlatformKind, RunMode};
use crate::trends::{Heat, TrendBatch};
use crate::util::num::group_thousands;
use crate::util::time::format_header_ts;

pub const SINGLE_PLATFORM_CAP: usize = 20;
pub const MULTI_PLATFORM_CAP: usize = 15;
pub const NO_TITLE: &str = "无标题";

/// Default item cap for a run mode.
pub fn default_cap(mode: RunMode) -> usize {
    match mode {
        RunMode::All => MULTI_PLATFORM_CAP,
        RunMode::Single(_) => SINGLE_PLATFORM_CAP,
    }
}

/// Rule line placed between platform sections of a combined push.
pub fn separator() -> String {
    format!("\n\n{}\n\n", "=".repeat(50))
}

pub fn combine(parts: &[String]) -> String {
    parts.join(&separator())
}

pub fn failure_line(platform: PlatformKind) -> String {
    format!("❌ 获取{}热搜失败", platform.display_name())
}

/// Renders one platform's batch as markdown. Never returns an empty string.
pub fn format_batch(batch: Option<&TrendBatch>, platform: PlatformKind, cap: usize) -> String {
    let Some(batch) = batch.filter(|b| b.is_success()) else {
        return failure_line(platform);
    };
    let name = platform.display_name();
    let icon = platform.icon();

    if batch.items.is_empty() {
        return format!("{icon} 暂无{name}热搜数据");
    }

    let mut out = format!("{icon} **{name}热搜榜** ({})\n\n", format_header_ts(&batch.captured_at));
    for (i, item) in batch.items.iter().take(cap).enumerate() {
        let title = item.title.as_deref().unwrap_or(NO_TITLE);
        let _ = writeln!(out, "🔥 **{}.** {}", i + 1, title);
        let heat = match &item.heat {
            Some(Heat::Text(s)) => Some(s.clone()),
            Some(Heat::Count(n)) => Some(group_thousands(*n)),
            None => None,
        };
        if let Some(h) = heat {
            let _ = writeln!(out, "   热度: {h}");
        }
        out.push('\n');
    }
    out
}
