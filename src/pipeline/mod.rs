use std::fmt;

use serde::Serialize;
use tracing::Instrument;

use crate::config::RunConfig;
use crate::format::{self, format_batch};
use crate::notify::{Delivery, Notifier, PushError, PushPayload};
use crate::platform::{PlatformKind, RunMode};
use crate::telemetry::{self, ctx::LogCtx, ops::push::{Phase as PushPhase, Push}};
use crate::trends::{FetchError, TrendSource};

/// Where an aborted run stopped. Runs only move forward through these
/// stages. Formatting cannot fail, a finished run is the `Ok(RunOutcome)`
/// and any `RunError` is the aborted state, so none of those need a variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Configuring,
    Fetching,
    Pushing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Configuring => "configuring",
            Stage::Fetching => "fetching",
            Stage::Pushing => "pushing",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("未设置目标用户UID")]
    NoRecipients,
    #[error("无法获取{}热搜数据: {source}", .platform.display_name())]
    Fetch { platform: PlatformKind, source: FetchError },
    #[error("无法获取任何平台的热搜数据")]
    NoData,
    #[error("推送失败: {0}")]
    Push(#[from] PushError),
}

impl RunError {
    pub fn stage(&self) -> Stage {
        match self {
            RunError::NoRecipients => Stage::Configuring,
            RunError::Fetch { .. } | RunError::NoData => Stage::Fetching,
            RunError::Push(_) => Stage::Pushing,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlatformReport {
    pub platform: PlatformKind,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunOutcome {
    pub mode: RunMode,
    pub item_cap: usize,
    pub platforms: Vec<PlatformReport>,
    pub recipients: usize,
    pub content: String,
    pub pushed: bool,
    pub deliveries: Vec<Delivery>,
    pub summary: String,
}

impl RunOutcome {
    fn summarize(&mut self) {
        let ok = self.platforms.iter().filter(|p| p.ok).count();
        let verb = if self.pushed { "pushed" } else { "previewed" };
        self.summary = format!(
            "{verb} {ok}/{} platforms to {} recipients ({} chars)",
            self.platforms.len(),
            self.recipients,
            self.content.chars().count()
        );
    }
}

fn mode_label(mode: RunMode) -> &'static str {
    match mode {
        RunMode::All => "所有平台",
        RunMode::Single(p) => p.display_name(),
    }
}

/// Fetches, formats and pushes once according to `cfg.mode`.
pub async fn run(
    cfg: &RunConfig,
    source: &dyn TrendSource,
    notifier: &dyn Notifier,
    opts: RunOptions,
) -> Result<RunOutcome, RunError> {
    let log = telemetry::push();
    let root = log.root_span_kv([
        ("mode", cfg.mode.to_string()),
        ("cap", cfg.item_cap.to_string()),
        ("recipients", cfg.uids.len().to_string()),
        ("dry_run", opts.dry_run.to_string()),
    ]);
    execute(&log, cfg, source, notifier, opts).instrument(root).await
}

async fn execute(
    log: &LogCtx<Push>,
    cfg: &RunConfig,
    source: &dyn TrendSource,
    notifier: &dyn Notifier,
    opts: RunOptions,
) -> Result<RunOutcome, RunError> {
    if cfg.uids.is_empty() && !opts.dry_run {
        return Err(RunError::NoRecipients);
    }

    log.info(format!("🔄 开始获取{}热搜...", mode_label(cfg.mode)));

    let mut sections: Vec<String> = Vec::new();
    let mut reports: Vec<PlatformReport> = Vec::new();

    for platform in cfg.mode.platforms() {
        let fetched = source
            .fetch(platform, &cfg.api_key)
            .instrument(log.span_kv(&PushPhase::Fetch, [("platform", platform.to_string())]))
            .await;

        let batch = match fetched {
            Ok(batch) => batch,
            Err(err) => {
                log.platform_failed(platform, &err);
                if let RunMode::Single(_) = cfg.mode {
                    return Err(RunError::Fetch { platform, source: err });
                }
                reports.push(PlatformReport { platform, ok: false, items: None, error: Some(err.to_string()) });
                continue;
            }
        };

        log.platform_ok(platform, batch.items.len());
        let text = {
            let _s = log.span(&PushPhase::Format).entered();
            format_batch(Some(&batch), platform, cfg.item_cap)
        };
        reports.push(PlatformReport { platform, ok: true, items: Some(batch.items.len()), error: None });
        sections.push(text);
    }

    if sections.is_empty() {
        return Err(RunError::NoData);
    }

    let content = format::combine(&sections);
    log.info(format!("📝 {}热搜内容格式化完成", mode_label(cfg.mode)));

    let mut outcome = RunOutcome {
        mode: cfg.mode,
        item_cap: cfg.item_cap,
        platforms: reports,
        recipients: cfg.uids.len(),
        content,
        pushed: false,
        deliveries: Vec::new(),
        summary: String::new(),
    };

    if opts.dry_run {
        log.info("   Dry run, push skipped.");
        outcome.summarize();
        return Ok(outcome);
    }

    log.info("📤 开始推送...");
    let payload = PushPayload::markdown(cfg.uids.clone(), outcome.content.clone(), cfg.summary.clone());
    let receipt = notifier
        .push(&payload)
        .instrument(log.span_kv(&PushPhase::Notify, [("recipients", payload.uids.len().to_string())]))
        .await;
    let receipt = match receipt {
        Ok(r) => r,
        Err(err) => {
            log.warn_kv("❌ 推送失败", [("error", err.to_string())]);
            return Err(err.into());
        }
    };
    log.delivered(&receipt);

    outcome.pushed = true;
    outcome.deliveries = receipt.deliveries;
    outcome.summarize();
    Ok(outcome)
}
