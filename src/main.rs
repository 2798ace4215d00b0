use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;

mod config;
mod format;
mod notify;
mod output;
mod pipeline;
mod platform;
mod telemetry;
mod trends;
mod util;

use config::{Overrides, RunConfig};
use notify::{WxPusherClient, WxPusherConfig};
use pipeline::{RunOptions, Stage};
use telemetry::ops::push::Phase as PushPhase;
use trends::{TianApiClient, TianApiConfig};

#[derive(Parser)]
#[command(name = "trend-pusher", about = "Push trending topics to WxPusher subscribers")]
struct Cli {
    /// all, weixin, weibo or douyin (overrides PUSH_MODE)
    mode: Option<String>,
    /// Items per platform (defaults: 20 single, 15 all)
    #[arg(long)]
    cap: Option<usize>,
    /// Fetch and format, print instead of pushing
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    output::set_json_mode(cli.json);
    telemetry::config::init_tracing();

    let log = telemetry::push();
    let cfg = {
        let _s = log.span(&PushPhase::Configure).entered();
        let overrides = Overrides { mode: cli.mode, cap: cli.cap };
        match RunConfig::from_env(&overrides) {
            Ok(cfg) => cfg,
            Err(err) => {
                log.error(format!("❌ [{}] {}", Stage::Configuring, err));
                return Err(err.into());
            }
        }
    };
    log.info(format!("🚀 启动热搜推送器，推送模式: {}", cfg.mode));

    let source = TianApiClient::new(TianApiConfig {
        base_url: cfg.tianapi_base_url.clone(),
        ..TianApiConfig::default()
    })?;
    let notifier = WxPusherClient::new(WxPusherConfig {
        base_url: cfg.wxpusher_base_url.clone(),
        timeout: cfg.push_timeout,
        ..WxPusherConfig::new(cfg.app_token.clone())
    })?;

    let opts = RunOptions { dry_run: cli.dry_run };
    match pipeline::run(&cfg, &source, &notifier, opts).await {
        Ok(outcome) => {
            if outcome.pushed {
                log.info("🎉 推送完成！");
                log.result(&outcome)?;
            } else {
                log.plan(&outcome)?;
            }
            Ok(())
        }
        Err(err) => {
            log.error(format!("❌ [{}] {}", err.stage(), err));
            log.error("❌ 推送失败！");
            Err(err.into())
        }
    }
}
