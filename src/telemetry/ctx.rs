use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{info, warn, error, Span};

use crate::notify::PushReceipt;
use crate::output;
use crate::platform::PlatformKind;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn error(&self, msg: impl AsRef<str>) { if self.json { error!(op = %self.op_name(), "{}", msg.as_ref()); } else { error!("{}", msg.as_ref()); } }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{}", msg); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { output::emit_plan(self.op_name(), plan) }
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { output::emit_result(self.op_name(), result) }
}

impl LogCtx<crate::telemetry::ops::push::Push> {
    pub fn platform_ok(&self, platform: PlatformKind, items: usize) {
        if self.json { info!(op = %self.op_name(), platform = %platform, items, "platform_ok"); }
        else { info!("✅ {}热搜获取成功 ({} 条)", platform.display_name(), items); }
    }

    pub fn platform_failed(&self, platform: PlatformKind, err: &dyn std::fmt::Display) {
        if self.json { warn!(op = %self.op_name(), platform = %platform, error = %err, "platform_failed"); }
        else { warn!("❌ {}热搜获取失败: {}", platform.display_name(), err); }
    }

    pub fn delivered(&self, receipt: &PushReceipt) {
        if self.json {
            info!(op = %self.op_name(), msg = %receipt.msg, recipients = receipt.deliveries.len(), "pushed");
        } else {
            info!("✅ 推送成功: {}", receipt.msg);
        }
        for d in &receipt.deliveries {
            let uid = d.uid.as_deref().unwrap_or("-");
            let status = d.status.as_deref().unwrap_or("");
            info!(uid, message_id = ?d.message_id, code = ?d.code, status, "delivery");
        }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_details_are_space_joined() {
        let s = kv_to_string([("mode", "all".to_string()), ("cap", "15".to_string())]);
        assert_eq!(s, "mode=all cap=15");
        assert_eq!(kv_to_string(Vec::<(&str, String)>::new()), "");
    }
}
