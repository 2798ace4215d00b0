use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Push;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Configure, Fetch, Format, Notify }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Configure => "configure",
        Phase::Fetch => "fetch",
        Phase::Format => "format",
        Phase::Notify => "notify",
    }}
    fn span(&self) -> Span { match self {
        Phase::Configure => info_span!("configure"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Format => info_span!("format"),
        Phase::Notify => info_span!("notify"),
    }}
}

impl OpMarker for Push {
    const NAME: &'static str = "push";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("push") }
}
