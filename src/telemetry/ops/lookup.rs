use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Lookup;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Search, FetchDetail, Extract, Ownership, Render, Clipboard }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Search => "search",
        Phase::FetchDetail => "fetch_detail",
        Phase::Extract => "extract",
        Phase::Ownership => "ownership",
        Phase::Render => "render",
        Phase::Clipboard => "clipboard",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Search => info_span!("search"),
        Phase::FetchDetail => info_span!("fetch_detail"),
        Phase::Extract => info_span!("extract"),
        Phase::Ownership => info_span!("ownership"),
        Phase::Render => info_span!("render"),
        Phase::Clipboard => info_span!("clipboard"),
    }}
}

impl OpMarker for Lookup {
    const NAME: &'static str = "lookup";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("lookup") }
}
