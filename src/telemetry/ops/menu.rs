use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Menu;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Select, Prompt, Lookup }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Select => "select", Phase::Prompt => "prompt", Phase::Lookup => "lookup" } }
    fn span(&self) -> Span { match self { Phase::Select => info_span!("select"), Phase::Prompt => info_span!("prompt"), Phase::Lookup => info_span!("lookup") } }
}

impl OpMarker for Menu {
    const NAME: &'static str = "menu";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("menu") }
}
