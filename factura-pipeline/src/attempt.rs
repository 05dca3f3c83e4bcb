//! Per-attempt diagnostics and instrumentation.

use std::fmt;

use factura_engine::{EngineError, Stage};
use factura_renderer::TemplateVariant;

/// Diagnostic for one failed render attempt: the stage that broke and the
/// underlying message.
#[derive(Debug, Clone)]
pub struct RenderFailure {
    pub stage: Stage,
    pub message: String,
}

impl RenderFailure {
    pub(crate) fn from_engine(err: &EngineError) -> Self {
        RenderFailure {
            stage: err.stage(),
            message: err.message().to_string(),
        }
    }
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.message)
    }
}

/// How one attempt ended.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Succeeded { bytes: usize },
    Failed(RenderFailure),
}

/// Record of one attempt: which markup variant it rendered and how it went.
///
/// `generate` returns these alongside the document, so callers and tests can
/// see whether the fallback ran without instrumenting the engine.
#[derive(Debug, Clone)]
pub struct AttemptReport {
    pub variant: TemplateVariant,
    pub outcome: AttemptOutcome,
}

impl AttemptReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Succeeded { .. })
    }
}
