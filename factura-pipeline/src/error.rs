//! Error types for factura-pipeline.

use thiserror::Error;

use factura_renderer::RenderError;

use crate::attempt::RenderFailure;

/// All errors that can escape a `generate` call.
///
/// Session-level engine errors never appear here directly: the orchestrator
/// records them as [`RenderFailure`]s and only surfaces the aggregate when
/// both attempts are exhausted.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Markup construction failed. Invalid input, not an engine fault, so
    /// no fallback can repair it.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Both the primary and the fallback attempt failed.
    #[error("all render methods failed; primary: {primary} | fallback: {fallback}")]
    AllMethodsFailed {
        primary: RenderFailure,
        fallback: RenderFailure,
    },
}
