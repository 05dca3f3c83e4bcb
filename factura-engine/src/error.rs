//! Error types for factura-engine.

use std::fmt;

use thiserror::Error;

/// Render-attempt stage in which a session error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Launching the engine process and opening the page.
    Launch,
    /// Loading markup up to the document-ready signal.
    Navigate,
    /// Settling and exporting the binary document.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Launch => write!(f, "launch"),
            Stage::Navigate => write!(f, "navigate"),
            Stage::Render => write!(f, "render"),
        }
    }
}

/// All errors that can arise inside a render engine session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process failed to start or become ready within the
    /// startup timeout.
    #[error("engine launch failed: {message}")]
    Launch { message: String },

    /// A bounded wait elapsed during `stage`.
    #[error("render timed out during {stage}: {message}")]
    Timeout { stage: Stage, message: String },

    /// The engine process or page terminated unexpectedly mid-operation
    /// (e.g. target closed).
    #[error("engine protocol error during {stage}: {message}")]
    Protocol { stage: Stage, message: String },
}

impl EngineError {
    /// Stage the error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            EngineError::Launch { .. } => Stage::Launch,
            EngineError::Timeout { stage, .. } | EngineError::Protocol { stage, .. } => *stage,
        }
    }

    /// Underlying message, without the stage prefix.
    pub fn message(&self) -> &str {
        match self {
            EngineError::Launch { message }
            | EngineError::Timeout { message, .. }
            | EngineError::Protocol { message, .. } => message,
        }
    }

    /// Sort an opaque transport error into the taxonomy. The browser crate
    /// reports timeouts only through its message text, so that is the
    /// discriminator available here.
    pub(crate) fn classify(stage: Stage, message: String) -> EngineError {
        let lowered = message.to_lowercase();
        if lowered.contains("timed out") || lowered.contains("timeout") {
            EngineError::Timeout { stage, message }
        } else {
            EngineError::Protocol { stage, message }
        }
    }
}
