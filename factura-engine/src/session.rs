//! Render session — one attempt's exclusive ownership of an engine page.
//!
//! Lifecycle: `Unopened → Launching → Ready → Rendering → (Succeeded |
//! Failed) → Closed`. The first two states precede construction (a
//! [`RenderSession`] value only exists once the backend's launch returned),
//! the rest are tracked on the value. `Closed` is terminal and reachable
//! from every state: [`RenderSession::close`] runs on explicit calls and,
//! through `Drop`, on every unwind path.

use factura_core::RenderProfile;

use crate::backend::{EnginePage, RenderBackend};
use crate::error::{EngineError, Stage};

/// Observable state of a launched session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Launched, no render started yet.
    Ready,
    /// A `render_to_binary` call is in flight.
    Rendering,
    /// The render produced a document.
    Succeeded,
    /// The render failed; the session is spent.
    Failed,
    /// Torn down. Terminal.
    Closed,
}

/// A live render-engine process + page, exclusively owned by one attempt.
///
/// Sessions are never reused across attempts — a failed attempt may leave
/// the page in a corrupted state, so the fallback gets a fresh process.
pub struct RenderSession {
    page: Option<Box<dyn EnginePage>>,
    profile: RenderProfile,
    state: SessionState,
}

impl RenderSession {
    /// Launch a fresh engine process and page for one attempt.
    ///
    /// Fails with [`EngineError::Launch`] if the process does not become
    /// ready within the profile's launch timeout.
    pub fn open(
        backend: &dyn RenderBackend,
        profile: RenderProfile,
    ) -> Result<Self, EngineError> {
        tracing::debug!(
            launch_timeout_ms = profile.launch_timeout_ms,
            blocked = profile.blocked.len(),
            "launching render session"
        );
        let page = backend.launch(&profile)?;
        Ok(RenderSession {
            page: Some(page),
            profile,
            state: SessionState::Ready,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    /// Load `markup`, wait out the settle delay, and export the document.
    ///
    /// One shot per session: a second call fails without touching the page.
    pub fn render_to_binary(&mut self, markup: &str) -> Result<Vec<u8>, EngineError> {
        if self.state != SessionState::Ready {
            return Err(EngineError::Protocol {
                stage: Stage::Render,
                message: format!("session is {:?}, expected Ready", self.state),
            });
        }
        self.state = SessionState::Rendering;
        match self.try_render(markup) {
            Ok(bytes) => {
                self.state = SessionState::Succeeded;
                tracing::debug!(bytes = bytes.len(), "render session produced document");
                Ok(bytes)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    fn try_render(&mut self, markup: &str) -> Result<Vec<u8>, EngineError> {
        let settle = self.profile.settle_delay();
        let page = self.page.as_mut().ok_or_else(|| EngineError::Protocol {
            stage: Stage::Navigate,
            message: "session has no page".to_string(),
        })?;
        page.set_content(markup)?;
        // The ready-state signal does not cover asynchronous layout; the
        // profile's settle delay bridges that gap before export.
        std::thread::sleep(settle);
        let bytes = page.export_pdf()?;
        if bytes.is_empty() {
            return Err(EngineError::Protocol {
                stage: Stage::Render,
                message: "engine returned an empty document".to_string(),
            });
        }
        Ok(bytes)
    }

    /// Idempotent, best-effort teardown: page first, then process.
    ///
    /// Close failures are logged and swallowed — cleanup must never mask or
    /// override the outcome of the attempt it follows.
    pub fn close(&mut self) {
        if let Some(mut page) = self.page.take() {
            if let Err(e) = page.close() {
                tracing::warn!("render session close failed (ignored): {e}");
            }
        }
        self.state = SessionState::Closed;
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
