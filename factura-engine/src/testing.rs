//! Scriptable in-memory backend for exercising sessions and the fallback
//! pipeline without a browser.
//!
//! Tests script the outcome of each launch in order, then assert against
//! [`MockStats`] (launch/close/open-page counters), the recorded launch
//! profiles, and the markup each page was asked to load.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use factura_core::RenderProfile;

use crate::backend::{EnginePage, RenderBackend};
use crate::error::{EngineError, Stage};

/// Where a scripted attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Launch,
    Content,
    Export,
}

/// How a scripted failure presents. Ignored for [`FailPoint::Launch`] —
/// launch failures are always [`EngineError::Launch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailKind {
    Timeout,
    Protocol,
}

/// Outcome script for one launch, consumed in order. Launches beyond the
/// end of the script succeed.
#[derive(Debug, Clone)]
pub enum AttemptScript {
    Succeed,
    Fail {
        point: FailPoint,
        kind: FailKind,
        message: String,
    },
}

impl AttemptScript {
    pub fn fail(point: FailPoint, kind: FailKind, message: &str) -> Self {
        AttemptScript::Fail {
            point,
            kind,
            message: message.to_string(),
        }
    }
}

/// Counters shared between the backend, its pages, and the test.
#[derive(Debug, Default)]
pub struct MockStats {
    launches: AtomicUsize,
    pages_opened: AtomicUsize,
    closes: AtomicUsize,
}

impl MockStats {
    /// `launch()` calls, including scripted launch failures.
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Distinct pages that have been closed.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Pages handed out and not yet closed. Zero after every `generate`
    /// call, or a handle leaked.
    pub fn open_pages(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst) - self.closes.load(Ordering::SeqCst)
    }
}

/// Scriptable [`RenderBackend`] double.
pub struct MockBackend {
    script: Mutex<VecDeque<AttemptScript>>,
    stats: Arc<MockStats>,
    launched_profiles: Mutex<Vec<RenderProfile>>,
    loaded_markup: Arc<Mutex<Vec<String>>>,
    pdf_bytes: Vec<u8>,
    fail_close: bool,
}

impl MockBackend {
    /// Every launch succeeds and exports a small placeholder document.
    pub fn succeeding() -> Self {
        Self::scripted(Vec::new())
    }

    /// Launches follow `script` in order; once drained, launches succeed.
    pub fn scripted(script: Vec<AttemptScript>) -> Self {
        MockBackend {
            script: Mutex::new(script.into()),
            stats: Arc::new(MockStats::default()),
            launched_profiles: Mutex::new(Vec::new()),
            loaded_markup: Arc::new(Mutex::new(Vec::new())),
            pdf_bytes: b"%PDF-1.7\n%mock factura document\n".to_vec(),
            fail_close: false,
        }
    }

    /// Replace the bytes successful exports return.
    pub fn with_pdf_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.pdf_bytes = bytes;
        self
    }

    /// Every page's `close` reports a failure (after still tearing down).
    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    /// Profiles passed to `launch`, in call order.
    pub fn launched_profiles(&self) -> Vec<RenderProfile> {
        self.launched_profiles.lock().expect("profiles lock").clone()
    }

    /// Markup handed to `set_content` across all pages, in call order.
    pub fn loaded_markup(&self) -> Vec<String> {
        self.loaded_markup.lock().expect("markup lock").clone()
    }
}

impl RenderBackend for MockBackend {
    fn launch(&self, profile: &RenderProfile) -> Result<Box<dyn EnginePage>, EngineError> {
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        self.launched_profiles
            .lock()
            .expect("profiles lock")
            .push(profile.clone());

        let script = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(AttemptScript::Succeed);

        let plan = match script {
            AttemptScript::Succeed => None,
            AttemptScript::Fail { point: FailPoint::Launch, message, .. } => {
                return Err(EngineError::Launch { message });
            }
            AttemptScript::Fail { point, kind, message } => Some((point, kind, message)),
        };

        self.stats.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPage {
            plan,
            stats: Arc::clone(&self.stats),
            loaded_markup: Arc::clone(&self.loaded_markup),
            pdf_bytes: self.pdf_bytes.clone(),
            fail_close: self.fail_close,
            closed: false,
        }))
    }
}

struct MockPage {
    plan: Option<(FailPoint, FailKind, String)>,
    stats: Arc<MockStats>,
    loaded_markup: Arc<Mutex<Vec<String>>>,
    pdf_bytes: Vec<u8>,
    fail_close: bool,
    closed: bool,
}

impl MockPage {
    fn scripted_error(&self, at: FailPoint, stage: Stage) -> Option<EngineError> {
        match &self.plan {
            Some((point, kind, message)) if *point == at => Some(match kind {
                FailKind::Timeout => EngineError::Timeout {
                    stage,
                    message: message.clone(),
                },
                FailKind::Protocol => EngineError::Protocol {
                    stage,
                    message: message.clone(),
                },
            }),
            _ => None,
        }
    }
}

impl EnginePage for MockPage {
    fn set_content(&mut self, markup: &str) -> Result<(), EngineError> {
        self.loaded_markup
            .lock()
            .expect("markup lock")
            .push(markup.to_string());
        if let Some(err) = self.scripted_error(FailPoint::Content, Stage::Navigate) {
            return Err(err);
        }
        Ok(())
    }

    fn export_pdf(&mut self) -> Result<Vec<u8>, EngineError> {
        if let Some(err) = self.scripted_error(FailPoint::Export, Stage::Render) {
            return Err(err);
        }
        Ok(self.pdf_bytes.clone())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        if !self.closed {
            self.closed = true;
            self.stats.closes.fetch_add(1, Ordering::SeqCst);
        }
        if self.fail_close {
            return Err(EngineError::Protocol {
                stage: Stage::Render,
                message: "target already closed".to_string(),
            });
        }
        Ok(())
    }
}
