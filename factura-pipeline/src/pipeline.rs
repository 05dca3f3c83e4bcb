//! The fallback orchestrator.
//!
//! ## Attempt order
//!
//! 1. Render full markup; open a session with the full profile; render.
//! 2. On success, return — the fallback is never invoked.
//! 3. On failure, record the failure, render degraded markup, and retry
//!    once with the degraded profile (tighter timeouts, scripts blocked).
//! 4. If that also fails, fail with both diagnostics aggregated.
//!
//! The fallback is a downgrade, not a retry: it trades visual fidelity for
//! a higher chance of the engine surviving the page lifecycle on
//! constrained hosts. Attempts are strictly sequential — the fallback
//! session is not opened until the primary session is closed, so one
//! `generate` call never holds more than one engine process.

use factura_core::types::InvoiceData;
use factura_core::{RenderProfile, RenderProfiles};
use factura_engine::{RenderBackend, RenderSession};
use factura_renderer::{Renderer, TemplateVariant};

use crate::attempt::{AttemptOutcome, AttemptReport, RenderFailure};
use crate::error::PipelineError;

/// Output of a successful `generate` call.
#[derive(Debug)]
pub struct GeneratedInvoice {
    /// The exported PDF.
    pub pdf: Vec<u8>,
    /// `invoice-<number>.pdf`.
    pub filename: String,
    /// One entry per attempt made, in order.
    pub attempts: Vec<AttemptReport>,
}

impl GeneratedInvoice {
    /// Whether the document came from the degraded fallback attempt.
    pub fn used_fallback(&self) -> bool {
        self.attempts.len() > 1
    }
}

/// Orchestrates template rendering and engine sessions for one invoice at a
/// time. Create once and reuse; each `generate` call is self-contained.
pub struct InvoicePipeline<'a> {
    renderer: Renderer,
    backend: &'a dyn RenderBackend,
    profiles: RenderProfiles,
}

impl<'a> InvoicePipeline<'a> {
    /// Build a pipeline with embedded templates.
    pub fn new(
        backend: &'a dyn RenderBackend,
        profiles: RenderProfiles,
    ) -> Result<Self, PipelineError> {
        Ok(InvoicePipeline {
            renderer: Renderer::new()?,
            backend,
            profiles,
        })
    }

    /// Build a pipeline around a caller-configured [`Renderer`] (e.g. with a
    /// user template override directory).
    pub fn with_renderer(
        renderer: Renderer,
        backend: &'a dyn RenderBackend,
        profiles: RenderProfiles,
    ) -> Self {
        InvoicePipeline {
            renderer,
            backend,
            profiles,
        }
    }

    /// Generate the PDF for `invoice`, falling back once on session failure.
    pub fn generate(&self, invoice: &InvoiceData) -> Result<GeneratedInvoice, PipelineError> {
        let filename = invoice.pdf_filename();
        let full_markup = self.renderer.render(invoice, TemplateVariant::Full)?;

        let primary = match self.attempt(&full_markup, &self.profiles.full) {
            Ok(pdf) => {
                tracing::debug!("primary render succeeded for {filename}");
                return Ok(GeneratedInvoice {
                    attempts: vec![AttemptReport {
                        variant: TemplateVariant::Full,
                        outcome: AttemptOutcome::Succeeded { bytes: pdf.len() },
                    }],
                    pdf,
                    filename,
                });
            }
            Err(failure) => failure,
        };

        tracing::warn!(
            "primary render failed for {filename} ({primary}); retrying with degraded profile"
        );
        let degraded_markup = self.renderer.render(invoice, TemplateVariant::Degraded)?;

        match self.attempt(&degraded_markup, &self.profiles.degraded) {
            Ok(pdf) => Ok(GeneratedInvoice {
                attempts: vec![
                    AttemptReport {
                        variant: TemplateVariant::Full,
                        outcome: AttemptOutcome::Failed(primary),
                    },
                    AttemptReport {
                        variant: TemplateVariant::Degraded,
                        outcome: AttemptOutcome::Succeeded { bytes: pdf.len() },
                    },
                ],
                pdf,
                filename,
            }),
            Err(fallback) => {
                tracing::warn!(
                    "fallback render also failed for {filename} ({fallback}); giving up"
                );
                Err(PipelineError::AllMethodsFailed { primary, fallback })
            }
        }
    }

    /// One isolated attempt: fresh session, render, close on every path.
    fn attempt(&self, markup: &str, profile: &RenderProfile) -> Result<Vec<u8>, RenderFailure> {
        let mut session = RenderSession::open(self.backend, profile.clone())
            .map_err(|e| RenderFailure::from_engine(&e))?;
        let result = session
            .render_to_binary(markup)
            .map_err(|e| RenderFailure::from_engine(&e));
        // The next attempt must not start while this session is live.
        session.close();
        result
    }
}
