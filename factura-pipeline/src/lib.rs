//! # factura-pipeline
//!
//! Fallback orchestrator for invoice PDF generation.
//!
//! Call [`InvoicePipeline::generate`] with one [`InvoiceData`] snapshot: it
//! renders the full markup, attempts a primary render session, and on any
//! session failure retries once with degraded markup and a degraded engine
//! profile. The caller sees either a [`GeneratedInvoice`] or one aggregated
//! [`PipelineError::AllMethodsFailed`].
//!
//! [`InvoiceData`]: factura_core::InvoiceData

pub mod attempt;
pub mod envelope;
pub mod error;
pub mod pipeline;

pub use attempt::{AttemptOutcome, AttemptReport, RenderFailure};
pub use envelope::{GeneratePayload, GenerateResponse};
pub use error::PipelineError;
pub use pipeline::{GeneratedInvoice, InvoicePipeline};
