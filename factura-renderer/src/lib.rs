//! # factura-renderer
//!
//! Tera-based template renderer that turns one [`InvoiceData`] snapshot into
//! a self-contained HTML document, in either the decorated `Full` variant or
//! the stripped-down `Degraded` variant the fallback path renders with.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use factura_renderer::{Renderer, TemplateVariant};
//! use factura_core::InvoiceData;
//!
//! fn render_both(invoice: &InvoiceData) {
//!     if let Ok(renderer) = Renderer::new() {
//!         for variant in TemplateVariant::all() {
//!             if let Ok(markup) = renderer.render(invoice, *variant) {
//!                 println!("{variant}: {} bytes", markup.len());
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! [`InvoiceData`]: factura_core::InvoiceData

pub mod context;
pub mod engine;
pub mod error;

pub use context::InvoiceContext;
pub use engine::{Renderer, TemplateEngine, TemplateVariant};
pub use error::RenderError;
