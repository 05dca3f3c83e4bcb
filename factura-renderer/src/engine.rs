//! Tera rendering engine — [`TemplateVariant`] enum and [`Renderer`].
//!
//! # Variants
//!
//! | Variant    | Template                     | Intent                                          |
//! |------------|------------------------------|-------------------------------------------------|
//! | `Full`     | `invoice/full.html.tera`     | Complete styling and decorative structure       |
//! | `Degraded` | `invoice/degraded.html.tera` | Minimal inline styling, shorter content, no external references — smallest surface for a struggling engine |
//!
//! Both variants produce a single self-contained HTML document; nothing in
//! either references an external stylesheet, font, or script URL.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tera::Tera;

use factura_core::types::InvoiceData;

use crate::context::InvoiceContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates — baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("shared/_parties.tera", include_str!("templates/_partials/parties.tera")),
    ("shared/_totals.tera", include_str!("templates/_partials/totals.tera")),
    ("invoice/full.html.tera", include_str!("templates/invoice_full.html.tera")),
    (
        "invoice/degraded.html.tera",
        include_str!("templates/invoice_degraded.html.tera"),
    ),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path
            .strip_prefix(dir)
            .unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateVariant
// ---------------------------------------------------------------------------

/// Which rendition of the invoice document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateVariant {
    Full,
    Degraded,
}

impl TemplateVariant {
    /// Both variants in fallback order.
    pub fn all() -> &'static [TemplateVariant] {
        &[TemplateVariant::Full, TemplateVariant::Degraded]
    }

    /// Template name to render for this variant.
    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateVariant::Full => "invoice/full.html.tera",
            TemplateVariant::Degraded => "invoice/degraded.html.tera",
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateVariant::Full => write!(f, "full"),
            TemplateVariant::Degraded => write!(f, "degraded"),
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering invoice markup with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded
/// defaults (operators reskin invoices without rebuilding). Template names
/// are normalised to lowercase relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`], loading embedded templates plus any
    /// overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the markup for `variant` using the supplied context.
    pub fn render(
        &self,
        ctx: &InvoiceContext,
        variant: TemplateVariant,
    ) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let markup = self.tera.render(variant.template_name(), &tera_ctx)?;
        Ok(markup)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based renderer for both invoice variants.
///
/// Create once with [`Renderer::new`] and reuse; rendering is pure and
/// synchronous, so one instance serves any number of invoices.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Construct a new [`Renderer`] with embedded templates.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(None)? })
    }

    /// Construct a [`Renderer`] whose templates may be overridden by `.tera`
    /// files under `dir`.
    pub fn with_template_dir(dir: &Path) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(Some(dir))? })
    }

    /// Render `invoice` as the given `variant`.
    ///
    /// Runs the presence checks first — an invoice missing a render-blocking
    /// field fails with [`RenderError::MissingField`] before tera is invoked.
    pub fn render(
        &self,
        invoice: &InvoiceData,
        variant: TemplateVariant,
    ) -> Result<String, RenderError> {
        let ctx = InvoiceContext::from_invoice(invoice)?;
        self.render_with_context(&ctx, variant)
    }

    /// Render using a caller-provided [`InvoiceContext`].
    pub fn render_with_context(
        &self,
        ctx: &InvoiceContext,
        variant: TemplateVariant,
    ) -> Result<String, RenderError> {
        self.engine.render(ctx, variant)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use factura_core::types::{
        BillingTotals, Contributor, InvoiceData, InvoiceNumber, PackageName, PaymentStatus,
        PostalAddress, SubscriptionTerms,
    };

    use super::*;

    fn make_invoice(number: &str) -> InvoiceData {
        InvoiceData {
            invoice_number: InvoiceNumber::from(number),
            issued_on: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            due_on: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
            contributor: Contributor {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.org".to_string(),
                address: PostalAddress {
                    line1: "12 Analytical Way".to_string(),
                    line2: None,
                    city: "London".to_string(),
                    region: None,
                    postal_code: "EC1A 1BB".to_string(),
                    country: "GB".to_string(),
                },
            },
            subscription: SubscriptionTerms {
                package_name: PackageName::from("Gold Annual"),
                starts_on: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                ends_on: NaiveDate::from_ymd_opt(2027, 7, 31).unwrap(),
                duration_months: 12,
                trial: false,
            },
            totals: BillingTotals {
                subtotal_minor: 120_000,
                tax_minor: 24_000,
                total_minor: 144_000,
                currency: "USD".to_string(),
                payment_status: PaymentStatus::Pending,
            },
        }
    }

    #[test]
    fn renderer_new_succeeds() {
        Renderer::new().expect("Renderer::new should succeed with embedded templates");
    }

    #[test]
    fn both_variants_render_and_contain_invoice_number() {
        let renderer = Renderer::new().unwrap();
        let invoice = make_invoice("INV-42");
        for variant in TemplateVariant::all() {
            let markup = renderer
                .render(&invoice, *variant)
                .unwrap_or_else(|e| panic!("render failed for {variant}: {e}"));
            assert!(
                markup.contains("INV-42"),
                "rendered {variant} markup should contain the invoice number"
            );
        }
    }

    #[test]
    fn markup_is_self_contained() {
        let renderer = Renderer::new().unwrap();
        let invoice = make_invoice("INV-SC");
        for variant in TemplateVariant::all() {
            let markup = renderer.render(&invoice, *variant).unwrap();
            assert!(!markup.contains("<link"), "{variant} must not reference stylesheets");
            assert!(!markup.contains("<script"), "{variant} must not embed scripts");
            assert!(!markup.contains("http://"), "{variant} must not fetch remote resources");
            assert!(!markup.contains("https://"), "{variant} must not fetch remote resources");
        }
    }

    #[test]
    fn degraded_markup_is_shorter_and_plainer() {
        let renderer = Renderer::new().unwrap();
        let invoice = make_invoice("INV-DG");
        let full = renderer.render(&invoice, TemplateVariant::Full).unwrap();
        let degraded = renderer.render(&invoice, TemplateVariant::Degraded).unwrap();
        assert!(degraded.len() < full.len());
        assert!(!degraded.contains("@page"), "degraded styling stays minimal");
    }

    #[test]
    fn missing_field_fails_before_tera() {
        let renderer = Renderer::new().unwrap();
        let mut invoice = make_invoice("INV-MF");
        invoice.totals.currency = String::new();
        let err = renderer
            .render(&invoice, TemplateVariant::Full)
            .expect_err("empty currency must fail");
        assert!(matches!(err, RenderError::MissingField { field: "totals.currency" }));
    }

    #[test]
    fn template_name_maps_per_variant() {
        assert_eq!(TemplateVariant::Full.template_name(), "invoice/full.html.tera");
        assert_eq!(
            TemplateVariant::Degraded.template_name(),
            "invoice/degraded.html.tera"
        );
    }
}
