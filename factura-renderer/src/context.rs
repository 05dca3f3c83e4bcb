//! Invoice context — serializable rendering payload built from [`InvoiceData`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use factura_core::types::{format_minor, InvoiceData};

use crate::error::RenderError;

/// Rendering payload handed to the templates.
///
/// Everything is pre-formatted here so the templates stay display-only:
/// dates become `"01 Aug 2026"`, amounts become `"USD 1,440.00"`, the
/// address collapses to ordered lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceContext {
    pub invoice_number: String,
    pub issued_on: String,
    pub due_on: String,
    pub contributor: ContributorCtx,
    pub subscription: SubscriptionCtx,
    pub totals: TotalsCtx,
    pub meta: MetaCtx,
}

/// Contributor block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorCtx {
    pub name: String,
    pub email: String,
    pub address_lines: Vec<String>,
}

/// Subscription block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionCtx {
    pub package_name: String,
    pub starts_on: String,
    pub ends_on: String,
    pub duration_months: u32,
    pub trial: bool,
}

/// Billing totals block, amounts pre-formatted with currency code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsCtx {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub currency: String,
    pub payment_status: String,
}

/// Generator metadata shown in the document footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub generator_version: String,
}

fn display_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

fn require(value: &str, field: &'static str) -> Result<(), RenderError> {
    if value.trim().is_empty() {
        return Err(RenderError::MissingField { field });
    }
    Ok(())
}

impl InvoiceContext {
    /// Build an [`InvoiceContext`] from an [`InvoiceData`], running the
    /// presence checks the templates depend on.
    ///
    /// Business correctness of the fields is the billing layer's problem;
    /// only render-blocking absences fail here.
    pub fn from_invoice(invoice: &InvoiceData) -> Result<Self, RenderError> {
        require(&invoice.invoice_number.0, "invoice_number")?;
        require(&invoice.contributor.name, "contributor.name")?;
        require(&invoice.subscription.package_name.0, "subscription.package_name")?;
        require(&invoice.totals.currency, "totals.currency")?;

        let address = &invoice.contributor.address;
        let mut address_lines = vec![address.line1.clone()];
        if let Some(line2) = &address.line2 {
            address_lines.push(line2.clone());
        }
        let mut locality = address.city.clone();
        if let Some(region) = &address.region {
            locality.push_str(", ");
            locality.push_str(region);
        }
        address_lines.push(format!("{locality} {}", address.postal_code));
        address_lines.push(address.country.clone());

        let currency = &invoice.totals.currency;
        Ok(InvoiceContext {
            invoice_number: invoice.invoice_number.0.clone(),
            issued_on: display_date(invoice.issued_on),
            due_on: display_date(invoice.due_on),
            contributor: ContributorCtx {
                name: invoice.contributor.name.clone(),
                email: invoice.contributor.email.clone(),
                address_lines,
            },
            subscription: SubscriptionCtx {
                package_name: invoice.subscription.package_name.0.clone(),
                starts_on: display_date(invoice.subscription.starts_on),
                ends_on: display_date(invoice.subscription.ends_on),
                duration_months: invoice.subscription.duration_months,
                trial: invoice.subscription.trial,
            },
            totals: TotalsCtx {
                subtotal: format_minor(invoice.totals.subtotal_minor, currency),
                tax: format_minor(invoice.totals.tax_minor, currency),
                total: format_minor(invoice.totals.total_minor, currency),
                currency: currency.clone(),
                payment_status: invoice.totals.payment_status.to_string(),
            },
            meta: MetaCtx {
                generator_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
