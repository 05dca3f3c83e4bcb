//! Invoice domain types.
//!
//! One [`InvoiceData`] value is an immutable snapshot of everything needed to
//! render a single invoice. It is assembled by the billing layer, handed to
//! the pipeline, and never mutated. All types are serializable via serde —
//! the surrounding service delivers them as JSON.
//!
//! Monetary amounts are integer minor units (cents); [`format_minor`] turns
//! them into display strings for templates.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed invoice number (e.g. `"INV-2026-0042"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber(pub String);

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for InvoiceNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InvoiceNumber {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed subscription package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageName(pub String);

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Settlement state of the invoice at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Overdue => write!(f, "overdue"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Postal address of the contributor being billed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// Identity of the contributor the invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub email: String,
    pub address: PostalAddress,
}

/// The subscription being billed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTerms {
    pub package_name: PackageName,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub duration_months: u32,
    #[serde(default)]
    pub trial: bool,
}

/// Computed billing totals, in integer minor units of `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingTotals {
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
    /// ISO 4217 currency code, e.g. `"USD"`.
    pub currency: String,
    pub payment_status: PaymentStatus,
}

/// Immutable snapshot of everything needed to render one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceData {
    pub invoice_number: InvoiceNumber,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub contributor: Contributor,
    pub subscription: SubscriptionTerms,
    pub totals: BillingTotals,
}

impl InvoiceData {
    /// Filename for the exported PDF: `invoice-<number>.pdf`.
    pub fn pdf_filename(&self) -> String {
        format!("invoice-{}.pdf", self.invoice_number)
    }
}

// ---------------------------------------------------------------------------
// Money formatting
// ---------------------------------------------------------------------------

/// Format a minor-unit amount as `"<CODE> <grouped>.<cents>"`,
/// e.g. `format_minor(1234567, "USD")` → `"USD 12,345.67"`.
pub fn format_minor(amount: i64, currency: &str) -> String {
    let negative = amount < 0;
    let abs = amount.unsigned_abs();
    let units = abs / 100;
    let cents = abs % 100;

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{currency} {sign}{grouped}.{cents:02}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
