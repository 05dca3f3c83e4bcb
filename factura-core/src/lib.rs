//! Factura core library — invoice domain types, render profiles, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and invoice domain structs
//! - [`profiles`] — render profile tables + YAML persistence
//! - [`error`] — [`CoreError`]

pub mod error;
pub mod profiles;
pub mod types;

pub use error::CoreError;
pub use profiles::{RenderProfile, RenderProfiles, ResourceClass};
pub use types::{
    BillingTotals, Contributor, InvoiceData, InvoiceNumber, PackageName, PaymentStatus,
    PostalAddress, SubscriptionTerms,
};
