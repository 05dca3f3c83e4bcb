use chrono::NaiveDate;
use factura_core::types::{
    BillingTotals, Contributor, InvoiceData, InvoiceNumber, PackageName, PaymentStatus,
    PostalAddress, SubscriptionTerms,
};
use factura_renderer::{Renderer, TemplateVariant};
use tempfile::TempDir;

fn make_invoice() -> InvoiceData {
    InvoiceData {
        invoice_number: InvoiceNumber::from("INV-OVR-1"),
        issued_on: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        due_on: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
        contributor: Contributor {
            name: "Override Tester".to_string(),
            email: "tester@example.org".to_string(),
            address: PostalAddress {
                line1: "1 Test Row".to_string(),
                line2: None,
                city: "Testville".to_string(),
                region: None,
                postal_code: "0000".to_string(),
                country: "US".to_string(),
            },
        },
        subscription: SubscriptionTerms {
            package_name: PackageName::from("Bronze"),
            starts_on: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            duration_months: 1,
            trial: false,
        },
        totals: BillingTotals {
            subtotal_minor: 1_000,
            tax_minor: 0,
            total_minor: 1_000,
            currency: "USD".to_string(),
            payment_status: PaymentStatus::Pending,
        },
    }
}

#[test]
fn user_template_overrides_embedded_full_variant() {
    let dir = TempDir::new().expect("template dir");
    let invoice_dir = dir.path().join("invoice");
    std::fs::create_dir_all(&invoice_dir).expect("mkdir");
    std::fs::write(
        invoice_dir.join("full.html.tera"),
        "<html><body>CUSTOM {{ invoice_number }}</body></html>",
    )
    .expect("write override");

    let renderer = Renderer::with_template_dir(dir.path()).expect("renderer");
    let markup = renderer.render(&make_invoice(), TemplateVariant::Full).expect("render");
    assert!(markup.contains("CUSTOM INV-OVR-1"));
}

#[test]
fn override_leaves_other_variant_untouched() {
    let dir = TempDir::new().expect("template dir");
    let invoice_dir = dir.path().join("invoice");
    std::fs::create_dir_all(&invoice_dir).expect("mkdir");
    std::fs::write(
        invoice_dir.join("full.html.tera"),
        "<html><body>CUSTOM</body></html>",
    )
    .expect("write override");

    let renderer = Renderer::with_template_dir(dir.path()).expect("renderer");
    let degraded = renderer
        .render(&make_invoice(), TemplateVariant::Degraded)
        .expect("render degraded");
    assert!(degraded.contains("INV-OVR-1"), "embedded degraded template still renders");
    assert!(!degraded.contains("CUSTOM"));
}

#[test]
fn non_tera_files_are_ignored() {
    let dir = TempDir::new().expect("template dir");
    std::fs::write(dir.path().join("README.md"), "not a template").expect("write");

    let renderer = Renderer::with_template_dir(dir.path()).expect("renderer");
    let markup = renderer.render(&make_invoice(), TemplateVariant::Full).expect("render");
    assert!(markup.contains("INV-OVR-1"));
}

#[test]
fn missing_override_dir_falls_back_to_embedded() {
    let dir = TempDir::new().expect("template dir");
    let absent = dir.path().join("does-not-exist");

    let renderer = Renderer::with_template_dir(&absent).expect("renderer");
    let markup = renderer.render(&make_invoice(), TemplateVariant::Full).expect("render");
    assert!(markup.contains("INV-OVR-1"));
}
