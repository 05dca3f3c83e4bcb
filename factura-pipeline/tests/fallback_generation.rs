use chrono::NaiveDate;
use factura_core::types::{
    BillingTotals, Contributor, InvoiceData, InvoiceNumber, PackageName, PaymentStatus,
    PostalAddress, SubscriptionTerms,
};
use factura_core::{RenderProfiles, ResourceClass};
use factura_engine::testing::{AttemptScript, FailKind, FailPoint, MockBackend};
use factura_pipeline::{GenerateResponse, InvoicePipeline, PipelineError};
use factura_renderer::TemplateVariant;

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

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Profiles with zero settle delay so tests stay instant.
fn fast_profiles() -> RenderProfiles {
    let mut profiles = RenderProfiles::default();
    profiles.full.settle_delay_ms = 0;
    profiles.degraded.settle_delay_ms = 0;
    profiles
}

#[test]
fn primary_success_never_invokes_fallback() {
    let backend = MockBackend::succeeding();
    let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();

    let invoice = pipeline.generate(&make_invoice("INV-100")).expect("generate");

    assert_eq!(invoice.attempts.len(), 1, "exactly one attempt on success");
    assert!(!invoice.used_fallback());
    assert_eq!(invoice.attempts[0].variant, TemplateVariant::Full);
    assert_eq!(backend.stats().launches(), 1, "fallback must not launch a session");
    assert_eq!(invoice.filename, "invoice-INV-100.pdf");
}

#[test]
fn primary_failure_triggers_exactly_one_degraded_attempt() {
    init_logs();
    let backend = MockBackend::scripted(vec![AttemptScript::fail(
        FailPoint::Export,
        FailKind::Protocol,
        "Target closed",
    )]);
    let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();

    let invoice = pipeline.generate(&make_invoice("INV-200")).expect("fallback succeeds");

    assert!(invoice.used_fallback());
    assert_eq!(invoice.attempts.len(), 2);
    assert!(!invoice.attempts[0].succeeded());
    assert!(invoice.attempts[1].succeeded());
    assert_eq!(invoice.attempts[1].variant, TemplateVariant::Degraded);

    // The fallback session ran with the degraded profile, scripts blocked.
    let profiles = backend.launched_profiles();
    assert_eq!(profiles.len(), 2);
    assert!(!profiles[0].blocks(ResourceClass::Script));
    assert!(profiles[1].blocks(ResourceClass::Script));

    // And with degraded markup, not the original.
    let markup = backend.loaded_markup();
    assert_eq!(markup.len(), 2);
    assert_ne!(markup[0], markup[1]);
    assert!(markup[0].contains("band"), "primary attempt loads the full variant");
    assert!(!markup[1].contains("band"), "fallback attempt loads the degraded variant");
}

#[test]
fn target_closed_at_export_then_fallback_success_envelope() {
    let backend = MockBackend::scripted(vec![AttemptScript::fail(
        FailPoint::Export,
        FailKind::Protocol,
        "Target closed",
    )]);
    let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();

    let outcome = pipeline.generate(&make_invoice("INV-300"));
    let envelope = GenerateResponse::from_outcome(&outcome);
    let json = serde_json::to_value(&envelope).expect("serialize");

    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["filename"], "invoice-INV-300.pdf");
    assert!(
        json["data"]["binaryContent"].as_str().is_some_and(|s| !s.is_empty()),
        "binary content must be present and non-empty"
    );
}

#[test]
fn both_attempts_failing_aggregates_both_stages() {
    init_logs();
    let backend = MockBackend::scripted(vec![
        AttemptScript::fail(FailPoint::Launch, FailKind::Protocol, "chrome spawn refused"),
        AttemptScript::fail(FailPoint::Content, FailKind::Timeout, "ready signal never fired"),
    ]);
    let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();

    let err = pipeline
        .generate(&make_invoice("INV-400"))
        .expect_err("both attempts fail");

    let message = err.to_string();
    assert!(message.contains("primary: launch: chrome spawn refused"), "{message}");
    assert!(
        message.contains("fallback: navigate: ready signal never fired"),
        "{message}"
    );
    assert!(matches!(err, PipelineError::AllMethodsFailed { .. }));
}

#[test]
fn every_session_is_closed_whatever_the_failure_point() {
    for (point, kind) in [
        (FailPoint::Launch, FailKind::Protocol),
        (FailPoint::Content, FailKind::Timeout),
        (FailPoint::Export, FailKind::Protocol),
    ] {
        let backend = MockBackend::scripted(vec![AttemptScript::fail(point, kind, "boom")]);
        let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();
        let _ = pipeline.generate(&make_invoice("INV-500"));

        assert_eq!(
            backend.stats().open_pages(),
            0,
            "leaked page after failure at {point:?}"
        );
    }
}

#[test]
fn no_session_leaks_when_both_attempts_fail() {
    let backend = MockBackend::scripted(vec![
        AttemptScript::fail(FailPoint::Export, FailKind::Timeout, "export stalled"),
        AttemptScript::fail(FailPoint::Export, FailKind::Timeout, "export stalled again"),
    ]);
    let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();
    let _ = pipeline.generate(&make_invoice("INV-600"));

    assert_eq!(backend.stats().launches(), 2);
    assert_eq!(backend.stats().open_pages(), 0);
}

#[test]
fn close_failure_does_not_flip_a_successful_attempt() {
    let backend = MockBackend::succeeding().with_failing_close();
    let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();

    let invoice = pipeline
        .generate(&make_invoice("INV-700"))
        .expect("cleanup failure must not fail the render");
    assert!(!invoice.used_fallback());
    assert!(!invoice.pdf.is_empty());
}

#[test]
fn invalid_input_fails_before_any_session_opens() {
    let backend = MockBackend::succeeding();
    let pipeline = InvoicePipeline::new(&backend, fast_profiles()).unwrap();

    let mut bad = make_invoice("INV-800");
    bad.contributor.name = String::new();
    let err = pipeline.generate(&bad).expect_err("missing field must fail");

    assert!(matches!(err, PipelineError::Render(_)));
    assert_eq!(backend.stats().launches(), 0, "no engine session for invalid input");
}
