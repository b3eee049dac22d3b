//! End-to-end engine tests over the in-memory backend: the
//! preview/commit split, idempotent replay, number resolution and the
//! degraded-logo path.

use billing_engine::engine::{Engine, EngineOutput};
use billing_engine::error::EngineError;
use billing_engine::model::{Customer, DocumentKind, DocumentMeta, DocumentRequest, Position};
use billing_engine::store::{BillingProfile, DocumentStore, MemoryStore};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn profile() -> BillingProfile {
    BillingProfile {
        company_name: "Northlight Consulting".to_string(),
        address_lines: vec!["Harbor Street 4".to_string(), "20095 Hamburg".to_string()],
        account_holder: "Northlight Consulting".to_string(),
        bank_name: "Hanseatic Bank".to_string(),
        iban: "DE02 1203 0000 0000 2020 51".to_string(),
        bic: "BYLADEM1001".to_string(),
        phone: "+49 40 555 0199".to_string(),
        email: "billing@northlight.example".to_string(),
    }
}

fn engine(store: &MemoryStore) -> Engine<'_> {
    Engine::new(profile(), store, store, store, store, store)
}

fn store_with_template() -> MemoryStore {
    let store = MemoryStore::new();
    store.put_template("default", b"{}".to_vec());
    store
}

fn request(kind: DocumentKind, commit: bool, key: Option<&str>) -> DocumentRequest {
    DocumentRequest {
        kind,
        customer: Customer {
            company: Some("Acme GmbH".to_string()),
            street: Some("Main Road".to_string()),
            house_number: Some("12".to_string()),
            postal_code: Some("10115".to_string()),
            city: Some("Berlin".to_string()),
            ..Customer::default()
        },
        meta: DocumentMeta {
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2026, 4, 13),
            due_date: NaiveDate::from_ymd_opt(2026, 4, 13),
            title: "Consulting services".to_string(),
            intro: "As agreed.".to_string(),
            tax_rate: dec!(19),
            template_ref: "default".to_string(),
            document_id: None,
            commit,
            discount: None,
            idempotency_key: key.map(|k| k.to_string()),
            pre_assigned_number: None,
        },
        positions: vec![Position::Item {
            description: "Architecture review".to_string(),
            quantity: dec!(10),
            unit_price: dec!(120),
            unit: "h".to_string(),
        }],
    }
}

#[test]
fn preview_renders_pdf_without_persisting_anything() {
    let store = store_with_template();
    let engine = engine(&store);
    let out = engine.render_preview(&request(DocumentKind::Invoice, false, None)).unwrap();

    assert!(out.pdf.starts_with(b"%PDF-"));
    assert_eq!(out.number, "");
    assert_eq!(out.pages, 1);
    assert_eq!(out.totals.gross_total, dec!(1428.00));
    assert_eq!(store.document_count(), 0);
}

#[test]
fn commit_allocates_a_number_and_uploads_the_pdf() {
    let store = store_with_template();
    let engine = engine(&store);
    let out = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, Some("inv-1")))
        .unwrap();

    assert_eq!(out.number, "RE-0001");
    assert!(!out.replayed);
    assert_eq!(out.filename, "acme-gmbh-RE-0001.pdf");
    assert_eq!(out.pdf_path, "invoices/acme-gmbh-RE-0001.pdf");
    assert!(store.object(&out.pdf_path).is_some_and(|b| b.starts_with(b"%PDF-")));

    let stored = store.find(out.document_id).unwrap().unwrap();
    assert_eq!(stored.number, "RE-0001");
    assert_eq!(stored.customer_name, "Acme GmbH");
    assert_eq!(stored.gross_total, dec!(1428.00));
    assert_eq!(stored.pdf_path.as_deref(), Some("invoices/acme-gmbh-RE-0001.pdf"));
}

#[test]
fn replaying_the_same_idempotency_key_reuses_the_number() {
    let store = store_with_template();
    let engine = engine(&store);
    let first = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, Some("inv-2")))
        .unwrap();
    let second = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, Some("inv-2")))
        .unwrap();

    assert_eq!(first.number, second.number);
    assert_eq!(first.document_id, second.document_id);
    assert!(second.replayed);
    assert_eq!(store.document_count(), 1);

    let third = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, Some("inv-3")))
        .unwrap();
    assert_eq!(third.number, "RE-0002");
}

#[test]
fn offers_and_invoices_number_independently() {
    let store = store_with_template();
    let engine = engine(&store);
    let offer = engine
        .render_and_commit(&request(DocumentKind::Offer, true, Some("off-1")))
        .unwrap();
    let invoice = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, Some("inv-4")))
        .unwrap();
    assert_eq!(offer.number, "AN-0001");
    assert_eq!(invoice.number, "RE-0001");
}

#[test]
fn committing_without_an_idempotency_key_is_rejected() {
    let store = store_with_template();
    let engine = engine(&store);
    let err = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, None))
        .unwrap_err();
    assert!(matches!(err, EngineError::MissingIdempotencyKey));
    assert_eq!(store.document_count(), 0);
}

#[test]
fn updating_an_existing_document_keeps_its_number() {
    let store = store_with_template();
    let engine = engine(&store);
    let first = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, Some("inv-5")))
        .unwrap();

    let mut update = request(DocumentKind::Invoice, true, None);
    update.meta.document_id = Some(first.document_id);
    update.positions = vec![Position::Item {
        description: "Architecture review, extended".to_string(),
        quantity: dec!(12),
        unit_price: dec!(120),
        unit: "h".to_string(),
    }];
    let second = engine.render_and_commit(&update).unwrap();

    assert_eq!(second.number, first.number);
    assert_eq!(second.document_id, first.document_id);
    assert_eq!(store.document_count(), 1);
    let stored = store.find(first.document_id).unwrap().unwrap();
    assert_eq!(stored.gross_total, dec!(1713.60));
}

#[test]
fn updating_an_unknown_document_is_rejected() {
    let store = store_with_template();
    let engine = engine(&store);
    let mut req = request(DocumentKind::Invoice, true, None);
    req.meta.document_id = Some(uuid::Uuid::new_v4());
    assert!(matches!(
        engine.render_and_commit(&req),
        Err(EngineError::UnknownDocument(_))
    ));
}

#[test]
fn pre_assigned_numbers_are_used_verbatim() {
    let store = store_with_template();
    let engine = engine(&store);
    let mut req = request(DocumentKind::Invoice, true, None);
    req.meta.pre_assigned_number = Some("RE-2026-99".to_string());
    let out = engine.render_and_commit(&req).unwrap();
    assert_eq!(out.number, "RE-2026-99");

    // The counter was not consumed.
    let next = engine
        .render_and_commit(&request(DocumentKind::Invoice, true, Some("inv-6")))
        .unwrap();
    assert_eq!(next.number, "RE-0001");
}

#[test]
fn retried_pre_assigned_commit_lands_on_the_first_record() {
    let store = store_with_template();
    let engine = engine(&store);
    let mut req = request(DocumentKind::Invoice, true, Some("inv-legacy"));
    req.meta.pre_assigned_number = Some("RE-2026-07".to_string());

    let first = engine.render_and_commit(&req).unwrap();
    let second = engine.render_and_commit(&req).unwrap();

    assert_eq!(second.document_id, first.document_id);
    assert_eq!(second.number, "RE-2026-07");
    assert!(second.replayed);
    assert_eq!(store.document_count(), 1);
}

#[test]
fn preview_reports_the_pre_assigned_number() {
    let store = store_with_template();
    let engine = engine(&store);
    let mut req = request(DocumentKind::Invoice, false, None);
    req.meta.pre_assigned_number = Some("RE-2026-42".to_string());
    let out = engine.render_preview(&req).unwrap();
    assert_eq!(out.number, "RE-2026-42");
    assert_eq!(store.document_count(), 0);
}

#[test]
fn unconfigured_billing_profile_is_rejected() {
    let store = store_with_template();
    let mut profile = profile();
    profile.iban = String::new();
    let engine = Engine::new(profile, &store, &store, &store, &store, &store);
    assert!(matches!(
        engine.render_preview(&request(DocumentKind::Invoice, false, None)),
        Err(EngineError::MissingBillingProfile)
    ));
}

#[test]
fn missing_template_aborts_before_rendering() {
    let store = MemoryStore::new();
    let engine = engine(&store);
    assert!(matches!(
        engine.render_preview(&request(DocumentKind::Offer, false, None)),
        Err(EngineError::MissingTemplate(_))
    ));
}

#[test]
fn malformed_template_reports_the_reference() {
    let store = MemoryStore::new();
    store.put_template("default", b"not json".to_vec());
    let engine = engine(&store);
    match engine.render_preview(&request(DocumentKind::Offer, false, None)) {
        Err(EngineError::MalformedTemplate { reference, .. }) => assert_eq!(reference, "default"),
        other => panic!("expected malformed template error, got {other:?}"),
    }
}

#[test]
fn missing_logo_degrades_to_rendering_without_it() {
    let store = MemoryStore::new();
    store.put_template("default", br#"{"logo_ref": "logo-1"}"#.to_vec());
    let engine = engine(&store);
    let out = engine.render_preview(&request(DocumentKind::Invoice, false, None)).unwrap();
    assert!(out.pdf.starts_with(b"%PDF-"));
}

#[test]
fn process_routes_on_the_commit_flag() {
    let store = store_with_template();
    let engine = engine(&store);
    match engine.process(&request(DocumentKind::Offer, false, None)).unwrap() {
        EngineOutput::Preview(out) => assert_eq!(out.number, ""),
        EngineOutput::Committed(_) => panic!("preview request was committed"),
    }
    match engine.process(&request(DocumentKind::Offer, true, Some("off-2"))).unwrap() {
        EngineOutput::Committed(out) => assert_eq!(out.number, "AN-0001"),
        EngineOutput::Preview(_) => panic!("commit request was previewed"),
    }
}

#[test]
fn customer_number_appears_in_the_filename() {
    let store = store_with_template();
    let engine = engine(&store);
    let mut req = request(DocumentKind::Offer, true, Some("off-3"));
    req.customer.customer_number = Some("K-17".to_string());
    let out = engine.render_and_commit(&req).unwrap();
    assert_eq!(out.filename, "acme-gmbh-K-17-AN-0001.pdf");
    assert_eq!(out.pdf_path, "offers/acme-gmbh-K-17-AN-0001.pdf");
}
