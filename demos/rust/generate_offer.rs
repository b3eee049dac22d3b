/// Offer demo — preview first, then commit the same request.
///
/// Shows the preview/commit duality: the preview stamps a placeholder
/// and touches no counter; the commit takes AN-0001 and uploads.
///
/// Run with:
///   cargo run --example generate_offer -p billing-demos
///
/// Opens output at: demos/output/offer-preview.pdf and demos/output/offer.pdf
use billing_engine::{
    BillingProfile, Customer, DocumentKind, DocumentMeta, DocumentRequest, Engine, MemoryStore,
    Position,
};
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

fn request(commit: bool) -> DocumentRequest {
    DocumentRequest {
        kind: DocumentKind::Offer,
        customer: Customer {
            first_name: Some("Jo".to_string()),
            last_name: Some("Lindqvist".to_string()),
            street: Some("Ringbahnstr.".to_string()),
            house_number: Some("8".to_string()),
            postal_code: Some("12099".to_string()),
            city: Some("Berlin".to_string()),
            ..Customer::default()
        },
        meta: DocumentMeta {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            valid_until: Some(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()),
            due_date: None,
            title: "Offer: shop relaunch".to_string(),
            intro: "Thank you for the kind conversation. We are pleased to offer the \
                    following services."
                .to_string(),
            tax_rate: dec!(19),
            template_ref: "default".to_string(),
            document_id: None,
            commit,
            discount: None,
            idempotency_key: Some("demo-offer-2026-03".to_string()),
            pre_assigned_number: None,
        },
        positions: vec![
            Position::Item {
                description: "Design workshop".to_string(),
                quantity: dec!(2),
                unit_price: dec!(950),
                unit: "days".to_string(),
            },
            Position::Item {
                description: "Storefront implementation, responsive, including checkout \
                              integration and payment provider setup"
                    .to_string(),
                quantity: dec!(1),
                unit_price: dec!(9600),
                unit: "pcs".to_string(),
            },
        ],
    }
}

fn main() {
    tracing_subscriber::fmt().init();

    let store = MemoryStore::new();
    store.put_template("default", b"{}".to_vec());
    let engine = Engine::new(profile(), &store, &store, &store, &store, &store);

    std::fs::create_dir_all("demos/output").unwrap();

    let preview = engine.render_preview(&request(false)).expect("preview offer");
    std::fs::write("demos/output/offer-preview.pdf", &preview.pdf).unwrap();
    println!("preview rendered ({} pages), no number assigned", preview.pages);

    let committed = engine.render_and_commit(&request(true)).expect("commit offer");
    let bytes = store.object(&committed.pdf_path).expect("uploaded bytes");
    std::fs::write("demos/output/offer.pdf", bytes).unwrap();
    println!("committed {} as {}", committed.number, committed.filename);
}
