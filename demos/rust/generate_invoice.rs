/// Invoice demo — full commit path over the in-memory backend.
///
/// Renders a committed invoice with a discount, sequential number and
/// footer chrome, then writes the uploaded bytes to disk.
///
/// Run with:
///   cargo run --example generate_invoice -p billing-demos
///
/// Opens output at: demos/output/invoice.pdf
use billing_engine::{
    BillingProfile, Customer, Discount, DiscountBase, DiscountKind, DocumentKind, DocumentMeta,
    DocumentRequest, Engine, MemoryStore, Position,
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

fn request() -> DocumentRequest {
    DocumentRequest {
        kind: DocumentKind::Invoice,
        customer: Customer {
            company: Some("Acme GmbH".to_string()),
            street: Some("Main Road".to_string()),
            house_number: Some("12".to_string()),
            postal_code: Some("10115".to_string()),
            city: Some("Berlin".to_string()),
            customer_number: Some("K-17".to_string()),
            ..Customer::default()
        },
        meta: DocumentMeta {
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            valid_until: None,
            due_date: Some(NaiveDate::from_ymd_opt(2026, 4, 13).unwrap()),
            title: "Consulting services, March 2026".to_string(),
            intro: "As agreed, the services below were provided during March. \
                    Payment is due within 30 days."
                .to_string(),
            tax_rate: dec!(19),
            template_ref: "default".to_string(),
            document_id: None,
            commit: true,
            discount: Some(Discount {
                enabled: true,
                label: "Loyalty discount".to_string(),
                kind: DiscountKind::Percent,
                base: DiscountBase::Net,
                value: dec!(10),
            }),
            idempotency_key: Some("demo-invoice-2026-03".to_string()),
            pre_assigned_number: None,
        },
        positions: vec![
            Position::Heading { text: "Consulting".to_string() },
            Position::Item {
                description: "Architecture review of the order pipeline, including a written \
                              assessment with prioritized findings"
                    .to_string(),
                quantity: dec!(16),
                unit_price: dec!(140),
                unit: "h".to_string(),
            },
            Position::Item {
                description: "Implementation support".to_string(),
                quantity: dec!(24),
                unit_price: dec!(120),
                unit: "h".to_string(),
            },
            Position::Subtotal,
            Position::Separator,
            Position::Heading { text: "Operations".to_string() },
            Position::Item {
                description: "On-call support retainer".to_string(),
                quantity: dec!(1),
                unit_price: dec!(800),
                unit: "pcs".to_string(),
            },
            Position::Description {
                text: "The retainer covers weekday business hours and includes incident \
                       follow-up reports."
                    .to_string(),
            },
        ],
    }
}

fn main() {
    tracing_subscriber::fmt().init();

    let store = MemoryStore::new();
    store.put_template("default", b"{}".to_vec());
    let engine = Engine::new(profile(), &store, &store, &store, &store, &store);

    let committed = engine.render_and_commit(&request()).expect("commit invoice");
    println!(
        "committed {} ({} pages), gross {}",
        committed.number, committed.pages, committed.totals.gross_total
    );

    std::fs::create_dir_all("demos/output").unwrap();
    let bytes = store.object(&committed.pdf_path).expect("uploaded bytes");
    let path = "demos/output/invoice.pdf";
    std::fs::write(path, bytes).unwrap();
    println!("wrote {path}");
}
