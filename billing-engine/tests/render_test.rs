//! Layout tests against the recording canvas: pagination, repeated
//! chrome, and the indivisible summary block.

use billing_engine::canvas::{Canvas, Op, RecordingCanvas};
use billing_engine::model::{Customer, Discount, DiscountBase, DiscountKind, DocumentKind, Position};
use billing_engine::render::{render_document, RenderJob};
use billing_engine::store::BillingProfile;
use billing_engine::template::DocTemplate;
use billing_engine::totals::compute_totals;
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

fn customer() -> Customer {
    Customer {
        company: Some("Acme GmbH".to_string()),
        street: Some("Main Road".to_string()),
        house_number: Some("12".to_string()),
        postal_code: Some("10115".to_string()),
        city: Some("Berlin".to_string()),
        ..Customer::default()
    }
}

fn item(description: &str) -> Position {
    Position::Item {
        description: description.to_string(),
        quantity: dec!(2),
        unit_price: dec!(80),
        unit: "h".to_string(),
    }
}

fn render(
    kind: DocumentKind,
    number: &str,
    positions: Vec<Position>,
    discount: Discount,
    committed: bool,
) -> RecordingCanvas {
    let tpl = DocTemplate::default();
    let profile = profile();
    let customer = customer();
    let totals = compute_totals(&positions, dec!(19), &discount);
    let job = RenderJob {
        kind,
        customer: &customer,
        title: "Consulting services",
        intro: "As agreed, the services below were provided in March.",
        date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        secondary_date: NaiveDate::from_ymd_opt(2026, 4, 13),
        tax_rate: dec!(19),
        positions: &positions,
        discount: &discount,
        totals: &totals,
        number_display: number.to_string(),
        committed,
    };
    let mut canvas = RecordingCanvas::new();
    render_document(&mut canvas, &tpl, &profile, &job);
    canvas
}

#[test]
fn single_page_document_carries_header_table_and_footer() {
    let canvas = render(
        DocumentKind::Invoice,
        "RE-0042",
        vec![item("Architecture review"), item("Implementation support")],
        Discount::none(),
        true,
    );
    assert_eq!(canvas.page_count(), 1);
    assert!(canvas.contains_text("Invoice"));
    assert!(canvas.contains_text("RE-0042"));
    assert!(canvas.contains_text("Acme GmbH"));
    assert!(canvas.contains_text("Description"));
    assert!(canvas.contains_text("Total:"));
    assert!(canvas.contains_text("IBAN DE02 1203 0000 0000 2020 51"));
    assert!(canvas.contains_text("Page 1 of 1"));
}

#[test]
fn long_documents_paginate_and_repeat_the_table_header() {
    let positions: Vec<Position> = (0..60).map(|i| item(&format!("Task {i}"))).collect();
    let canvas = render(DocumentKind::Invoice, "RE-0001", positions, Discount::none(), true);
    let pages = canvas.page_count();
    assert!(pages >= 2, "expected multiple pages, got {pages}");
    for page in 0..pages {
        let texts = canvas.texts_on_page(page);
        assert!(texts.contains(&"Description"), "no table header on page {page}");
        assert!(
            texts.iter().any(|t| t.starts_with("Page ")),
            "no page number on page {page}"
        );
    }
    // Continuation tag appears on every page after the first.
    for page in 1..pages {
        assert!(
            canvas
                .texts_on_page(page)
                .iter()
                .any(|t| t.contains("(continued)")),
            "no continuation tag on page {page}"
        );
    }
    assert!(!canvas.texts_on_page(0).iter().any(|t| t.contains("(continued)")));
}

#[test]
fn long_intro_breaks_to_a_new_page_before_the_footer_band() {
    // Every wrapped line of this intro contains the marker word.
    let intro = "preamble ".repeat(600);
    let tpl = DocTemplate::default();
    let profile = profile();
    let customer = customer();
    let positions = vec![item("Architecture review")];
    let discount = Discount::none();
    let totals = compute_totals(&positions, dec!(19), &discount);
    let job = RenderJob {
        kind: DocumentKind::Invoice,
        customer: &customer,
        title: "Consulting services",
        intro: intro.trim(),
        date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        secondary_date: NaiveDate::from_ymd_opt(2026, 4, 13),
        tax_rate: dec!(19),
        positions: &positions,
        discount: &discount,
        totals: &totals,
        number_display: "RE-0011".to_string(),
        committed: true,
    };
    let mut canvas = RecordingCanvas::new();
    render_document(&mut canvas, &tpl, &profile, &job);

    assert!(canvas.page_count() >= 2, "intro did not paginate");
    for op in &canvas.ops {
        if let Op::Text { text, y, .. } = op {
            if text.contains("preamble") {
                assert!(*y > tpl.footer_band, "intro line drawn at y = {y}");
            }
        }
    }
    assert!(canvas
        .texts_on_page(1)
        .iter()
        .any(|t| t.contains("(continued)")));
}

#[test]
fn wrapped_item_rows_never_straddle_pages() {
    // Every wrapped line of this description contains the marker word.
    let long = "indivisible ".repeat(40);
    let mut positions: Vec<Position> = (0..30).map(|i| item(&format!("Task {i}"))).collect();
    positions.push(item(long.trim()));
    let canvas = render(DocumentKind::Invoice, "RE-0002", positions, Discount::none(), true);

    let pages: Vec<usize> = canvas
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Text { page, text, .. } if text.contains("indivisible") => Some(*page),
            _ => None,
        })
        .collect();
    assert!(!pages.is_empty());
    assert!(pages.iter().all(|p| *p == pages[0]), "row split across pages: {pages:?}");
}

#[test]
fn summary_block_stays_on_one_page() {
    for count in [28, 29, 30, 31, 32] {
        let positions: Vec<Position> = (0..count).map(|i| item(&format!("Task {i}"))).collect();
        let canvas = render(DocumentKind::Invoice, "RE-0003", positions, Discount::none(), true);
        let page_of = |needle: &str| -> Option<usize> {
            canvas.ops.iter().find_map(|op| match op {
                Op::Text { page, text, .. } if text.contains(needle) => Some(*page),
                _ => None,
            })
        };
        let net = page_of("Net total:");
        let vat = page_of("VAT (19%):");
        let total = page_of("Total:");
        assert!(net.is_some() && vat.is_some() && total.is_some());
        assert_eq!(net, vat, "summary split with {count} rows");
        assert_eq!(vat, total, "summary split with {count} rows");
    }
}

#[test]
fn offer_labels_differ_from_invoice_labels() {
    let offer = render(
        DocumentKind::Offer,
        "AN-0005",
        vec![item("Prototype")],
        Discount::none(),
        true,
    );
    assert!(offer.contains_text("Offer no.:"));
    assert!(offer.contains_text("Valid until:"));
    assert!(!offer.contains_text("Due date:"));

    let invoice = render(
        DocumentKind::Invoice,
        "RE-0005",
        vec![item("Prototype")],
        Discount::none(),
        true,
    );
    assert!(invoice.contains_text("Invoice no.:"));
    assert!(invoice.contains_text("Due date:"));
    assert!(!invoice.contains_text("Valid until:"));
}

#[test]
fn structural_rows_render_in_order() {
    let positions = vec![
        Position::Heading { text: "Phase 1".to_string() },
        item("Discovery"),
        Position::Description { text: "Includes two on-site workshops.".to_string() },
        Position::Subtotal,
        Position::Separator,
        Position::Heading { text: "Phase 2".to_string() },
        item("Delivery"),
    ];
    let canvas = render(DocumentKind::Offer, "AN-0001", positions, Discount::none(), true);
    assert!(canvas.contains_text("Phase 1"));
    assert!(canvas.contains_text("Includes two on-site workshops."));
    assert!(canvas.contains_text("Subtotal"));
    assert!(canvas.contains_text("Phase 2"));
}

#[test]
fn discount_note_appears_only_on_commits() {
    let discount = Discount {
        enabled: true,
        label: "Loyalty discount".to_string(),
        kind: DiscountKind::Percent,
        base: DiscountBase::Net,
        value: dec!(10),
    };
    let positions = vec![item("Support retainer")];

    let committed = render(DocumentKind::Invoice, "RE-0009", positions.clone(), discount.clone(), true);
    assert!(committed.contains_text("Loyalty discount:"));
    assert!(committed.contains_text("was applied"));

    let preview = render(DocumentKind::Invoice, "---", positions, discount, false);
    assert!(preview.contains_text("Loyalty discount:"));
    assert!(!preview.contains_text("was applied"));
    assert!(preview.contains_text("---"));
}
