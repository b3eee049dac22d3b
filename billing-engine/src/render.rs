//! Document Renderer.
//!
//! One generic pipeline renders both offers and invoices; the
//! differences are confined to [`KindLabels`]. The pass order is
//! fixed: header, customer block, metadata, title/intro, table header,
//! body rows (with page breaks), summary block, then a footer pass
//! over every allocated page. Drawing itself is infallible — all loops
//! are bounded by the position list and the wrapped line counts.

use chrono::NaiveDate;
use pdf_render::{normalize, wrap, Font, Metrics};
use rust_decimal::Decimal;

use crate::canvas::Canvas;
use crate::flow::PageFlow;
use crate::format::{format_date, format_money};
use crate::model::{Customer, Discount, DocumentKind, Position};
use crate::store::BillingProfile;
use crate::template::DocTemplate;
use crate::totals::{running_net, Totals};

/// The per-kind wording differences between the two document families.
struct KindLabels {
    noun: &'static str,
    number_label: &'static str,
    secondary_date_label: &'static str,
}

impl KindLabels {
    fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Offer => KindLabels {
                noun: "Offer",
                number_label: "Offer no.:",
                secondary_date_label: "Valid until:",
            },
            DocumentKind::Invoice => KindLabels {
                noun: "Invoice",
                number_label: "Invoice no.:",
                secondary_date_label: "Due date:",
            },
        }
    }
}

/// Everything the renderer needs for one pass. Totals are computed by
/// the caller; the renderer itself never mutates shared state beyond
/// the canvas it draws on.
pub struct RenderJob<'a> {
    pub kind: DocumentKind,
    pub customer: &'a Customer,
    pub title: &'a str,
    pub intro: &'a str,
    pub date: NaiveDate,
    pub secondary_date: Option<NaiveDate>,
    pub tax_rate: Decimal,
    pub positions: &'a [Position],
    pub discount: &'a Discount,
    pub totals: &'a Totals,
    /// Human-readable number, or the preview placeholder.
    pub number_display: String,
    /// True for real commits; controls the discount note.
    pub committed: bool,
}

/// Placeholder shown in the number slot of previews without a number.
pub const NUMBER_PLACEHOLDER: &str = "---";

/// Column geometry of the line-item table. All widths derive from the
/// template's content width so the table always spans margin to
/// margin.
struct Columns {
    desc_x: f64,
    desc_w: f64,
    qty_right: f64,
    unit_x: f64,
    price_right: f64,
    total_right: f64,
}

impl Columns {
    fn new(tpl: &DocTemplate) -> Self {
        let w = tpl.content_width();
        let desc_w = w - 250.0;
        let desc_x = tpl.margin;
        let qty_right = desc_x + desc_w + 40.0;
        let unit_x = qty_right + 10.0;
        let price_right = unit_x + 40.0 + 60.0;
        let total_right = tpl.right();
        Columns {
            desc_x,
            desc_w,
            qty_right,
            unit_x,
            price_right,
            total_right,
        }
    }
}

pub fn render_document<C: Canvas>(
    canvas: &mut C,
    tpl: &DocTemplate,
    profile: &BillingProfile,
    job: &RenderJob<'_>,
) {
    let labels = KindLabels::for_kind(job.kind);
    let mut flow = PageFlow::new(canvas, tpl);

    draw_header(&mut flow, profile, job, &labels);
    draw_customer_block(&mut flow, job.customer);
    draw_title_intro(&mut flow, job, &labels);
    let columns = Columns::new(tpl);
    // Keep the table header together with at least a couple of rows.
    if flow.ensure_space(60.0) {
        draw_continuation_tag(&mut flow, job, &labels);
    }
    draw_table_header(&mut flow, &columns);
    draw_rows(&mut flow, job, &labels, &columns);
    draw_summary(&mut flow, job, &labels, &columns);
    draw_footers(flow.canvas(), tpl, profile);
}

fn right_text<C: Canvas>(
    canvas: &mut C,
    page: usize,
    right: f64,
    y: f64,
    s: &str,
    font: Font,
    size: f64,
) {
    let x = right - Metrics::text_width(s, font, size);
    canvas.text(page, x, y, s, font, size);
}

/// First-page header: logo (or company name) top-left, document noun
/// and metadata rows top-right.
fn draw_header<C: Canvas>(
    flow: &mut PageFlow<'_, C>,
    profile: &BillingProfile,
    job: &RenderJob<'_>,
    labels: &KindLabels,
) {
    let tpl = flow.template();
    let margin = tpl.margin;
    let right = tpl.right();
    let top = tpl.first_top();
    let base = tpl.base_size;
    let small = tpl.small_size;
    let line = Metrics::line_height(base);
    let muted = tpl.muted_color();
    let logo_width = tpl.logo_width;
    let title_size = tpl.title_size;
    let page = flow.page();

    // Left side: logo image when available, company wordmark otherwise.
    let mut left_bottom = if let Some((w, h)) = flow.canvas().logo_size() {
        let display_h = logo_width * h as f64 / w as f64;
        flow.canvas()
            .logo(page, margin, top - display_h, logo_width, display_h);
        top - display_h
    } else {
        flow.canvas()
            .text(page, margin, top - 14.0, &profile.company_name, Font::Bold, 12.0);
        top - 14.0
    };
    let mut y = left_bottom - line;
    for line_text in &profile.address_lines {
        flow.canvas()
            .text_colored(page, margin, y, line_text, Font::Regular, small, muted);
        y -= Metrics::line_height(small);
    }
    left_bottom = y;

    // Right side: noun + metadata rows.
    right_text(flow.canvas(), page, right, top - title_size, labels.noun, Font::Bold, title_size);
    let mut meta_y = top - title_size - line - 4.0;
    let meta_row = |flow: &mut PageFlow<'_, C>, label: &str, value: &str, y: f64| {
        let value_x = right - 90.0;
        let label_x = value_x - 8.0 - Metrics::text_width(label, Font::Bold, small);
        flow.canvas()
            .text_colored(page, label_x, y, label, Font::Bold, small, muted);
        flow.canvas().text(page, value_x, y, value, Font::Regular, small);
    };
    meta_row(flow, labels.number_label, &job.number_display, meta_y);
    meta_y -= Metrics::line_height(small);
    meta_row(flow, "Date:", &format_date(job.date), meta_y);
    if let Some(secondary) = job.secondary_date {
        meta_y -= Metrics::line_height(small);
        meta_row(flow, labels.secondary_date_label, &format_date(secondary), meta_y);
    }
    if let Some(number) = job.customer.customer_number.as_deref().filter(|n| !n.is_empty()) {
        meta_y -= Metrics::line_height(small);
        meta_row(flow, "Customer no.:", number, meta_y);
    }

    let header_bottom = left_bottom.min(meta_y) - 12.0;
    flow.canvas().line(
        page,
        margin,
        header_bottom,
        right,
        header_bottom,
        0.75,
        tpl.accent_color(),
    );
    flow.set_y(header_bottom - 18.0);
}

fn draw_customer_block<C: Canvas>(flow: &mut PageFlow<'_, C>, customer: &Customer) {
    let tpl = flow.template();
    let margin = tpl.margin;
    let small = tpl.small_size;
    let base = tpl.base_size;
    let muted = tpl.muted_color();
    let accent = tpl.accent_color();
    let page = flow.page();

    let small_line = Metrics::line_height(small);
    let base_line = Metrics::line_height(base);

    let y = flow.y();
    flow.canvas()
        .text_colored(page, margin, y, "BILL TO", Font::Bold, small, accent);
    flow.advance(base_line + 2.0);
    let y = flow.y();
    flow.canvas()
        .text(page, margin, y, &normalize(&customer.display_name()), Font::Bold, base + 1.0);
    flow.advance(base_line);
    for address_line in [customer.street_line(), customer.city_line()] {
        if address_line.is_empty() {
            continue;
        }
        let address_line = normalize(&address_line);
        let y = flow.y();
        flow.canvas()
            .text_colored(page, margin, y, &address_line, Font::Regular, small, muted);
        flow.advance(small_line);
    }
    flow.advance(14.0);
}

fn draw_title_intro<C: Canvas>(
    flow: &mut PageFlow<'_, C>,
    job: &RenderJob<'_>,
    labels: &KindLabels,
) {
    let tpl = flow.template();
    let margin = tpl.margin;
    let base = tpl.base_size;
    let width = tpl.content_width();

    if !job.title.is_empty() {
        let required = Metrics::line_height(base + 2.0) + 2.0;
        if flow.ensure_space(required) {
            draw_continuation_tag(flow, job, labels);
        }
        let page = flow.page();
        let y = flow.y();
        flow.canvas()
            .text(page, margin, y, &normalize(job.title), Font::Bold, base + 2.0);
        flow.advance(required);
    }
    if !job.intro.is_empty() {
        let line = Metrics::line_height(base);
        for text in &wrap(job.intro, width, Font::Regular, base) {
            if flow.ensure_space(line) {
                draw_continuation_tag(flow, job, labels);
            }
            let page = flow.page();
            let y = flow.y();
            flow.canvas().text(page, margin, y, text, Font::Regular, base);
            flow.advance(line);
        }
    }
    flow.advance(10.0);
}

/// Table header row: bold column labels over an accent rule. Repeated
/// on every page the table flows onto.
fn draw_table_header<C: Canvas>(flow: &mut PageFlow<'_, C>, columns: &Columns) {
    let tpl = flow.template();
    let size = tpl.small_size;
    let accent = tpl.accent_color();
    let page = flow.page();
    let y = flow.y();

    flow.canvas().text(page, columns.desc_x, y, "Description", Font::Bold, size);
    right_text(flow.canvas(), page, columns.qty_right, y, "Qty", Font::Bold, size);
    flow.canvas().text(page, columns.unit_x, y, "Unit", Font::Bold, size);
    right_text(flow.canvas(), page, columns.price_right, y, "Unit price", Font::Bold, size);
    right_text(flow.canvas(), page, columns.total_right, y, "Total", Font::Bold, size);

    let rule_y = y - 4.0;
    flow.canvas()
        .line(page, tpl.margin, rule_y, tpl.right(), rule_y, 0.75, accent);
    flow.advance(Metrics::line_height(size) + 8.0);
}

/// Muted "… (continued)" tag at the top of a continuation page.
fn draw_continuation_tag<C: Canvas>(
    flow: &mut PageFlow<'_, C>,
    job: &RenderJob<'_>,
    labels: &KindLabels,
) {
    let tpl = flow.template();
    let page = flow.page();
    let tag = format!("{} {} (continued)", labels.noun, job.number_display);
    let tag_y = tpl.page_height - 30.0;
    flow.canvas()
        .text_colored(page, tpl.margin, tag_y, &tag, Font::Regular, tpl.small_size, tpl.muted_color());
    if flow.canvas().has_logo() {
        let (w, h) = flow.canvas().logo_size().unwrap_or((1, 1));
        let display_h = 20.0;
        let display_w = display_h * w as f64 / h as f64;
        flow.canvas()
            .logo(page, tpl.right() - display_w, tag_y - 4.0, display_w, display_h);
    }
    flow.set_y(tpl.continuation_body_top());
}

///// Chrome redrawn after every table page break: the continuation tag
/// and the repeated table header.
fn draw_continuation_chrome<C: Canvas>(
    flow: &mut PageFlow<'_, C>,
    job: &RenderJob<'_>,
    labels: &KindLabels,
    columns: &Columns,
) {
    draw_continuation_tag(flow, job, labels);
    draw_table_header(flow, columns);
}

/// Guarantee space for a row, redrawing chrome after a break.
fn ensure_row_space<C: Canvas>(
    flow: &mut PageFlow<'_, C>,
    required: f64,
    job: &RenderJob<'_>,
    labels: &KindLabels,
    columns: &Columns,
) {
    if flow.ensure_space(required) {
        draw_continuation_chrome(flow, job, labels, columns);
    }
}

fn draw_rows<C: Canvas>(
    flow: &mut PageFlow<'_, C>,
    job: &RenderJob<'_>,
    labels: &KindLabels,
    columns: &Columns,
) {
    let tpl = flow.template();
    let base = tpl.base_size;
    let line = Metrics::line_height(base);
    let row_gap = tpl.row_gap;
    let currency = tpl.currency.clone();
    let muted = tpl.muted_color();

    for (index, position) in job.positions.iter().enumerate() {
        match position {
            Position::Item { description, quantity, unit_price, unit } => {
                let lines = wrap(description, columns.desc_w, Font::Regular, base);
                let required = lines.len() as f64 * line + row_gap;
                ensure_row_space(flow, required, job, labels, columns);

                let first_y = flow.y();
                let page = flow.page();
                for (i, text) in lines.iter().enumerate() {
                    flow.canvas().text(
                        page,
                        columns.desc_x,
                        first_y - i as f64 * line,
                        text,
                        Font::Regular,
                        base,
                    );
                }
                right_text(flow.canvas(), page, columns.qty_right, first_y, &quantity.to_string(), Font::Regular, base);
                flow.canvas().text(page, columns.unit_x, first_y, &normalize(unit), Font::Regular, base);
                right_text(
                    flow.canvas(),
                    page,
                    columns.price_right,
                    first_y,
                    &format_money(*unit_price, &currency),
                    Font::Regular,
                    base,
                );
                right_text(
                    flow.canvas(),
                    page,
                    columns.total_right,
                    first_y,
                    &format_money(position.net_amount(), &currency),
                    Font::Regular,
                    base,
                );
                flow.advance(required);
            }
            Position::Heading { text } => {
                let required = line + row_gap;
                ensure_row_space(flow, required, job, labels, columns);
                let page = flow.page();
                let y = flow.y();
                // Single line, no wrap.
                flow.canvas().text(page, columns.desc_x, y, &normalize(text), Font::Bold, base);
                flow.advance(required);
            }
            Position::Description { text } => {
                let lines = wrap(text, flow.template().content_width(), Font::Regular, base);
                let required = lines.len() as f64 * line + row_gap;
                ensure_row_space(flow, required, job, labels, columns);
                let page = flow.page();
                let first_y = flow.y();
                for (i, wrapped) in lines.iter().enumerate() {
                    flow.canvas().text_colored(
                        page,
                        columns.desc_x,
                        first_y - i as f64 * line,
                        wrapped,
                        Font::Regular,
                        base,
                        muted,
                    );
                }
                flow.advance(required);
            }
            Position::Subtotal => {
                let required = line + row_gap;
                ensure_row_space(flow, required, job, labels, columns);
                let page = flow.page();
                let y = flow.y();
                let subtotal = running_net(job.positions, index);
                flow.canvas().text(page, columns.desc_x, y, "Subtotal", Font::Bold, base);
                right_text(
                    flow.canvas(),
                    page,
                    columns.total_right,
                    y,
                    &format_money(subtotal, &currency),
                    Font::Bold,
                    base,
                );
                flow.advance(required);
            }
            Position::Separator => {
                let required = row_gap + 4.0;
                ensure_row_space(flow, required, job, labels, columns);
                let page = flow.page();
                let y = flow.y();
                let (margin, right) = (flow.template().margin, flow.template().right());
                flow.canvas().line(page, margin, y, right, y, 0.5, muted);
                flow.advance(required);
            }
        }
    }
}

/// The summary block is indivisible: its full height is measured and
/// reserved in one `ensure_space` call before anything is drawn, so it
/// can never straddle a page break.
fn draw_summary<C: Canvas>(
    flow: &mut PageFlow<'_, C>,
    job: &RenderJob<'_>,
    labels: &KindLabels,
    columns: &Columns,
) {
    let tpl = flow.template();
    let base = tpl.base_size;
    let small = tpl.small_size;
    let line = Metrics::line_height(base) + 2.0;
    let currency = tpl.currency.clone();
    let accent = tpl.accent_color();
    let muted = tpl.muted_color();
    let label_x = columns.price_right - 60.0;
    let discount_active = job.discount.is_active() && job.totals.discount_amount > Decimal::ZERO;
    let note = if discount_active && job.committed {
        let basis = match job.discount.base {
            crate::model::DiscountBase::Net => "net",
            crate::model::DiscountBase::Gross => "gross",
        };
        Some(format!(
            "A {} of {} was applied to the {} total.",
            if job.discount.label.is_empty() { "discount" } else { job.discount.label.as_str() },
            format_money(job.totals.discount_amount, &currency),
            basis,
        ))
    } else {
        None
    };
    let note_width = tpl.content_width();
    let note_lines = note
        .as_deref()
        .map(|n| wrap(n, note_width, Font::Oblique, small))
        .unwrap_or_default();

    // Measure the whole block before drawing any of it.
    let mut height = 10.0 + line; // gap + net line
    if discount_active {
        height += 2.0 * line; // discount + net after discount
    }
    height += line; // tax
    height += 6.0 + line; // rule + gross
    if !note_lines.is_empty() {
        height += 8.0 + note_lines.len() as f64 * Metrics::line_height(small);
    }
    if flow.ensure_space(height) {
        draw_continuation_tag(flow, job, labels);
    }

    let page = flow.page();
    flow.advance(10.0);

    let amount_row = |flow: &mut PageFlow<'_, C>, label: String, value: Decimal, bold: bool| {
        let font = if bold { Font::Bold } else { Font::Regular };
        let y = flow.y();
        flow.canvas().text_colored(
            page,
            label_x,
            y,
            &label,
            font,
            base,
            if bold { accent } else { muted },
        );
        right_text(
            flow.canvas(),
            page,
            columns.total_right,
            y,
            &format_money(value, &currency),
            font,
            base,
        );
        flow.advance(line);
    };

    amount_row(flow, "Net total:".to_string(), job.totals.net_subtotal, false);
    if discount_active {
        let discount_label = if job.discount.label.is_empty() {
            "Discount:".to_string()
        } else {
            format!("{}:", job.discount.label)
        };
        amount_row(flow, discount_label, -job.totals.discount_amount, false);
        amount_row(flow, "Net after discount:".to_string(), job.totals.net_after_discount, false);
    }
    amount_row(flow, format!("VAT ({}%):", job.tax_rate), job.totals.tax_amount, false);

    let rule_y = flow.y() + line - 6.0;
    flow.canvas().line(page, label_x, rule_y, columns.total_right, rule_y, 1.0, accent);
    amount_row(flow, "Total:".to_string(), job.totals.gross_total, true);

    if !note_lines.is_empty() {
        flow.advance(8.0);
        for wrapped in &note_lines {
            let y = flow.y();
            flow.canvas()
                .text_colored(page, tpl.margin, y, wrapped, Font::Oblique, small, muted);
            flow.advance(Metrics::line_height(small));
        }
    }
}

/// Footer pass: identical chrome on every allocated page, applied
/// after body layout because footer content is independent of
/// pagination.
fn draw_footers<C: Canvas>(canvas: &mut C, tpl: &DocTemplate, profile: &BillingProfile) {
    let total_pages = canvas.page_count();
    let small = tpl.small_size;
    let line = Metrics::line_height(small);
    let muted = tpl.muted_color();

    for page in 0..total_pages {
        let rule_y = tpl.footer_band;
        canvas.line(page, tpl.margin, rule_y, tpl.right(), rule_y, 0.75, tpl.accent_color());

        let mut y = rule_y - line - 2.0;
        let bank_line = format!(
            "{} | {} | IBAN {} | BIC {}",
            profile.account_holder, profile.bank_name, profile.iban, profile.bic,
        );
        let contact_line = format!("{} | {}", profile.phone, profile.email);
        for text in [bank_line, contact_line] {
            canvas.text_colored(page, tpl.margin, y, &text, Font::Regular, small, muted);
            y -= line;
        }

        let page_tag = format!("Page {} of {}", page + 1, total_pages);
        let x = tpl.right() - Metrics::text_width(&page_tag, Font::Regular, small);
        canvas.text_colored(page, x, rule_y - line - 2.0, &page_tag, Font::Regular, small, muted);
    }
}
