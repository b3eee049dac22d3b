//! Request and document model.
//!
//! The request body is transport-agnostic: whatever carries it (HTTP,
//! queue, test fixture) deserializes into [`DocumentRequest`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which family of financial document is being produced. Families are
/// numbered independently, each with its own counter and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Offer,
    Invoice,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Offer => "offer",
            DocumentKind::Invoice => "invoice",
        }
    }
}

/// One row of the document body. Order is significant and fixed by the
/// caller; positions are immutable once submitted to rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    /// Priced line: wrapped description, quantity, unit label, unit
    /// price. Contributes quantity x unit price to the net subtotal.
    Item {
        description: String,
        quantity: Decimal,
        unit_price: Decimal,
        #[serde(default)]
        unit: String,
    },
    /// Bold single-line section heading. No wrap.
    Heading { text: String },
    /// Wrapped free text spanning the full row width.
    Description { text: String },
    /// Running net sum of all item rows preceding this row.
    Subtotal,
    /// Horizontal rule.
    Separator,
}

impl Position {
    /// Net contribution of this row (non-item rows contribute zero).
    pub fn net_amount(&self) -> Decimal {
        match self {
            Position::Item { quantity, unit_price, .. } => *quantity * *unit_price,
            _ => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percent,
    Amount,
}

/// Whether the discount applies to the net or the gross total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountBase {
    Net,
    Gross,
}

/// Document-level discount. Applies once to the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub enabled: bool,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub base: DiscountBase,
    pub value: Decimal,
}

impl Discount {
    /// A disabled placeholder discount.
    pub fn none() -> Self {
        Discount {
            enabled: false,
            label: String::new(),
            kind: DiscountKind::Percent,
            base: DiscountBase::Net,
            value: Decimal::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.value > Decimal::ZERO
    }
}

/// Recipient of the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub customer_number: Option<String>,
}

impl Customer {
    /// Display name: company if present, otherwise "first last".
    pub fn display_name(&self) -> String {
        if let Some(company) = self.company.as_deref().filter(|c| !c.is_empty()) {
            return company.to_string();
        }
        let mut name = String::new();
        if let Some(first) = self.first_name.as_deref() {
            name.push_str(first);
        }
        if let Some(last) = self.last_name.as_deref() {
            if !name.is_empty() {
                name.push(' ');
            }
            name.push_str(last);
        }
        name
    }

    /// Street address line, e.g. "Main Road 12".
    pub fn street_line(&self) -> String {
        let mut line = self.street.clone().unwrap_or_default();
        if let Some(no) = self.house_number.as_deref().filter(|n| !n.is_empty()) {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(no);
        }
        line
    }

    /// City line, e.g. "10115 Berlin".
    pub fn city_line(&self) -> String {
        let mut line = self.postal_code.clone().unwrap_or_default();
        if let Some(city) = self.city.as_deref().filter(|c| !c.is_empty()) {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(city);
        }
        line
    }
}

/// Document metadata from the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub date: NaiveDate,
    /// Offer: how long the offer stands.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Invoice: when payment is due.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub title: String,
    #[serde(default)]
    pub intro: String,
    /// Tax rate in percent, >= 0.
    pub tax_rate: Decimal,
    pub template_ref: String,
    /// Set when updating an existing document.
    #[serde(default)]
    pub document_id: Option<Uuid>,
    /// false = preview, true = persist.
    #[serde(default)]
    pub commit: bool,
    #[serde(default)]
    pub discount: Option<Discount>,
    /// Required when commit=true and document_id is absent.
    #[serde(default)]
    pub idempotency_key: Option<String>,
    /// Caller-reserved number for new documents.
    #[serde(default)]
    pub pre_assigned_number: Option<String>,
}

/// The full document-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub kind: DocumentKind,
    pub customer: Customer,
    pub meta: DocumentMeta,
    pub positions: Vec<Position>,
}

impl DocumentRequest {
    pub fn discount(&self) -> Discount {
        self.meta.discount.clone().unwrap_or_else(Discount::none)
    }

    /// The date shown in the secondary date slot: validity for offers,
    /// due date for invoices.
    pub fn secondary_date(&self) -> Option<NaiveDate> {
        match self.kind {
            DocumentKind::Offer => self.meta.valid_until,
            DocumentKind::Invoice => self.meta.due_date,
        }
    }
}
