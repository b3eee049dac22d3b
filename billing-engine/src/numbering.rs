//! Sequential document numbers.
//!
//! Offers and invoices draw from independent counters. A number is
//! only ever taken from the counter at commit time, inside the same
//! storage transaction that records it, so the sequence stays gap-free
//! even when a later step of the commit fails.

use uuid::Uuid;

use crate::error::Result;
use crate::model::DocumentKind;

/// Display shape of a document number: `AN-0007`, `RE-0042`.
#[derive(Debug, Clone)]
pub struct NumberFormat {
    pub prefix: String,
    pub pad_width: usize,
}

impl NumberFormat {
    pub fn for_kind(kind: DocumentKind) -> Self {
        let prefix = match kind {
            DocumentKind::Offer => "AN-",
            DocumentKind::Invoice => "RE-",
        };
        NumberFormat { prefix: prefix.to_string(), pad_width: 4 }
    }

    /// Values wider than `pad_width` keep all of their digits.
    pub fn format(&self, value: u64) -> String {
        format!("{}{:0width$}", self.prefix, value, width = self.pad_width)
    }
}

/// Atomic number source backing real commits.
///
/// `allocate` must perform three steps in one transaction: look up the
/// number already bound to `idempotency_key` and return it when found,
/// otherwise increment the per-kind counter, bind the new number to
/// the key through a skeletal document record, and return it. Two
/// concurrent commits must never observe the same counter value.
pub trait NumberAllocator {
    fn allocate(
        &self,
        kind: DocumentKind,
        idempotency_key: &str,
        document_id: Uuid,
    ) -> Result<AllocatedNumber>;
}

/// Outcome of one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedNumber {
    /// Raw counter value.
    pub value: u64,
    /// Formatted display number.
    pub display: String,
    /// True when the idempotency key was already bound and the stored
    /// number was returned instead of a fresh one.
    pub replayed: bool,
}
