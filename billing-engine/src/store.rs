//! Storage seams.
//!
//! The engine talks to its surroundings through small traits so tests
//! can run against in-memory fakes and production can bind whatever
//! backends it has. The contract differences matter: a missing
//! template is fatal, a missing logo is not.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::model::DocumentKind;
use crate::numbering::{AllocatedNumber, NumberAllocator, NumberFormat};

/// Fixed sender identity stamped on every document: header address and
/// the bank and contact lines of the footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingProfile {
    pub company_name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    pub account_holder: String,
    pub bank_name: String,
    pub iban: String,
    pub bic: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Fetches page-geometry templates by reference. Absence is fatal.
pub trait TemplateSource {
    fn fetch_template(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Fetches logo images by reference. Absence is tolerated; the header
/// falls back to the company wordmark.
pub trait LogoSource {
    fn fetch_logo(&self, reference: &str) -> Result<Option<Vec<u8>>>;
}

/// Finished PDFs are uploaded under a deterministic path. Returns the
/// stored path.
pub trait ObjectStore {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String>;
}

/// Record of a committed document. A skeletal row (number bound to the
/// idempotency key) is inserted inside the allocation transaction; the
/// commit fills in the rest afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub number_value: u64,
    pub number: String,
    pub idempotency_key: Option<String>,
    pub customer_name: String,
    pub gross_total: Decimal,
    pub pdf_path: Option<String>,
}

impl StoredDocument {
    pub(crate) fn skeletal(
        id: Uuid,
        kind: DocumentKind,
        number_value: u64,
        number: String,
        idempotency_key: &str,
    ) -> Self {
        StoredDocument {
            id,
            kind,
            number_value,
            number,
            idempotency_key: Some(idempotency_key.to_string()),
            customer_name: String::new(),
            gross_total: Decimal::ZERO,
            pdf_path: None,
        }
    }
}

/// Committed-document records.
pub trait DocumentStore {
    fn find(&self, id: Uuid) -> Result<Option<StoredDocument>>;
    fn find_by_idempotency_key(&self, key: &str) -> Result<Option<StoredDocument>>;
    fn find_by_number(&self, kind: DocumentKind, number: &str) -> Result<Option<StoredDocument>>;
    /// Replace the record with the same id.
    fn update(&self, document: &StoredDocument) -> Result<()>;
}

#[derive(Default)]
struct MemoryInner {
    counters: HashMap<DocumentKind, u64>,
    documents: HashMap<Uuid, StoredDocument>,
    templates: HashMap<String, Vec<u8>>,
    logos: HashMap<String, Vec<u8>>,
    objects: HashMap<String, Vec<u8>>,
}

/// In-memory backend implementing every storage seam. Used by tests
/// and the demo binaries; production binds real backends instead.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn put_template(&self, reference: &str, bytes: Vec<u8>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.templates.insert(reference.to_string(), bytes);
        }
    }

    pub fn put_logo(&self, reference: &str, bytes: Vec<u8>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.logos.insert(reference.to_string(), bytes);
        }
    }

    /// Bytes uploaded under `path`, if any.
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.lock().ok()?.objects.get(path).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.documents.len()).unwrap_or(0)
    }

    fn locked(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::Storage("memory store lock poisoned".to_string()))
    }
}

impl TemplateSource for MemoryStore {
    fn fetch_template(&self, reference: &str) -> Result<Vec<u8>> {
        self.locked()?
            .templates
            .get(reference)
            .cloned()
            .ok_or_else(|| EngineError::MissingTemplate(reference.to_string()))
    }
}

impl LogoSource for MemoryStore {
    fn fetch_logo(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.locked()?.logos.get(reference).cloned())
    }
}

impl ObjectStore for MemoryStore {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String> {
        self.locked()?.objects.insert(path.to_string(), bytes.to_vec());
        Ok(path.to_string())
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, id: Uuid) -> Result<Option<StoredDocument>> {
        Ok(self.locked()?.documents.get(&id).cloned())
    }

    fn find_by_idempotency_key(&self, key: &str) -> Result<Option<StoredDocument>> {
        Ok(self
            .locked()?
            .documents
            .values()
            .find(|d| d.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    fn find_by_number(&self, kind: DocumentKind, number: &str) -> Result<Option<StoredDocument>> {
        Ok(self
            .locked()?
            .documents
            .values()
            .find(|d| d.kind == kind && d.number == number)
            .cloned())
    }

    fn update(&self, document: &StoredDocument) -> Result<()> {
        self.locked()?.documents.insert(document.id, document.clone());
        Ok(())
    }
}

impl NumberAllocator for MemoryStore {
    fn allocate(
        &self,
        kind: DocumentKind,
        idempotency_key: &str,
        document_id: Uuid,
    ) -> Result<AllocatedNumber> {
        // Single lock guards lookup, increment and insert together.
        let mut inner = self.locked()?;
        if let Some(existing) = inner
            .documents
            .values()
            .find(|d| d.idempotency_key.as_deref() == Some(idempotency_key))
        {
            return Ok(AllocatedNumber {
                value: existing.number_value,
                display: existing.number.clone(),
                replayed: true,
            });
        }
        let counter = inner.counters.entry(kind).or_insert(0);
        *counter += 1;
        let value = *counter;
        let display = NumberFormat::for_kind(kind).format(value);
        inner.documents.insert(
            document_id,
            StoredDocument::skeletal(document_id, kind, value, display.clone(), idempotency_key),
        );
        Ok(AllocatedNumber { value, display, replayed: false })
    }
}
