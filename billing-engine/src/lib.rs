//! Financial document generation: offers and invoices rendered to PDF
//! with exact decimal totals and gap-free sequential numbering.
//!
//! The crate splits into a pure layer (totals, layout, rendering) that
//! can run anywhere, and a stateful layer (number allocation, document
//! records, object storage) reached only through the commit path.

pub mod canvas;
pub mod engine;
pub mod error;
pub mod flow;
pub mod format;
pub mod model;
pub mod numbering;
pub mod render;
pub mod sqlite;
pub mod store;
pub mod template;
pub mod totals;

pub use canvas::{Canvas, PdfCanvas, RecordingCanvas};
pub use engine::{Committed, Engine, EngineOutput, Rendered};
pub use error::{EngineError, Result};
pub use model::{
    Customer, Discount, DiscountBase, DiscountKind, DocumentKind, DocumentMeta, DocumentRequest,
    Position,
};
pub use numbering::{AllocatedNumber, NumberAllocator, NumberFormat};
pub use render::{render_document, RenderJob, NUMBER_PLACEHOLDER};
pub use sqlite::SqliteStore;
pub use store::{
    BillingProfile, DocumentStore, LogoSource, MemoryStore, ObjectStore, StoredDocument,
    TemplateSource,
};
pub use template::DocTemplate;
pub use totals::{compute_totals, Totals};
