//! Generation Engine.
//!
//! Two entry points share one rendering pipeline. `render_preview`
//! touches no persistent state and stamps a placeholder in the number
//! slot. `render_and_commit` resolves the document number first,
//! inside the allocator's transaction, then renders, uploads and
//! completes the stored record. The number is bound to the request's
//! idempotency key before rendering, so a failed commit retried with
//! the same key resumes with the same number instead of burning a
//! fresh one.

use tracing::{info, warn};
use uuid::Uuid;

use crate::canvas::{Canvas, PdfCanvas};
use crate::error::{EngineError, Result};
use crate::format::slug;
use crate::model::{DocumentKind, DocumentRequest};
use crate::numbering::NumberAllocator;
use crate::render::{render_document, RenderJob, NUMBER_PLACEHOLDER};
use crate::store::{
    BillingProfile, DocumentStore, LogoSource, ObjectStore, StoredDocument, TemplateSource,
};
use crate::template::DocTemplate;
use crate::totals::{compute_totals, round_money, Totals};

/// Output of a preview render. Nothing was persisted; the number
/// field is empty because no number exists yet.
#[derive(Debug)]
pub struct Rendered {
    pub pdf: Vec<u8>,
    pub number: String,
    pub pages: usize,
    pub totals: Totals,
}

/// Output of a commit.
#[derive(Debug)]
pub struct Committed {
    pub document_id: Uuid,
    pub number: String,
    pub filename: String,
    pub pdf_path: String,
    pub pages: usize,
    pub totals: Totals,
    /// True when the idempotency key was already bound and this call
    /// re-rendered the previously numbered document.
    pub replayed: bool,
}

#[derive(Debug)]
pub enum EngineOutput {
    Preview(Rendered),
    Committed(Committed),
}

struct ResolvedNumber {
    document_id: Uuid,
    number_value: u64,
    number: String,
    replayed: bool,
    idempotency_key: Option<String>,
}

pub struct Engine<'a> {
    templates: &'a dyn TemplateSource,
    logos: &'a dyn LogoSource,
    documents: &'a dyn DocumentStore,
    objects: &'a dyn ObjectStore,
    allocator: &'a dyn NumberAllocator,
    profile: BillingProfile,
}

impl<'a> Engine<'a> {
    pub fn new(
        profile: BillingProfile,
        templates: &'a dyn TemplateSource,
        logos: &'a dyn LogoSource,
        documents: &'a dyn DocumentStore,
        objects: &'a dyn ObjectStore,
        allocator: &'a dyn NumberAllocator,
    ) -> Self {
        Engine { templates, logos, documents, objects, allocator, profile }
    }

    /// Route on the request's commit flag.
    pub fn process(&self, request: &DocumentRequest) -> Result<EngineOutput> {
        if request.meta.commit {
            Ok(EngineOutput::Committed(self.render_and_commit(request)?))
        } else {
            Ok(EngineOutput::Preview(self.render_preview(request)?))
        }
    }

    /// Render without touching counters, records or the object store.
    pub fn render_preview(&self, request: &DocumentRequest) -> Result<Rendered> {
        let (tpl, logo, totals) = self.prepare(request)?;
        let pre_assigned = request
            .meta
            .pre_assigned_number
            .clone()
            .filter(|n| !n.is_empty());
        let display = pre_assigned
            .clone()
            .unwrap_or_else(|| NUMBER_PLACEHOLDER.to_string());
        let (pdf, pages) = self.render_pdf(request, &tpl, logo, &totals, display, false)?;
        info!(kind = request.kind.as_str(), pages, "preview rendered");
        Ok(Rendered { pdf, number: pre_assigned.unwrap_or_default(), pages, totals })
    }

    /// Resolve the number, render, upload, complete the record.
    pub fn render_and_commit(&self, request: &DocumentRequest) -> Result<Committed> {
        let (tpl, logo, totals) = self.prepare(request)?;
        let resolved = self.resolve_number(request)?;
        let ResolvedNumber { document_id, number_value, number, replayed, idempotency_key } =
            resolved;
        let (pdf, pages) =
            self.render_pdf(request, &tpl, logo, &totals, number.clone(), true)?;

        let filename = self.filename(request, &number);
        let path = format!("{}s/{}", request.kind.as_str(), filename);
        let pdf_path = self.objects.upload(&path, &pdf)?;

        self.documents.update(&StoredDocument {
            id: document_id,
            kind: request.kind,
            number_value,
            number: number.clone(),
            idempotency_key,
            customer_name: request.customer.display_name(),
            gross_total: round_money(totals.gross_total),
            pdf_path: Some(pdf_path.clone()),
        })?;

        info!(
            kind = request.kind.as_str(),
            number = %number,
            pages,
            replayed,
            "document committed"
        );
        Ok(Committed { document_id, number, filename, pdf_path, pages, totals, replayed })
    }

    /// Number resolution order: existing document keeps its number, a
    /// pre-assigned number is taken verbatim, otherwise the allocator
    /// decides (idempotent replay or a fresh counter value).
    fn resolve_number(&self, request: &DocumentRequest) -> Result<ResolvedNumber> {
        if let Some(id) = request.meta.document_id {
            let stored = self
                .documents
                .find(id)?
                .ok_or_else(|| EngineError::UnknownDocument(id.to_string()))?;
            return Ok(ResolvedNumber {
                document_id: id,
                number_value: stored.number_value,
                number: stored.number,
                replayed: false,
                idempotency_key: stored.idempotency_key,
            });
        }
        if let Some(number) = request
            .meta
            .pre_assigned_number
            .clone()
            .filter(|n| !n.is_empty())
        {
            // A retried commit must land on the record of the first attempt.
            if let Some(key) = request.meta.idempotency_key.as_deref().filter(|k| !k.is_empty()) {
                if let Some(stored) = self.documents.find_by_idempotency_key(key)? {
                    return Ok(ResolvedNumber {
                        document_id: stored.id,
                        number_value: stored.number_value,
                        number: stored.number,
                        replayed: true,
                        idempotency_key: stored.idempotency_key,
                    });
                }
            }
            return Ok(ResolvedNumber {
                document_id: Uuid::new_v4(),
                number_value: 0,
                number,
                replayed: false,
                idempotency_key: request.meta.idempotency_key.clone(),
            });
        }
        let key = request
            .meta
            .idempotency_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(EngineError::MissingIdempotencyKey)?;
        let id = Uuid::new_v4();
        let allocated = self.allocator.allocate(request.kind, key, id)?;
        let document_id = if allocated.replayed {
            // The skeletal record carries the id of the first attempt.
            self.documents
                .find_by_idempotency_key(key)?
                .ok_or_else(|| EngineError::Storage("allocator replay without record".to_string()))?
                .id
        } else {
            id
        };
        Ok(ResolvedNumber {
            document_id,
            number_value: allocated.value,
            number: allocated.display,
            replayed: allocated.replayed,
            idempotency_key: Some(key.to_string()),
        })
    }

    fn prepare(
        &self,
        request: &DocumentRequest,
    ) -> Result<(DocTemplate, Option<pdf_render::Logo>, Totals)> {
        // The footer draws the profile verbatim; an unconfigured one
        // would produce documents with blank bank details.
        if self.profile.company_name.is_empty() || self.profile.iban.is_empty() {
            return Err(EngineError::MissingBillingProfile);
        }
        let template_ref = request.meta.template_ref.as_str();
        let bytes = self.templates.fetch_template(template_ref)?;
        let tpl = DocTemplate::parse(template_ref, &bytes)?;

        let logo = match &tpl.logo_ref {
            Some(reference) => match self.logos.fetch_logo(reference) {
                Ok(Some(bytes)) => match pdf_render::Logo::decode(bytes) {
                    Ok(logo) => Some(logo),
                    Err(message) => {
                        warn!(reference = %reference, %message, "logo undecodable, omitting");
                        None
                    }
                },
                Ok(None) => {
                    warn!(reference = %reference, "logo missing, omitting");
                    None
                }
                Err(err) => {
                    warn!(reference = %reference, error = %err, "logo fetch failed, omitting");
                    None
                }
            },
            None => None,
        };

        let discount = request.discount();
        let totals = compute_totals(&request.positions, request.meta.tax_rate, &discount);
        Ok((tpl, logo, totals))
    }

    fn render_pdf(
        &self,
        request: &DocumentRequest,
        tpl: &DocTemplate,
        logo: Option<pdf_render::Logo>,
        totals: &Totals,
        number_display: String,
        committed: bool,
    ) -> Result<(Vec<u8>, usize)> {
        let mut canvas = PdfCanvas::new();
        if let Some(logo) = logo {
            canvas.set_logo(logo);
        }
        let noun = match request.kind {
            DocumentKind::Offer => "Offer",
            DocumentKind::Invoice => "Invoice",
        };
        canvas.set_info("Title", &format!("{} {}", noun, number_display));
        canvas.set_info("Author", &self.profile.company_name);

        let discount = request.discount();
        let job = RenderJob {
            kind: request.kind,
            customer: &request.customer,
            title: &request.meta.title,
            intro: &request.meta.intro,
            date: request.meta.date,
            secondary_date: request.secondary_date(),
            tax_rate: request.meta.tax_rate,
            positions: &request.positions,
            discount: &discount,
            totals,
            number_display,
            committed,
        };
        render_document(&mut canvas, tpl, &self.profile, &job);
        let pages = canvas.page_count();
        let pdf = canvas
            .into_bytes()
            .map_err(|e| EngineError::Render(e.to_string()))?;
        Ok((pdf, pages))
    }

    /// Deterministic object name: customer slug, customer number when
    /// present, then the document number.
    fn filename(&self, request: &DocumentRequest, number: &str) -> String {
        let base = slug(&request.customer.display_name());
        match request
            .customer
            .customer_number
            .as_deref()
            .filter(|n| !n.is_empty())
        {
            Some(customer_number) => format!("{}-{}-{}.pdf", base, customer_number, number),
            None => format!("{}-{}.pdf", base, number),
        }
    }
}
