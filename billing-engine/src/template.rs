//! Page-geometry template.
//!
//! The template is fetched as bytes from the [`TemplateSource`]
//! collaborator and deserialized here. It is the page geometry: when
//! it cannot be fetched or parsed there is nothing to render onto and
//! the whole operation aborts.
//!
//! [`TemplateSource`]: crate::store::TemplateSource

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Layout constants and styling for one document family of templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocTemplate {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Height of the reserved footer band at the page bottom. Body
    /// rows never intrude into it.
    pub footer_band: f64,
    /// Minimum gap kept between the last body row and the footer band.
    pub min_spacing: f64,
    /// Body top on continuation pages, measured from the page top.
    /// Leaves room for the repeated chrome (logo, table header).
    pub continuation_top: f64,
    pub base_size: f64,
    pub small_size: f64,
    pub title_size: f64,
    /// Spacing added below each table row, in points.
    pub row_gap: f64,
    pub accent: [f64; 3],
    pub muted: [f64; 3],
    /// Object-store reference of the logo image; optional.
    pub logo_ref: Option<String>,
    /// Logo display width in points (height follows aspect ratio).
    pub logo_width: f64,
    pub currency: String,
}

impl Default for DocTemplate {
    fn default() -> Self {
        // US Letter with 1in margins.
        DocTemplate {
            page_width: 612.0,
            page_height: 792.0,
            margin: 72.0,
            footer_band: 110.0,
            min_spacing: 10.0,
            continuation_top: 60.0,
            base_size: 9.0,
            small_size: 8.0,
            title_size: 16.0,
            row_gap: 6.0,
            accent: [0.118, 0.227, 0.373],
            muted: [0.5, 0.5, 0.5],
            logo_ref: None,
            logo_width: 110.0,
            currency: "EUR".to_string(),
        }
    }
}

impl DocTemplate {
    /// Parse template bytes (JSON). `reference` is only used for the
    /// error message.
    pub fn parse(reference: &str, bytes: &[u8]) -> Result<DocTemplate, EngineError> {
        serde_json::from_slice(bytes).map_err(|e| EngineError::MalformedTemplate {
            reference: reference.to_string(),
            message: e.to_string(),
        })
    }

    /// Right content edge.
    pub fn right(&self) -> f64 {
        self.page_width - self.margin
    }

    /// Usable content width between the margins.
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Body top of the first page (below the top margin).
    pub fn first_top(&self) -> f64 {
        self.page_height - self.margin
    }

    /// Body top of continuation pages (below the repeated chrome).
    pub fn continuation_body_top(&self) -> f64 {
        self.page_height - self.continuation_top
    }

    pub fn accent_color(&self) -> pdf_render::Color {
        pdf_render::Color::rgb(self.accent[0], self.accent[1], self.accent[2])
    }

    pub fn muted_color(&self) -> pdf_render::Color {
        pdf_render::Color::rgb(self.muted[0], self.muted[1], self.muted[2])
    }
}
