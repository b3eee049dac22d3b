//! Drawing seam between layout and PDF emission.
//!
//! The renderer and page flow only talk to the [`Canvas`] trait, so
//! layout decisions can be tested against a [`RecordingCanvas`]
//! without producing PDF bytes.

use pdf_render::doc::ImageId;
use pdf_render::{Color, DocBuilder, Font};

/// A multi-page drawing surface addressed by page index. Coordinates
/// are PDF-style: bottom-left origin, `y` is the text baseline.
pub trait Canvas {
    /// Start a new page and return its index.
    fn add_page(&mut self, width: f64, height: f64) -> usize;

    fn page_count(&self) -> usize;

    fn text(&mut self, page: usize, x: f64, y: f64, s: &str, font: Font, size: f64) {
        self.text_colored(page, x, y, s, font, size, Color::BLACK);
    }

    fn text_colored(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        s: &str,
        font: Font,
        size: f64,
        color: Color,
    );

    fn line(&mut self, page: usize, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color);

    /// Whether a logo image is available for drawing.
    fn has_logo(&self) -> bool;

    /// Natural pixel size of the logo, if one is available.
    fn logo_size(&self) -> Option<(u32, u32)>;

    /// Place the logo. No-op when none is available.
    fn logo(&mut self, page: usize, x: f64, y: f64, w: f64, h: f64);
}

/// Canvas backed by a [`DocBuilder`]; produces real PDF bytes.
pub struct PdfCanvas {
    doc: DocBuilder,
    logo: Option<(ImageId, u32, u32)>,
}

impl PdfCanvas {
    pub fn new() -> Self {
        PdfCanvas {
            doc: DocBuilder::new(),
            logo: None,
        }
    }

    /// Register the document logo from decoded image data.
    pub fn set_logo(&mut self, logo: pdf_render::Logo) {
        let (w, h) = (logo.width, logo.height);
        let id = self.doc.add_image(logo);
        self.logo = Some((id, w, h));
    }

    pub fn set_info(&mut self, key: &str, value: &str) {
        self.doc.set_info(key, value);
    }

    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        self.doc.finish()
    }
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for PdfCanvas {
    fn add_page(&mut self, width: f64, height: f64) -> usize {
        self.doc.add_page(width, height)
    }

    fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    fn text_colored(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        s: &str,
        font: Font,
        size: f64,
        color: Color,
    ) {
        self.doc.text_colored(page, x, y, s, font, size, color);
    }

    fn line(&mut self, page: usize, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color) {
        self.doc.line(page, x1, y1, x2, y2, width, color);
    }

    fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    fn logo_size(&self) -> Option<(u32, u32)> {
        self.logo.map(|(_, w, h)| (w, h))
    }

    fn logo(&mut self, page: usize, x: f64, y: f64, w: f64, h: f64) {
        if let Some((id, _, _)) = self.logo {
            self.doc.image(page, id, x, y, w, h);
        }
    }
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        page: usize,
        x: f64,
        y: f64,
        text: String,
        font: Font,
        size: f64,
    },
    Line {
        page: usize,
        y: f64,
    },
    Logo {
        page: usize,
    },
}

/// Canvas double that records operations instead of drawing. Lets
/// layout tests assert on pagination and placement without parsing
/// PDF output.
#[derive(Default)]
pub struct RecordingCanvas {
    pub ops: Vec<Op>,
    pages: usize,
    pub with_logo: bool,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// All text ops that landed on the given page.
    pub fn texts_on_page(&self, page: usize) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { page: p, text, .. } if *p == page => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.ops.iter().any(|op| match op {
            Op::Text { text, .. } => text.contains(needle),
            _ => false,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn add_page(&mut self, _width: f64, _height: f64) -> usize {
        self.pages += 1;
        self.pages - 1
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn text_colored(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        s: &str,
        font: Font,
        size: f64,
        _color: Color,
    ) {
        self.ops.push(Op::Text {
            page,
            x,
            y,
            text: s.to_string(),
            font,
            size,
        });
    }

    fn line(&mut self, page: usize, _x1: f64, y1: f64, _x2: f64, _y2: f64, _w: f64, _c: Color) {
        self.ops.push(Op::Line { page, y: y1 });
    }

    fn has_logo(&self) -> bool {
        self.with_logo
    }

    fn logo_size(&self) -> Option<(u32, u32)> {
        self.with_logo.then_some((200, 80))
    }

    fn logo(&mut self, page: usize, _x: f64, _y: f64, _w: f64, _h: f64) {
        self.ops.push(Op::Logo { page });
    }
}
