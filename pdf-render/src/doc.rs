use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::fonts::Font;
use crate::images::Logo;
use crate::objects::{ObjId, PdfObject};
use crate::writer::{escape_pdf_string, format_coord, PdfWriter};

/// RGB color, each component 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    pub fn gray(level: f64) -> Self {
        Color { r: level, g: level, b: level }
    }

    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
}

/// Handle to an image registered with [`DocBuilder::add_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageId(usize);

struct Page {
    width: f64,
    height: f64,
    content: Vec<u8>,
    /// Images placed on this page, by registry index.
    images_used: Vec<usize>,
}

/// Multi-page PDF builder with retained pages.
///
/// Unlike a streaming writer, every page stays addressable until
/// [`finish`](DocBuilder::finish): drawing operations take an explicit
/// page index, so a final pass can stamp repeating content (footers,
/// page numbers) onto pages that were laid out earlier. All four
/// Helvetica variants are available on every page.
pub struct DocBuilder {
    pages: Vec<Page>,
    images: Vec<Logo>,
    info: Vec<(String, String)>,
    compress: bool,
}

impl DocBuilder {
    pub fn new() -> Self {
        DocBuilder {
            pages: Vec::new(),
            images: Vec::new(),
            info: Vec::new(),
            compress: true,
        }
    }

    /// Enable or disable flate compression of content streams.
    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    /// Set a document info entry (e.g. "Title", "Creator").
    pub fn set_info(&mut self, key: &str, value: &str) {
        self.info.push((key.to_string(), value.to_string()));
    }

    /// Start a new page and return its index.
    pub fn add_page(&mut self, width: f64, height: f64) -> usize {
        self.pages.push(Page {
            width,
            height,
            content: Vec::new(),
            images_used: Vec::new(),
        });
        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Register an image for placement. The same id may be placed on
    /// any number of pages.
    pub fn add_image(&mut self, logo: Logo) -> ImageId {
        self.images.push(logo);
        ImageId(self.images.len() - 1)
    }

    fn page_mut(&mut self, page: usize) -> &mut Page {
        &mut self.pages[page]
    }

    /// Draw a line of text. Coordinates are PDF bottom-left origin;
    /// `y` is the text baseline.
    pub fn text(&mut self, page: usize, x: f64, y: f64, s: &str, font: Font, size: f64) {
        self.text_colored(page, x, y, s, font, size, Color::BLACK);
    }

    pub fn text_colored(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        s: &str,
        font: Font,
        size: f64,
        color: Color,
    ) {
        let ops = format!(
            "q\nBT\n{} {} {} rg\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\nQ\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            font.pdf_name(),
            format_coord(size),
            format_coord(x),
            format_coord(y),
            escape_pdf_string(s),
        );
        self.page_mut(page).content.extend_from_slice(ops.as_bytes());
    }

    /// Draw a horizontal or arbitrary line segment.
    pub fn line(
        &mut self,
        page: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    ) {
        let ops = format!(
            "q\n{} {} {} RG\n{} w\n{} {} m\n{} {} l\nS\nQ\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            format_coord(width),
            format_coord(x1),
            format_coord(y1),
            format_coord(x2),
            format_coord(y2),
        );
        self.page_mut(page).content.extend_from_slice(ops.as_bytes());
    }

    /// Fill a rectangle. `(x, y)` is the lower-left corner.
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
    ) {
        let ops = format!(
            "q\n{} {} {} rg\n{} {} {} {} re\nf\nQ\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            format_coord(x),
            format_coord(y),
            format_coord(w),
            format_coord(h),
        );
        self.page_mut(page).content.extend_from_slice(ops.as_bytes());
    }

    /// Place a registered image. `(x, y)` is the lower-left corner of
    /// the displayed rectangle.
    pub fn image(&mut self, page: usize, id: ImageId, x: f64, y: f64, w: f64, h: f64) {
        let ops = format!(
            "q\n{} 0 0 {} {} {} cm\n/Im{} Do\nQ\n",
            format_coord(w),
            format_coord(h),
            format_coord(x),
            format_coord(y),
            id.0,
        );
        let page = self.page_mut(page);
        page.content.extend_from_slice(ops.as_bytes());
        if !page.images_used.contains(&id.0) {
            page.images_used.push(id.0);
        }
    }

    /// Serialize the document: fonts, images, pages, xref, trailer.
    pub fn finish(self) -> io::Result<Vec<u8>> {
        const CATALOG: ObjId = ObjId(1, 0);
        const PAGES: ObjId = ObjId(2, 0);
        // Objects 3..=6: the four Helvetica variants.
        const FIRST_FONT: u32 = 3;
        let mut next_obj: u32 = FIRST_FONT + Font::ALL.len() as u32;

        let mut writer = PdfWriter::new(Vec::new());
        writer.write_header()?;

        for (i, font) in Font::ALL.iter().enumerate() {
            let obj = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.base_name())),
            ]);
            writer.write_object(ObjId(FIRST_FONT + i as u32, 0), &obj)?;
        }

        // Image XObjects (with optional soft masks) before the pages.
        let mut image_ids: Vec<ObjId> = Vec::new();
        for logo in &self.images {
            let smask_id = match &logo.smask_data {
                Some(alpha) => {
                    let id = ObjId(next_obj, 0);
                    next_obj += 1;
                    let smask = PdfObject::stream(
                        vec![
                            ("Type", PdfObject::name("XObject")),
                            ("Subtype", PdfObject::name("Image")),
                            ("Width", PdfObject::Integer(logo.width as i64)),
                            ("Height", PdfObject::Integer(logo.height as i64)),
                            ("ColorSpace", PdfObject::name("DeviceGray")),
                            ("BitsPerComponent", PdfObject::Integer(8)),
                        ],
                        alpha.clone(),
                    );
                    writer.write_object(id, &smask)?;
                    Some(id)
                }
                None => None,
            };

            let id = ObjId(next_obj, 0);
            next_obj += 1;
            let mut entries = vec![
                ("Type", PdfObject::name("XObject")),
                ("Subtype", PdfObject::name("Image")),
                ("Width", PdfObject::Integer(logo.width as i64)),
                ("Height", PdfObject::Integer(logo.height as i64)),
                ("ColorSpace", PdfObject::name(logo.color_space.pdf_name())),
                (
                    "BitsPerComponent",
                    PdfObject::Integer(logo.bits_per_component as i64),
                ),
            ];
            if logo.format == crate::images::ImageFormat::Jpeg {
                entries.push(("Filter", PdfObject::name("DCTDecode")));
            }
            if let Some(sid) = smask_id {
                entries.push(("SMask", PdfObject::Reference(sid)));
            }
            writer.write_object(id, &PdfObject::stream(entries, logo.data.clone()))?;
            image_ids.push(id);
        }

        let font_resources: Vec<(&str, PdfObject)> = Font::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| (f.pdf_name(), PdfObject::reference(FIRST_FONT + i as u32)))
            .collect();

        let mut page_obj_ids: Vec<ObjId> = Vec::new();
        for page in &self.pages {
            let content_id = ObjId(next_obj, 0);
            next_obj += 1;
            let page_id = ObjId(next_obj, 0);
            next_obj += 1;

            let stream = if self.compress {
                let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
                enc.write_all(&page.content)?;
                PdfObject::stream(
                    vec![("Filter", PdfObject::name("FlateDecode"))],
                    enc.finish()?,
                )
            } else {
                PdfObject::stream(vec![], page.content.clone())
            };
            writer.write_object(content_id, &stream)?;

            let mut resources = vec![(
                "Font",
                PdfObject::Dictionary(
                    font_resources
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.clone()))
                        .collect(),
                ),
            )];
            if !page.images_used.is_empty() {
                let xobjects: Vec<(String, PdfObject)> = page
                    .images_used
                    .iter()
                    .map(|&i| (format!("Im{}", i), PdfObject::Reference(image_ids[i])))
                    .collect();
                resources.push(("XObject", PdfObject::Dictionary(xobjects)));
            }

            let page_dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Page")),
                ("Parent", PdfObject::Reference(PAGES)),
                (
                    "MediaBox",
                    PdfObject::array(vec![
                        PdfObject::Integer(0),
                        PdfObject::Integer(0),
                        PdfObject::Real(page.width),
                        PdfObject::Real(page.height),
                    ]),
                ),
                ("Contents", PdfObject::Reference(content_id)),
                ("Resources", PdfObject::dict(resources)),
            ]);
            writer.write_object(page_id, &page_dict)?;
            page_obj_ids.push(page_id);
        }

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = ObjId(next_obj, 0);
            let entries: Vec<(&str, PdfObject)> = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::literal_string(v)))
                .collect();
            writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let kids: Vec<PdfObject> = page_obj_ids
            .iter()
            .map(|id| PdfObject::Reference(*id))
            .collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(page_obj_ids.len() as i64)),
        ]);
        writer.write_object(PAGES, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES)),
        ]);
        writer.write_object(CATALOG, &catalog)?;

        writer.write_xref_and_trailer(CATALOG, info_id)?;
        Ok(writer.into_inner())
    }
}

impl Default for DocBuilder {
    fn default() -> Self {
        Self::new()
    }
}
