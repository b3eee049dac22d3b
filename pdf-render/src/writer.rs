use std::io::{self, Write};

use crate::objects::{ObjId, PdfObject};

/// Low-level PDF serializer. Writes indirect objects to any `Write`
/// target while tracking byte offsets for the xref table.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    xref_entries: Vec<(u32, usize)>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            xref_entries: Vec::new(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// PDF 1.7 header plus the binary-detection comment line.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_str("%PDF-1.7\n")?;
        self.write_bytes(b"%\xe2\xe3\xcf\xd3\n")
    }

    /// Write an indirect object, recording its offset for the xref.
    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.xref_entries.push((id.0, self.offset));
        self.write_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.write_pdf_object(obj)?;
        self.write_str("\nendobj\n")
    }

    fn write_pdf_object(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Integer(n) => self.write_str(&n.to_string()),
            PdfObject::Real(f) => self.write_str(&format_real(*f)),
            PdfObject::Name(name) => {
                self.write_str("/")?;
                self.write_str(name)
            }
            PdfObject::LiteralString(s) => {
                self.write_str("(")?;
                self.write_str(&escape_pdf_string(s))?;
                self.write_str(")")
            }
            PdfObject::Array(items) => {
                self.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write_str(" ")?;
                    }
                    self.write_pdf_object(item)?;
                }
                self.write_str("]")
            }
            PdfObject::Dictionary(entries) => {
                self.write_str("<<")?;
                for (key, val) in entries {
                    self.write_str(" /")?;
                    self.write_str(key)?;
                    self.write_str(" ")?;
                    self.write_pdf_object(val)?;
                }
                self.write_str(" >>")
            }
            PdfObject::Stream { dict, data } => {
                self.write_str("<<")?;
                for (key, val) in dict {
                    self.write_str(" /")?;
                    self.write_str(key)?;
                    self.write_str(" ")?;
                    self.write_pdf_object(val)?;
                }
                self.write_str(&format!(" /Length {} >>\nstream\n", data.len()))?;
                self.write_bytes(data)?;
                self.write_str("\nendstream")
            }
            PdfObject::Reference(id) => self.write_str(&format!("{} {} R", id.0, id.1)),
        }
    }

    /// Write xref table, trailer, startxref, and %%EOF.
    pub fn write_xref_and_trailer(
        &mut self,
        root_id: ObjId,
        info_id: Option<ObjId>,
    ) -> io::Result<()> {
        let xref_offset = self.offset;
        self.xref_entries.sort_by_key(|&(num, _)| num);

        let max_obj = self.xref_entries.last().map(|&(num, _)| num).unwrap_or(0);
        let size = max_obj + 1;

        self.write_str("xref\n")?;
        self.write_str(&format!("0 {}\n", size))?;
        // Object 0: free entry head. Every entry is exactly 20 bytes.
        self.write_bytes(b"0000000000 65535 f\r\n")?;

        let mut offset_map = std::collections::HashMap::new();
        for &(num, off) in &self.xref_entries {
            offset_map.insert(num, off);
        }
        for obj_num in 1..size {
            if let Some(&off) = offset_map.get(&obj_num) {
                self.write_bytes(format!("{:010} {:05} n\r\n", off, 0).as_bytes())?;
            } else {
                self.write_bytes(b"0000000000 00000 f\r\n")?;
            }
        }

        self.write_str("trailer\n")?;
        self.write_str(&format!("<< /Size {} /Root {} {} R", size, root_id.0, root_id.1))?;
        if let Some(info) = info_id {
            self.write_str(&format!(" /Info {} {} R", info.0, info.1))?;
        }
        self.write_str(" >>\n")?;
        self.write_str(&format!("startxref\n{}\n%%EOF\n", xref_offset))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Escape special characters in a PDF literal string.
pub fn escape_pdf_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a float for PDF output: no trailing zeros, no scientific
/// notation.
pub(crate) fn format_real(f: f64) -> String {
    if f == f.floor() && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        let s = format!("{:.6}", f);
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}

/// Format a coordinate for content streams (shorter than object reals).
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_bytes() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        let output = String::from_utf8_lossy(&buf);
        assert!(output.starts_with("%PDF-1.7\n"));
        // Binary comment bytes >= 128.
        assert!(buf[10] >= 128);
        assert!(buf[13] >= 128);
    }

    #[test]
    fn write_dictionary() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::reference(2)),
        ]);
        w.write_object(ObjId(1, 0), &obj).unwrap();
        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("1 0 obj"));
        assert!(output.contains("<< /Type /Catalog /Pages 2 0 R >>"));
        assert!(output.contains("endobj"));
    }

    #[test]
    fn write_stream_with_length() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        let obj = PdfObject::stream(vec![], b"BT /F1 12 Tf ET".to_vec());
        w.write_object(ObjId(4, 0), &obj).unwrap();
        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("/Length 15"));
        assert!(output.contains("stream\n"));
        assert!(output.contains("\nendstream"));
    }

    #[test]
    fn literal_string_is_escaped() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        let obj = PdfObject::literal_string("a(b)c\\d");
        w.write_object(ObjId(1, 0), &obj).unwrap();
        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("(a\\(b\\)c\\\\d)"));
    }

    #[test]
    fn xref_entries_are_20_bytes() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("Catalog")).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();

        let marker = b"xref\n";
        let pos = buf.windows(marker.len()).position(|w| w == marker).unwrap();
        let entries = &buf[pos + b"xref\n0 2\n".len()..];
        assert_eq!(entries[18], b'\r');
        assert_eq!(entries[19], b'\n');
        assert_eq!(entries[38], b'\r');
        assert_eq!(entries[39], b'\n');
    }

    #[test]
    fn trailer_has_required_keys() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("Catalog")).unwrap();
        let info = PdfObject::dict(vec![("Creator", PdfObject::literal_string("test"))]);
        w.write_object(ObjId(2, 0), &info).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), Some(ObjId(2, 0))).unwrap();

        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("/Size 3"));
        assert!(output.contains("/Root 1 0 R"));
        assert!(output.contains("/Info 2 0 R"));
        assert!(output.ends_with("%%EOF\n"));
    }

    #[test]
    fn format_real_values() {
        assert_eq!(format_real(612.0), "612.0");
        assert_eq!(format_real(12.5), "12.5");
        assert_eq!(format_coord(72.0), "72");
        assert_eq!(format_coord(10.25), "10.25");
    }
}
