/// Supported logo image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// PDF color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// A decoded logo image, ready for embedding.
///
/// JPEG data is kept as-is (DCTDecode); PNG is decoded to raw pixels
/// with an optional separate alpha channel.
pub struct Logo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    pub data: Vec<u8>,
    pub smask_data: Option<Vec<u8>>,
}

impl Logo {
    /// Decode logo bytes, detecting the format from magic bytes.
    pub fn decode(data: Vec<u8>) -> Result<Logo, String> {
        match detect_format(&data)? {
            ImageFormat::Jpeg => decode_jpeg(data),
            ImageFormat::Png => decode_png(data),
        }
    }

    /// Display size when scaled to the given width, preserving the
    /// aspect ratio.
    pub fn scaled_to_width(&self, width: f64) -> (f64, f64) {
        let scale = width / self.width as f64;
        (width, self.height as f64 * scale)
    }
}

fn detect_format(data: &[u8]) -> Result<ImageFormat, String> {
    if data.len() < 4 {
        return Err("image data too short to detect format".to_string());
    }
    if data[0] == 0xFF && data[1] == 0xD8 {
        Ok(ImageFormat::Jpeg)
    } else if data[0..4] == [0x89, 0x50, 0x4E, 0x47] {
        Ok(ImageFormat::Png)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

/// JPEG is embedded without decoding; only the SOF marker is parsed
/// for dimensions and component count.
fn decode_jpeg(data: Vec<u8>) -> Result<Logo, String> {
    let (width, height, components) = jpeg_dimensions(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        n => return Err(format!("unsupported JPEG component count: {}", n)),
    };
    Ok(Logo {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        bits_per_component: 8,
        data,
        smask_data: None,
    })
}

/// Scan for SOF0-SOF3 markers and extract width/height/components.
fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32, u8), String> {
    let len = data.len();
    let mut i = 0;
    while i + 1 < len {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        if (0xC0..=0xC3).contains(&marker) {
            if i + 9 >= len {
                return Err("JPEG SOF marker truncated".to_string());
            }
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Ok((width, height, data[i + 9]));
        }
        if marker == 0xFF || marker == 0x00 {
            i += 1;
            continue;
        }
        // Standalone markers carry no length field.
        if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        if i + 3 >= len {
            break;
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    Err("no SOF marker found in JPEG data".to_string())
}

fn decode_png(data: Vec<u8>) -> Result<Logo, String> {
    let decoder = png::Decoder::new(data.as_slice());
    let mut reader = decoder
        .read_info()
        .map_err(|e| format!("PNG decode error: {}", e))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| format!("PNG frame error: {}", e))?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width, info.height);
    let logo = |color_space, data, smask_data| Logo {
        width,
        height,
        format: ImageFormat::Png,
        color_space,
        bits_per_component: 8,
        data,
        smask_data,
    };

    match info.color_type {
        png::ColorType::Rgb => Ok(logo(ColorSpace::DeviceRGB, buf, None)),
        png::ColorType::Rgba => {
            let pixels = (width * height) as usize;
            let mut rgb = Vec::with_capacity(pixels * 3);
            let mut alpha = Vec::with_capacity(pixels);
            for chunk in buf.chunks_exact(4) {
                rgb.extend_from_slice(&chunk[..3]);
                alpha.push(chunk[3]);
            }
            Ok(logo(ColorSpace::DeviceRGB, rgb, Some(alpha)))
        }
        png::ColorType::Grayscale => Ok(logo(ColorSpace::DeviceGray, buf, None)),
        png::ColorType::GrayscaleAlpha => {
            let pixels = (width * height) as usize;
            let mut gray = Vec::with_capacity(pixels);
            let mut alpha = Vec::with_capacity(pixels);
            for chunk in buf.chunks_exact(2) {
                gray.push(chunk[0]);
                alpha.push(chunk[1]);
            }
            Ok(logo(ColorSpace::DeviceGray, gray, Some(alpha)))
        }
        other => Err(format!("unsupported PNG color type: {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jpeg_magic() {
        let data = vec![0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn detects_png_magic() {
        let data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn rejects_unknown_magic() {
        assert!(detect_format(&[0x00, 0x01, 0x02, 0x03]).is_err());
        assert!(detect_format(&[0xFF]).is_err());
    }

    #[test]
    fn jpeg_sof_dimensions() {
        // Minimal SOI + SOF0 segment: 100x50, 3 components.
        let mut data = vec![0xFF, 0xD8];
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x32, 0x00, 0x64, 0x03]);
        let (w, h, c) = jpeg_dimensions(&data).unwrap();
        assert_eq!((w, h, c), (100, 50, 3));
    }

    #[test]
    fn scaled_to_width_keeps_aspect() {
        let logo = Logo {
            width: 200,
            height: 100,
            format: ImageFormat::Jpeg,
            color_space: ColorSpace::DeviceRGB,
            bits_per_component: 8,
            data: Vec::new(),
            smask_data: None,
        };
        let (w, h) = logo.scaled_to_width(50.0);
        assert!((w - 50.0).abs() < 1e-9);
        assert!((h - 25.0).abs() < 1e-9);
    }
}
