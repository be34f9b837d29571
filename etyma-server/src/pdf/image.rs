//! Raster images for embedding
//!
//! JPEG data passes through untouched (DCTDecode). PNG image data is
//! already a zlib stream of predictor-tagged rows, so the concatenated
//! IDAT chunks embed directly with FlateDecode and predictor 15.

use super::PdfError;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Dct,
    FlatePng,
}

/// Image ready to become a PDF XObject
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub components: u8,
    pub encoding: ImageEncoding,
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    /// Detect the format and read the image header
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PdfError> {
        match infer::get(&bytes).map(|kind| kind.mime_type()) {
            Some("image/jpeg") => Self::from_jpeg(bytes),
            Some("image/png") => Self::from_png(&bytes),
            Some(other) => Err(PdfError::UnsupportedImage(other.to_string())),
            None => Err(PdfError::UnsupportedImage("unknown".to_string())),
        }
    }

    pub fn colour_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn from_jpeg(bytes: Vec<u8>) -> Result<Self, PdfError> {
        let malformed = || PdfError::MalformedImage("truncated JPEG header".to_string());
        let mut pos = 2;

        loop {
            // Markers may be preceded by any number of 0xFF fill bytes
            while bytes.get(pos) == Some(&0xFF) && bytes.get(pos + 1) == Some(&0xFF) {
                pos += 1;
            }
            if bytes.get(pos) != Some(&0xFF) {
                return Err(malformed());
            }
            let marker = *bytes.get(pos + 1).ok_or_else(malformed)?;

            if marker == 0x01 || (0xD0..=0xD8).contains(&marker) {
                pos += 2;
                continue;
            }
            if marker == 0xD9 || marker == 0xDA {
                return Err(PdfError::MalformedImage(
                    "JPEG has no frame header".to_string(),
                ));
            }

            let length = read_u16(&bytes, pos + 2).ok_or_else(malformed)? as usize;
            let is_frame = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
            if is_frame {
                let precision = *bytes.get(pos + 4).ok_or_else(malformed)?;
                let height = read_u16(&bytes, pos + 5).ok_or_else(malformed)?;
                let width = read_u16(&bytes, pos + 7).ok_or_else(malformed)?;
                let components = *bytes.get(pos + 9).ok_or_else(malformed)?;

                if precision != 8 {
                    return Err(PdfError::UnsupportedImage(format!(
                        "{}-bit JPEG",
                        precision
                    )));
                }
                if !matches!(components, 1 | 3 | 4) {
                    return Err(PdfError::UnsupportedImage(format!(
                        "JPEG with {} components",
                        components
                    )));
                }
                if width == 0 || height == 0 {
                    return Err(malformed());
                }

                return Ok(Self {
                    width: width as u32,
                    height: height as u32,
                    components,
                    encoding: ImageEncoding::Dct,
                    data: bytes,
                });
            }

            pos += 2 + length;
        }
    }

    fn from_png(bytes: &[u8]) -> Result<Self, PdfError> {
        if !bytes.starts_with(PNG_SIGNATURE) {
            return Err(PdfError::MalformedImage("bad PNG signature".to_string()));
        }

        let mut pos = PNG_SIGNATURE.len();
        let mut header = None;
        let mut data = Vec::new();

        while pos + 8 <= bytes.len() {
            let length = read_u32(bytes, pos)
                .ok_or_else(|| PdfError::MalformedImage("truncated PNG chunk".to_string()))?
                as usize;
            let kind = &bytes[pos + 4..pos + 8];
            let body = bytes
                .get(pos + 8..pos + 8 + length)
                .ok_or_else(|| PdfError::MalformedImage("truncated PNG chunk".to_string()))?;

            match kind {
                b"IHDR" => header = Some(PngHeader::parse(body)?),
                b"IDAT" => data.extend_from_slice(body),
                b"IEND" => break,
                _ => {}
            }

            // length + type + body + crc
            pos += 12 + length;
        }

        let header =
            header.ok_or_else(|| PdfError::MalformedImage("PNG without IHDR".to_string()))?;
        if data.is_empty() {
            return Err(PdfError::MalformedImage("PNG without image data".to_string()));
        }

        Ok(Self {
            width: header.width,
            height: header.height,
            components: header.components,
            encoding: ImageEncoding::FlatePng,
            data,
        })
    }
}

struct PngHeader {
    width: u32,
    height: u32,
    components: u8,
}

impl PngHeader {
    fn parse(body: &[u8]) -> Result<Self, PdfError> {
        if body.len() < 13 {
            return Err(PdfError::MalformedImage("short IHDR".to_string()));
        }
        let width = read_u32(body, 0).unwrap_or(0);
        let height = read_u32(body, 4).unwrap_or(0);
        let bit_depth = body[8];
        let colour_type = body[9];
        let interlace = body[12];

        let components = match colour_type {
            0 => 1,
            2 => 3,
            3 => return Err(PdfError::UnsupportedImage("palette PNG".to_string())),
            _ => return Err(PdfError::UnsupportedImage("PNG with alpha".to_string())),
        };
        if bit_depth != 8 {
            return Err(PdfError::UnsupportedImage(format!("{}-bit PNG", bit_depth)));
        }
        if interlace != 0 {
            return Err(PdfError::UnsupportedImage("interlaced PNG".to_string()));
        }
        if width == 0 || height == 0 {
            return Err(PdfError::MalformedImage("empty PNG".to_string()));
        }

        Ok(Self {
            width,
            height,
            components,
        })
    }
}

fn read_u16(bytes: &[u8], pos: usize) -> Option<u16> {
    let slice = bytes.get(pos..pos + 2)?;
    Some(u16::from_be_bytes([slice[0], slice[1]]))
}

fn read_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    let slice = bytes.get(pos..pos + 4)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest JPEG header the parser accepts: SOI, APP0, SOF0, EOI
    pub(crate) fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        bytes.extend_from_slice(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&[0x03, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    fn chunk(kind: &[u8], body: &[u8]) -> Vec<u8> {
        let mut out = (body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        // CRC is not checked
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    fn tiny_png(colour_type: u8, interlace: u8) -> Vec<u8> {
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&3u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, colour_type, 0, 0, interlace]);

        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend(chunk(b"IHDR", &ihdr));
        bytes.extend(chunk(b"IDAT", &[0x78, 0x9C]));
        bytes.extend(chunk(b"IDAT", &[0x01, 0x02]));
        bytes.extend(chunk(b"IEND", &[]));
        bytes
    }

    #[test]
    fn test_jpeg_header() {
        let image = EmbeddedImage::from_bytes(tiny_jpeg(640, 480)).unwrap();
        assert_eq!((image.width, image.height), (640, 480));
        assert_eq!(image.components, 3);
        assert_eq!(image.encoding, ImageEncoding::Dct);
        assert_eq!(image.colour_space(), "DeviceRGB");
        assert!((image.aspect_ratio() - 4.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_truncated_jpeg() {
        let bytes = tiny_jpeg(10, 10)[..24].to_vec();
        assert!(matches!(
            EmbeddedImage::from_bytes(bytes),
            Err(PdfError::MalformedImage(_))
        ));
    }

    #[test]
    fn test_png_header_and_data() {
        let image = EmbeddedImage::from_bytes(tiny_png(2, 0)).unwrap();
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(image.components, 3);
        assert_eq!(image.encoding, ImageEncoding::FlatePng);
        assert_eq!(image.data, vec![0x78, 0x9C, 0x01, 0x02]);
    }

    #[test]
    fn test_unsupported_png_variants() {
        assert!(matches!(
            EmbeddedImage::from_bytes(tiny_png(6, 0)),
            Err(PdfError::UnsupportedImage(_))
        ));
        assert!(matches!(
            EmbeddedImage::from_bytes(tiny_png(2, 1)),
            Err(PdfError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(
            EmbeddedImage::from_bytes(b"GIF89a....".to_vec()),
            Err(PdfError::UnsupportedImage(_))
        ));
        assert!(matches!(
            EmbeddedImage::from_bytes(vec![1, 2, 3]),
            Err(PdfError::UnsupportedImage(_))
        ));
    }
}
