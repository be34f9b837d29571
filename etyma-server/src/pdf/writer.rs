//! Minimal PDF 1.4 document writer
//!
//! Supports what the poster needs: filled and stroked rectangles, lines,
//! text in the three standard Helvetica faces, clipping, and embedded
//! raster images. Text is WinAnsi-encoded and written as hex strings so no
//! escaping is required.

use super::image::{EmbeddedImage, ImageEncoding};
use etyma_common::Rgb;
use std::fmt::Write as _;

/// Standard Type 1 faces available without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }
}

/// Characters outside WinAnsi that have a readable ASCII stand-in.
/// Mostly IPA, which shows up in pronunciations.
fn transliterate(ch: char) -> Option<&'static str> {
    Some(match ch {
        'ˈ' | 'ʼ' => "'",
        'ˌ' => ",",
        'ː' => ":",
        'ə' | 'ɛ' | 'ɘ' => "e",
        'ɪ' => "I",
        'ʊ' => "U",
        'ɔ' | 'ɒ' => "o",
        'ɑ' | 'ɐ' => "a",
        'ʌ' => "^",
        'ɜ' => "3",
        'ʃ' => "sh",
        'ʒ' => "zh",
        'θ' => "th",
        'ŋ' => "ng",
        'ɹ' | 'ɾ' | 'ʁ' => "r",
        'ʔ' => "?",
        'ɡ' => "g",
        'ʎ' => "ly",
        'ɲ' => "ny",
        'χ' => "kh",
        '→' => "->",
        '←' => "<-",
        '₀' => "0",
        '₁' => "1",
        '₂' => "2",
        '₃' => "3",
        _ => return None,
    })
}

/// WinAnsi code points 0x80..0x9F that differ from Latin-1
fn win_ansi_high(ch: char) -> Option<u8> {
    Some(match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    })
}

/// Encode text for a WinAnsiEncoding font
///
/// Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = ch as u32;
        if (0x20..0x7F).contains(&code) || (0xA0..=0xFF).contains(&code) {
            out.push(code as u8);
        } else if let Some(byte) = win_ansi_high(ch) {
            out.push(byte);
        } else if let Some(ascii) = transliterate(ch) {
            out.extend_from_slice(ascii.as_bytes());
        } else if ch.is_whitespace() {
            out.push(b' ');
        } else if !ch.is_control() {
            out.push(b'?');
        }
    }
    out
}

/// Format a coordinate without trailing zeros
fn num(value: f32) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn colour(rgb: Rgb) -> String {
    let (r, g, b) = rgb.unit();
    format!("{} {} {}", num(r), num(g), num(b))
}

/// Page content operators
///
/// Coordinates are PDF user space: origin bottom-left, y up.
#[derive(Debug, Default, Clone)]
pub struct ContentStream {
    ops: String,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgb) {
        let _ = writeln!(
            self.ops,
            "{} rg {} {} {} {} re f",
            colour(fill),
            num(x),
            num(y),
            num(width),
            num(height)
        );
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, stroke: Rgb, line_width: f32) {
        let _ = writeln!(
            self.ops,
            "{} RG {} w {} {} {} {} re S",
            colour(stroke),
            num(line_width),
            num(x),
            num(y),
            num(width),
            num(height)
        );
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Rgb, line_width: f32) {
        let _ = writeln!(
            self.ops,
            "{} RG {} w {} {} m {} {} l S",
            colour(stroke),
            num(line_width),
            num(from.0),
            num(from.1),
            num(to.0),
            num(to.1)
        );
    }

    /// Draw a single line of text with its baseline starting at (x, y)
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        font: Font,
        size: f32,
        char_spacing: f32,
        fill: Rgb,
        x: f32,
        y: f32,
        text: &str,
    ) {
        let encoded = encode_win_ansi(text);
        if encoded.is_empty() {
            return;
        }
        let _ = writeln!(
            self.ops,
            "BT /{} {} Tf {} Tc {} rg {} {} Td <{}> Tj ET",
            font.resource_name(),
            num(size),
            num(char_spacing),
            colour(fill),
            num(x),
            num(y),
            hex::encode_upper(encoded)
        );
    }

    pub fn save(&mut self) {
        self.ops.push_str("q\n");
    }

    pub fn restore(&mut self) {
        self.ops.push_str("Q\n");
    }

    /// Intersect the clipping path with a rectangle until the next restore
    pub fn clip_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let _ = writeln!(self.ops, "{} {} {} {} re W n", num(x), num(y), num(width), num(height));
    }

    /// Paint a registered image scaled into the given box
    pub fn image(&mut self, resource: &str, x: f32, y: f32, width: f32, height: f32) {
        let _ = writeln!(
            self.ops,
            "q {} 0 0 {} {} {} cm /{} Do Q",
            num(width),
            num(height),
            num(x),
            num(y),
            resource
        );
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.ops.as_bytes()
    }
}

/// A PDF document under construction
#[derive(Debug)]
pub struct PdfDocument {
    width: f32,
    height: f32,
    title: String,
    images: Vec<EmbeddedImage>,
    pages: Vec<ContentStream>,
}

impl PdfDocument {
    pub fn new(width: f32, height: f32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            images: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Register an image, returning the resource name to draw it with
    pub fn add_image(&mut self, image: EmbeddedImage) -> String {
        self.images.push(image);
        format!("Im{}", self.images.len())
    }

    pub fn add_page(&mut self, content: ContentStream) {
        self.pages.push(content);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the document
    pub fn to_bytes(&self) -> Vec<u8> {
        // Object numbering: 1 catalog, 2 page tree, 3 info, fonts, images,
        // then a (page, contents) pair per page.
        let font_base = 4;
        let image_base = font_base + Font::ALL.len();
        let page_base = image_base + self.images.len();
        let page_id = |index: usize| page_base + index * 2;

        let mut objects: Vec<Vec<u8>> = Vec::new();

        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids = (0..self.pages.len())
            .map(|i| format!("{} 0 R", page_id(i)))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push(format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, self.pages.len()).into_bytes());

        objects.push(
            format!(
                "<< /Producer <{}> /Title <{}> >>",
                hex::encode_upper(encode_win_ansi("Etyma")),
                hex::encode_upper(encode_win_ansi(&self.title))
            )
            .into_bytes(),
        );

        for font in Font::ALL {
            objects.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .into_bytes(),
            );
        }

        for image in &self.images {
            objects.push(image_object(image));
        }

        let font_resources = Font::ALL
            .iter()
            .enumerate()
            .map(|(i, font)| format!("/{} {} 0 R", font.resource_name(), font_base + i))
            .collect::<Vec<_>>()
            .join(" ");
        let image_resources = (0..self.images.len())
            .map(|i| format!("/Im{} {} 0 R", i + 1, image_base + i))
            .collect::<Vec<_>>()
            .join(" ");

        for (index, page) in self.pages.iter().enumerate() {
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << {} >> /XObject << {} >> >> /Contents {} 0 R >>",
                    num(self.width),
                    num(self.height),
                    font_resources,
                    image_resources,
                    page_id(index) + 1
                )
                .into_bytes(),
            );
            objects.push(stream_object("", page.as_bytes()));
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R /Info 3 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

fn stream_object(dictionary_entries: &str, data: &[u8]) -> Vec<u8> {
    let mut out = format!("<< {}/Length {} >>\nstream\n", dictionary_entries, data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

fn image_object(image: &EmbeddedImage) -> Vec<u8> {
    let filter = match image.encoding {
        ImageEncoding::Dct => "/Filter /DCTDecode ".to_string(),
        ImageEncoding::FlatePng => format!(
            "/Filter /FlateDecode /DecodeParms << /Predictor 15 /Colors {} /BitsPerComponent 8 /Columns {} >> ",
            image.components, image.width
        ),
    };
    let dictionary = format!(
        "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /{} /BitsPerComponent 8 {}",
        image.width,
        image.height,
        image.colour_space(),
        filter
    );
    stream_object(&dictionary, &image.data)
}
