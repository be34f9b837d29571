//! A2 name poster layout
//!
//! Layout runs top-down in "page top" coordinates (distance from the top
//! edge) and converts to PDF user space only when drawing. Sections are
//! measured before they are painted so their tinted panels fit the text.
//! A section that would run into the footer is dropped rather than
//! clipped.

use super::image::EmbeddedImage;
use super::metrics::{text_width, truncate_to_width, wrap_text};
use super::writer::{ContentStream, Font, PdfDocument};
use super::PdfError;
use etyma_common::{ColourPalette, NameAnalysis, Rgb};
use tracing::{debug, warn};

pub const PAGE_WIDTH: f32 = 1191.0;
pub const PAGE_HEIGHT: f32 = 1684.0;

const PADDING: f32 = 80.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * PADDING;

const NAME_SIZE: f32 = 120.0;
const NAME_SPACING: f32 = 12.0;
const SUBTITLE: &str = "Word Anatomy by Etyma";

const ART_HEIGHT: f32 = 500.0;
const ART_MARGIN: f32 = 40.0;

const SECTION_PADDING: f32 = 30.0;
const SECTION_GAP: f32 = 30.0;
const SECTION_INNER_WIDTH: f32 = CONTENT_WIDTH - 2.0 * SECTION_PADDING;

const BODY_SIZE: f32 = 16.0;
const BODY_LEADING: f32 = 1.6;
const BODY_OPACITY: f32 = 0.7;

const MAX_COGNATES: usize = 6;

const FOOTER_TEXT_SIZE: f32 = 12.0;
const FOOTER_PADDING: f32 = 20.0;

/// Hex alpha suffixes used for the accent tints
const TINT_STRONG: f32 = 0x11 as f32 / 255.0;
const TINT_LIGHT: f32 = 0x08 as f32 / 255.0;
const TINT_BOX: f32 = 0x15 as f32 / 255.0;
const TINT_BORDER: f32 = 0x44 as f32 / 255.0;
const TINT_RULE: f32 = 0x22 as f32 / 255.0;

/// Download filename for a poster, e.g. `etyma-luna.pdf`
pub fn poster_filename(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "etyma-poster.pdf".to_string()
    } else {
        format!("etyma-{}.pdf", slug)
    }
}

#[derive(Debug, Clone, Copy)]
struct Theme {
    bg: Rgb,
    text: Rgb,
    accent: Rgb,
}

impl Theme {
    fn new(palette: ColourPalette) -> Result<Self, PdfError> {
        let spec = palette.spec();
        Ok(Self {
            bg: Rgb::from_hex(spec.bg)?,
            text: Rgb::from_hex(spec.text)?,
            accent: Rgb::from_hex(spec.accent)?,
        })
    }

    /// Text colour at the given opacity over `base`
    fn faded(&self, base: Rgb, opacity: f32) -> Rgb {
        base.blend(self.text, opacity)
    }
}

/// Baseline for a line box whose top edge is at `top`
fn baseline(top: f32, size: f32, line_height: f32) -> f32 {
    top + (line_height - size) / 2.0 + size * 0.78
}

/// PDF y coordinate for a distance from the page top
fn y(top: f32) -> f32 {
    PAGE_HEIGHT - top
}

/// Position items left to right, wrapping to new rows at `max_width`.
/// Returns (x offset, row index) per item.
fn flow(widths: &[f32], gap: f32, max_width: f32) -> Vec<(f32, usize)> {
    let mut placed = Vec::with_capacity(widths.len());
    let mut x = 0.0;
    let mut row = 0;
    for &width in widths {
        if x > 0.0 && x + width > max_width {
            x = 0.0;
            row += 1;
        }
        placed.push((x, row));
        x += width + gap;
    }
    placed
}

fn row_count(placed: &[(f32, usize)]) -> usize {
    placed.last().map(|&(_, row)| row + 1).unwrap_or(0)
}

/// Measured piece of section content
enum Block {
    Text {
        lines: Vec<String>,
        font: Font,
        size: f32,
        leading: f32,
        spacing: f32,
        colour: Rgb,
        gap_before: f32,
    },
    /// Outlined language tags
    Pills { labels: Vec<String>, gap_before: f32 },
    /// Morpheme part over its upper-cased type
    Morphemes { items: Vec<(String, String)> },
}

const PILL_SIZE: f32 = 11.0;
const PILL_PAD_X: f32 = 12.0;
const PILL_PAD_Y: f32 = 4.0;
const PILL_GAP: f32 = 8.0;
const PILL_HEIGHT: f32 = PILL_SIZE * 1.2 + 2.0 * PILL_PAD_Y;

const MORPHEME_PART_SIZE: f32 = 28.0;
const MORPHEME_KIND_SIZE: f32 = 10.0;
const MORPHEME_KIND_SPACING: f32 = 4.0;
const MORPHEME_PAD: f32 = 16.0;
const MORPHEME_GAP: f32 = 16.0;
const MORPHEME_HEIGHT: f32 =
    2.0 * MORPHEME_PAD + MORPHEME_PART_SIZE * 1.2 + 4.0 + MORPHEME_KIND_SIZE * 1.2;

impl Block {
    fn body(text: &str, colour: Rgb, gap_before: f32) -> Self {
        Self::wrapped(text, Font::Regular, colour, gap_before)
    }

    fn wrapped(text: &str, font: Font, colour: Rgb, gap_before: f32) -> Self {
        Block::Text {
            lines: wrap_text(text, font, BODY_SIZE, 0.0, SECTION_INNER_WIDTH),
            font,
            size: BODY_SIZE,
            leading: BODY_LEADING,
            spacing: 0.0,
            colour,
            gap_before,
        }
    }

    fn pill_widths(labels: &[String]) -> Vec<f32> {
        labels
            .iter()
            .map(|label| text_width(label, Font::Regular, PILL_SIZE, 0.0) + 2.0 * PILL_PAD_X)
            .collect()
    }

    fn morpheme_widths(items: &[(String, String)]) -> Vec<f32> {
        items
            .iter()
            .map(|(part, kind)| {
                let part_width = text_width(part, Font::Regular, MORPHEME_PART_SIZE, 0.0);
                let kind_width = text_width(
                    kind,
                    Font::Regular,
                    MORPHEME_KIND_SIZE,
                    MORPHEME_KIND_SPACING,
                );
                part_width.max(kind_width) + 2.0 * MORPHEME_PAD
            })
            .collect()
    }

    fn height(&self) -> f32 {
        match self {
            Block::Text {
                lines,
                size,
                leading,
                gap_before,
                ..
            } => {
                if lines.is_empty() {
                    0.0
                } else {
                    gap_before + lines.len() as f32 * size * leading
                }
            }
            Block::Pills { labels, gap_before } => {
                let rows = row_count(&flow(&Self::pill_widths(labels), PILL_GAP, SECTION_INNER_WIDTH));
                if rows == 0 {
                    0.0
                } else {
                    gap_before + rows as f32 * PILL_HEIGHT + (rows - 1) as f32 * PILL_GAP
                }
            }
            Block::Morphemes { items } => {
                let rows =
                    row_count(&flow(&Self::morpheme_widths(items), MORPHEME_GAP, SECTION_INNER_WIDTH));
                if rows == 0 {
                    0.0
                } else {
                    // Trailing margin separates the boxes from the journey text
                    rows as f32 * (MORPHEME_HEIGHT + MORPHEME_GAP)
                }
            }
        }
    }

    fn draw(&self, content: &mut ContentStream, theme: &Theme, panel: Rgb, left: f32, top: f32) {
        match self {
            Block::Text {
                lines,
                font,
                size,
                leading,
                spacing,
                colour,
                gap_before,
            } => {
                let line_height = size * leading;
                let mut line_top = top + gap_before;
                for line in lines {
                    let base = baseline(line_top, *size, line_height);
                    content.text(*font, *size, *spacing, *colour, left, y(base), line);
                    line_top += line_height;
                }
            }
            Block::Pills { labels, gap_before } => {
                let widths = Self::pill_widths(labels);
                let border = panel.blend(theme.accent, TINT_BORDER);
                for ((label, width), (x, row)) in labels
                    .iter()
                    .zip(&widths)
                    .zip(flow(&widths, PILL_GAP, SECTION_INNER_WIDTH))
                {
                    let pill_top = top + gap_before + row as f32 * (PILL_HEIGHT + PILL_GAP);
                    content.stroke_rect(left + x, y(pill_top + PILL_HEIGHT), *width, PILL_HEIGHT, border, 1.0);
                    let base = baseline(pill_top + PILL_PAD_Y, PILL_SIZE, PILL_SIZE * 1.2);
                    content.text(Font::Regular, PILL_SIZE, 0.0, theme.accent, left + x + PILL_PAD_X, y(base), label);
                }
            }
            Block::Morphemes { items } => {
                let widths = Self::morpheme_widths(items);
                let fill = panel.blend(theme.accent, TINT_BOX);
                let kind_colour = theme.faded(fill, 0.5);
                for (((part, kind), width), (x, row)) in items
                    .iter()
                    .zip(&widths)
                    .zip(flow(&widths, MORPHEME_GAP, SECTION_INNER_WIDTH))
                {
                    let box_left = left + x;
                    let box_top = top + row as f32 * (MORPHEME_HEIGHT + MORPHEME_GAP);
                    content.fill_rect(box_left, y(box_top + MORPHEME_HEIGHT), *width, MORPHEME_HEIGHT, fill);

                    let centre = |text_w: f32| box_left + (width - text_w) / 2.0;

                    let part_width = text_width(part, Font::Regular, MORPHEME_PART_SIZE, 0.0);
                    let part_top = box_top + MORPHEME_PAD;
                    let base = baseline(part_top, MORPHEME_PART_SIZE, MORPHEME_PART_SIZE * 1.2);
                    content.text(Font::Regular, MORPHEME_PART_SIZE, 0.0, theme.accent, centre(part_width), y(base), part);

                    let kind_width = text_width(kind, Font::Regular, MORPHEME_KIND_SIZE, MORPHEME_KIND_SPACING);
                    let kind_top = part_top + MORPHEME_PART_SIZE * 1.2 + 4.0;
                    let base = baseline(kind_top, MORPHEME_KIND_SIZE, MORPHEME_KIND_SIZE * 1.2);
                    content.text(
                        Font::Regular,
                        MORPHEME_KIND_SIZE,
                        MORPHEME_KIND_SPACING,
                        kind_colour,
                        centre(kind_width),
                        y(base),
                        kind,
                    );
                }
            }
        }
    }
}

/// Titled panel of blocks
struct Section {
    title: &'static str,
    tint: f32,
    blocks: Vec<Block>,
}

const TITLE_SIZE: f32 = 12.0;
const TITLE_SPACING: f32 = 6.0;
const TITLE_GAP: f32 = 12.0;

impl Section {
    fn height(&self) -> f32 {
        2.0 * SECTION_PADDING
            + TITLE_SIZE * 1.2
            + TITLE_GAP
            + self.blocks.iter().map(Block::height).sum::<f32>()
    }

    fn draw(&self, content: &mut ContentStream, theme: &Theme, top: f32) {
        let panel = theme.bg.blend(theme.accent, self.tint);
        let height = self.height();
        content.fill_rect(PADDING, y(top + height), CONTENT_WIDTH, height, panel);

        let left = PADDING + SECTION_PADDING;
        let mut cursor = top + SECTION_PADDING;
        let base = baseline(cursor, TITLE_SIZE, TITLE_SIZE * 1.2);
        content.text(
            Font::Bold,
            TITLE_SIZE,
            TITLE_SPACING,
            theme.accent,
            left,
            y(base),
            &self.title.to_uppercase(),
        );
        cursor += TITLE_SIZE * 1.2 + TITLE_GAP;

        for block in &self.blocks {
            block.draw(content, theme, panel, left, cursor);
            cursor += block.height();
        }
    }
}

fn etymology_section(analysis: &NameAnalysis, theme: &Theme) -> Section {
    let panel = theme.bg.blend(theme.accent, TINT_STRONG);
    let body = theme.faded(panel, BODY_OPACITY);
    let etymology = &analysis.etymology;
    let origin = format!(
        "From {}, \"{}\", meaning \"{}\"",
        etymology.origin_language, etymology.root_word, etymology.meaning
    );

    Section {
        title: "Etymology",
        tint: TINT_STRONG,
        blocks: vec![
            Block::body(&origin, body, 0.0),
            Block::body(&etymology.cultural_significance, body, 8.0),
            Block::Pills {
                labels: etymology
                    .language_family_tree
                    .iter()
                    .map(|label| {
                        truncate_to_width(
                            label,
                            Font::Regular,
                            PILL_SIZE,
                            0.0,
                            SECTION_INNER_WIDTH - 2.0 * PILL_PAD_X,
                        )
                    })
                    .collect(),
                gap_before: 12.0,
            },
        ],
    }
}

fn phonetics_section(analysis: &NameAnalysis, theme: &Theme) -> Section {
    let panel = theme.bg.blend(theme.accent, TINT_LIGHT);
    let body = theme.faded(panel, BODY_OPACITY);
    let phonetics = &analysis.phonetics;

    let ipa = Block::Text {
        lines: wrap_text(&phonetics.ipa, Font::Regular, 48.0, 0.0, SECTION_INNER_WIDTH),
        font: Font::Regular,
        size: 48.0,
        leading: 1.2,
        spacing: 0.0,
        colour: theme.accent,
        gap_before: 0.0,
    };

    Section {
        title: "Phonetics",
        tint: TINT_LIGHT,
        blocks: vec![
            ipa,
            Block::body(&phonetics.stress_pattern, body, 8.0),
            Block::wrapped(&phonetics.phonosemantic, Font::Oblique, body, 8.0),
        ],
    }
}

fn morphology_section(analysis: &NameAnalysis, theme: &Theme) -> Section {
    let panel = theme.bg.blend(theme.accent, TINT_STRONG);
    let body = theme.faded(panel, BODY_OPACITY);
    let morphology = &analysis.morphology;

    Section {
        title: "Morphology",
        tint: TINT_STRONG,
        blocks: vec![
            Block::Morphemes {
                items: morphology
                    .morphemes
                    .iter()
                    .map(|m| {
                        let max = SECTION_INNER_WIDTH - 2.0 * MORPHEME_PAD;
                        (
                            truncate_to_width(&m.part, Font::Regular, MORPHEME_PART_SIZE, 0.0, max),
                            truncate_to_width(
                                &m.kind.to_uppercase(),
                                Font::Regular,
                                MORPHEME_KIND_SIZE,
                                MORPHEME_KIND_SPACING,
                                max,
                            ),
                        )
                    })
                    .collect(),
            },
            Block::body(&morphology.grammatical_journey, body, 0.0),
        ],
    }
}

const COGNATE_LANG_SIZE: f32 = 9.0;
const COGNATE_LANG_SPACING: f32 = 3.0;
const COGNATE_WORD_SIZE: f32 = 16.0;
const COGNATE_GAP: f32 = 24.0;
const COGNATE_HEIGHT: f32 = COGNATE_LANG_SIZE * 1.2 + 2.0 + COGNATE_WORD_SIZE * 1.2;
const COGNATE_MARGIN: f32 = 16.0;

struct CognateRow {
    items: Vec<(String, String)>,
}

impl CognateRow {
    fn new(analysis: &NameAnalysis) -> Self {
        Self {
            items: analysis
                .cross_linguistic
                .cognates
                .iter()
                .take(MAX_COGNATES)
                .map(|c| {
                    (
                        truncate_to_width(
                            &c.language.to_uppercase(),
                            Font::Regular,
                            COGNATE_LANG_SIZE,
                            COGNATE_LANG_SPACING,
                            CONTENT_WIDTH,
                        ),
                        truncate_to_width(&c.word, Font::Regular, COGNATE_WORD_SIZE, 0.0, CONTENT_WIDTH),
                    )
                })
                .collect(),
        }
    }

    fn widths(&self) -> Vec<f32> {
        self.items
            .iter()
            .map(|(language, word)| {
                text_width(language, Font::Regular, COGNATE_LANG_SIZE, COGNATE_LANG_SPACING)
                    .max(text_width(word, Font::Regular, COGNATE_WORD_SIZE, 0.0))
            })
            .collect()
    }

    fn height(&self) -> f32 {
        let rows = row_count(&flow(&self.widths(), COGNATE_GAP, CONTENT_WIDTH));
        if rows == 0 {
            0.0
        } else {
            COGNATE_MARGIN + rows as f32 * COGNATE_HEIGHT + (rows - 1) as f32 * 12.0
        }
    }

    fn draw(&self, content: &mut ContentStream, theme: &Theme, top: f32) {
        let language_colour = theme.faded(theme.bg, 0.4);
        let widths = self.widths();
        for ((language, word), (x, row)) in self
            .items
            .iter()
            .zip(flow(&widths, COGNATE_GAP, CONTENT_WIDTH))
        {
            let item_top = top + COGNATE_MARGIN + row as f32 * (COGNATE_HEIGHT + 12.0);
            let base = baseline(item_top, COGNATE_LANG_SIZE, COGNATE_LANG_SIZE * 1.2);
            content.text(
                Font::Regular,
                COGNATE_LANG_SIZE,
                COGNATE_LANG_SPACING,
                language_colour,
                PADDING + x,
                y(base),
                language,
            );
            let word_top = item_top + COGNATE_LANG_SIZE * 1.2 + 2.0;
            let base = baseline(word_top, COGNATE_WORD_SIZE, COGNATE_WORD_SIZE * 1.2);
            content.text(Font::Regular, COGNATE_WORD_SIZE, 0.0, theme.accent, PADDING + x, y(base), word);
        }
    }
}

/// Largest name size up to 120pt that fits on one line, with its
/// letter spacing scaled to match
fn fit_name(name: &str) -> (f32, f32) {
    let width = text_width(name, Font::Bold, NAME_SIZE, NAME_SPACING);
    if width <= CONTENT_WIDTH {
        return (NAME_SIZE, NAME_SPACING);
    }
    let scale = CONTENT_WIDTH / width;
    (NAME_SIZE * scale, NAME_SPACING * scale)
}

fn draw_header(content: &mut ContentStream, analysis: &NameAnalysis, theme: &Theme) -> f32 {
    let name = analysis.name.to_uppercase();
    let (size, spacing) = fit_name(&name);
    let mut top = PADDING;

    let base = baseline(top, size, size * 1.2);
    content.text(Font::Bold, size, spacing, theme.accent, PADDING, y(base), &name);
    top += size * 1.2 + 8.0;

    let base = baseline(top, 14.0, 14.0 * 1.2);
    content.text(
        Font::Regular,
        14.0,
        8.0,
        theme.faded(theme.bg, 0.4),
        PADDING,
        y(base),
        &SUBTITLE.to_uppercase(),
    );
    top + 14.0 * 1.2 + 40.0
}

/// Scale the art to cover the panel, centred and clipped
fn draw_art(content: &mut ContentStream, resource: &str, aspect_ratio: f32, top: f32) {
    let panel_ratio = CONTENT_WIDTH / ART_HEIGHT;
    let (width, height) = if aspect_ratio > panel_ratio {
        (ART_HEIGHT * aspect_ratio, ART_HEIGHT)
    } else {
        (CONTENT_WIDTH, CONTENT_WIDTH / aspect_ratio)
    };
    let x = PADDING + (CONTENT_WIDTH - width) / 2.0;
    let image_top = top + (ART_HEIGHT - height) / 2.0;

    content.save();
    content.clip_rect(PADDING, y(top + ART_HEIGHT), CONTENT_WIDTH, ART_HEIGHT);
    content.image(resource, x, y(image_top + height), width, height);
    content.restore();
}

/// Footer height including its top rule padding
fn footer_height() -> f32 {
    FOOTER_PADDING + FOOTER_TEXT_SIZE * 1.2
}

fn draw_footer(content: &mut ContentStream, theme: &Theme, year: i32) {
    let top = PAGE_HEIGHT - PADDING - footer_height();
    let rule = theme.bg.blend(theme.accent, TINT_RULE);
    content.line((PADDING, y(top)), (PADDING + CONTENT_WIDTH, y(top)), rule, 1.0);

    let colour = theme.faded(theme.bg, 0.3);
    let base = y(baseline(top + FOOTER_PADDING, FOOTER_TEXT_SIZE, FOOTER_TEXT_SIZE * 1.2));
    content.text(Font::Regular, FOOTER_TEXT_SIZE, 0.0, colour, PADDING, base, "etyma.art");

    let copyright = format!("© {} Etyma", year);
    let width = text_width(&copyright, Font::Regular, FOOTER_TEXT_SIZE, 0.0);
    content.text(
        Font::Regular,
        FOOTER_TEXT_SIZE,
        0.0,
        colour,
        PADDING + CONTENT_WIDTH - width,
        base,
        &copyright,
    );
}

/// Render the poster for an analysis
///
/// `art` is painted into the artwork panel when present; the panel is
/// omitted otherwise.
pub fn render_poster(
    analysis: &NameAnalysis,
    palette: ColourPalette,
    art: Option<EmbeddedImage>,
    year: i32,
) -> Result<Vec<u8>, PdfError> {
    let theme = Theme::new(palette)?;
    let mut document = PdfDocument::new(PAGE_WIDTH, PAGE_HEIGHT, format!("Etyma: {}", analysis.name));
    let mut content = ContentStream::new();

    content.fill_rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, theme.bg);
    let mut top = draw_header(&mut content, analysis, &theme);

    if let Some(image) = art {
        top += ART_MARGIN;
        let ratio = image.aspect_ratio();
        let resource = document.add_image(image);
        draw_art(&mut content, &resource, ratio, top);
        top += ART_HEIGHT + ART_MARGIN;
    }

    let limit = PAGE_HEIGHT - PADDING - footer_height();
    let sections = [
        etymology_section(analysis, &theme),
        phonetics_section(analysis, &theme),
        morphology_section(analysis, &theme),
    ];
    for section in &sections {
        let height = section.height();
        if top + height > limit {
            warn!(section = section.title, name = %analysis.name, "Poster section does not fit, skipped");
            continue;
        }
        section.draw(&mut content, &theme, top);
        top += height + SECTION_GAP;
    }

    let cognates = CognateRow::new(analysis);
    let height = cognates.height();
    if height > 0.0 && top + height <= limit {
        cognates.draw(&mut content, &theme, top);
    } else if height > 0.0 {
        warn!(name = %analysis.name, "Cognates do not fit, skipped");
    }

    draw_footer(&mut content, &theme, year);
    document.add_page(content);

    let bytes = document.to_bytes();
    debug!(name = %analysis.name, palette = %palette, bytes = bytes.len(), "Poster rendered");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::super::image::tests::tiny_jpeg;
    use super::*;
    use etyma_common::analysis::{Cognate, Morpheme};

    fn sample() -> NameAnalysis {
        let mut analysis = NameAnalysis {
            name: "Luna".to_string(),
            ..Default::default()
        };
        analysis.etymology.origin_language = "Latin".to_string();
        analysis.etymology.root_word = "lūna".to_string();
        analysis.etymology.meaning = "moon, the bright one".to_string();
        analysis.etymology.cultural_significance =
            "The Roman goddess of the moon, driving her silver chariot across the night sky.".to_string();
        analysis.etymology.language_family_tree =
            vec!["Proto-Indo-European".to_string(), "Latin".to_string()];
        analysis.phonetics.ipa = "/ˈluː.nə/".to_string();
        analysis.phonetics.stress_pattern = "Trochaic: LU-na".to_string();
        analysis.phonetics.phonosemantic = "Liquid and nasal sounds give a soft glow.".to_string();
        analysis.morphology.morphemes = vec![Morpheme {
            part: "lun-".to_string(),
            kind: "root".to_string(),
            meaning: "moon".to_string(),
        }];
        analysis.morphology.grammatical_journey = "A feminine noun become a given name.".to_string();
        analysis.cross_linguistic.cognates = (0..8)
            .map(|i| Cognate {
                language: format!("Language {}", i),
                word: format!("word{}", i),
            })
            .collect();
        analysis
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn hex_of(s: &str) -> String {
        hex::encode_upper(super::super::writer::encode_win_ansi(s))
    }

    #[test]
    fn test_poster_filename() {
        assert_eq!(poster_filename("Luna"), "etyma-luna.pdf");
        assert_eq!(poster_filename("Mary Jane"), "etyma-mary-jane.pdf");
        assert_eq!(poster_filename("名"), "etyma-poster.pdf");
    }

    #[test]
    fn test_render_without_art() {
        let bytes = render_poster(&sample(), ColourPalette::CoolMidnight, None, 2026).unwrap();
        let pdf = text(&bytes);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(pdf.contains("/MediaBox [0 0 1191 1684]"));
        assert!(pdf.contains(&hex_of("LUNA")));
        assert!(pdf.contains(&hex_of("ETYMOLOGY")));
        assert!(pdf.contains(&hex_of("etyma.art")));
        assert!(pdf.contains(&hex_of("© 2026 Etyma")));
        assert!(!pdf.contains("/Subtype /Image"));
    }

    #[test]
    fn test_cognates_capped() {
        let bytes = render_poster(&sample(), ColourPalette::WarmGold, None, 2026).unwrap();
        let pdf = text(&bytes);
        assert!(pdf.contains(&hex_of("word5")));
        assert!(!pdf.contains(&hex_of("word6")));
    }

    #[test]
    fn test_render_with_art() {
        let art = EmbeddedImage::from_bytes(tiny_jpeg(768, 1024)).unwrap();
        let bytes = render_poster(&sample(), ColourPalette::Botanical, Some(art), 2026).unwrap();
        let pdf = text(&bytes);
        assert!(pdf.contains("/Subtype /Image"));
        assert!(pdf.contains("/Filter /DCTDecode"));
        assert!(pdf.contains("/Im1 Do"));
        assert!(pdf.contains(" re W n"));
    }

    #[test]
    fn test_empty_analysis_still_renders() {
        let analysis = NameAnalysis {
            name: "X".to_string(),
            ..Default::default()
        };
        let bytes = render_poster(&analysis, ColourPalette::Arctic, None, 2026).unwrap();
        assert!(text(&bytes).contains("%%EOF"));
    }

    #[test]
    fn test_long_name_shrinks() {
        assert_eq!(fit_name("LUNA"), (NAME_SIZE, NAME_SPACING));
        let wide = "W".repeat(50);
        let widest = "@".repeat(50);
        for long in ["MAXIMILIANA-KONSTANTINOPOLIS", wide.as_str(), widest.as_str()] {
            let (size, spacing) = fit_name(long);
            assert!(size < NAME_SIZE);
            assert!(text_width(long, Font::Bold, size, spacing) <= CONTENT_WIDTH + 1.0);
        }
    }

    #[test]
    fn test_oversized_items_are_capped() {
        let mut analysis = sample();
        let long = "Proto-Indo-European ".repeat(20);
        analysis.etymology.language_family_tree = vec![long.clone()];
        analysis.morphology.morphemes[0].part = long.clone();
        analysis.cross_linguistic.cognates[0].word = long.clone();
        let theme = Theme::new(ColourPalette::Ocean).unwrap();

        let etymology = etymology_section(&analysis, &theme);
        let Some(Block::Pills { labels, .. }) = etymology.blocks.get(2) else {
            panic!("pills block expected");
        };
        let widths = Block::pill_widths(labels);
        assert!(widths[0] <= SECTION_INNER_WIDTH);

        let morphology = morphology_section(&analysis, &theme);
        let Some(Block::Morphemes { items }) = morphology.blocks.first() else {
            panic!("morphemes block expected");
        };
        assert!(Block::morpheme_widths(items)[0] <= SECTION_INNER_WIDTH);

        let cognates = CognateRow::new(&analysis);
        assert!(cognates.widths()[0] <= CONTENT_WIDTH);

        let bytes = render_poster(&analysis, ColourPalette::Ocean, None, 2026).unwrap();
        assert!(text(&bytes).contains("%%EOF"));
    }

    #[test]
    fn test_flow_wraps_rows() {
        let placed = flow(&[40.0, 40.0, 40.0], 10.0, 100.0);
        assert_eq!(placed, vec![(0.0, 0), (50.0, 0), (0.0, 1)]);
        assert_eq!(row_count(&placed), 2);
        assert_eq!(row_count(&[]), 0);
    }
}
