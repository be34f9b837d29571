//! Font metrics and text wrapping for the standard Helvetica family
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em for printable
//! ASCII. Other WinAnsi bytes use an average lowercase width.

use super::writer::{encode_win_ansi, Font};

const FIRST_CHAR: u8 = 32;
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space .. /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // 0 .. 9
    278, 278, 584, 584, 584, 556, 1015,                                             // : .. @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // A .. M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // N .. Z
    278, 278, 278, 469, 556, 333,                                                   // [ .. `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // a .. m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // n .. z
    334, 260, 334, 584,                                                             // { .. ~
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn glyph_width(font: Font, byte: u8) -> u16 {
    let table = match font {
        Font::Bold => &HELVETICA_BOLD,
        // Oblique shares the upright widths
        Font::Regular | Font::Oblique => &HELVETICA,
    };
    byte.checked_sub(FIRST_CHAR)
        .and_then(|index| table.get(index as usize))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// Rendered width of `text` in points, including character spacing
pub fn text_width(text: &str, font: Font, size: f32, char_spacing: f32) -> f32 {
    let encoded = encode_win_ansi(text);
    let units: u32 = encoded.iter().map(|&b| glyph_width(font, b) as u32).sum();
    units as f32 * size / 1000.0 + char_spacing * encoded.len() as f32
}

/// Cut `text` to `max_width` points, marking the cut with "..."
pub fn truncate_to_width(
    text: &str,
    font: Font,
    size: f32,
    char_spacing: f32,
    max_width: f32,
) -> String {
    if text_width(text, font, size, char_spacing) <= max_width {
        return text.to_string();
    }
    let mut kept: String = text.to_string();
    while !kept.is_empty() {
        kept.pop();
        let candidate = format!("{}...", kept.trim_end());
        if text_width(&candidate, font, size, char_spacing) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Greedy word wrap to `max_width` points
///
/// Words wider than a full line are broken between characters.
pub fn wrap_text(
    text: &str,
    font: Font,
    size: f32,
    char_spacing: f32,
    max_width: f32,
) -> Vec<String> {
    let fits = |candidate: &str| text_width(candidate, font, size, char_spacing) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    let mut next = current.clone();
                    next.push(ch);
                    if !current.is_empty() && !fits(&next) {
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    } else {
                        current = next;
                    }
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "Hello" in Helvetica: 722 + 556 + 222 + 222 + 556 = 2278
        let width = text_width("Hello", Font::Regular, 10.0, 0.0);
        assert!((width - 22.78).abs() < 0.001);

        // Character spacing applies per glyph
        let spaced = text_width("Hello", Font::Regular, 10.0, 2.0);
        assert!((spaced - 32.78).abs() < 0.001);

        assert!(text_width("W", Font::Bold, 100.0, 0.0) > text_width("i", Font::Bold, 100.0, 0.0));
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "The name carries the quiet radiance of the moon across many languages and centuries";
        let lines = wrap_text(text, Font::Regular, 16.0, 0.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 16.0, 0.0) <= 200.0, "{}", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Luna", Font::Regular, 16.0, 0.0, 500.0), "Luna");

        let long = "Proto-Indo-European *sh2wen- by way of Old Church Slavonic";
        let cut = truncate_to_width(long, Font::Regular, 11.0, 0.0, 120.0);
        assert!(cut.ends_with("..."));
        assert!(text_width(&cut, Font::Regular, 11.0, 0.0) <= 120.0);
        assert!(long.starts_with(cut.trim_end_matches("...")));

        assert_eq!(truncate_to_width("WWW", Font::Bold, 100.0, 0.0, 5.0), "");
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap_text("Supercalifragilistic", Font::Regular, 20.0, 0.0, 60.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "Supercalifragilistic");
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        let lines = wrap_text("one\ntwo", Font::Regular, 12.0, 0.0, 500.0);
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
        assert!(wrap_text("", Font::Regular, 12.0, 0.0, 500.0).is_empty());
    }
}
