//! Text normalization and greedy word wrap.
//!
//! Every piece of body text passes through [`normalize`] before it is
//! measured or drawn. The built-in fonts only carry the ASCII range of
//! glyphs in our encoding, so typographic quotes, dashes and similar
//! characters would render as blanks — the replacement is a hard
//! requirement, not cosmetics.

use crate::fonts::{Font, Metrics};

/// Collapse whitespace and replace typographic characters with ASCII
/// equivalents.
///
/// Newlines and runs of whitespace become a single space; curly
/// quotes, en/em dashes, the minus sign, ellipsis and non-breaking
/// spaces are mapped to their closest ASCII form.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        let mapped: Option<char> = match ch {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2039}' | '\u{203A}' => Some('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => Some('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => Some('-'),
            '\u{00A0}' => Some(' '),
            '\u{2026}' => None, // expands to three chars below
            c => Some(c),
        };
        let c = match mapped {
            Some(c) => c,
            None => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push_str("...");
                continue;
            }
        };
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

/// Greedy word wrap: fit as many space-separated words on a line as
/// `max_width` allows under the font metric.
///
/// The input is normalized first. A single word wider than
/// `max_width` is placed alone on its own line — no hyphenation.
/// Always returns at least one (possibly empty) line.
pub fn wrap(text: &str, max_width: f64, font: Font, font_size: f64) -> Vec<String> {
    let text = normalize(text);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f64;
    let space_width = Metrics::text_width(" ", font, font_size);

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let word_width = Metrics::text_width(word, font, font_size);
        let needed = if current.is_empty() {
            word_width
        } else {
            current_width + space_width + word_width
        };

        if needed > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_width;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_width = needed;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("a  b\n\nc\t d"), "a b c d");
    }

    #[test]
    fn normalize_maps_typographic_chars() {
        assert_eq!(normalize("\u{201C}Quote\u{201D}"), "\"Quote\"");
        assert_eq!(normalize("it\u{2019}s"), "it's");
        assert_eq!(normalize("2010\u{2013}2020"), "2010-2020");
        assert_eq!(normalize("wait\u{2026}"), "wait...");
        assert_eq!(normalize("non\u{00A0}breaking"), "non breaking");
    }

    #[test]
    fn normalize_trims_edges() {
        assert_eq!(normalize("  hello  "), "hello");
    }

    #[test]
    fn wrap_single_short_line() {
        let lines = wrap("hello world", 500.0, Font::Regular, 10.0);
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn wrap_breaks_at_width() {
        // "aaaa" at 10pt Helvetica is ~22.2pt wide; a 30pt box holds
        // one word per line.
        let lines = wrap("aaaa aaaa aaaa", 30.0, Font::Regular, 10.0);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l == "aaaa"));
    }

    #[test]
    fn oversized_word_gets_own_line() {
        let lines = wrap("x aaaaaaaaaaaaaaaaaaaaaaaa x", 30.0, Font::Regular, 10.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "x");
        assert_eq!(lines[2], "x");
        assert!(Metrics::text_width(&lines[1], Font::Regular, 10.0) > 30.0);
    }

    #[test]
    fn wrap_empty_text_is_one_empty_line() {
        assert_eq!(wrap("", 100.0, Font::Regular, 10.0), vec![String::new()]);
    }

    #[test]
    fn wrap_is_deterministic() {
        let a = wrap("the quick brown fox jumps over the lazy dog", 80.0, Font::Regular, 9.0);
        let b = wrap("the quick brown fox jumps over the lazy dog", 80.0, Font::Regular, 9.0);
        assert_eq!(a, b);
    }

    #[test]
    fn newlines_do_not_force_breaks() {
        let lines = wrap("a\nb", 500.0, Font::Regular, 10.0);
        assert_eq!(lines, vec!["a b"]);
    }
}
