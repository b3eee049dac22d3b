/// The Helvetica family — the only fonts the document engine draws
/// with. Built-in PDF fonts need no embedding and are available in
/// every viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl Font {
    /// Resource name used in content streams.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
            Font::BoldOblique => "F4",
        }
    }

    /// PDF BaseFont name.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
            Font::BoldOblique => "Helvetica-BoldOblique",
        }
    }

    pub const ALL: [Font; 4] = [Font::Regular, Font::Bold, Font::Oblique, Font::BoldOblique];
}

/// Character widths for Helvetica, ASCII 32..=126, in 1/1000 em.
/// Source: Adobe Helvetica AFM data. The oblique variant shares them.
const HELVETICA_WIDTHS: [u16; 95] = [
    // 32..=41: space ! " # $ % & ' ( )
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333,
    // 42..=51: * + , - . / 0 1 2 3
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556,
    // 52..=61: 4 5 6 7 8 9 : ; < =
    556, 556, 556, 556, 556, 556, 278, 278, 584, 584,
    // 62..=71: > ? @ A B C D E F G
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778,
    // 72..=81: H I J K L M N O P Q
    722, 278, 500, 667, 556, 833, 722, 778, 667, 778,
    // 82..=91: R S T U V W X Y Z [
    722, 667, 611, 722, 667, 944, 667, 667, 611, 278,
    // 92..=101: \ ] ^ _ ` a b c d e
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    // 102..=111: f g h i j k l m n o
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // 112..=121: p q r s t u v w x y
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500,
    // 122..=126: z { | } ~
    500, 334, 260, 334, 584,
];

/// Character widths for Helvetica-Bold, ASCII 32..=126, in 1/1000 em.
/// Source: Adobe Helvetica-Bold AFM data. Shared by BoldOblique.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    // 32..=41: space ! " # $ % & ' ( )
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333,
    // 42..=51: * + , - . / 0 1 2 3
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556,
    // 52..=61: 4 5 6 7 8 9 : ; < =
    556, 556, 556, 556, 556, 556, 333, 333, 584, 584,
    // 62..=71: > ? @ A B C D E F G
    584, 611, 975, 722, 722, 722, 722, 667, 611, 778,
    // 72..=81: H I J K L M N O P Q
    722, 278, 556, 722, 611, 833, 722, 778, 667, 778,
    // 82..=91: R S T U V W X Y Z [
    722, 667, 611, 722, 667, 944, 667, 667, 611, 333,
    // 92..=101: \ ] ^ _ ` a b c d e
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    // 102..=111: f g h i j k l m n o
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    // 112..=121: p q r s t u v w x y
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556,
    // 122..=126: z { | } ~
    500, 389, 280, 389, 584,
];

/// Fallback width for characters outside the mapped range (1/1000 em).
const DEFAULT_WIDTH: u16 = 556;

/// Width and height measurement for the built-in fonts. All layout
/// sizing decisions in the engine flow through these two functions,
/// so measurement and rendering can never disagree.
pub struct Metrics;

impl Metrics {
    /// Width of one character in 1/1000 em units.
    pub fn char_width(font: Font, ch: char) -> u16 {
        let code = ch as u32;
        if !(32..=126).contains(&code) {
            return DEFAULT_WIDTH;
        }
        let index = (code - 32) as usize;
        match font {
            Font::Regular | Font::Oblique => HELVETICA_WIDTHS[index],
            Font::Bold | Font::BoldOblique => HELVETICA_BOLD_WIDTHS[index],
        }
    }

    /// Width of a string in points at the given font size.
    pub fn text_width(text: &str, font: Font, font_size: f64) -> f64 {
        let total: u32 = text
            .chars()
            .map(|ch| Self::char_width(font, ch) as u32)
            .sum();
        total as f64 * font_size / 1000.0
    }

    /// Line height at the given font size (1.2x multiplier).
    pub fn line_height(font_size: f64) -> f64 {
        font_size * 1.2
    }
}
