//! System font loading and real font metrics.
//!
//! fontdue supplies per-glyph advances and line metrics; layout talks
//! to it through the [`FontMetrics`] trait so it never touches font
//! files itself. When no system font can be found, fixed-ratio
//! approximations keep layout (and tests) running — text just won't
//! rasterize.

use fontdue::{Font, FontSettings};
use halftone_css::layout::{FontMetrics, FontRequest};

/// Common system font paths for the regular face.
const REGULAR_PATHS: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Bold face candidates.
const BOLD_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Italic face candidates.
const ITALIC_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansOblique.ttf",
    "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
    "C:\\Windows\\Fonts\\ariali.ttf",
];

/// Bold-italic face candidates.
const BOLD_ITALIC_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-BoldItalic.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBoldOblique.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold Italic.ttf",
    "C:\\Windows\\Fonts\\arialbi.ttf",
];

/// Monospace candidates.
const MONO_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// The loaded font set: one face per (weight, style) corner we
/// distinguish, with fall-through to the regular face.
pub struct FontBook {
    regular: Option<Font>,
    bold: Option<Font>,
    italic: Option<Font>,
    bold_italic: Option<Font>,
    monospace: Option<Font>,
}

impl FontBook {
    /// Load whatever system faces are available.
    #[must_use]
    pub fn load_system() -> Self {
        let book = Self {
            regular: load_first(REGULAR_PATHS),
            bold: load_first(BOLD_PATHS),
            italic: load_first(ITALIC_PATHS),
            bold_italic: load_first(BOLD_ITALIC_PATHS),
            monospace: load_first(MONO_PATHS),
        };
        if book.regular.is_none() {
            halftone_common::warn_once(
                "fonts",
                "no system font found; layout will approximate and text will not raster",
            );
        }
        book
    }

    /// An empty book (tests): all metrics approximate.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            regular: None,
            bold: None,
            italic: None,
            bold_italic: None,
            monospace: None,
        }
    }

    /// The best face for a request, falling through exact → partial →
    /// regular.
    #[must_use]
    pub fn select(&self, request: &FontRequest) -> Option<&Font> {
        if request.monospace
            && let Some(mono) = &self.monospace
        {
            return Some(mono);
        }
        let bold = request.weight >= 600;
        match (bold, request.italic) {
            (true, true) => self
                .bold_italic
                .as_ref()
                .or(self.bold.as_ref())
                .or(self.italic.as_ref())
                .or(self.regular.as_ref()),
            (true, false) => self.bold.as_ref().or(self.regular.as_ref()),
            (false, true) => self.italic.as_ref().or(self.regular.as_ref()),
            (false, false) => self.regular.as_ref(),
        }
    }
}

fn load_first(paths: &[&str]) -> Option<Font> {
    for path in paths {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            return Some(font);
        }
    }
    None
}

impl FontMetrics for FontBook {
    fn text_width(&self, text: &str, request: &FontRequest) -> f64 {
        match self.select(request) {
            Some(font) => {
                let size = request.size as f32;
                text.chars()
                    .map(|ch| f64::from(font.metrics(ch, size).advance_width))
                    .sum()
            }
            None => approximate_width(text, request),
        }
    }

    fn ascent(&self, request: &FontRequest) -> f64 {
        match self
            .select(request)
            .and_then(|f| f.horizontal_line_metrics(request.size as f32))
        {
            Some(metrics) => f64::from(metrics.ascent),
            None => request.size * 0.8,
        }
    }

    fn descent(&self, request: &FontRequest) -> f64 {
        match self
            .select(request)
            .and_then(|f| f.horizontal_line_metrics(request.size as f32))
        {
            Some(metrics) => f64::from(-metrics.descent),
            None => request.size * 0.2,
        }
    }
}

fn approximate_width(text: &str, request: &FontRequest) -> f64 {
    let ratio = if request.monospace { 0.6 } else { 0.5 };
    text.chars().count() as f64 * request.size * ratio
}
