//! Font measurement interface.
//!
//! [CSS 2.1 § 10.8](https://www.w3.org/TR/CSS2/visudet.html#line-height):
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! The layout engine measures text exclusively through this trait; the
//! real implementation (fontdue over system fonts) lives in the browser
//! crate so layout stays free of font-file concerns.

/// The face parameters that select a font for measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRequest {
    /// Font size in px.
    pub size: f64,
    /// Numeric weight (400 normal, 700 bold).
    pub weight: u16,
    /// Whether an italic face is wanted.
    pub italic: bool,
    /// Whether a monospace face is wanted.
    pub monospace: bool,
}

impl FontRequest {
    /// A normal-weight upright request at `size`.
    #[must_use]
    pub fn regular(size: f64) -> Self {
        Self {
            size,
            weight: 400,
            italic: false,
            monospace: false,
        }
    }
}

/// Text measurement as layout needs it.
pub trait FontMetrics {
    /// Total advance width of `text` for the requested face.
    fn text_width(&self, text: &str, request: &FontRequest) -> f64;

    /// Height above the baseline for the requested size.
    fn ascent(&self, request: &FontRequest) -> f64;

    /// Depth below the baseline for the requested size.
    fn descent(&self, request: &FontRequest) -> f64;

    /// The x-height (used by `vertical-align: middle`).
    fn x_height(&self, request: &FontRequest) -> f64 {
        self.ascent(request) * 0.6
    }
}

/// Fixed-ratio metrics for tests and fontless environments.
///
/// Latin proportional faces average roughly 0.5× the em square per
/// glyph advance; ascent/descent split the em 0.8/0.2, which matches
/// common sans faces closely enough for layout decisions.
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(&self, text: &str, request: &FontRequest) -> f64 {
        const CHAR_WIDTH_RATIO: f64 = 0.5;
        let ratio = if request.monospace { 0.6 } else { CHAR_WIDTH_RATIO };
        text.chars().count() as f64 * request.size * ratio
    }

    fn ascent(&self, request: &FontRequest) -> f64 {
        request.size * 0.8
    }

    fn descent(&self, request: &FontRequest) -> f64 {
        request.size * 0.2
    }
}

/// The face request a computed style selects.
#[must_use]
pub fn request_for(style: &crate::style::ComputedStyle) -> FontRequest {
    FontRequest {
        size: style.font_size(),
        weight: style.font_weight(),
        italic: style.is_italic(),
        monospace: style.is_monospace(),
    }
}

/// Advance width of `text` under `style`, letter-spacing included.
#[must_use]
pub fn measure_text(
    text: &str,
    style: &crate::style::ComputedStyle,
    fonts: &dyn FontMetrics,
) -> f64 {
    let request = request_for(style);
    let base = fonts.text_width(text, &request);
    let spacing = style.letter_spacing();
    if spacing == 0.0 {
        return base;
    }
    let gaps = text.chars().count().saturating_sub(1) as f64;
    base + spacing * gaps
}

/// Intrinsic image dimensions, queried during box-tree construction.
///
/// The box builder needs `<img>` sizes before layout; the browser crate
/// implements this against its image cache. A loader that fails returns
/// `None` and the box falls back to the 0×0 placeholder handling.
pub trait ImageSizes {
    /// Natural `(width, height)` of the image behind `src`, in px.
    fn intrinsic_size(&self, src: &str) -> Option<(f64, f64)>;
}

/// No images available (tests, pure-CSS documents).
pub struct NoImages;

impl ImageSizes for NoImages {
    fn intrinsic_size(&self, _src: &str) -> Option<(f64, f64)> {
        None
    }
}
