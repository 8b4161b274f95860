//! The Halftone rendering pipeline.
//!
//! One synchronous batch run from markup to pixels:
//!
//! ```text
//! HTML ──parse──▶ DOM ──cascade──▶ styles ──layout──▶ box tree
//!                                   ──paint──▶ paint list ──raster──▶ PNG
//! ```
//!
//! Every stage is infallible: recoverable conditions are handled where
//! they occur, so the only `Result`s here wrap I/O at the edges — PNG
//! encoding and file writes. Malformed input degrades, it never refuses
//! to draw: the output is always a PNG of exactly the requested
//! viewport size.

pub mod fonts;
pub mod images;
pub mod renderer;

use std::path::PathBuf;

use anyhow::Result;
use halftone_css::layout::{InlineMode, LayoutOptions};
use halftone_css::{LayoutBox, PaintList, StyleRegistry, compute_styles, layout_document, paint_tree};
use halftone_dom::DomTree;

use fonts::FontBook;
use images::ImageStore;
use renderer::Renderer;

/// Knobs for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Base directory for relative stylesheet/image references.
    pub base_dir: Option<PathBuf>,
    /// Inline engine selection (multi-pass unless diagnosing).
    pub inline_mode: InlineMode,
}

/// The intermediate products of a render, for inspection and dumps.
pub struct RenderedDocument {
    /// Parsed DOM.
    pub dom: DomTree,
    /// Computed styles.
    pub styles: StyleRegistry,
    /// Positioned box tree (viewport root).
    pub layout: LayoutBox,
    /// Flattened paint list.
    pub paint: PaintList,
}

/// Run the pipeline through paint, without rasterizing.
#[must_use]
pub fn prepare(
    html: &str,
    viewport_w: f64,
    viewport_h: f64,
    options: &RenderOptions,
    fonts: &FontBook,
    image_store: &ImageStore,
) -> RenderedDocument {
    let dom = halftone_html::parse(html);

    let base = options.base_dir.clone();
    let fetch = move |href: &str| -> Option<String> {
        let resolved = resolve_reference(base.as_deref(), href);
        halftone_common::fetch_text(&resolved).ok()
    };
    let css_sources = halftone_css::collect_document_css(&dom, &fetch);
    let sheets: Vec<_> = css_sources
        .iter()
        .map(|css| halftone_css::parse_stylesheet(css))
        .collect();

    let styles = compute_styles(&dom, &sheets, viewport_w, viewport_h);
    let layout = layout_document(
        &dom,
        &styles,
        viewport_w,
        viewport_h,
        fonts,
        image_store,
        LayoutOptions {
            inline_mode: options.inline_mode,
        },
    );
    let paint = paint_tree(&layout);

    RenderedDocument {
        dom,
        styles,
        layout,
        paint,
    }
}

/// Render an HTML string to PNG bytes at the given viewport size.
///
/// # Errors
///
/// Only PNG encoding can fail; every upstream problem degrades into the
/// picture instead.
pub fn render(html: &str, viewport_w: u32, viewport_h: u32) -> Result<Vec<u8>> {
    render_with(html, viewport_w, viewport_h, &RenderOptions::default())
}

/// [`render`] with explicit options.
///
/// # Errors
///
/// Only PNG encoding can fail.
pub fn render_with(
    html: &str,
    viewport_w: u32,
    viewport_h: u32,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let fonts = FontBook::load_system();
    let image_store = match &options.base_dir {
        Some(base) => ImageStore::with_base(base.clone()),
        None => ImageStore::new(),
    };

    let document = prepare(
        html,
        f64::from(viewport_w),
        f64::from(viewport_h),
        options,
        &fonts,
        &image_store,
    );

    let mut renderer = Renderer::new(viewport_w, viewport_h, &fonts, &image_store);
    renderer.clear(halftone_css::paint::canvas_background(&document.layout));
    renderer.execute(&document.paint);
    renderer.into_png()
}

/// Resolve a document-relative reference against the base directory.
fn resolve_reference(base: Option<&std::path::Path>, href: &str) -> String {
    let is_absolute = href.starts_with("http://")
        || href.starts_with("https://")
        || href.starts_with("data:")
        || href.starts_with('/');
    match (base, is_absolute) {
        (Some(base), false) => base.join(href).to_string_lossy().into_owned(),
        _ => href.to_string(),
    }
}
