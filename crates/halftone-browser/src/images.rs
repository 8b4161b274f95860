//! Image loading: fetch, decode, cache.
//!
//! The loader fills two roles: the box builder asks it for intrinsic
//! sizes before layout, and the rasterizer asks it for pixels when a
//! `DrawImage` op executes. Both go through one cache keyed by source
//! URI, so each image fetches and decodes once per render. A failed
//! load caches the failure; the rasterizer paints the placeholder.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use halftone_css::layout::ImageSizes;

/// A decoded RGBA image.
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 rows.
    pub pixels: Vec<u8>,
}

/// Cache of decoded images, shared read-only after decode.
#[derive(Default)]
pub struct ImageStore {
    cache: RefCell<HashMap<String, Option<Rc<DecodedImage>>>>,
    /// Base directory for relative paths (the document's directory).
    base: Option<std::path::PathBuf>,
}

impl ImageStore {
    /// An empty store resolving relative paths against the process cwd.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store resolving relative image paths against `base`.
    #[must_use]
    pub fn with_base(base: std::path::PathBuf) -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
            base: Some(base),
        }
    }

    /// The decoded image behind `src`, fetching on first use. `None`
    /// means the resource is missing or undecodable (and stays that way
    /// for the rest of the render).
    #[must_use]
    pub fn get(&self, src: &str) -> Option<Rc<DecodedImage>> {
        if let Some(cached) = self.cache.borrow().get(src) {
            return cached.clone();
        }
        let loaded = self.load(src);
        if loaded.is_none() {
            halftone_common::warn_once(
                "image",
                &format!("could not load '{src}'; painting placeholder"),
            );
        }
        let _ = self
            .cache
            .borrow_mut()
            .insert(src.to_string(), loaded.clone());
        loaded
    }

    fn load(&self, src: &str) -> Option<Rc<DecodedImage>> {
        let resolved = self.resolve(src);
        let bytes = halftone_common::fetch_bytes(&resolved).ok()?;
        let decoded = image::load_from_memory(&bytes).ok()?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Some(Rc::new(DecodedImage {
            width,
            height,
            pixels: rgba.into_raw(),
        }))
    }

    fn resolve(&self, src: &str) -> String {
        let is_absolute = src.starts_with("http://")
            || src.starts_with("https://")
            || src.starts_with("data:")
            || src.starts_with('/');
        match (&self.base, is_absolute) {
            (Some(base), false) => base.join(src).to_string_lossy().into_owned(),
            _ => src.to_string(),
        }
    }
}

impl ImageSizes for ImageStore {
    fn intrinsic_size(&self, src: &str) -> Option<(f64, f64)> {
        self.get(src)
            .map(|img| (f64::from(img.width), f64::from(img.height)))
    }
}
