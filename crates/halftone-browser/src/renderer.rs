//! Software rasterizer: paint list → pixels.
//!
//! Executes [`PaintOp`]s against an RGBA buffer. The renderer knows
//! nothing about CSS, layout, or the DOM — it maintains the transform /
//! opacity / clip stacks the `Push…`/`Pop` ops describe and blends
//! primitives.
//!
//! Geometry fills run through the current transform by inverse mapping:
//! every device pixel in the primitive's transformed bounding box maps
//! back to local coordinates and tests membership there, which handles
//! arbitrary affine transforms and rounded corners uniformly. Glyphs
//! translate their pen origin through the transform but raster upright;
//! rotated text is positioned correctly without rotated glyphs, an
//! accepted approximation for this back-end.

use image::{ImageBuffer, Rgba, RgbaImage};

use halftone_css::layout::Rect;
use halftone_css::paint::{Matrix, PaintList, PaintOp};
use halftone_css::style::{BorderStyle, Color};

use crate::fonts::FontBook;
use crate::images::ImageStore;
use halftone_css::layout::FontRequest;

/// What the innermost open scope was, so `Pop` unwinds the right stack.
enum Scope {
    Transform,
    Opacity,
    Clip,
}

/// The rasterizer and its pixel buffer.
pub struct Renderer<'a> {
    buffer: RgbaImage,
    width: u32,
    height: u32,
    fonts: &'a FontBook,
    images: &'a ImageStore,
    transforms: Vec<Matrix>,
    opacities: Vec<f64>,
    clips: Vec<Rect>,
    scopes: Vec<Scope>,
}

impl<'a> Renderer<'a> {
    /// A renderer over a white canvas of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32, fonts: &'a FontBook, images: &'a ImageStore) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            width,
            height,
            fonts,
            images,
            transforms: vec![Matrix::IDENTITY],
            opacities: vec![1.0],
            clips: vec![Rect::new(0.0, 0.0, f64::from(width), f64::from(height))],
            scopes: Vec::new(),
        }
    }

    /// Fill the canvas with a base color (the canvas background).
    pub fn clear(&mut self, color: Color) {
        let pixel = Rgba([color.r, color.g, color.b, 255]);
        for px in self.buffer.pixels_mut() {
            *px = pixel;
        }
    }

    /// Execute a whole paint list.
    pub fn execute(&mut self, list: &PaintList) {
        for op in list.ops() {
            self.execute_op(op);
        }
    }

    fn execute_op(&mut self, op: &PaintOp) {
        match op {
            PaintOp::FillRect { rect, color, radius } => {
                self.fill_rect(*rect, *color, *radius);
            }
            PaintOp::StrokeBorder { rect, sides, radius } => {
                self.stroke_border(*rect, sides, *radius);
            }
            PaintOp::DrawImage { rect, src } => self.draw_image(*rect, src),
            PaintOp::DrawGlyphs {
                origin,
                font,
                size,
                color,
                text,
            } => {
                let request = FontRequest {
                    size: *size,
                    weight: font.weight,
                    italic: font.italic,
                    monospace: font.monospace,
                };
                self.draw_glyphs(*origin, &request, *color, text);
            }
            PaintOp::PushTransform(matrix) => {
                let current = *self.current_transform();
                self.transforms.push(current.multiply(matrix));
                self.scopes.push(Scope::Transform);
            }
            PaintOp::PushOpacity(alpha) => {
                let current = self.current_opacity();
                self.opacities.push(current * alpha.clamp(0.0, 1.0));
                self.scopes.push(Scope::Opacity);
            }
            PaintOp::PushClip { rect, radius: _ } => {
                // The clip applies in device space via the transformed
                // bounding box of the rect.
                let device = self.device_bounds(*rect);
                let current = *self.current_clip();
                self.clips.push(current.intersect(&device));
                self.scopes.push(Scope::Clip);
            }
            PaintOp::Pop => match self.scopes.pop() {
                Some(Scope::Transform) => {
                    let _ = self.transforms.pop();
                }
                Some(Scope::Opacity) => {
                    let _ = self.opacities.pop();
                }
                Some(Scope::Clip) => {
                    let _ = self.clips.pop();
                }
                None => {}
            },
        }
    }

    fn current_transform(&self) -> &Matrix {
        self.transforms.last().expect("transform stack seeded")
    }

    fn current_opacity(&self) -> f64 {
        *self.opacities.last().expect("opacity stack seeded")
    }

    fn current_clip(&self) -> &Rect {
        self.clips.last().expect("clip stack seeded")
    }

    /// Device-space bounding box of a local-space rect under the
    /// current transform.
    fn device_bounds(&self, rect: Rect) -> Rect {
        let m = self.current_transform();
        let corners = [
            m.apply(rect.x, rect.y),
            m.apply(rect.right(), rect.y),
            m.apply(rect.x, rect.bottom()),
            m.apply(rect.right(), rect.bottom()),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Iterate the device pixels that may belong to `rect`, mapping
    /// each back to local space and testing `inside`.
    fn fill_mapped(&mut self, rect: Rect, mut shade: impl FnMut(f64, f64) -> Option<Color>) {
        let device = self.device_bounds(rect).intersect(self.current_clip());
        if device.width <= 0.0 || device.height <= 0.0 {
            return;
        }
        let Some(inverse) = self.current_transform().inverse() else {
            return; // degenerate transform collapses to nothing
        };
        let opacity = self.current_opacity();

        let x0 = device.x.floor().max(0.0) as u32;
        let y0 = device.y.floor().max(0.0) as u32;
        let x1 = (device.right().ceil() as i64).clamp(0, i64::from(self.width)) as u32;
        let y1 = (device.bottom().ceil() as i64).clamp(0, i64::from(self.height)) as u32;

        for py in y0..y1 {
            for px in x0..x1 {
                let (lx, ly) = inverse.apply(f64::from(px) + 0.5, f64::from(py) + 0.5);
                if let Some(color) = shade(lx, ly) {
                    let alpha = f64::from(color.a) * opacity;
                    if alpha > 0.0 {
                        blend_pixel(&mut self.buffer, px, py, color, alpha);
                    }
                }
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, radius: f64) {
        if rect.width <= 0.0 || rect.height <= 0.0 || color.a == 0 {
            return;
        }
        self.fill_mapped(rect, |lx, ly| {
            inside_rounded_rect(rect, radius, lx, ly).then_some(color)
        });
    }

    /// Each border side is a mitered trapezoid from the outer corner to
    /// the inner corner; the per-side style picks which pixels of the
    /// trapezoid actually paint.
    fn stroke_border(
        &mut self,
        rect: Rect,
        sides: &[halftone_css::paint::BorderSide; 4],
        radius: f64,
    ) {
        let [top, right, bottom, left] = *sides;
        let widths = [top.width, right.width, bottom.width, left.width];
        if widths.iter().all(|w| *w <= 0.0) {
            return;
        }
        self.fill_mapped(rect, move |lx, ly| {
            if !inside_rounded_rect(rect, radius, lx, ly) {
                return None;
            }
            // Penetration fraction into each side's band (∞ when the
            // side has no width). The smallest fraction < 1 picks the
            // side; ties resolve along the miter diagonal.
            let frac = |distance: f64, width: f64| {
                if width > 0.0 { distance / width } else { f64::INFINITY }
            };
            let f_top = frac(ly - rect.y, widths[0]);
            let f_right = frac(rect.right() - lx, widths[1]);
            let f_bottom = frac(rect.bottom() - ly, widths[2]);
            let f_left = frac(lx - rect.x, widths[3]);

            let (side_index, f) = [f_top, f_right, f_bottom, f_left]
                .into_iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .expect("four candidates");
            if f >= 1.0 {
                return None; // inside the padding box
            }
            let side = sides[side_index];
            if !side.style.is_visible() || side.color.a == 0 {
                return None;
            }
            // Coordinate along the side, for dash/dot phase.
            let along = match side_index {
                0 | 2 => lx - rect.x,
                _ => ly - rect.y,
            };
            side_pattern_on(side.style, side.width, f, along).then_some(side.color)
        });
    }

    fn draw_image(&mut self, rect: Rect, src: &str) {
        match self.images.get(src) {
            Some(img) => {
                let (iw, ih) = (f64::from(img.width), f64::from(img.height));
                self.fill_mapped(rect, move |lx, ly| {
                    if lx < rect.x || ly < rect.y || lx >= rect.right() || ly >= rect.bottom() {
                        return None;
                    }
                    let u = ((lx - rect.x) / rect.width * iw) as u32;
                    let v = ((ly - rect.y) / rect.height * ih) as u32;
                    let u = u.min(img.width.saturating_sub(1));
                    let v = v.min(img.height.saturating_sub(1));
                    let index = ((v * img.width + u) * 4) as usize;
                    let px = &img.pixels[index..index + 4];
                    Some(Color {
                        r: px[0],
                        g: px[1],
                        b: px[2],
                        a: px[3],
                    })
                });
            }
            None => self.draw_image_placeholder(rect),
        }
    }

    /// A missing image paints a light-gray box with an 'x' across it.
    fn draw_image_placeholder(&mut self, rect: Rect) {
        const STROKE: f64 = 1.5;
        let gray = Color::rgb(0xe0, 0xe0, 0xe0);
        let dark = Color::rgb(0x88, 0x88, 0x88);
        self.fill_mapped(rect, move |lx, ly| {
            if lx < rect.x || ly < rect.y || lx >= rect.right() || ly >= rect.bottom() {
                return None;
            }
            if rect.width <= 0.0 || rect.height <= 0.0 {
                return None;
            }
            // Normalized position for the two diagonals of the 'x'.
            let u = (lx - rect.x) / rect.width;
            let v = (ly - rect.y) / rect.height;
            let d1 = (u - v).abs() * rect.width.min(rect.height);
            let d2 = (u + v - 1.0).abs() * rect.width.min(rect.height);
            if d1 < STROKE || d2 < STROKE {
                Some(dark)
            } else {
                Some(gray)
            }
        });
    }

    fn draw_glyphs(&mut self, origin: (f64, f64), request: &FontRequest, color: Color, text: &str) {
        let Some(font) = self.fonts.select(request) else {
            return;
        };
        let opacity = self.current_opacity();
        let clip = *self.current_clip();
        let (mut pen_x, pen_y) = self.current_transform().apply(origin.0, origin.1);
        // Approximate scale so transformed text keeps its size.
        let m = self.current_transform();
        let scale = ((m.a * m.a + m.b * m.b).sqrt() + (m.c * m.c + m.d * m.d).sqrt()) / 2.0;
        let size = (request.size * scale) as f32;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let (metrics, bitmap) = font.rasterize(ch, size);
            let glyph_x = pen_x as i64 + i64::from(metrics.xmin);
            let glyph_y = pen_y as i64 - i64::from(metrics.ymin) - metrics.height as i64;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let px = glyph_x + gx as i64;
                    let py = glyph_y + gy as i64;
                    if px < 0 || py < 0 || px >= i64::from(self.width) || py >= i64::from(self.height)
                    {
                        continue;
                    }
                    let fx = px as f64 + 0.5;
                    let fy = py as f64 + 0.5;
                    if fx < clip.x || fy < clip.y || fx >= clip.right() || fy >= clip.bottom() {
                        continue;
                    }
                    let alpha =
                        f64::from(color.a) * (f64::from(coverage) / 255.0) * opacity;
                    blend_pixel(&mut self.buffer, px as u32, py as u32, color, alpha);
                }
            }
            pen_x += f64::from(metrics.advance_width);
        }
    }

    /// Encode the canvas as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails (it does not, for valid
    /// buffers).
    pub fn into_png(self) -> anyhow::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut bytes);
        self.buffer
            .write_to(&mut cursor, image::ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Write the canvas to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn save_png(&self, path: &std::path::Path) -> anyhow::Result<()> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Membership test for a (possibly rounded) rectangle in local space.
fn inside_rounded_rect(rect: Rect, radius: f64, x: f64, y: f64) -> bool {
    if x < rect.x || y < rect.y || x >= rect.right() || y >= rect.bottom() {
        return false;
    }
    if radius <= 0.0 {
        return true;
    }
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let cx = x.clamp(rect.x + r, rect.right() - r);
    let cy = y.clamp(rect.y + r, rect.bottom() - r);
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

/// Whether a border pixel paints for the given style: `f` is the
/// penetration fraction through the band (0 at the outer edge), `along`
/// the coordinate along the side.
fn side_pattern_on(style: BorderStyle, width: f64, f: f64, along: f64) -> bool {
    match style {
        BorderStyle::Solid => true,
        // Two lines with a gap: outer and inner thirds of the band.
        BorderStyle::Double => !(1.0 / 3.0..=2.0 / 3.0).contains(&f),
        // Dash length 3× the width, equal gaps.
        BorderStyle::Dashed => {
            let period = (width * 3.0).max(3.0) * 2.0;
            (along.rem_euclid(period)) < period / 2.0
        }
        // Square dots, one width on, one width off.
        BorderStyle::Dotted => {
            let period = width.max(1.0) * 2.0;
            (along.rem_euclid(period)) < period / 2.0
        }
        BorderStyle::None | BorderStyle::Hidden => false,
    }
}

/// Source-over blend of `color` at `alpha` (0–255 scale) onto a pixel.
fn blend_pixel(buffer: &mut RgbaImage, x: u32, y: u32, color: Color, alpha: f64) {
    let a = (alpha / 255.0).clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let background = buffer.get_pixel(x, y);
    let inv = 1.0 - a;
    let blend = |fg: u8, bg: u8| (f64::from(fg) * a + f64::from(bg) * inv).round() as u8;
    buffer.put_pixel(
        x,
        y,
        Rgba([
            blend(color.r, background[0]),
            blend(color.g, background[1]),
            blend(color.b, background[2]),
            255,
        ]),
    );
}
