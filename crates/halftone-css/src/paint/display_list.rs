//! The paint list: flat drawing commands for the raster back-end.
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! The stacking pass flattens the box tree into this back-to-front
//! command sequence. The ops carry everything the rasterizer needs; it
//! never sees boxes or styles. The sequence is deterministic for a
//! given (document, viewport) pair — rendering twice yields the same
//! list.

use serde::Serialize;

use crate::layout::Rect;
use crate::style::{BorderStyle, Color, TransformFn};

/// A 2-D affine transform (row-major `[a c e; b d f]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matrix {
    /// x scale.
    pub a: f64,
    /// y shear.
    pub b: f64,
    /// x shear.
    pub c: f64,
    /// y scale.
    pub d: f64,
    /// x translation.
    pub e: f64,
    /// y translation.
    pub f: f64,
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Pure translation.
    #[must_use]
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self` applied after `other` (standard matrix product).
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Transform a point.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// The inverse transform, if the matrix is invertible.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Self {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            e: (self.c * self.f - self.d * self.e) * inv_det,
            f: (self.b * self.e - self.a * self.f) * inv_det,
        })
    }

    /// Compose a CSS transform list around an origin point.
    ///
    /// [CSS Transforms § 9](https://www.w3.org/TR/css-transforms-1/#transform-rendering):
    /// translate to the origin, apply the functions left to right,
    /// translate back.
    #[must_use]
    pub fn from_transform_list(
        fns: &[TransformFn],
        origin: (f64, f64),
        border_box: Rect,
    ) -> Self {
        let mut m = Self::translation(origin.0, origin.1);
        for f in fns {
            let step = match f {
                TransformFn::Translate(tx, ty) => {
                    let tx = tx.resolve(border_box.width).unwrap_or(0.0);
                    let ty = ty.resolve(border_box.height).unwrap_or(0.0);
                    Self::translation(tx, ty)
                }
                TransformFn::Scale(sx, sy) => Self {
                    a: *sx,
                    d: *sy,
                    ..Self::IDENTITY
                },
                TransformFn::Rotate(degrees) => {
                    let r = degrees.to_radians();
                    Self {
                        a: r.cos(),
                        b: r.sin(),
                        c: -r.sin(),
                        d: r.cos(),
                        e: 0.0,
                        f: 0.0,
                    }
                }
                TransformFn::Matrix(a, b, c, d, e, f) => Self {
                    a: *a,
                    b: *b,
                    c: *c,
                    d: *d,
                    e: *e,
                    f: *f,
                },
            };
            m = m.multiply(&step);
        }
        m.multiply(&Self::translation(-origin.0, -origin.1))
    }
}

/// Width, style, and color of one border side, as the rasterizer draws
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderSide {
    /// Used width in px (0 disables the side).
    pub width: f64,
    /// Line style; `none` sides never reach the list.
    pub style: BorderStyle,
    /// Side color.
    pub color: Color,
}

/// The font parameters a glyph run carries to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontStyleSpec {
    /// Numeric weight (700+ selects the bold face).
    pub weight: u16,
    /// Italic/oblique face wanted.
    pub italic: bool,
    /// Monospace family wanted.
    pub monospace: bool,
}

/// One drawing command.
///
/// `Push*` ops open a state scope the matching [`PaintOp::Pop`] closes:
/// transforms compose, opacities multiply, clips intersect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PaintOp {
    /// Fill a rectangle (rounded when `radius > 0`).
    FillRect {
        /// Target rectangle in document coordinates.
        rect: Rect,
        /// Fill color.
        color: Color,
        /// Corner radius in px.
        radius: f64,
    },
    /// Stroke the border ring of a border box, each side a mitered
    /// trapezoid from outer to inner corner.
    StrokeBorder {
        /// The border-box rectangle.
        rect: Rect,
        /// Sides in top, right, bottom, left order.
        sides: [BorderSide; 4],
        /// Corner radius in px.
        radius: f64,
    },
    /// Blit a raster image into a rectangle.
    DrawImage {
        /// Destination rectangle.
        rect: Rect,
        /// Image source (the loader's cache key).
        src: String,
    },
    /// Draw a glyph run with its baseline at `origin`.
    DrawGlyphs {
        /// Baseline origin (left edge, baseline y).
        origin: (f64, f64),
        /// Face selection.
        font: FontStyleSpec,
        /// Font size in px.
        size: f64,
        /// Fill color.
        color: Color,
        /// The text to shape and draw.
        text: String,
    },
    /// Begin a transformed scope.
    PushTransform(Matrix),
    /// Begin a group with uniform opacity.
    PushOpacity(f64),
    /// Begin a clip scope (rounded when `radius > 0`).
    PushClip {
        /// Clip rectangle.
        rect: Rect,
        /// Corner radius in px.
        radius: f64,
    },
    /// Close the innermost open scope.
    Pop,
}

/// The ordered command list handed to the raster back-end.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaintList {
    ops: Vec<PaintOp>,
}

impl PaintList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one op.
    pub fn push(&mut self, op: PaintOp) {
        self.ops.push(op);
    }

    /// The ops in painting (back-to-front) order.
    #[must_use]
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Number of ops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_roundtrip_through_inverse() {
        let m = Matrix::from_transform_list(
            &[TransformFn::Rotate(30.0), TransformFn::Scale(2.0, 3.0)],
            (10.0, 20.0),
            Rect::new(0.0, 0.0, 100.0, 50.0),
        );
        let inv = m.inverse().expect("invertible");
        let (x, y) = m.apply(42.0, 7.0);
        let (rx, ry) = inv.apply(x, y);
        assert!((rx - 42.0).abs() < 1e-9);
        assert!((ry - 7.0).abs() < 1e-9);
    }

    #[test]
    fn translation_composes() {
        let m = Matrix::translation(5.0, 0.0).multiply(&Matrix::translation(0.0, 7.0));
        assert_eq!(m.apply(1.0, 1.0), (6.0, 8.0));
    }

    #[test]
    fn transform_origin_is_a_fixed_point() {
        let m = Matrix::from_transform_list(
            &[TransformFn::Scale(2.0, 2.0)],
            (50.0, 50.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        let (x, y) = m.apply(50.0, 50.0);
        assert!((x - 50.0).abs() < 1e-9 && (y - 50.0).abs() < 1e-9);
        let (x, y) = m.apply(0.0, 0.0);
        assert!((x + 50.0).abs() < 1e-9 && (y + 50.0).abs() < 1e-9);
    }
}
