//! Float placement and the per-BFC float registry.
//!
//! [CSS 2.1 § 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A floated box is shifted to the left or right until its outer edge
//! touches the containing block edge or the outer edge of another
//! float." Line boxes next to a float are shortened to make room for
//! its margin box; the registry answers that band query.
//!
//! One registry exists per block formatting context and is threaded
//! through the layout functions as an explicit parameter — no hidden
//! state, so the inline engine can re-query the band every time a float
//! commits mid-line.

use crate::style::{ClearSide, FloatSide};

use super::geometry::Rect;

/// One placed float's margin box, in document coordinates.
#[derive(Debug, Clone, Copy)]
struct PlacedFloat {
    side: FloatSide,
    margin_box: Rect,
}

/// All floats placed so far in one block formatting context.
#[derive(Debug)]
pub struct FloatRegistry {
    /// Content box of the BFC root; both band edges default to it.
    content: Rect,
    floats: Vec<PlacedFloat>,
}

impl FloatRegistry {
    /// A registry for a BFC whose content box is `content`.
    #[must_use]
    pub fn new(content: Rect) -> Self {
        Self {
            content,
            floats: Vec::new(),
        }
    }

    /// The content box this registry spans.
    #[must_use]
    pub fn content(&self) -> Rect {
        self.content
    }

    /// Whether any float has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    /// The available horizontal band `(left_edge, right_edge)` for
    /// content occupying `[y, y + height)`.
    ///
    /// "The current and subsequent line boxes created next to the float
    /// are shortened as necessary to make room for the margin box of
    /// the float."
    #[must_use]
    pub fn band(&self, y: f64, height: f64) -> (f64, f64) {
        let bottom = y + height.max(1.0);
        let mut left = self.content.x;
        let mut right = self.content.right();
        for float in &self.floats {
            if !float.margin_box.overlaps_vertically(y, bottom) {
                continue;
            }
            match float.side {
                FloatSide::Left => left = left.max(float.margin_box.right()),
                FloatSide::Right => right = right.min(float.margin_box.x),
                FloatSide::None => {}
            }
        }
        (left, right.max(left))
    }

    /// Place a float's margin box of `width` × `height`, starting no
    /// higher than `min_y`, and record it. Returns the placed margin
    /// box.
    ///
    /// Covers the placement rules that matter for a batch renderer:
    /// as high as possible at or below `min_y` (rules 4, 5, 8), as far
    /// toward its own edge as possible (rules 1, 9), never overlapping
    /// other floats (rules 2, 3, 7). When no band at any y fits the
    /// width, the float sits alone at the first fully open band and
    /// overflows the containing block.
    pub fn place(&mut self, side: FloatSide, width: f64, height: f64, min_y: f64) -> Rect {
        let mut y = min_y.max(self.content.y);
        loop {
            let (left, right) = self.band(y, height);
            let fits = right - left >= width;
            let band_is_full_width = left <= self.content.x && right >= self.content.right();
            if fits || band_is_full_width {
                let x = match side {
                    FloatSide::Right => (right - width).max(left),
                    _ => left,
                };
                let margin_box = Rect::new(x, y, width, height);
                self.floats.push(PlacedFloat { side, margin_box });
                return margin_box;
            }
            match self.next_edge_below(y) {
                Some(next) => y = next,
                None => {
                    // No more float edges; the band cannot change below.
                    let x = match side {
                        FloatSide::Right => (right - width).max(left),
                        _ => left,
                    };
                    let margin_box = Rect::new(x, y, width, height);
                    self.floats.push(PlacedFloat { side, margin_box });
                    return margin_box;
                }
            }
        }
    }

    /// The y below `current_y` that clears the given side(s).
    ///
    /// [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control):
    /// "Requires that the top border edge of the box be below the
    /// bottom outer edge of any … floating boxes."
    #[must_use]
    pub fn clearance_y(&self, clear: ClearSide, current_y: f64) -> f64 {
        let mut y = current_y;
        for float in &self.floats {
            let applies = match clear {
                ClearSide::Left => float.side == FloatSide::Left,
                ClearSide::Right => float.side == FloatSide::Right,
                ClearSide::Both => true,
                ClearSide::None => false,
            };
            if applies {
                y = y.max(float.margin_box.bottom());
            }
        }
        y
    }

    /// Bottom edge of the lowest float, or `None` when no floats exist.
    /// BFC roots extend their height to this.
    #[must_use]
    pub fn max_bottom(&self) -> Option<f64> {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .fold(None, |acc, b| Some(acc.map_or(b, |a: f64| a.max(b))))
    }

    /// The nearest float bottom edge strictly below `y`: the next place
    /// the band can change. The inline engine uses this to shift a line
    /// that cannot fit beside the current floats ("shift and retry").
    #[must_use]
    pub fn next_edge_below(&self, y: f64) -> Option<f64> {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .filter(|&b| b > y)
            .fold(None, |acc: Option<f64>, b| {
                Some(acc.map_or(b, |a| a.min(b)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FloatRegistry {
        FloatRegistry::new(Rect::new(0.0, 0.0, 200.0, 1000.0))
    }

    #[test]
    fn left_floats_stack_rightward_then_wrap() {
        let mut reg = registry();
        let a = reg.place(FloatSide::Left, 80.0, 50.0, 0.0);
        let b = reg.place(FloatSide::Left, 80.0, 50.0, 0.0);
        assert_eq!((a.x, a.y), (0.0, 0.0));
        assert_eq!((b.x, b.y), (80.0, 0.0));

        // A third 80px float doesn't fit beside the first two (240 >
        // 200); it drops below them.
        let c = reg.place(FloatSide::Left, 80.0, 50.0, 0.0);
        assert_eq!((c.x, c.y), (0.0, 50.0));
    }

    #[test]
    fn right_float_hugs_right_edge() {
        let mut reg = registry();
        let r = reg.place(FloatSide::Right, 60.0, 30.0, 10.0);
        assert_eq!((r.x, r.y), (140.0, 10.0));
    }

    #[test]
    fn band_narrows_between_floats() {
        let mut reg = registry();
        let _ = reg.place(FloatSide::Left, 50.0, 50.0, 0.0);
        let _ = reg.place(FloatSide::Right, 50.0, 80.0, 0.0);
        assert_eq!(reg.band(10.0, 10.0), (50.0, 150.0));
        // Below the left float only the right one still intrudes.
        assert_eq!(reg.band(60.0, 10.0), (0.0, 150.0));
        assert_eq!(reg.band(90.0, 10.0), (0.0, 200.0));
    }

    #[test]
    fn oversized_float_overflows_alone() {
        let mut reg = registry();
        let big = reg.place(FloatSide::Left, 300.0, 40.0, 0.0);
        assert_eq!((big.x, big.y), (0.0, 0.0));
        assert_eq!(big.width, 300.0);
    }

    #[test]
    fn clearance_passes_float_bottoms() {
        let mut reg = registry();
        let _ = reg.place(FloatSide::Left, 50.0, 70.0, 0.0);
        let _ = reg.place(FloatSide::Right, 50.0, 40.0, 0.0);
        assert_eq!(reg.clearance_y(ClearSide::Left, 0.0), 70.0);
        assert_eq!(reg.clearance_y(ClearSide::Right, 0.0), 40.0);
        assert_eq!(reg.clearance_y(ClearSide::Both, 0.0), 70.0);
        assert_eq!(reg.clearance_y(ClearSide::None, 5.0), 5.0);
    }
}
