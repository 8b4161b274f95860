//! Table layout (fixed working profile).
//!
//! [CSS 2.1 § 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! Column widths come from a two-pass scan — the minimum and preferred
//! width of every cell — distributed to meet the table's resolved
//! width. Row heights are the maximum of their cells'. `border-spacing`
//! separates cells in the `separate` model; `collapse` zeroes the gaps
//! and resolves shared borders by width-then-style priority
//! (`hidden` > `double` > `solid` > `dashed` > `dotted` > `none`).
//!
//! Row groups never reach this module: the box builder hoists their
//! rows into the wrapper.

use crate::style::{BorderStyle, Side, StyleValue};

use super::LayoutContext;
use super::box_tree::{BoxKind, LayoutBox};
use super::float::FloatRegistry;
use super::geometry::Rect;
use super::block;
use super::intrinsic;

/// Lay out a table wrapper's grid. The wrapper's content rect (x, y,
/// width) is already set; the width may shrink to the columns' needs.
/// Returns the content height.
pub fn layout_table_contents(bx: &mut LayoutBox, ctx: &LayoutContext, abs_cb: Rect) -> f64 {
    let spacing = if bx.style.border_collapse() {
        0.0
    } else {
        bx.style.border_spacing()
    };

    // ── Grid shape ───────────────────────────────────────────────────
    let column_count = bx
        .children
        .iter()
        .filter(|row| matches!(row.kind, BoxKind::TableRow))
        .map(|row| {
            row.children
                .iter()
                .filter(|cell| matches!(cell.kind, BoxKind::TableCell { .. }))
                .map(cell_colspan)
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0);
    if column_count == 0 {
        return 0.0;
    }

    // ── Pass 1: column minimum and preferred widths ──────────────────
    let mut min_cols = vec![0.0_f64; column_count];
    let mut pref_cols = vec![0.0_f64; column_count];
    for row in &bx.children {
        if !matches!(row.kind, BoxKind::TableRow) {
            continue;
        }
        let mut col = 0;
        for cell in &row.children {
            if !matches!(cell.kind, BoxKind::TableCell { .. }) {
                continue;
            }
            let span = cell_colspan(cell);
            let min = intrinsic::minimum_width(cell, ctx.fonts);
            let pref = intrinsic::preferred_width(cell, ctx.fonts);
            // Spanning cells spread their need evenly over the span.
            for offset in 0..span.min(column_count - col) {
                let share = span as f64;
                min_cols[col + offset] = min_cols[col + offset].max(min / share);
                pref_cols[col + offset] = pref_cols[col + offset].max(pref / share);
            }
            col += span;
            if col >= column_count {
                break;
            }
        }
    }

    let total_spacing = spacing * (column_count as f64 + 1.0);
    let min_total: f64 = min_cols.iter().sum();
    let pref_total: f64 = pref_cols.iter().sum();

    // ── Resolved table width ─────────────────────────────────────────
    let available = bx.rect.width;
    let target = match bx.style.width() {
        StyleValue::Auto => (pref_total + total_spacing).min(available).max(min_total + total_spacing),
        _ => available,
    };
    let columns = distribute_columns(&min_cols, &pref_cols, target - total_spacing);
    let used_width: f64 = columns.iter().sum::<f64>() + total_spacing;
    bx.rect.width = used_width;

    // ── Pass 2: rows and cells ───────────────────────────────────────
    let content_x = bx.rect.x;
    let mut y = bx.rect.y + spacing;

    let children = std::mem::take(&mut bx.children);
    let mut out = Vec::with_capacity(children.len());
    for mut row in children {
        if !matches!(row.kind, BoxKind::TableRow) {
            // Captions and stray content stack like blocks above/below.
            let cb = Rect::new(content_x, y, used_width, f64::INFINITY);
            block::layout_in_flow_block(&mut row, cb, y, ctx, &mut FloatRegistry::new(cb), abs_cb);
            y = row.border_box().bottom();
            out.push(row);
            continue;
        }

        let row_height = layout_row(&mut row, &columns, content_x, y, spacing, ctx, abs_cb);
        row.rect = Rect::new(content_x, y, used_width, row_height);
        y += row_height + spacing;
        out.push(row);
    }
    bx.children = out;

    if bx.style.border_collapse() {
        resolve_collapsed_borders(&mut bx.children);
    }

    y - bx.rect.y
}

/// Lay out one row's cells against the column grid; returns the row
/// height (the tallest cell).
fn layout_row(
    row: &mut LayoutBox,
    columns: &[f64],
    table_x: f64,
    y: f64,
    spacing: f64,
    ctx: &LayoutContext,
    abs_cb: Rect,
) -> f64 {
    let mut col = 0_usize;
    let mut row_height = 0.0_f64;

    let children = std::mem::take(&mut row.children);
    let mut out = Vec::with_capacity(children.len());
    for mut cell in children {
        if !matches!(cell.kind, BoxKind::TableCell { .. }) || col >= columns.len() {
            out.push(cell);
            continue;
        }
        let span = cell_colspan(&cell).min(columns.len() - col);
        let cell_width: f64 =
            columns[col..col + span].iter().sum::<f64>() + spacing * (span as f64 - 1.0);
        let x = table_x + spacing + columns[..col].iter().sum::<f64>() + spacing * col as f64;

        let h_edges = cell.style.padding(Side::Left, cell_width)
            + cell.style.padding(Side::Right, cell_width)
            + cell.style.border_width(Side::Left)
            + cell.style.border_width(Side::Right);
        let content_width = (cell_width - h_edges).max(0.0);
        let cb = Rect::new(x, y, cell_width, f64::INFINITY);
        block::layout_sized_block(&mut cell, content_width, cb, x, y, ctx, abs_cb);

        row_height = row_height.max(cell.border_box().height);
        col += span;
        out.push(cell);
    }

    // Cells stretch to the row height so their backgrounds fill it.
    for cell in &mut out {
        if matches!(cell.kind, BoxKind::TableCell { .. }) {
            let border_height = cell.border_box().height;
            if border_height < row_height {
                cell.rect.height += row_height - border_height;
            }
        }
    }

    row.children = out;
    row_height
}

/// Distribute the target content width over the columns: every column
/// gets its minimum, and the min→preferred gap closes proportionally
/// with whatever space remains. Width beyond the preferred total is
/// shared in proportion to preferred widths.
fn distribute_columns(min_cols: &[f64], pref_cols: &[f64], target: f64) -> Vec<f64> {
    let min_total: f64 = min_cols.iter().sum();
    let pref_total: f64 = pref_cols.iter().sum();

    if target <= min_total {
        return min_cols.to_vec();
    }
    if target >= pref_total {
        // Stretch beyond preferred, proportionally to preferred widths.
        let extra = target - pref_total;
        return pref_cols
            .iter()
            .map(|&pref| {
                let share = if pref_total > 0.0 {
                    pref / pref_total
                } else {
                    1.0 / pref_cols.len() as f64
                };
                pref + extra * share
            })
            .collect();
    }
    // Between min and preferred: close each column's gap by the same
    // fraction.
    let gap_total = pref_total - min_total;
    let fraction = if gap_total > 0.0 {
        (target - min_total) / gap_total
    } else {
        0.0
    };
    min_cols
        .iter()
        .zip(pref_cols)
        .map(|(&min, &pref)| min + (pref - min) * fraction)
        .collect()
}

/// The column span the builder recorded on the cell's kind.
fn cell_colspan(cell: &LayoutBox) -> usize {
    match cell.kind {
        BoxKind::TableCell { colspan } => colspan.max(1),
        _ => 1,
    }
}

/// [§ 17.6.2 The collapsing border model](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
///
/// For each pair of horizontally adjacent cells, the wider border wins;
/// at equal widths the style priority decides. The losing side is
/// zeroed so only the winner paints.
fn resolve_collapsed_borders(rows: &mut [LayoutBox]) {
    for row in rows.iter_mut() {
        if !matches!(row.kind, BoxKind::TableRow) {
            continue;
        }
        let count = row.children.len();
        for index in 1..count {
            let (left_slice, right_slice) = row.children.split_at_mut(index);
            let Some(left_cell) = left_slice.last_mut() else {
                continue;
            };
            let Some(right_cell) = right_slice.first_mut() else {
                continue;
            };
            if !matches!(left_cell.kind, BoxKind::TableCell { .. })
                || !matches!(right_cell.kind, BoxKind::TableCell { .. })
            {
                continue;
            }

            let left_width = left_cell.border.right;
            let right_width = right_cell.border.left;
            let left_priority = left_cell.style.border_style(Side::Right).collapse_priority();
            let right_priority = right_cell.style.border_style(Side::Left).collapse_priority();

            let left_wins = left_width > right_width
                || (left_width == right_width && left_priority >= right_priority);
            let hidden = left_cell.style.border_style(Side::Right) == BorderStyle::Hidden
                || right_cell.style.border_style(Side::Left) == BorderStyle::Hidden;

            if hidden {
                left_cell.border.right = 0.0;
                right_cell.border.left = 0.0;
            } else if left_wins {
                right_cell.border.left = 0.0;
            } else {
                left_cell.border.right = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_clamps_to_minimum() {
        let cols = distribute_columns(&[50.0, 50.0], &[100.0, 100.0], 60.0);
        assert_eq!(cols, vec![50.0, 50.0]);
    }

    #[test]
    fn distribution_interpolates_between_min_and_pref() {
        let cols = distribute_columns(&[20.0, 40.0], &[40.0, 80.0], 90.0);
        // Gap total 60, target-min = 30, fraction 0.5.
        assert_eq!(cols, vec![30.0, 60.0]);
    }

    #[test]
    fn distribution_stretches_past_preferred() {
        let cols = distribute_columns(&[10.0, 10.0], &[30.0, 10.0], 60.0);
        assert_eq!(cols[0] + cols[1], 60.0);
        assert!(cols[0] > cols[1]);
    }
}
