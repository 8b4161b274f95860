//! Paint order: Appendix E layering, determinism, op emission.

use halftone_css::layout::{ApproximateFontMetrics, LayoutOptions, NoImages, layout_document};
use halftone_css::style::Color;
use halftone_css::{PaintList, PaintOp, compute_styles, paint_tree, parse_stylesheet};

fn paint(html: &str) -> PaintList {
    let tree = halftone_html::parse(html);
    let css = halftone_css::collect_document_css(&tree, &|_| None);
    let sheets: Vec<_> = css.iter().map(|s| parse_stylesheet(s)).collect();
    let styles = compute_styles(&tree, &sheets, 800.0, 600.0);
    let layout = layout_document(
        &tree,
        &styles,
        800.0,
        600.0,
        &ApproximateFontMetrics,
        &NoImages,
        LayoutOptions::default(),
    );
    paint_tree(&layout)
}

/// Index of the first fill with exactly this color.
fn fill_index(list: &PaintList, color: Color) -> Option<usize> {
    list.ops().iter().position(|op| {
        matches!(op, PaintOp::FillRect { color: c, .. } if *c == color)
    })
}

#[test]
fn rendering_twice_yields_identical_op_sequences() {
    let html = r#"<style>p{color:navy} .x{background:silver;border:1px solid gray}</style>
        <div class="x"><p>text content</p></div>
        <div style="float:left;width:40px;height:40px;background:olive"></div>"#;
    let first = paint(html);
    let second = paint(html);
    assert_eq!(first.ops(), second.ops());
    assert!(!first.is_empty());
}

#[test]
fn z_index_orders_overlapping_positioned_boxes() {
    // spec scenario 6: blue (z 2) paints over red (z 1).
    let list = paint(
        r#"<div style="position:absolute;top:10px;left:10px;width:50px;height:50px;background:red;z-index:1"></div>
           <div style="position:absolute;top:10px;left:10px;width:50px;height:50px;background:blue;z-index:2"></div>"#,
    );
    let red = fill_index(&list, Color::rgb(255, 0, 0)).expect("red painted");
    let blue = fill_index(&list, Color::rgb(0, 0, 255)).expect("blue painted");
    assert!(red < blue, "z-index 1 must paint before z-index 2");
}

#[test]
fn document_order_breaks_z_ties() {
    let list = paint(
        r#"<div style="position:absolute;width:10px;height:10px;background:red;z-index:5"></div>
           <div style="position:absolute;width:10px;height:10px;background:blue;z-index:5"></div>"#,
    );
    let red = fill_index(&list, Color::rgb(255, 0, 0)).unwrap();
    let blue = fill_index(&list, Color::rgb(0, 0, 255)).unwrap();
    assert!(red < blue);
}

#[test]
fn negative_z_paints_behind_in_flow_content() {
    let list = paint(
        r#"<div style="position:absolute;width:10px;height:10px;background:blue;z-index:-1"></div>
           <div style="width:10px;height:10px;background:green"></div>"#,
    );
    let blue = fill_index(&list, Color::rgb(0, 0, 255)).unwrap();
    let green = fill_index(&list, Color::rgb(0, 128, 0)).unwrap();
    assert!(blue < green, "negative z-index paints first");
}

#[test]
fn backgrounds_paint_before_their_text() {
    let list = paint(r#"<div style="background:yellow">words here</div>"#);
    let bg = fill_index(&list, Color::rgb(255, 255, 0)).unwrap();
    let glyphs = list
        .ops()
        .iter()
        .position(|op| matches!(op, PaintOp::DrawGlyphs { .. }))
        .expect("text painted");
    assert!(bg < glyphs);
}

#[test]
fn floats_paint_over_sibling_block_backgrounds() {
    let list = paint(
        r#"<div style="float:left;width:30px;height:30px;background:olive"></div>
           <div style="width:100px;height:50px;background:silver"></div>"#,
    );
    let float_fill = fill_index(&list, Color::rgb(128, 128, 0)).unwrap();
    let block_fill = fill_index(&list, Color::rgb(192, 192, 192)).unwrap();
    // Appendix E: blocks at layer 3, floats at layer 4.
    assert!(block_fill < float_fill);
}

#[test]
fn opacity_wraps_its_subtree_in_a_group() {
    let list = paint(r#"<div style="opacity:0.5;background:red;width:10px;height:10px"></div>"#);
    let push = list
        .ops()
        .iter()
        .position(|op| matches!(op, PaintOp::PushOpacity(a) if (*a - 0.5).abs() < 1e-9))
        .expect("opacity group opened");
    let fill = fill_index(&list, Color::rgb(255, 0, 0)).unwrap();
    assert!(push < fill);

    // Pushes and pops balance.
    let pushes = list
        .ops()
        .iter()
        .filter(|op| {
            matches!(
                op,
                PaintOp::PushOpacity(_) | PaintOp::PushTransform(_) | PaintOp::PushClip { .. }
            )
        })
        .count();
    let pops = list
        .ops()
        .iter()
        .filter(|op| matches!(op, PaintOp::Pop))
        .count();
    assert_eq!(pushes, pops);
}

#[test]
fn transform_emits_a_matrix_scope() {
    let list = paint(
        r#"<div style="transform:translate(10px, 20px);background:teal;width:10px;height:10px"></div>"#,
    );
    let matrix = list.ops().iter().find_map(|op| match op {
        PaintOp::PushTransform(m) => Some(*m),
        _ => None,
    });
    let matrix = matrix.expect("transform scope opened");
    let (x, y) = matrix.apply(0.0, 0.0);
    assert!((x - 10.0).abs() < 1e-9);
    assert!((y - 20.0).abs() < 1e-9);
}

#[test]
fn overflow_hidden_pushes_a_clip() {
    let list = paint(
        r#"<div style="overflow:hidden;width:50px;height:20px"><div style="width:200px;height:80px;background:red"></div></div>"#,
    );
    let clip = list
        .ops()
        .iter()
        .position(|op| matches!(op, PaintOp::PushClip { .. }))
        .expect("clip pushed");
    let fill = fill_index(&list, Color::rgb(255, 0, 0)).unwrap();
    assert!(clip < fill, "descendants paint inside the clip scope");
}

#[test]
fn borders_emit_per_side_specs() {
    let list = paint(
        r#"<div style="width:50px;height:20px;border:2px dashed red;border-left-width:5px"></div>"#,
    );
    let border = list.ops().iter().find_map(|op| match op {
        PaintOp::StrokeBorder { sides, .. } => Some(*sides),
        _ => None,
    });
    let sides = border.expect("border painted");
    assert_eq!(sides[0].width, 2.0); // top
    assert_eq!(sides[3].width, 5.0); // left
    assert_eq!(sides[0].color, Color::rgb(255, 0, 0));
    assert_eq!(sides[0].style, halftone_css::style::BorderStyle::Dashed);
}

#[test]
fn box_shadow_layers_paint_below_the_background() {
    let list = paint(
        r#"<div style="width:40px;height:40px;background:lime;box-shadow:4px 4px 8px black"></div>"#,
    );
    let bg = fill_index(&list, Color::rgb(0, 255, 0)).unwrap();
    // Some translucent black layer precedes the background fill.
    let shadow = list.ops().iter().position(|op| {
        matches!(op, PaintOp::FillRect { color, .. } if color.r == 0 && color.g == 0 && color.b == 0 && color.a < 255)
    });
    assert!(shadow.expect("shadow layers painted") < bg);
}

#[test]
fn visibility_hidden_paints_nothing_for_the_box() {
    let list = paint(
        r#"<div style="visibility:hidden;background:red;width:10px;height:10px">secret</div>"#,
    );
    assert!(fill_index(&list, Color::rgb(255, 0, 0)).is_none());
    assert!(
        !list
            .ops()
            .iter()
            .any(|op| matches!(op, PaintOp::DrawGlyphs { text, .. } if text.contains("secret")))
    );
}

#[test]
fn inline_wrapper_backgrounds_precede_their_text() {
    let list = paint(r#"<p>before <span style="background:aqua">marked</span> after</p>"#);
    let span_bg = fill_index(&list, Color::rgb(0, 255, 255)).expect("span background");
    let marked = list
        .ops()
        .iter()
        .position(|op| matches!(op, PaintOp::DrawGlyphs { text, .. } if text == "marked"))
        .expect("span text");
    assert!(span_bg < marked);
}

#[test]
fn underlines_paint_for_decorated_text() {
    let list = paint(r#"<a href="top">link</a>"#);
    // UA style: underline + the link color.
    let link_color = Color::rgb(0x06, 0x45, 0xad);
    let underline = list.ops().iter().any(|op| {
        matches!(op, PaintOp::FillRect { color, rect, .. }
            if *color == link_color && rect.height <= 2.0)
    });
    assert!(underline, "link underline missing");
}
