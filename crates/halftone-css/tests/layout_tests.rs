//! Layout engine behavior: block flow, margin collapsing, floats, the
//! inline engine, positioning, tables, and the universal geometry
//! invariants.
//!
//! All text measurement uses the fixed-ratio approximate metrics
//! (0.5 × font-size per character, line-height 1.2), so expected pixel
//! values are exact.

use halftone_css::layout::{
    ApproximateFontMetrics, BoxKind, LayoutBox, LayoutOptions, NoImages, layout_document,
};
use halftone_css::style::Color;
use halftone_css::{compute_styles, parse_stylesheet};

const VIEWPORT: (f64, f64) = (800.0, 600.0);

fn layout(html: &str) -> LayoutBox {
    layout_at(html, VIEWPORT.0, VIEWPORT.1)
}

fn layout_at(html: &str, w: f64, h: f64) -> LayoutBox {
    let tree = halftone_html::parse(html);
    let css = halftone_css::collect_document_css(&tree, &|_| None);
    let sheets: Vec<_> = css.iter().map(|s| parse_stylesheet(s)).collect();
    let styles = compute_styles(&tree, &sheets, w, h);
    layout_document(
        &tree,
        &styles,
        w,
        h,
        &ApproximateFontMetrics,
        &NoImages,
        LayoutOptions::default(),
    )
}

/// Collect boxes matching a predicate, in tree (document) order.
fn collect<'a>(root: &'a LayoutBox, pred: &dyn Fn(&LayoutBox) -> bool) -> Vec<&'a LayoutBox> {
    let mut out = Vec::new();
    fn walk<'a>(bx: &'a LayoutBox, pred: &dyn Fn(&LayoutBox) -> bool, out: &mut Vec<&'a LayoutBox>) {
        if pred(bx) {
            out.push(bx);
        }
        for child in &bx.children {
            walk(child, pred, out);
        }
    }
    walk(root, pred, &mut out);
    out
}

fn by_background<'a>(root: &'a LayoutBox, color: Color) -> Vec<&'a LayoutBox> {
    collect(root, &|bx| bx.style.background_color() == color)
}

fn text_fragments(root: &LayoutBox) -> Vec<&LayoutBox> {
    collect(root, &|bx| {
        matches!(bx.kind, BoxKind::AnonymousInline) && bx.text.is_some()
    })
}

fn line_boxes(root: &LayoutBox) -> Vec<&LayoutBox> {
    collect(root, &|bx| matches!(bx.kind, BoxKind::LineBox { .. }))
}

#[test]
fn two_stacked_blocks() {
    // spec scenario 1.
    let root = layout(
        r#"<div style="background:red;width:100px;height:100px"></div>
           <div style="background:blue;width:150px;height:50px"></div>"#,
    );
    let red = by_background(&root, Color::rgb(255, 0, 0));
    let blue = by_background(&root, Color::rgb(0, 0, 255));
    assert_eq!(red.len(), 1);
    assert_eq!(blue.len(), 1);
    assert_eq!(
        (red[0].rect.x, red[0].rect.y, red[0].rect.width, red[0].rect.height),
        (0.0, 0.0, 100.0, 100.0)
    );
    assert_eq!(
        (blue[0].rect.x, blue[0].rect.y, blue[0].rect.width, blue[0].rect.height),
        (0.0, 100.0, 150.0, 50.0)
    );
}

#[test]
fn sibling_margins_collapse() {
    // spec scenario 2: second box at 10 + max(40, 20), not 10 + 60.
    let root = layout(
        r#"<div style="margin-bottom:40px;height:10px"></div>
           <div style="margin-top:20px;height:10px"></div>"#,
    );
    let tens = collect(&root, &|bx| {
        matches!(bx.kind, BoxKind::Block) && bx.rect.height == 10.0
    });
    assert_eq!(tens.len(), 2);
    assert_eq!(tens[0].rect.y, 0.0);
    assert_eq!(tens[1].rect.y, 50.0);
}

#[test]
fn margins_collapse_through_empty_blocks() {
    let root = layout(
        r#"<div style="height:10px"></div>
           <div style="margin-top:10px;margin-bottom:30px"></div>
           <div style="height:10px"></div>"#,
    );
    let tens = collect(&root, &|bx| {
        matches!(bx.kind, BoxKind::Block) && bx.rect.height == 10.0
    });
    assert_eq!(tens.len(), 2);
    assert_eq!(tens[1].rect.y, 40.0);
}

#[test]
fn parent_and_first_child_margins_collapse() {
    let root = layout(
        r#"<div style="margin-top:30px"><div style="margin-top:50px;height:10px;background:teal"></div></div>"#,
    );
    let inner = by_background(&root, Color::rgb(0, 128, 128));
    assert_eq!(inner.len(), 1);
    // max(30, 50) applied once, at the top of the document.
    assert_eq!(inner[0].rect.y, 50.0);
}

#[test]
fn auto_margins_center_a_fixed_width_block() {
    let root = layout(r#"<div style="width:100px;margin:0 auto;height:5px"></div>"#);
    let block = collect(&root, &|bx| bx.rect.width == 100.0 && bx.rect.height == 5.0);
    assert_eq!(block.len(), 1);
    assert_eq!(block[0].rect.x, 350.0);
    assert_eq!(block[0].margin.left, 350.0);
    assert_eq!(block[0].margin.right, 350.0);
}

#[test]
fn single_auto_margin_absorbs_the_free_space() {
    let root = layout(r#"<div style="width:100px;margin-left:auto;height:5px"></div>"#);
    let block = collect(&root, &|bx| bx.rect.width == 100.0 && bx.rect.height == 5.0);
    assert_eq!(block[0].rect.x, 700.0);
}

#[test]
fn float_with_text_wrap() {
    // spec scenario 3: text starts beside the float, then returns to
    // the left edge below it.
    let root = layout(
        r#"<div style="width:200px"><div style="float:left;width:50px;height:50px;background:yellow"></div>Lorem ipsum dolor sit amet consectetur adipiscing elit sed do tempor</div>"#,
    );
    let float_box = by_background(&root, Color::rgb(255, 255, 0));
    assert_eq!(float_box.len(), 1);
    assert_eq!(
        (float_box[0].rect.x, float_box[0].rect.y),
        (0.0, 0.0)
    );

    let fragments = text_fragments(&root);
    assert!(!fragments.is_empty());
    // First line of text is pushed right of the float.
    assert_eq!(fragments[0].rect.x, 50.0);
    // Some later line sits below the float and returns to x = 0.
    assert!(
        fragments
            .iter()
            .any(|frag| frag.rect.y >= 50.0 && frag.rect.x == 0.0),
        "no text line returned to the left edge below the float"
    );
    // Every fragment beside the float clears its right edge.
    for frag in &fragments {
        if frag.rect.y < 50.0 {
            assert!(frag.rect.x >= 50.0);
        }
    }
}

#[test]
fn float_wider_than_containing_block_sits_alone() {
    let root = layout(
        r#"<div style="width:100px"><div style="float:left;width:150px;height:20px;background:olive"></div>text here</div>"#,
    );
    let float_box = by_background(&root, Color::rgb(128, 128, 0));
    assert_eq!((float_box[0].rect.x, float_box[0].rect.y), (0.0, 0.0));
    // Text cannot share a band with it; the first fragment drops below.
    let fragments = text_fragments(&root);
    assert!(fragments[0].rect.y >= 20.0);
    assert_eq!(fragments[0].rect.x, 0.0);
}

#[test]
fn clear_moves_below_prior_floats() {
    let root = layout(
        r#"<div style="float:left;width:50px;height:30px"></div>
           <div style="clear:left;height:10px;background:navy"></div>"#,
    );
    let cleared = by_background(&root, Color::rgb(0, 0, 128));
    assert_eq!(cleared[0].rect.y, 30.0);
}

#[test]
fn bfc_root_contains_its_floats() {
    let root = layout(
        r#"<div style="overflow:hidden;background:gray"><div style="float:left;width:30px;height:40px"></div></div>
           <div style="background:silver"><div style="float:left;width:30px;height:40px"></div></div>"#,
    );
    let bfc = by_background(&root, Color::rgb(128, 128, 128));
    assert_eq!(bfc[0].rect.height, 40.0);
    // A plain block does not stretch around its float.
    let plain = by_background(&root, Color::rgb(192, 192, 192));
    assert_eq!(plain[0].rect.height, 0.0);
}

#[test]
fn line_boxes_do_not_overlap_vertically() {
    let root = layout(
        r#"<div style="width:150px">one two three four five six seven eight nine ten eleven twelve</div>"#,
    );
    let lines = line_boxes(&root);
    assert!(lines.len() >= 3, "expected several wrapped lines");
    for pair in lines.windows(2) {
        assert!(
            pair[0].rect.bottom() <= pair[1].rect.y + 1e-9,
            "line boxes overlap: {:?} then {:?}",
            pair[0].rect,
            pair[1].rect
        );
    }
}

#[test]
fn empty_inline_keeps_its_edges() {
    // CSS 2.1 § 10.3.1/10.8: an empty inline still occupies its
    // horizontal border+padding and one line-height.
    let root = layout(
        r#"<div><span style="padding:0 10px;border:1px solid black"></span></div>"#,
    );
    let lines = line_boxes(&root);
    assert_eq!(lines.len(), 1);
    let wrapper = collect(&root, &|bx| matches!(bx.kind, BoxKind::Inline));
    assert_eq!(wrapper.len(), 1);
    let border_box = wrapper[0].border_box();
    assert_eq!(border_box.width, 22.0); // 10+10 padding, 1+1 border
    assert!(lines[0].rect.height >= 19.2 - 1e-9);
}

#[test]
fn nowrap_suppresses_soft_breaks() {
    let root = layout(
        r#"<div style="width:50px;white-space:nowrap">aaa bbb ccc ddd eee</div>"#,
    );
    assert_eq!(line_boxes(&root).len(), 1);
}

#[test]
fn br_forces_a_line_break() {
    let root = layout("<div>a<br>b</div>");
    let lines = line_boxes(&root);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].rect.y >= lines[0].rect.bottom() - 1e-9);
}

#[test]
fn text_align_shifts_whole_lines() {
    let root = layout(r#"<div style="width:200px;text-align:center">hi</div>"#);
    // "hi" is 16px wide at 8px/char; centered in 200 → starts at 92.
    let fragments = text_fragments(&root);
    assert_eq!(fragments[0].rect.x, 92.0);

    let root = layout(r#"<div style="width:200px;text-align:right">hi</div>"#);
    let fragments = text_fragments(&root);
    assert_eq!(fragments[0].rect.x, 184.0);
}

#[test]
fn relative_positioning_offsets_after_layout() {
    let root = layout(
        r#"<div style="position:relative;left:15px;top:5px;height:10px;background:maroon"></div>
           <div style="height:10px;background:purple"></div>"#,
    );
    let moved = by_background(&root, Color::rgb(128, 0, 0));
    assert_eq!((moved[0].rect.x, moved[0].rect.y), (15.0, 5.0));
    // Relative offset does not disturb following siblings.
    let after = by_background(&root, Color::rgb(128, 0, 128));
    assert_eq!(after[0].rect.y, 10.0);
}

#[test]
fn absolute_positions_against_the_padding_box() {
    let root = layout(
        r#"<div style="position:relative;padding:10px;height:100px">
             <div style="position:absolute;top:5px;left:5px;width:20px;height:20px;background:lime"></div>x</div>"#,
    );
    let abs = by_background(&root, Color::rgb(0, 255, 0));
    // The containing padding box starts at (0, 0).
    assert_eq!(
        (abs[0].rect.x, abs[0].rect.y, abs[0].rect.width, abs[0].rect.height),
        (5.0, 5.0, 20.0, 20.0)
    );
}

#[test]
fn fixed_positions_against_the_viewport() {
    let root = layout(
        r#"<div style="height:50px"></div>
           <div style="position:fixed;right:10px;bottom:10px;width:50px;height:20px;background:fuchsia"></div>"#,
    );
    let fixed = by_background(&root, Color::rgb(255, 0, 255));
    assert_eq!((fixed[0].rect.x, fixed[0].rect.y), (740.0, 570.0));
}

#[test]
fn ordered_list_markers_count_per_level() {
    let root = layout("<ol><li>a</li><li>b</li></ol>");
    let markers = collect(&root, &|bx| matches!(bx.kind, BoxKind::ListItemMarker));
    let texts: Vec<_> = markers
        .iter()
        .map(|m| m.list_marker_text.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(texts, vec!["1.", "2."]);
    // Markers sit in the left padding area, before the item content.
    let items = collect(&root, &|bx| {
        matches!(bx.kind, BoxKind::Block) && bx.style.display() == halftone_css::style::Display::ListItem
    });
    assert!(markers[0].rect.x < items[0].rect.x);
}

#[test]
fn unordered_list_markers_are_bullets() {
    let root = layout("<ul><li>a</li></ul>");
    let markers = collect(&root, &|bx| matches!(bx.kind, BoxKind::ListItemMarker));
    assert_eq!(markers[0].list_marker_text.as_deref(), Some("\u{2022}"));
}

#[test]
fn first_letter_splits_and_styles_past_leading_whitespace() {
    let root = layout(
        r#"<style>p::first-letter{font-size:32px}</style><p> hi</p>"#,
    );
    let fragments = text_fragments(&root);
    let big = fragments
        .iter()
        .find(|f| f.style.font_size() == 32.0)
        .expect("styled first letter");
    assert_eq!(big.text.as_deref(), Some("h"));
    let rest = fragments
        .iter()
        .find(|f| f.style.font_size() != 32.0)
        .expect("remainder fragment");
    assert_eq!(rest.text.as_deref(), Some("i"));
}

#[test]
fn before_counters_number_list_items() {
    // spec scenario 5.
    let root = layout(
        r#"<style>li{list-style-type:none} li::before{content:counter(item) ". "; counter-increment:item} ol{counter-reset:item}</style>
           <ol><li>a</li><li>b</li></ol>"#,
    );
    let fragments = text_fragments(&root);
    let texts: Vec<&str> = fragments.iter().filter_map(|f| f.text.as_deref()).collect();
    let joined = texts.join("|");
    assert!(joined.contains("1."), "missing first counter in {joined}");
    assert!(joined.contains("2."), "missing second counter in {joined}");
}

#[test]
fn simple_table_grid() {
    let root = layout(
        r#"<table style="border-spacing:0"><tr><td style="width:40px">a</td><td style="width:40px">b</td></tr><tr><td>c</td><td>d</td></tr></table>"#,
    );
    let table = collect(&root, &|bx| matches!(bx.kind, BoxKind::TableWrapper));
    assert_eq!(table.len(), 1);
    // Two 40px cells plus 1px UA cell padding each side.
    assert_eq!(table[0].rect.width, 84.0);

    let rows = collect(&root, &|bx| matches!(bx.kind, BoxKind::TableRow));
    assert_eq!(rows.len(), 2);
    assert!(rows[1].rect.y > rows[0].rect.y);

    let cells = collect(&root, &|bx| matches!(bx.kind, BoxKind::TableCell { .. }));
    assert_eq!(cells.len(), 4);
    // Second column starts after the first (42px column).
    assert_eq!(cells[1].border_box().x, 42.0);
    // Cells of a row share its height.
    assert_eq!(cells[0].border_box().height, cells[1].border_box().height);
}

#[test]
fn colspan_widens_a_cell() {
    let root = layout(
        r#"<table style="border-spacing:0"><tr><td colspan="2">wide</td></tr><tr><td style="width:30px">a</td><td style="width:30px">b</td></tr></table>"#,
    );
    let cells = collect(&root, &|bx| matches!(bx.kind, BoxKind::TableCell { .. }));
    // The spanning cell covers both columns.
    let spanning = cells[0].border_box();
    let second_row_last = cells[2].border_box();
    assert!(spanning.width > second_row_last.width);
}

#[test]
fn geometry_invariants_hold_for_a_mixed_document() {
    let root = layout(
        r#"<style>p{margin:1em} .pad{padding:12px;border:2px solid gray}</style>
           <div class="pad"><p>some text content that wraps around and around</p>
           <div style="float:right;width:40px;height:40px"></div>
           <table><tr><td>cell</td></tr></table></div>"#,
    );

    fn check(bx: &LayoutBox) {
        // Every edge is non-negative (margins may legitimately be not).
        assert!(bx.padding.top >= 0.0 && bx.padding.left >= 0.0);
        assert!(bx.border.top >= 0.0 && bx.border.right >= 0.0);
        assert!(bx.rect.width >= 0.0 && bx.rect.height >= 0.0);

        for child in &bx.children {
            // In-flow children stay inside their block container's
            // content box horizontally.
            let is_contained = matches!(bx.kind, BoxKind::Block | BoxKind::AnonymousBlock)
                && child.is_in_flow()
                && matches!(child.kind, BoxKind::Block | BoxKind::AnonymousBlock);
            if is_contained {
                assert!(child.border_box().x + 1e-6 >= bx.rect.x - child.margin.left.max(0.0));
                assert!(
                    child.border_box().right() <= bx.rect.right() + child.margin.right.max(0.0) + 1e-6
                );
            }
            check(child);
        }
    }
    check(&root);
}

#[test]
fn single_pass_mode_still_lays_text() {
    let tree = halftone_html::parse(
        r#"<div style="width:200px"><div style="float:left;width:50px;height:50px"></div>hello world</div>"#,
    );
    let styles = compute_styles(&tree, &[], VIEWPORT.0, VIEWPORT.1);
    let root = layout_document(
        &tree,
        &styles,
        VIEWPORT.0,
        VIEWPORT.1,
        &ApproximateFontMetrics,
        &NoImages,
        LayoutOptions {
            inline_mode: halftone_css::layout::InlineMode::SinglePass,
        },
    );
    // The fallback ignores float bands: text starts at the content edge.
    let fragments = text_fragments(&root);
    assert_eq!(fragments[0].rect.x, 0.0);
}

#[test]
fn display_none_generates_no_boxes() {
    let root = layout(r#"<div style="display:none"><p>invisible</p></div><p>visible</p>"#);
    assert!(text_fragments(&root)
        .iter()
        .all(|f| f.text.as_deref() != Some("invisible")));
}

#[test]
fn zero_sized_containing_block_degrades_to_zero() {
    let root = layout_at(r#"<div style="width:50%"><p>x</p></div>"#, 0.0, 100.0);
    // Nothing to assert beyond "no panic and non-negative geometry".
    fn check(bx: &LayoutBox) {
        assert!(bx.rect.width >= 0.0);
        for child in &bx.children {
            check(child);
        }
    }
    check(&root);
}
