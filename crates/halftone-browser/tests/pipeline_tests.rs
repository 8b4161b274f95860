//! End-to-end pipeline: HTML in, PNG out.
//!
//! The rasterized checks use documents without text so they hold with
//! or without system fonts installed.

use halftone_browser::{RenderOptions, fonts::FontBook, images::ImageStore, prepare, render};

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png)
        .expect("pipeline output is a decodable PNG")
        .to_rgba8()
}

fn pixel(img: &image::RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

#[test]
fn output_is_a_png_of_the_requested_viewport_size() {
    let png = render("<p>hello</p>", 320, 240).expect("render succeeds");
    let img = decode(&png);
    assert_eq!(img.dimensions(), (320, 240));
}

#[test]
fn empty_and_invisible_documents_render_white() {
    for html in [
        "",
        "<body></body>",
        r#"<div style="display:none"><p>ghost</p><div style="background:red;width:50px;height:50px"></div></div>"#,
    ] {
        let png = render(html, 100, 80).expect("render succeeds");
        let img = decode(&png);
        assert_eq!(img.dimensions(), (100, 80));
        for (_, _, px) in img.enumerate_pixels() {
            assert_eq!(px.0, [255, 255, 255, 255], "non-white pixel for {html:?}");
        }
    }
}

#[test]
fn two_stacked_blocks_paint_where_layout_put_them() {
    // spec scenario 1, checked at the pixel level.
    let png = render(
        r#"<div style="background:red;width:100px;height:100px"></div>
           <div style="background:blue;width:150px;height:50px"></div>"#,
        800,
        600,
    )
    .expect("render succeeds");
    let img = decode(&png);

    assert_eq!(pixel(&img, 50, 50), [255, 0, 0, 255]);
    assert_eq!(pixel(&img, 99, 99), [255, 0, 0, 255]);
    assert_eq!(pixel(&img, 50, 120), [0, 0, 255, 255]);
    assert_eq!(pixel(&img, 149, 149), [0, 0, 255, 255]);
    // Outside both boxes: untouched canvas.
    assert_eq!(pixel(&img, 400, 300), [255, 255, 255, 255]);
    assert_eq!(pixel(&img, 120, 20), [255, 255, 255, 255]);
}

#[test]
fn overlapping_z_indexed_boxes_resolve_to_the_higher_one() {
    // spec scenario 6.
    let png = render(
        r#"<div style="position:absolute;top:10px;left:10px;width:50px;height:50px;background:red;z-index:1"></div>
           <div style="position:absolute;top:10px;left:10px;width:50px;height:50px;background:blue;z-index:2"></div>"#,
        200,
        200,
    )
    .expect("render succeeds");
    let img = decode(&png);
    assert_eq!(pixel(&img, 30, 30), [0, 0, 255, 255]);
}

#[test]
fn opacity_blends_toward_the_backdrop() {
    let png = render(
        r#"<div style="background:black;opacity:0.5;width:40px;height:40px"></div>"#,
        100,
        100,
    )
    .expect("render succeeds");
    let img = decode(&png);
    let [r, g, b, _] = pixel(&img, 20, 20);
    // 50% black over white lands mid-gray.
    assert!((120..=135).contains(&r), "r = {r}");
    assert_eq!(r, g);
    assert_eq!(g, b);
}

#[test]
fn missing_image_paints_the_placeholder() {
    let png = render(
        r#"<img src="definitely-not-a-real-file.png" width="60" height="40">"#,
        200,
        100,
    )
    .expect("render succeeds");
    let img = decode(&png);
    // Light-gray placeholder body.
    let [r, g, b, _] = pixel(&img, 30, 20);
    assert!(r < 255 && r == g && g == b, "expected grayish placeholder, got {r},{g},{b}");
}

#[test]
fn borders_rasterize_on_all_four_sides() {
    let png = render(
        r#"<div style="width:50px;height:30px;border:3px solid black;background:white"></div>"#,
        100,
        100,
    )
    .expect("render succeeds");
    let img = decode(&png);
    // Border ring: (1,1) is inside the 3px top-left corner.
    assert_eq!(pixel(&img, 1, 1), [0, 0, 0, 255]);
    // Content area stays white.
    assert_eq!(pixel(&img, 28, 18), [255, 255, 255, 255]);
}

#[test]
fn linked_data_uri_stylesheets_apply() {
    // spec § 6: data:text/css URIs decode in-process.
    let png = render(
        r#"<link rel="stylesheet" href="data:text/css,div%7Bbackground%3Agreen%3Bwidth%3A20px%3Bheight%3A20px%7D"><div></div>"#,
        50,
        50,
    )
    .expect("render succeeds");
    let img = decode(&png);
    assert_eq!(pixel(&img, 10, 10), [0, 128, 0, 255]);
}

#[test]
fn failed_stylesheet_fetch_degrades_to_no_styles() {
    let png = render(
        r#"<link rel="stylesheet" href="http://0.0.0.0:1/missing.css"><div style="width:10px;height:10px;background:teal"></div>"#,
        50,
        50,
    )
    .expect("render succeeds despite the dead stylesheet link");
    let img = decode(&png);
    assert_eq!(pixel(&img, 5, 5), [0, 128, 128, 255]);
}

#[test]
fn prepare_exposes_the_intermediate_stages() {
    let fonts = FontBook::empty();
    let images = ImageStore::new();
    let document = prepare(
        "<p>staged</p>",
        400.0,
        300.0,
        &RenderOptions::default(),
        &fonts,
        &images,
    );
    assert!(document.dom.len() > 1);
    assert!(!document.styles.is_empty());
    assert_eq!(document.layout.rect.width, 400.0);
    assert!(!document.paint.is_empty());
}

#[test]
fn rendering_is_deterministic() {
    let html = r#"<div style="background:purple;width:30px;height:30px;border-radius:6px"></div>"#;
    let first = render(html, 64, 64).expect("render succeeds");
    let second = render(html, 64, 64).expect("render succeeds");
    assert_eq!(first, second);
}
