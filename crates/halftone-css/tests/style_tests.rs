//! Style value parsing and shorthand expansion.

use halftone_css::style::{Color, Keyword, StyleValue, expand_shorthand, parse_value};

/// Shorthand round-trip: expanding a shorthand and parsing each
/// longhand must produce exactly what parsing the longhands directly
/// produces.
fn assert_roundtrip(shorthand: &str, value: &str, longhands: &[(&str, &str)]) {
    let expansion = expand_shorthand(shorthand, value)
        .unwrap_or_else(|| panic!("'{shorthand}' should be a shorthand"));
    for (name, direct_value) in longhands {
        let expanded_raw = expansion
            .iter()
            .find(|(n, _)| n == name)
            .unwrap_or_else(|| panic!("{shorthand} expansion lacks {name}"))
            .1
            .clone()
            .unwrap_or_else(|| panic!("{name} unexpectedly reset"));
        let via_shorthand = parse_value(name, &expanded_raw, 16.0);
        let direct = parse_value(name, direct_value, 16.0);
        assert_eq!(
            via_shorthand, direct,
            "{shorthand}: {value} → {name} diverges from direct {direct_value}"
        );
    }
}

#[test]
fn margin_shorthand_roundtrips() {
    assert_roundtrip(
        "margin",
        "1px 2em 3px 4px",
        &[
            ("margin-top", "1px"),
            ("margin-right", "2em"),
            ("margin-bottom", "3px"),
            ("margin-left", "4px"),
        ],
    );
    assert_roundtrip(
        "margin",
        "10px auto",
        &[("margin-top", "10px"), ("margin-left", "auto")],
    );
}

#[test]
fn padding_shorthand_roundtrips() {
    assert_roundtrip(
        "padding",
        "5px 10px",
        &[
            ("padding-top", "5px"),
            ("padding-right", "10px"),
            ("padding-bottom", "5px"),
            ("padding-left", "10px"),
        ],
    );
}

#[test]
fn border_shorthand_roundtrips() {
    assert_roundtrip(
        "border",
        "2px dashed red",
        &[
            ("border-top-width", "2px"),
            ("border-top-style", "dashed"),
            ("border-left-color", "red"),
            ("border-bottom-style", "dashed"),
        ],
    );
    assert_roundtrip(
        "border-width",
        "1px 2px 3px 4px",
        &[
            ("border-top-width", "1px"),
            ("border-right-width", "2px"),
            ("border-bottom-width", "3px"),
            ("border-left-width", "4px"),
        ],
    );
    assert_roundtrip(
        "border-color",
        "red blue",
        &[
            ("border-top-color", "red"),
            ("border-right-color", "blue"),
            ("border-bottom-color", "red"),
            ("border-left-color", "blue"),
        ],
    );
}

#[test]
fn border_shorthand_resets_what_it_does_not_set() {
    // `border: 1px` covers style and color; both reset to initial.
    let expansion = expand_shorthand("border", "1px").unwrap();
    for (name, value) in &expansion {
        if name.ends_with("-style") || name.ends_with("-color") {
            assert!(value.is_none(), "{name} should reset");
        }
        if name.ends_with("-width") {
            assert_eq!(value.as_deref(), Some("1px"));
        }
    }
}

#[test]
fn font_shorthand_roundtrips() {
    assert_roundtrip(
        "font",
        "italic bold 20px/1.5 serif",
        &[
            ("font-style", "italic"),
            ("font-weight", "bold"),
            ("font-size", "20px"),
            ("line-height", "1.5"),
        ],
    );
}

#[test]
fn background_shorthand_roundtrips() {
    assert_roundtrip("background", "red", &[("background-color", "red")]);
    assert_roundtrip(
        "background",
        "url(bg.png) blue",
        &[
            ("background-color", "blue"),
            ("background-image", "url(bg.png)"),
        ],
    );
}

#[test]
fn length_units_resolve_to_css_pixels() {
    assert_eq!(parse_value("width", "96px", 16.0), Some(StyleValue::Length(96.0)));
    assert_eq!(parse_value("width", "1in", 16.0), Some(StyleValue::Length(96.0)));
    assert_eq!(parse_value("width", "2.54cm", 16.0), Some(StyleValue::Length(96.0)));
    assert_eq!(parse_value("width", "25.4mm", 16.0), Some(StyleValue::Length(96.0)));
    assert_eq!(parse_value("width", "72pt", 16.0), Some(StyleValue::Length(96.0)));
    assert_eq!(parse_value("width", "6pc", 16.0), Some(StyleValue::Length(96.0)));
    assert_eq!(parse_value("width", "1.5em", 20.0), Some(StyleValue::Length(30.0)));
    assert_eq!(parse_value("width", "50%", 16.0), Some(StyleValue::Percentage(0.5)));
}

#[test]
fn bare_numbers_are_invalid_lengths() {
    assert_eq!(parse_value("width", "0", 16.0), Some(StyleValue::Length(0.0)));
    assert_eq!(parse_value("width", "10", 16.0), None);
    assert_eq!(parse_value("margin-left", "3", 16.0), None);
}

#[test]
fn colors_parse_in_every_supported_notation() {
    assert_eq!(
        parse_value("color", "red", 16.0),
        Some(StyleValue::Color(Color::rgb(255, 0, 0)))
    );
    assert_eq!(
        parse_value("color", "#0af", 16.0),
        Some(StyleValue::Color(Color::rgb(0, 0xaa, 0xff)))
    );
    assert_eq!(
        parse_value("color", "#102030", 16.0),
        Some(StyleValue::Color(Color::rgb(0x10, 0x20, 0x30)))
    );
    assert_eq!(
        parse_value("color", "rgb(1, 2, 3)", 16.0),
        Some(StyleValue::Color(Color::rgb(1, 2, 3)))
    );
    assert_eq!(
        parse_value("color", "rgba(1, 2, 3, 0)", 16.0),
        Some(StyleValue::Color(Color { r: 1, g: 2, b: 3, a: 0 }))
    );
    assert_eq!(
        parse_value("background-color", "transparent", 16.0),
        Some(StyleValue::Color(Color::TRANSPARENT))
    );
}

#[test]
fn font_weight_keywords_and_numbers() {
    assert_eq!(parse_value("font-weight", "bold", 16.0), Some(StyleValue::Number(700.0)));
    assert_eq!(parse_value("font-weight", "normal", 16.0), Some(StyleValue::Number(400.0)));
    assert_eq!(parse_value("font-weight", "550", 16.0), Some(StyleValue::Number(550.0)));
    assert_eq!(parse_value("font-weight", "1000", 16.0), None);
}

#[test]
fn z_index_auto_and_integers() {
    assert_eq!(parse_value("z-index", "auto", 16.0), Some(StyleValue::Auto));
    assert_eq!(parse_value("z-index", "-3", 16.0), Some(StyleValue::Number(-3.0)));
    assert_eq!(parse_value("z-index", "1.5", 16.0), None);
}

#[test]
fn display_keywords() {
    assert_eq!(
        parse_value("display", "inline-block", 16.0),
        Some(StyleValue::Keyword(Keyword::InlineBlock))
    );
    assert_eq!(
        parse_value("display", "table-cell", 16.0),
        Some(StyleValue::Keyword(Keyword::TableCell))
    );
    assert_eq!(parse_value("display", "flex", 16.0), None);
}

#[test]
fn border_width_keywords() {
    assert_eq!(parse_value("border-top-width", "thin", 16.0), Some(StyleValue::Length(1.0)));
    assert_eq!(parse_value("border-top-width", "medium", 16.0), Some(StyleValue::Length(3.0)));
    assert_eq!(parse_value("border-top-width", "thick", 16.0), Some(StyleValue::Length(5.0)));
}
