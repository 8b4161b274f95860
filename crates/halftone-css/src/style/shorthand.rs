//! Shorthand property expansion.
//!
//! [CSS 2.1 § 1.4.3](https://www.w3.org/TR/CSS2/about.html#shorthand):
//! a shorthand first resets **every** longhand it covers to its initial
//! value, then applies the values actually specified. `border: 1px`
//! therefore sets the border styles to `none` (their initial) and only
//! the widths to `1px`.

use super::value::{Keyword, parse_color, parse_length, split_components};

/// The expansion of one shorthand declaration.
///
/// Each pair is a longhand name with either the specified value text or
/// `None`, meaning "reset to the property's initial value".
pub type Expansion = Vec<(&'static str, Option<String>)>;

/// Border style keywords recognized when classifying `border` components.
const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "solid", "dashed", "dotted", "double", "groove", "ridge", "inset", "outset",
];

/// Expand a shorthand into its longhands, or `None` if `property` is not
/// a supported shorthand (the caller then treats it as a longhand).
#[must_use]
pub fn expand_shorthand(property: &str, value: &str) -> Option<Expansion> {
    match property {
        "margin" => expand_box_sides("margin-", value, ""),
        "padding" => expand_box_sides("padding-", value, ""),
        "border-width" => expand_box_sides("border-", value, "-width"),
        "border-style" => expand_box_sides("border-", value, "-style"),
        "border-color" => expand_box_sides("border-", value, "-color"),
        "border" => Some(expand_border(value, &["top", "right", "bottom", "left"])),
        "border-top" => Some(expand_border(value, &["top"])),
        "border-right" => Some(expand_border(value, &["right"])),
        "border-bottom" => Some(expand_border(value, &["bottom"])),
        "border-left" => Some(expand_border(value, &["left"])),
        "background" => Some(expand_background(value)),
        "font" => expand_font(value),
        // Logical aliases the UA sheet and authors both use; this engine
        // is horizontal-tb only, so they map straight to the physical
        // properties.
        "margin-block" => expand_two_sides("margin-top", "margin-bottom", value),
        "margin-inline" => expand_two_sides("margin-left", "margin-right", value),
        "margin-block-start" => Some(vec![("margin-top", Some(value.to_string()))]),
        "margin-block-end" => Some(vec![("margin-bottom", Some(value.to_string()))]),
        "margin-inline-start" => Some(vec![("margin-left", Some(value.to_string()))]),
        "margin-inline-end" => Some(vec![("margin-right", Some(value.to_string()))]),
        "padding-inline-start" => Some(vec![("padding-left", Some(value.to_string()))]),
        "padding-inline-end" => Some(vec![("padding-right", Some(value.to_string()))]),
        "list-style" => Some(expand_list_style(value)),
        _ => None,
    }
}

/// 1–4 value box expansion (`margin`, `padding`, `border-width`, …) per
/// the CSS 2.1 top/right/bottom/left replication rules.
fn expand_box_sides(prefix: &str, value: &str, suffix: &str) -> Option<Expansion> {
    let parts = split_components(value);
    let (top, right, bottom, left) = match parts.as_slice() {
        [a] => (a, a, a, a),
        [a, b] => (a, b, a, b),
        [a, b, c] => (a, b, c, b),
        [a, b, c, d] => (a, b, c, d),
        _ => return None,
    };
    let name = |side: &str| -> &'static str {
        // The longhand set is fixed, so leak-free static lookup works.
        match (prefix, side, suffix) {
            ("margin-", "top", "") => "margin-top",
            ("margin-", "right", "") => "margin-right",
            ("margin-", "bottom", "") => "margin-bottom",
            ("margin-", "left", "") => "margin-left",
            ("padding-", "top", "") => "padding-top",
            ("padding-", "right", "") => "padding-right",
            ("padding-", "bottom", "") => "padding-bottom",
            ("padding-", "left", "") => "padding-left",
            ("border-", "top", "-width") => "border-top-width",
            ("border-", "right", "-width") => "border-right-width",
            ("border-", "bottom", "-width") => "border-bottom-width",
            ("border-", "left", "-width") => "border-left-width",
            ("border-", "top", "-style") => "border-top-style",
            ("border-", "right", "-style") => "border-right-style",
            ("border-", "bottom", "-style") => "border-bottom-style",
            ("border-", "left", "-style") => "border-left-style",
            ("border-", "top", "-color") => "border-top-color",
            ("border-", "right", "-color") => "border-right-color",
            ("border-", "bottom", "-color") => "border-bottom-color",
            ("border-", "left", "-color") => "border-left-color",
            _ => unreachable!("fixed longhand table"),
        }
    };
    Some(vec![
        (name("top"), Some(top.clone())),
        (name("right"), Some(right.clone())),
        (name("bottom"), Some(bottom.clone())),
        (name("left"), Some(left.clone())),
    ])
}

/// Two-value logical expansion (`margin-block: 1em 2em`).
fn expand_two_sides(first: &'static str, second: &'static str, value: &str) -> Option<Expansion> {
    let parts = split_components(value);
    let (a, b) = match parts.as_slice() {
        [a] => (a, a),
        [a, b] => (a, b),
        _ => return None,
    };
    Some(vec![
        (first, Some(a.clone())),
        (second, Some(b.clone())),
    ])
}

/// `border` / `border-<side>`: classify each component as width, style,
/// or color; unspecified parts reset.
fn expand_border(value: &str, sides: &[&str]) -> Expansion {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for component in split_components(value) {
        let lower = component.to_ascii_lowercase();
        if BORDER_STYLES.contains(&lower.as_str()) {
            style = Some(component);
        } else if matches!(lower.as_str(), "thin" | "medium" | "thick")
            || parse_length(&component, 16.0).is_some()
        {
            width = Some(component);
        } else if parse_color(&component).is_some() {
            color = Some(component);
        }
        // Unrecognized components are dropped; the rest of the shorthand
        // still applies (tolerant parsing).
    }

    let mut out = Vec::with_capacity(sides.len() * 3);
    for &side in sides {
        out.push((border_longhand(side, "width"), width.clone()));
        out.push((border_longhand(side, "style"), style.clone()));
        out.push((border_longhand(side, "color"), color.clone()));
    }
    out
}

fn border_longhand(side: &str, part: &str) -> &'static str {
    match (side, part) {
        ("top", "width") => "border-top-width",
        ("top", "style") => "border-top-style",
        ("top", "color") => "border-top-color",
        ("right", "width") => "border-right-width",
        ("right", "style") => "border-right-style",
        ("right", "color") => "border-right-color",
        ("bottom", "width") => "border-bottom-width",
        ("bottom", "style") => "border-bottom-style",
        ("bottom", "color") => "border-bottom-color",
        ("left", "width") => "border-left-width",
        ("left", "style") => "border-left-style",
        ("left", "color") => "border-left-color",
        _ => unreachable!("fixed longhand table"),
    }
}

/// `background`: the renderer acts on color and image; position, repeat,
/// and attachment components are consumed without effect. Both acted-on
/// longhands reset when unspecified.
fn expand_background(value: &str) -> Expansion {
    let mut color = None;
    let mut image = None;
    for component in split_components(value) {
        let lower = component.to_ascii_lowercase();
        if lower.starts_with("url(") {
            image = Some(component);
        } else if parse_color(&component).is_some() {
            color = Some(component);
        } else if lower
            .parse::<Keyword>()
            .is_ok_and(|k| matches!(k, Keyword::Repeat | Keyword::RepeatX | Keyword::RepeatY | Keyword::NoRepeat | Keyword::Fixed | Keyword::Scroll | Keyword::Left | Keyword::Right | Keyword::Center | Keyword::Top | Keyword::Bottom))
        {
            // Position/repeat/attachment: recognized, not acted on.
        }
    }
    vec![
        ("background-color", color),
        ("background-image", image),
    ]
}

/// `font`: `[style || variant || weight]? size [/ line-height]? family`.
/// All covered longhands reset first.
fn expand_font(value: &str) -> Option<Expansion> {
    let parts = split_components(value);
    if parts.is_empty() {
        return None;
    }

    let mut style = None;
    let mut variant = None;
    let mut weight = None;
    let mut size = None;
    let mut line_height = None;
    let mut family_start = None;

    for (i, part) in parts.iter().enumerate() {
        let lower = part.to_ascii_lowercase();
        if size.is_none() {
            match lower.as_str() {
                "italic" | "oblique" => {
                    style = Some(part.clone());
                    continue;
                }
                "small-caps" => {
                    variant = Some(part.clone());
                    continue;
                }
                "bold" | "bolder" | "lighter" => {
                    weight = Some(part.clone());
                    continue;
                }
                "normal" => continue, // could be any of the three; initial anyway
                _ => {}
            }
            if lower.parse::<u32>().is_ok_and(|n| (100..=900).contains(&n)) {
                weight = Some(part.clone());
                continue;
            }
            // First size-shaped component: `<size>` or `<size>/<line-height>`.
            if let Some((sz, lh)) = part.split_once('/') {
                size = Some(sz.to_string());
                line_height = Some(lh.to_string());
            } else if parse_length(part, 16.0).is_some() || is_font_size_keyword(&lower) {
                size = Some(part.clone());
            } else {
                return None; // not a font shorthand we understand
            }
            family_start = Some(i + 1);
        }
    }

    let size = size?;
    let family = family_start
        .filter(|&start| start < parts.len())
        .map(|start| parts[start..].join(" "));

    Some(vec![
        ("font-style", style),
        ("font-variant", variant),
        ("font-weight", weight),
        ("font-size", Some(size)),
        ("line-height", line_height),
        ("font-family", family),
    ])
}

fn is_font_size_keyword(lower: &str) -> bool {
    matches!(
        lower,
        "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large" | "xx-large" | "smaller"
            | "larger"
    )
}

/// `list-style`: only the `list-style-type` component is acted on.
fn expand_list_style(value: &str) -> Expansion {
    let mut list_type = None;
    for component in split_components(value) {
        let lower = component.to_ascii_lowercase();
        if matches!(lower.as_str(), "disc" | "circle" | "square" | "decimal" | "none") {
            list_type = Some(component);
        }
    }
    vec![("list-style-type", list_type)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(expansion: &'a Expansion, name: &str) -> &'a Option<String> {
        &expansion.iter().find(|(n, _)| *n == name).expect("longhand present").1
    }

    #[test]
    fn margin_replication_rules() {
        let e = expand_shorthand("margin", "1px 2px").unwrap();
        assert_eq!(lookup(&e, "margin-top").as_deref(), Some("1px"));
        assert_eq!(lookup(&e, "margin-right").as_deref(), Some("2px"));
        assert_eq!(lookup(&e, "margin-bottom").as_deref(), Some("1px"));
        assert_eq!(lookup(&e, "margin-left").as_deref(), Some("2px"));

        let e = expand_shorthand("margin", "1px 2px 3px").unwrap();
        assert_eq!(lookup(&e, "margin-bottom").as_deref(), Some("3px"));
        assert_eq!(lookup(&e, "margin-left").as_deref(), Some("2px"));
    }

    #[test]
    fn border_shorthand_resets_unspecified_longhands() {
        // `border: 1px` must reset the styles (to none) and colors.
        let e = expand_shorthand("border", "1px").unwrap();
        assert_eq!(lookup(&e, "border-top-width").as_deref(), Some("1px"));
        assert_eq!(*lookup(&e, "border-top-style"), None);
        assert_eq!(*lookup(&e, "border-left-color"), None);
    }

    #[test]
    fn border_side_order_is_free() {
        let e = expand_shorthand("border-left", "solid red 2px").unwrap();
        assert_eq!(lookup(&e, "border-left-width").as_deref(), Some("2px"));
        assert_eq!(lookup(&e, "border-left-style").as_deref(), Some("solid"));
        assert_eq!(lookup(&e, "border-left-color").as_deref(), Some("red"));
        assert_eq!(e.len(), 3);
    }

    #[test]
    fn font_shorthand() {
        let e = expand_shorthand("font", "italic bold 12px/1.5 Georgia, serif").unwrap();
        assert_eq!(lookup(&e, "font-style").as_deref(), Some("italic"));
        assert_eq!(lookup(&e, "font-weight").as_deref(), Some("bold"));
        assert_eq!(lookup(&e, "font-size").as_deref(), Some("12px"));
        assert_eq!(lookup(&e, "line-height").as_deref(), Some("1.5"));
        assert_eq!(lookup(&e, "font-family").as_deref(), Some("Georgia, serif"));
    }

    #[test]
    fn background_keeps_color_and_image() {
        let e = expand_shorthand("background", "url(x.png) no-repeat red").unwrap();
        assert_eq!(lookup(&e, "background-color").as_deref(), Some("red"));
        assert_eq!(lookup(&e, "background-image").as_deref(), Some("url(x.png)"));

        let e = expand_shorthand("background", "blue").unwrap();
        assert_eq!(*lookup(&e, "background-image"), None);
    }
}
