//! Construction of the replacement inline `<svg>` element
//!
//! This is the one non-trivial transformation in the crate: fetched SVG text
//! plus the attribute contract of a marked image become the markup of an
//! accessible inline `<svg>`. The fetched text is parsed with the HTML
//! parser, which applies the standard SVG case adjustments, so `viewBox` and
//! camel-case gradient tags survive the round trip.
//!
//! Output child order is `<title>`, `<desc>`, `<defs>`, then the source
//! root's own content. Assistive technology requires `<title>` as the first
//! child, and `aria-labelledby` is only emitted when a `<title>` actually
//! exists.

use lazy_static::lazy_static;
use rand::Rng;
use scraper::{ElementRef, Html, Selector};

use crate::error::ConvertError;
use crate::extract::MarkedImage;

/// Default namespace when the fetched root declares none
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Id given to the synthesized gradient element, referenced by the root's
/// `fill="url(#Gradient)"`
const GRADIENT_ID: &str = "Gradient";

/// Attributes carried over from the fetched root when present. `height` and
/// `width` are included so viewBox synthesis has its inputs; `xmlns:a`
/// (an export-tool artifact) is deliberately absent.
const COPIED_ATTRIBUTES: &[&str] = &[
    "xmlns:xlink",
    "x",
    "y",
    "viewBox",
    "style",
    "xml:space",
    "height",
    "width",
];

lazy_static! {
    // Hardcoded and syntactically valid; failure to parse is a compile-time bug.
    static ref SVG_ROOT_SELECTOR: Selector = Selector::parse("svg")
        .expect("BUG: hardcoded selector 'svg' is invalid - this is a compile-time bug");
}

/// Build the inline `<svg>` markup replacing one marked image
///
/// The accessibility ids get a pseudo-unique numeric suffix so repeated
/// icons on one page do not collide (beyond the shared-class case the
/// attribute contract already allows).
pub fn build_inline_svg(image: &MarkedImage, svg_text: &str) -> Result<String, ConvertError> {
    let suffix = rand::rng().random_range(0..100);
    build_inline_svg_with_suffix(image, svg_text, suffix)
}

/// Deterministic core with the id suffix injected
pub(crate) fn build_inline_svg_with_suffix(
    image: &MarkedImage,
    svg_text: &str,
    suffix: u32,
) -> Result<String, ConvertError> {
    let parsed = Html::parse_document(svg_text);
    let root = parsed
        .select(&SVG_ROOT_SELECTOR)
        .next()
        .ok_or(ConvertError::MissingSvgRoot)?;

    let xmlns = source_attr(root, "xmlns").unwrap_or(SVG_NAMESPACE);

    let mut attrs: Vec<(&str, String)> = vec![("xmlns", xmlns.to_string())];
    for &name in COPIED_ATTRIBUTES {
        if let Some(value) = source_attr(root, name) {
            attrs.push((name, value.to_string()));
        }
    }

    // Synthesize a viewBox from the copied height/width when the source had
    // none. Height before width, preserved exactly for compatibility.
    if !attrs.iter().any(|(name, _)| *name == "viewBox") {
        let copied = |wanted: &str| {
            attrs
                .iter()
                .find(|(name, _)| *name == wanted)
                .map(|(_, value)| value.clone())
        };
        if let (Some(height), Some(width)) = (copied("height"), copied("width")) {
            attrs.push(("viewBox", format!("0 0 {height} {width}")));
        }
    }

    // Identity carried over from the image element
    if let Some(id) = image.id.as_deref().filter(|id| !id.is_empty()) {
        attrs.push(("id", id.to_string()));
    }
    if let Some(class) = &image.class {
        attrs.push(("class", format!("replaced-svg {class}")));
    }

    attrs.push(("role", "img".to_string()));

    // Id pattern shared by <title> and <desc>: the image class plus the
    // suffix when a class exists, otherwise a per-element prefix.
    let title_text = image.title.as_deref().filter(|text| !text.is_empty());
    let desc_text = image.description.as_deref().filter(|text| !text.is_empty());
    let title_id = match &image.class {
        Some(class) => format!("{class}{suffix}"),
        None => format!("title{suffix}"),
    };
    let desc_id = match &image.class {
        Some(class) => format!("{class}{suffix}"),
        None => format!("desc{suffix}"),
    };

    // Only point aria-labelledby at a <title> that actually exists.
    if title_text.is_some() {
        attrs.push(("aria-labelledby", title_id.clone()));
    }

    let defs = gradient_markup(image)?;
    if defs.is_some() {
        attrs.push(("fill", format!("url(#{GRADIENT_ID})")));
    }

    let mut markup = String::from("<svg");
    for (name, value) in &attrs {
        markup.push(' ');
        markup.push_str(name);
        markup.push_str("=\"");
        markup.push_str(&html_escape::encode_double_quoted_attribute(value));
        markup.push('"');
    }
    markup.push('>');

    if let Some(text) = title_text {
        markup.push_str(&format!(
            "<title id=\"{}\">{}</title>",
            html_escape::encode_double_quoted_attribute(&title_id),
            html_escape::encode_text(text)
        ));
    }
    if let Some(text) = desc_text {
        markup.push_str(&format!(
            "<desc id=\"{}\">{}</desc>",
            html_escape::encode_double_quoted_attribute(&desc_id),
            html_escape::encode_text(text)
        ));
    }
    if let Some(defs) = defs {
        markup.push_str(&defs);
    }

    markup.push_str(&root.inner_html());
    markup.push_str("</svg>");

    Ok(markup)
}

/// Look up an attribute on the fetched root by its source spelling
///
/// The HTML parser stores namespaced attributes (`xmlns:xlink`, `xml:space`)
/// with a prefix and a bare local name, so a plain local-name lookup would
/// miss them. Reconstructs `prefix:local` for the comparison.
fn source_attr<'a>(root: ElementRef<'a>, name: &str) -> Option<&'a str> {
    root.value().attrs.iter().find_map(|(qual, value)| {
        let matches = match (&qual.prefix, name.split_once(':')) {
            (Some(prefix), Some((wanted_prefix, wanted_local))) => {
                &**prefix == wanted_prefix && &*qual.local == wanted_local
            }
            (None, None) => &*qual.local == name,
            _ => false,
        };
        matches.then(|| &**value)
    })
}

/// Build the `<defs>` block for a requested gradient, if any
///
/// Stops take their color from the colors list; an `offset` is added only
/// for indices the offsets list covers with a non-empty entry. A gradient
/// request without stop colors is logged and skipped rather than failing
/// the element.
fn gradient_markup(image: &MarkedImage) -> Result<Option<String>, ConvertError> {
    let Some(tag) = image.gradient.as_deref().filter(|tag| !tag.is_empty()) else {
        return Ok(None);
    };

    if !tag.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConvertError::InvalidGradientTag(tag.to_string()));
    }

    let Some(colors_raw) = image
        .gradient_stop_colors
        .as_deref()
        .filter(|colors| !colors.is_empty())
    else {
        log::warn!(
            "gradient {tag:?} requested without stop colors, skipping gradient for {}",
            image.src
        );
        return Ok(None);
    };

    let colors: Vec<&str> = colors_raw.split(',').collect();
    let offsets: Vec<&str> = image
        .gradient_stop_offsets
        .as_deref()
        .map(|offsets| offsets.split(',').collect())
        .unwrap_or_default();

    let mut defs = format!("<defs><{tag} id=\"{GRADIENT_ID}\" x1=\"0\" x2=\"1\" y1=\"0\" y2=\"1\">");
    for (index, color) in colors.iter().enumerate() {
        defs.push_str("<stop stop-color=\"");
        defs.push_str(&html_escape::encode_double_quoted_attribute(color));
        defs.push('"');
        if let Some(offset) = offsets.get(index).filter(|offset| !offset.is_empty()) {
            defs.push_str(" offset=\"");
            defs.push_str(&html_escape::encode_double_quoted_attribute(offset));
            defs.push('"');
        }
        defs.push_str("></stop>");
    }
    defs.push_str(&format!("</{tag}></defs>"));

    Ok(Some(defs))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_SVG: &str =
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path d="M0 0h10"></path></svg>"#;

    fn image(src: &str) -> MarkedImage {
        MarkedImage {
            src: src.to_string(),
            resolved_url: format!("https://example.com/{src}"),
            ..Default::default()
        }
    }

    #[test]
    fn title_id_and_aria_labelledby_share_suffix() {
        let mut img = image("icon.svg");
        img.title = Some("Home".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 37).expect("converts");
        assert!(markup.contains(r#"<title id="title37">Home</title>"#));
        assert!(markup.contains(r#"aria-labelledby="title37""#));
        assert!(markup.contains(r#"role="img""#));
    }

    #[test]
    fn description_uses_desc_prefix_without_class() {
        let mut img = image("icon.svg");
        img.description = Some("A small icon".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 5).expect("converts");
        assert!(markup.contains(r#"<desc id="desc5">A small icon</desc>"#));
        // no title was emitted, so no dangling reference
        assert!(!markup.contains("aria-labelledby"));
    }

    #[test]
    fn class_prefixes_both_metadata_ids() {
        let mut img = image("icon.svg");
        img.class = Some("nav-icon".to_string());
        img.title = Some("Home".to_string());
        img.description = Some("Go home".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 8).expect("converts");
        // Documented contract: title and desc share the class-derived id.
        assert!(markup.contains(r#"<title id="nav-icon8">Home</title>"#));
        assert!(markup.contains(r#"<desc id="nav-icon8">Go home</desc>"#));
        assert!(markup.contains(r#"aria-labelledby="nav-icon8""#));
        assert!(markup.contains(r#"class="replaced-svg nav-icon""#));
    }

    #[test]
    fn title_precedes_desc_and_body() {
        let mut img = image("icon.svg");
        img.title = Some("Home".to_string());
        img.description = Some("Go home".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 1).expect("converts");
        let title_at = markup.find("<title").expect("has title");
        let desc_at = markup.find("<desc").expect("has desc");
        let path_at = markup.find("<path").expect("has body");
        assert!(title_at < desc_at);
        assert!(desc_at < path_at);
    }

    #[test]
    fn id_carried_from_image_element() {
        let mut img = image("icon.svg");
        img.id = Some("home-icon".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 1).expect("converts");
        assert!(markup.contains(r#"id="home-icon""#));
    }

    #[test]
    fn gradient_stops_follow_colors_and_partial_offsets() {
        let mut img = image("icon.svg");
        img.gradient = Some("linearGradient".to_string());
        img.gradient_stop_colors = Some("red,blue,green".to_string());
        img.gradient_stop_offsets = Some("0,0.5".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 1).expect("converts");

        assert!(markup.contains(
            r#"<defs><linearGradient id="Gradient" x1="0" x2="1" y1="0" y2="1">"#
        ));
        assert!(markup.contains(r#"<stop stop-color="red" offset="0">"#));
        assert!(markup.contains(r#"<stop stop-color="blue" offset="0.5">"#));
        // third stop has no offset attribute
        assert!(markup.contains(r#"<stop stop-color="green"></stop>"#));
        assert!(markup.contains(r#"fill="url(#Gradient)""#));
        assert_eq!(markup.matches("<stop ").count(), 3);
    }

    #[test]
    fn gradient_without_colors_is_skipped() {
        let mut img = image("icon.svg");
        img.gradient = Some("linearGradient".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 1).expect("converts");
        assert!(!markup.contains("<defs"));
        assert!(!markup.contains("fill="));
    }

    #[test]
    fn invalid_gradient_tag_is_rejected() {
        let mut img = image("icon.svg");
        img.gradient = Some("linear><script".to_string());
        img.gradient_stop_colors = Some("red".to_string());
        let err = build_inline_svg_with_suffix(&img, PLAIN_SVG, 1).expect_err("rejected");
        assert!(matches!(err, ConvertError::InvalidGradientTag(_)));
    }

    #[test]
    fn viewbox_synthesized_from_height_and_width() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" height="24" width="24"><path d="M0 0"></path></svg>"#;
        let markup = build_inline_svg_with_suffix(&image("icon.svg"), svg, 1).expect("converts");
        // height before width, per the documented contract
        assert!(markup.contains(r#"viewBox="0 0 24 24""#));
        assert!(markup.contains(r#"height="24""#));
        assert!(markup.contains(r#"width="24""#));
    }

    #[test]
    fn existing_viewbox_copied_verbatim() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" height="24" width="12" viewBox="0 0 5 5"></svg>"#;
        let markup = build_inline_svg_with_suffix(&image("icon.svg"), svg, 1).expect("converts");
        assert!(markup.contains(r#"viewBox="0 0 5 5""#));
        assert!(!markup.contains("0 0 24 12"));
    }

    #[test]
    fn no_viewbox_without_both_dimensions() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" height="24"></svg>"#;
        let markup = build_inline_svg_with_suffix(&image("icon.svg"), svg, 1).expect("converts");
        assert!(!markup.contains("viewBox"));
    }

    #[test]
    fn missing_svg_root_is_a_typed_error() {
        let err = build_inline_svg_with_suffix(&image("icon.svg"), "<p>not svg</p>", 1)
            .expect_err("no root");
        assert!(matches!(err, ConvertError::MissingSvgRoot));
    }

    #[test]
    fn namespaced_attributes_survive_the_copy() {
        let svg = concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" "#,
            r#"xmlns:xlink="http://www.w3.org/1999/xlink" "#,
            r#"xmlns:a="http://ns.adobe.com/AdobeSVGViewerExtensions/3.0/" "#,
            r#"xml:space="preserve" x="1" y="2" style="opacity:.5"></svg>"#
        );
        let markup = build_inline_svg_with_suffix(&image("icon.svg"), svg, 1).expect("converts");
        assert!(markup.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(markup.contains(r#"xml:space="preserve""#));
        assert!(markup.contains(r#"x="1""#));
        assert!(markup.contains(r#"y="2""#));
        assert!(markup.contains(r#"style="opacity:.5""#));
        // export-tool artifact never carried over
        assert!(!markup.contains("xmlns:a="));
    }

    #[test]
    fn default_namespace_when_root_declares_none() {
        let markup = build_inline_svg_with_suffix(&image("icon.svg"), "<svg></svg>", 1)
            .expect("converts");
        assert!(markup.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    }

    #[test]
    fn metadata_text_is_escaped() {
        let mut img = image("icon.svg");
        img.title = Some("Fish & <Chips>".to_string());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 2).expect("converts");
        assert!(markup.contains("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn empty_title_attribute_adds_nothing() {
        let mut img = image("icon.svg");
        img.title = Some(String::new());
        let markup = build_inline_svg_with_suffix(&img, PLAIN_SVG, 2).expect("converts");
        assert!(!markup.contains("<title"));
        assert!(!markup.contains("aria-labelledby"));
    }
}
