//! Splicing generated inline SVG fragments into the document
//!
//! This module parses the HTML once, finds the marked image elements,
//! replaces them with their generated `<svg>` fragments, and serializes back
//! to HTML. DOM manipulation, not string replacement, so surrounding markup
//! is never disturbed.

use anyhow::{Context, Result};
use kuchiki::traits::TendrilSink;
use std::collections::{HashMap, VecDeque};

use crate::config::INIT_MARKER_ATTR;

/// Replace marked image elements with their inline SVG fragments
///
/// `replacements` is a list of (src, markup) pairs in document order.
/// Elements sharing a `src` consume their fragments in that order, so two
/// images of the same icon with different accessibility metadata each get
/// their own replacement.
///
/// The skip rules mirror the discovery pass (missing `src`, `data:` URLs,
/// `data-svg-init` markers) so the queues stay aligned with extraction.
pub fn replace_marked_images(
    html: String,
    selector: &str,
    replacements: Vec<(String, String)>,
) -> Result<String> {
    if replacements.is_empty() {
        return Ok(html);
    }

    // Parse HTML to mutable DOM
    let document = kuchiki::parse_html().one(html);

    let mut replacement_map: HashMap<String, VecDeque<String>> = HashMap::new();
    for (src, markup) in replacements {
        replacement_map.entry(src).or_default().push_back(markup);
    }

    // Must collect nodes before iteration because we call node.detach() during
    // iteration, which invalidates the iterator.
    let matches: Vec<_> = document
        .select(selector)
        .map_err(|()| anyhow::anyhow!("Invalid selector {selector:?}"))?
        .collect();

    for node_ref in matches {
        let node = node_ref.as_node();

        let (src, marked_init) = {
            let attrs = node_ref.attributes.borrow();
            (
                attrs.get("src").map(std::string::ToString::to_string),
                attrs.get(INIT_MARKER_ATTR) == Some("true"),
            )
        };

        if marked_init {
            continue;
        }
        let Some(src) = src else { continue };
        if src.starts_with("data:") {
            continue;
        }

        let Some(queue) = replacement_map.get_mut(&src) else {
            continue;
        };
        let Some(markup) = queue.pop_front() else {
            continue;
        };

        // Parse the generated markup and splice in its <svg> root.
        let fragment = kuchiki::parse_html().one(markup);
        match fragment.select_first("svg") {
            Ok(svg) => {
                node.insert_before(svg.as_node().clone());
                node.detach();
                log::debug!("Replaced marked image with inline SVG: {src}");
            }
            Err(()) => {
                log::warn!("Generated fragment for {src} has no svg root, element left in place");
            }
        }
    }

    // Serialize back to HTML
    let mut html_output = Vec::new();
    document
        .serialize(&mut html_output)
        .context("Failed to serialize HTML after SVG replacement")?;

    String::from_utf8(html_output).context("Failed to convert HTML bytes to UTF-8 string")
}
