//! Discovery of marked image elements
//!
//! Extraction is synchronous and works on a pre-parsed document so the
//! caller can drop the parse before any async work starts. Each matched
//! element is read into an owned [`MarkedImage`] record; per-element problems
//! become [`InliningError`] records instead of aborting the pass.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use url::Url;

use crate::config::{INIT_MARKER_ATTR, InlineOptions};
use crate::error::{FailureStage, InliningError};

/// Attribute contract read from one marked image element.
///
/// `title`, `description` and the gradient fields hold the raw attribute
/// values; presence/emptiness policy is applied by the converter.
#[derive(Debug, Clone, Default)]
pub struct MarkedImage {
    /// Raw `src` attribute value, as written in the document
    pub src: String,
    /// `src` resolved against the base URL
    pub resolved_url: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub gradient: Option<String>,
    pub gradient_stop_colors: Option<String>,
    pub gradient_stop_offsets: Option<String>,
}

/// Resolve a potentially relative URL against the base URL
pub fn resolve_url(base_url: &Url, href: &str) -> Result<String> {
    let resolved = base_url
        .join(href)
        .with_context(|| format!("Failed to resolve {href} against {base_url}"))?;
    Ok(resolved.to_string())
}

/// Extract marked image information from a parsed document (synchronous,
/// no async)
///
/// Returns tuple of (extracted images, failures) for error tracking. An
/// empty document match is logged as an error but is non-fatal; the caller
/// sees an empty work list.
pub fn extract_marked_images(
    document: &Html,
    base_url: &Url,
    options: &InlineOptions,
) -> Result<(Vec<MarkedImage>, Vec<InliningError>)> {
    let selector = Selector::parse(options.selector())
        .map_err(|e| anyhow::anyhow!("Invalid image selector {:?}: {e}", options.selector()))?;

    let mut images = Vec::new();
    let mut failures = Vec::new();
    let mut matched = 0usize;

    for element in document.select(&selector) {
        matched += 1;

        // Elements marked by an earlier pass are never touched again.
        if element.value().attr(INIT_MARKER_ATTR) == Some("true") {
            log::debug!("element already carries {INIT_MARKER_ATTR}, skipping");
            continue;
        }

        let Some(src) = element.value().attr("src") else {
            log::warn!("marked element has no src attribute, skipping");
            failures.push(InliningError {
                url: "(missing src)".to_string(),
                stage: FailureStage::Extract,
                error: "marked element has no src attribute".to_string(),
            });
            continue;
        };

        // Skip data URLs that are already inlined
        if src.starts_with("data:") {
            continue;
        }

        let resolved_url = match resolve_url(base_url, src) {
            Ok(url) => url,
            Err(e) => {
                let error_msg = e.to_string();
                log::warn!("Failed to resolve SVG URL {src}: {error_msg}");
                failures.push(InliningError {
                    url: src.to_string(),
                    stage: FailureStage::Extract,
                    error: error_msg,
                });
                continue;
            }
        };

        let attr = |name: &str| element.value().attr(name).map(str::to_string);

        images.push(MarkedImage {
            src: src.to_string(),
            resolved_url,
            id: attr("id"),
            class: attr("class"),
            title: attr(options.title_attr()),
            description: attr(options.description_attr()),
            gradient: attr(options.gradient_attr()),
            gradient_stop_colors: attr(options.gradient_colors_attr()),
            gradient_stop_offsets: attr(options.gradient_offsets_attr()),
        });
    }

    if matched == 0 {
        log::error!(
            "no elements matching {:?} found, nothing to inline",
            options.selector()
        );
    }

    Ok((images, failures))
}
