//! One-pass orchestration of extract, fetch, convert, and rewrite
//!
//! The document is parsed once and all resource information is extracted
//! synchronously, then every distinct SVG URL is downloaded concurrently,
//! and all replacements are applied in a single parse/serialize cycle.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::Client;
use url::Url;

use crate::config::InlineOptions;
use crate::convert::build_inline_svg;
use crate::error::{FailureStage, InliningError, InliningResult};
use crate::extract::{MarkedImage, extract_marked_images};
use crate::fetch::{FetchConfig, download_svg};
use crate::rewrite::replace_marked_images;

/// Converter that replaces marked `<img>` elements with accessible inline
/// `<svg>` elements
///
/// One instance owns the HTTP client and a set of already-processed URLs:
/// repeated passes over snapshots of the same page skip everything an
/// earlier pass handled (or failed), instead of flagging DOM state.
pub struct SvgInliner {
    base_url: Url,
    options: InlineOptions,
    fetch_config: FetchConfig,
    client: Client,
    processed: HashSet<String>,
}

impl SvgInliner {
    /// Create a converter for documents rooted at `base_url`
    pub fn new(base_url: &str, options: InlineOptions) -> Result<Self> {
        let base_url = Url::parse(base_url).context("Invalid base URL")?;
        Ok(Self {
            base_url,
            options,
            fetch_config: FetchConfig::default(),
            client: Client::new(),
            processed: HashSet::new(),
        })
    }

    /// Override the download timeouts and size limits
    #[must_use]
    pub fn with_fetch_config(mut self, fetch_config: FetchConfig) -> Self {
        self.fetch_config = fetch_config;
        self
    }

    #[must_use]
    pub fn options(&self) -> &InlineOptions {
        &self.options
    }

    /// Run one inlining pass over an HTML document
    ///
    /// Every marked image with a fetchable, well-formed SVG source comes back
    /// as an inline `<svg>`; everything else is left in place and reported in
    /// `failures`. A failed URL is remembered and permanently skipped on
    /// later passes of this instance.
    pub async fn inline(&mut self, html: String) -> Result<InliningResult> {
        // Parse once and extract synchronously; the parsed document must drop
        // before the first await.
        let (images, mut failures) = {
            let document = scraper::Html::parse_document(&html);
            extract_marked_images(&document, &self.base_url, &self.options)?
        };

        // Drop elements an earlier pass already handled.
        let active: Vec<MarkedImage> = images
            .into_iter()
            .filter(|image| {
                if self.processed.contains(&image.resolved_url) {
                    log::debug!("already processed, skipping: {}", image.resolved_url);
                    false
                } else {
                    true
                }
            })
            .collect();

        if active.is_empty() {
            return Ok(InliningResult {
                html,
                successes: 0,
                failures,
            });
        }

        // Mark every URL before the fetches start, so nothing can be queued
        // twice, and fetch each distinct URL once.
        let mut fetch_urls = Vec::new();
        for image in &active {
            if self.processed.insert(image.resolved_url.clone()) {
                fetch_urls.push(image.resolved_url.clone());
            }
        }

        log::debug!("fetching {} svg resource(s)", fetch_urls.len());
        let (fetched, fetch_failures) =
            download_all_svgs(fetch_urls, self.client.clone(), &self.fetch_config).await;
        failures.extend(fetch_failures);

        // Convert per element; elements sharing a URL share the fetched text.
        let mut replacements = Vec::new();
        for image in &active {
            let Some(svg_text) = fetched.get(&image.resolved_url) else {
                continue;
            };
            match build_inline_svg(image, svg_text) {
                Ok(markup) => replacements.push((image.src.clone(), markup)),
                Err(e) => {
                    log::warn!("Failed to convert SVG from {}: {e}", image.resolved_url);
                    failures.push(InliningError {
                        url: image.resolved_url.clone(),
                        stage: FailureStage::Convert,
                        error: e.to_string(),
                    });
                }
            }
        }

        let successes = replacements.len();
        let html = if replacements.is_empty() {
            html
        } else {
            replace_marked_images(html, self.options.selector(), replacements)?
        };

        Ok(InliningResult {
            html,
            successes,
            failures,
        })
    }
}

/// Download all SVGs concurrently
///
/// Returns the fetched text keyed by URL plus failure records for error
/// tracking. No retry, no concurrency limit: every URL is fetched at once.
async fn download_all_svgs(
    urls: Vec<String>,
    client: Client,
    config: &FetchConfig,
) -> (HashMap<String, String>, Vec<InliningError>) {
    let futures = urls.into_iter().map(|url| {
        let client = client.clone();
        let config = config.clone();
        let url_for_error = url.clone();

        async move {
            match download_svg(url.clone(), client, &config).await {
                Ok(svg_text) => Ok((url, svg_text)),
                Err(e) => {
                    let error_msg = e.to_string();
                    log::warn!("Failed to download SVG from {url_for_error}: {error_msg}");
                    Err(InliningError {
                        url: url_for_error,
                        stage: FailureStage::Fetch,
                        error: error_msg,
                    })
                }
            }
        }
    });

    let download_results = join_all(futures).await;

    let mut fetched = HashMap::new();
    let mut failures = Vec::new();

    for result in download_results {
        match result {
            Ok((url, svg_text)) => {
                fetched.insert(url, svg_text);
            }
            Err(error) => failures.push(error),
        }
    }

    (fetched, failures)
}
