//! SVG resource downloading
//!
//! Streaming download with a size cap enforced both from `Content-Length`
//! and again while the body accumulates. Fetched markup is prepared for
//! inline embedding: the XML prolog is stripped and any SVG DOCTYPE is
//! commented out, since neither may appear inside an HTML document.

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;

/// Browser-like User-Agent sent with SVG requests
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Configuration for download timeouts and size limits
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for a single SVG download
    pub svg_timeout: std::time::Duration,

    /// Maximum size for SVG downloads (bytes)
    /// SVGs are text-based and should be small
    /// Typical: 5-50KB, Complex: 100-500KB
    pub max_svg_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            svg_timeout: std::time::Duration::from_secs(30),
            max_svg_size: 1024 * 1024, // 1MB
        }
    }
}

/// Download SVG content and prepare it for inline use
///
/// Handles HTTP download with streaming, size limits, and timeout.
pub async fn download_svg(url: String, client: Client, config: &FetchConfig) -> Result<String> {
    // Download with timeout and browser-like headers
    let response = client
        .get(&url)
        .timeout(config.svg_timeout)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "image/svg+xml,*/*;q=0.8")
        .header("Accept-Encoding", "gzip, deflate, br")
        .send()
        .await
        .context("Failed to download SVG")?;

    // Check status
    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "SVG download failed with status: {}",
            response.status()
        ));
    }

    // Get expected size and enforce limit BEFORE downloading
    let expected_size = response.content_length().unwrap_or(0);
    if expected_size > config.max_svg_size as u64 {
        return Err(anyhow::anyhow!(
            "SVG too large: {} bytes exceeds limit of {} bytes",
            expected_size,
            config.max_svg_size
        ));
    }

    // Pre-allocate buffer based on Content-Length
    let mut buffer = if expected_size > 0 {
        Vec::with_capacity(expected_size as usize)
    } else {
        Vec::new()
    };

    // Stream response with size checking (second line of defense)
    let mut stream = response.bytes_stream();
    let mut total_size = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.context("Failed to read SVG chunk")?;

        // Check BEFORE accumulating
        let new_total = total_size + chunk.len();
        if new_total > config.max_svg_size {
            return Err(anyhow::anyhow!(
                "SVG download exceeded size limit during download: {} bytes (max: {})",
                new_total,
                config.max_svg_size
            ));
        }

        buffer.extend_from_slice(&chunk);
        total_size = new_total;
    }

    let text = String::from_utf8(buffer).context("SVG content is not valid UTF-8")?;

    Ok(prepare_for_inline(text))
}

/// Clean up fetched SVG markup for embedding in an HTML document
fn prepare_for_inline(text: String) -> String {
    let mut cleaned = text;

    // Remove XML prolog
    if let Some(decl_start) = cleaned.find("<?xml") {
        if let Some(decl_end_offset) = cleaned[decl_start..].find("?>") {
            let decl_end = decl_start + decl_end_offset + 2;
            cleaned.replace_range(decl_start..decl_end, "");
        }
    }

    // Comment out DOCTYPE if present
    if let Some(doctype_start) = cleaned.find("<!DOCTYPE svg") {
        // Find the closing '>' of the DOCTYPE specifically
        if let Some(doctype_end_offset) = cleaned[doctype_start..].find('>') {
            let doctype_end = doctype_start + doctype_end_offset + 1;

            let doctype = &cleaned[doctype_start..doctype_end];
            let commented = format!("<!--{doctype}-->");
            cleaned.replace_range(doctype_start..doctype_end, &commented);
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_xml_prolog() {
        let input = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg></svg>".to_string();
        let cleaned = prepare_for_inline(input);
        assert!(!cleaned.contains("<?xml"));
        assert!(cleaned.contains("<svg></svg>"));
    }

    #[test]
    fn strips_single_quoted_prolog() {
        let input = "<?xml version='1.0' standalone='no'?><svg/>".to_string();
        let cleaned = prepare_for_inline(input);
        assert!(!cleaned.contains("<?xml"));
    }

    #[test]
    fn comments_out_doctype() {
        let input = concat!(
            "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" ",
            "\"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">",
            "<svg></svg>"
        )
        .to_string();
        let cleaned = prepare_for_inline(input);
        assert!(cleaned.starts_with("<!--<!DOCTYPE svg"));
        assert!(cleaned.contains("-->"));
        assert!(cleaned.ends_with("<svg></svg>"));
    }

    #[test]
    fn plain_markup_passes_through() {
        let input = "<svg viewBox=\"0 0 10 10\"><path d=\"M0 0\"/></svg>".to_string();
        assert_eq!(prepare_for_inline(input.clone()), input);
    }
}
