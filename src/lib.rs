pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod inliner;
pub mod rewrite;

pub use config::{INIT_MARKER_ATTR, InlineOptions};
pub use convert::{SVG_NAMESPACE, build_inline_svg};
pub use error::{ConvertError, FailureStage, InliningError, InliningResult};
pub use extract::{MarkedImage, extract_marked_images, resolve_url};
pub use fetch::{FetchConfig, download_svg};
pub use inliner::SvgInliner;
pub use rewrite::replace_marked_images;

/// Run one inlining pass with default options
pub async fn inline(html: String, base_url: &str) -> anyhow::Result<InliningResult> {
    let mut inliner = SvgInliner::new(base_url, InlineOptions::default())?;
    inliner.inline(html).await
}
