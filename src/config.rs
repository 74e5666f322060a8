//! Configuration for marked-image discovery
//!
//! `InlineOptions` names the selector and the attributes the converter reads
//! from each marked `<img>` element. All fields have defaults matching the
//! documented attribute contract, so `InlineOptions::default()` is a complete
//! configuration.

use serde::{Deserialize, Serialize};

/// Marker attribute written by earlier processing passes. Elements carrying
/// `data-svg-init="true"` in the input markup are never touched.
pub const INIT_MARKER_ATTR: &str = "data-svg-init";

/// Options controlling which elements are inlined and which attributes
/// supply their metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineOptions {
    /// CSS selector matching the image elements to inline
    pub(crate) selector: String,

    /// Attribute supplying the accessible title text
    pub(crate) title_attr: String,

    /// Attribute supplying the accessible description text
    pub(crate) description_attr: String,

    /// Attribute naming the gradient element tag (e.g. `linearGradient`)
    pub(crate) gradient_attr: String,

    /// Attribute carrying the comma-separated gradient stop colors
    pub(crate) gradient_colors_attr: String,

    /// Attribute carrying the comma-separated gradient stop offsets.
    /// The list may be shorter than the colors list; unmatched stops are
    /// emitted without an `offset`.
    pub(crate) gradient_offsets_attr: String,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            selector: r#"[data-item="svg"]"#.to_string(),
            title_attr: "data-title".to_string(),
            description_attr: "data-description".to_string(),
            gradient_attr: "data-svg-gradient".to_string(),
            gradient_colors_attr: "data-svg-gradient-stop-colors".to_string(),
            gradient_offsets_attr: "data-svg-gradient-stop-offsets".to_string(),
        }
    }
}

impl InlineOptions {
    /// Set the CSS selector matching the image elements to inline
    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Set the attribute supplying the accessible title text
    #[must_use]
    pub fn with_title_attr(mut self, attr: impl Into<String>) -> Self {
        self.title_attr = attr.into();
        self
    }

    /// Set the attribute supplying the accessible description text
    #[must_use]
    pub fn with_description_attr(mut self, attr: impl Into<String>) -> Self {
        self.description_attr = attr.into();
        self
    }

    /// Set the attribute naming the gradient element tag
    #[must_use]
    pub fn with_gradient_attr(mut self, attr: impl Into<String>) -> Self {
        self.gradient_attr = attr.into();
        self
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn title_attr(&self) -> &str {
        &self.title_attr
    }

    #[must_use]
    pub fn description_attr(&self) -> &str {
        &self.description_attr
    }

    #[must_use]
    pub fn gradient_attr(&self) -> &str {
        &self.gradient_attr
    }

    #[must_use]
    pub fn gradient_colors_attr(&self) -> &str {
        &self.gradient_colors_attr
    }

    #[must_use]
    pub fn gradient_offsets_attr(&self) -> &str {
        &self.gradient_offsets_attr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_attribute_contract() {
        let options = InlineOptions::default();
        assert_eq!(options.selector(), r#"[data-item="svg"]"#);
        assert_eq!(options.title_attr(), "data-title");
        assert_eq!(options.description_attr(), "data-description");
        assert_eq!(options.gradient_attr(), "data-svg-gradient");
        assert_eq!(options.gradient_colors_attr(), "data-svg-gradient-stop-colors");
        assert_eq!(options.gradient_offsets_attr(), "data-svg-gradient-stop-offsets");
    }

    #[test]
    fn with_selector_overrides_default() {
        let options = InlineOptions::default().with_selector("img.icon");
        assert_eq!(options.selector(), "img.icon");
        // other fields keep their defaults
        assert_eq!(options.title_attr(), "data-title");
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = InlineOptions::default().with_title_attr("data-alt");
        let json = serde_json::to_string(&options).expect("serialize options");
        let back: InlineOptions = serde_json::from_str(&json).expect("deserialize options");
        assert_eq!(back.title_attr(), "data-alt");
        assert_eq!(back.selector(), options.selector());
    }
}
