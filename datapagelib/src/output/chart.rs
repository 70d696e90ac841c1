//! Chart embedding.
//!
//! Static charts end up as base64 images inside the page. Interactive charts
//! contribute head resources plus a script that binds the chart to a
//! placeholder element.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::options::ResourceMode;
use crate::Result;

/// Resolution used for raster charts when none is given.
pub const DEFAULT_DPI: u32 = 75;

/// Image encodings that can be embedded as data URIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
    Svg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

/// Wrap encoded image bytes in an `<img>` inside a `<div>`.
pub fn image_to_html(bytes: &[u8], format: ImageFormat) -> String {
    format!(
        "<div><img src=\"data:{};base64,{}\" /></div>",
        format.mime_type(),
        STANDARD.encode(bytes)
    )
}

/// A chart that can draw itself as a PNG image.
pub trait RasterChart {
    fn render_png(&self, dpi: u32) -> Result<Vec<u8>>;
}

/// Markup produced for one interactive chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartEmbed {
    /// Placeholder element that receives the chart
    pub div: String,
    /// Script that draws the chart into the placeholder
    pub script: String,
}

/// A chart rendered client-side by a JavaScript library.
pub trait InteractiveChart {
    /// Head elements (script and stylesheet tags) the chart library needs.
    ///
    /// Identical entries from several charts are emitted once.
    fn resources(&self, mode: ResourceMode) -> Vec<String>;

    /// Placeholder and binding script for the DOM id `target_id`.
    fn embed(&self, target_id: &str) -> Result<ChartEmbed>;
}

const VEGA_CDN_SCRIPTS: [&str; 3] = [
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

/// A Vega-Lite chart drawn with vega-embed.
///
/// Inline resources need the library bundle supplied through
/// [`with_inline_bundle`](Self::with_inline_bundle); without one the chart
/// falls back to the CDN.
#[derive(Debug, Clone, PartialEq)]
pub struct VegaLiteChart {
    spec: serde_json::Value,
    inline_bundle: Option<String>,
}

impl VegaLiteChart {
    pub fn new(spec: serde_json::Value) -> Self {
        VegaLiteChart {
            spec,
            inline_bundle: None,
        }
    }

    /// Builder: JavaScript source of vega, vega-lite and vega-embed
    pub fn with_inline_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.inline_bundle = Some(bundle.into());
        self
    }

    pub fn spec(&self) -> &serde_json::Value {
        &self.spec
    }

    fn cdn_resources() -> Vec<String> {
        VEGA_CDN_SCRIPTS
            .iter()
            .map(|src| format!("<script src=\"{}\"></script>", src))
            .collect()
    }
}

impl InteractiveChart for VegaLiteChart {
    fn resources(&self, mode: ResourceMode) -> Vec<String> {
        match (mode, &self.inline_bundle) {
            (ResourceMode::Inline, Some(bundle)) => {
                vec![format!("<script type=\"text/javascript\">{}</script>", bundle)]
            }
            (ResourceMode::Inline, None) => {
                log::warn!("no inline bundle for Vega-Lite chart, using CDN resources");
                Self::cdn_resources()
            }
            (ResourceMode::Cdn, _) => Self::cdn_resources(),
        }
    }

    /// The script runs once the document is parsed, so it may sit in the head.
    fn embed(&self, target_id: &str) -> Result<ChartEmbed> {
        // `</` inside a string literal would end the script element early
        let spec = serde_json::to_string(&self.spec)?.replace("</", "<\\/");
        Ok(ChartEmbed {
            div: format!("<div id=\"{}\"></div>", target_id),
            script: format!(
                "<script type=\"text/javascript\">\
                 document.addEventListener(\"DOMContentLoaded\", function () {{ \
                 vegaEmbed(\"#{}\", {}); }});</script>",
                target_id, spec
            ),
        })
    }
}
