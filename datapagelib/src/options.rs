//! Options that control how raw tables and charts are rendered.
//!
//! Every option is passed explicitly into the render call that uses it;
//! nothing here is process-wide state.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Formatting of a raw dataset rendered as a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlTableOptions {
    /// Convert float columns to integers where no information is lost
    pub int_convert: bool,
    /// Display floats without scientific notation for everyday magnitudes
    pub non_scientific: bool,
}

impl Default for HtmlTableOptions {
    fn default() -> Self {
        Self {
            int_convert: true,
            non_scientific: true,
        }
    }
}

impl HtmlTableOptions {
    /// Default options: integer conversion and non-scientific floats
    pub fn new() -> Self {
        Self::default()
    }

    /// Show values exactly as stored
    pub fn raw() -> Self {
        Self {
            int_convert: false,
            non_scientific: false,
        }
    }

    /// Builder: set integer conversion
    pub fn with_int_convert(mut self, enabled: bool) -> Self {
        self.int_convert = enabled;
        self
    }

    /// Builder: set non-scientific float display
    pub fn with_non_scientific(mut self, enabled: bool) -> Self {
        self.non_scientific = enabled;
        self
    }
}

/// Where interactive charts load their JavaScript and CSS from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceMode {
    /// Reference resources on a CDN
    #[default]
    Cdn,
    /// Embed resources in the page
    Inline,
}

impl FromStr for ResourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cdn" => Ok(ResourceMode::Cdn),
            "inline" => Ok(ResourceMode::Inline),
            _ => Err(format!("Unknown resource mode: {}", s)),
        }
    }
}
