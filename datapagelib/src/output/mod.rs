//! Output: HTML tables, chart embedding and the composite page.
//!
//! Everything is rendered through the handlebars templates bundled with the
//! crate. [`CompositePage`] collects tables, images and charts and writes
//! them as one self-contained HTML document.

pub mod chart;
pub mod page;
pub mod table;
pub(crate) mod templates;

pub use chart::{
    image_to_html, ChartEmbed, ImageFormat, InteractiveChart, RasterChart, VegaLiteChart,
    DEFAULT_DPI,
};
pub use page::{access_url, CompositePage, ElementOptions, PageElement};
pub use table::{dataset_to_html, render_table};
