//! # datapagelib
//!
//! Turn tabular data into standalone HTML report pages.
//!
//! ## Overview
//!
//! The library has two layers:
//!
//! - **Fields**: declarative column descriptors that project a dataset into
//!   a formatted table (headers, per-cell markup, per-cell attributes)
//! - **Pages**: a composite document that collects tables, images and charts
//!   and publishes them as a single HTML file
//!
//! ## Features
//!
//! - **Lazy, memoized projections**: the structured table, its HTML and the
//!   relabelled dataset are computed once and reset when fields or data change
//! - **Number formats**: integer, euro and percent formatters plus a factory
//!   for derived columns
//! - **Charts**: raster charts as base64 images, Vega-Lite charts with CDN or
//!   inline resources
//! - **Explicit options**: every render call takes its options as an argument
//!
//! ## Example
//!
//! ```rust
//! use datapagelib::{
//!     CompositePage, Dataset, ElementOptions, NumberFormat, TableField, TableFieldArray,
//! };
//! use tempfile::tempdir;
//!
//! let data = Dataset::from_json(
//!     r#"{"columns": ["region", "share"], "rows": [["north", 0.25], ["south", 0.75]]}"#,
//! )
//! .unwrap();
//!
//! let fields = vec![
//!     TableField::new("region").unwrap().header("Region"),
//!     TableField::new("share")
//!         .unwrap()
//!         .header("Share")
//!         .format(NumberFormat::percent(1)),
//! ];
//! let table = TableFieldArray::new(fields, Some(data)).unwrap();
//! assert_eq!(table.table_dict().unwrap().body[0].values, vec!["north", "25.0 %"]);
//!
//! let mut page = CompositePage::new().title("Regions");
//! page.add_table_from_fields(&table, ElementOptions::new().title("Share by region"))
//!     .unwrap();
//!
//! let dir = tempdir().unwrap();
//! let path = page.publish_in(dir.path(), Some("regions"), false).unwrap();
//! assert!(path.ends_with("regions.html"));
//! ```

pub mod data;
pub mod error;
pub mod fields;
pub mod names;
pub mod options;
pub mod output;

pub use data::{Dataset, Row, Value};
pub use error::DatapageError;
pub use fields::{
    format_euro, format_factory, format_int, format_non_scientific, format_percent, load_fields,
    load_fields_file, Attributes, AttributesFn, FieldConfig, FormattedRow, Header, NumberFormat,
    TableDict, TableField, TableFieldArray, ValueFn,
};
pub use names::{extract_name, output_file_stem, validate_name};
pub use options::{HtmlTableOptions, ResourceMode};
pub use output::{
    access_url, dataset_to_html, image_to_html, CompositePage, ElementOptions, ImageFormat,
    InteractiveChart, PageElement, RasterChart, VegaLiteChart,
};

/// Result type for datapagelib operations
pub type Result<T> = std::result::Result<T, DatapageError>;
