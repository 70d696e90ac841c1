//! Tabular data: cell values and column-ordered datasets.
//!
//! This is the input side of the pipeline. A [`Dataset`] is a small
//! in-memory frame with named columns in a fixed order, loaded from JSON or
//! built in code. Fields and pages only ever read from it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use datapagelib::data::Dataset;
//!
//! let data = Dataset::from_json(r#"{"columns": ["x"], "rows": [[1.0], [2.0]]}"#)?;
//! let tidy = data.convert_int_columns();
//! ```

pub mod dataset;
pub mod value;

pub use dataset::{Dataset, Row};
pub use value::Value;
