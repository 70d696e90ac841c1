//! Field descriptors: project a dataset into a formatted HTML table.
//!
//! A [`TableField`] describes one output column: whether it reads from the
//! dataset, whether it is shown, its header and how a cell is formatted.
//! A [`TableFieldArray`] holds an ordered set of descriptors plus the data
//! and memoizes the projections derived from them.

pub mod array;
pub mod column;
pub mod config;
pub mod format;

pub use array::{FormattedRow, FormattedRows, TableDict, TableFieldArray};
pub use column::{Attributes, AttributesFn, Header, TableField, ValueFn};
pub use config::{load_fields, load_fields_file, FieldConfig};
pub use format::{
    format_euro, format_factory, format_int, format_non_scientific, format_percent, NumberFormat,
};
