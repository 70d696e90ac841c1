//! Field declarations loaded from configuration files.
//!
//! A fields file is a JSON array of [`FieldConfig`] objects:
//!
//! ```json
//! [
//!   {"name": "region", "header": "Region"},
//!   {"name": "share", "visible": false},
//!   {"name": "share_pct", "is_data": false, "source": "share",
//!    "format": {"type": "percent", "precision": 1},
//!    "attributes": {"class": "num"}}
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatapageError;
use crate::Result;

use super::column::{Attributes, TableField};
use super::format::{format_factory, NumberFormat};

fn default_true() -> bool {
    true
}

/// Serializable declaration of a [`TableField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Field name; a dataset column when `is_data` is set
    pub name: String,
    /// Display header (defaults to the name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Show the field in the output
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Read the field from the dataset
    #[serde(default = "default_true")]
    pub is_data: bool,
    /// Number format applied to `source`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<NumberFormat>,
    /// Field the format reads (defaults to the name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Attributes added to every cell of the column
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl FieldConfig {
    /// Build the descriptor.
    pub fn into_field(self) -> Result<TableField> {
        let mut field = TableField::new(self.name)?
            .data(self.is_data)
            .visible(self.visible);

        if let Some(header) = self.header {
            field = field.header(header);
        }

        match (self.format, self.source) {
            (Some(format), Some(source)) => {
                field = field.value_fn(format_factory(format, source));
            }
            (Some(format), None) => field = field.format(format),
            (None, Some(_)) => {
                return Err(DatapageError::Config(format!(
                    "field '{}' sets a source without a format",
                    field.name()
                )))
            }
            (None, None) => {}
        }

        if !self.attributes.is_empty() {
            field = field.attributes(self.attributes);
        }
        Ok(field)
    }
}

/// Parse a JSON array of field declarations.
pub fn load_fields(json: &str) -> Result<Vec<TableField>> {
    let configs: Vec<FieldConfig> = serde_json::from_str(json)?;
    configs.into_iter().map(FieldConfig::into_field).collect()
}

/// Read a JSON array of field declarations from a file.
pub fn load_fields_file(path: impl AsRef<Path>) -> Result<Vec<TableField>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DatapageError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    load_fields(&content)
}
