//! Column descriptors: where a table column comes from and how it is shown.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use handlebars::html_escape;

use crate::data::Row;
use crate::error::DatapageError;
use crate::names::validate_name;
use crate::Result;

use super::format::{format_factory, NumberFormat};

/// HTML attributes for one table cell, by attribute name.
pub type Attributes = BTreeMap<String, String>;

/// Maps a data row to the display string of a cell.
pub type ValueFn = Rc<dyn Fn(&Row<'_>) -> Result<String>>;

/// Maps a data row to the HTML attributes of a cell.
pub type AttributesFn = Rc<dyn Fn(&Row<'_>) -> Result<Attributes>>;

/// Display label of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// Plain text, escaped when rendered as HTML.
    Text(String),
    /// Pre-rendered markup, with the plain text used for column names.
    Markup { html: String, text: String },
}

impl Header {
    /// Markup for a table head cell.
    pub fn to_html(&self) -> String {
        match self {
            Header::Text(text) => html_escape(text),
            Header::Markup { html, .. } => html.clone(),
        }
    }

    /// Plain string representation, used when the header names a dataset column.
    pub fn text(&self) -> &str {
        match self {
            Header::Text(text) => text,
            Header::Markup { text, .. } => text,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<&str> for Header {
    fn from(value: &str) -> Self {
        Header::Text(value.to_string())
    }
}

impl From<String> for Header {
    fn from(value: String) -> Self {
        Header::Text(value)
    }
}

/// Declares one output column of a [`TableFieldArray`](super::TableFieldArray).
///
/// A field is either read from the dataset (`is_data`), shown in the output
/// (`visible`), or both. Data fields that are not visible can still be used by
/// the value functions of other fields. A field that is neither contributes
/// nothing and is ignored.
///
/// Constructing a field never touches data: the value and attribute functions
/// run later, once per row, when the table is projected.
#[derive(Clone)]
pub struct TableField {
    name: String,
    is_data: bool,
    visible: bool,
    header: Option<Header>,
    value_fn: Option<ValueFn>,
    attributes_fn: Option<AttributesFn>,
}

impl TableField {
    /// Create a visible data field. The name must match `[0-9A-Za-z_]+`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DatapageError::InvalidName(name));
        }
        validate_name(&name)?;
        Ok(TableField {
            name,
            is_data: true,
            visible: true,
            header: None,
            value_fn: None,
            attributes_fn: None,
        })
    }

    /// Create a visible field that is computed rather than read from the data.
    pub fn derived(name: impl Into<String>, value_fn: ValueFn) -> Result<Self> {
        Ok(Self::new(name)?.data(false).value_fn(value_fn))
    }

    /// Builder: set whether the field is read from the dataset
    pub fn data(mut self, is_data: bool) -> Self {
        self.is_data = is_data;
        self
    }

    /// Builder: set whether the field is shown in the output
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder: hide the field from the output
    pub fn hidden(self) -> Self {
        self.visible(false)
    }

    /// Builder: set the display header
    pub fn header(mut self, header: impl Into<Header>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Builder: set the value function
    pub fn value_fn(mut self, value_fn: ValueFn) -> Self {
        self.value_fn = Some(value_fn);
        self
    }

    /// Builder: format this field's own value with a built-in number format
    pub fn format(self, format: NumberFormat) -> Self {
        let name = self.name.clone();
        self.value_fn(format_factory(format, name))
    }

    /// Builder: set the attribute function
    pub fn attributes_fn(mut self, attributes_fn: AttributesFn) -> Self {
        self.attributes_fn = Some(attributes_fn);
        self
    }

    /// Builder: give every cell of this column the same attributes
    pub fn attributes(self, attributes: Attributes) -> Self {
        self.attributes_fn(Rc::new(move |_: &Row<'_>| -> Result<Attributes> {
            Ok(attributes.clone())
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_data(&self) -> bool {
        self.is_data
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Display header, falling back to the field name.
    pub fn get_header(&self) -> Header {
        self.header
            .clone()
            .unwrap_or_else(|| Header::Text(self.name.clone()))
    }

    /// Replace the display header.
    pub fn set_header(&mut self, header: Option<Header>) {
        self.header = header;
    }

    /// Whether an explicit header was set.
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Display string of this field for one row.
    ///
    /// Without a value function, the named field is stringified and escaped.
    pub fn format_value(&self, row: &Row<'_>) -> Result<String> {
        match &self.value_fn {
            Some(value_fn) => value_fn(row),
            None => Ok(html_escape(&row.get(&self.name)?.to_string())),
        }
    }

    /// Cell attributes of this field for one row (empty by default).
    pub fn format_attributes(&self, row: &Row<'_>) -> Result<Attributes> {
        match &self.attributes_fn {
            Some(attributes_fn) => attributes_fn(row),
            None => Ok(Attributes::new()),
        }
    }
}

impl fmt::Debug for TableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableField")
            .field("name", &self.name)
            .field("is_data", &self.is_data)
            .field("visible", &self.visible)
            .field("header", &self.header)
            .field("value_fn", &self.value_fn.is_some())
            .field("attributes_fn", &self.attributes_fn.is_some())
            .finish()
    }
}
