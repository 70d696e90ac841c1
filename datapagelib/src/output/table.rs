//! HTML table rendering.
//!
//! Both the field-based projection ([`TableDict`]) and raw datasets end up in
//! the same table template. The template receives one context object per
//! cell so it never has to pair values with attributes itself.

use handlebars::html_escape;
use serde::Serialize;

use crate::data::{Dataset, Value};
use crate::fields::{format_non_scientific, Attributes, FormattedRow, TableDict};
use crate::options::HtmlTableOptions;
use crate::Result;

use super::templates::{self, TABLE};

/// One HTML attribute of a cell
#[derive(Debug, Serialize)]
struct TemplateAttribute<'a> {
    name: &'a str,
    value: &'a str,
}

/// One body cell: markup plus attributes
#[derive(Debug, Serialize)]
struct TemplateCell<'a> {
    value: &'a str,
    attributes: Vec<TemplateAttribute<'a>>,
}

/// Data context for the table template
#[derive(Debug, Serialize)]
struct TableContext<'a> {
    head: &'a [String],
    body: Vec<Vec<TemplateCell<'a>>>,
}

fn to_template_row(row: &FormattedRow) -> Vec<TemplateCell<'_>> {
    row.values
        .iter()
        .enumerate()
        .map(|(i, value)| TemplateCell {
            value,
            attributes: row
                .attributes
                .get(i)
                .map(|attributes| {
                    attributes
                        .iter()
                        .map(|(name, value)| TemplateAttribute { name, value })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}

/// Render a structured table as HTML.
///
/// The head row is omitted when there are no headers, the body when there
/// are no rows. Head entries and cell values are inserted as markup;
/// attribute values are escaped.
pub fn render_table(table: &TableDict) -> Result<String> {
    let context = TableContext {
        head: &table.head,
        body: table.body.iter().map(to_template_row).collect(),
    };
    templates::render(TABLE, &context)
}

/// Render a raw dataset as an HTML table.
///
/// Column names become the head row. With `int_convert`, float columns that
/// hold only whole numbers are shown as integers; with `non_scientific`,
/// floats use [`format_non_scientific`]. Missing values show as `NaN`.
pub fn dataset_to_html(data: &Dataset, options: HtmlTableOptions) -> Result<String> {
    let converted;
    let data = if options.int_convert {
        converted = data.convert_int_columns();
        &converted
    } else {
        data
    };

    let table = TableDict {
        head: data.columns().iter().map(|c| html_escape(c)).collect(),
        body: data
            .rows()
            .map(|row| FormattedRow {
                values: row
                    .iter()
                    .map(|(_, value)| html_escape(&display_value(value, options)))
                    .collect(),
                attributes: vec![Attributes::new(); data.columns().len()],
            })
            .collect(),
    };
    render_table(&table)
}

fn display_value(value: &Value, options: HtmlTableOptions) -> String {
    match value {
        Value::Null => "NaN".to_string(),
        Value::Float(x) if options.non_scientific => format_non_scientific(*x),
        other => other.to_string(),
    }
}
