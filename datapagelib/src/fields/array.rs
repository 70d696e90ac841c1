//! Table projection: apply a set of field descriptors to a dataset.
//!
//! A [`TableFieldArray`] owns an ordered list of [`TableField`]s and the raw
//! [`Dataset`]. From these it derives:
//!
//! 1. the data columns to pull from the dataset (`get_data_fields`)
//! 2. the visible headers (`get_output_header`)
//! 3. formatted values and cell attributes per row (`iter_formatted_rows`)
//! 4. cached views: [`TableDict`], the rendered table HTML and `df_pretty`
//!
//! The cached views are computed on first access and dropped whenever the
//! fields or the data are replaced.

use std::cell::OnceCell;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Row};
use crate::error::DatapageError;
use crate::output::table::render_table;
use crate::Result;

use super::column::{Attributes, Header, TableField};

/// Formatted values of one row with the parallel cell attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedRow {
    /// One display string per visible field
    pub values: Vec<String>,
    /// One attribute map per visible field
    pub attributes: Vec<Attributes>,
}

/// Structured head/body form of a projected table.
///
/// Carries the same information as the HTML rendering, for consumers that
/// render tables themselves (JSON APIs, client-side templates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDict {
    /// Header markup of the visible fields
    pub head: Vec<String>,
    /// Formatted rows, in dataset order
    pub body: Vec<FormattedRow>,
}

/// Lazy iterator over formatted rows.
///
/// Yields one item per dataset row; an item is an error when a value or
/// attribute function fails for that row.
pub struct FormattedRows<'a> {
    fields: Vec<&'a TableField>,
    data: Option<Dataset>,
    position: usize,
}

impl Iterator for FormattedRows<'_> {
    type Item = Result<FormattedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.data.as_ref()?.row(self.position)?;
        self.position += 1;
        Some(format_row(&self.fields, &row))
    }
}

fn format_row(fields: &[&TableField], row: &Row<'_>) -> Result<FormattedRow> {
    let mut values = Vec::with_capacity(fields.len());
    let mut attributes = Vec::with_capacity(fields.len());
    for field in fields {
        values.push(field.format_value(row)?);
        attributes.push(field.format_attributes(row)?);
    }
    Ok(FormattedRow { values, attributes })
}

/// Converts a dataset into table output through a list of field descriptors.
#[derive(Debug, Default)]
pub struct TableFieldArray {
    fields: Vec<TableField>,
    data: Option<Dataset>,
    table_dict: OnceCell<TableDict>,
    table_html: OnceCell<String>,
    df_pretty: OnceCell<Dataset>,
}

impl TableFieldArray {
    /// Create a projection over `fields` and optional data.
    ///
    /// Fails with [`DatapageError::DuplicateField`] if two fields share a name.
    pub fn new(fields: Vec<TableField>, data: Option<Dataset>) -> Result<Self> {
        check_unique(&fields)?;
        Ok(TableFieldArray {
            fields,
            data,
            ..Default::default()
        })
    }

    /// Field descriptors in display order.
    pub fn fields(&self) -> &[TableField] {
        &self.fields
    }

    /// Replace the field descriptors and drop cached output.
    pub fn set_fields(&mut self, fields: Vec<TableField>) -> Result<()> {
        check_unique(&fields)?;
        self.reset();
        self.fields = fields;
        Ok(())
    }

    /// Raw dataset, if any.
    pub fn data(&self) -> Option<&Dataset> {
        self.data.as_ref()
    }

    /// Replace the raw dataset and drop cached output.
    pub fn set_data(&mut self, data: Option<Dataset>) {
        self.reset();
        self.data = data;
    }

    fn reset(&mut self) {
        self.table_dict.take();
        self.table_html.take();
        self.df_pretty.take();
    }

    /// Iterate the field descriptors.
    pub fn iter(&self) -> std::slice::Iter<'_, TableField> {
        self.fields.iter()
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Result<&TableField> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| DatapageError::FieldNotFound(name.to_string()))
    }

    fn data_fields(&self) -> impl Iterator<Item = &TableField> {
        self.fields.iter().filter(|f| f.is_data())
    }

    fn visible_fields(&self) -> impl Iterator<Item = &TableField> {
        self.fields.iter().filter(|f| f.is_visible())
    }

    /// Names of the fields read from the dataset.
    pub fn get_data_fields(&self) -> Vec<&str> {
        self.data_fields().map(TableField::name).collect()
    }

    /// Headers of the fields read from the dataset.
    pub fn get_data_header(&self) -> Vec<Header> {
        self.data_fields().map(TableField::get_header).collect()
    }

    /// Headers of the visible fields.
    pub fn get_output_header(&self) -> Vec<Header> {
        self.visible_fields().map(TableField::get_header).collect()
    }

    /// Format every row of the dataset.
    ///
    /// The dataset is first projected onto the data fields, so value
    /// functions only see those columns. Each call starts over from the
    /// source data. Without data the iterator is empty.
    pub fn iter_formatted_rows(&self) -> Result<FormattedRows<'_>> {
        let data = match &self.data {
            Some(data) => Some(data.select(&self.get_data_fields())?),
            None => None,
        };

        for field in self.fields.iter().filter(|f| !f.is_data() && !f.is_visible()) {
            log::debug!("field '{}' is neither data nor visible", field.name());
        }

        Ok(FormattedRows {
            fields: self.visible_fields().collect(),
            data,
            position: 0,
        })
    }

    /// Structured head/body table, computed once until the next change.
    pub fn table_dict(&self) -> Result<&TableDict> {
        if let Some(dict) = self.table_dict.get() {
            return Ok(dict);
        }
        let dict = TableDict {
            head: self
                .get_output_header()
                .iter()
                .map(Header::to_html)
                .collect(),
            body: self.iter_formatted_rows()?.collect::<Result<Vec<_>>>()?,
        };
        Ok(self.table_dict.get_or_init(|| dict))
    }

    /// Table markup rendered from [`table_dict`](Self::table_dict).
    pub fn table_html(&self) -> Result<&str> {
        if let Some(html) = self.table_html.get() {
            return Ok(html);
        }
        let html = render_table(self.table_dict()?)?;
        Ok(self.table_html.get_or_init(|| html))
    }

    /// The dataset restricted to data fields, with headers as column names.
    ///
    /// Intended for raw-data export next to the formatted table. Markup
    /// headers contribute their plain text.
    pub fn df_pretty(&self) -> Result<&Dataset> {
        if let Some(pretty) = self.df_pretty.get() {
            return Ok(pretty);
        }
        let pretty = match &self.data {
            Some(data) => {
                let renames: Vec<(&str, String)> = self
                    .data_fields()
                    .map(|f| (f.name(), f.get_header().text().to_string()))
                    .collect();
                data.select(&self.get_data_fields())?.rename(&renames)
            }
            None => Dataset::new(
                self.get_data_header()
                    .iter()
                    .map(|h| h.text().to_string()),
            ),
        };
        Ok(self.df_pretty.get_or_init(|| pretty))
    }
}

impl<'a> IntoIterator for &'a TableFieldArray {
    type Item = &'a TableField;
    type IntoIter = std::slice::Iter<'a, TableField>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_unique(fields: &[TableField]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name()) {
            return Err(DatapageError::DuplicateField(field.name().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::fields::NumberFormat;
    use std::rc::Rc;

    fn sales() -> Dataset {
        Dataset::from_rows(
            ["region", "revenue", "share", "cost"],
            vec![
                vec![
                    "north".into(),
                    Value::Float(1200.0),
                    Value::Float(0.5),
                    Value::Float(10.0),
                ],
                vec![
                    "south".into(),
                    Value::Float(300.0),
                    Value::Float(0.25),
                    Value::Float(20.0),
                ],
            ],
        )
        .unwrap()
    }

    fn sales_fields() -> Vec<TableField> {
        vec![
            TableField::new("region").unwrap().header("Region"),
            TableField::new("revenue")
                .unwrap()
                .header("Revenue")
                .format(NumberFormat::euro()),
            TableField::new("share").unwrap().hidden(),
            TableField::derived(
                "share_pct",
                Rc::new(|row: &Row<'_>| NumberFormat::percent(0).apply(row.get("share")?)),
            )
            .unwrap()
            .header("Share")
            .attributes_fn(Rc::new(|row: &Row<'_>| -> Result<Attributes> {
                let mut attributes = Attributes::new();
                if row.get("share")?.as_f64()? >= 0.5 {
                    attributes.insert("class".to_string(), "high".to_string());
                }
                Ok(attributes)
            })),
        ]
    }

    #[test]
    fn test_data_and_output_headers() {
        let array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();

        assert_eq!(array.get_data_fields(), vec!["region", "revenue", "share"]);
        let headers: Vec<String> = array
            .get_output_header()
            .iter()
            .map(|h| h.text().to_string())
            .collect();
        assert_eq!(headers, vec!["Region", "Revenue", "Share"]);
    }

    #[test]
    fn test_row_widths_match_visible_fields() {
        let array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();
        let visible = array.fields().iter().filter(|f| f.is_visible()).count();
        assert_eq!(array.get_output_header().len(), visible);

        let rows: Vec<FormattedRow> = array
            .iter_formatted_rows()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.values.len(), visible);
            assert_eq!(row.attributes.len(), visible);
        }
    }

    #[test]
    fn test_formatted_values_and_attributes() {
        let array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();
        let rows: Vec<FormattedRow> = array
            .iter_formatted_rows()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows[0].values, vec!["north", "1200.00 €", "50 %"]);
        assert_eq!(rows[1].values, vec!["south", "300.00 €", "25 %"]);
        assert_eq!(rows[0].attributes[2]["class"], "high");
        assert!(rows[1].attributes[2].is_empty());
        assert!(rows[0].attributes[0].is_empty());
    }

    #[test]
    fn test_iteration_restarts() {
        let array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();
        assert_eq!(array.iter_formatted_rows().unwrap().count(), 2);
        assert_eq!(array.iter_formatted_rows().unwrap().count(), 2);
    }

    #[test]
    fn test_value_functions_see_only_data_fields() {
        let fields = vec![
            TableField::new("region").unwrap(),
            TableField::derived(
                "peek",
                Rc::new(|row: &Row<'_>| -> Result<String> {
                    Ok(row.get("cost")?.to_string())
                }),
            )
            .unwrap(),
        ];
        let array = TableFieldArray::new(fields, Some(sales())).unwrap();
        let first = array.iter_formatted_rows().unwrap().next().unwrap();
        assert!(matches!(first, Err(DatapageError::FieldNotFound(name)) if name == "cost"));
    }

    #[test]
    fn test_no_data_yields_no_rows() {
        let array = TableFieldArray::new(sales_fields(), None).unwrap();
        assert_eq!(array.iter_formatted_rows().unwrap().count(), 0);

        let dict = array.table_dict().unwrap();
        assert_eq!(dict.head.len(), 3);
        assert!(dict.body.is_empty());
    }

    #[test]
    fn test_missing_data_column() {
        let fields = vec![TableField::new("profit").unwrap()];
        let array = TableFieldArray::new(fields, Some(sales())).unwrap();
        assert!(matches!(
            array.iter_formatted_rows(),
            Err(DatapageError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_format_error_aborts_projection() {
        let data = Dataset::from_rows(
            ["amount"],
            vec![vec![Value::Float(1.0)], vec![Value::from("n/a")]],
        )
        .unwrap();
        let fields = vec![TableField::new("amount")
            .unwrap()
            .format(NumberFormat::euro())];
        let array = TableFieldArray::new(fields, Some(data)).unwrap();

        assert!(matches!(
            array.table_dict(),
            Err(DatapageError::Format { .. })
        ));
        assert!(array.table_html().is_err());
    }

    #[test]
    fn test_get_field() {
        let array = TableFieldArray::new(sales_fields(), None).unwrap();
        assert_eq!(array.get_field("share").unwrap().name(), "share");
        assert!(matches!(
            array.get_field("nope"),
            Err(DatapageError::FieldNotFound(name)) if name == "nope"
        ));

        let names: Vec<&str> = array.iter().map(TableField::name).collect();
        assert_eq!(names, vec!["region", "revenue", "share", "share_pct"]);
        assert_eq!((&array).into_iter().count(), 4);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let fields = vec![
            TableField::new("x").unwrap(),
            TableField::new("x").unwrap().hidden(),
        ];
        assert!(matches!(
            TableFieldArray::new(fields.clone(), None),
            Err(DatapageError::DuplicateField(name)) if name == "x"
        ));

        let mut array = TableFieldArray::default();
        assert!(array.set_fields(fields).is_err());
        assert!(array.fields().is_empty());
    }

    #[test]
    fn test_table_dict_is_memoized() {
        let array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();
        let first = array.table_dict().unwrap() as *const TableDict;
        let second = array.table_dict().unwrap() as *const TableDict;
        assert!(std::ptr::eq(first, second));
        assert_eq!(array.table_dict().unwrap().head[0], "Region");
    }

    #[test]
    fn test_cache_invalidation() {
        let mut array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();
        assert_eq!(array.table_dict().unwrap().body.len(), 2);
        assert!(array.table_html().unwrap().contains("north"));

        let smaller = Dataset::from_rows(
            ["region", "revenue", "share"],
            vec![vec!["east".into(), Value::Int(7), Value::Float(0.1)]],
        )
        .unwrap();
        array.set_data(Some(smaller));
        let dict = array.table_dict().unwrap();
        assert_eq!(dict.body.len(), 1);
        assert_eq!(dict.body[0].values[0], "east");
        assert!(array.table_html().unwrap().contains("east"));
        assert!(!array.table_html().unwrap().contains("north"));

        array
            .set_fields(vec![TableField::new("region").unwrap().header("Where")])
            .unwrap();
        assert_eq!(array.table_dict().unwrap().head, vec!["Where"]);
        assert_eq!(array.df_pretty().unwrap().columns(), &["Where"]);
    }

    #[test]
    fn test_df_pretty() {
        let array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();
        let pretty = array.df_pretty().unwrap();

        assert_eq!(pretty.columns(), &["Region", "Revenue", "share"]);
        assert_eq!(pretty.len(), 2);
        assert_eq!(
            pretty.rows().next().unwrap().get("Revenue").unwrap(),
            &Value::Float(1200.0)
        );
        assert_eq!(array.data().unwrap().columns()[0], "region");
    }

    #[test]
    fn test_df_pretty_uses_markup_text() {
        let fields = vec![TableField::new("region").unwrap().header(Header::Markup {
            html: "<b>Region</b>".to_string(),
            text: "Region".to_string(),
        })];
        let array = TableFieldArray::new(fields, Some(sales())).unwrap();

        assert_eq!(array.df_pretty().unwrap().columns(), &["Region"]);
        assert_eq!(array.table_dict().unwrap().head, vec!["<b>Region</b>"]);
    }

    #[test]
    fn test_df_pretty_without_data() {
        let array = TableFieldArray::new(sales_fields(), None).unwrap();
        let pretty = array.df_pretty().unwrap();
        assert_eq!(pretty.columns(), &["Region", "Revenue", "share"]);
        assert!(pretty.is_empty());
    }

    #[test]
    fn test_table_dict_serializes() {
        let array = TableFieldArray::new(sales_fields(), Some(sales())).unwrap();
        let value = serde_json::to_value(array.table_dict().unwrap()).unwrap();
        assert_eq!(value["head"][1], "Revenue");
        assert_eq!(value["body"][0]["values"][1], "1200.00 €");
        assert_eq!(value["body"][0]["attributes"][2]["class"], "high");
    }

    #[test]
    fn test_table_html_default_formatting() {
        let data = Dataset::from_rows(
            ["x"],
            vec![vec![Value::Float(1.0)], vec![Value::Float(2.5)]],
        )
        .unwrap();
        let array = TableFieldArray::new(vec![TableField::new("x").unwrap()], Some(data)).unwrap();
        let html = array.table_html().unwrap();

        let body = &html[html.find("<tbody>").unwrap()..];
        assert_eq!(body.matches("<tr>").count(), 2);
        assert_eq!(body.matches("<td>").count(), 2);
        assert!(body.contains("<td>1.0</td>"));
        assert!(body.contains("<td>2.5</td>"));
        assert!(html.contains("<th>x</th>"));
    }
}
