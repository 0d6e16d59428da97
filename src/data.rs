// Row Materializer: flattens paged, columnar host data into named rows

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;
use tracing::trace;

/// Synthetic, 1-based positional identifier of a row within a single fetch.
///
/// Ids are reassigned on every fetch and must not be stored across fetches.
pub type TupleId = usize;

/// An opaque cell as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,
}

impl DataValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            formatted_value: None,
        }
    }

    /// Text form used for value comparison: strings verbatim, integral
    /// numbers without a fraction (`72.0` and `72` both give `72`),
    /// everything else in its JSON notation (`2.5`, `true`, `null`).
    pub fn comparable_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Number(n) => canonical_number(n),
            other => other.to_string(),
        }
    }
}

fn canonical_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Describes one column of a page: the field it belongs to and its position
/// in the page's value rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub field_name: String,
    pub index: usize,
}

/// One page of host data (also the shape of a selected-marks table).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<Column>,
    pub data: Vec<Vec<DataValue>>,
}

impl DataTable {
    pub fn new(columns: Vec<Column>, data: Vec<Vec<DataValue>>) -> Self {
        Self { columns, data }
    }

    /// Build a table from field names, assigning positional indexes in order
    pub fn from_fields(fields: &[&str], data: Vec<Vec<DataValue>>) -> Self {
        let columns = fields
            .iter()
            .enumerate()
            .map(|(index, name)| Column {
                field_name: (*name).to_string(),
                index,
            })
            .collect();
        Self { columns, data }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }
}

/// A named row decorated with its tuple id.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub tuple_id: TupleId,
    pub values: HashMap<String, DataValue>,
}

impl Row {
    pub fn get(&self, field_name: &str) -> Option<&DataValue> {
        self.values.get(field_name)
    }
}

/// Flatten pages into rows, in page order then row order.
///
/// Tuple ids run 1..=N across all pages; the counter is not reset per page.
/// A column whose index falls outside a value row leaves that field absent
/// from the row rather than failing.
pub fn materialize_rows<'a, I>(pages: I) -> Vec<Row>
where
    I: IntoIterator<Item = &'a DataTable>,
{
    let mut rows = Vec::new();
    let mut next_id: TupleId = 1;

    for page in pages {
        trace!(rows = page.row_count(), columns = page.columns.len(), "materializing page");
        for values in &page.data {
            let mut named = HashMap::with_capacity(page.columns.len());
            for column in &page.columns {
                if let Some(value) = values.get(column.index) {
                    named.insert(column.field_name.clone(), value.clone());
                }
            }
            rows.push(Row {
                tuple_id: next_id,
                values: named,
            });
            next_id += 1;
        }
    }

    rows
}
