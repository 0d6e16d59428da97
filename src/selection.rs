// Selection Matcher: resolves host-reported selected marks to tuple ids

use anyhow::Result;
use std::collections::HashSet;
use tracing::debug;

use crate::data::{materialize_rows, Column, Row, TupleId};
use crate::error::Error;
use crate::host::MarksCollection;

pub type SelectedTuples = HashSet<TupleId>;

/// Composite value-tuple key of a row over a fixed column list.
///
/// Each position holds the comparable text of the row's value for that
/// column, or `None` when the row has no such field. Keeping the parts
/// separate means no value can collide with another by concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey(Vec<Option<String>>);

impl SelectionKey {
    pub fn for_row(row: &Row, columns: &[Column]) -> Self {
        Self(
            columns
                .iter()
                .map(|c| row.get(&c.field_name).map(|v| v.comparable_text()))
                .collect(),
        )
    }
}

/// Mark every row whose value tuple equals that of some selected row.
///
/// Ids are the 1-based position of each row in `all_rows`. Rows sharing a
/// value tuple are all selected. With no selected rows, `all_rows` is not
/// touched at all.
pub fn match_selection<'a, I>(all_rows: I, selected_rows: &[Row], columns: &[Column]) -> SelectedTuples
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut selected = SelectedTuples::new();
    if selected_rows.is_empty() {
        return selected;
    }

    let lookup: HashSet<SelectionKey> = selected_rows
        .iter()
        .map(|row| SelectionKey::for_row(row, columns))
        .collect();

    for (position, row) in all_rows.into_iter().enumerate() {
        if lookup.contains(&SelectionKey::for_row(row, columns)) {
            selected.insert(position + 1);
        }
    }

    selected
}

/// Match a selected-marks query result against the worksheet's rows.
///
/// Only a single marks table is supported; more than one fails with
/// [`Error::MultipleTables`] instead of silently using the first.
pub fn selected_tuples(all_rows: &[Row], marks: &MarksCollection) -> Result<SelectedTuples> {
    let table = match marks.data.as_slice() {
        [] => return Ok(SelectedTuples::new()),
        [table] => table,
        tables => return Err(Error::MultipleTables(tables.len()).into()),
    };

    let selected_rows = materialize_rows([table]);
    let selected = match_selection(all_rows, &selected_rows, &table.columns);
    debug!(
        selected_marks = selected_rows.len(),
        matched = selected.len(),
        "matched selection"
    );
    Ok(selected)
}
