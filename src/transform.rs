use anyhow::Result;
use indexmap::IndexMap;
use tracing::debug;

use crate::data::{materialize_rows, Row};
use crate::host::{read_all_pages, Worksheet};
use crate::ir::{EncodedRow, EncodedSelection, FetchedData};
use crate::resolve::{resolve_encoding_map, EncodingMap};
use crate::selection::selected_tuples;

/// Project rows onto the encoding channels.
///
/// Output preserves row order and tuple ids. For every channel, each row gets
/// one entry per assigned field; fields missing from the row become `None`.
pub fn encode(rows: &[Row], map: &EncodingMap) -> Vec<EncodedRow> {
    rows.iter()
        .map(|row| {
            let channels: IndexMap<String, Vec<_>> = map
                .iter()
                .map(|(channel, fields)| {
                    let values = fields.iter().map(|f| row.get(&f.name).cloned()).collect();
                    (channel.clone(), values)
                })
                .collect();
            EncodedRow {
                tuple_id: row.tuple_id,
                channels,
            }
        })
        .collect()
}

/// Read every summary-data page in order and materialize the rows
pub async fn fetch_rows<W: Worksheet>(worksheet: &W) -> Result<Vec<Row>> {
    let reader = worksheet.summary_data_reader().await?;
    let pages = read_all_pages(reader).await?;
    let rows = materialize_rows(&pages);
    debug!(rows = rows.len(), "materialized summary data");
    Ok(rows)
}

pub async fn fetch_encoding_map<W: Worksheet>(worksheet: &W) -> Result<EncodingMap> {
    let spec = worksheet.visual_specification().await?;
    resolve_encoding_map(&spec)
}

/// Fetch the rows and the visual specification concurrently, then encode.
pub async fn fetch_rows_and_encoding<W: Worksheet>(worksheet: &W) -> Result<FetchedData> {
    let (rows, map) = futures::try_join!(fetch_rows(worksheet), fetch_encoding_map(worksheet))?;
    let encoded = encode(&rows, &map);
    Ok(FetchedData { rows, encoded })
}

pub async fn get_encoded_data<W: Worksheet>(worksheet: &W) -> Result<Vec<EncodedRow>> {
    Ok(fetch_rows_and_encoding(worksheet).await?.encoded)
}

/// Encoded rows plus the tuple ids matching the host's current selection.
///
/// The selection query runs alongside the data and specification fetches.
pub async fn get_encoded_data_and_selected_tuples<W: Worksheet>(
    worksheet: &W,
) -> Result<EncodedSelection> {
    let (fetched, marks) = futures::try_join!(
        fetch_rows_and_encoding(worksheet),
        worksheet.selected_marks()
    )?;
    let selected_tuples = selected_tuples(&fetched.rows, &marks)?;

    Ok(EncodedSelection {
        encoded: fetched.encoded,
        selected_tuples,
    })
}
