// Worksheet host backed by a captured JSON snapshot of the host's responses

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::data::DataTable;
use crate::host::{MarksCollection, PageReader, VisualSpecification, Worksheet};

/// Everything the host would answer for one fetch cycle.
///
/// ```json
/// {
///   "summaryData": [{ "columns": [...], "data": [[...]] }],
///   "visualSpecification": { "activeMarksSpecificationIndex": 0, "marksSpecifications": [...] },
///   "selectedMarks": { "data": [{ "columns": [...], "data": [[...]] }] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotWorksheet {
    #[serde(default)]
    pub summary_data: Vec<DataTable>,
    #[serde(default)]
    pub visual_specification: VisualSpecification,
    #[serde(default)]
    pub selected_marks: MarksCollection,
}

impl SnapshotWorksheet {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse worksheet snapshot")
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).context("Failed to parse worksheet snapshot")
    }
}

/// Hands out snapshot pages strictly in order
#[derive(Debug)]
pub struct SnapshotReader {
    pages: Vec<DataTable>,
    next: usize,
}

impl PageReader for SnapshotReader {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn page(&mut self, index: usize) -> Result<DataTable> {
        if index != self.next {
            bail!("page {} requested out of order (expected {})", index, self.next);
        }
        let page = self
            .pages
            .get_mut(index)
            .map(std::mem::take)
            .with_context(|| format!("page {} out of range", index))?;
        self.next += 1;
        Ok(page)
    }

    async fn release(self) -> Result<()> {
        Ok(())
    }
}

impl Worksheet for SnapshotWorksheet {
    type Reader = SnapshotReader;

    async fn summary_data_reader(&self) -> Result<SnapshotReader> {
        Ok(SnapshotReader {
            pages: self.summary_data.clone(),
            next: 0,
        })
    }

    async fn visual_specification(&self) -> Result<VisualSpecification> {
        Ok(self.visual_specification.clone())
    }

    async fn selected_marks(&self) -> Result<MarksCollection> {
        Ok(self.selected_marks.clone())
    }
}
