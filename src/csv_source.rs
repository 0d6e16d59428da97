// Worksheet host backed by a CSV file, paged like the host's summary data

use anyhow::{bail, Context, Result};
use serde_json::{Number, Value};
use std::io::Read;

use crate::data::{DataTable, DataValue};
use crate::host::{Encoding, Field, MarksCollection, MarksSpecification, PageReader, VisualSpecification, Worksheet};
use crate::PageOptions;

#[derive(Debug, Clone)]
pub struct CsvWorksheet {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    page_size: usize,
    encodings: Vec<Encoding>,
    /// 1-based record ordinals reported as selected
    selected: Vec<usize>,
}

impl CsvWorksheet {
    /// Read a CSV with a header row
    pub fn from_reader<R: Read>(reader: R, options: &PageOptions) -> Result<Self> {
        if options.page_size == 0 {
            bail!("page size must be at least 1");
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (line, result) in csv_reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV record {}", line + 1))?;
            records.push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        Ok(Self {
            headers,
            records,
            page_size: options.page_size,
            encodings: Vec::new(),
            selected: Vec::new(),
        })
    }

    /// Assign fields to an encoding channel, appended after earlier assignments
    pub fn with_encoding<S: AsRef<str>>(mut self, channel: &str, fields: &[S]) -> Self {
        for field in fields {
            self.encodings.push(Encoding {
                id: channel.to_string(),
                field: Field::new(field.as_ref()),
            });
        }
        self
    }

    pub fn with_selection(mut self, ordinals: impl IntoIterator<Item = usize>) -> Self {
        self.selected.extend(ordinals);
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn table(&self, records: &[Vec<String>]) -> DataTable {
        let headers: Vec<&str> = self.headers.iter().map(String::as_str).collect();
        let data = records
            .iter()
            .map(|record| record.iter().map(|raw| typed_value(raw)).collect())
            .collect();
        DataTable::from_fields(&headers, data)
    }
}

/// Numbers become JSON numbers, everything else stays text
fn typed_value(raw: &str) -> DataValue {
    let value = if let Ok(i) = raw.parse::<i64>() {
        Value::from(i)
    } else if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        Value::Number(n)
    } else {
        Value::String(raw.to_string())
    };
    DataValue {
        value,
        formatted_value: Some(raw.to_string()),
    }
}

#[derive(Debug)]
pub struct CsvPageReader {
    pages: Vec<DataTable>,
}

impl PageReader for CsvPageReader {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn page(&mut self, index: usize) -> Result<DataTable> {
        self.pages
            .get(index)
            .cloned()
            .with_context(|| format!("page {} out of range", index))
    }

    async fn release(self) -> Result<()> {
        Ok(())
    }
}

impl Worksheet for CsvWorksheet {
    type Reader = CsvPageReader;

    async fn summary_data_reader(&self) -> Result<CsvPageReader> {
        let pages = self
            .records
            .chunks(self.page_size)
            .map(|chunk| self.table(chunk))
            .collect();
        Ok(CsvPageReader { pages })
    }

    async fn visual_specification(&self) -> Result<VisualSpecification> {
        Ok(VisualSpecification {
            active_marks_specification_index: 0,
            marks_specifications: vec![MarksSpecification {
                encodings: self.encodings.clone(),
            }],
        })
    }

    async fn selected_marks(&self) -> Result<MarksCollection> {
        if self.selected.is_empty() {
            return Ok(MarksCollection::default());
        }

        let mut picked = Vec::with_capacity(self.selected.len());
        for &ordinal in &self.selected {
            let record = ordinal
                .checked_sub(1)
                .and_then(|i| self.records.get(i))
                .with_context(|| format!("selected row {} out of range", ordinal))?;
            picked.push(record.clone());
        }

        Ok(MarksCollection {
            data: vec![self.table(&picked)],
        })
    }
}
