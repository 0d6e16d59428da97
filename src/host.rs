//! Host capabilities consumed by the transformation layer.
//!
//! The analytics host is an external collaborator. These traits describe the
//! three things this crate needs from it: a paged summary-data reader, the
//! worksheet's visual specification, and the currently selected marks.
//! Concrete hosts live in [`crate::snapshot`] and [`crate::csv_source`].

#![allow(async_fn_in_trait)]

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::DataTable;

/// A data field as referenced by an encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A field assigned to an encoding channel on a marks card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoding {
    pub id: String,
    pub field: Field,
}

/// One marks card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarksSpecification {
    #[serde(default)]
    pub encodings: Vec<Encoding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSpecification {
    /// Negative when the worksheet has no active marks card.
    pub active_marks_specification_index: i64,
    #[serde(default)]
    pub marks_specifications: Vec<MarksSpecification>,
}

impl Default for VisualSpecification {
    fn default() -> Self {
        Self {
            active_marks_specification_index: -1,
            marks_specifications: Vec::new(),
        }
    }
}

/// Result of a selected-marks query: one table per mark layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarksCollection {
    #[serde(default)]
    pub data: Vec<DataTable>,
}

/// Stateful, ordered reader over the worksheet's summary data.
///
/// Pages must be requested in order, one at a time.
pub trait PageReader {
    fn page_count(&self) -> usize;

    async fn page(&mut self, index: usize) -> Result<DataTable>;

    async fn release(self) -> Result<()>;
}

/// The worksheet capability supplied by the host application.
pub trait Worksheet {
    type Reader: PageReader;

    async fn summary_data_reader(&self) -> Result<Self::Reader>;

    async fn visual_specification(&self) -> Result<VisualSpecification>;

    async fn selected_marks(&self) -> Result<MarksCollection>;
}

/// Drain a reader page by page, then release it.
///
/// Each page request completes before the next is issued. The reader is
/// released even when a page fails; the page error wins over a release error.
pub async fn read_all_pages<R: PageReader>(mut reader: R) -> Result<Vec<DataTable>> {
    let count = reader.page_count();
    debug!(pages = count, "reading summary data");

    let mut pages = Vec::with_capacity(count);
    let mut outcome = Ok(());
    for index in 0..count {
        match reader.page(index).await {
            Ok(page) => pages.push(page),
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }
    let released = reader.release().await;

    outcome?;
    released?;
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataValue;
    use anyhow::bail;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingReader {
        pages: Vec<DataTable>,
        fail_at: Option<usize>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl PageReader for RecordingReader {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        async fn page(&mut self, index: usize) -> Result<DataTable> {
            self.log.borrow_mut().push(format!("page {}", index));
            if self.fail_at == Some(index) {
                bail!("network");
            }
            Ok(self.pages[index].clone())
        }

        async fn release(self) -> Result<()> {
            self.log.borrow_mut().push("release".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_read_all_pages_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let page = DataTable::from_fields(&["a"], vec![vec![DataValue::new(1)]]);
        let reader = RecordingReader {
            pages: vec![page.clone(), page.clone(), page],
            fail_at: None,
            log: log.clone(),
        };

        let pages = block_on(read_all_pages(reader)).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(
            *log.borrow(),
            vec!["page 0", "page 1", "page 2", "release"]
        );
    }

    #[test]
    fn test_read_all_pages_releases_on_failure() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let page = DataTable::from_fields(&["a"], vec![vec![DataValue::new(1)]]);
        let reader = RecordingReader {
            pages: vec![page.clone(), page.clone(), page],
            fail_at: Some(1),
            log: log.clone(),
        };

        let err = block_on(read_all_pages(reader)).unwrap_err();
        assert_eq!(err.to_string(), "network");
        assert_eq!(*log.borrow(), vec!["page 0", "page 1", "release"]);
    }

    #[test]
    fn test_visual_specification_from_host_json() {
        let spec: VisualSpecification = serde_json::from_value(json!({
            "activeMarksSpecificationIndex": 0,
            "marksSpecifications": [
                {"encodings": [{"id": "edge", "field": {"name": "Region"}}]}
            ]
        }))
        .unwrap();
        assert_eq!(spec.active_marks_specification_index, 0);
        assert_eq!(spec.marks_specifications[0].encodings[0].field, Field::new("Region"));
    }

    #[test]
    fn test_default_visual_specification_is_inactive() {
        assert!(VisualSpecification::default().active_marks_specification_index < 0);
    }
}
