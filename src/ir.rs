use indexmap::IndexMap;
use serde::Serialize;

use crate::data::{DataValue, Row, TupleId};
use crate::selection::SelectedTuples;

// =============================================================================
// Encoder output
// =============================================================================

/// One row projected onto the encoding channels.
///
/// Each channel lists one entry per field assigned to it, in assignment
/// order. A field the row does not carry is an explicit `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedRow {
    pub tuple_id: TupleId,
    pub channels: IndexMap<String, Vec<Option<DataValue>>>,
}

impl EncodedRow {
    pub fn channel(&self, name: &str) -> Option<&[Option<DataValue>]> {
        self.channels.get(name).map(Vec::as_slice)
    }
}

/// Raw rows of one fetch together with their encoded projection.
/// Both lists share tuple ids and order.
#[derive(Debug, Clone)]
pub struct FetchedData {
    pub rows: Vec<Row>,
    pub encoded: Vec<EncodedRow>,
}

/// What the renderer consumes when it also needs to fog unselected marks
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedSelection {
    pub encoded: Vec<EncodedRow>,
    pub selected_tuples: SelectedTuples,
}

impl EncodedSelection {
    pub fn is_selected(&self, tuple_id: TupleId) -> bool {
        self.selected_tuples.contains(&tuple_id)
    }

    /// Selected ids in ascending order
    pub fn sorted_selection(&self) -> Vec<TupleId> {
        let mut ids: Vec<TupleId> = self.selected_tuples.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
