// Library exports for gaugeviz

pub mod color;
pub mod csv_source;
pub mod data;
pub mod error;
pub mod fog;
pub mod host;
pub mod ir;
pub mod resolve;
pub mod selection;
pub mod snapshot;
pub mod transform;

pub use data::{materialize_rows, Column, DataTable, DataValue, Row, TupleId};
pub use error::Error;
pub use fog::{calculate_fog_color, init_fog};
pub use ir::{EncodedRow, EncodedSelection};
pub use resolve::{resolve_encoding_map, EncodingMap};
pub use selection::{match_selection, SelectedTuples};
pub use transform::{encode, get_encoded_data, get_encoded_data_and_selected_tuples};

#[derive(Debug, Clone, PartialEq)]
pub struct FogOptions {
    /// Host background the fog tone is derived from
    pub background: String,
}

fn default_background() -> String { "#ffffff".to_string() }

impl Default for FogOptions {
    fn default() -> Self {
        Self {
            background: default_background(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    /// Rows per summary-data page
    pub page_size: usize,
}

fn default_page_size() -> usize { 100 }

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}
