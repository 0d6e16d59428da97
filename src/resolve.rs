use anyhow::Result;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::Error;
use crate::host::{Field, VisualSpecification};

/// Encoding channel name -> fields assigned to it, in declaration order.
/// Only channels with at least one field appear.
pub type EncodingMap = IndexMap<String, Vec<Field>>;

/// Resolve the active marks card into an encoding map.
///
/// A negative active index means no marks card is active and yields an empty
/// map. An index past the end of the list is reported as
/// [`Error::MarksSpecificationOutOfRange`].
pub fn resolve_encoding_map(spec: &VisualSpecification) -> Result<EncodingMap> {
    let mut map = EncodingMap::new();

    let Ok(index) = usize::try_from(spec.active_marks_specification_index) else {
        debug!("no active marks specification");
        return Ok(map);
    };

    let marks = spec.marks_specifications.get(index).ok_or(
        Error::MarksSpecificationOutOfRange {
            index,
            len: spec.marks_specifications.len(),
        },
    )?;

    for encoding in &marks.encodings {
        map.entry(encoding.id.clone())
            .or_default()
            .push(encoding.field.clone());
    }

    debug!(channels = map.len(), "resolved encoding map");
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Encoding, MarksSpecification};

    fn enc(id: &str, field: &str) -> Encoding {
        Encoding {
            id: id.to_string(),
            field: Field::new(field),
        }
    }

    fn make_spec(active: i64) -> VisualSpecification {
        VisualSpecification {
            active_marks_specification_index: active,
            marks_specifications: vec![
                MarksSpecification {
                    encodings: vec![enc("edge", "F1"), enc("level", "Sales"), enc("edge", "F2")],
                },
                MarksSpecification {
                    encodings: vec![enc("color", "Region")],
                },
            ],
        }
    }

    #[test]
    fn test_resolve_no_active_marks() {
        assert!(resolve_encoding_map(&make_spec(-1)).unwrap().is_empty());
        assert!(resolve_encoding_map(&make_spec(-7)).unwrap().is_empty());
        assert!(resolve_encoding_map(&VisualSpecification::default()).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_preserves_declaration_order() {
        let map = resolve_encoding_map(&make_spec(0)).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["edge"], vec![Field::new("F1"), Field::new("F2")]);
        assert_eq!(map["level"], vec![Field::new("Sales")]);
        let channels: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(channels, vec!["edge", "level"]);
    }

    #[test]
    fn test_resolve_selects_active_card() {
        let map = resolve_encoding_map(&make_spec(1)).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["color"], vec![Field::new("Region")]);
    }

    #[test]
    fn test_resolve_empty_card() {
        let spec = VisualSpecification {
            active_marks_specification_index: 0,
            marks_specifications: vec![MarksSpecification::default()],
        };
        assert!(resolve_encoding_map(&spec).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_index_out_of_range() {
        let err = resolve_encoding_map(&make_spec(2)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::MarksSpecificationOutOfRange { index: 2, len: 2 })
        );
    }
}
