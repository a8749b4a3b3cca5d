use crate::error::{DirError, Result};
use crate::record::DirectoryRecord;

/// Inserts `child` below `parent`, ordered by the child kind's numeric sort key.
///
/// The child goes in front of the first sibling whose number is greater than its own.
/// Kinds without a sort key, children without a number, and children no sibling
/// outranks are appended. Returns the position the child ended up at.
pub fn insert_sorted(parent: &mut DirectoryRecord, child: DirectoryRecord) -> Result<usize> {
    if !child.record_type.allowed_below(parent.record_type) {
        return Err(DirError::CorruptedData(format!(
            "{} record cannot be placed below a {} record",
            child.record_type, parent.record_type
        )));
    }
    let position = child.sort_number().and_then(|number| {
        parent
            .children
            .iter()
            .position(|sibling| sibling.sort_number().is_some_and(|n| n > number))
    });
    match position {
        Some(index) => {
            parent.children.insert(index, child);
            Ok(index)
        }
        None => {
            parent.children.push(child);
            Ok(parent.children.len() - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;
    use crate::tags;
    use dicom::core::{DataElement, PrimitiveValue, VR};

    fn numbered(kind: RecordType, number: Option<&str>) -> DirectoryRecord {
        let mut record = DirectoryRecord::new(kind);
        if let (Some(tag), Some(number)) = (kind.sort_key(), number) {
            record
                .attributes
                .put(DataElement::new(tag, VR::IS, PrimitiveValue::from(number)));
        }
        record
    }

    fn numbers(parent: &DirectoryRecord) -> Vec<Option<i64>> {
        parent.children.iter().map(DirectoryRecord::sort_number).collect()
    }

    #[test]
    fn images_end_up_in_instance_number_order() {
        let mut series = DirectoryRecord::new(RecordType::Series);
        for n in ["3", "1", "2"] {
            insert_sorted(&mut series, numbered(RecordType::Image, Some(n))).expect("insert");
        }
        assert_eq!(numbers(&series), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn unnumbered_records_are_appended() {
        let mut series = DirectoryRecord::new(RecordType::Series);
        insert_sorted(&mut series, numbered(RecordType::Image, Some("5"))).expect("insert");
        let index = insert_sorted(&mut series, numbered(RecordType::Image, None)).expect("insert");
        assert_eq!(index, 1);
        // equal numbers keep arrival order
        let index = insert_sorted(&mut series, numbered(RecordType::Image, Some("5"))).expect("insert");
        assert_eq!(index, 2);
        let index = insert_sorted(&mut series, numbered(RecordType::Image, Some("4"))).expect("insert");
        assert_eq!(index, 0);
    }

    #[test]
    fn series_sort_on_series_number() {
        let mut study = DirectoryRecord::new(RecordType::Study);
        insert_sorted(&mut study, numbered(RecordType::Series, Some("10"))).expect("insert");
        insert_sorted(&mut study, numbered(RecordType::Series, Some("2"))).expect("insert");
        assert_eq!(
            study.children[0].attributes.element(tags::SERIES_NUMBER).ok().map(|e| e.to_int::<i64>().ok()),
            Some(Some(2))
        );
    }

    #[test]
    fn kinds_are_only_placed_below_their_level() {
        let mut study = DirectoryRecord::new(RecordType::Study);
        let err = insert_sorted(&mut study, numbered(RecordType::Image, Some("1"))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptedData);
        let mut root = DirectoryRecord::root();
        assert_eq!(insert_sorted(&mut root, DirectoryRecord::new(RecordType::Patient)).expect("insert"), 0);
    }
}
