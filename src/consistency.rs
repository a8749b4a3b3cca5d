//
// consistency.rs
// DicomDir-Tools-rs
//
// Comparison of an existing directory record with a file that matched it.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use dicom::core::header::Header;
use dicom::core::value::Value;
use dicom::core::Tag;
use dicom::object::mem::InMemElement;
use dicom::object::InMemDicomObject;
use tracing::{debug, warn};

use crate::dicom_access::{element_has_value, ElementAccess};
use crate::error::{DirError, Result};
use crate::record::{DirectoryRecord, RecordType};
use crate::source::SourceFile;
use crate::tags::{self, *};

/// Values longer than this are left out of messages.
pub const MAX_PRINT_LENGTH: usize = 64;

/// Numbering attributes a re-numbered file may legitimately change.
const RENUMBERING_TAGS: &[Tag] = &[
    INSTANCE_NUMBER,
    SERIES_NUMBER,
    OVERLAY_NUMBER,
    LOOKUP_TABLE_NUMBER,
    CURVE_NUMBER,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    pub tag: Tag,
    pub reason: String,
}

pub struct ConsistencyChecker {
    stop_at_first: bool,
    tolerate_renumbering: bool,
}

fn trimmed(value: &str) -> &str {
    value.trim_end_matches(['\0', ' '])
}

fn element_string(elem: &InMemElement) -> Option<String> {
    elem.to_str().ok().map(|s| trimmed(&s).to_string())
}

/// Value length as it would be encoded (even).
fn encoded_length(elem: &InMemElement) -> usize {
    match elem.value() {
        Value::Primitive(p) => (p.calculate_byte_len() + 1) & !1,
        Value::Sequence(seq) => seq.items().len(),
        Value::PixelSequence(seq) => seq.fragments().len(),
    }
}

/// `Seq[i].Name` style path of an element inside a sequence item.
fn path_name(tag: Option<Tag>, sequence: Option<(Tag, usize)>) -> String {
    match (sequence, tag) {
        (Some((seq, index)), Some(tag)) => {
            format!("{}[{index}].{}", tags::tag_name(seq), tags::tag_name(tag))
        }
        (Some((seq, index)), None) => format!("{}[{index}]", tags::tag_name(seq)),
        (None, Some(tag)) => tags::tag_name(tag),
        (None, None) => String::new(),
    }
}

fn compare_elements(a: &InMemElement, b: &InMemElement, sequence: Option<(Tag, usize)>) -> std::result::Result<(), String> {
    let name = path_name(Some(a.tag()), sequence);
    if a.tag() != b.tag() {
        return Err(format!(
            "different attributes: {name} != {}",
            path_name(Some(b.tag()), sequence)
        ));
    }
    if a.vr() != b.vr() {
        return Err(format!("different VRs: {} != {} ({name})", a.vr(), b.vr()));
    }
    let (len_a, len_b) = (encoded_length(a), encoded_length(b));
    if len_a != len_b {
        return Err(format!("different value lengths: {len_a} != {len_b} ({name})"));
    }
    if len_a == 0 {
        return Ok(());
    }
    match (a.items(), b.items()) {
        (Some(items_a), Some(items_b)) => compare_sequences(a.tag(), items_a, items_b),
        _ => {
            let (value_a, value_b) = match (element_string(a), element_string(b)) {
                (Some(x), Some(y)) => (x, y),
                _ => return Ok(()),
            };
            if value_a == value_b {
                return Ok(());
            }
            let mut reason = String::from("different values: ");
            if value_a.len() < MAX_PRINT_LENGTH && value_b.len() < MAX_PRINT_LENGTH {
                reason.push_str(&format!("\"{value_a}\" != \"{value_b}\" "));
            }
            reason.push_str(&format!("({name})"));
            Err(reason)
        }
    }
}

fn compare_items(
    a: &InMemDicomObject,
    b: &InMemDicomObject,
    sequence: Tag,
    index: usize,
) -> std::result::Result<(), String> {
    let (card_a, card_b) = (a.iter().count(), b.iter().count());
    if card_a != card_b {
        return Err(format!(
            "different number of attributes in item: {card_a} != {card_b} ({})",
            path_name(None, Some((sequence, index)))
        ));
    }
    for (elem_a, elem_b) in a.iter().zip(b.iter()) {
        compare_elements(elem_a, elem_b, Some((sequence, index)))?;
    }
    Ok(())
}

/// Item-by-item comparison; the error is the reason of the first difference.
pub fn compare_sequences(
    tag: Tag,
    a: &[InMemDicomObject],
    b: &[InMemDicomObject],
) -> std::result::Result<(), String> {
    if a.len() != b.len() {
        return Err(format!(
            "different number of items in sequence: {} != {} ({})",
            a.len(),
            b.len(),
            tags::tag_name(tag)
        ));
    }
    for (index, (item_a, item_b)) in a.iter().zip(b).enumerate() {
        compare_items(item_a, item_b, tag, index)?;
    }
    Ok(())
}

fn record_key_text(record: &DirectoryRecord) -> String {
    let key = record.record_type.unique_key();
    format!(
        "{} Record [Key: {} {}=\"{}\"]",
        record.record_type,
        tags::tag_name(key),
        tags::format_tag(key),
        record.unique_key_value().unwrap_or_default()
    )
}

fn origin_text(record: &DirectoryRecord) -> String {
    record
        .origin_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "DICOMDIR".to_string())
}

fn preview(value: &str) -> &str {
    if value.len() < MAX_PRINT_LENGTH {
        value
    } else {
        "..."
    }
}

impl ConsistencyChecker {
    pub fn new(stop_at_first: bool, tolerate_renumbering: bool) -> Self {
        ConsistencyChecker {
            stop_at_first,
            tolerate_renumbering,
        }
    }

    /// Compares every valued attribute of `record` that `file` also has a value for.
    /// Attributes the inventor made up are skipped. In re-numbering tolerant mode a
    /// differing number replaces the record's value instead of being reported.
    pub fn check(&self, record: &mut DirectoryRecord, file: &SourceFile) -> Vec<Inconsistency> {
        let dataset = file.dataset();
        let mut found = Vec::new();
        let mut renumbered = Vec::new();
        for elem in record.attributes.iter() {
            let tag = elem.tag();
            if !element_has_value(elem) || !dataset.has_value(tag) || record.was_invented(tag) {
                continue;
            }
            let Ok(incoming) = dataset.element(tag) else {
                continue;
            };
            if let (Some(existing), Some(items)) = (elem.items(), incoming.items()) {
                if tag == CONTENT_SEQUENCE
                    || tag == BLENDING_SEQUENCE
                    || (tag == ICON_IMAGE_SEQUENCE && record.record_type == RecordType::Image)
                {
                    continue;
                }
                if let Err(reason) = compare_sequences(tag, existing, items) {
                    warn!(
                        "file inconsistent with existing DICOMDIR record\n  {}\n    Reason: {reason}\n    Existing Record (origin: {}) defines {} items\n    File ({}) defines {} items",
                        record_key_text(record),
                        origin_text(record),
                        existing.len(),
                        file.path.display(),
                        items.len()
                    );
                    found.push(Inconsistency { tag, reason });
                }
            } else {
                let existing = element_string(elem).unwrap_or_default();
                let value = element_string(incoming).unwrap_or_default();
                if existing == value {
                    continue;
                }
                if self.tolerate_renumbering && RENUMBERING_TAGS.contains(&tag) {
                    renumbered.push(incoming.clone());
                    continue;
                }
                warn!(
                    "file inconsistent with existing DICOMDIR record\n  {}\n    Existing Record (origin: {}) defines:\n      {} {}=\"{}\"\n    File ({}) defines:\n      {} {}=\"{}\"",
                    record_key_text(record),
                    origin_text(record),
                    tags::tag_name(tag),
                    tags::format_tag(tag),
                    preview(&existing),
                    file.path.display(),
                    tags::tag_name(tag),
                    tags::format_tag(tag),
                    preview(&value)
                );
                found.push(Inconsistency {
                    tag,
                    reason: format!("different values ({})", tags::tag_name(tag)),
                });
            }
            if self.stop_at_first && !found.is_empty() {
                break;
            }
        }
        for elem in renumbered {
            debug!(
                record = %record.record_type,
                "renumbering {} to {}",
                tags::describe(elem.tag()),
                element_string(&elem).unwrap_or_default()
            );
            record.attributes.put(elem);
        }
        if self.stop_at_first && !found.is_empty() {
            warn!("aborting on first inconsistent file: {}", file.path.display());
        }
        found
    }
}

/// A SOP instance already in the directory must come from the same file with the same class.
pub fn check_reference(record: &DirectoryRecord, file_id: &str, file: &SourceFile, origin: &Path) -> Result<()> {
    let Some(reference) = &record.reference else {
        return Ok(());
    };
    if reference.file_id != file_id {
        return Err(DirError::CorruptedData(format!(
            "SOP instance {} already referenced by {} (now also {}, {})",
            reference.sop_instance,
            reference.file_id,
            file_id,
            origin.display()
        )));
    }
    let sop_class = file.sop_class();
    if reference.sop_class != sop_class {
        return Err(DirError::CorruptedData(format!(
            "SOP class of {} changed: {} != {}",
            file_id, reference.sop_class, sop_class
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FileReference;
    use crate::uids;
    use dicom::core::value::DataSetSequence;
    use dicom::core::{DataElement, PrimitiveValue, VR};
    use dicom::object::{FileDicomObject, FileMetaTableBuilder, StandardDataDictionary};
    use std::path::PathBuf;

    fn put_str(obj: &mut InMemDicomObject, tag: Tag, value: &str) {
        obj.put(DataElement::new(tag, vr_of(tag), PrimitiveValue::from(value)));
    }

    fn file(fill: impl FnOnce(&mut InMemDicomObject)) -> SourceFile {
        let meta = FileMetaTableBuilder::new()
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(uids::CT_IMAGE)
            .media_storage_sop_instance_uid("1.2.3.4")
            .build()
            .expect("meta");
        let mut object = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
        let mut dataset = InMemDicomObject::new_empty();
        fill(&mut dataset);
        for elem in dataset {
            object.put(elem);
        }
        SourceFile::from_object("IMG2", PathBuf::from("IMG2"), object)
    }

    fn series(number: &str) -> DirectoryRecord {
        let mut record = DirectoryRecord::new(RecordType::Series);
        put_str(&mut record.attributes, SERIES_INSTANCE_UID, "1.2.3");
        put_str(&mut record.attributes, SERIES_NUMBER, number);
        put_str(&mut record.attributes, MODALITY, "CT");
        record
    }

    #[test]
    fn differing_series_number_is_reported() {
        let mut record = series("1");
        let incoming = file(|d| {
            put_str(d, SERIES_INSTANCE_UID, "1.2.3");
            put_str(d, SERIES_NUMBER, "2");
        });
        let found = ConsistencyChecker::new(false, false).check(&mut record, &incoming);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, SERIES_NUMBER);
        assert_eq!(record.attributes.element_str(SERIES_NUMBER).as_deref(), Some("1"));
    }

    #[test]
    fn renumbering_is_tolerated_in_update_mode() {
        let mut record = series("1");
        let incoming = file(|d| put_str(d, SERIES_NUMBER, "2"));
        let found = ConsistencyChecker::new(false, true).check(&mut record, &incoming);
        assert!(found.is_empty());
        assert_eq!(record.attributes.element_str(SERIES_NUMBER).as_deref(), Some("2"));
    }

    #[test]
    fn invented_values_and_missing_file_values_are_not_compared() {
        let mut record = series("5");
        record.invented.push(SERIES_NUMBER);
        let incoming = file(|d| {
            put_str(d, SERIES_NUMBER, "2");
            d.put(DataElement::empty(MODALITY, VR::CS));
        });
        assert!(ConsistencyChecker::new(true, false).check(&mut record, &incoming).is_empty());
    }

    #[test]
    fn sequence_reasons_name_the_item() {
        let item = |value: &str| {
            let mut item = InMemDicomObject::new_empty();
            put_str(&mut item, REFERENCED_SOP_INSTANCE_UID, value);
            item
        };
        let reason = compare_sequences(REFERENCED_IMAGE_SEQUENCE, &[item("1.2")], &[item("1.3")]).unwrap_err();
        assert!(reason.starts_with("different values: \"1.2\" != \"1.3\""));
        assert!(reason.contains("ReferencedImageSequence[0].ReferencedSOPInstanceUID"));
        let reason = compare_sequences(REFERENCED_IMAGE_SEQUENCE, &[item("1.2")], &[]).unwrap_err();
        assert!(reason.starts_with("different number of items in sequence: 1 != 0"));
    }

    #[test]
    fn content_sequence_is_allowed_to_diverge() {
        let mut record = DirectoryRecord::new(RecordType::SrDocument);
        let mut item = InMemDicomObject::new_empty();
        put_str(&mut item, RELATIONSHIP_TYPE, "HAS CONCEPT MOD");
        record.attributes.put(DataElement::new(
            CONTENT_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![item]),
        ));
        let incoming = file(|d| {
            let mut other = InMemDicomObject::new_empty();
            put_str(&mut other, RELATIONSHIP_TYPE, "CONTAINS");
            d.put(DataElement::new(CONTENT_SEQUENCE, VR::SQ, DataSetSequence::from(vec![other])));
        });
        assert!(ConsistencyChecker::new(false, false).check(&mut record, &incoming).is_empty());
    }

    #[test]
    fn a_second_file_for_the_same_instance_is_corrupt() {
        let record = DirectoryRecord::with_reference(
            RecordType::Image,
            FileReference {
                file_id: "IMG1".into(),
                sop_class: uids::CT_IMAGE.into(),
                sop_instance: "1.2.3.4".into(),
                transfer_syntax: uids::EXPLICIT_VR_LITTLE_ENDIAN.into(),
            },
        );
        let incoming = file(|_| {});
        assert!(check_reference(&record, "IMG1", &incoming, Path::new("IMG1")).is_ok());
        let err = check_reference(&record, "IMG2", &incoming, Path::new("IMG2")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptedData);
    }
}
