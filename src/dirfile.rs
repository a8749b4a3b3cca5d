//
// dirfile.rs
// DicomDir-Tools-rs
//
// Reading and writing the DICOMDIR file itself: meta header, fileset identification
// and the directory record sequence linked through byte offsets.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use dicom::core::header::Header;
use dicom::core::value::DataSetSequence;
use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::encoding::TransferSyntaxIndex;
use dicom::object::{open_file, FileDicomObject, FileMetaTableBuilder, InMemDicomObject, StandardDataDictionary};
use dicom::transfer_syntax::{TransferSyntax, TransferSyntaxRegistry};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::dicom_access::ElementAccess;
use crate::error::{Context, DirError, Result};
use crate::record::{DirectoryRecord, FileReference, RecordType};
use crate::tags::*;
use crate::uids;

/// Structural attributes of a record item; everything else is record content.
const STRUCTURAL_TAGS: &[Tag] = &[
    OFFSET_OF_NEXT_RECORD,
    RECORD_IN_USE_FLAG,
    OFFSET_OF_LOWER_LEVEL_ENTITY,
    DIRECTORY_RECORD_TYPE,
    REFERENCED_FILE_ID,
    REFERENCED_SOP_CLASS_UID_IN_FILE,
    REFERENCED_SOP_INSTANCE_UID_IN_FILE,
    REFERENCED_TRANSFER_SYNTAX_UID_IN_FILE,
];

const RECORD_IN_USE: u16 = 0xFFFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesetHeader {
    pub fileset_id: String,
    pub descriptor: Option<String>,
    pub descriptor_charset: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedDirectory {
    pub header: FilesetHeader,
    pub root: DirectoryRecord,
    pub sop_instance: String,
}

fn explicit_le() -> Result<&'static TransferSyntax> {
    TransferSyntaxRegistry
        .get(uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .ok_or_else(|| DirError::CorruptedData("explicit VR little endian not registered".into()))
}

/// `2.25.` UID derived from the fileset ID and the current time.
pub fn generate_instance_uid(fileset_id: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(fileset_id.as_bytes());
    hasher.update(nanos.to_be_bytes());
    hasher.update(std::process::id().to_be_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    format!("2.25.{}", u128::from_be_bytes(bytes))
}

fn encoded_len(dataset: &InMemDicomObject, ts: &TransferSyntax) -> Result<usize> {
    let mut buffer = Vec::new();
    dataset.write_dataset_with_ts(&mut buffer, ts)?;
    Ok(buffer.len())
}

fn offset_value(offset: usize) -> Result<PrimitiveValue> {
    u32::try_from(offset)
        .map(PrimitiveValue::from)
        .map_err(|_| DirError::CorruptedData(format!("record offset {offset} exceeds 32 bits")))
}

fn put_str(dataset: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    dataset.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

/// A record in write order with the indices its offsets point at.
struct Slot<'a> {
    record: &'a DirectoryRecord,
    next: Option<usize>,
    lower: Option<usize>,
}

/// Pre-order flattening of the children of `parent`; returns the index of the first child.
fn flatten<'a>(parent: &'a DirectoryRecord, slots: &mut Vec<Slot<'a>>) -> Option<usize> {
    let mut first = None;
    let mut previous: Option<usize> = None;
    for child in &parent.children {
        let index = slots.len();
        slots.push(Slot {
            record: child,
            next: None,
            lower: None,
        });
        if let Some(previous) = previous {
            slots[previous].next = Some(index);
        }
        first.get_or_insert(index);
        previous = Some(index);
        let lower = flatten(child, slots);
        slots[index].lower = lower;
    }
    first
}

fn record_item(record: &DirectoryRecord, next: usize, lower: usize) -> Result<InMemDicomObject> {
    let code = record
        .record_type
        .code()
        .ok_or_else(|| DirError::IllegalCall("the root record is not written as an item".into()))?;
    let mut item = record.attributes.clone();
    item.put(DataElement::new(OFFSET_OF_NEXT_RECORD, VR::UL, offset_value(next)?));
    item.put(DataElement::new(RECORD_IN_USE_FLAG, VR::US, PrimitiveValue::from(RECORD_IN_USE)));
    item.put(DataElement::new(OFFSET_OF_LOWER_LEVEL_ENTITY, VR::UL, offset_value(lower)?));
    put_str(&mut item, DIRECTORY_RECORD_TYPE, VR::CS, code);
    if let Some(reference) = &record.reference {
        // a backslash in a CS value is the value delimiter, one value per path component
        put_str(&mut item, REFERENCED_FILE_ID, VR::CS, &reference.file_id);
        for (tag, value) in [
            (REFERENCED_SOP_CLASS_UID_IN_FILE, &reference.sop_class),
            (REFERENCED_SOP_INSTANCE_UID_IN_FILE, &reference.sop_instance),
            (REFERENCED_TRANSFER_SYNTAX_UID_IN_FILE, &reference.transfer_syntax),
        ] {
            if !value.is_empty() {
                put_str(&mut item, tag, VR::UI, value);
            }
        }
    }
    Ok(item)
}

fn header_dataset(header: &FilesetHeader, first_root: usize, last_root: usize) -> Result<InMemDicomObject> {
    let mut dataset = InMemDicomObject::new_empty();
    put_str(&mut dataset, FILE_SET_ID, VR::CS, &header.fileset_id);
    if let Some(descriptor) = &header.descriptor {
        put_str(&mut dataset, FILE_SET_DESCRIPTOR_FILE_ID, VR::CS, descriptor);
        if let Some(charset) = &header.descriptor_charset {
            put_str(&mut dataset, SPECIFIC_CHARACTER_SET_OF_FILE_SET_DESCRIPTOR_FILE, VR::CS, charset);
        }
    }
    dataset.put(DataElement::new(OFFSET_OF_FIRST_ROOT_RECORD, VR::UL, offset_value(first_root)?));
    dataset.put(DataElement::new(OFFSET_OF_LAST_ROOT_RECORD, VR::UL, offset_value(last_root)?));
    dataset.put(DataElement::new(FILE_SET_CONSISTENCY_FLAG, VR::US, PrimitiveValue::from(0_u16)));
    Ok(dataset)
}

fn with_records(mut dataset: InMemDicomObject, items: Vec<InMemDicomObject>) -> InMemDicomObject {
    dataset.put(DataElement::new(
        DIRECTORY_RECORD_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(items),
    ));
    dataset
}

/// Start of each item relative to the data set, measured by encoding.
fn item_positions(prefix: &InMemDicomObject, items: &[InMemDicomObject], ts: &TransferSyntax) -> Result<Vec<usize>> {
    // tag, VR, reserved and length of the sequence element
    const SEQUENCE_HEADER: usize = 12;
    let mut position = encoded_len(prefix, ts)? + SEQUENCE_HEADER;
    let mut positions = Vec::with_capacity(items.len());
    let empty = encoded_len(&with_records(InMemDicomObject::new_empty(), Vec::new()), ts)?;
    for item in items {
        positions.push(position);
        let single = encoded_len(&with_records(InMemDicomObject::new_empty(), vec![item.clone()]), ts)?;
        position += single - empty;
    }
    Ok(positions)
}

fn file_object(dataset: InMemDicomObject, instance_uid: &str) -> Result<FileDicomObject<InMemDicomObject>> {
    let meta = FileMetaTableBuilder::new()
        .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .media_storage_sop_class_uid(uids::MEDIA_STORAGE_DIRECTORY_STORAGE)
        .media_storage_sop_instance_uid(instance_uid)
        .build()?;
    let mut object = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
    for elem in dataset {
        object.put(elem);
    }
    Ok(object)
}

/// Bytes in front of the data set (preamble, magic and meta group).
fn dataset_start(object: &FileDicomObject<InMemDicomObject>, ts: &TransferSyntax) -> Result<usize> {
    let mut buffer = Vec::new();
    object.write_all(&mut buffer)?;
    let dataset_len = encoded_len(object, ts)?;
    Ok(buffer.len() - dataset_len)
}

/// Serializes the tree below `root` to `path` in Explicit VR Little Endian.
pub fn write_dicomdir(path: &Path, header: &FilesetHeader, root: &DirectoryRecord, instance_uid: &str) -> Result<()> {
    let ts = explicit_le()?;
    let mut slots = Vec::new();
    flatten(root, &mut slots);

    // pass 1: sizes with every offset zeroed
    let placeholders = slots
        .iter()
        .map(|slot| record_item(slot.record, 0, 0))
        .collect::<Result<Vec<_>>>()?;
    let prefix = header_dataset(header, 0, 0)?;
    let positions = item_positions(&prefix, &placeholders, ts)?;
    let start = dataset_start(&file_object(with_records(prefix, placeholders), instance_uid)?, ts)?;
    let absolute = |index: Option<usize>| index.map(|i| start + positions[i]).unwrap_or(0);

    // pass 2: real offsets, same sizes
    let items = slots
        .iter()
        .map(|slot| record_item(slot.record, absolute(slot.next), absolute(slot.lower)))
        .collect::<Result<Vec<_>>>()?;
    let first_root = if root.children.is_empty() { None } else { Some(0) };
    let last_root = first_root.map(|_| {
        let mut index = 0;
        while let Some(next) = slots[index].next {
            index = next;
        }
        index
    });
    let dataset = with_records(header_dataset(header, absolute(first_root), absolute(last_root))?, items);
    let object = file_object(dataset, instance_uid)?;
    object
        .write_to_file(path)
        .context(format!("writing {}", path.display()))?;
    info!(file = %path.display(), records = slots.len(), "DICOMDIR written");
    Ok(())
}

/// Offsets each item carries.
struct ItemLinks {
    next: usize,
    lower: usize,
    in_use: bool,
}

fn offset_of(dataset: &InMemDicomObject, tag: Tag) -> usize {
    dataset
        .element_int(tag)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(0)
}

/// Maps offsets to item indices. Item positions are measured by re-encoding and every
/// referenced offset must land on one of them.
fn offset_map(
    object: &FileDicomObject<InMemDicomObject>,
    items: &[InMemDicomObject],
    referenced: &BTreeSet<usize>,
) -> Result<HashMap<usize, usize>> {
    let ts = explicit_le()?;
    let mut prefix = InMemDicomObject::new_empty();
    for elem in object.iter().filter(|e| e.tag() < DIRECTORY_RECORD_SEQUENCE) {
        prefix.put(elem.clone());
    }
    let start = dataset_start(object, ts)?;
    let map: HashMap<usize, usize> = item_positions(&prefix, items, ts)?
        .into_iter()
        .enumerate()
        .map(|(i, p)| (start + p, i))
        .collect();
    if let Some(missing) = referenced.iter().find(|o| !map.contains_key(o)) {
        return Err(DirError::CorruptedData(format!(
            "directory record offset {missing} does not point at a record"
        )));
    }
    Ok(map)
}

fn to_record(item: &InMemDicomObject) -> Result<DirectoryRecord> {
    let code = item.element_str(DIRECTORY_RECORD_TYPE).unwrap_or_default();
    let kind = RecordType::from_code(&code)
        .ok_or_else(|| DirError::CorruptedData(format!("unknown directory record type: {code}")))?;
    let mut record = DirectoryRecord::new(kind);
    if let Some(file_id) = item.element_str(REFERENCED_FILE_ID).filter(|v| !v.is_empty()) {
        record.reference = Some(FileReference {
            file_id,
            sop_class: item.element_str(REFERENCED_SOP_CLASS_UID_IN_FILE).unwrap_or_default(),
            sop_instance: item.element_str(REFERENCED_SOP_INSTANCE_UID_IN_FILE).unwrap_or_default(),
            transfer_syntax: item.element_str(REFERENCED_TRANSFER_SYNTAX_UID_IN_FILE).unwrap_or_default(),
        });
    }
    let mut attributes = item.clone();
    for tag in STRUCTURAL_TAGS {
        attributes.remove_element(*tag);
    }
    record.attributes = attributes;
    Ok(record)
}

struct Linker<'a> {
    items: &'a [InMemDicomObject],
    links: Vec<ItemLinks>,
    index_of: HashMap<usize, usize>,
    visited: HashSet<usize>,
}

impl Linker<'_> {
    /// Records of the chain starting at `offset`; inactive records are dropped with their subtree.
    fn chain(&mut self, mut offset: usize) -> Result<Vec<DirectoryRecord>> {
        let mut records = Vec::new();
        while offset != 0 {
            let index = *self
                .index_of
                .get(&offset)
                .ok_or_else(|| DirError::CorruptedData(format!("dangling record offset {offset}")))?;
            if !self.visited.insert(index) {
                return Err(DirError::CorruptedData(format!(
                    "directory record {index} is linked twice"
                )));
            }
            let (next, lower, in_use) = {
                let links = &self.links[index];
                (links.next, links.lower, links.in_use)
            };
            if in_use {
                let mut record = to_record(&self.items[index])?;
                record.children = self.chain(lower)?;
                records.push(record);
            } else {
                debug!(index, "skipping inactive directory record");
            }
            offset = next;
        }
        Ok(records)
    }
}

/// Re-opens a DICOMDIR and re-links its records into a tree.
pub fn read_dicomdir(path: &Path) -> Result<LoadedDirectory> {
    let object = open_file(path).context(format!("reading {}", path.display()))?;
    let sop_class = object.meta().media_storage_sop_class_uid.trim_end_matches(['\0', ' ']).to_string();
    if sop_class != uids::MEDIA_STORAGE_DIRECTORY_STORAGE {
        return Err(DirError::CorruptedData(format!(
            "{} is not a DICOMDIR (SOP class {sop_class})",
            path.display()
        )));
    }
    let header = FilesetHeader {
        fileset_id: object.element_str(FILE_SET_ID).unwrap_or_default(),
        descriptor: object.element_str(FILE_SET_DESCRIPTOR_FILE_ID).filter(|v| !v.is_empty()),
        descriptor_charset: object
            .element_str(SPECIFIC_CHARACTER_SET_OF_FILE_SET_DESCRIPTOR_FILE)
            .filter(|v| !v.is_empty()),
    };
    if !object.has_element(DIRECTORY_RECORD_SEQUENCE) {
        return Err(DirError::CorruptedData(format!(
            "{}: DirectoryRecordSequence missing",
            path.display()
        )));
    }
    let items = object.sequence_items(DIRECTORY_RECORD_SEQUENCE).unwrap_or_default();
    let links: Vec<ItemLinks> = items
        .iter()
        .map(|item| ItemLinks {
            next: offset_of(item, OFFSET_OF_NEXT_RECORD),
            lower: offset_of(item, OFFSET_OF_LOWER_LEVEL_ENTITY),
            in_use: item.element_int(RECORD_IN_USE_FLAG).map(|f| f != 0).unwrap_or(true),
        })
        .collect();
    let first_root = offset_of(&object, OFFSET_OF_FIRST_ROOT_RECORD);
    let last_root = offset_of(&object, OFFSET_OF_LAST_ROOT_RECORD);
    let referenced: BTreeSet<usize> = [first_root, last_root]
        .into_iter()
        .chain(links.iter().flat_map(|l| [l.next, l.lower]))
        .filter(|o| *o != 0)
        .collect();
    let index_of = offset_map(&object, items, &referenced)?;

    let mut linker = Linker {
        items,
        links,
        index_of,
        visited: HashSet::new(),
    };
    let mut root = DirectoryRecord::root();
    root.children = linker.chain(first_root)?;
    debug!(file = %path.display(), records = root.count(), "DICOMDIR loaded");
    Ok(LoadedDirectory {
        header,
        sop_instance: object
            .meta()
            .media_storage_sop_instance_uid
            .trim_end_matches(['\0', ' '])
            .to_string(),
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn put(record: &mut DirectoryRecord, tag: Tag, value: &str) {
        put_str(&mut record.attributes, tag, vr_of(tag), value);
    }

    fn image(uid: &str, number: &str) -> DirectoryRecord {
        let mut record = DirectoryRecord::with_reference(
            RecordType::Image,
            FileReference {
                file_id: format!("DIR\\IMG{number}"),
                sop_class: uids::CT_IMAGE.into(),
                sop_instance: uid.into(),
                transfer_syntax: uids::EXPLICIT_VR_LITTLE_ENDIAN.into(),
            },
        );
        put(&mut record, INSTANCE_NUMBER, number);
        record
    }

    fn sample_tree() -> DirectoryRecord {
        let mut series = DirectoryRecord::new(RecordType::Series);
        put(&mut series, SERIES_INSTANCE_UID, "1.2.3.1");
        series.children = vec![image("1.2.3.1.1", "1"), image("1.2.3.1.2", "2")];
        let mut study = DirectoryRecord::new(RecordType::Study);
        put(&mut study, STUDY_INSTANCE_UID, "1.2.3");
        study.children.push(series);
        let mut patient = DirectoryRecord::new(RecordType::Patient);
        put(&mut patient, PATIENT_ID, "P1");
        put(&mut patient, PATIENT_NAME, "Doe^John");
        patient.children.push(study);
        let mut second = DirectoryRecord::new(RecordType::Patient);
        put(&mut second, PATIENT_ID, "P2");
        let mut root = DirectoryRecord::root();
        root.children = vec![patient, second];
        root
    }

    fn header() -> FilesetHeader {
        FilesetHeader {
            fileset_id: "TESTSET".into(),
            descriptor: None,
            descriptor_charset: None,
        }
    }

    #[test]
    fn written_offsets_point_at_record_items() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("DICOMDIR");
        write_dicomdir(&path, &header(), &sample_tree(), "2.25.1").expect("write");

        let object = open_file(&path).expect("open");
        let items = object.sequence_items(DIRECTORY_RECORD_SEQUENCE).expect("records").to_vec();
        assert_eq!(items.len(), 6);
        let bytes = std::fs::read(&path).expect("read back");
        // every offset lands on an item tag (FFFE,E000)
        let mut offsets = vec![
            offset_of(&object, OFFSET_OF_FIRST_ROOT_RECORD),
            offset_of(&object, OFFSET_OF_LAST_ROOT_RECORD),
        ];
        for item in &items {
            offsets.push(offset_of(item, OFFSET_OF_NEXT_RECORD));
            offsets.push(offset_of(item, OFFSET_OF_LOWER_LEVEL_ENTITY));
        }
        for offset in offsets.into_iter().filter(|o| *o != 0) {
            assert_eq!(&bytes[offset..offset + 4], &[0xFE, 0xFF, 0x00, 0xE0], "offset {offset}");
        }
        assert_eq!(
            items[0].element_str(DIRECTORY_RECORD_TYPE).as_deref(),
            Some("PATIENT")
        );
    }

    #[test]
    fn reading_restores_the_tree() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("DICOMDIR");
        write_dicomdir(&path, &header(), &sample_tree(), "2.25.1").expect("write");
        let loaded = read_dicomdir(&path).expect("read");
        assert_eq!(loaded.header.fileset_id, "TESTSET");
        assert_eq!(loaded.sop_instance, "2.25.1");
        assert_eq!(loaded.root.count(), 6);
        let patient = &loaded.root.children[0];
        assert_eq!(patient.attributes.element_str(PATIENT_ID).as_deref(), Some("P1"));
        assert!(!patient.attributes.has_element(OFFSET_OF_NEXT_RECORD));
        let images = &patient.children[0].children[0].children;
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].file_id(), Some("DIR\\IMG2"));
        assert_eq!(images[1].reference.as_ref().map(|r| r.sop_instance.as_str()), Some("1.2.3.1.2"));
        assert_eq!(loaded.root.children[1].attributes.element_str(PATIENT_ID).as_deref(), Some("P2"));
    }

    #[test]
    fn shifted_offsets_are_corrupted_data() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("DICOMDIR");
        write_dicomdir(&path, &header(), &sample_tree(), "2.25.1").expect("write");

        let mut object = open_file(&path).expect("open");
        let shift = |offset: usize| PrimitiveValue::from(if offset == 0 { 0 } else { offset as u32 + 2 });
        let items: Vec<InMemDicomObject> = object
            .sequence_items(DIRECTORY_RECORD_SEQUENCE)
            .expect("records")
            .iter()
            .map(|item| {
                let mut item = item.clone();
                for tag in [OFFSET_OF_NEXT_RECORD, OFFSET_OF_LOWER_LEVEL_ENTITY] {
                    let value = shift(offset_of(&item, tag));
                    item.put(DataElement::new(tag, VR::UL, value));
                }
                item
            })
            .collect();
        for tag in [OFFSET_OF_FIRST_ROOT_RECORD, OFFSET_OF_LAST_ROOT_RECORD] {
            let value = shift(offset_of(&object, tag));
            object.put(DataElement::new(tag, VR::UL, value));
        }
        object.put(DataElement::new(
            DIRECTORY_RECORD_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(items),
        ));
        object.write_to_file(&path).expect("rewrite");

        let err = read_dicomdir(&path).expect_err("shifted offsets");
        assert_eq!(err.kind(), crate::error::ErrorKind::CorruptedData);
    }

    #[test]
    fn empty_tree_writes_zero_offsets() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("DICOMDIR");
        write_dicomdir(&path, &header(), &DirectoryRecord::root(), "2.25.2").expect("write");
        let loaded = read_dicomdir(&path).expect("read");
        assert!(loaded.root.children.is_empty());
    }

    #[test]
    fn generated_uids_are_valid() {
        let uid = generate_instance_uid("TESTSET");
        assert!(uid.starts_with("2.25."));
        assert!(uid.len() <= 64);
        assert!(uid[5..].chars().all(|c| c.is_ascii_digit()));
    }
}
