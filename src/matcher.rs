use std::path::Path;

use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::object::open_file;
use tracing::{error, warn};

use crate::dicom_access::{same_value, ElementAccess};
use crate::filename::locate_dicom_file;
use crate::record::{DirectoryRecord, RecordType};
use crate::source::SourceFile;
use crate::tags::*;

/// Decides whether an existing record stands for the instance being added.
pub struct RecordMatcher<'a> {
    /// Fileset root, used to open files referenced by legacy study records.
    base: &'a Path,
    invent_patient_id: bool,
}

impl<'a> RecordMatcher<'a> {
    pub fn new(base: &'a Path, invent_patient_id: bool) -> Self {
        RecordMatcher {
            base,
            invent_patient_id,
        }
    }

    /// Index of the first child of `parent` with kind `kind` matching `file`.
    pub fn find_child(&self, parent: &DirectoryRecord, kind: RecordType, file: &mut SourceFile) -> Option<usize> {
        for (index, child) in parent.children.iter().enumerate() {
            if child.record_type == kind && self.matches(child, file) {
                return Some(index);
            }
        }
        None
    }

    /// Match on the kind's unique key. A patient whose name disagrees with an
    /// identical PatientID loses the ID when IDs are being invented, so that a
    /// new patient with a fresh ID gets created.
    pub fn matches(&self, record: &DirectoryRecord, file: &mut SourceFile) -> bool {
        let dataset_value = |file: &SourceFile, tag| file.dataset().element_str(tag).unwrap_or_default();
        let record_value = |tag| record.attributes.element_str(tag).unwrap_or_default();
        match record.record_type {
            RecordType::Root => false,
            RecordType::Patient => {
                if !file.dataset().has_value(PATIENT_ID) {
                    return same_value(&record_value(PATIENT_NAME), &dataset_value(file, PATIENT_NAME));
                }
                let patient_id = record_value(PATIENT_ID);
                let matched = same_value(&patient_id, &dataset_value(file, PATIENT_ID));
                if matched
                    && self.invent_patient_id
                    && !same_value(&record_value(PATIENT_NAME), &dataset_value(file, PATIENT_NAME))
                {
                    warn!(
                        file = %file.path.display(),
                        "PatientName inconsistent for PatientID: {patient_id}"
                    );
                    file.object
                        .put(DataElement::new(PATIENT_ID, VR::LO, PrimitiveValue::from("")));
                    return false;
                }
                matched
            }
            RecordType::Study => {
                let incoming = dataset_value(file, STUDY_INSTANCE_UID);
                if record.attributes.has_value(STUDY_INSTANCE_UID) {
                    return same_value(&record_value(STUDY_INSTANCE_UID), &incoming);
                }
                // older media put the key only into the file a study record references
                match record.file_id() {
                    Some(file_id) => match self.study_uid_from_reference(file_id) {
                        Some(uid) => same_value(&uid, &incoming),
                        None => false,
                    },
                    None => false,
                }
            }
            RecordType::Series => same_value(
                &record_value(SERIES_INSTANCE_UID),
                &dataset_value(file, SERIES_INSTANCE_UID),
            ),
            _ => {
                let referenced = record
                    .reference
                    .as_ref()
                    .map(|r| r.sop_instance.clone())
                    .unwrap_or_default();
                same_value(&referenced, &dataset_value(file, SOP_INSTANCE_UID))
            }
        }
    }

    fn study_uid_from_reference(&self, file_id: &str) -> Option<String> {
        let Some(path) = locate_dicom_file(self.base, file_id) else {
            error!("cannot locate referenced file: {file_id}");
            return None;
        };
        match open_file(&path) {
            Ok(object) => object.element_str(STUDY_INSTANCE_UID),
            Err(e) => {
                error!(file = %path.display(), "cannot read referenced file: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FileReference;
    use crate::uids;
    use dicom::object::{FileDicomObject, FileMetaTableBuilder, StandardDataDictionary};
    use std::path::PathBuf;

    fn file_with(values: &[(dicom::core::Tag, &str)]) -> SourceFile {
        let meta = FileMetaTableBuilder::new()
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(uids::CT_IMAGE)
            .media_storage_sop_instance_uid("1.2.3.9")
            .build()
            .expect("meta");
        let mut object = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
        for (tag, value) in values {
            object.put(DataElement::new(*tag, vr_of(*tag), PrimitiveValue::from(*value)));
        }
        SourceFile::from_object("IMG1", PathBuf::from("IMG1"), object)
    }

    fn patient(id: &str, name: &str) -> DirectoryRecord {
        let mut record = DirectoryRecord::new(RecordType::Patient);
        record
            .attributes
            .put(DataElement::new(PATIENT_ID, VR::LO, PrimitiveValue::from(id)));
        record
            .attributes
            .put(DataElement::new(PATIENT_NAME, vr_of(PATIENT_NAME), PrimitiveValue::from(name)));
        record
    }

    #[test]
    fn patients_match_on_id_then_on_name() {
        let matcher = RecordMatcher::new(Path::new("."), false);
        let record = patient("P1", "Doe^John");
        assert!(matcher.matches(&record, &mut file_with(&[(PATIENT_ID, "P1"), (PATIENT_NAME, "Other")])));
        assert!(!matcher.matches(&record, &mut file_with(&[(PATIENT_ID, "P2"), (PATIENT_NAME, "Doe^John")])));
        assert!(matcher.matches(&record, &mut file_with(&[(PATIENT_NAME, "Doe^John")])));
    }

    #[test]
    fn name_conflict_clears_the_id_when_inventing() {
        let matcher = RecordMatcher::new(Path::new("."), true);
        let record = patient("P1", "Doe^John");
        let mut file = file_with(&[(PATIENT_ID, "P1"), (PATIENT_NAME, "Roe^Jane")]);
        assert!(!matcher.matches(&record, &mut file));
        assert!(!file.dataset().has_value(PATIENT_ID));
    }

    #[test]
    fn empty_keys_never_match() {
        let matcher = RecordMatcher::new(Path::new("."), false);
        let series = DirectoryRecord::new(RecordType::Series);
        assert!(!matcher.matches(&series, &mut file_with(&[])));
    }

    #[test]
    fn instances_match_on_the_referenced_sop_instance() {
        let matcher = RecordMatcher::new(Path::new("."), false);
        let mut parent = DirectoryRecord::new(RecordType::Series);
        for uid in ["1.2.3.8", "1.2.3.9"] {
            parent.children.push(DirectoryRecord::with_reference(
                RecordType::Image,
                FileReference {
                    file_id: "IMG".into(),
                    sop_class: uids::CT_IMAGE.into(),
                    sop_instance: uid.into(),
                    transfer_syntax: uids::EXPLICIT_VR_LITTLE_ENDIAN.into(),
                },
            ));
        }
        let mut file = file_with(&[(SOP_INSTANCE_UID, "1.2.3.9")]);
        assert_eq!(matcher.find_child(&parent, RecordType::Image, &mut file), Some(1));
        assert_eq!(matcher.find_child(&parent, RecordType::Overlay, &mut file), None);
    }
}
