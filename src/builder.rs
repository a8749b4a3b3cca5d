//
// builder.rs
// DicomDir-Tools-rs
//
// Builds directory records from instance data sets, one key list per record kind.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use chrono::Local;
use dicom::core::value::DataSetSequence;
use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::object::InMemDicomObject;
use tracing::{debug, error, warn};

use crate::dicom_access::ElementAccess;
use crate::error::{DirError, Result};
use crate::icon::{icon_sequence, IconGenerator, IconSource};
use crate::options::DirOptions;
use crate::profile::{ApplicationProfile, IconPolicy};
use crate::record::{DirectoryRecord, FileReference, RecordType};
use crate::source::SourceFile;
use crate::tags::{self, *};
use crate::uids;

/// How a value moves from the instance into the record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CopyType {
    /// Must be present with a value; an empty element stands in when it is not.
    Type1,
    /// Copied when present with a value, never fabricated.
    Type1C,
    /// Always present in the record, empty when the instance has no value.
    Type2,
    /// Copied when present, even if empty.
    Type3,
}

use CopyType::*;

/// Keys copied for every record of a kind, before any profile specific handling.
fn record_keys(kind: RecordType) -> &'static [(Tag, CopyType)] {
    match kind {
        RecordType::Root => &[],
        RecordType::Patient => &[(PATIENT_ID, Type1), (PATIENT_NAME, Type1)],
        // study date and time are handled separately (they have alternatives)
        RecordType::Study => &[
            (STUDY_DESCRIPTION, Type1),
            (STUDY_INSTANCE_UID, Type1),
            (STUDY_ID, Type1),
            (ACCESSION_NUMBER, Type1),
        ],
        RecordType::Series => &[
            (MODALITY, Type1),
            (SERIES_INSTANCE_UID, Type1),
            (SERIES_NUMBER, Type1),
        ],
        RecordType::Image => &[(INSTANCE_NUMBER, Type1)],
        RecordType::Overlay => &[(OVERLAY_NUMBER, Type1)],
        RecordType::ModalityLut | RecordType::VoiLut => &[(LOOKUP_TABLE_NUMBER, Type1)],
        RecordType::Curve => &[(CURVE_NUMBER, Type1)],
        RecordType::SrDocument => &[
            (INSTANCE_NUMBER, Type1),
            (COMPLETION_FLAG, Type1),
            (VERIFICATION_FLAG, Type1),
            (CONTENT_DATE, Type1),
            (CONTENT_TIME, Type1),
            (CONCEPT_NAME_CODE_SEQUENCE, Type1),
        ],
        RecordType::Presentation => &[
            (INSTANCE_NUMBER, Type1),
            (CONTENT_LABEL, Type1),
            (PRESENTATION_CREATION_DATE, Type1),
            (PRESENTATION_CREATION_TIME, Type1),
            (CONTENT_CREATOR_NAME, Type1),
            (REFERENCED_SERIES_SEQUENCE, Type1),
            (CONTENT_DESCRIPTION, Type2),
        ],
        RecordType::Waveform => &[
            (INSTANCE_NUMBER, Type1),
            (CONTENT_DATE, Type1),
            (CONTENT_TIME, Type1),
        ],
        RecordType::RtDose => &[
            (INSTANCE_NUMBER, Type1),
            (DOSE_SUMMATION_TYPE, Type1),
            (DOSE_COMMENT, Type1),
            (ICON_IMAGE_SEQUENCE, Type1C),
        ],
        RecordType::RtStructureSet => &[
            (INSTANCE_NUMBER, Type1),
            (STRUCTURE_SET_LABEL, Type1),
            (STRUCTURE_SET_DATE, Type1),
            (STRUCTURE_SET_TIME, Type1),
        ],
        RecordType::RtPlan => &[
            (INSTANCE_NUMBER, Type1),
            (RT_PLAN_LABEL, Type1),
            (RT_PLAN_DATE, Type1),
            (RT_PLAN_TIME, Type1),
        ],
        RecordType::RtTreatmentRecord => &[
            (INSTANCE_NUMBER, Type1),
            (TREATMENT_DATE, Type1),
            (TREATMENT_TIME, Type1),
        ],
        RecordType::StoredPrint => &[(INSTANCE_NUMBER, Type1), (ICON_IMAGE_SEQUENCE, Type1C)],
        RecordType::KeyObjectDoc => &[
            (INSTANCE_NUMBER, Type1),
            (CONTENT_DATE, Type1),
            (CONTENT_TIME, Type1),
            (CONCEPT_NAME_CODE_SEQUENCE, Type1),
        ],
        RecordType::Registration
        | RecordType::Fiducial
        | RecordType::ValueMap
        | RecordType::Surface
        | RecordType::Tract => &[
            (CONTENT_DATE, Type1),
            (CONTENT_TIME, Type1),
            (INSTANCE_NUMBER, Type1),
            (CONTENT_LABEL, Type1),
            (CONTENT_DESCRIPTION, Type2),
            (CONTENT_CREATOR_NAME, Type2),
        ],
        RecordType::RawData => &[
            (CONTENT_DATE, Type1),
            (CONTENT_TIME, Type1),
            (INSTANCE_NUMBER, Type2),
        ],
        RecordType::Spectroscopy => &[
            (IMAGE_TYPE, Type1),
            (CONTENT_DATE, Type1),
            (CONTENT_TIME, Type1),
            (INSTANCE_NUMBER, Type1),
            (REFERENCED_IMAGE_EVIDENCE_SEQUENCE, Type1C),
            (NUMBER_OF_FRAMES, Type1),
            (ROWS, Type1),
            (COLUMNS, Type1),
            (DATA_POINT_ROWS, Type1),
            (DATA_POINT_COLUMNS, Type1),
        ],
        RecordType::EncapsulatedDoc => &[
            (INSTANCE_NUMBER, Type1),
            (MIME_TYPE_OF_ENCAPSULATED_DOCUMENT, Type1),
            (CONTENT_DATE, Type2),
            (CONTENT_TIME, Type2),
            (DOCUMENT_TITLE, Type2),
            (CONCEPT_NAME_CODE_SEQUENCE, Type1C),
        ],
        RecordType::HangingProtocol => &[
            (HANGING_PROTOCOL_NAME, Type1),
            (HANGING_PROTOCOL_DESCRIPTION, Type1),
            (HANGING_PROTOCOL_LEVEL, Type1),
            (HANGING_PROTOCOL_CREATOR, Type1),
            (HANGING_PROTOCOL_CREATION_DATE_TIME, Type1),
            (HANGING_PROTOCOL_DEFINITION_SEQUENCE, Type1),
            (NUMBER_OF_PRIORS_REFERENCED, Type1),
            (HANGING_PROTOCOL_USER_IDENTIFICATION_CODE_SEQUENCE, Type1C),
        ],
        RecordType::Stereometric => &[],
        RecordType::Palette => &[(CONTENT_LABEL, Type1), (CONTENT_DESCRIPTION, Type2)],
        RecordType::Measurement | RecordType::SurfaceScan | RecordType::Assessment => &[
            (CONTENT_DATE, Type1),
            (CONTENT_TIME, Type1),
            (INSTANCE_NUMBER, Type1),
            (CONCEPT_NAME_CODE_SEQUENCE, Type1C),
        ],
        RecordType::Implant => &[
            (MANUFACTURER, Type1),
            (IMPLANT_NAME, Type1),
            (IMPLANT_SIZE, Type1C),
            (IMPLANT_PART_NUMBER, Type1),
        ],
        RecordType::ImplantGroup => &[
            (IMPLANT_TEMPLATE_GROUP_NAME, Type1),
            (IMPLANT_TEMPLATE_GROUP_DESCRIPTION, Type3),
            (IMPLANT_TEMPLATE_GROUP_ISSUER, Type1),
        ],
        RecordType::ImplantAssembly => &[
            (IMPLANT_ASSEMBLY_TEMPLATE_NAME, Type1),
            (IMPLANT_ASSEMBLY_TEMPLATE_ISSUER, Type1C),
            (MANUFACTURER, Type1),
            (PROCEDURE_TYPE_CODE_SEQUENCE, Type1),
        ],
        RecordType::Plan => &[
            (CONTENT_DATE, Type2),
            (CONTENT_TIME, Type2),
            (INSTANCE_NUMBER, Type1),
        ],
        RecordType::Radiotherapy => &[
            (INSTANCE_NUMBER, Type1),
            (CONTENT_LABEL, Type3),
            (CONTENT_DESCRIPTION, Type3),
        ],
    }
}

/// Copies `tag` from `dataset` into `record` following `copy`.
pub fn copy_element(dataset: &InMemDicomObject, record: &mut InMemDicomObject, tag: Tag, copy: CopyType) {
    let source = dataset.element(tag).ok();
    match copy {
        Type1 => match source {
            Some(elem) => {
                record.put(elem.clone());
            }
            None => {
                warn!(tag = %tags::describe(tag), "type 1 attribute missing, inserting empty value");
                record.put(DataElement::empty(tag, tags::vr_of(tag)));
            }
        },
        Type1C => {
            if dataset.has_value(tag) {
                if let Some(elem) = source {
                    record.put(elem.clone());
                }
            }
        }
        Type2 => copy_string_with_default(dataset, record, tag, None, None),
        Type3 => {
            if let Some(elem) = source {
                record.put(elem.clone());
            }
        }
    }
}

/// Type 2 copy: the instance value when there is one, else `default` (or an empty value).
/// With `origin` given, the use of a default is reported.
pub fn copy_string_with_default(
    dataset: &InMemDicomObject,
    record: &mut InMemDicomObject,
    tag: Tag,
    default: Option<&str>,
    origin: Option<&Path>,
) {
    if dataset.has_value(tag) {
        if let Ok(elem) = dataset.element(tag) {
            record.put(elem.clone());
            return;
        }
    }
    let vr = tags::vr_of(tag);
    match default {
        Some(value) => {
            if let Some(origin) = origin {
                warn!(
                    file = %origin.display(),
                    "file {}: {} missing, using alternative: {value}",
                    origin.display(),
                    tags::tag_name(tag)
                );
            }
            record.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
        }
        None => {
            record.put(DataElement::empty(tag, vr));
        }
    }
}

fn first_value(dataset: &InMemDicomObject, candidates: &[Tag]) -> Option<String> {
    candidates
        .iter()
        .find_map(|tag| dataset.element_str(*tag).filter(|v| !v.is_empty()))
}

/// StudyDate stand-in: series, acquisition or content date, else today.
pub fn alternative_study_date(dataset: &InMemDicomObject) -> String {
    first_value(dataset, &[SERIES_DATE, ACQUISITION_DATE, CONTENT_DATE])
        .unwrap_or_else(|| Local::now().format("%Y%m%d").to_string())
}

/// StudyTime stand-in: series, acquisition or content time, else now.
pub fn alternative_study_time(dataset: &InMemDicomObject) -> String {
    first_value(dataset, &[SERIES_TIME, ACQUISITION_TIME, CONTENT_TIME])
        .unwrap_or_else(|| Local::now().format("%H%M%S").to_string())
}

/// Items of ContentSequence that modify the concept name of the document title.
fn concept_mod_items(dataset: &InMemDicomObject) -> Vec<InMemDicomObject> {
    dataset
        .sequence_items(CONTENT_SEQUENCE)
        .unwrap_or_default()
        .iter()
        .filter(|item| item.element_str(RELATIONSHIP_TYPE).as_deref() == Some("HAS CONCEPT MOD"))
        .cloned()
        .collect()
}

/// First two items of BlendingSequence, reduced to their study and series references.
fn blending_items(dataset: &InMemDicomObject) -> Vec<InMemDicomObject> {
    dataset
        .sequence_items(BLENDING_SEQUENCE)
        .unwrap_or_default()
        .iter()
        .take(2)
        .map(|item| {
            let mut reduced = InMemDicomObject::new_empty();
            copy_element(item, &mut reduced, STUDY_INSTANCE_UID, Type1);
            copy_element(item, &mut reduced, REFERENCED_SERIES_SEQUENCE, Type1);
            reduced
        })
        .collect()
}

fn put_sequence(record: &mut InMemDicomObject, tag: Tag, items: Vec<InMemDicomObject>) {
    if !items.is_empty() {
        record.put(DataElement::new(tag, VR::SQ, DataSetSequence::from(items)));
    }
}

/// Attributes that multi-frame objects keep in the shared functional groups.
const FUNCTIONAL_GROUP_FALLBACKS: &[(Tag, Tag)] = &[
    (IMAGE_POSITION_PATIENT, PLANE_POSITION_SEQUENCE),
    (IMAGE_ORIENTATION_PATIENT, PLANE_ORIENTATION_SEQUENCE),
    (PIXEL_SPACING, PIXEL_MEASURES_SEQUENCE),
];

/// Type 1C copy that also looks into SharedFunctionalGroupsSequence when the
/// data set itself lacks the attribute.
fn copy_with_functional_groups(dataset: &InMemDicomObject, record: &mut InMemDicomObject, tag: Tag) {
    if dataset.has_value(tag) {
        copy_element(dataset, record, tag, Type1C);
        return;
    }
    let Some((_, macro_tag)) = FUNCTIONAL_GROUP_FALLBACKS.iter().find(|(t, _)| *t == tag) else {
        return;
    };
    let found = dataset
        .sequence_items(SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
        .and_then(|groups| groups.first())
        .and_then(|group| group.sequence_items(*macro_tag))
        .and_then(|items| items.first())
        .and_then(|item| item.element(tag).ok())
        .filter(|elem| crate::dicom_access::element_has_value(elem));
    if let Some(elem) = found {
        record.put(elem.clone());
    }
}

fn is_biplane(dataset: &InMemDicomObject) -> bool {
    dataset
        .element(IMAGE_TYPE)
        .ok()
        .and_then(|e| e.to_multi_str().ok())
        .map(|values| values.iter().any(|v| v == "BIPLANE A" || v == "BIPLANE B"))
        .unwrap_or(false)
}

pub struct RecordBuilder<'a> {
    options: &'a DirOptions,
    icons: &'a IconGenerator,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(options: &'a DirOptions, icons: &'a IconGenerator) -> Self {
        RecordBuilder { options, icons }
    }

    fn profile(&self) -> ApplicationProfile {
        self.options.profile
    }

    /// New record of `kind` for `file`. Instance kinds reference the file under `file_id`.
    /// The record is complete or not returned at all.
    pub fn build(&self, kind: RecordType, file: &SourceFile, file_id: &str) -> Result<DirectoryRecord> {
        if kind == RecordType::Root {
            return Err(DirError::IllegalCall("the root record is not built from files".into()));
        }
        let mut record = if kind.is_aggregation() {
            DirectoryRecord::new(kind)
        } else {
            DirectoryRecord::with_reference(
                kind,
                FileReference {
                    file_id: file_id.to_string(),
                    sop_class: file.sop_class(),
                    sop_instance: file.sop_instance(),
                    transfer_syntax: file.transfer_syntax(),
                },
            )
        };
        record.origin_file = Some(file.path.clone());

        let dataset = file.dataset();
        let attributes = &mut record.attributes;
        copy_element(dataset, attributes, SPECIFIC_CHARACTER_SET, Type1C);
        if kind == RecordType::Study {
            let date = alternative_study_date(dataset);
            let time = alternative_study_time(dataset);
            copy_string_with_default(dataset, attributes, STUDY_DATE, Some(&date), Some(&file.path));
            copy_string_with_default(dataset, attributes, STUDY_TIME, Some(&time), Some(&file.path));
        }
        for (tag, copy) in record_keys(kind) {
            copy_element(dataset, attributes, *tag, *copy);
        }
        self.profile_keys(kind, dataset, attributes);

        match kind {
            RecordType::SrDocument => {
                if dataset.element_str(VERIFICATION_FLAG).as_deref() == Some("VERIFIED") {
                    // most recent observer is the last item
                    if let Some(last) = dataset
                        .sequence_items(VERIFYING_OBSERVER_SEQUENCE)
                        .and_then(|items| items.last())
                    {
                        copy_element(last, attributes, VERIFICATION_DATE_TIME, Type1);
                    }
                }
                put_sequence(attributes, CONTENT_SEQUENCE, concept_mod_items(dataset));
            }
            RecordType::KeyObjectDoc => {
                put_sequence(attributes, CONTENT_SEQUENCE, concept_mod_items(dataset));
            }
            RecordType::Presentation => {
                put_sequence(attributes, BLENDING_SEQUENCE, blending_items(dataset));
            }
            RecordType::Image => self.add_icon(&mut record, file)?,
            _ => {}
        }
        debug!(record = %kind, file = %file.path.display(), "built record");
        Ok(record)
    }

    /// Extra keys required by particular profiles.
    fn profile_keys(&self, kind: RecordType, dataset: &InMemDicomObject, attributes: &mut InMemDicomObject) {
        use ApplicationProfile::*;
        let profile = self.profile();
        let extended = profile.is_general_extended() || profile == Mpeg2MpmlDvd;
        match kind {
            RecordType::Patient | RecordType::Series => {
                let keys: &[Tag] = if kind == RecordType::Patient {
                    &[PATIENT_BIRTH_DATE, PATIENT_SEX]
                } else {
                    &[INSTITUTION_NAME, INSTITUTION_ADDRESS, PERFORMING_PHYSICIAN_NAME]
                };
                let copy = if extended {
                    Type1C
                } else if profile.is_angiographic() {
                    Type2
                } else {
                    return;
                };
                for tag in keys {
                    copy_element(dataset, attributes, *tag, copy);
                }
            }
            RecordType::Spectroscopy if profile.is_general_extended() => {
                for tag in [FRAME_OF_REFERENCE_UID, SYNCHRONIZATION_FRAME_OF_REFERENCE_UID] {
                    copy_element(dataset, attributes, tag, Type1C);
                }
                for tag in [ACQUISITION_TIME_SYNCHRONIZED, ACQUISITION_DATE_TIME, REFERENCED_IMAGE_SEQUENCE] {
                    copy_element(dataset, attributes, tag, Type1C);
                }
                for tag in [IMAGE_POSITION_PATIENT, IMAGE_ORIENTATION_PATIENT, PIXEL_SPACING] {
                    copy_with_functional_groups(dataset, attributes, tag);
                }
            }
            RecordType::Image => self.image_keys(dataset, attributes),
            _ => {}
        }
    }

    fn image_keys(&self, dataset: &InMemDicomObject, attributes: &mut InMemDicomObject) {
        use ApplicationProfile::*;
        let profile = self.profile();
        match profile {
            GeneralPurpose | GeneralMime => {
                copy_element(dataset, attributes, IMAGE_TYPE, Type3);
                copy_element(dataset, attributes, REFERENCED_IMAGE_SEQUENCE, Type3);
            }
            p if p.is_general_extended() => {
                copy_element(dataset, attributes, ROWS, Type1);
                copy_element(dataset, attributes, COLUMNS, Type1);
                copy_element(dataset, attributes, IMAGE_TYPE, Type3);
                copy_element(dataset, attributes, CALIBRATION_IMAGE, Type1C);
                copy_element(dataset, attributes, LOSSY_IMAGE_COMPRESSION_RATIO, Type1C);
                for tag in [
                    FRAME_OF_REFERENCE_UID,
                    SYNCHRONIZATION_FRAME_OF_REFERENCE_UID,
                    NUMBER_OF_FRAMES,
                    ACQUISITION_TIME_SYNCHRONIZED,
                    ACQUISITION_DATE_TIME,
                    REFERENCED_IMAGE_SEQUENCE,
                ] {
                    copy_element(dataset, attributes, tag, Type1C);
                }
                for tag in [IMAGE_POSITION_PATIENT, IMAGE_ORIENTATION_PATIENT, PIXEL_SPACING] {
                    copy_with_functional_groups(dataset, attributes, tag);
                }
            }
            Mpeg2MpmlDvd => {
                copy_element(dataset, attributes, ROWS, Type1);
                copy_element(dataset, attributes, COLUMNS, Type1);
                copy_element(dataset, attributes, IMAGE_TYPE, Type3);
                copy_element(dataset, attributes, LOSSY_IMAGE_COMPRESSION_RATIO, Type1C);
            }
            BasicCardiac | XrayAngiographic | XrayAngiographicDvd => {
                if profile != BasicCardiac {
                    copy_element(dataset, attributes, LOSSY_IMAGE_COMPRESSION_RATIO, Type1C);
                }
                let xa_image = dataset.element_str(SOP_CLASS_UID).as_deref() == Some(uids::XRAY_ANGIOGRAPHIC_IMAGE);
                copy_element(dataset, attributes, IMAGE_TYPE, if xa_image { Type1 } else { Type3 });
                copy_element(dataset, attributes, CALIBRATION_IMAGE, Type2);
                let biplane = is_biplane(dataset);
                copy_element(
                    dataset,
                    attributes,
                    REFERENCED_IMAGE_SEQUENCE,
                    if biplane { Type1 } else { Type3 },
                );
            }
            CtAndMr => {
                copy_element(dataset, attributes, ROWS, Type1);
                copy_element(dataset, attributes, COLUMNS, Type1);
                for tag in [
                    REFERENCED_IMAGE_SEQUENCE,
                    IMAGE_POSITION_PATIENT,
                    IMAGE_ORIENTATION_PATIENT,
                    FRAME_OF_REFERENCE_UID,
                    PIXEL_SPACING,
                ] {
                    copy_element(dataset, attributes, tag, Type3);
                }
            }
            _ => {}
        }
    }

    /// Icon size and whether a failure counts as an error, if an icon is wanted at all.
    fn icon_request(&self) -> Option<(u32, bool)> {
        match self.profile().icon_policy() {
            IconPolicy::Required { size } => Some((size, true)),
            IconPolicy::Always { size } => Some((size, false)),
            IconPolicy::OnRequest if self.options.create_icons => Some((self.options.icon_size, false)),
            IconPolicy::OnRequest => None,
        }
    }

    fn add_icon(&self, record: &mut DirectoryRecord, file: &SourceFile) -> Result<()> {
        let Some((size, required)) = self.icon_request() else {
            return Ok(());
        };
        let (item, source) = self.icons.icon_item(&file.object, &file.name, size);
        if matches!(source, IconSource::Default | IconSource::Blank) {
            if required {
                error!(file = %file.path.display(), "cannot create IconImageSequence, using {source:?} icon");
            } else {
                warn!(file = %file.path.display(), "cannot create IconImageSequence, using {source:?} icon");
            }
        }
        record.attributes.put(icon_sequence(item));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom::object::{FileDicomObject, FileMetaTableBuilder, StandardDataDictionary};
    use std::path::PathBuf;

    fn put_str(obj: &mut InMemDicomObject, tag: Tag, value: &str) {
        obj.put(DataElement::new(tag, tags::vr_of(tag), PrimitiveValue::from(value)));
    }

    fn source(sop_class: &str, fill: impl FnOnce(&mut InMemDicomObject)) -> SourceFile {
        let meta = FileMetaTableBuilder::new()
            .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
            .media_storage_sop_class_uid(sop_class)
            .media_storage_sop_instance_uid("1.2.3.4.5")
            .build()
            .expect("meta");
        let mut object = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
        let mut dataset = InMemDicomObject::new_empty();
        put_str(&mut dataset, SOP_CLASS_UID, sop_class);
        fill(&mut dataset);
        for elem in dataset {
            object.put(elem);
        }
        SourceFile::from_object("IMG1", PathBuf::from("IMG1"), object)
    }

    #[test]
    fn copy_types_differ_on_missing_and_empty_values() {
        let mut dataset = InMemDicomObject::new_empty();
        dataset.put(DataElement::empty(STUDY_ID, VR::SH));
        let mut record = InMemDicomObject::new_empty();
        copy_element(&dataset, &mut record, PATIENT_ID, Type1);
        copy_element(&dataset, &mut record, PATIENT_NAME, Type1C);
        copy_element(&dataset, &mut record, STUDY_ID, Type3);
        copy_element(&dataset, &mut record, ACCESSION_NUMBER, Type2);
        copy_element(&dataset, &mut record, STUDY_DESCRIPTION, Type3);
        assert!(record.has_element(PATIENT_ID) && !record.has_value(PATIENT_ID));
        assert!(!record.has_element(PATIENT_NAME));
        assert!(record.has_element(STUDY_ID));
        assert!(record.has_element(ACCESSION_NUMBER));
        assert!(!record.has_element(STUDY_DESCRIPTION));
    }

    #[test]
    fn study_date_falls_back_to_series_date() {
        let options = DirOptions::default();
        let icons = IconGenerator::without_support(&options);
        let file = source(uids::CT_IMAGE, |d| {
            put_str(d, STUDY_INSTANCE_UID, "1.2.3");
            put_str(d, SERIES_DATE, "20230405");
            put_str(d, SERIES_TIME, "101500");
        });
        let record = RecordBuilder::new(&options, &icons)
            .build(RecordType::Study, &file, "IMG1")
            .expect("study record");
        assert_eq!(record.attributes.element_str(STUDY_DATE).as_deref(), Some("20230405"));
        assert_eq!(record.attributes.element_str(STUDY_TIME).as_deref(), Some("101500"));
        assert!(record.reference.is_none());
    }

    #[test]
    fn sr_records_keep_concept_modifiers_and_verification_time() {
        let options = DirOptions::default();
        let icons = IconGenerator::without_support(&options);
        let file = source(uids::BASIC_TEXT_SR, |d| {
            put_str(d, VERIFICATION_FLAG, "VERIFIED");
            let mut first = InMemDicomObject::new_empty();
            put_str(&mut first, VERIFICATION_DATE_TIME, "20240101080000");
            let mut last = InMemDicomObject::new_empty();
            put_str(&mut last, VERIFICATION_DATE_TIME, "20240102090000");
            d.put(DataElement::new(
                VERIFYING_OBSERVER_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![first, last]),
            ));
            let mut modifier = InMemDicomObject::new_empty();
            put_str(&mut modifier, RELATIONSHIP_TYPE, "HAS CONCEPT MOD");
            let mut contains = InMemDicomObject::new_empty();
            put_str(&mut contains, RELATIONSHIP_TYPE, "CONTAINS");
            d.put(DataElement::new(
                CONTENT_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![contains, modifier]),
            ));
        });
        let record = RecordBuilder::new(&options, &icons)
            .build(RecordType::SrDocument, &file, "SR1")
            .expect("sr record");
        assert_eq!(
            record.attributes.element_str(VERIFICATION_DATE_TIME).as_deref(),
            Some("20240102090000")
        );
        let content = record.attributes.sequence_items(CONTENT_SEQUENCE).expect("content");
        assert_eq!(content.len(), 1);
        assert_eq!(record.file_id(), Some("SR1"));
    }

    #[test]
    fn blending_items_are_reduced_and_capped() {
        let options = DirOptions::default();
        let icons = IconGenerator::without_support(&options);
        let file = source(uids::BLENDING_SOFTCOPY_PRESENTATION_STATE, |d| {
            let items = (0..3)
                .map(|i| {
                    let mut item = InMemDicomObject::new_empty();
                    put_str(&mut item, STUDY_INSTANCE_UID, &format!("1.2.{i}"));
                    put_str(&mut item, MODALITY, "CT");
                    item
                })
                .collect::<Vec<_>>();
            d.put(DataElement::new(BLENDING_SEQUENCE, VR::SQ, DataSetSequence::from(items)));
        });
        let record = RecordBuilder::new(&options, &icons)
            .build(RecordType::Presentation, &file, "PR1")
            .expect("presentation record");
        let blending = record.attributes.sequence_items(BLENDING_SEQUENCE).expect("blending");
        assert_eq!(blending.len(), 2);
        assert!(!blending[0].has_element(MODALITY));
        assert_eq!(blending[1].element_str(STUDY_INSTANCE_UID).as_deref(), Some("1.2.1"));
    }

    #[test]
    fn extended_profiles_read_shared_functional_groups() {
        let options = DirOptions::with_profile(ApplicationProfile::GeneralDvdJpeg);
        let icons = IconGenerator::without_support(&options);
        let file = source(uids::ENHANCED_CT_IMAGE, |d| {
            put_str(d, INSTANCE_NUMBER, "1");
            d.put(DataElement::new(ROWS, VR::US, PrimitiveValue::from(512_u16)));
            d.put(DataElement::new(COLUMNS, VR::US, PrimitiveValue::from(512_u16)));
            let mut measures = InMemDicomObject::new_empty();
            put_str(&mut measures, PIXEL_SPACING, "0.5\\0.5");
            let mut group = InMemDicomObject::new_empty();
            group.put(DataElement::new(
                PIXEL_MEASURES_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![measures]),
            ));
            d.put(DataElement::new(
                SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![group]),
            ));
        });
        let record = RecordBuilder::new(&options, &icons)
            .build(RecordType::Image, &file, "IMG1")
            .expect("image record");
        assert!(record.attributes.has_value(PIXEL_SPACING));
        assert_eq!(record.attributes.element_int(ROWS), Some(512));
        assert!(!record.attributes.has_element(ICON_IMAGE_SEQUENCE));
    }

    #[test]
    fn ct_and_mr_images_always_get_a_64_pixel_icon() {
        let options = DirOptions::with_profile(ApplicationProfile::CtAndMr);
        let icons = IconGenerator::without_support(&options);
        let file = source(uids::CT_IMAGE, |d| put_str(d, INSTANCE_NUMBER, "7"));
        let record = RecordBuilder::new(&options, &icons)
            .build(RecordType::Image, &file, "IMG1")
            .expect("image record");
        let icon = record
            .attributes
            .sequence_items(ICON_IMAGE_SEQUENCE)
            .and_then(|items| items.first())
            .expect("icon item");
        assert_eq!(icon.element_int(ROWS), Some(64));
        assert_eq!(record.sort_number(), Some(7));
    }
}
