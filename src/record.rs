//
// record.rs
// DicomDir-Tools-rs
//
// Directory record tree: record kinds, unique keys, sort criteria and the owned node type.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt;
use std::path::PathBuf;

use dicom::core::Tag;
use dicom::object::InMemDicomObject;
use serde::Serialize;

use crate::dicom_access::ElementAccess;
use crate::tags;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RecordType {
    Root,
    Patient,
    Study,
    Series,
    Image,
    Overlay,
    ModalityLut,
    VoiLut,
    Curve,
    SrDocument,
    Presentation,
    Waveform,
    RtDose,
    RtStructureSet,
    RtPlan,
    RtTreatmentRecord,
    StoredPrint,
    KeyObjectDoc,
    Registration,
    Fiducial,
    RawData,
    Spectroscopy,
    EncapsulatedDoc,
    ValueMap,
    HangingProtocol,
    Stereometric,
    Palette,
    Surface,
    Measurement,
    Implant,
    ImplantGroup,
    ImplantAssembly,
    Plan,
    SurfaceScan,
    Tract,
    Assessment,
    Radiotherapy,
}

impl RecordType {
    /// Value of DirectoryRecordType (0004,1430); `None` for the synthetic root.
    pub fn code(&self) -> Option<&'static str> {
        use RecordType::*;
        let code = match self {
            Root => return None,
            Patient => "PATIENT",
            Study => "STUDY",
            Series => "SERIES",
            Image => "IMAGE",
            Overlay => "OVERLAY",
            ModalityLut => "MODALITY LUT",
            VoiLut => "VOI LUT",
            Curve => "CURVE",
            SrDocument => "SR DOCUMENT",
            Presentation => "PRESENTATION",
            Waveform => "WAVEFORM",
            RtDose => "RT DOSE",
            RtStructureSet => "RT STRUCTURE SET",
            RtPlan => "RT PLAN",
            RtTreatmentRecord => "RT TREAT RECORD",
            StoredPrint => "STORED PRINT",
            KeyObjectDoc => "KEY OBJECT DOC",
            Registration => "REGISTRATION",
            Fiducial => "FIDUCIAL",
            RawData => "RAW DATA",
            Spectroscopy => "SPECTROSCOPY",
            EncapsulatedDoc => "ENCAP DOC",
            ValueMap => "VALUE MAP",
            HangingProtocol => "HANGING PROTOCOL",
            Stereometric => "STEREOMETRIC",
            Palette => "PALETTE",
            Surface => "SURFACE",
            Measurement => "MEASUREMENT",
            Implant => "IMPLANT",
            ImplantGroup => "IMPLANT GROUP",
            ImplantAssembly => "IMPLANT ASSY",
            Plan => "PLAN",
            SurfaceScan => "SURFACE SCAN",
            Tract => "TRACT",
            Assessment => "ASSESSMENT",
            Radiotherapy => "RADIOTHERAPY",
        };
        Some(code)
    }

    pub fn from_code(code: &str) -> Option<RecordType> {
        let code = code.trim_end_matches(['\0', ' ']);
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == Some(code))
    }

    pub const ALL: &'static [RecordType] = &[
        RecordType::Patient,
        RecordType::Study,
        RecordType::Series,
        RecordType::Image,
        RecordType::Overlay,
        RecordType::ModalityLut,
        RecordType::VoiLut,
        RecordType::Curve,
        RecordType::SrDocument,
        RecordType::Presentation,
        RecordType::Waveform,
        RecordType::RtDose,
        RecordType::RtStructureSet,
        RecordType::RtPlan,
        RecordType::RtTreatmentRecord,
        RecordType::StoredPrint,
        RecordType::KeyObjectDoc,
        RecordType::Registration,
        RecordType::Fiducial,
        RecordType::RawData,
        RecordType::Spectroscopy,
        RecordType::EncapsulatedDoc,
        RecordType::ValueMap,
        RecordType::HangingProtocol,
        RecordType::Stereometric,
        RecordType::Palette,
        RecordType::Surface,
        RecordType::Measurement,
        RecordType::Implant,
        RecordType::ImplantGroup,
        RecordType::ImplantAssembly,
        RecordType::Plan,
        RecordType::SurfaceScan,
        RecordType::Tract,
        RecordType::Assessment,
        RecordType::Radiotherapy,
    ];

    /// Patient, study and series records aggregate instances and reference no file.
    pub fn is_aggregation(&self) -> bool {
        matches!(self, RecordType::Root | RecordType::Patient | RecordType::Study | RecordType::Series)
    }

    /// Record kinds that live directly below the root next to the patients.
    pub fn is_root_level(&self) -> bool {
        matches!(
            self,
            RecordType::Patient
                | RecordType::HangingProtocol
                | RecordType::Palette
                | RecordType::Implant
                | RecordType::ImplantGroup
                | RecordType::ImplantAssembly
        )
    }

    /// Whether a record of this kind may be placed directly below a `parent` record.
    pub fn allowed_below(&self, parent: RecordType) -> bool {
        match self {
            RecordType::Root => false,
            RecordType::Study => parent == RecordType::Patient,
            RecordType::Series => parent == RecordType::Study,
            t if t.is_root_level() => parent == RecordType::Root,
            _ => parent == RecordType::Series,
        }
    }

    /// Attribute whose value identifies a record among its siblings.
    pub fn unique_key(&self) -> Tag {
        match self {
            RecordType::Patient => tags::PATIENT_ID,
            RecordType::Study => tags::STUDY_INSTANCE_UID,
            RecordType::Series => tags::SERIES_INSTANCE_UID,
            _ => tags::REFERENCED_SOP_INSTANCE_UID_IN_FILE,
        }
    }

    /// Numeric attribute used to keep siblings ordered, if any.
    pub fn sort_key(&self) -> Option<Tag> {
        use RecordType::*;
        match self {
            Series => Some(tags::SERIES_NUMBER),
            Image => Some(tags::INSTANCE_NUMBER),
            Overlay => Some(tags::OVERLAY_NUMBER),
            Curve => Some(tags::CURVE_NUMBER),
            ModalityLut | VoiLut => Some(tags::LOOKUP_TABLE_NUMBER),
            SrDocument | Presentation | Waveform | RtDose | RtStructureSet | RtPlan
            | RtTreatmentRecord | StoredPrint | KeyObjectDoc | Registration | Fiducial | RawData
            | Spectroscopy | EncapsulatedDoc | ValueMap | Surface | Measurement | Plan
            | SurfaceScan | Tract | Assessment | Radiotherapy => Some(tags::INSTANCE_NUMBER),
            Root | Patient | Study | HangingProtocol | Stereometric | Palette | Implant
            | ImplantGroup | ImplantAssembly => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RecordType::*;
        let name = match self {
            Root => "Root",
            Patient => "Patient",
            Study => "Study",
            Series => "Series",
            Image => "Image",
            Overlay => "Overlay",
            ModalityLut => "ModalityLUT",
            VoiLut => "VOILUT",
            Curve => "Curve",
            SrDocument => "SRDocument",
            Presentation => "Presentation",
            Waveform => "Waveform",
            RtDose => "RTDose",
            RtStructureSet => "RTStructureSet",
            RtPlan => "RTPlan",
            RtTreatmentRecord => "RTTreatRecord",
            StoredPrint => "StoredPrint",
            KeyObjectDoc => "KeyObjectDoc",
            Registration => "Registration",
            Fiducial => "Fiducial",
            RawData => "RawData",
            Spectroscopy => "Spectroscopy",
            EncapsulatedDoc => "EncapDoc",
            ValueMap => "ValueMap",
            HangingProtocol => "HangingProtocol",
            Stereometric => "Stereometric",
            Palette => "Palette",
            Surface => "Surface",
            Measurement => "Measurement",
            Implant => "Implant",
            ImplantGroup => "ImplantGroup",
            ImplantAssembly => "ImplantAssy",
            Plan => "Plan",
            SurfaceScan => "SurfaceScan",
            Tract => "Tract",
            Assessment => "Assessment",
            Radiotherapy => "Radiotherapy",
        };
        f.write_str(name)
    }
}

/// Reference from an instance-level record to the file it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    /// Relative path in DICOM notation (`\` separated components).
    pub file_id: String,
    pub sop_class: String,
    pub sop_instance: String,
    pub transfer_syntax: String,
}

/// One node of the directory tree. Children are owned; there is no back pointer.
#[derive(Debug, Clone)]
pub struct DirectoryRecord {
    pub record_type: RecordType,
    pub attributes: InMemDicomObject,
    pub children: Vec<DirectoryRecord>,
    pub reference: Option<FileReference>,
    /// Source file that first produced the record; not serialized.
    pub origin_file: Option<PathBuf>,
    /// Attributes synthesized by the inventor rather than copied from a file.
    pub invented: Vec<Tag>,
}

impl DirectoryRecord {
    pub fn new(record_type: RecordType) -> Self {
        DirectoryRecord {
            record_type,
            attributes: InMemDicomObject::new_empty(),
            children: Vec::new(),
            reference: None,
            origin_file: None,
            invented: Vec::new(),
        }
    }

    pub fn root() -> Self {
        DirectoryRecord::new(RecordType::Root)
    }

    pub fn with_reference(record_type: RecordType, reference: FileReference) -> Self {
        let mut record = DirectoryRecord::new(record_type);
        record.reference = Some(reference);
        record
    }

    pub fn is_root(&self) -> bool {
        self.record_type == RecordType::Root
    }

    pub fn file_id(&self) -> Option<&str> {
        self.reference.as_ref().map(|r| r.file_id.as_str())
    }

    /// Value of the record's unique key; instance records answer from their file reference.
    pub fn unique_key_value(&self) -> Option<String> {
        let key = self.record_type.unique_key();
        if key == tags::REFERENCED_SOP_INSTANCE_UID_IN_FILE {
            return self
                .reference
                .as_ref()
                .map(|r| r.sop_instance.clone())
                .filter(|v| !v.is_empty());
        }
        self.attributes.element_str(key).filter(|v| !v.is_empty())
    }

    /// Integer value of the record's sort key.
    pub fn sort_number(&self) -> Option<i64> {
        self.record_type
            .sort_key()
            .and_then(|tag| self.attributes.element_int(tag))
    }

    pub fn was_invented(&self, tag: Tag) -> bool {
        self.invented.contains(&tag)
    }

    /// Number of records in this subtree, this one included unless it is the root.
    pub fn count(&self) -> usize {
        let own = usize::from(!self.is_root());
        own + self.children.iter().map(DirectoryRecord::count).sum::<usize>()
    }

    /// Pre-order walk (the order records are written in).
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a DirectoryRecord, usize)) {
        fn go<'a>(record: &'a DirectoryRecord, depth: usize, visit: &mut dyn FnMut(&'a DirectoryRecord, usize)) {
            visit(record, depth);
            for child in &record.children {
                go(child, depth + 1, visit);
            }
        }
        go(self, 0, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_every_kind() {
        for kind in RecordType::ALL {
            let code = kind.code().expect("non-root kinds have a code");
            assert_eq!(RecordType::from_code(code), Some(*kind));
        }
        assert_eq!(RecordType::from_code("IMAGE "), Some(RecordType::Image));
        assert_eq!(RecordType::from_code("FILM SESSION"), None);
    }

    #[test]
    fn parents_follow_the_hierarchy() {
        assert!(RecordType::Patient.allowed_below(RecordType::Root));
        assert!(RecordType::HangingProtocol.allowed_below(RecordType::Root));
        assert!(RecordType::Image.allowed_below(RecordType::Series));
        assert!(!RecordType::Image.allowed_below(RecordType::Study));
        assert!(!RecordType::Series.allowed_below(RecordType::Patient));
    }

    #[test]
    fn instance_records_use_the_referenced_instance_as_key() {
        let record = DirectoryRecord::with_reference(
            RecordType::Image,
            FileReference {
                file_id: "IMG1".into(),
                sop_class: "1.2.840.10008.5.1.4.1.1.2".into(),
                sop_instance: "1.2.3".into(),
                transfer_syntax: "1.2.840.10008.1.2.1".into(),
            },
        );
        assert_eq!(record.unique_key_value().as_deref(), Some("1.2.3"));
        assert_eq!(RecordType::Stereometric.sort_key(), None);
    }
}
