//
// tags.rs
// DicomDir-Tools-rs
//
// Attribute tags used by directory records and profile checks, plus name/VR lookups via the standard dictionary.
//
// Thales Matheus Mendonça Santos - November 2025

use dicom::core::dictionary::DataDictionary;
use dicom::core::{Tag, VR};
use dicom_dictionary_std::StandardDataDictionary;

// Basic directory information
pub const FILE_SET_ID: Tag = Tag(0x0004, 0x1130);
pub const FILE_SET_DESCRIPTOR_FILE_ID: Tag = Tag(0x0004, 0x1141);
pub const SPECIFIC_CHARACTER_SET_OF_FILE_SET_DESCRIPTOR_FILE: Tag = Tag(0x0004, 0x1142);
pub const OFFSET_OF_FIRST_ROOT_RECORD: Tag = Tag(0x0004, 0x1200);
pub const OFFSET_OF_LAST_ROOT_RECORD: Tag = Tag(0x0004, 0x1202);
pub const FILE_SET_CONSISTENCY_FLAG: Tag = Tag(0x0004, 0x1212);
pub const DIRECTORY_RECORD_SEQUENCE: Tag = Tag(0x0004, 0x1220);
pub const OFFSET_OF_NEXT_RECORD: Tag = Tag(0x0004, 0x1400);
pub const RECORD_IN_USE_FLAG: Tag = Tag(0x0004, 0x1410);
pub const OFFSET_OF_LOWER_LEVEL_ENTITY: Tag = Tag(0x0004, 0x1420);
pub const DIRECTORY_RECORD_TYPE: Tag = Tag(0x0004, 0x1430);
pub const REFERENCED_FILE_ID: Tag = Tag(0x0004, 0x1500);
pub const REFERENCED_SOP_CLASS_UID_IN_FILE: Tag = Tag(0x0004, 0x1510);
pub const REFERENCED_SOP_INSTANCE_UID_IN_FILE: Tag = Tag(0x0004, 0x1511);
pub const REFERENCED_TRANSFER_SYNTAX_UID_IN_FILE: Tag = Tag(0x0004, 0x1512);

// General
pub const SPECIFIC_CHARACTER_SET: Tag = Tag(0x0008, 0x0005);
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const SERIES_DATE: Tag = Tag(0x0008, 0x0021);
pub const ACQUISITION_DATE: Tag = Tag(0x0008, 0x0022);
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
pub const ACQUISITION_DATE_TIME: Tag = Tag(0x0008, 0x002A);
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
pub const SERIES_TIME: Tag = Tag(0x0008, 0x0031);
pub const ACQUISITION_TIME: Tag = Tag(0x0008, 0x0032);
pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
pub const INSTITUTION_ADDRESS: Tag = Tag(0x0008, 0x0081);
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const PERFORMING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x1050);
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
pub const REFERENCED_SERIES_SEQUENCE: Tag = Tag(0x0008, 0x1115);
pub const REFERENCED_IMAGE_SEQUENCE: Tag = Tag(0x0008, 0x1140);
pub const REFERENCED_SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x1155);
pub const REFERENCED_IMAGE_EVIDENCE_SEQUENCE: Tag = Tag(0x0008, 0x9092);

// Patient
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);

// Acquisition / equipment
pub const ACQUISITION_TIME_SYNCHRONIZED: Tag = Tag(0x0018, 0x1800);
pub const DETECTOR_ID: Tag = Tag(0x0018, 0x700A);
pub const DETECTOR_MANUFACTURER_NAME: Tag = Tag(0x0018, 0x702A);
pub const DETECTOR_MANUFACTURER_MODEL_NAME: Tag = Tag(0x0018, 0x702B);

// Ultrasound region calibration
pub const SEQUENCE_OF_ULTRASOUND_REGIONS: Tag = Tag(0x0018, 0x6011);
pub const REGION_SPATIAL_FORMAT: Tag = Tag(0x0018, 0x6012);
pub const REGION_DATA_TYPE: Tag = Tag(0x0018, 0x6014);
pub const REGION_FLAGS: Tag = Tag(0x0018, 0x6016);
pub const REGION_LOCATION_MIN_X0: Tag = Tag(0x0018, 0x6018);
pub const REGION_LOCATION_MIN_Y0: Tag = Tag(0x0018, 0x601A);
pub const REGION_LOCATION_MAX_X1: Tag = Tag(0x0018, 0x601C);
pub const REGION_LOCATION_MAX_Y1: Tag = Tag(0x0018, 0x601E);
pub const PHYSICAL_UNITS_X_DIRECTION: Tag = Tag(0x0018, 0x6024);
pub const PHYSICAL_UNITS_Y_DIRECTION: Tag = Tag(0x0018, 0x6026);
pub const PHYSICAL_DELTA_X: Tag = Tag(0x0018, 0x602C);
pub const PHYSICAL_DELTA_Y: Tag = Tag(0x0018, 0x602E);
pub const PIXEL_COMPONENT_ORGANIZATION: Tag = Tag(0x0018, 0x6044);
pub const PIXEL_COMPONENT_MASK: Tag = Tag(0x0018, 0x6046);
pub const PIXEL_COMPONENT_RANGE_START: Tag = Tag(0x0018, 0x6048);
pub const PIXEL_COMPONENT_RANGE_STOP: Tag = Tag(0x0018, 0x604A);
pub const PIXEL_COMPONENT_PHYSICAL_UNITS: Tag = Tag(0x0018, 0x604C);
pub const PIXEL_COMPONENT_DATA_TYPE: Tag = Tag(0x0018, 0x604E);
pub const NUMBER_OF_TABLE_BREAK_POINTS: Tag = Tag(0x0018, 0x6050);
pub const TABLE_OF_X_BREAK_POINTS: Tag = Tag(0x0018, 0x6052);
pub const TABLE_OF_Y_BREAK_POINTS: Tag = Tag(0x0018, 0x6054);
pub const NUMBER_OF_TABLE_ENTRIES: Tag = Tag(0x0018, 0x6056);
pub const TABLE_OF_PIXEL_VALUES: Tag = Tag(0x0018, 0x6058);
pub const TABLE_OF_PARAMETER_VALUES: Tag = Tag(0x0018, 0x605A);

// Relationship
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);
pub const OVERLAY_NUMBER: Tag = Tag(0x0020, 0x0022);
pub const CURVE_NUMBER: Tag = Tag(0x0020, 0x0024);
pub const LOOKUP_TABLE_NUMBER: Tag = Tag(0x0020, 0x0026);
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
pub const FRAME_OF_REFERENCE_UID: Tag = Tag(0x0020, 0x0052);
pub const SYNCHRONIZATION_FRAME_OF_REFERENCE_UID: Tag = Tag(0x0020, 0x0200);
pub const PLANE_POSITION_SEQUENCE: Tag = Tag(0x0020, 0x9113);
pub const PLANE_ORIENTATION_SEQUENCE: Tag = Tag(0x0020, 0x9116);

// Image pixel
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const LOSSY_IMAGE_COMPRESSION_RATIO: Tag = Tag(0x0028, 0x2112);
pub const REPRESENTATIVE_FRAME_NUMBER: Tag = Tag(0x0028, 0x6010);
pub const DATA_POINT_ROWS: Tag = Tag(0x0028, 0x9001);
pub const DATA_POINT_COLUMNS: Tag = Tag(0x0028, 0x9002);
pub const PIXEL_MEASURES_SEQUENCE: Tag = Tag(0x0028, 0x9110);
pub const CALIBRATION_IMAGE: Tag = Tag(0x0050, 0x0004);
pub const ICON_IMAGE_SEQUENCE: Tag = Tag(0x0088, 0x0200);
pub const SHARED_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9229);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// Overlay plane elements (group 60xx)
pub const OVERLAY_ROWS_ELEMENT: u16 = 0x0010;
pub const OVERLAY_COLUMNS_ELEMENT: u16 = 0x0011;
pub const OVERLAY_BITS_ALLOCATED_ELEMENT: u16 = 0x0100;
pub const OVERLAY_BIT_POSITION_ELEMENT: u16 = 0x0102;
pub const OVERLAY_DATA_ELEMENT: u16 = 0x3000;

// Structured reporting
pub const VERIFICATION_DATE_TIME: Tag = Tag(0x0040, 0xA030);
pub const RELATIONSHIP_TYPE: Tag = Tag(0x0040, 0xA010);
pub const CONCEPT_NAME_CODE_SEQUENCE: Tag = Tag(0x0040, 0xA043);
pub const VERIFYING_OBSERVER_SEQUENCE: Tag = Tag(0x0040, 0xA073);
pub const COMPLETION_FLAG: Tag = Tag(0x0040, 0xA491);
pub const VERIFICATION_FLAG: Tag = Tag(0x0040, 0xA493);
pub const CONTENT_SEQUENCE: Tag = Tag(0x0040, 0xA730);

// Encapsulated documents
pub const DOCUMENT_TITLE: Tag = Tag(0x0042, 0x0010);
pub const MIME_TYPE_OF_ENCAPSULATED_DOCUMENT: Tag = Tag(0x0042, 0x0012);

// Presentation states and content identification
pub const CONTENT_LABEL: Tag = Tag(0x0070, 0x0080);
pub const CONTENT_DESCRIPTION: Tag = Tag(0x0070, 0x0081);
pub const PRESENTATION_CREATION_DATE: Tag = Tag(0x0070, 0x0082);
pub const PRESENTATION_CREATION_TIME: Tag = Tag(0x0070, 0x0083);
pub const CONTENT_CREATOR_NAME: Tag = Tag(0x0070, 0x0084);
pub const BLENDING_SEQUENCE: Tag = Tag(0x0070, 0x0402);

// Hanging protocols
pub const HANGING_PROTOCOL_NAME: Tag = Tag(0x0072, 0x0002);
pub const HANGING_PROTOCOL_DESCRIPTION: Tag = Tag(0x0072, 0x0004);
pub const HANGING_PROTOCOL_LEVEL: Tag = Tag(0x0072, 0x0006);
pub const HANGING_PROTOCOL_CREATOR: Tag = Tag(0x0072, 0x0008);
pub const HANGING_PROTOCOL_CREATION_DATE_TIME: Tag = Tag(0x0072, 0x000A);
pub const HANGING_PROTOCOL_DEFINITION_SEQUENCE: Tag = Tag(0x0072, 0x000C);
pub const HANGING_PROTOCOL_USER_IDENTIFICATION_CODE_SEQUENCE: Tag = Tag(0x0072, 0x000E);
pub const NUMBER_OF_PRIORS_REFERENCED: Tag = Tag(0x0072, 0x0014);

// Implant templates
pub const IMPLANT_NAME: Tag = Tag(0x0022, 0x1095);
pub const IMPLANT_PART_NUMBER: Tag = Tag(0x0022, 0x1097);
pub const IMPLANT_SIZE: Tag = Tag(0x0068, 0x6210);
pub const IMPLANT_ASSEMBLY_TEMPLATE_NAME: Tag = Tag(0x0076, 0x0001);
pub const IMPLANT_ASSEMBLY_TEMPLATE_ISSUER: Tag = Tag(0x0076, 0x0003);
pub const PROCEDURE_TYPE_CODE_SEQUENCE: Tag = Tag(0x0076, 0x000A);
pub const IMPLANT_TEMPLATE_GROUP_NAME: Tag = Tag(0x0078, 0x0001);
pub const IMPLANT_TEMPLATE_GROUP_DESCRIPTION: Tag = Tag(0x0078, 0x0010);
pub const IMPLANT_TEMPLATE_GROUP_ISSUER: Tag = Tag(0x0078, 0x0020);

// Radiotherapy
pub const DOSE_COMMENT: Tag = Tag(0x3004, 0x0006);
pub const DOSE_SUMMATION_TYPE: Tag = Tag(0x3004, 0x000A);
pub const STRUCTURE_SET_LABEL: Tag = Tag(0x3006, 0x0002);
pub const STRUCTURE_SET_DATE: Tag = Tag(0x3006, 0x0008);
pub const STRUCTURE_SET_TIME: Tag = Tag(0x3006, 0x0009);
pub const TREATMENT_DATE: Tag = Tag(0x3008, 0x0250);
pub const TREATMENT_TIME: Tag = Tag(0x3008, 0x0251);
pub const RT_PLAN_LABEL: Tag = Tag(0x300A, 0x0002);
pub const RT_PLAN_DATE: Tag = Tag(0x300A, 0x0006);
pub const RT_PLAN_TIME: Tag = Tag(0x300A, 0x0007);

/// First and last repeating overlay group (60xx, even groups only).
pub const OVERLAY_GROUPS: std::ops::RangeInclusive<u16> = 0x6000..=0x601E;

pub fn format_tag(tag: Tag) -> String {
    format!("({:04X},{:04X})", tag.group(), tag.element())
}

pub fn tag_name(tag: Tag) -> String {
    StandardDataDictionary
        .by_tag(tag)
        .map(|e| e.alias.to_string())
        .unwrap_or_else(|| "UnknownTag".to_string())
}

/// `PatientID (0010,0020)`, the form used in every diagnostic message.
pub fn describe(tag: Tag) -> String {
    format!("{} {}", tag_name(tag), format_tag(tag))
}

/// Value representation registered for `tag`, falling back to `UN` for unknown tags.
pub fn vr_of(tag: Tag) -> VR {
    StandardDataDictionary
        .by_tag(tag)
        .map(|e| e.vr.relaxed())
        .unwrap_or(VR::UN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_known_tags_with_dictionary_alias() {
        assert_eq!(describe(PATIENT_ID), "PatientID (0010,0020)");
        assert_eq!(format_tag(DIRECTORY_RECORD_SEQUENCE), "(0004,1220)");
    }

    #[test]
    fn resolves_value_representations() {
        assert_eq!(vr_of(STUDY_INSTANCE_UID), VR::UI);
        assert_eq!(vr_of(SERIES_NUMBER), VR::IS);
        assert_eq!(vr_of(Tag(0x0009, 0x0001)), VR::UN);
    }
}
