use crate::record::RecordType;
use crate::uids::*;

/// Families are tried in this order; the first one listing the SOP class wins.
const FAMILIES: &[(&[&str], RecordType)] = &[
    (&[STANDALONE_OVERLAY], RecordType::Overlay),
    (&[STANDALONE_MODALITY_LUT], RecordType::ModalityLut),
    (&[STANDALONE_VOI_LUT], RecordType::VoiLut),
    (&[STANDALONE_CURVE, STANDALONE_PET_CURVE], RecordType::Curve),
    (
        &[
            BASIC_TEXT_SR,
            ENHANCED_SR,
            COMPREHENSIVE_SR,
            MAMMOGRAPHY_CAD_SR,
            CHEST_CAD_SR,
            PROCEDURE_LOG,
            XRAY_RADIATION_DOSE_SR,
        ],
        RecordType::SrDocument,
    ),
    (
        &[
            GRAYSCALE_SOFTCOPY_PRESENTATION_STATE,
            COLOR_SOFTCOPY_PRESENTATION_STATE,
            PSEUDO_COLOR_SOFTCOPY_PRESENTATION_STATE,
            BLENDING_SOFTCOPY_PRESENTATION_STATE,
        ],
        RecordType::Presentation,
    ),
    (
        &[
            TWELVE_LEAD_ECG_WAVEFORM,
            GENERAL_ECG_WAVEFORM,
            AMBULATORY_ECG_WAVEFORM,
            HEMODYNAMIC_WAVEFORM,
            CARDIAC_ELECTROPHYSIOLOGY_WAVEFORM,
            BASIC_VOICE_AUDIO_WAVEFORM,
        ],
        RecordType::Waveform,
    ),
    (&[RT_DOSE], RecordType::RtDose),
    (&[RT_STRUCTURE_SET], RecordType::RtStructureSet),
    (&[RT_PLAN], RecordType::RtPlan),
    (
        &[
            RT_BEAMS_TREATMENT_RECORD,
            RT_BRACHY_TREATMENT_RECORD,
            RT_TREATMENT_SUMMARY_RECORD,
        ],
        RecordType::RtTreatmentRecord,
    ),
    (
        &[
            RT_PHYSICIAN_INTENT,
            RT_SEGMENT_ANNOTATION,
            RT_RADIATION_SET,
            C_ARM_PHOTON_ELECTRON_RADIATION,
        ],
        RecordType::Radiotherapy,
    ),
    (&[STORED_PRINT], RecordType::StoredPrint),
    (&[KEY_OBJECT_SELECTION_DOCUMENT], RecordType::KeyObjectDoc),
    (&[SPATIAL_REGISTRATION], RecordType::Registration),
    (&[SPATIAL_FIDUCIALS], RecordType::Fiducial),
    (&[RAW_DATA], RecordType::RawData),
    (&[MR_SPECTROSCOPY], RecordType::Spectroscopy),
    (&[ENCAPSULATED_PDF, ENCAPSULATED_CDA], RecordType::EncapsulatedDoc),
    (&[REAL_WORLD_VALUE_MAPPING], RecordType::ValueMap),
    (&[HANGING_PROTOCOL], RecordType::HangingProtocol),
    (&[STEREOMETRIC_RELATIONSHIP], RecordType::Stereometric),
    (&[COLOR_PALETTE], RecordType::Palette),
    (&[SURFACE_SEGMENTATION], RecordType::Surface),
    (
        &[
            LENSOMETRY_MEASUREMENTS,
            AUTOREFRACTION_MEASUREMENTS,
            KERATOMETRY_MEASUREMENTS,
            SUBJECTIVE_REFRACTION_MEASUREMENTS,
            VISUAL_ACUITY_MEASUREMENTS,
            SPECTACLE_PRESCRIPTION_REPORT,
            OPHTHALMIC_AXIAL_MEASUREMENTS,
            INTRAOCULAR_LENS_CALCULATIONS,
        ],
        RecordType::Measurement,
    ),
    (&[GENERIC_IMPLANT_TEMPLATE], RecordType::Implant),
    (&[IMPLANT_ASSEMBLY_TEMPLATE], RecordType::ImplantAssembly),
    (&[IMPLANT_TEMPLATE_GROUP], RecordType::ImplantGroup),
    (&[SURFACE_SCAN_MESH, SURFACE_SCAN_POINT_CLOUD], RecordType::SurfaceScan),
    (&[TRACTOGRAPHY_RESULTS], RecordType::Tract),
    (&[CONTENT_ASSESSMENT_RESULTS], RecordType::Assessment),
    (&[PLANNED_IMAGING_AGENT_ADMINISTRATION_SR], RecordType::Plan),
];

/// Directory record kind for a stored object of class `sop_class`.
///
/// Anything not listed in a family, including segmentation, RT image and the
/// RT ion classes, falls back to an image record.
pub fn record_type_for(sop_class: &str) -> RecordType {
    FAMILIES
        .iter()
        .find(|(members, _)| members.contains(&sop_class))
        .map(|(_, kind)| *kind)
        .unwrap_or(RecordType::Image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_non_image_families() {
        assert_eq!(record_type_for(STANDALONE_PET_CURVE), RecordType::Curve);
        assert_eq!(record_type_for(KEY_OBJECT_SELECTION_DOCUMENT), RecordType::KeyObjectDoc);
        assert_eq!(record_type_for(ENCAPSULATED_CDA), RecordType::EncapsulatedDoc);
        assert_eq!(record_type_for(HANGING_PROTOCOL), RecordType::HangingProtocol);
        assert_eq!(record_type_for(RT_RADIATION_SET), RecordType::Radiotherapy);
    }

    #[test]
    fn unverified_classes_fall_back_to_image() {
        assert_eq!(record_type_for(SEGMENTATION), RecordType::Image);
        assert_eq!(record_type_for(RT_ION_PLAN), RecordType::Image);
        assert_eq!(record_type_for(CT_IMAGE), RecordType::Image);
        assert_eq!(record_type_for("1.2.3.4.5"), RecordType::Image);
    }
}
