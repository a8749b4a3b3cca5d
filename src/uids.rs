//
// uids.rs
// DicomDir-Tools-rs
//
// SOP class and transfer syntax identifiers recognised by the profile rules and the record classifier.
//
// Thales Matheus Mendonça Santos - November 2025

pub const MEDIA_STORAGE_DIRECTORY_STORAGE: &str = "1.2.840.10008.1.3.10";

// Transfer syntaxes
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";
pub const JPEG_EXTENDED: &str = "1.2.840.10008.1.2.4.51";
pub const JPEG_LOSSLESS_SV1: &str = "1.2.840.10008.1.2.4.70";
pub const JPEG_2000_LOSSLESS: &str = "1.2.840.10008.1.2.4.90";
pub const JPEG_2000: &str = "1.2.840.10008.1.2.4.91";
pub const MPEG2_MAIN_PROFILE_MAIN_LEVEL: &str = "1.2.840.10008.1.2.4.100";
pub const MPEG2_MAIN_PROFILE_HIGH_LEVEL: &str = "1.2.840.10008.1.2.4.101";
pub const MPEG4_HIGH_PROFILE_LEVEL_4_1: &str = "1.2.840.10008.1.2.4.102";
pub const MPEG4_BD_HIGH_PROFILE_LEVEL_4_1: &str = "1.2.840.10008.1.2.4.103";
pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";

// Patient management (retired)
pub const DETACHED_PATIENT_MANAGEMENT: &str = "1.2.840.10008.3.1.2.1.1";
pub const DETACHED_PATIENT_MANAGEMENT_META: &str = "1.2.840.10008.3.1.2.1.4";

// Images
pub const COMPUTED_RADIOGRAPHY_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.1";
pub const DIGITAL_XRAY_PRESENTATION: &str = "1.2.840.10008.5.1.4.1.1.1.1";
pub const DIGITAL_XRAY_PROCESSING: &str = "1.2.840.10008.5.1.4.1.1.1.1.1";
pub const DIGITAL_MAMMOGRAPHY_PRESENTATION: &str = "1.2.840.10008.5.1.4.1.1.1.2";
pub const DIGITAL_MAMMOGRAPHY_PROCESSING: &str = "1.2.840.10008.5.1.4.1.1.1.2.1";
pub const DIGITAL_INTRAORAL_XRAY_PRESENTATION: &str = "1.2.840.10008.5.1.4.1.1.1.3";
pub const DIGITAL_INTRAORAL_XRAY_PROCESSING: &str = "1.2.840.10008.5.1.4.1.1.1.3.1";
pub const CT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
pub const ENHANCED_CT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.2.1";
pub const ULTRASOUND_MULTIFRAME_IMAGE_RETIRED: &str = "1.2.840.10008.5.1.4.1.1.3";
pub const ULTRASOUND_MULTIFRAME_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.3.1";
pub const MR_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.4";
pub const ENHANCED_MR_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.4.1";
pub const MR_SPECTROSCOPY: &str = "1.2.840.10008.5.1.4.1.1.4.2";
pub const NUCLEAR_MEDICINE_IMAGE_RETIRED: &str = "1.2.840.10008.5.1.4.1.1.5";
pub const ULTRASOUND_IMAGE_RETIRED: &str = "1.2.840.10008.5.1.4.1.1.6";
pub const ULTRASOUND_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.6.1";
pub const SECONDARY_CAPTURE_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.7";
pub const MULTIFRAME_SINGLE_BIT_SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7.1";
pub const MULTIFRAME_GRAYSCALE_BYTE_SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7.2";
pub const MULTIFRAME_GRAYSCALE_WORD_SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7.3";
pub const MULTIFRAME_TRUE_COLOR_SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7.4";
pub const STANDALONE_OVERLAY: &str = "1.2.840.10008.5.1.4.1.1.8";
pub const STANDALONE_CURVE: &str = "1.2.840.10008.5.1.4.1.1.9";
pub const TWELVE_LEAD_ECG_WAVEFORM: &str = "1.2.840.10008.5.1.4.1.1.9.1.1";
pub const GENERAL_ECG_WAVEFORM: &str = "1.2.840.10008.5.1.4.1.1.9.1.2";
pub const AMBULATORY_ECG_WAVEFORM: &str = "1.2.840.10008.5.1.4.1.1.9.1.3";
pub const HEMODYNAMIC_WAVEFORM: &str = "1.2.840.10008.5.1.4.1.1.9.2.1";
pub const CARDIAC_ELECTROPHYSIOLOGY_WAVEFORM: &str = "1.2.840.10008.5.1.4.1.1.9.3.1";
pub const BASIC_VOICE_AUDIO_WAVEFORM: &str = "1.2.840.10008.5.1.4.1.1.9.4.1";
pub const STANDALONE_MODALITY_LUT: &str = "1.2.840.10008.5.1.4.1.1.10";
pub const STANDALONE_VOI_LUT: &str = "1.2.840.10008.5.1.4.1.1.11";
pub const GRAYSCALE_SOFTCOPY_PRESENTATION_STATE: &str = "1.2.840.10008.5.1.4.1.1.11.1";
pub const COLOR_SOFTCOPY_PRESENTATION_STATE: &str = "1.2.840.10008.5.1.4.1.1.11.2";
pub const PSEUDO_COLOR_SOFTCOPY_PRESENTATION_STATE: &str = "1.2.840.10008.5.1.4.1.1.11.3";
pub const BLENDING_SOFTCOPY_PRESENTATION_STATE: &str = "1.2.840.10008.5.1.4.1.1.11.4";
pub const XRAY_ANGIOGRAPHIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.12.1";
pub const XRAY_RADIOFLUOROSCOPIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.12.2";
pub const XRAY_ANGIOGRAPHIC_BIPLANE_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.12.3";
pub const NUCLEAR_MEDICINE_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.20";
pub const RAW_DATA: &str = "1.2.840.10008.5.1.4.1.1.66";
pub const SPATIAL_REGISTRATION: &str = "1.2.840.10008.5.1.4.1.1.66.1";
pub const SPATIAL_FIDUCIALS: &str = "1.2.840.10008.5.1.4.1.1.66.2";
pub const SEGMENTATION: &str = "1.2.840.10008.5.1.4.1.1.66.4";
pub const SURFACE_SEGMENTATION: &str = "1.2.840.10008.5.1.4.1.1.66.5";
pub const TRACTOGRAPHY_RESULTS: &str = "1.2.840.10008.5.1.4.1.1.66.6";
pub const REAL_WORLD_VALUE_MAPPING: &str = "1.2.840.10008.5.1.4.1.1.67";
pub const SURFACE_SCAN_MESH: &str = "1.2.840.10008.5.1.4.1.1.68.1";
pub const SURFACE_SCAN_POINT_CLOUD: &str = "1.2.840.10008.5.1.4.1.1.68.2";
pub const VL_IMAGE_RETIRED: &str = "1.2.840.10008.5.1.4.1.1.77.1";
pub const VL_ENDOSCOPIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.1";
pub const VIDEO_ENDOSCOPIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.1.1";
pub const VL_MICROSCOPIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.2";
pub const VIDEO_MICROSCOPIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.2.1";
pub const VL_SLIDE_COORDINATES_MICROSCOPIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.3";
pub const VL_PHOTOGRAPHIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.4";
pub const VIDEO_PHOTOGRAPHIC_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.4.1";
pub const OPHTHALMIC_PHOTOGRAPHY_8BIT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.1";
pub const OPHTHALMIC_PHOTOGRAPHY_16BIT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.2";
pub const STEREOMETRIC_RELATIONSHIP: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.3";
pub const LENSOMETRY_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.1";
pub const AUTOREFRACTION_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.2";
pub const KERATOMETRY_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.3";
pub const SUBJECTIVE_REFRACTION_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.4";
pub const VISUAL_ACUITY_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.5";
pub const SPECTACLE_PRESCRIPTION_REPORT: &str = "1.2.840.10008.5.1.4.1.1.78.6";
pub const OPHTHALMIC_AXIAL_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.7";
pub const INTRAOCULAR_LENS_CALCULATIONS: &str = "1.2.840.10008.5.1.4.1.1.78.8";
pub const BASIC_TEXT_SR: &str = "1.2.840.10008.5.1.4.1.1.88.11";
pub const ENHANCED_SR: &str = "1.2.840.10008.5.1.4.1.1.88.22";
pub const COMPREHENSIVE_SR: &str = "1.2.840.10008.5.1.4.1.1.88.33";
pub const PROCEDURE_LOG: &str = "1.2.840.10008.5.1.4.1.1.88.40";
pub const MAMMOGRAPHY_CAD_SR: &str = "1.2.840.10008.5.1.4.1.1.88.50";
pub const KEY_OBJECT_SELECTION_DOCUMENT: &str = "1.2.840.10008.5.1.4.1.1.88.59";
pub const CHEST_CAD_SR: &str = "1.2.840.10008.5.1.4.1.1.88.65";
pub const XRAY_RADIATION_DOSE_SR: &str = "1.2.840.10008.5.1.4.1.1.88.67";
pub const PLANNED_IMAGING_AGENT_ADMINISTRATION_SR: &str = "1.2.840.10008.5.1.4.1.1.88.74";
pub const CONTENT_ASSESSMENT_RESULTS: &str = "1.2.840.10008.5.1.4.1.1.90.1";
pub const ENCAPSULATED_PDF: &str = "1.2.840.10008.5.1.4.1.1.104.1";
pub const ENCAPSULATED_CDA: &str = "1.2.840.10008.5.1.4.1.1.104.2";
pub const POSITRON_EMISSION_TOMOGRAPHY_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.128";
pub const STANDALONE_PET_CURVE: &str = "1.2.840.10008.5.1.4.1.1.129";
pub const RT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.481.1";
pub const RT_DOSE: &str = "1.2.840.10008.5.1.4.1.1.481.2";
pub const RT_STRUCTURE_SET: &str = "1.2.840.10008.5.1.4.1.1.481.3";
pub const RT_BEAMS_TREATMENT_RECORD: &str = "1.2.840.10008.5.1.4.1.1.481.4";
pub const RT_PLAN: &str = "1.2.840.10008.5.1.4.1.1.481.5";
pub const RT_BRACHY_TREATMENT_RECORD: &str = "1.2.840.10008.5.1.4.1.1.481.6";
pub const RT_TREATMENT_SUMMARY_RECORD: &str = "1.2.840.10008.5.1.4.1.1.481.7";
pub const RT_ION_PLAN: &str = "1.2.840.10008.5.1.4.1.1.481.8";
pub const RT_ION_BEAMS_TREATMENT_RECORD: &str = "1.2.840.10008.5.1.4.1.1.481.9";
pub const RT_PHYSICIAN_INTENT: &str = "1.2.840.10008.5.1.4.1.1.481.10";
pub const RT_SEGMENT_ANNOTATION: &str = "1.2.840.10008.5.1.4.1.1.481.11";
pub const RT_RADIATION_SET: &str = "1.2.840.10008.5.1.4.1.1.481.12";
pub const C_ARM_PHOTON_ELECTRON_RADIATION: &str = "1.2.840.10008.5.1.4.1.1.481.13";
pub const HANGING_PROTOCOL: &str = "1.2.840.10008.5.1.4.38.1";
pub const COLOR_PALETTE: &str = "1.2.840.10008.5.1.4.39.1";
pub const GENERIC_IMPLANT_TEMPLATE: &str = "1.2.840.10008.5.1.4.43.1";
pub const IMPLANT_ASSEMBLY_TEMPLATE: &str = "1.2.840.10008.5.1.4.44.1";
pub const IMPLANT_TEMPLATE_GROUP: &str = "1.2.840.10008.5.1.4.45.1";
pub const STORED_PRINT: &str = "1.2.840.10008.5.1.1.27";
pub const HARDCOPY_GRAYSCALE_IMAGE: &str = "1.2.840.10008.5.1.1.29";
pub const HARDCOPY_COLOR_IMAGE: &str = "1.2.840.10008.5.1.1.30";

/// Human readable name for the identifiers this crate knows about.
pub fn uid_name(uid: &str) -> Option<&'static str> {
    let name = match uid {
        MEDIA_STORAGE_DIRECTORY_STORAGE => "Media Storage Directory Storage",
        IMPLICIT_VR_LITTLE_ENDIAN => "Implicit VR Little Endian",
        EXPLICIT_VR_LITTLE_ENDIAN => "Explicit VR Little Endian",
        JPEG_BASELINE => "JPEG Baseline (Process 1)",
        JPEG_EXTENDED => "JPEG Extended (Process 2 & 4)",
        JPEG_LOSSLESS_SV1 => "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
        JPEG_2000_LOSSLESS => "JPEG 2000 Image Compression (Lossless Only)",
        JPEG_2000 => "JPEG 2000 Image Compression",
        MPEG2_MAIN_PROFILE_MAIN_LEVEL => "MPEG2 Main Profile @ Main Level",
        MPEG2_MAIN_PROFILE_HIGH_LEVEL => "MPEG2 Main Profile @ High Level",
        MPEG4_HIGH_PROFILE_LEVEL_4_1 => "MPEG-4 AVC/H.264 High Profile / Level 4.1",
        MPEG4_BD_HIGH_PROFILE_LEVEL_4_1 => "MPEG-4 AVC/H.264 BD-compatible High Profile / Level 4.1",
        RLE_LOSSLESS => "RLE Lossless",
        DETACHED_PATIENT_MANAGEMENT => "Detached Patient Management SOP Class",
        COMPUTED_RADIOGRAPHY_IMAGE => "Computed Radiography Image Storage",
        DIGITAL_XRAY_PRESENTATION => "Digital X-Ray Image Storage - For Presentation",
        DIGITAL_INTRAORAL_XRAY_PRESENTATION => "Digital Intra-Oral X-Ray Image Storage - For Presentation",
        CT_IMAGE => "CT Image Storage",
        ENHANCED_CT_IMAGE => "Enhanced CT Image Storage",
        ULTRASOUND_MULTIFRAME_IMAGE => "Ultrasound Multi-frame Image Storage",
        MR_IMAGE => "MR Image Storage",
        ENHANCED_MR_IMAGE => "Enhanced MR Image Storage",
        MR_SPECTROSCOPY => "MR Spectroscopy Storage",
        ULTRASOUND_IMAGE => "Ultrasound Image Storage",
        SECONDARY_CAPTURE_IMAGE => "Secondary Capture Image Storage",
        STANDALONE_OVERLAY => "Standalone Overlay Storage",
        STANDALONE_CURVE => "Standalone Curve Storage",
        TWELVE_LEAD_ECG_WAVEFORM => "12-lead ECG Waveform Storage",
        HEMODYNAMIC_WAVEFORM => "Hemodynamic Waveform Storage",
        STANDALONE_MODALITY_LUT => "Standalone Modality LUT Storage",
        STANDALONE_VOI_LUT => "Standalone VOI LUT Storage",
        GRAYSCALE_SOFTCOPY_PRESENTATION_STATE => "Grayscale Softcopy Presentation State Storage",
        XRAY_ANGIOGRAPHIC_IMAGE => "X-Ray Angiographic Image Storage",
        XRAY_RADIOFLUOROSCOPIC_IMAGE => "X-Ray Radiofluoroscopic Image Storage",
        NUCLEAR_MEDICINE_IMAGE => "Nuclear Medicine Image Storage",
        RAW_DATA => "Raw Data Storage",
        SPATIAL_REGISTRATION => "Spatial Registration Storage",
        SPATIAL_FIDUCIALS => "Spatial Fiducials Storage",
        SEGMENTATION => "Segmentation Storage",
        REAL_WORLD_VALUE_MAPPING => "Real World Value Mapping Storage",
        BASIC_TEXT_SR => "Basic Text SR Storage",
        ENHANCED_SR => "Enhanced SR Storage",
        COMPREHENSIVE_SR => "Comprehensive SR Storage",
        KEY_OBJECT_SELECTION_DOCUMENT => "Key Object Selection Document Storage",
        ENCAPSULATED_PDF => "Encapsulated PDF Storage",
        POSITRON_EMISSION_TOMOGRAPHY_IMAGE => "Positron Emission Tomography Image Storage",
        RT_IMAGE => "RT Image Storage",
        RT_DOSE => "RT Dose Storage",
        RT_STRUCTURE_SET => "RT Structure Set Storage",
        RT_PLAN => "RT Plan Storage",
        HANGING_PROTOCOL => "Hanging Protocol Storage",
        COLOR_PALETTE => "Color Palette Storage",
        STORED_PRINT => "Stored Print Storage",
        _ => return None,
    };
    Some(name)
}

/// Name of a UID for diagnostics, or the UID itself when unknown.
pub fn display_uid(uid: &str) -> String {
    uid_name(uid).map(str::to_string).unwrap_or_else(|| uid.to_string())
}
