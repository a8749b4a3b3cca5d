//
// profile.rs
// DicomDir-Tools-rs
//
// Application profiles: accepted SOP classes, transfer syntax rules and icon requirements per media type.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::uids::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationProfile {
    #[default]
    GeneralPurpose,
    GeneralDvdJpeg,
    GeneralDvdJ2k,
    GeneralBdJpeg,
    GeneralBdJ2k,
    GeneralBdMpeg2Mpml,
    GeneralBdMpeg2Mphl,
    GeneralBdMpeg4Hp,
    GeneralBdMpeg4Hpbd,
    UsbAndFlashJpeg,
    UsbAndFlashJ2k,
    GeneralMime,
    Mpeg2MpmlDvd,
    BasicCardiac,
    XrayAngiographic,
    XrayAngiographicDvd,
    DentalRadiograph,
    CtAndMr,
    UltrasoundIdSf,
    UltrasoundScSf,
    UltrasoundCcSf,
    UltrasoundIdMf,
    UltrasoundScMf,
    UltrasoundCcMf,
    #[value(name = "12-lead-ecg")]
    #[serde(rename = "12-lead-ecg")]
    TwelveLeadEcg,
    HemodynamicWaveform,
}

/// Transfer syntax expectation for one SOP class under one profile.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransferSyntaxRule {
    /// Anything the registry knows is fine.
    Any,
    OneOf(&'static [&'static str]),
}

impl TransferSyntaxRule {
    pub fn accepts(&self, ts: &str) -> bool {
        match self {
            TransferSyntaxRule::Any => true,
            TransferSyntaxRule::OneOf(list) => list.contains(&ts),
        }
    }

    /// `A, B or C expected` text of the diagnostics.
    pub fn expectation(&self) -> String {
        match self {
            TransferSyntaxRule::Any => "any transfer syntax".to_string(),
            TransferSyntaxRule::OneOf(list) => {
                let names: Vec<String> = list.iter().map(|uid| display_uid(uid)).collect();
                match names.split_last() {
                    Some((last, rest)) if !rest.is_empty() => {
                        format!("{} or {}", rest.join(", "), last)
                    }
                    Some((last, _)) => last.clone(),
                    None => String::new(),
                }
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IconPolicy {
    /// Icons only when the caller asks for them.
    OnRequest,
    /// Always generated; failure is reported as a warning.
    Always { size: u32 },
    /// Always generated; failure is an error.
    Required { size: u32 },
}

const EXPLICIT_ONLY: &[&str] = &[EXPLICIT_VR_LITTLE_ENDIAN];
const JPEG_FAMILY: &[&str] = &[
    EXPLICIT_VR_LITTLE_ENDIAN,
    JPEG_LOSSLESS_SV1,
    JPEG_BASELINE,
    JPEG_EXTENDED,
];
const J2K_FAMILY: &[&str] = &[
    EXPLICIT_VR_LITTLE_ENDIAN,
    JPEG_LOSSLESS_SV1,
    JPEG_BASELINE,
    JPEG_EXTENDED,
    JPEG_2000_LOSSLESS,
    JPEG_2000,
];
const JPEG_LOSSLESS_ONLY: &[&str] = &[JPEG_LOSSLESS_SV1];
const XA_DVD_SYNTAXES: &[&str] = &[JPEG_LOSSLESS_SV1, JPEG_BASELINE];
const CT_MR_SYNTAXES: &[&str] = &[EXPLICIT_VR_LITTLE_ENDIAN, JPEG_LOSSLESS_SV1];
const ULTRASOUND_SYNTAXES: &[&str] = &[EXPLICIT_VR_LITTLE_ENDIAN, RLE_LOSSLESS, JPEG_BASELINE];
const MPEG2_MPML: &[&str] = &[MPEG2_MAIN_PROFILE_MAIN_LEVEL];
const MPEG2_MPHL: &[&str] = &[MPEG2_MAIN_PROFILE_HIGH_LEVEL];
const MPEG4_HP: &[&str] = &[MPEG4_HIGH_PROFILE_LEVEL_4_1];
const MPEG4_HPBD: &[&str] = &[MPEG4_BD_HIGH_PROFILE_LEVEL_4_1];

/// Image storage classes accepted by the general purpose profiles.
pub const IMAGE_SOP_CLASSES: &[&str] = &[
    COMPUTED_RADIOGRAPHY_IMAGE,
    DIGITAL_XRAY_PRESENTATION,
    DIGITAL_XRAY_PROCESSING,
    DIGITAL_MAMMOGRAPHY_PRESENTATION,
    DIGITAL_MAMMOGRAPHY_PROCESSING,
    DIGITAL_INTRAORAL_XRAY_PRESENTATION,
    DIGITAL_INTRAORAL_XRAY_PROCESSING,
    CT_IMAGE,
    ENHANCED_CT_IMAGE,
    ULTRASOUND_MULTIFRAME_IMAGE,
    MR_IMAGE,
    ENHANCED_MR_IMAGE,
    ULTRASOUND_IMAGE,
    SECONDARY_CAPTURE_IMAGE,
    MULTIFRAME_SINGLE_BIT_SECONDARY_CAPTURE,
    MULTIFRAME_GRAYSCALE_BYTE_SECONDARY_CAPTURE,
    MULTIFRAME_GRAYSCALE_WORD_SECONDARY_CAPTURE,
    MULTIFRAME_TRUE_COLOR_SECONDARY_CAPTURE,
    XRAY_ANGIOGRAPHIC_IMAGE,
    XRAY_RADIOFLUOROSCOPIC_IMAGE,
    NUCLEAR_MEDICINE_IMAGE,
    SEGMENTATION,
    VL_ENDOSCOPIC_IMAGE,
    VIDEO_ENDOSCOPIC_IMAGE,
    VL_MICROSCOPIC_IMAGE,
    VIDEO_MICROSCOPIC_IMAGE,
    VL_SLIDE_COORDINATES_MICROSCOPIC_IMAGE,
    VL_PHOTOGRAPHIC_IMAGE,
    VIDEO_PHOTOGRAPHIC_IMAGE,
    OPHTHALMIC_PHOTOGRAPHY_8BIT_IMAGE,
    OPHTHALMIC_PHOTOGRAPHY_16BIT_IMAGE,
    POSITRON_EMISSION_TOMOGRAPHY_IMAGE,
    RT_IMAGE,
];

/// Classes only accepted when retired object types are allowed.
pub const RETIRED_SOP_CLASSES: &[&str] = &[
    DETACHED_PATIENT_MANAGEMENT,
    STANDALONE_OVERLAY,
    STANDALONE_CURVE,
    STANDALONE_MODALITY_LUT,
    STANDALONE_VOI_LUT,
    STANDALONE_PET_CURVE,
    ULTRASOUND_IMAGE_RETIRED,
    ULTRASOUND_MULTIFRAME_IMAGE_RETIRED,
    NUCLEAR_MEDICINE_IMAGE_RETIRED,
    VL_IMAGE_RETIRED,
    XRAY_ANGIOGRAPHIC_BIPLANE_IMAGE,
    HARDCOPY_GRAYSCALE_IMAGE,
    HARDCOPY_COLOR_IMAGE,
];

/// Everything else the general purpose profiles take.
const OTHER_GENERAL_SOP_CLASSES: &[&str] = &[
    RT_DOSE,
    RT_STRUCTURE_SET,
    RT_BEAMS_TREATMENT_RECORD,
    RT_PLAN,
    RT_BRACHY_TREATMENT_RECORD,
    RT_TREATMENT_SUMMARY_RECORD,
    RT_ION_PLAN,
    RT_ION_BEAMS_TREATMENT_RECORD,
    RT_PHYSICIAN_INTENT,
    RT_SEGMENT_ANNOTATION,
    RT_RADIATION_SET,
    C_ARM_PHOTON_ELECTRON_RADIATION,
    BASIC_TEXT_SR,
    ENHANCED_SR,
    COMPREHENSIVE_SR,
    PROCEDURE_LOG,
    MAMMOGRAPHY_CAD_SR,
    KEY_OBJECT_SELECTION_DOCUMENT,
    CHEST_CAD_SR,
    XRAY_RADIATION_DOSE_SR,
    PLANNED_IMAGING_AGENT_ADMINISTRATION_SR,
    CONTENT_ASSESSMENT_RESULTS,
    TWELVE_LEAD_ECG_WAVEFORM,
    GENERAL_ECG_WAVEFORM,
    AMBULATORY_ECG_WAVEFORM,
    HEMODYNAMIC_WAVEFORM,
    CARDIAC_ELECTROPHYSIOLOGY_WAVEFORM,
    BASIC_VOICE_AUDIO_WAVEFORM,
    SPATIAL_REGISTRATION,
    SPATIAL_FIDUCIALS,
    GRAYSCALE_SOFTCOPY_PRESENTATION_STATE,
    COLOR_SOFTCOPY_PRESENTATION_STATE,
    PSEUDO_COLOR_SOFTCOPY_PRESENTATION_STATE,
    BLENDING_SOFTCOPY_PRESENTATION_STATE,
    STORED_PRINT,
    RAW_DATA,
    MR_SPECTROSCOPY,
    ENCAPSULATED_PDF,
    ENCAPSULATED_CDA,
    REAL_WORLD_VALUE_MAPPING,
    HANGING_PROTOCOL,
    STEREOMETRIC_RELATIONSHIP,
    COLOR_PALETTE,
    SURFACE_SEGMENTATION,
    SURFACE_SCAN_MESH,
    SURFACE_SCAN_POINT_CLOUD,
    TRACTOGRAPHY_RESULTS,
    LENSOMETRY_MEASUREMENTS,
    AUTOREFRACTION_MEASUREMENTS,
    KERATOMETRY_MEASUREMENTS,
    SUBJECTIVE_REFRACTION_MEASUREMENTS,
    VISUAL_ACUITY_MEASUREMENTS,
    SPECTACLE_PRESCRIPTION_REPORT,
    OPHTHALMIC_AXIAL_MEASUREMENTS,
    INTRAOCULAR_LENS_CALCULATIONS,
    GENERIC_IMPLANT_TEMPLATE,
    IMPLANT_ASSEMBLY_TEMPLATE,
    IMPLANT_TEMPLATE_GROUP,
];

/// Composite IODs that may carry motion video encodings.
pub const MULTIFRAME_SOP_CLASSES: &[&str] = &[
    XRAY_ANGIOGRAPHIC_IMAGE,
    XRAY_RADIOFLUOROSCOPIC_IMAGE,
    ENHANCED_CT_IMAGE,
    NUCLEAR_MEDICINE_IMAGE,
    RT_IMAGE,
    RT_DOSE,
    ULTRASOUND_MULTIFRAME_IMAGE,
    ENHANCED_MR_IMAGE,
    MULTIFRAME_SINGLE_BIT_SECONDARY_CAPTURE,
    MULTIFRAME_GRAYSCALE_BYTE_SECONDARY_CAPTURE,
    MULTIFRAME_GRAYSCALE_WORD_SECONDARY_CAPTURE,
    MULTIFRAME_TRUE_COLOR_SECONDARY_CAPTURE,
    VIDEO_ENDOSCOPIC_IMAGE,
    VIDEO_MICROSCOPIC_IMAGE,
    VIDEO_PHOTOGRAPHIC_IMAGE,
    OPHTHALMIC_PHOTOGRAPHY_8BIT_IMAGE,
    OPHTHALMIC_PHOTOGRAPHY_16BIT_IMAGE,
];

pub fn is_multiframe_sop_class(sop_class: &str) -> bool {
    MULTIFRAME_SOP_CLASSES.contains(&sop_class)
}

pub fn is_retired_sop_class(sop_class: &str) -> bool {
    RETIRED_SOP_CLASSES.contains(&sop_class)
}

impl ApplicationProfile {
    pub const ALL: &'static [ApplicationProfile] = &[
        ApplicationProfile::GeneralPurpose,
        ApplicationProfile::GeneralDvdJpeg,
        ApplicationProfile::GeneralDvdJ2k,
        ApplicationProfile::GeneralBdJpeg,
        ApplicationProfile::GeneralBdJ2k,
        ApplicationProfile::GeneralBdMpeg2Mpml,
        ApplicationProfile::GeneralBdMpeg2Mphl,
        ApplicationProfile::GeneralBdMpeg4Hp,
        ApplicationProfile::GeneralBdMpeg4Hpbd,
        ApplicationProfile::UsbAndFlashJpeg,
        ApplicationProfile::UsbAndFlashJ2k,
        ApplicationProfile::GeneralMime,
        ApplicationProfile::Mpeg2MpmlDvd,
        ApplicationProfile::BasicCardiac,
        ApplicationProfile::XrayAngiographic,
        ApplicationProfile::XrayAngiographicDvd,
        ApplicationProfile::DentalRadiograph,
        ApplicationProfile::CtAndMr,
        ApplicationProfile::UltrasoundIdSf,
        ApplicationProfile::UltrasoundScSf,
        ApplicationProfile::UltrasoundCcSf,
        ApplicationProfile::UltrasoundIdMf,
        ApplicationProfile::UltrasoundScMf,
        ApplicationProfile::UltrasoundCcMf,
        ApplicationProfile::TwelveLeadEcg,
        ApplicationProfile::HemodynamicWaveform,
    ];

    /// Profile identifier as written on the media label.
    pub fn media_name(&self) -> &'static str {
        use ApplicationProfile::*;
        match self {
            GeneralPurpose => "STD-GEN-CD/DVD-RAM",
            GeneralDvdJpeg => "STD-GEN-DVD-JPEG",
            GeneralDvdJ2k => "STD-GEN-DVD-J2K",
            GeneralBdJpeg => "STD-GEN-BD-JPEG",
            GeneralBdJ2k => "STD-GEN-BD-J2K",
            GeneralBdMpeg2Mpml => "STD-GEN-BD-MPEG2-MPML",
            GeneralBdMpeg2Mphl => "STD-GEN-BD-MPEG2-MPHL",
            GeneralBdMpeg4Hp => "STD-GEN-BD-MPEG4-HPLV41",
            GeneralBdMpeg4Hpbd => "STD-GEN-BD-MPEG4-HPLV41BD",
            UsbAndFlashJpeg => "STD-GEN-USB/MMC/CF/SD-JPEG",
            UsbAndFlashJ2k => "STD-GEN-USB/MMC/CF/SD-J2K",
            GeneralMime => "STD-GEN-MIME",
            Mpeg2MpmlDvd => "STD-DVD-MPEG2-MPML",
            BasicCardiac => "STD-XABC-CD",
            XrayAngiographic => "STD-XA1K-CD",
            XrayAngiographicDvd => "STD-XA1K-DVD",
            DentalRadiograph => "STD-DEN-CD",
            CtAndMr => "STD-CTMR-xxxx",
            UltrasoundIdSf => "STD-US-ID-SF-xxxx",
            UltrasoundScSf => "STD-US-SC-SF-xxxx",
            UltrasoundCcSf => "STD-US-CC-SF-xxxx",
            UltrasoundIdMf => "STD-US-ID-MF-xxxx",
            UltrasoundScMf => "STD-US-SC-MF-xxxx",
            UltrasoundCcMf => "STD-US-CC-MF-xxxx",
            TwelveLeadEcg => "STD-WVFM-ECG-FD",
            HemodynamicWaveform => "STD-WVFM-HD-FD",
        }
    }

    /// Profiles that take the large general purpose allow-list.
    pub fn is_general_purpose(&self) -> bool {
        use ApplicationProfile::*;
        matches!(
            self,
            GeneralPurpose
                | GeneralDvdJpeg
                | GeneralDvdJ2k
                | GeneralBdJpeg
                | GeneralBdJ2k
                | GeneralBdMpeg2Mpml
                | GeneralBdMpeg2Mphl
                | GeneralBdMpeg4Hp
                | GeneralBdMpeg4Hpbd
                | UsbAndFlashJpeg
                | UsbAndFlashJ2k
                | GeneralMime
        )
    }

    /// DVD, BD and USB variants, which carry extra image keys in their records.
    pub fn is_general_extended(&self) -> bool {
        self.is_general_purpose()
            && !matches!(
                self,
                ApplicationProfile::GeneralPurpose | ApplicationProfile::GeneralMime
            )
    }

    pub fn is_ultrasound(&self) -> bool {
        use ApplicationProfile::*;
        matches!(
            self,
            UltrasoundIdSf | UltrasoundScSf | UltrasoundCcSf | UltrasoundIdMf | UltrasoundScMf | UltrasoundCcMf
        )
    }

    pub fn is_angiographic(&self) -> bool {
        use ApplicationProfile::*;
        matches!(self, BasicCardiac | XrayAngiographic | XrayAngiographicDvd)
    }

    /// Motion video syntax for the video profiles.
    fn video_syntaxes(&self) -> Option<&'static [&'static str]> {
        use ApplicationProfile::*;
        match self {
            Mpeg2MpmlDvd | GeneralBdMpeg2Mpml => Some(MPEG2_MPML),
            GeneralBdMpeg2Mphl => Some(MPEG2_MPHL),
            GeneralBdMpeg4Hp => Some(MPEG4_HP),
            GeneralBdMpeg4Hpbd => Some(MPEG4_HPBD),
            _ => None,
        }
    }

    pub fn accepts_sop_class(&self, sop_class: &str, accept_retired: bool) -> bool {
        use ApplicationProfile::*;
        match self {
            Mpeg2MpmlDvd => is_multiframe_sop_class(sop_class),
            BasicCardiac => {
                sop_class == XRAY_ANGIOGRAPHIC_IMAGE
                    || (accept_retired && sop_class == DETACHED_PATIENT_MANAGEMENT)
            }
            XrayAngiographic | XrayAngiographicDvd => matches!(
                sop_class,
                XRAY_ANGIOGRAPHIC_IMAGE | SECONDARY_CAPTURE_IMAGE | GRAYSCALE_SOFTCOPY_PRESENTATION_STATE
            ),
            DentalRadiograph => matches!(
                sop_class,
                DIGITAL_INTRAORAL_XRAY_PRESENTATION | DIGITAL_XRAY_PRESENTATION
            ),
            CtAndMr => matches!(
                sop_class,
                CT_IMAGE
                    | MR_IMAGE
                    | SECONDARY_CAPTURE_IMAGE
                    | MULTIFRAME_SINGLE_BIT_SECONDARY_CAPTURE
                    | MULTIFRAME_GRAYSCALE_BYTE_SECONDARY_CAPTURE
                    | MULTIFRAME_GRAYSCALE_WORD_SECONDARY_CAPTURE
                    | MULTIFRAME_TRUE_COLOR_SECONDARY_CAPTURE
            ),
            UltrasoundIdSf | UltrasoundScSf | UltrasoundCcSf => {
                sop_class == ULTRASOUND_IMAGE
                    || (accept_retired && sop_class == ULTRASOUND_IMAGE_RETIRED)
            }
            UltrasoundIdMf | UltrasoundScMf | UltrasoundCcMf => {
                matches!(sop_class, ULTRASOUND_IMAGE | ULTRASOUND_MULTIFRAME_IMAGE)
                    || (accept_retired
                        && matches!(
                            sop_class,
                            ULTRASOUND_IMAGE_RETIRED | ULTRASOUND_MULTIFRAME_IMAGE_RETIRED
                        ))
            }
            TwelveLeadEcg => sop_class == TWELVE_LEAD_ECG_WAVEFORM,
            HemodynamicWaveform => sop_class == HEMODYNAMIC_WAVEFORM,
            _ => {
                IMAGE_SOP_CLASSES.contains(&sop_class)
                    || OTHER_GENERAL_SOP_CLASSES.contains(&sop_class)
                    || (accept_retired && is_retired_sop_class(sop_class))
            }
        }
    }

    /// Transfer syntaxes this profile accepts for objects of `sop_class`.
    pub fn transfer_syntax_rule(&self, sop_class: &str) -> TransferSyntaxRule {
        use ApplicationProfile::*;
        let rule = match self {
            GeneralMime => return TransferSyntaxRule::Any,
            GeneralDvdJpeg | GeneralBdJpeg | UsbAndFlashJpeg => JPEG_FAMILY,
            GeneralDvdJ2k | GeneralBdJ2k | UsbAndFlashJ2k => J2K_FAMILY,
            Mpeg2MpmlDvd => MPEG2_MPML,
            GeneralBdMpeg2Mpml | GeneralBdMpeg2Mphl | GeneralBdMpeg4Hp | GeneralBdMpeg4Hpbd => {
                match self.video_syntaxes() {
                    Some(video) if is_multiframe_sop_class(sop_class) => video,
                    _ => EXPLICIT_ONLY,
                }
            }
            BasicCardiac | XrayAngiographic if sop_class == XRAY_ANGIOGRAPHIC_IMAGE => {
                JPEG_LOSSLESS_ONLY
            }
            XrayAngiographicDvd if sop_class == XRAY_ANGIOGRAPHIC_IMAGE => XA_DVD_SYNTAXES,
            CtAndMr => CT_MR_SYNTAXES,
            UltrasoundIdSf | UltrasoundScSf | UltrasoundCcSf | UltrasoundIdMf | UltrasoundScMf
            | UltrasoundCcMf => ULTRASOUND_SYNTAXES,
            _ => EXPLICIT_ONLY,
        };
        TransferSyntaxRule::OneOf(rule)
    }

    /// Whether `ts` is a motion video encoding, which only multi-frame IODs may use.
    pub fn is_video_syntax(ts: &str) -> bool {
        matches!(
            ts,
            MPEG2_MAIN_PROFILE_MAIN_LEVEL
                | MPEG2_MAIN_PROFILE_HIGH_LEVEL
                | MPEG4_HIGH_PROFILE_LEVEL_4_1
                | MPEG4_BD_HIGH_PROFILE_LEVEL_4_1
        )
    }

    pub fn icon_policy(&self) -> IconPolicy {
        use ApplicationProfile::*;
        match self {
            BasicCardiac | XrayAngiographic | XrayAngiographicDvd => IconPolicy::Required { size: 128 },
            CtAndMr => IconPolicy::Always { size: 64 },
            _ => IconPolicy::OnRequest,
        }
    }

    /// Profiles that need a JPEG decoder to be usable at all.
    pub fn needs_jpeg_support(&self) -> bool {
        self.is_angiographic()
    }
}

impl fmt::Display for ApplicationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_name())
    }
}
