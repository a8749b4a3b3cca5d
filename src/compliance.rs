//
// compliance.rs
// DicomDir-Tools-rs
//
// Checks whether an instance file may be referenced under the active application profile.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use dicom::core::Tag;
use dicom::encoding::TransferSyntaxIndex;
use dicom::object::InMemDicomObject;
use dicom::transfer_syntax::TransferSyntaxRegistry;
use tracing::{error, warn};

use crate::classify::record_type_for;
use crate::dicom_access::{
    check_exists, check_exists_with_integer_value, check_exists_with_min_max_value,
    check_exists_with_string_value, check_exists_with_value, unexpected_value_message,
    ElementAccess,
};
use crate::error::{DirError, Result};
use crate::options::DirOptions;
use crate::profile::ApplicationProfile;
use crate::record::RecordType;
use crate::source::SourceFile;
use crate::tags::{self, *};
use crate::uids;

/// Whether the linked codecs can decode pixel data encoded with `ts`.
pub fn can_decode(ts: &str) -> bool {
    TransferSyntaxRegistry
        .get(ts)
        .map(|entry| entry.can_decode_all())
        .unwrap_or(false)
}

/// Answers whether pixel data in a transfer syntax can be decoded.
pub type DecodeSupport = fn(&str) -> bool;

/// Profiles whose images are JPEG compressed are refused when no JPEG decoder is linked.
pub fn check_profile_support(profile: ApplicationProfile, decodable: DecodeSupport) -> Result<()> {
    if profile.needs_jpeg_support() && !decodable(uids::JPEG_LOSSLESS_SV1) {
        return Err(DirError::IllegalCall(format!(
            "JPEG support required for {profile} profile"
        )));
    }
    Ok(())
}

/// Outcome of the attribute rules: missing values and rule violations are told apart.
#[derive(Debug, Default, Clone, Copy)]
struct Verdict {
    missing: bool,
    violated: bool,
}

impl Verdict {
    fn require(&mut self, ok: bool) {
        self.missing |= !ok;
    }

    fn conform(&mut self, ok: bool) {
        self.violated |= !ok;
    }

    fn merge(&mut self, other: Verdict) {
        self.missing |= other.missing;
        self.violated |= other.violated;
    }

    fn into_result(self, file: &Path) -> Result<()> {
        if self.violated {
            Err(DirError::ApplicationProfileViolated(format!(
                "file does not conform to the application profile: {}",
                file.display()
            )))
        } else if self.missing {
            Err(DirError::MissingAttribute {
                file: file.to_path_buf(),
            })
        } else {
            Ok(())
        }
    }
}

pub struct ComplianceChecker<'a> {
    options: &'a DirOptions,
    decodable: DecodeSupport,
}

impl<'a> ComplianceChecker<'a> {
    pub fn new(options: &'a DirOptions) -> Self {
        ComplianceChecker {
            options,
            decodable: can_decode,
        }
    }

    pub fn with_decoder(options: &'a DirOptions, decodable: DecodeSupport) -> Self {
        ComplianceChecker { options, decodable }
    }

    fn profile(&self) -> ApplicationProfile {
        self.options.profile
    }

    /// Full check: SOP class, transfer syntax, then the mandatory attributes.
    pub fn check(&self, file: &SourceFile) -> Result<()> {
        self.check_sop_class_and_transfer_syntax(file)?;
        self.check_mandatory_attributes(file)
    }

    pub fn check_sop_class_and_transfer_syntax(&self, file: &SourceFile) -> Result<()> {
        let path = file.path.as_path();
        let sop_class = file.sop_class();
        if sop_class.is_empty() {
            error!(file = %path.display(), "MediaStorageSOPClassUID missing in meta-information header");
            return Err(DirError::TagNotFound {
                tag: "MediaStorageSOPClassUID".into(),
                file: path.to_path_buf(),
            });
        }
        let profile = self.profile();
        if !profile.accepts_sop_class(&sop_class, self.options.accept_retired) {
            let message = format!(
                "invalid SOP class ({}) for {} profile: {}",
                uids::display_uid(&sop_class),
                profile,
                path.display()
            );
            error!(file = %path.display(), "{message}");
            return Err(DirError::ApplicationProfileViolated(message));
        }

        let ts = file.transfer_syntax();
        if ts.is_empty() {
            error!(file = %path.display(), "TransferSyntaxUID missing in meta-information header");
            return Err(DirError::TagNotFound {
                tag: "TransferSyntaxUID".into(),
                file: path.to_path_buf(),
            });
        }
        self.check_codec(&ts, path)?;

        let rule = profile.transfer_syntax_rule(&sop_class);
        let mut problems = Vec::new();
        if !rule.accepts(&ts) {
            problems.push(format!("{} expected: {}", rule.expectation(), path.display()));
        }
        if ApplicationProfile::is_video_syntax(&ts) && !crate::profile::is_multiframe_sop_class(&sop_class) {
            problems.push(format!(
                "{} only allowed for multi-frame objects: {}",
                uids::display_uid(&ts),
                path.display()
            ));
        }
        for message in problems {
            if self.options.transfer_syntax_check {
                error!(file = %path.display(), "{message}");
                return Err(DirError::ApplicationProfileViolated(message));
            }
            warn!(file = %path.display(), "{message}");
        }
        Ok(())
    }

    /// JPEG and RLE encoded files are rejected when the matching decoder is missing.
    fn check_codec(&self, ts: &str, path: &Path) -> Result<()> {
        let compressed = matches!(
            ts,
            uids::JPEG_LOSSLESS_SV1 | uids::JPEG_BASELINE | uids::RLE_LOSSLESS
        );
        if compressed && !(self.decodable)(ts) {
            let message = format!(
                "{} not supported: {}",
                uids::display_uid(ts),
                path.display()
            );
            error!(file = %path.display(), "{message}");
            return Err(DirError::CannotChangeRepresentation(message));
        }
        Ok(())
    }

    pub fn check_mandatory_attributes(&self, file: &SourceFile) -> Result<()> {
        let path = file.path.as_path();
        let sop_class = file.sop_class();
        let ts = file.transfer_syntax();
        let kind = record_type_for(&sop_class);
        // root level objects carry no patient/study/series identification
        if kind.is_root_level() {
            return self
                .root_level_verdict(file.dataset(), kind, path)
                .into_result(path);
        }
        let dataset = file.dataset();
        let inventing = self.options.invent;
        let mut verdict = Verdict::default();

        // type 1 in the directory but type 2 in the instance: inventable
        if !self.options.inventing() {
            verdict.require(check_exists_with_value(dataset, PATIENT_ID, Some(path)));
        }
        verdict.require(check_exists(dataset, PATIENT_NAME, Some(path)));
        if sop_class == uids::DETACHED_PATIENT_MANAGEMENT {
            return verdict.into_result(path);
        }
        if !inventing {
            verdict.require(check_exists_with_value(dataset, STUDY_DATE, Some(path)));
            verdict.require(check_exists_with_value(dataset, STUDY_TIME, Some(path)));
            verdict.require(check_exists_with_value(dataset, STUDY_ID, Some(path)));
            verdict.require(check_exists_with_value(dataset, SERIES_NUMBER, Some(path)));
        }
        verdict.require(check_exists_with_value(dataset, STUDY_INSTANCE_UID, Some(path)));
        verdict.require(check_exists_with_value(dataset, MODALITY, Some(path)));
        verdict.require(check_exists_with_value(dataset, SERIES_INSTANCE_UID, Some(path)));

        for tag in instance_requirements(kind, inventing) {
            verdict.require(check_exists_with_value(dataset, *tag, Some(path)));
        }
        match kind {
            RecordType::SrDocument => verdict.merge(verification_verdict(dataset, path)),
            RecordType::Image => {
                if !inventing {
                    verdict.require(check_exists_with_value(dataset, INSTANCE_NUMBER, Some(path)));
                }
                verdict.merge(self.image_verdict(dataset, &sop_class, &ts, path));
            }
            _ => {}
        }
        verdict.into_result(path)
    }

    fn root_level_verdict(&self, dataset: &InMemDicomObject, kind: RecordType, path: &Path) -> Verdict {
        let mut verdict = Verdict::default();
        let required: &[Tag] = match kind {
            RecordType::Palette => &[CONTENT_LABEL],
            RecordType::Implant => &[MANUFACTURER, IMPLANT_NAME, IMPLANT_PART_NUMBER],
            RecordType::ImplantGroup => &[IMPLANT_TEMPLATE_GROUP_NAME, IMPLANT_TEMPLATE_GROUP_ISSUER],
            RecordType::ImplantAssembly => &[IMPLANT_ASSEMBLY_TEMPLATE_NAME, MANUFACTURER],
            // type 1 and 2 keys of hanging protocols match the instance requirements
            _ => &[],
        };
        for tag in required {
            verdict.require(check_exists_with_value(dataset, *tag, Some(path)));
        }
        verdict
    }

    fn image_verdict(&self, dataset: &InMemDicomObject, sop_class: &str, ts: &str, path: &Path) -> Verdict {
        use ApplicationProfile::*;
        let profile = self.profile();
        match profile {
            BasicCardiac => self.basic_cardiac(dataset, path),
            XrayAngiographic | XrayAngiographicDvd => self.xray_angiographic(dataset, sop_class, path),
            DentalRadiograph => self.dental_radiograph(dataset, path),
            CtAndMr => self.ct_and_mr(dataset, sop_class, path),
            p if p.is_ultrasound() => self.ultrasound(dataset, ts, path),
            p if p.is_general_extended() || p == Mpeg2MpmlDvd => {
                let mut verdict = Verdict::default();
                verdict.require(check_exists_with_value(dataset, ROWS, Some(path)));
                verdict.require(check_exists_with_value(dataset, COLUMNS, Some(path)));
                verdict
            }
            _ => Verdict::default(),
        }
    }

    fn basic_cardiac(&self, dataset: &InMemDicomObject, path: &Path) -> Verdict {
        let resolution = self.options.resolution_check;
        let encoding = self.options.encoding_check;
        let mut verdict = Verdict::default();
        verdict.conform(check_exists_with_string_value(dataset, MODALITY, "XA", Some(path)));
        verdict.conform(check_exists_with_min_max_value(dataset, ROWS, 1, 512, Some(path), resolution));
        verdict.conform(check_exists_with_min_max_value(dataset, COLUMNS, 1, 512, Some(path), resolution));
        verdict.conform(check_exists_with_integer_value(dataset, BITS_ALLOCATED, 8, Some(path), encoding));
        verdict.conform(check_exists_with_integer_value(dataset, BITS_STORED, 8, Some(path), encoding));
        if is_biplane(dataset) {
            error!(
                file = %path.display(),
                "BIPLANE images not allowed for {} profile: {}",
                self.profile(),
                path.display()
            );
            verdict.conform(false);
        }
        for group in embedded_overlay_groups(dataset) {
            error!(
                file = %path.display(),
                "embedded overlay data present in group 0x{group:04x}, file: {}",
                path.display()
            );
            verdict.conform(false);
        }
        verdict
    }

    fn xray_angiographic(&self, dataset: &InMemDicomObject, sop_class: &str, path: &Path) -> Verdict {
        let resolution = self.options.resolution_check;
        let encoding = self.options.encoding_check;
        let mut verdict = Verdict::default();
        match sop_class {
            uids::XRAY_ANGIOGRAPHIC_IMAGE => {
                verdict.conform(check_exists_with_string_value(dataset, MODALITY, "XA", Some(path)));
                verdict.conform(check_exists_with_min_max_value(dataset, ROWS, 1, 1024, Some(path), resolution));
                verdict.conform(check_exists_with_min_max_value(dataset, COLUMNS, 1, 1024, Some(path), resolution));
                if !check_exists_with_value(dataset, BITS_STORED, Some(path)) {
                    verdict.require(false);
                } else {
                    let bits = dataset.element_int(BITS_STORED).unwrap_or(0);
                    verdict.conform(self.encoding_value_ok(matches!(bits, 8 | 10 | 12), BITS_STORED, path));
                }
            }
            uids::SECONDARY_CAPTURE_IMAGE => {
                verdict.conform(check_exists_with_min_max_value(dataset, ROWS, 1, 1024, Some(path), resolution));
                verdict.conform(check_exists_with_min_max_value(dataset, COLUMNS, 1, 1024, Some(path), resolution));
                verdict.conform(check_exists_with_integer_value(dataset, SAMPLES_PER_PIXEL, 1, Some(path), true));
                verdict.conform(check_exists_with_string_value(
                    dataset,
                    PHOTOMETRIC_INTERPRETATION,
                    "MONOCHROME2",
                    Some(path),
                ));
                verdict.conform(check_exists_with_integer_value(dataset, BITS_ALLOCATED, 8, Some(path), encoding));
                verdict.conform(check_exists_with_integer_value(dataset, BITS_STORED, 8, Some(path), encoding));
                verdict.conform(check_exists_with_integer_value(dataset, HIGH_BIT, 7, Some(path), encoding));
                verdict.conform(check_exists_with_integer_value(dataset, PIXEL_REPRESENTATION, 0, Some(path), true));
                for group in overlay_planes(dataset) {
                    error!(
                        file = %path.display(),
                        "overlay group 0x{group:04x} present in file: {}",
                        path.display()
                    );
                    verdict.conform(false);
                }
            }
            _ => verdict.conform(false),
        }
        verdict
    }

    fn dental_radiograph(&self, dataset: &InMemDicomObject, path: &Path) -> Verdict {
        let mut verdict = Verdict::default();
        let type2 = [
            INSTITUTION_NAME,
            MANUFACTURER_MODEL_NAME,
            DETECTOR_ID,
            DETECTOR_MANUFACTURER_NAME,
            DETECTOR_MANUFACTURER_MODEL_NAME,
        ];
        if !type2.iter().all(|tag| check_exists(dataset, *tag, Some(path))) {
            verdict.require(false);
            return verdict;
        }
        if !check_exists_with_value(dataset, BITS_ALLOCATED, Some(path))
            || !check_exists_with_value(dataset, BITS_STORED, Some(path))
        {
            verdict.require(false);
            return verdict;
        }
        let stored = dataset.element_int(BITS_STORED).unwrap_or(0);
        let allocated = dataset.element_int(BITS_ALLOCATED).unwrap_or(0);
        verdict.conform(self.encoding_value_ok(matches!(stored, 8 | 10 | 12 | 16), BITS_STORED, path));
        let allocated_ok = if stored == 8 { allocated == 8 } else { allocated == 16 };
        verdict.conform(self.encoding_value_ok(allocated_ok, BITS_ALLOCATED, path));
        verdict
    }

    fn ct_and_mr(&self, dataset: &InMemDicomObject, sop_class: &str, path: &Path) -> Verdict {
        let encoding = self.options.encoding_check;
        let mut verdict = Verdict::default();
        verdict.require(check_exists_with_value(dataset, ROWS, Some(path)));
        verdict.require(check_exists_with_value(dataset, COLUMNS, Some(path)));
        match sop_class {
            uids::CT_IMAGE => {
                verdict.conform(check_exists_with_string_value(dataset, MODALITY, "CT", Some(path)));
                verdict.conform(check_exists_with_string_value(
                    dataset,
                    PHOTOMETRIC_INTERPRETATION,
                    "MONOCHROME2",
                    Some(path),
                ));
            }
            uids::MR_IMAGE => {
                verdict.conform(check_exists_with_string_value(dataset, MODALITY, "MR", Some(path)));
                verdict.conform(check_exists_with_string_value(
                    dataset,
                    PHOTOMETRIC_INTERPRETATION,
                    "MONOCHROME2",
                    Some(path),
                ));
                if !check_exists_with_value(dataset, BITS_STORED, Some(path))
                    || !check_exists_with_value(dataset, HIGH_BIT, Some(path))
                {
                    verdict.require(false);
                } else {
                    let stored = dataset.element_int(BITS_STORED).unwrap_or(0);
                    let high = dataset.element_int(HIGH_BIT).unwrap_or(0);
                    verdict.conform(self.encoding_value_ok(matches!(stored, 8 | 12 | 16), BITS_STORED, path));
                    verdict.conform(self.encoding_value_ok(high == stored - 1, HIGH_BIT, path));
                }
            }
            uids::SECONDARY_CAPTURE_IMAGE
            | uids::MULTIFRAME_SINGLE_BIT_SECONDARY_CAPTURE
            | uids::MULTIFRAME_GRAYSCALE_BYTE_SECONDARY_CAPTURE
            | uids::MULTIFRAME_GRAYSCALE_WORD_SECONDARY_CAPTURE
            | uids::MULTIFRAME_TRUE_COLOR_SECONDARY_CAPTURE => {
                verdict.conform(check_exists_with_integer_value(dataset, SAMPLES_PER_PIXEL, 1, Some(path), true));
                if !check_exists_with_value(dataset, PHOTOMETRIC_INTERPRETATION, Some(path)) {
                    verdict.require(false);
                    return verdict;
                }
                let photometric = dataset.element_str(PHOTOMETRIC_INTERPRETATION).unwrap_or_default();
                match photometric.as_str() {
                    "MONOCHROME2" => {
                        let present = [BITS_ALLOCATED, BITS_STORED, HIGH_BIT]
                            .iter()
                            .all(|tag| check_exists_with_value(dataset, *tag, Some(path)));
                        if !present {
                            verdict.require(false);
                        } else {
                            let allocated = dataset.element_int(BITS_ALLOCATED).unwrap_or(0);
                            let stored = dataset.element_int(BITS_STORED).unwrap_or(0);
                            let high = dataset.element_int(HIGH_BIT).unwrap_or(0);
                            verdict.conform(self.encoding_value_ok(
                                matches!(allocated, 8 | 16),
                                BITS_ALLOCATED,
                                path,
                            ));
                            verdict.conform(self.encoding_value_ok(stored == allocated, BITS_STORED, path));
                            verdict.conform(self.encoding_value_ok(high == stored - 1, HIGH_BIT, path));
                        }
                    }
                    "PALETTE COLOR" => {
                        verdict.conform(check_exists_with_integer_value(dataset, BITS_ALLOCATED, 8, Some(path), encoding));
                        verdict.conform(check_exists_with_integer_value(dataset, BITS_STORED, 8, Some(path), encoding));
                        verdict.conform(check_exists_with_integer_value(dataset, HIGH_BIT, 7, Some(path), encoding));
                    }
                    _ => {
                        unexpected_value_message(PHOTOMETRIC_INTERPRETATION, path, true);
                        verdict.conform(false);
                    }
                }
            }
            _ => verdict.conform(false),
        }
        verdict
    }

    fn ultrasound(&self, dataset: &InMemDicomObject, ts: &str, path: &Path) -> Verdict {
        let profile = self.profile();
        let mut verdict = Verdict::default();
        if !check_exists_with_value(dataset, PHOTOMETRIC_INTERPRETATION, Some(path)) {
            verdict.require(false);
        } else {
            let photometric = dataset.element_str(PHOTOMETRIC_INTERPRETATION).unwrap_or_default();
            let uncompressed = ts == uids::EXPLICIT_VR_LITTLE_ENDIAN;
            let rle = ts == uids::RLE_LOSSLESS;
            let jpeg = ts == uids::JPEG_BASELINE;
            let valid = match photometric.as_str() {
                "MONOCHROME2" | "RGB" | "PALETTE COLOR" => uncompressed || rle,
                "YBR_FULL" => rle,
                "YBR_FULL_422" | "YBR_PARTIAL_422" => uncompressed || jpeg,
                _ => false,
            };
            if !valid {
                unexpected_value_message(PHOTOMETRIC_INTERPRETATION, path, true);
                verdict.conform(false);
            }
        }
        let calibrated = matches!(
            profile,
            ApplicationProfile::UltrasoundScSf
                | ApplicationProfile::UltrasoundCcSf
                | ApplicationProfile::UltrasoundScMf
                | ApplicationProfile::UltrasoundCcMf
        );
        if calibrated {
            let color = matches!(
                profile,
                ApplicationProfile::UltrasoundCcSf | ApplicationProfile::UltrasoundCcMf
            );
            match dataset.sequence_items(SEQUENCE_OF_ULTRASOUND_REGIONS) {
                Some(items) if !items.is_empty() => {
                    let ok = items.iter().all(|item| region_ok(item, color, path));
                    verdict.conform(ok);
                }
                _ => {
                    error!(
                        file = %path.display(),
                        "required attribute {} missing or empty in file: {}",
                        tags::describe(SEQUENCE_OF_ULTRASOUND_REGIONS),
                        path.display()
                    );
                    verdict.conform(false);
                }
            }
        }
        verdict
    }

    /// Reports a bad encoding value; only fails when the encoding check is on.
    fn encoding_value_ok(&self, ok: bool, tag: Tag, path: &Path) -> bool {
        if ok {
            return true;
        }
        unexpected_value_message(tag, path, self.options.encoding_check);
        !self.options.encoding_check
    }
}

/// Attributes an instance of `kind` needs beyond the patient/study/series keys.
fn instance_requirements(kind: RecordType, inventing: bool) -> &'static [Tag] {
    use RecordType::*;
    match kind {
        Overlay if !inventing => &[OVERLAY_NUMBER],
        ModalityLut | VoiLut if !inventing => &[LOOKUP_TABLE_NUMBER],
        Curve if !inventing => &[CURVE_NUMBER],
        SrDocument => &[
            INSTANCE_NUMBER,
            COMPLETION_FLAG,
            VERIFICATION_FLAG,
            CONTENT_DATE,
            CONTENT_TIME,
            CONCEPT_NAME_CODE_SEQUENCE,
        ],
        Presentation => &[
            INSTANCE_NUMBER,
            CONTENT_LABEL,
            PRESENTATION_CREATION_DATE,
            PRESENTATION_CREATION_TIME,
            REFERENCED_SERIES_SEQUENCE,
        ],
        Waveform | Measurement | SurfaceScan | Assessment => {
            &[INSTANCE_NUMBER, CONTENT_DATE, CONTENT_TIME]
        }
        RtDose if inventing => &[DOSE_SUMMATION_TYPE],
        RtDose => &[INSTANCE_NUMBER, DOSE_SUMMATION_TYPE],
        RtStructureSet if inventing => &[STRUCTURE_SET_LABEL],
        RtStructureSet => &[INSTANCE_NUMBER, STRUCTURE_SET_LABEL],
        RtPlan if inventing => &[RT_PLAN_LABEL],
        RtPlan => &[INSTANCE_NUMBER, RT_PLAN_LABEL],
        RtTreatmentRecord | Plan | Radiotherapy => &[INSTANCE_NUMBER],
        KeyObjectDoc => &[INSTANCE_NUMBER, CONTENT_DATE, CONTENT_TIME, CONCEPT_NAME_CODE_SEQUENCE],
        Registration | Fiducial | ValueMap | Surface | Tract => {
            &[INSTANCE_NUMBER, CONTENT_DATE, CONTENT_TIME, CONTENT_LABEL]
        }
        RawData => &[CONTENT_DATE, CONTENT_TIME],
        Spectroscopy => &[
            INSTANCE_NUMBER,
            IMAGE_TYPE,
            CONTENT_DATE,
            CONTENT_TIME,
            NUMBER_OF_FRAMES,
            ROWS,
            COLUMNS,
            DATA_POINT_ROWS,
            DATA_POINT_COLUMNS,
        ],
        EncapsulatedDoc => &[INSTANCE_NUMBER, MIME_TYPE_OF_ENCAPSULATED_DOCUMENT],
        _ => &[],
    }
}

/// VerificationDateTime of the most recent observer is needed once a report is VERIFIED.
fn verification_verdict(dataset: &InMemDicomObject, path: &Path) -> Verdict {
    let mut verdict = Verdict::default();
    if dataset.element_str(VERIFICATION_FLAG).as_deref() != Some("VERIFIED") {
        return verdict;
    }
    match dataset
        .sequence_items(VERIFYING_OBSERVER_SEQUENCE)
        .and_then(|items| items.last())
    {
        Some(last) => verdict.require(check_exists_with_value(last, VERIFICATION_DATE_TIME, Some(path))),
        None => verdict.require(check_exists_with_value(dataset, VERIFYING_OBSERVER_SEQUENCE, Some(path))),
    }
    verdict
}

fn is_biplane(dataset: &InMemDicomObject) -> bool {
    dataset
        .element(IMAGE_TYPE)
        .ok()
        .and_then(|e| e.to_multi_str().ok())
        .map(|values| {
            let joined = values.join("\\");
            joined.contains("BIPLANE A") || joined.contains("BIPLANE B")
        })
        .unwrap_or(false)
}

/// Overlay groups with enough attributes to be displayed.
fn overlay_planes(dataset: &InMemDicomObject) -> Vec<u16> {
    tags::OVERLAY_GROUPS
        .step_by(2)
        .filter(|group| {
            [
                OVERLAY_ROWS_ELEMENT,
                OVERLAY_COLUMNS_ELEMENT,
                OVERLAY_BITS_ALLOCATED_ELEMENT,
                OVERLAY_BIT_POSITION_ELEMENT,
            ]
            .iter()
            .all(|element| dataset.has_value(Tag(*group, *element)))
        })
        .collect()
}

/// Overlay planes whose bits live in the pixel data instead of OverlayData.
fn embedded_overlay_groups(dataset: &InMemDicomObject) -> Vec<u16> {
    overlay_planes(dataset)
        .into_iter()
        .filter(|group| !dataset.has_value(Tag(*group, OVERLAY_DATA_ELEMENT)))
        .collect()
}

/// One item of the ultrasound region calibration module.
fn region_ok(item: &InMemDicomObject, color: bool, path: &Path) -> bool {
    let base = [
        REGION_LOCATION_MIN_X0,
        REGION_LOCATION_MIN_Y0,
        REGION_LOCATION_MAX_X1,
        REGION_LOCATION_MAX_Y1,
        PHYSICAL_UNITS_X_DIRECTION,
        PHYSICAL_UNITS_Y_DIRECTION,
        PHYSICAL_DELTA_X,
        PHYSICAL_DELTA_Y,
        REGION_SPATIAL_FORMAT,
        REGION_DATA_TYPE,
        REGION_FLAGS,
    ];
    // evaluate every tag so each missing one gets reported
    let mut ok = base
        .iter()
        .fold(true, |acc, tag| check_exists_with_value(item, *tag, Some(path)) && acc);
    if !color {
        return ok;
    }
    if !check_exists_with_value(item, PIXEL_COMPONENT_ORGANIZATION, Some(path)) {
        return false;
    }
    ok &= check_exists_with_value(item, PIXEL_COMPONENT_PHYSICAL_UNITS, Some(path));
    ok &= check_exists_with_value(item, PIXEL_COMPONENT_DATA_TYPE, Some(path));
    let organization_tags: &[Tag] = match item.element_int(PIXEL_COMPONENT_ORGANIZATION) {
        // bit aligned positions
        Some(0) => &[
            PIXEL_COMPONENT_MASK,
            NUMBER_OF_TABLE_BREAK_POINTS,
            TABLE_OF_X_BREAK_POINTS,
            TABLE_OF_Y_BREAK_POINTS,
        ],
        // ranges
        Some(1) => &[
            PIXEL_COMPONENT_RANGE_START,
            PIXEL_COMPONENT_RANGE_STOP,
            NUMBER_OF_TABLE_BREAK_POINTS,
            TABLE_OF_X_BREAK_POINTS,
            TABLE_OF_Y_BREAK_POINTS,
        ],
        // table look up
        Some(2) => &[
            NUMBER_OF_TABLE_ENTRIES,
            TABLE_OF_PIXEL_VALUES,
            TABLE_OF_PARAMETER_VALUES,
        ],
        _ => {
            unexpected_value_message(PIXEL_COMPONENT_ORGANIZATION, path, true);
            return false;
        }
    };
    organization_tags
        .iter()
        .fold(ok, |acc, tag| check_exists_with_value(item, *tag, Some(path)) && acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use dicom::core::{DataElement, PrimitiveValue, VR};
    use dicom::object::{FileDicomObject, FileMetaTableBuilder, StandardDataDictionary};
    use std::path::PathBuf;

    fn put_str(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
        obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
    }

    fn put_u16(obj: &mut InMemDicomObject, tag: Tag, value: u16) {
        obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
    }

    fn source(sop_class: &str, ts: &str, fill: impl FnOnce(&mut InMemDicomObject)) -> SourceFile {
        let meta = FileMetaTableBuilder::new()
            .transfer_syntax(ts)
            .media_storage_sop_class_uid(sop_class)
            .media_storage_sop_instance_uid("1.2.3.4.5")
            .build()
            .expect("meta");
        let mut object = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
        let mut dataset = InMemDicomObject::new_empty();
        put_str(&mut dataset, PATIENT_ID, VR::LO, "PID1");
        put_str(&mut dataset, PATIENT_NAME, VR::PN, "Doe^John");
        put_str(&mut dataset, STUDY_DATE, VR::DA, "20240101");
        put_str(&mut dataset, STUDY_TIME, VR::TM, "120000");
        put_str(&mut dataset, STUDY_ID, VR::SH, "S1");
        put_str(&mut dataset, STUDY_INSTANCE_UID, VR::UI, "1.2.3");
        put_str(&mut dataset, SERIES_INSTANCE_UID, VR::UI, "1.2.3.4");
        put_str(&mut dataset, SERIES_NUMBER, VR::IS, "1");
        put_str(&mut dataset, INSTANCE_NUMBER, VR::IS, "1");
        fill(&mut dataset);
        for elem in dataset {
            object.put(elem);
        }
        SourceFile::from_object("IMG1", PathBuf::from("IMG1"), object)
    }

    #[test]
    fn foreign_sop_class_violates_the_profile() {
        let options = DirOptions::with_profile(ApplicationProfile::CtAndMr);
        let file = source(uids::ULTRASOUND_IMAGE, uids::EXPLICIT_VR_LITTLE_ENDIAN, |d| {
            put_str(d, MODALITY, VR::CS, "US")
        });
        let err = ComplianceChecker::new(&options).check(&file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApplicationProfileViolated);
    }

    #[test]
    fn transfer_syntax_mismatch_is_demoted_when_unchecked() {
        let mut options = DirOptions::default();
        let file = source(uids::CT_IMAGE, uids::IMPLICIT_VR_LITTLE_ENDIAN, |d| {
            put_str(d, MODALITY, VR::CS, "CT")
        });
        let strict = ComplianceChecker::new(&options).check(&file);
        assert_eq!(strict.unwrap_err().kind(), ErrorKind::ApplicationProfileViolated);
        options.transfer_syntax_check = false;
        assert!(ComplianceChecker::new(&options).check(&file).is_ok());
    }

    #[test]
    fn missing_type1_values_are_reported_as_missing() {
        let options = DirOptions::default();
        let file = source(uids::CT_IMAGE, uids::EXPLICIT_VR_LITTLE_ENDIAN, |d| {
            put_str(d, MODALITY, VR::CS, "CT");
            d.remove_element(SERIES_NUMBER);
        });
        let err = ComplianceChecker::new(&options).check(&file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingAttribute);

        let inventing = DirOptions {
            invent: true,
            ..DirOptions::default()
        };
        assert!(ComplianceChecker::new(&inventing).check(&file).is_ok());
    }

    #[test]
    fn ct_profile_checks_mr_bit_depth() {
        let mut options = DirOptions::with_profile(ApplicationProfile::CtAndMr);
        let file = source(uids::MR_IMAGE, uids::EXPLICIT_VR_LITTLE_ENDIAN, |d| {
            put_str(d, MODALITY, VR::CS, "MR");
            put_str(d, PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
            put_u16(d, ROWS, 256);
            put_u16(d, COLUMNS, 256);
            put_u16(d, BITS_STORED, 10);
            put_u16(d, HIGH_BIT, 9);
        });
        let err = ComplianceChecker::new(&options).check(&file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApplicationProfileViolated);
        options.encoding_check = false;
        assert!(ComplianceChecker::new(&options).check(&file).is_ok());
    }

    #[test]
    fn ultrasound_calibration_needs_regions() {
        let options = DirOptions::with_profile(ApplicationProfile::UltrasoundScSf);
        let file = source(uids::ULTRASOUND_IMAGE, uids::EXPLICIT_VR_LITTLE_ENDIAN, |d| {
            put_str(d, MODALITY, VR::CS, "US");
            put_str(d, PHOTOMETRIC_INTERPRETATION, VR::CS, "RGB");
        });
        let err = ComplianceChecker::new(&options).check(&file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApplicationProfileViolated);

        let plain = DirOptions::with_profile(ApplicationProfile::UltrasoundIdSf);
        assert!(ComplianceChecker::new(&plain).check(&file).is_ok());
    }

    fn no_decoder(_: &str) -> bool {
        false
    }

    #[test]
    fn compressed_files_need_a_decoder() {
        let options = DirOptions::with_profile(ApplicationProfile::UltrasoundIdSf);
        let file = source(uids::ULTRASOUND_IMAGE, uids::RLE_LOSSLESS, |d| {
            put_str(d, MODALITY, VR::CS, "US");
            put_str(d, PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
        });
        let err = ComplianceChecker::with_decoder(&options, no_decoder)
            .check(&file)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CannotChangeRepresentation);
        assert!(ComplianceChecker::with_decoder(&options, |_| true).check(&file).is_ok());
    }

    #[test]
    fn angiographic_profiles_need_jpeg_support() {
        for profile in [
            ApplicationProfile::BasicCardiac,
            ApplicationProfile::XrayAngiographic,
            ApplicationProfile::XrayAngiographicDvd,
        ] {
            let err = check_profile_support(profile, no_decoder).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::IllegalCall);
            assert!(check_profile_support(profile, |_| true).is_ok());
        }
        assert!(check_profile_support(ApplicationProfile::GeneralPurpose, no_decoder).is_ok());
    }

    #[test]
    fn verified_reports_need_a_verification_time() {
        let options = DirOptions::default();
        let file = source(uids::BASIC_TEXT_SR, uids::EXPLICIT_VR_LITTLE_ENDIAN, |d| {
            put_str(d, MODALITY, VR::CS, "SR");
            put_str(d, COMPLETION_FLAG, VR::CS, "COMPLETE");
            put_str(d, VERIFICATION_FLAG, VR::CS, "VERIFIED");
            put_str(d, CONTENT_DATE, VR::DA, "20240101");
            put_str(d, CONTENT_TIME, VR::TM, "120000");
            let mut code = InMemDicomObject::new_empty();
            put_str(&mut code, Tag(0x0008, 0x0100), VR::SH, "11528-7");
            d.put(DataElement::new(
                CONCEPT_NAME_CODE_SEQUENCE,
                VR::SQ,
                dicom::core::value::DataSetSequence::from(vec![code]),
            ));
        });
        let err = ComplianceChecker::new(&options).check(&file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingAttribute);
    }
}
