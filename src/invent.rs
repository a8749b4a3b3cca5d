//
// invent.rs
// DicomDir-Tools-rs
//
// Synthesis of identifiers and numbers that files left empty.
//
// Thales Matheus Mendonça Santos - November 2025

use dicom::core::{DataElement, PrimitiveValue, Tag};
use tracing::warn;

use crate::dicom_access::ElementAccess;
use crate::record::{DirectoryRecord, RecordType};
use crate::tags::{self, *};

pub const AUTO_PATIENT_ID_PREFIX: &str = "DCMTKPAT";
pub const AUTO_STUDY_ID_PREFIX: &str = "DCMTKSTUDY";

/// Per-controller counters; never reset while the controller lives.
#[derive(Debug, Clone)]
pub struct Inventor {
    patient: u64,
    study: u64,
    series: u64,
    instance: u64,
    overlay: u64,
    lut: u64,
    curve: u64,
}

impl Default for Inventor {
    fn default() -> Self {
        Inventor {
            patient: 0,
            study: 0,
            series: 0,
            instance: 1,
            overlay: 1,
            lut: 1,
            curve: 1,
        }
    }
}

/// `prefix` (at most 10 characters) plus a six digit number, or the bare number.
pub fn default_value(number: u64, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => {
            let prefix: String = prefix.chars().take(10).collect();
            format!("{prefix}{number:06}")
        }
        None => number.to_string(),
    }
}

fn next(counter: &mut u64) -> u64 {
    let value = *counter;
    *counter += 1;
    value
}

fn set_default_value(record: &mut DirectoryRecord, tag: Tag, number: u64, prefix: Option<&str>) {
    let value = default_value(number, prefix);
    warn!(
        record = %record.record_type,
        "{} Record (origin: {}) inventing {}: {value}",
        record.record_type,
        record
            .origin_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        tags::tag_name(tag)
    );
    record
        .attributes
        .put(DataElement::new(tag, tags::vr_of(tag), PrimitiveValue::from(value)));
    if !record.invented.contains(&tag) {
        record.invented.push(tag);
    }
}

impl Inventor {
    pub fn new() -> Self {
        Inventor::default()
    }

    /// Walks the tree below `root`. With `patient_id_only` only patient IDs are invented.
    pub fn invent(&mut self, root: &mut DirectoryRecord, patient_id_only: bool) {
        for patient in root
            .children
            .iter_mut()
            .filter(|r| r.record_type == RecordType::Patient)
        {
            if !patient.attributes.has_value(PATIENT_ID) {
                let number = next(&mut self.patient);
                set_default_value(patient, PATIENT_ID, number, Some(AUTO_PATIENT_ID_PREFIX));
            }
            if !patient_id_only {
                self.invent_studies(patient);
            }
        }
    }

    fn invent_studies(&mut self, patient: &mut DirectoryRecord) {
        for study in patient.children.iter_mut() {
            if !study.attributes.has_value(STUDY_ID) {
                let number = next(&mut self.study);
                set_default_value(study, STUDY_ID, number, Some(AUTO_STUDY_ID_PREFIX));
            }
            self.invent_series(study);
        }
    }

    fn invent_series(&mut self, study: &mut DirectoryRecord) {
        for series in study.children.iter_mut() {
            if !series.attributes.has_value(SERIES_NUMBER) {
                let number = next(&mut self.series);
                set_default_value(series, SERIES_NUMBER, number, None);
            }
            self.invent_instances(series);
        }
    }

    fn invent_instances(&mut self, series: &mut DirectoryRecord) {
        for instance in series.children.iter_mut() {
            let (tag, counter) = match instance.record_type {
                RecordType::Image
                | RecordType::RtDose
                | RecordType::RtStructureSet
                | RecordType::RtPlan
                | RecordType::StoredPrint => (INSTANCE_NUMBER, &mut self.instance),
                RecordType::Overlay => (OVERLAY_NUMBER, &mut self.overlay),
                RecordType::ModalityLut | RecordType::VoiLut => (LOOKUP_TABLE_NUMBER, &mut self.lut),
                RecordType::Curve => (CURVE_NUMBER, &mut self.curve),
                _ => continue,
            };
            if !instance.attributes.has_value(tag) {
                let number = next(counter);
                set_default_value(instance, tag, number, None);
            }
        }
    }
}
