//
// dicomdir_workflows.rs
// DicomDir-Tools-rs
//
// End-to-end tests: building, writing, re-opening and extending DICOMDIRs from files created on the fly.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::HashSet;
use std::path::Path;

use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::dictionary_std::{tags, StandardDataDictionary};
use dicom::object::{FileDicomObject, FileMetaTableBuilder, InMemDicomObject};
use dicomdir_tools::dicom_access::ElementAccess;
use dicomdir_tools::dirfile::read_dicomdir;
use dicomdir_tools::record::{DirectoryRecord, RecordType};
use dicomdir_tools::{ApplicationProfile, DicomDir, DirOptions, DirState, ErrorKind, Insertion};
use tempfile::tempdir;

const CT_IMAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";
const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";
const STUDY_UID: &str = "1.2.826.0.1.3680043.2.1125.1";
const SERIES_UID: &str = "1.2.826.0.1.3680043.2.1125.1.1";

fn put(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

/// Writes a small CT instance below `dir`; `fill` adjusts the data set before writing.
fn write_image(dir: &Path, name: &str, sop_class: &str, fill: impl FnOnce(&mut InMemDicomObject)) {
    let sop_instance = format!("1.2.826.0.1.3680043.2.1125.9.{}", name_number(name));
    let meta = FileMetaTableBuilder::new()
        .transfer_syntax(EXPLICIT_VR_LE)
        .media_storage_sop_class_uid(sop_class)
        .media_storage_sop_instance_uid(sop_instance.as_str())
        .build()
        .expect("meta");
    let mut dataset = InMemDicomObject::new_empty();
    put(&mut dataset, tags::SOP_CLASS_UID, VR::UI, sop_class);
    put(&mut dataset, tags::SOP_INSTANCE_UID, VR::UI, &sop_instance);
    put(&mut dataset, tags::PATIENT_ID, VR::LO, "PAT001");
    put(&mut dataset, tags::PATIENT_NAME, VR::PN, "Test^Patient");
    put(&mut dataset, tags::STUDY_DATE, VR::DA, "20240101");
    put(&mut dataset, tags::STUDY_TIME, VR::TM, "120000");
    put(&mut dataset, tags::STUDY_ID, VR::SH, "S1");
    put(&mut dataset, tags::ACCESSION_NUMBER, VR::SH, "");
    put(&mut dataset, tags::STUDY_INSTANCE_UID, VR::UI, STUDY_UID);
    put(&mut dataset, tags::SERIES_INSTANCE_UID, VR::UI, SERIES_UID);
    put(&mut dataset, tags::SERIES_NUMBER, VR::IS, "1");
    put(&mut dataset, tags::MODALITY, VR::CS, "CT");
    put(&mut dataset, tags::INSTANCE_NUMBER, VR::IS, "1");
    put(&mut dataset, tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
    dataset.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(4_u16)));
    dataset.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(4_u16)));
    fill(&mut dataset);

    let mut object = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
    for elem in dataset {
        object.put(elem);
    }
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    object.write_to_file(&path).expect("write test file");
}

/// Distinct per test file name, enough to keep SOP instance UIDs apart.
fn name_number(name: &str) -> u64 {
    name.bytes().fold(0, |acc, b| acc * 31 + u64::from(b))
}

fn images(root: &DirectoryRecord) -> Vec<&DirectoryRecord> {
    let mut found = Vec::new();
    root.walk(&mut |record, _| {
        if record.record_type == RecordType::Image {
            found.push(record);
        }
    });
    found
}

fn assert_unique_siblings(record: &DirectoryRecord) {
    let mut seen = HashSet::new();
    for child in &record.children {
        if let Some(key) = child.unique_key_value() {
            assert!(
                seen.insert((child.record_type, key.clone())),
                "duplicate {} record with key {key}",
                child.record_type
            );
        }
        assert_unique_siblings(child);
    }
}

fn controller(options: DirOptions) -> DicomDir {
    DicomDir::with_image_support(options, None).expect("valid options")
}

#[test]
fn records_stay_unique_across_patients_studies_and_series() {
    let dir = tempdir().expect("tempdir");
    write_image(dir.path(), "IMG1", CT_IMAGE, |_| {});
    write_image(dir.path(), "IMG2", CT_IMAGE, |d| put(d, tags::INSTANCE_NUMBER, VR::IS, "2"));
    write_image(dir.path(), "SUB/IMG3", CT_IMAGE, |d| {
        put(d, tags::SERIES_INSTANCE_UID, VR::UI, "1.2.826.0.1.3680043.2.1125.1.2");
        put(d, tags::SERIES_NUMBER, VR::IS, "2");
    });
    write_image(dir.path(), "SUB/IMG4", CT_IMAGE, |d| {
        put(d, tags::PATIENT_ID, VR::LO, "PAT002");
        put(d, tags::STUDY_INSTANCE_UID, VR::UI, "1.2.826.0.1.3680043.2.1125.2");
        put(d, tags::SERIES_INSTANCE_UID, VR::UI, "1.2.826.0.1.3680043.2.1125.2.1");
    });

    let path = dir.path().join("DICOMDIR");
    let mut dicomdir = controller(DirOptions::default());
    dicomdir.create(&path).expect("create");
    for name in ["IMG1", "IMG2", "SUB/IMG3", "SUB/IMG4"] {
        dicomdir.add_file(name, dir.path()).expect("add");
    }
    assert_unique_siblings(dicomdir.root());
    dicomdir.write().expect("write");

    let loaded = read_dicomdir(&path).expect("read back");
    assert_unique_siblings(&loaded.root);
    assert_eq!(loaded.root.children.len(), 2);
    assert_eq!(loaded.root.count(), 2 + 2 + 3 + 4);
    let ids: Vec<_> = images(&loaded.root).iter().filter_map(|r| r.file_id()).map(str::to_string).collect();
    assert!(ids.contains(&"SUB\\IMG3".to_string()));
}

#[test]
fn inserting_a_file_twice_changes_nothing() {
    let dir = tempdir().expect("tempdir");
    write_image(dir.path(), "IMG1", CT_IMAGE, |_| {});
    let mut dicomdir = controller(DirOptions::default());
    dicomdir.create(&dir.path().join("DICOMDIR")).expect("create");

    assert_eq!(dicomdir.add_file("IMG1", dir.path()).expect("first"), Insertion::Added(RecordType::Image));
    let once = dicomdir.summary().records;
    assert_eq!(
        dicomdir.add_file("IMG1", dir.path()).expect("second"),
        Insertion::Duplicate(RecordType::Image)
    );
    let summary = dicomdir.summary();
    assert_eq!(summary.records, once);
    assert_eq!(summary.files_added, 1);
    assert_eq!(summary.files_skipped, 1);
    let image = images(dicomdir.root())[0];
    assert_eq!(image.attributes.element_int(tags::INSTANCE_NUMBER), Some(1));
}

#[test]
fn foreign_sop_classes_violate_the_profile_whatever_the_flags() {
    let dir = tempdir().expect("tempdir");
    write_image(dir.path(), "SC1", SECONDARY_CAPTURE, |d| put(d, tags::MODALITY, VR::CS, "OT"));
    let relaxed = DirOptions {
        invent: true,
        encoding_check: false,
        resolution_check: false,
        transfer_syntax_check: false,
        consistency_check: false,
        ..DirOptions::with_profile(ApplicationProfile::DentalRadiograph)
    };
    let mut dicomdir = controller(relaxed);
    dicomdir.create(&dir.path().join("DICOMDIR")).expect("create");
    let err = dicomdir.add_file("SC1", dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ApplicationProfileViolated);
    assert!(dicomdir.root().children.is_empty());
    assert_eq!(dicomdir.state(), DirState::Building);
}

#[test]
fn invented_instance_numbers_increase() {
    let dir = tempdir().expect("tempdir");
    for name in ["IMG1", "IMG2", "IMG3"] {
        write_image(dir.path(), name, CT_IMAGE, |d| {
            d.remove_element(tags::INSTANCE_NUMBER);
            d.remove_element(tags::STUDY_ID);
        });
    }
    let options = DirOptions {
        invent: true,
        ..DirOptions::default()
    };
    let mut dicomdir = controller(options);
    dicomdir.create(&dir.path().join("DICOMDIR")).expect("create");
    for name in ["IMG1", "IMG2", "IMG3"] {
        dicomdir.add_file(name, dir.path()).expect("add");
    }
    let numbers: Vec<i64> = images(dicomdir.root())
        .iter()
        .filter_map(|r| r.attributes.element_int(tags::INSTANCE_NUMBER))
        .collect();
    assert_eq!(numbers.len(), 3);
    assert!(numbers.windows(2).all(|w| w[0] < w[1]), "{numbers:?}");
    let study = &dicomdir.root().children[0].children[0];
    assert_eq!(study.attributes.element_str(tags::STUDY_ID).as_deref(), Some("DCMTKSTUDY000000"));
}

#[test]
fn images_are_ordered_by_instance_number() {
    let dir = tempdir().expect("tempdir");
    for (name, number) in [("IMG1", "3"), ("IMG2", "1"), ("IMG3", "2")] {
        write_image(dir.path(), name, CT_IMAGE, |d| put(d, tags::INSTANCE_NUMBER, VR::IS, number));
    }
    let path = dir.path().join("DICOMDIR");
    let mut dicomdir = controller(DirOptions::default());
    dicomdir.create(&path).expect("create");
    for name in ["IMG1", "IMG2", "IMG3"] {
        dicomdir.add_file(name, dir.path()).expect("add");
    }
    dicomdir.write().expect("write");

    let loaded = read_dicomdir(&path).expect("read back");
    let order: Vec<_> = images(&loaded.root)
        .iter()
        .map(|r| r.attributes.element_int(tags::INSTANCE_NUMBER))
        .collect();
    assert_eq!(order, vec![Some(1), Some(2), Some(3)]);
}

fn renumbered_series(dir: &Path) {
    write_image(dir, "IMG1", CT_IMAGE, |_| {});
    write_image(dir, "IMG2", CT_IMAGE, |d| {
        put(d, tags::INSTANCE_NUMBER, VR::IS, "2");
        put(d, tags::SERIES_NUMBER, VR::IS, "2");
    });
}

#[test]
fn inconsistent_series_is_inserted_with_a_warning() {
    let dir = tempdir().expect("tempdir");
    renumbered_series(dir.path());
    let mut dicomdir = controller(DirOptions::default());
    dicomdir.create(&dir.path().join("DICOMDIR")).expect("create");
    dicomdir.add_file("IMG1", dir.path()).expect("first");
    dicomdir.add_file("IMG2", dir.path()).expect("inconsistent file is still added");

    let series = &dicomdir.root().children[0].children[0].children[0];
    assert_eq!(series.children.len(), 2);
    assert_eq!(series.attributes.element_str(tags::SERIES_NUMBER).as_deref(), Some("1"));
}

#[test]
fn inconsistent_series_aborts_in_abort_mode() {
    let dir = tempdir().expect("tempdir");
    renumbered_series(dir.path());
    let options = DirOptions {
        abort_on_error: true,
        ..DirOptions::default()
    };
    let mut dicomdir = controller(options);
    dicomdir.create(&dir.path().join("DICOMDIR")).expect("create");
    dicomdir.add_file("IMG1", dir.path()).expect("first");
    let err = dicomdir.add_file("IMG2", dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedData);
    assert_eq!(dicomdir.state(), DirState::Failed);
    assert_eq!(images(dicomdir.root()).len(), 1);
}

#[test]
fn backup_survives_a_failed_write_only() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("DICOMDIR");
    let backup = dir.path().join("DICOMDIR.BAK");
    write_image(dir.path(), "IMG1", CT_IMAGE, |_| {});

    let mut first = controller(DirOptions::default());
    first.create(&path).expect("create");
    first.add_file("IMG1", dir.path()).expect("add");
    first.write().expect("write");
    assert!(!backup.exists());

    // a directory in place of the output makes the write fail
    let mut failing = controller(DirOptions::default());
    failing.create(&path).expect("create over existing");
    assert!(backup.exists());
    failing.add_file("IMG1", dir.path()).expect("add");
    std::fs::create_dir(&path).expect("block output");
    assert!(failing.write().is_err());
    assert_eq!(failing.state(), DirState::Failed);
    assert!(backup.exists());
    std::fs::remove_dir(&path).expect("unblock output");

    std::fs::copy(&backup, &path).expect("put old file back");
    let mut second = controller(DirOptions::default());
    second.create(&path).expect("create over existing");
    second.add_file("IMG1", dir.path()).expect("add");
    second.write().expect("write");
    assert!(!backup.exists());
    assert!(path.is_file());
}

#[test]
fn icons_fall_back_to_black_without_image_support() {
    let dir = tempdir().expect("tempdir");
    write_image(dir.path(), "IMG1", CT_IMAGE, |_| {});
    let mut dicomdir = controller(DirOptions::with_profile(ApplicationProfile::CtAndMr));
    dicomdir.create(&dir.path().join("DICOMDIR")).expect("create");
    dicomdir.add_file("IMG1", dir.path()).expect("add");

    let image = images(dicomdir.root())[0];
    let items = image
        .attributes
        .sequence_items(tags::ICON_IMAGE_SEQUENCE)
        .expect("icon sequence");
    let pixels = items[0]
        .element(tags::PIXEL_DATA)
        .expect("pixel data")
        .to_bytes()
        .expect("bytes");
    assert_eq!(pixels.len(), 64 * 64);
    assert!(pixels.iter().all(|p| *p == 0));
}

#[test]
fn append_extends_a_written_directory() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("DICOMDIR");
    write_image(dir.path(), "IMG1", CT_IMAGE, |_| {});
    write_image(dir.path(), "IMG2", CT_IMAGE, |d| put(d, tags::INSTANCE_NUMBER, VR::IS, "2"));

    let mut dicomdir = controller(DirOptions::default());
    dicomdir.create(&path).expect("create");
    dicomdir.add_file("IMG1", dir.path()).expect("add");
    dicomdir.write().expect("write");
    let uid = read_dicomdir(&path).expect("read").sop_instance;

    let mut dicomdir = controller(DirOptions::default());
    dicomdir.append(&path).expect("append");
    assert_eq!(
        dicomdir.add_file("IMG1", dir.path()).expect("again"),
        Insertion::Duplicate(RecordType::Image)
    );
    dicomdir.add_file("IMG2", dir.path()).expect("add");
    dicomdir.write().expect("write");

    let loaded = read_dicomdir(&path).expect("read");
    assert_eq!(loaded.sop_instance, uid);
    assert_eq!(images(&loaded.root).len(), 2);
    assert_eq!(loaded.root.children.len(), 1);
}
