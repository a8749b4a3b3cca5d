//
// source.rs
// DicomDir-Tools-rs
//
// Loading of the instance files that go into a fileset, with or without a meta-information header.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use dicom::encoding::TransferSyntaxIndex;
use dicom::object::{
    open_file, DefaultDicomObject, FileDicomObject, FileMetaTableBuilder, InMemDicomObject,
    StandardDataDictionary,
};
use dicom::transfer_syntax::TransferSyntaxRegistry;
use tracing::debug;

use crate::dicom_access::{trim_uid, ElementAccess};
use crate::error::{Context, DirError, Result};
use crate::tags;
use crate::uids;

/// An instance file opened for checking and record building.
pub struct SourceFile {
    /// Path as handed in by the caller (fileset relative).
    pub name: String,
    /// Path on the host, used to open the file and in diagnostics.
    pub path: PathBuf,
    pub object: DefaultDicomObject,
    /// Whether the file carried its own meta-information header.
    pub has_meta: bool,
}

fn has_part10_preamble(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    if file.seek(SeekFrom::Start(128)).is_err() {
        return Ok(false);
    }
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == b"DICM"),
        Err(_) => Ok(false),
    }
}

/// Bare data set in Implicit VR Little Endian, wrapped with a header built from its own UIDs.
fn open_dataset_only(path: &Path) -> Result<DefaultDicomObject> {
    let ts = TransferSyntaxRegistry
        .get(uids::IMPLICIT_VR_LITTLE_ENDIAN)
        .ok_or_else(|| DirError::CorruptedData("implicit VR little endian not registered".into()))?;
    let reader = BufReader::new(File::open(path)?);
    let dataset = InMemDicomObject::read_dataset_with_ts(reader, ts)
        .context(format!("reading data set of {}", path.display()))?;
    let sop_class = dataset.element_str(tags::SOP_CLASS_UID).unwrap_or_default();
    let sop_instance = dataset.element_str(tags::SOP_INSTANCE_UID).unwrap_or_default();
    if sop_class.is_empty() || sop_instance.is_empty() {
        return Err(DirError::TagNotFound {
            tag: "SOPClassUID/SOPInstanceUID".into(),
            file: path.to_path_buf(),
        });
    }
    let meta = FileMetaTableBuilder::new()
        .transfer_syntax(uids::IMPLICIT_VR_LITTLE_ENDIAN)
        .media_storage_sop_class_uid(sop_class)
        .media_storage_sop_instance_uid(sop_instance)
        .build()?;
    let mut object = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
    for elem in dataset {
        object.put(elem);
    }
    Ok(object)
}

impl SourceFile {
    /// Opens `name` below `directory`. Without the file format check, files
    /// lacking the Part 10 header are read as a plain data set.
    pub fn open(name: &str, directory: &Path, file_format_check: bool) -> Result<Self> {
        let path = directory.join(name);
        if !path.is_file() {
            return Err(DirError::IllegalParameter(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let has_meta = has_part10_preamble(&path)?;
        let object = if has_meta {
            open_file(&path).context(format!("reading {}", path.display()))?
        } else if file_format_check {
            return Err(DirError::FileMetaInfoHeaderMissing(path));
        } else {
            debug!(file = %path.display(), "no meta-information header, reading data set only");
            open_dataset_only(&path)?
        };
        Ok(SourceFile {
            name: name.to_string(),
            path,
            object,
            has_meta,
        })
    }

    /// Wraps an object that is already in memory.
    pub fn from_object(name: &str, path: PathBuf, object: DefaultDicomObject) -> Self {
        SourceFile {
            name: name.to_string(),
            path,
            object,
            has_meta: true,
        }
    }

    pub fn dataset(&self) -> &InMemDicomObject {
        &self.object
    }

    /// SOP class as stated by the meta-information header.
    pub fn sop_class(&self) -> String {
        trim_uid(&self.object.meta().media_storage_sop_class_uid)
    }

    pub fn sop_instance(&self) -> String {
        trim_uid(&self.object.meta().media_storage_sop_instance_uid)
    }

    pub fn transfer_syntax(&self) -> String {
        trim_uid(self.object.meta().transfer_syntax())
    }
}
