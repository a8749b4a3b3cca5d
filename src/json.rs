//
// json.rs
// DicomDir-Tools-rs
//
// JSON rendering of DICOMDIR records: record type, referenced file and the DICOM JSON model of the attributes.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use anyhow::{Context, Result};
use dicom_json::DicomJson;
use serde_json::{json, Value};

use crate::dirfile::read_dicomdir;
use crate::record::DirectoryRecord;

/// Print the records of a DICOMDIR as JSON, or save them to `output`.
pub fn to_json(input: &Path, output: Option<&Path>) -> Result<()> {
    let json_string = to_json_string(input)?;

    match output {
        Some(path) => {
            std::fs::write(path, json_string).context("Failed to write JSON to file")?;
            println!("JSON saved to {:?}", path);
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}

pub fn to_json_string(input: &Path) -> Result<String> {
    let loaded = read_dicomdir(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let records = loaded
        .root
        .children
        .iter()
        .map(record_to_json)
        .collect::<Result<Vec<_>>>()?;
    let document = json!({
        "fileSetId": loaded.header.fileset_id,
        "sopInstanceUid": loaded.sop_instance,
        "records": records,
    });
    serde_json::to_string_pretty(&document).context("Failed to serialize to JSON")
}

/// One record with its subtree.
pub fn record_to_json(record: &DirectoryRecord) -> Result<Value> {
    let attributes =
        serde_json::to_value(DicomJson::from(&record.attributes)).context("Failed to convert record attributes")?;
    let children = record
        .children
        .iter()
        .map(record_to_json)
        .collect::<Result<Vec<_>>>()?;
    let mut value = json!({
        "type": record.record_type.code().unwrap_or_default(),
        "attributes": attributes,
    });
    if let Some(reference) = &record.reference {
        value["referencedFileId"] = json!(reference.file_id);
        value["referencedSopClassUid"] = json!(reference.sop_class);
        value["referencedSopInstanceUid"] = json!(reference.sop_instance);
    }
    if !children.is_empty() {
        value["children"] = Value::Array(children);
    }
    Ok(value)
}
