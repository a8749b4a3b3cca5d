//
// dump.rs
// DicomDir-Tools-rs
//
// Renders the record tree of a DICOMDIR, each record followed by its attributes with value previews.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use dicom::core::value::Value;
use dicom::core::PrimitiveValue;
use dicom::object::InMemDicomObject;

use crate::dirfile::read_dicomdir;
use crate::record::DirectoryRecord;
use crate::tags::{format_tag, tag_name};

pub fn dump_dicomdir(path: &Path, max_depth: usize, max_value_len: usize) -> Result<()> {
    let output = dump_to_string(path, max_depth, max_value_len)?;
    println!("{output}");
    Ok(())
}

pub fn dump_to_string(path: &Path, max_depth: usize, max_value_len: usize) -> Result<String> {
    let loaded = read_dicomdir(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut out = String::new();
    let _ = writeln!(out, "File-set ID: {}", loaded.header.fileset_id);
    if let Some(descriptor) = &loaded.header.descriptor {
        let _ = writeln!(out, "File-set descriptor: {descriptor}");
    }
    let _ = writeln!(out, "SOP Instance UID: {}", loaded.sop_instance);
    let _ = writeln!(out, "Records: {}", loaded.root.count());
    for child in &loaded.root.children {
        dump_record(child, 0, max_depth, max_value_len, &mut out);
    }
    Ok(out)
}

fn dump_record(record: &DirectoryRecord, depth: usize, max_depth: usize, max_value_len: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match record.file_id() {
        Some(file_id) => {
            let _ = writeln!(out, "{indent}{} [{file_id}]", record.record_type);
        }
        None => {
            let _ = writeln!(out, "{indent}{}", record.record_type);
        }
    }
    dump_object(&record.attributes, depth + 1, depth + 1 + max_depth, max_value_len, out);
    for child in &record.children {
        dump_record(child, depth + 1, max_depth, max_value_len, out);
    }
}

fn dump_object(obj: &InMemDicomObject, depth: usize, max_depth: usize, max_value_len: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for elem in obj.iter() {
        let tag = elem.header().tag;
        let vr = elem.header().vr;
        let name = tag_name(tag);

        match elem.value() {
            Value::Primitive(p) => {
                let _ = writeln!(
                    out,
                    "{indent}{} {name} {vr} {}",
                    format_tag(tag),
                    preview_primitive(p, max_value_len)
                );
            }
            Value::Sequence(seq) => {
                let _ = writeln!(
                    out,
                    "{indent}{} {name} {vr} [sequence: {} item(s)]",
                    format_tag(tag),
                    seq.items().len()
                );
                if depth < max_depth {
                    for (idx, item) in seq.items().iter().enumerate() {
                        let _ = writeln!(out, "{indent}  Item {}", idx + 1);
                        dump_object(item, depth + 2, max_depth, max_value_len, out);
                    }
                }
            }
            Value::PixelSequence(p) => {
                let _ = writeln!(
                    out,
                    "{indent}{} {name} {vr} [encapsulated: {} fragment(s)]",
                    format_tag(tag),
                    p.fragments().len()
                );
            }
        }
    }
}

fn preview_primitive(value: &PrimitiveValue, max_value_len: usize) -> String {
    // icon pixels are binary
    if matches!(value, PrimitiveValue::U8(_) | PrimitiveValue::U16(_)) && value.multiplicity() > 16 {
        return format!("{} bytes", value.to_bytes().len());
    }
    let text = value.to_str();
    if !text.is_empty() {
        return truncate(&text, max_value_len);
    }
    format!("{} bytes", value.to_bytes().len())
}

fn truncate(input: &str, limit: usize) -> String {
    match input.char_indices().nth(limit) {
        None => input.to_string(),
        Some((end, _)) => format!("{}…", &input[..end]),
    }
}
