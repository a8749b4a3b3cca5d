//
// filename.rs
// DicomDir-Tools-rs
//
// File ID rules for media filesets: allowed characters, component limits, host/DICOM name mapping.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::error::{DirError, Result};

/// ISO 9660 level 1 limit for a single path component.
pub const MAX_COMPONENT_LEN: usize = 8;
pub const MAX_COMPONENTS: usize = 8;
/// Maximum length of a CS value, which bounds the fileset ID.
pub const MAX_FILESET_ID_LEN: usize = 16;

pub const VALID_CHARSETS: &[&str] = &[
    "ISO_IR 100",
    "ISO_IR 101",
    "ISO_IR 109",
    "ISO_IR 110",
    "ISO_IR 144",
    "ISO_IR 127",
    "ISO_IR 126",
    "ISO_IR 138",
    "ISO_IR 148",
    "ISO_IR 166",
    "ISO_IR 13",
    "ISO_IR 192",
];

fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

/// Position of the first character not allowed in a file ID, if any.
fn invalid_char_position(filename: &str, map_filenames: bool) -> Option<usize> {
    let body = if map_filenames {
        filename.strip_suffix('.').unwrap_or(filename)
    } else {
        filename
    };
    body.char_indices()
        .find(|&(_, c)| {
            let ok = c == '_'
                || c.is_ascii_digit()
                || is_separator(c)
                || c.is_ascii_uppercase()
                || (map_filenames && c.is_ascii_lowercase());
            !ok
        })
        .map(|(i, _)| i)
}

fn components(filename: &str) -> Vec<&str> {
    if filename.is_empty() {
        return Vec::new();
    }
    filename.split(is_separator).collect()
}

/// Checks a host-relative filename against the fileset naming rules.
pub fn check_filename(filename: &str, map_filenames: bool) -> Result<()> {
    if filename.is_empty() {
        return Err(DirError::IllegalParameter(
            "<empty string> not allowed as filename".into(),
        ));
    }
    if filename.starts_with(is_separator) {
        return Err(DirError::IllegalParameter(format!(
            "absolute path not allowed as filename: {filename}"
        )));
    }
    if let Some(pos) = invalid_char_position(filename, map_filenames) {
        return Err(DirError::IllegalParameter(format!(
            "invalid character(s) in filename: {filename} (position {})",
            pos + 1
        )));
    }
    let parts = components(filename);
    if parts.len() > MAX_COMPONENTS {
        return Err(DirError::IllegalParameter(format!(
            "too many path components (max {MAX_COMPONENTS}) in filename: {filename}"
        )));
    }
    let last = parts.len().saturating_sub(1);
    let too_large = parts.iter().enumerate().any(|(i, part)| {
        let part = if i == last && map_filenames {
            part.strip_suffix('.').unwrap_or(part)
        } else {
            part
        };
        part.len() > MAX_COMPONENT_LEN
    });
    if too_large {
        return Err(DirError::IllegalParameter(format!(
            "component too large (max {MAX_COMPONENT_LEN} characters) in filename: {filename}"
        )));
    }
    Ok(())
}

/// Host path to the value stored in ReferencedFileID: upper case, `\` separated,
/// characters outside the file ID repertoire dropped.
pub fn host_to_dicom_filename(host: &str) -> String {
    host.chars()
        .filter_map(|c| {
            if is_separator(c) {
                Some('\\')
            } else if c.is_ascii_alphabetic() {
                Some(c.to_ascii_uppercase())
            } else if c.is_ascii_digit() || c == '_' || c == '\\' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

pub fn dicom_to_host_filename(dicom: &str, lower: bool) -> PathBuf {
    dicom
        .split('\\')
        .filter(|part| !part.is_empty())
        .map(|part| {
            if lower {
                part.to_ascii_lowercase()
            } else {
                part.to_string()
            }
        })
        .collect()
}

/// Finds the host file for a file ID below `base`, trying the name as given,
/// with a trailing period, lower case, and lower case with a trailing period.
pub fn locate_dicom_file(base: &Path, file_id: &str) -> Option<PathBuf> {
    let with_dot = |p: PathBuf| {
        let mut s = p.into_os_string();
        s.push(".");
        PathBuf::from(s)
    };
    let upper = base.join(dicom_to_host_filename(file_id, false));
    let lower = base.join(dicom_to_host_filename(file_id, true));
    [upper.clone(), with_dot(upper), lower.clone(), with_dot(lower)]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Fileset ID: 1..=16 characters of the CS repertoire.
pub fn check_fileset_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(DirError::IllegalParameter("fileset ID must not be empty".into()));
    }
    if let Some(pos) = id
        .chars()
        .position(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == ' '))
    {
        return Err(DirError::IllegalParameter(format!(
            "invalid character(s) in fileset ID: {id} (position {})",
            pos + 1
        )));
    }
    if id.len() > MAX_FILESET_ID_LEN {
        return Err(DirError::IllegalParameter(format!("fileset ID too large: {id}")));
    }
    Ok(())
}

/// Empty means "no character set" and is accepted.
pub fn is_charset_valid(charset: &str) -> bool {
    charset.is_empty() || VALID_CHARSETS.contains(&charset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn accepts_fileset_style_names() {
        assert!(check_filename("IMAGES/IMG00001", false).is_ok());
        assert!(check_filename("images/img1", true).is_ok());
        assert!(check_filename("IMG1.", true).is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        assert!(check_filename("", false).is_err());
        assert!(check_filename("/ABS/IMG1", false).is_err());
        assert!(check_filename("img1", false).is_err());
        assert!(check_filename("IMG1.DCM", true).is_err());
        assert!(check_filename("VERYLONGNAME", false).is_err());
        assert!(check_filename("A/B/C/D/E/F/G/H/I", false).is_err());
    }

    #[test]
    fn maps_host_names_to_file_ids() {
        assert_eq!(host_to_dicom_filename("dir1/img_1."), "DIR1\\IMG_1");
        assert_eq!(
            dicom_to_host_filename("DIR1\\IMG_1", true),
            PathBuf::from("dir1").join("img_1")
        );
    }

    #[test]
    fn locates_lower_case_files_with_trailing_period() {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        std::fs::write(dir.path().join("sub").join("img1."), b"x").expect("write");
        let found = locate_dicom_file(dir.path(), "SUB\\IMG1").expect("located");
        assert!(found.ends_with("img1."));
        assert!(locate_dicom_file(dir.path(), "SUB\\IMG2").is_none());
    }

    #[test]
    fn validates_fileset_ids_and_charsets() {
        assert!(check_fileset_id("MY_FILESET 01").is_ok());
        assert!(check_fileset_id("lower").is_err());
        assert!(check_fileset_id("ABCDEFGHIJKLMNOPQ").is_err());
        assert!(is_charset_valid("ISO_IR 192"));
        assert!(is_charset_valid(""));
        assert!(!is_charset_valid("UTF-8"));
    }
}
