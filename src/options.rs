//
// options.rs
// DicomDir-Tools-rs
//
// Configuration for building a DICOMDIR: profile, fileset identification, icons and mode flags.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DirError, Result};
use crate::filename::{check_filename, check_fileset_id, is_charset_valid};
use crate::profile::ApplicationProfile;

pub const DEFAULT_FILESET_ID: &str = "DICOMDIR_TOOLS";
pub const DEFAULT_ICON_SIZE: u32 = 64;
pub const MAX_ICON_SIZE: u32 = 256;

fn default_fileset_id() -> String {
    DEFAULT_FILESET_ID.to_string()
}

fn default_icon_size() -> u32 {
    DEFAULT_ICON_SIZE
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirOptions {
    #[serde(default)]
    pub profile: ApplicationProfile,
    #[serde(default = "default_fileset_id")]
    pub fileset_id: String,
    /// File-set descriptor file, relative to the fileset root.
    #[serde(default)]
    pub descriptor: Option<String>,
    #[serde(default)]
    pub descriptor_charset: Option<String>,
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,
    /// Prefix for externally prepared PGM icons (`<prefix><file ID>`).
    #[serde(default)]
    pub icon_prefix: Option<String>,
    #[serde(default)]
    pub default_icon: Option<PathBuf>,

    #[serde(default)]
    pub abort_on_error: bool,
    #[serde(default)]
    pub map_filenames: bool,
    #[serde(default)]
    pub invent: bool,
    #[serde(default)]
    pub invent_patient_id: bool,
    #[serde(default)]
    pub accept_retired: bool,
    #[serde(default)]
    pub create_icons: bool,
    #[serde(default = "enabled")]
    pub backup: bool,
    #[serde(default = "enabled")]
    pub encoding_check: bool,
    #[serde(default = "enabled")]
    pub resolution_check: bool,
    #[serde(default = "enabled")]
    pub transfer_syntax_check: bool,
    #[serde(default = "enabled")]
    pub file_format_check: bool,
    #[serde(default = "enabled")]
    pub consistency_check: bool,
}

impl Default for DirOptions {
    fn default() -> Self {
        DirOptions {
            profile: ApplicationProfile::default(),
            fileset_id: default_fileset_id(),
            descriptor: None,
            descriptor_charset: None,
            icon_size: DEFAULT_ICON_SIZE,
            icon_prefix: None,
            default_icon: None,
            abort_on_error: false,
            map_filenames: false,
            invent: false,
            invent_patient_id: false,
            accept_retired: false,
            create_icons: false,
            backup: true,
            encoding_check: true,
            resolution_check: true,
            transfer_syntax_check: true,
            file_format_check: true,
            consistency_check: true,
        }
    }
}

impl DirOptions {
    pub fn with_profile(profile: ApplicationProfile) -> Self {
        DirOptions {
            profile,
            ..DirOptions::default()
        }
    }

    /// Checks every value a caller can get wrong before any file is touched.
    pub fn validate(&self) -> Result<()> {
        check_fileset_id(&self.fileset_id)?;
        if let Some(descriptor) = &self.descriptor {
            check_filename(descriptor, self.map_filenames)
                .map_err(|e| e.context("checking the file-set descriptor"))?;
        }
        if let Some(charset) = &self.descriptor_charset {
            if self.descriptor.is_none() {
                return Err(DirError::IllegalParameter(
                    "descriptor character set given without a descriptor file".into(),
                ));
            }
            if !is_charset_valid(charset) {
                return Err(DirError::IllegalParameter(format!(
                    "unknown character set for fileset descriptor: {charset}"
                )));
            }
        }
        if self.icon_size == 0 || self.icon_size > MAX_ICON_SIZE {
            return Err(DirError::IllegalParameter(format!(
                "icon size {} out of range (1..{MAX_ICON_SIZE})",
                self.icon_size
            )));
        }
        Ok(())
    }

    /// Invention of any kind is active.
    pub fn inventing(&self) -> bool {
        self.invent || self.invent_patient_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_enable_every_check() {
        let options = DirOptions::default();
        assert!(options.backup && options.consistency_check && options.file_format_check);
        assert!(!options.abort_on_error);
        assert_eq!(options.icon_size, 64);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_icon_size() {
        let options = DirOptions {
            icon_size: 300,
            ..DirOptions::default()
        };
        assert_eq!(options.validate().unwrap_err().kind(), ErrorKind::IllegalParameter);
    }

    #[test]
    fn charset_needs_a_descriptor() {
        let mut options = DirOptions {
            descriptor_charset: Some("ISO_IR 100".into()),
            ..DirOptions::default()
        };
        assert!(options.validate().is_err());
        options.descriptor = Some("README".into());
        assert!(options.validate().is_ok());
        options.descriptor_charset = Some("KOI8".into());
        assert!(options.validate().is_err());
    }

    #[test]
    fn missing_json_fields_take_defaults() {
        let options: DirOptions =
            serde_json::from_str(r#"{"profile":"ct-and-mr","invent":true}"#).expect("parse");
        assert_eq!(options.profile, ApplicationProfile::CtAndMr);
        assert!(options.invent);
        assert!(options.backup);
        assert_eq!(options.fileset_id, DEFAULT_FILESET_ID);
    }
}
