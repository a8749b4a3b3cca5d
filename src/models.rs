//
// models.rs
// DicomDir-Tools-rs
//
// Serializable reports: per-run directory summary and per-file check outcomes.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Counts for one create/append/update cycle, as printed by the CLI and written with `--report-json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirectorySummary {
    pub profile: String,
    pub fileset_id: String,
    pub files_added: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    /// Records per DirectoryRecordType value.
    pub records: BTreeMap<String, usize>,
    pub bad_files: Vec<String>,
    pub written: bool,
}

impl DirectorySummary {
    pub fn total_records(&self) -> usize {
        self.records.values().sum()
    }
}

/// Result of checking one file against a profile without inserting it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileCheck {
    pub file: String,
    pub passed: bool,
    pub record_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileCheck {
    pub fn passed(file: &str, record_type: &str) -> Self {
        FileCheck {
            file: file.to_string(),
            passed: true,
            record_type: Some(record_type.to_string()),
            error_kind: None,
            message: None,
        }
    }

    pub fn failed(file: &str, kind: ErrorKind, message: String) -> Self {
        FileCheck {
            file: file.to_string(),
            passed: false,
            record_type: None,
            error_kind: Some(format!("{kind:?}")),
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_record_counts() {
        let mut summary = DirectorySummary {
            profile: "STD-GEN-CD/DVD-RAM".into(),
            fileset_id: "TESTSET".into(),
            files_added: 2,
            ..DirectorySummary::default()
        };
        summary.records.insert("IMAGE".into(), 2);
        summary.records.insert("PATIENT".into(), 1);
        assert_eq!(summary.total_records(), 3);
        let json = serde_json::to_value(&summary).expect("json");
        assert_eq!(json["records"]["IMAGE"], 2);
        assert_eq!(json["written"], false);
    }

    #[test]
    fn failed_checks_carry_the_error_kind() {
        let check = FileCheck::failed("IMG1", ErrorKind::ApplicationProfileViolated, "bad".into());
        let json = serde_json::to_string(&check).expect("json");
        assert!(json.contains("ApplicationProfileViolated"));
        let passed = serde_json::to_string(&FileCheck::passed("IMG2", "IMAGE")).expect("json");
        assert!(!passed.contains("error_kind"));
    }
}
