//
// lib.rs
// DicomDir-Tools-rs
//
// Exposes the DICOMDIR engine modules and re-exports the controller and the CLI entry point.
//
// Thales Matheus Mendonça Santos - November 2025

// Building blocks, roughly in the order a file passes through them.
pub mod batch;
pub mod builder;
pub mod classify;
pub mod cli;
pub mod compliance;
pub mod consistency;
pub mod dicom_access;
pub mod dicomdir;
pub mod dirfile;
pub mod dump;
pub mod error;
pub mod filename;
pub mod icon;
pub mod insert;
pub mod invent;
pub mod json;
pub mod matcher;
pub mod models;
pub mod options;
pub mod profile;
pub mod record;
pub mod source;
pub mod storage;
pub mod tags;
pub mod uids;

pub use cli::{run as run_cli, Cli, Commands};
pub use dicomdir::{DicomDir, DirState, Insertion};
pub use error::{DirError, ErrorKind, Result};
pub use options::DirOptions;
pub use profile::ApplicationProfile;
