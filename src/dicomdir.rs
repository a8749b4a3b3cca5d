//
// dicomdir.rs
// DicomDir-Tools-rs
//
// Directory controller: owns the record tree for one create/append/update cycle and
// drives every file through check, match, build and insert before writing the DICOMDIR.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::builder::RecordBuilder;
use crate::classify::record_type_for;
use crate::compliance::{can_decode, check_profile_support, ComplianceChecker};
use crate::consistency::{check_reference, ConsistencyChecker};
use crate::dirfile::{generate_instance_uid, read_dicomdir, write_dicomdir, FilesetHeader};
use crate::error::{DirError, Result};
use crate::filename::{check_filename, host_to_dicom_filename};
use crate::icon::{DicomImageSupport, IconGenerator, ImageSupport};
use crate::insert::insert_sorted;
use crate::invent::Inventor;
use crate::matcher::RecordMatcher;
use crate::models::DirectorySummary;
use crate::options::DirOptions;
use crate::record::{DirectoryRecord, FileReference, RecordType};
use crate::source::SourceFile;
use crate::storage::{remove_quietly, Backup};
use crate::uids;

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum DirState {
    /// No tree yet.
    Empty,
    /// Tree present and accepting files.
    Building,
    Written,
    Failed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum BuildMode {
    Create,
    Append,
    Update,
}

/// What `add_file` did with a file that passed every check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Insertion {
    Added(RecordType),
    /// The instance was already in the directory; nothing changed.
    Duplicate(RecordType),
}

#[derive(Debug, Default)]
struct Counters {
    added: usize,
    skipped: usize,
    failed: usize,
    bad_files: Vec<String>,
}

/// A DICOMDIR under construction.
#[derive(Debug)]
pub struct DicomDir {
    options: DirOptions,
    state: DirState,
    mode: Option<BuildMode>,
    path: PathBuf,
    header: FilesetHeader,
    instance_uid: String,
    root: DirectoryRecord,
    backup: Option<Backup>,
    inventor: Inventor,
    icons: IconGenerator,
    counters: Counters,
}

fn reference_for(file: &SourceFile, file_id: &str) -> FileReference {
    FileReference {
        file_id: file_id.to_string(),
        sop_class: file.sop_class(),
        sop_instance: file.sop_instance(),
        transfer_syntax: file.transfer_syntax(),
    }
}

/// Record kinds from the root down to the one describing the file itself.
fn levels_for(kind: RecordType, detached_patient: bool) -> Vec<RecordType> {
    if kind.is_root_level() {
        vec![kind]
    } else if detached_patient {
        vec![RecordType::Patient]
    } else {
        vec![RecordType::Patient, RecordType::Study, RecordType::Series, kind]
    }
}

/// Checks a single file against `options` and tells which record would describe it.
pub fn check_file(name: &str, directory: &Path, options: &DirOptions) -> Result<RecordType> {
    check_filename(name, options.map_filenames)?;
    let file = SourceFile::open(name, directory, options.file_format_check)?;
    ComplianceChecker::new(options).check(&file)?;
    if file.sop_class() == uids::DETACHED_PATIENT_MANAGEMENT {
        return Ok(RecordType::Patient);
    }
    Ok(record_type_for(&file.sop_class()))
}

impl DicomDir {
    /// Controller with the dicom-rs backed image support for icons.
    pub fn new(options: DirOptions) -> Result<Self> {
        DicomDir::with_image_support(options, Some(Box::new(DicomImageSupport)))
    }

    pub fn with_image_support(options: DirOptions, support: Option<Box<dyn ImageSupport>>) -> Result<Self> {
        options.validate()?;
        check_profile_support(options.profile, can_decode)?;
        let icons = IconGenerator::new(support, &options);
        let header = FilesetHeader {
            fileset_id: options.fileset_id.clone(),
            descriptor: options.descriptor.as_deref().map(host_to_dicom_filename),
            descriptor_charset: options.descriptor_charset.clone(),
        };
        Ok(DicomDir {
            options,
            state: DirState::Empty,
            mode: None,
            path: PathBuf::new(),
            header,
            instance_uid: String::new(),
            root: DirectoryRecord::root(),
            backup: None,
            inventor: Inventor::new(),
            icons,
            counters: Counters::default(),
        })
    }

    pub fn state(&self) -> DirState {
        self.state
    }

    pub fn mode(&self) -> Option<BuildMode> {
        self.mode
    }

    pub fn options(&self) -> &DirOptions {
        &self.options
    }

    pub fn header(&self) -> &FilesetHeader {
        &self.header
    }

    pub fn root(&self) -> &DirectoryRecord {
        &self.root
    }

    /// Output file of the current cycle.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_file(&self) -> Option<&Path> {
        self.backup.as_ref().map(Backup::path)
    }

    fn expect_state(&self, state: DirState, operation: &str) -> Result<()> {
        if self.state != state {
            return Err(DirError::IllegalCall(format!(
                "{operation} not possible in state {:?}",
                self.state
            )));
        }
        Ok(())
    }

    fn make_backup(&mut self, path: &Path) {
        if !self.options.backup {
            return;
        }
        match Backup::create(path) {
            Ok(backup) => self.backup = backup,
            Err(e) => warn!(file = %path.display(), "cannot create backup: {e}"),
        }
    }

    /// Starts a new directory at `path`; an existing file is backed up and removed.
    pub fn create(&mut self, path: &Path) -> Result<()> {
        self.expect_state(DirState::Empty, "create")?;
        if path.is_dir() {
            return Err(DirError::IllegalParameter(format!(
                "{} is a directory",
                path.display()
            )));
        }
        if path.exists() {
            self.make_backup(path);
            remove_quietly(path);
        }
        self.path = path.to_path_buf();
        self.instance_uid = generate_instance_uid(&self.header.fileset_id);
        self.root = DirectoryRecord::root();
        self.mode = Some(BuildMode::Create);
        self.state = DirState::Building;
        info!(file = %path.display(), profile = %self.options.profile, "creating DICOMDIR");
        Ok(())
    }

    /// Continues an existing directory; records already present are only matched.
    pub fn append(&mut self, path: &Path) -> Result<()> {
        self.open_existing(path, BuildMode::Append)
    }

    /// Like [`DicomDir::append`], but existing records are compared against the incoming
    /// files and instance/series/etc. numbers may be replaced.
    pub fn update(&mut self, path: &Path) -> Result<()> {
        self.open_existing(path, BuildMode::Update)
    }

    fn open_existing(&mut self, path: &Path, mode: BuildMode) -> Result<()> {
        self.expect_state(DirState::Empty, if mode == BuildMode::Append { "append" } else { "update" })?;
        if !path.is_file() {
            return Err(DirError::IllegalParameter(format!(
                "DICOMDIR not found: {}",
                path.display()
            )));
        }
        let loaded = read_dicomdir(path)?;
        self.make_backup(path);
        if loaded.header.fileset_id != self.options.fileset_id {
            debug!(
                "keeping fileset ID {} of existing DICOMDIR",
                loaded.header.fileset_id
            );
        }
        self.header = loaded.header;
        self.instance_uid = if loaded.sop_instance.is_empty() {
            generate_instance_uid(&self.header.fileset_id)
        } else {
            loaded.sop_instance
        };
        self.root = loaded.root;
        self.path = path.to_path_buf();
        self.mode = Some(mode);
        self.state = DirState::Building;
        info!(
            file = %path.display(),
            records = self.root.count(),
            "{} DICOMDIR",
            if mode == BuildMode::Append { "appending to" } else { "updating" }
        );
        Ok(())
    }

    fn consistency_checker(&self) -> Option<ConsistencyChecker> {
        let update = self.mode == Some(BuildMode::Update);
        (self.options.consistency_check || update)
            .then(|| ConsistencyChecker::new(self.options.abort_on_error, update))
    }

    /// Checks `name` (relative to the fileset root `directory`) and inserts its records.
    ///
    /// A rejected file is reported through the error; in abort mode it also moves the
    /// controller to [`DirState::Failed`], otherwise later files are still accepted.
    pub fn add_file(&mut self, name: &str, directory: &Path) -> Result<Insertion> {
        self.expect_state(DirState::Building, "add_file")?;
        match self.insert_file(name, directory) {
            Ok(insertion) => {
                match insertion {
                    Insertion::Added(_) => self.counters.added += 1,
                    Insertion::Duplicate(_) => self.counters.skipped += 1,
                }
                Ok(insertion)
            }
            Err(e) => {
                self.counters.failed += 1;
                self.counters.bad_files.push(name.to_string());
                if self.options.abort_on_error {
                    error!(file = name, "aborting: {e}");
                    self.state = DirState::Failed;
                } else {
                    warn!(file = name, "skipping file: {e}");
                }
                Err(e)
            }
        }
    }

    fn insert_file(&mut self, name: &str, directory: &Path) -> Result<Insertion> {
        check_filename(name, self.options.map_filenames)?;
        let mut file = SourceFile::open(name, directory, self.options.file_format_check)?;
        ComplianceChecker::new(&self.options).check(&file)?;

        let file_id = host_to_dicom_filename(name);
        let detached = file.sop_class() == uids::DETACHED_PATIENT_MANAGEMENT;
        let kind = if detached {
            RecordType::Patient
        } else {
            record_type_for(&file.sop_class())
        };
        let levels = levels_for(kind, detached);
        let checker = self.consistency_checker();
        let abort = self.options.abort_on_error;
        let matcher = RecordMatcher::new(directory, self.options.invent_patient_id);
        let builder = RecordBuilder::new(&self.options, &self.icons);

        // descend through the records that already exist
        let mut parent = &mut self.root;
        let mut depth = 0;
        let mut attached = false;
        while depth < levels.len() {
            let Some(index) = matcher.find_child(parent, levels[depth], &mut file) else {
                break;
            };
            let existing = &mut parent.children[index];
            if let Some(checker) = &checker {
                let found = checker.check(existing, &file);
                if !found.is_empty() && abort {
                    return Err(DirError::CorruptedData(format!(
                        "{} inconsistent with existing {} record",
                        file.path.display(),
                        existing.record_type
                    )));
                }
            }
            if depth + 1 == levels.len() {
                if detached && existing.reference.is_none() {
                    existing.reference = Some(reference_for(&file, &file_id));
                    attached = true;
                } else if detached || !existing.record_type.is_aggregation() {
                    check_reference(existing, &file_id, &file, &file.path)?;
                }
            }
            parent = existing;
            depth += 1;
        }

        if depth == levels.len() {
            if attached {
                return Ok(Insertion::Added(kind));
            }
            debug!(file = name, record = %kind, "already referenced by DICOMDIR");
            return Ok(Insertion::Duplicate(kind));
        }

        // the missing levels are built bottom-up and attached in one go
        let mut chain: Option<DirectoryRecord> = None;
        for level in levels[depth..].iter().rev() {
            let mut record = builder.build(*level, &file, &file_id)?;
            if detached && *level == RecordType::Patient {
                record.reference = Some(reference_for(&file, &file_id));
            }
            if let Some(child) = chain.take() {
                insert_sorted(&mut record, child)?;
            }
            chain = Some(record);
        }
        if let Some(record) = chain {
            insert_sorted(parent, record)?;
        }

        if self.options.invent {
            self.inventor.invent(&mut self.root, false);
        } else if self.options.invent_patient_id {
            self.inventor.invent(&mut self.root, true);
        }
        debug!(file = name, record = %kind, "added to DICOMDIR");
        Ok(Insertion::Added(kind))
    }

    /// Runs the compliance check on a file without touching the tree.
    pub fn check_file(&self, name: &str, directory: &Path) -> Result<RecordType> {
        check_file(name, directory, &self.options)
    }

    /// Serializes the tree. On failure the backup stays where it is.
    pub fn write(&mut self) -> Result<()> {
        self.expect_state(DirState::Building, "write")?;
        match write_dicomdir(&self.path, &self.header, &self.root, &self.instance_uid) {
            Ok(()) => {
                if let Some(backup) = self.backup.take() {
                    if let Err(e) = backup.discard() {
                        warn!("{e}");
                    }
                }
                self.state = DirState::Written;
                info!(
                    file = %self.path.display(),
                    records = self.root.count(),
                    "DICOMDIR written"
                );
                Ok(())
            }
            Err(e) => {
                self.state = DirState::Failed;
                error!(file = %self.path.display(), "cannot write DICOMDIR: {e}");
                Err(e)
            }
        }
    }

    /// Drops the tree without writing and puts a backed up file back in place.
    pub fn discard(&mut self) -> Result<()> {
        if self.state == DirState::Written {
            return Err(DirError::IllegalCall("DICOMDIR already written".into()));
        }
        if let Some(backup) = self.backup.take() {
            if self.mode == Some(BuildMode::Create) || !self.path.exists() {
                backup.restore()?;
            } else {
                backup.discard()?;
            }
        }
        self.root = DirectoryRecord::root();
        self.mode = None;
        self.state = DirState::Empty;
        info!(file = %self.path.display(), "DICOMDIR discarded");
        Ok(())
    }

    pub fn summary(&self) -> DirectorySummary {
        let mut records = BTreeMap::new();
        self.root.walk(&mut |record, _| {
            if let Some(code) = record.record_type.code() {
                *records.entry(code.to_string()).or_insert(0) += 1;
            }
        });
        DirectorySummary {
            profile: self.options.profile.to_string(),
            fileset_id: self.header.fileset_id.clone(),
            files_added: self.counters.added,
            files_skipped: self.counters.skipped,
            files_failed: self.counters.failed,
            records,
            bad_files: self.counters.bad_files.clone(),
            written: self.state == DirState::Written,
        }
    }
}
