//
// error.rs
// DicomDir-Tools-rs
//
// Error kinds reported while checking files and building or writing a DICOMDIR.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::PathBuf;

use thiserror::Error;

/// Low-level failures of the container-format collaborator (dicom-rs).
#[derive(Error, Debug)]
pub enum DicomError {
    #[error("dicom read error: {0}")]
    Read(#[from] dicom::object::ReadError),
    #[error("dicom write error: {0}")]
    Write(#[from] dicom::object::WriteError),
    #[error("dicom meta error: {0}")]
    Meta(#[from] dicom::object::meta::Error),
}

#[derive(Error, Debug)]
pub enum DirError {
    #[error("illegal parameter: {0}")]
    IllegalParameter(String),

    #[error("illegal call: {0}")]
    IllegalCall(String),

    #[error("out of memory: {0}")]
    MemoryExhausted(String),

    #[error("{tag} missing in meta-information header: {file}")]
    TagNotFound { tag: String, file: PathBuf },

    #[error("required attribute missing or empty in file: {file}")]
    MissingAttribute { file: PathBuf },

    #[error("{0}")]
    ApplicationProfileViolated(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("file not part 10 format (no meta-information header): {}", .0.display())]
    FileMetaInfoHeaderMissing(PathBuf),

    #[error("{0}")]
    CannotChangeRepresentation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Dicom(#[from] DicomError),

    #[error("{source} when {context}")]
    Context {
        source: Box<DirError>,
        context: String,
    },
}

/// Fieldless view of [`DirError`], handy for matching and for reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    IllegalParameter,
    IllegalCall,
    MemoryExhausted,
    TagNotFound,
    MissingAttribute,
    ApplicationProfileViolated,
    CorruptedData,
    FileMetaInfoHeaderMissing,
    CannotChangeRepresentation,
    Io,
    Dicom,
}

impl DirError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirError::IllegalParameter(_) => ErrorKind::IllegalParameter,
            DirError::IllegalCall(_) => ErrorKind::IllegalCall,
            DirError::MemoryExhausted(_) => ErrorKind::MemoryExhausted,
            DirError::TagNotFound { .. } => ErrorKind::TagNotFound,
            DirError::MissingAttribute { .. } => ErrorKind::MissingAttribute,
            DirError::ApplicationProfileViolated(_) => ErrorKind::ApplicationProfileViolated,
            DirError::CorruptedData(_) => ErrorKind::CorruptedData,
            DirError::FileMetaInfoHeaderMissing(_) => ErrorKind::FileMetaInfoHeaderMissing,
            DirError::CannotChangeRepresentation(_) => ErrorKind::CannotChangeRepresentation,
            DirError::Io(_) => ErrorKind::Io,
            DirError::Dicom(_) => ErrorKind::Dicom,
            DirError::Context { source, .. } => source.kind(),
        }
    }

    pub(crate) fn context<T>(self, context: T) -> DirError
    where
        String: From<T>,
    {
        DirError::Context {
            source: Box::new(self),
            context: context.into(),
        }
    }
}

impl From<dicom::object::ReadError> for DirError {
    fn from(value: dicom::object::ReadError) -> Self {
        DirError::Dicom(DicomError::Read(value))
    }
}

impl From<dicom::object::WriteError> for DirError {
    fn from(value: dicom::object::WriteError) -> Self {
        DirError::Dicom(DicomError::Write(value))
    }
}

impl From<dicom::object::meta::Error> for DirError {
    fn from(value: dicom::object::meta::Error) -> Self {
        DirError::Dicom(DicomError::Meta(value))
    }
}

pub type Result<T> = std::result::Result<T, DirError>;

/// Attach a human-readable step description to any error convertible into [`DirError`].
pub trait Context {
    type V;
    fn context<C>(self, context: C) -> Result<Self::V>
    where
        String: From<C>;
}

impl<T, E> Context for std::result::Result<T, E>
where
    DirError: From<E>,
{
    type V = T;

    fn context<C>(self, context: C) -> Result<Self::V>
    where
        String: From<C>,
    {
        self.map_err(|e| DirError::from(e).context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_the_inner_kind() {
        let err = DirError::CorruptedData("bad offsets".into()).context("reading DICOMDIR");
        assert_eq!(err.kind(), ErrorKind::CorruptedData);
        assert!(err.to_string().contains("when reading DICOMDIR"));
    }
}
