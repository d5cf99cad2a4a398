//! Struct archiving functionality
//!
//! Archives are CSV files stored under the session's archive root. Each call
//! to [`Archiver::serialise`] appends one row.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::Path;
use std::fs::{File, OpenOptions};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive file: {0}")]
    FlushError(std::io::Error),

    #[error("The archiver has not been initialised")]
    NotInitialised
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    ///
    /// Any missing parent directories are created and an existing file is
    /// truncated.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::CreateError)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(session_path)
            .map_err(ArchiveError::CreateError)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(
        &mut self, record: T
    ) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::WriteError)?;
                w.flush().map_err(ArchiveError::FlushError)
            },
            None => Err(ArchiveError::NotInitialised)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        tick: u64,
        speed: f64
    }

    #[test]
    fn test_archive_rows() {
        let root = std::env::temp_dir().join("tito_util_archive_test");
        let session = Session::in_dir("archive", &root).unwrap();

        let mut arch = Archiver::from_path(&session, "sub/rows.csv").unwrap();
        arch.serialise(Row { tick: 0, speed: 0.5 }).unwrap();
        arch.serialise(Row { tick: 1, speed: -0.25 }).unwrap();

        let contents = std::fs::read_to_string(
            session.arch_root.join("sub/rows.csv")
        ).unwrap();
        assert_eq!(contents, "tick,speed\n0,0.5\n1,-0.25\n");
    }

    #[test]
    fn test_uninitialised() {
        let mut arch = Archiver::default();
        assert!(matches!(
            arch.serialise(Row { tick: 0, speed: 0.0 }),
            Err(ArchiveError::NotInitialised)
        ));
    }
}
