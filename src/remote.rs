use std::io::{Read, Write};
use std::path::Path;

use ssh2::{ErrorCode, OpenFlags, OpenType};

// SFTP status codes (draft-ietf-secsh-filexfer-02) we classify on.
const SFTP_NO_SUCH_FILE: i32 = 2;
const SFTP_PERMISSION_DENIED: i32 = 3;
const SFTP_FILE_ALREADY_EXISTS: i32 = 11;

/// Outcome of a remote mkdir. "Already exists" is an expected, tolerated
/// case; a denial or anything else must not be mistaken for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MkdirOutcome {
    Created,
    AlreadyExists,
    Denied(String),
    Other(String),
}

/// Remote-side operations the pipeline needs, abstracted so tests can run
/// against an in-memory store instead of a live SFTP channel.
pub trait RemoteStore {
    /// `Ok(false)` means the path genuinely does not exist; any other stat
    /// failure is an error, not absence.
    fn exists(&self, path: &str) -> Result<bool, String>;
    fn mkdir(&mut self, path: &str) -> MkdirOutcome;
    fn read(&self, path: &str) -> Result<Vec<u8>, String>;
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), String>;
}

/// `RemoteStore` over a live `ssh2::Sftp` channel.
pub struct Ssh2Remote(pub ssh2::Sftp);

fn sftp_status(e: &ssh2::Error) -> Option<i32> {
    match e.code() {
        ErrorCode::SFTP(code) => Some(code),
        ErrorCode::Session(_) => None,
    }
}

impl RemoteStore for Ssh2Remote {
    fn exists(&self, path: &str) -> Result<bool, String> {
        match self.0.stat(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(e) if sftp_status(&e) == Some(SFTP_NO_SUCH_FILE) => Ok(false),
            Err(e) => Err(e.to_string()),
        }
    }

    fn mkdir(&mut self, path: &str) -> MkdirOutcome {
        match self.0.mkdir(Path::new(path), 0o755) {
            Ok(()) => MkdirOutcome::Created,
            Err(e) => match sftp_status(&e) {
                Some(SFTP_FILE_ALREADY_EXISTS) => MkdirOutcome::AlreadyExists,
                Some(SFTP_PERMISSION_DENIED) => MkdirOutcome::Denied(e.to_string()),
                // Many servers answer a mkdir on an existing path with the
                // generic FAILURE status; a stat settles which case it was.
                _ => match self.0.stat(Path::new(path)) {
                    Ok(st) if st.is_dir() => MkdirOutcome::AlreadyExists,
                    _ => MkdirOutcome::Other(e.to_string()),
                },
            },
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, String> {
        let mut f = self.0.open(Path::new(path)).map_err(|e| e.to_string())?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf).map_err(|e| e.to_string())?;
        Ok(buf)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), String> {
        let flags = OpenFlags::CREATE | OpenFlags::WRITE | OpenFlags::TRUNCATE;
        let mut f = self
            .0
            .open_mode(Path::new(path), flags, 0o644, OpenType::File)
            .map_err(|e| e.to_string())?;
        f.write_all(data).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Ensures the night directory exists, reporting whether this run created
/// it. Denials and unclassified failures propagate instead of being read as
/// "already exists".
pub fn ensure_dir(store: &mut dyn RemoteStore, path: &str) -> anyhow::Result<MkdirOutcome> {
    match store.mkdir(path) {
        outcome @ (MkdirOutcome::Created | MkdirOutcome::AlreadyExists) => Ok(outcome),
        MkdirOutcome::Denied(msg) | MkdirOutcome::Other(msg) => {
            Err(crate::SyncError::MkdirDenied(path.to_string(), msg).into())
        }
    }
}
