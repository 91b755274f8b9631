use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use fitsync::remote::{MkdirOutcome, RemoteStore, ensure_dir};
use fitsync::transfer::{SyncOutcome, UploadReason, copying_line, digest_hex, sync_file};

/// In-memory stand-in for the SFTP side, with switches to simulate the
/// failure modes the pipeline must distinguish.
#[derive(Default)]
struct MockStore {
    files: HashMap<String, Vec<u8>>,
    dirs: Vec<String>,
    stat_error: Option<String>,
    mkdir_outcome_override: Option<MkdirOutcome>,
    corrupt_writes: bool,
}

impl RemoteStore for MockStore {
    fn exists(&self, path: &str) -> Result<bool, String> {
        if let Some(e) = &self.stat_error {
            return Err(e.clone());
        }
        Ok(self.files.contains_key(path))
    }

    fn mkdir(&mut self, path: &str) -> MkdirOutcome {
        if let Some(o) = &self.mkdir_outcome_override {
            return o.clone();
        }
        if self.dirs.iter().any(|d| d == path) {
            MkdirOutcome::AlreadyExists
        } else {
            self.dirs.push(path.to_string());
            MkdirOutcome::Created
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, String> {
        self.files.get(path).cloned().ok_or_else(|| format!("no such file: {}", path))
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), String> {
        let mut stored = data.to_vec();
        if self.corrupt_writes {
            stored.push(0xFF);
        }
        self.files.insert(path.to_string(), stored);
        Ok(())
    }
}

fn local_fixture(content: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("calib-0042.fts");
    let mut f = std::fs::File::create(&path).expect("create fixture");
    f.write_all(content).expect("write fixture");
    (dir, path)
}

#[test]
fn identical_content_skips_upload_and_keeps_local() {
    let content = b"SIMPLE  =                    T".to_vec();
    let (_dir, local) = local_fixture(&content);
    let mut store = MockStore::default();
    store.files.insert("/rawdata/2459123/calib-0042.fts".to_string(), content.clone());

    let outcome = sync_file(&mut store, &local, "/rawdata/2459123/calib-0042.fts").unwrap();
    assert_eq!(outcome, SyncOutcome::UpToDate);
    assert!(local.exists(), "local file must survive an up-to-date run");
    assert_eq!(store.files["/rawdata/2459123/calib-0042.fts"], content);
}

#[test]
fn absent_remote_uploads_verifies_and_removes_local() {
    let content = b"dark frame bytes".to_vec();
    let expected_digest = digest_hex(&content);
    let (_dir, local) = local_fixture(&content);
    let mut store = MockStore::default();

    let outcome = sync_file(&mut store, &local, "/rawdata/2459123/calib-0042.fts").unwrap();
    assert_eq!(outcome, SyncOutcome::Uploaded { reason: UploadReason::New });
    assert!(!local.exists(), "local file must be removed after a verified upload");
    assert_eq!(digest_hex(&store.files["/rawdata/2459123/calib-0042.fts"]), expected_digest);
}

#[test]
fn changed_remote_is_overwritten() {
    let content = b"new flat field".to_vec();
    let (_dir, local) = local_fixture(&content);
    let mut store = MockStore::default();
    store.files.insert("/rawdata/2459123/calib-0042.fts".to_string(), b"stale copy".to_vec());

    let outcome = sync_file(&mut store, &local, "/rawdata/2459123/calib-0042.fts").unwrap();
    assert_eq!(outcome, SyncOutcome::Uploaded { reason: UploadReason::Changed });
    assert!(!local.exists());
    assert_eq!(store.files["/rawdata/2459123/calib-0042.fts"], content);
}

#[test]
fn verify_mismatch_keeps_local_file() {
    let content = b"bias frame".to_vec();
    let (_dir, local) = local_fixture(&content);
    let mut store = MockStore { corrupt_writes: true, ..Default::default() };

    let outcome = sync_file(&mut store, &local, "/rawdata/2459123/calib-0042.fts").unwrap();
    match outcome {
        SyncOutcome::VerifyMismatch { local_digest, remote_digest } => {
            assert_ne!(local_digest, remote_digest);
        }
        other => panic!("expected VerifyMismatch, got {:?}", other),
    }
    assert!(local.exists(), "local file must be kept when verification fails");
}

#[test]
fn stat_error_propagates_instead_of_uploading() {
    let (_dir, local) = local_fixture(b"frame");
    let mut store =
        MockStore { stat_error: Some("connection reset".to_string()), ..Default::default() };

    let err = sync_file(&mut store, &local, "/rawdata/2459123/calib-0042.fts").unwrap_err();
    assert!(err.to_string().contains("remote stat failed"));
    assert!(store.files.is_empty(), "no upload may happen on an undecidable stat");
    assert!(local.exists());
}

#[test]
fn missing_local_file_is_an_error() {
    let mut store = MockStore::default();
    let err =
        sync_file(&mut store, std::path::Path::new("/nonexistent/frame.fts"), "/r/frame.fts")
            .unwrap_err();
    assert!(err.to_string().contains("local file not found"));
}

#[test]
fn copying_line_names_both_endpoints() {
    let line = copying_line(
        std::path::Path::new("/home/optjo/fits/calib-0042.fts"),
        "/mnt/storage/rawdata/2459123/calib-0042.fts",
    );
    assert_eq!(
        line,
        "Copying /home/optjo/fits/calib-0042.fts to /mnt/storage/rawdata/2459123/calib-0042.fts"
    );
}

#[test]
fn ensure_dir_tolerates_created_and_existing() {
    let mut store = MockStore::default();
    assert_eq!(ensure_dir(&mut store, "/rawdata/2459123").unwrap(), MkdirOutcome::Created);
    assert_eq!(ensure_dir(&mut store, "/rawdata/2459123").unwrap(), MkdirOutcome::AlreadyExists);
}

#[test]
fn ensure_dir_propagates_denial() {
    let mut store = MockStore {
        mkdir_outcome_override: Some(MkdirOutcome::Denied("permission denied".to_string())),
        ..Default::default()
    };
    let err = ensure_dir(&mut store, "/rawdata/2459123").unwrap_err();
    assert!(err.to_string().contains("cannot create remote directory"));
}

#[test]
fn ensure_dir_propagates_unclassified_failures() {
    let mut store = MockStore {
        mkdir_outcome_override: Some(MkdirOutcome::Other("parent missing".to_string())),
        ..Default::default()
    };
    assert!(ensure_dir(&mut store, "/rawdata/2459123/sub").is_err());
}
