use std::path::Path;

use anyhow::Result;
use sha2::{Digest, Sha224};

use crate::SyncError;
use crate::remote::RemoteStore;

/// Why an upload was performed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadReason {
    /// no remote copy existed
    New,
    /// remote copy existed with a different digest
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// remote digest already matched; nothing transferred, local file kept
    UpToDate,
    /// uploaded, digest verified, local file removed
    Uploaded { reason: UploadReason },
    /// uploaded but the re-read digests differ; local file kept for a
    /// later attempt
    VerifyMismatch { local_digest: String, remote_digest: String },
}

pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha224::digest(data))
}

/// Progress line naming both endpoints of the copy.
pub fn copying_line(local: &Path, remote: &str) -> String {
    format!("Copying {} to {}", local.display(), remote)
}

/// Uploads `local_path` to `remote_path` unless the remote copy already has
/// the same SHA-224 digest, then verifies the upload by re-reading both
/// sides. The local file is deleted only after the post-upload digests
/// match; on any other outcome it stays on disk.
///
/// Whole-file buffering: calibration frames are single CCD exposures, a few
/// MiB at most.
pub fn sync_file(
    store: &mut dyn RemoteStore,
    local_path: &Path,
    remote_path: &str,
) -> Result<SyncOutcome> {
    if !local_path.exists() {
        return Err(SyncError::MissingLocalSource(local_path.to_path_buf()).into());
    }

    let remote_present = store
        .exists(remote_path)
        .map_err(|e| SyncError::RemoteStatFailed(remote_path.to_string(), e))?;

    let reason = if remote_present {
        let local_digest = digest_hex(&std::fs::read(local_path)?);
        let remote_data = store
            .read(remote_path)
            .map_err(|e| SyncError::RemoteReadFailed(remote_path.to_string(), e))?;
        let remote_digest = digest_hex(&remote_data);
        tracing::debug!(%local_digest, %remote_digest, "pre-transfer digest compare");
        if local_digest == remote_digest {
            return Ok(SyncOutcome::UpToDate);
        }
        UploadReason::Changed
    } else {
        UploadReason::New
    };

    let local_data = std::fs::read(local_path)?;
    store
        .write(remote_path, &local_data)
        .map_err(|e| SyncError::RemoteWriteFailed(remote_path.to_string(), e))?;

    // Verify against a fresh read of both sides, not the buffers we already
    // hold; a short write or concurrent local change must fail the check.
    let local_digest = digest_hex(&std::fs::read(local_path)?);
    let remote_data = store
        .read(remote_path)
        .map_err(|e| SyncError::RemoteReadFailed(remote_path.to_string(), e))?;
    let remote_digest = digest_hex(&remote_data);
    tracing::debug!(%local_digest, %remote_digest, "post-upload digest compare");

    if local_digest == remote_digest {
        std::fs::remove_file(local_path)?;
        Ok(SyncOutcome::Uploaded { reason })
    } else {
        Ok(SyncOutcome::VerifyMismatch { local_digest, remote_digest })
    }
}
