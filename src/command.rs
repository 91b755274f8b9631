use std::io::Read;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::SyncError;
use crate::session::SshSession;

/// Token the processing script prints when it launches a job.
pub const START_MARKER: &str = "START";

/// How long a single blocking read may stall before we re-check the deadline.
const READ_SLICE: Duration = Duration::from_millis(1000);

const CHUNK_SIZE: usize = 1024;

/// Trigger command for the storage server. The trailing literal `last`
/// tells the script this was the final calibration frame of the batch.
pub fn processing_command(script: &str, night: i64, basename: &str, final_batch: bool) -> String {
    let mut cmd = format!("python {} {} {}", script, night, basename);
    if final_batch {
        cmd.push_str(" last");
    }
    cmd
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStatus {
    Started,
    NotStarted { marker_count: usize },
}

/// The script announces a successful launch by printing the marker exactly
/// once. Zero means it never got going; two or more means it launched
/// something unexpected, which operators want surfaced as a failure too.
pub fn launch_status(output: &str) -> LaunchStatus {
    let marker_count = output.matches(START_MARKER).count();
    if marker_count == 1 {
        LaunchStatus::Started
    } else {
        LaunchStatus::NotStarted { marker_count }
    }
}

/// Runs `cmd` on a fresh channel of the live connection and captures its
/// combined stdout+stderr until EOF. The deadline bounds the whole read
/// loop; a script that hangs surfaces as `CommandTimedOut` instead of
/// blocking the caller forever.
pub fn run_remote(sess: &SshSession, cmd: &str, timeout: Duration) -> Result<String> {
    sess.set_blocking_timeout(READ_SLICE);
    let res = run_remote_inner(sess, cmd, timeout);
    sess.set_blocking_timeout(Duration::ZERO);
    res
}

fn run_remote_inner(sess: &SshSession, cmd: &str, timeout: Duration) -> Result<String> {
    let mut channel = sess.channel_session()?;
    channel
        .handle_extended_data(ssh2::ExtendedData::Merge)
        .map_err(|e| SyncError::ChannelFailed(e.to_string()))?;
    channel.exec(cmd).map_err(|e| SyncError::ChannelFailed(e.to_string()))?;

    let out = capture_until_eof(&mut channel, timeout)?;
    let _ = channel.wait_close();
    tracing::debug!(bytes = out.len(), "remote command output captured");
    Ok(out)
}

/// Accumulates everything the reader produces until EOF, in fixed-size
/// chunks, giving up once the deadline passes. Stalled reads report
/// `TimedOut`/`WouldBlock` (libssh2 does, with a blocking timeout set) and
/// only count against the deadline, not as failures.
pub fn capture_until_eof(reader: &mut dyn Read, timeout: Duration) -> Result<String> {
    let deadline = Instant::now() + timeout;
    let mut out = String::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(out),
            Ok(n) => out.push_str(&String::from_utf8_lossy(&chunk[..n])),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(SyncError::ChannelFailed(e.to_string()).into()),
        }
        if Instant::now() >= deadline {
            return Err(SyncError::CommandTimedOut(timeout.as_secs()).into());
        }
    }
}
