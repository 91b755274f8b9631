/// Structured errors for the sync-and-trigger pipeline. Variants carry the
/// path or address they refer to so callers can report them programmatically
/// instead of via ad-hoc formatted strings.
#[derive(Debug, Clone)]
pub enum SyncError {
    /// `readkeyword` could not be spawned or exited non-zero
    KeywordReadFailed(std::path::PathBuf, String),
    /// keyword output was not a parsable number
    KeywordNotNumeric(String),
    /// keyword value was negative or non-finite
    KeywordOutOfRange(f64),
    /// local source file missing before transfer
    MissingLocalSource(std::path::PathBuf),
    // SSH / connection related
    SshNoAddress(String),
    SshSessionCreateFailed(String),
    SshHandshakeFailed(String),
    SshAuthFailed(String),
    SftpCreateFailed(String),
    /// remote mkdir refused for a reason other than "already exists"
    MkdirDenied(String, String),
    /// remote stat failed with something other than "no such file"
    RemoteStatFailed(String, String),
    RemoteReadFailed(String, String),
    RemoteWriteFailed(String, String),
    /// remote command produced no EOF before the deadline
    CommandTimedOut(u64),
    ChannelFailed(String),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SyncError::*;
        match self {
            KeywordReadFailed(p, msg) => {
                write!(f, "failed to read date keyword from {}: {}", p.display(), msg)
            }
            KeywordNotNumeric(s) => write!(f, "date keyword is not numeric: '{}'", s),
            KeywordOutOfRange(v) => write!(f, "date keyword out of range: {}", v),
            MissingLocalSource(p) => write!(f, "local file not found: {}", p.display()),
            SshNoAddress(addr) => write!(f, "cannot resolve address: {}", addr),
            SshSessionCreateFailed(addr) => write!(f, "cannot create SSH session: {}", addr),
            SshHandshakeFailed(addr) => write!(f, "SSH handshake failed: {}", addr),
            SshAuthFailed(addr) => write!(f, "SSH key authentication failed: {}", addr),
            SftpCreateFailed(msg) => write!(f, "SFTP subsystem failed: {}", msg),
            MkdirDenied(path, msg) => {
                write!(f, "cannot create remote directory {}: {}", path, msg)
            }
            RemoteStatFailed(path, msg) => write!(f, "remote stat failed for {}: {}", path, msg),
            RemoteReadFailed(path, msg) => write!(f, "remote read failed for {}: {}", path, msg),
            RemoteWriteFailed(path, msg) => write!(f, "remote write failed for {}: {}", path, msg),
            CommandTimedOut(secs) => {
                write!(f, "remote command produced no EOF within {}s", secs)
            }
            ChannelFailed(msg) => write!(f, "SSH channel error: {}", msg),
        }
    }
}

impl std::error::Error for SyncError {}
