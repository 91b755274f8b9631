use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::SyncError;
use crate::config::Config;

/// One authenticated SSH connection, shared by the directory-ensure,
/// transfer and trigger steps of a run. Dropping the handle disconnects the
/// transport, so teardown happens on the fault paths too.
pub struct SshSession {
    sess: ssh2::Session,
    addr: String,
}

fn create_tcp_connection(addr: &str) -> anyhow::Result<TcpStream> {
    let mut addrs = addr.to_socket_addrs()?;
    let sock = addrs
        .next()
        .ok_or_else(|| -> anyhow::Error { SyncError::SshNoAddress(addr.to_string()).into() })?;
    let tcp = TcpStream::connect_timeout(&sock, Duration::from_secs(10))?;
    let _ = tcp.set_read_timeout(Some(Duration::from_secs(30)));
    let _ = tcp.set_write_timeout(Some(Duration::from_secs(30)));
    Ok(tcp)
}

impl SshSession {
    /// Connects to the configured storage server and authenticates with the
    /// configured private-key identity. Key-only; there is no password path.
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let tcp = create_tcp_connection(&addr)?;
        let mut sess = ssh2::Session::new().map_err(|_| -> anyhow::Error {
            SyncError::SshSessionCreateFailed(addr.clone()).into()
        })?;
        sess.set_tcp_stream(tcp);
        sess.handshake().map_err(|_| -> anyhow::Error {
            SyncError::SshHandshakeFailed(addr.clone()).into()
        })?;

        let _ = sess.userauth_pubkey_file(
            &config.username,
            None,
            &config.private_key_path,
            None,
        );
        if sess.authenticated() {
            Ok(SshSession { sess, addr })
        } else {
            Err(SyncError::SshAuthFailed(addr).into())
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Derives the SFTP sub-channel from the live transport.
    pub fn sftp(&self) -> anyhow::Result<ssh2::Sftp> {
        self.sess
            .sftp()
            .map_err(|e| SyncError::SftpCreateFailed(e.to_string()).into())
    }

    pub fn channel_session(&self) -> anyhow::Result<ssh2::Channel> {
        self.sess
            .channel_session()
            .map_err(|e| SyncError::ChannelFailed(e.to_string()).into())
    }

    /// Bounds blocking libssh2 reads; 0 clears the bound.
    pub fn set_blocking_timeout(&self, timeout: Duration) {
        self.sess.set_timeout(timeout.as_millis() as u32);
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        tracing::debug!("disconnecting from {}", self.addr);
        let _ = self.sess.disconnect(None, "done", None);
    }
}
