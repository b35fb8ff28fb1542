//! Interactive SSH shell session against a switch CLI

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use ssh2::{Channel, Session};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use switchmap_core::{Address, Credentials};

use crate::error::SshError;

/// Transport settings shared by all sessions of one crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshSettings {
    /// SSH port on the switches
    #[serde(default = "default_port")]
    pub port: u16,
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// How long the shell must stay silent before a command's output
    /// is considered complete, in milliseconds. Commands that print
    /// nothing at all wait twice this before returning empty.
    #[serde(default = "default_quiet_period")]
    pub quiet_period_ms: u64,
    /// Upper bound on waiting for one command's output, in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            quiet_period_ms: default_quiet_period(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_quiet_period() -> u64 {
    800
}

fn default_command_timeout() -> u64 {
    10
}

struct ShellInner {
    // Session must outlive the channel; both live here together
    session: Session,
    channel: Channel,
}

/// One authenticated interactive shell on a switch
///
/// The blocking ssh2 calls run on the tokio blocking pool; the session
/// itself is never shared between crawl nodes.
pub struct ShellSession {
    address: Address,
    inner: Arc<Mutex<ShellInner>>,
    quiet_period: Duration,
    command_timeout: Duration,
}

impl ShellSession {
    /// Connect, authenticate with a password, and open a shell channel
    pub async fn connect(
        address: &Address,
        credentials: &Credentials,
        settings: &SshSettings,
    ) -> Result<Self, SshError> {
        let host = address.as_str().to_string();
        let creds = credentials.clone();
        let opts = settings.clone();

        let inner = tokio::task::spawn_blocking(move || connect_blocking(&host, &creds, &opts))
            .await??;

        debug!(addr = %address, "Shell session established");

        Ok(Self {
            address: address.clone(),
            inner: Arc::new(Mutex::new(inner)),
            quiet_period: Duration::from_millis(settings.quiet_period_ms),
            command_timeout: Duration::from_secs(settings.command_timeout_secs),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Send one command line and collect everything the shell prints
    /// until it goes quiet
    pub async fn send_command(&self, command: &str) -> Result<String, SshError> {
        let inner = Arc::clone(&self.inner);
        let line = command.to_string();
        let quiet = self.quiet_period;
        let timeout = self.command_timeout;
        let addr = self.address.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = inner.blocking_lock();
            let output = send_command_blocking(&mut guard, &line, quiet, timeout)?;
            trace!(addr = %addr, command = %line, bytes = output.len(), "Shell command completed");
            Ok(output)
        })
        .await?
    }

    /// Drain whatever the shell printed on login (banner, prompt)
    pub async fn drain_banner(&self) -> Result<String, SshError> {
        self.send_command("").await
    }

    /// Close the shell channel. Errors on teardown are ignored; the
    /// device may have dropped the link already.
    pub async fn close(self) {
        let inner = Arc::clone(&self.inner);
        let addr = self.address.clone();
        let _ = tokio::task::spawn_blocking(move || {
            let mut guard = inner.blocking_lock();
            guard.session.set_blocking(true);
            let _ = guard.channel.send_eof();
            let _ = guard.channel.close();
            let _ = guard.channel.wait_close();
            debug!(addr = %addr, "Shell session closed");
        })
        .await;
    }
}

fn connect_blocking(
    host: &str,
    credentials: &Credentials,
    settings: &SshSettings,
) -> Result<ShellInner, SshError> {
    let target = format!("{}:{}", host, settings.port);
    let sockaddr = target
        .to_socket_addrs()
        .map_err(|_| SshError::Resolve(target.clone()))?
        .next()
        .ok_or_else(|| SshError::Resolve(target.clone()))?;

    let tcp = TcpStream::connect_timeout(
        &sockaddr,
        Duration::from_secs(settings.connect_timeout_secs),
    )
    .map_err(|source| SshError::Connect {
        addr: target.clone(),
        source,
    })?;

    let mut session = Session::new().map_err(SshError::Handshake)?;
    session.set_tcp_stream(tcp);
    session.handshake().map_err(SshError::Handshake)?;

    session
        .userauth_password(&credentials.username, &credentials.password)
        .map_err(|_| SshError::AuthRejected {
            user: credentials.username.clone(),
        })?;
    if !session.authenticated() {
        return Err(SshError::AuthRejected {
            user: credentials.username.clone(),
        });
    }

    // Switch CLIs want a pty; exec channels get refused or answer
    // with an empty prompt
    let mut channel = session.channel_session().map_err(SshError::Channel)?;
    channel
        .request_pty("vt100", None, None)
        .map_err(SshError::Channel)?;
    channel.shell().map_err(SshError::Channel)?;

    Ok(ShellInner { session, channel })
}

fn send_command_blocking(
    inner: &mut ShellInner,
    command: &str,
    quiet_period: Duration,
    timeout: Duration,
) -> Result<String, SshError> {
    inner.session.set_blocking(true);
    inner
        .channel
        .write_all(format!("{}\n", command).as_bytes())
        .map_err(SshError::Write)?;
    inner.channel.flush().map_err(SshError::Write)?;

    // Non-blocking drain: collect until the channel stays quiet for
    // the configured period or the overall deadline passes
    inner.session.set_blocking(false);

    let mut output = String::new();
    let mut buf = [0u8; 4096];
    let deadline = Instant::now() + timeout;
    let mut last_data = Instant::now();

    loop {
        match inner.channel.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                output.push_str(&String::from_utf8_lossy(&buf[..n]));
                last_data = Instant::now();
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if output_settled(last_data.elapsed(), quiet_period, !output.is_empty()) {
                    break;
                }
                if Instant::now() >= deadline {
                    break;
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(SshError::Read(e)),
        }

        if Instant::now() >= deadline {
            break;
        }
    }

    Ok(output)
}

/// Whether a command's output can be considered complete after a
/// quiet stretch. Commands that print nothing get twice the window so
/// a slow first byte is not mistaken for silence, but never stall
/// until the full command timeout.
fn output_settled(quiet_for: Duration, quiet_period: Duration, have_output: bool) -> bool {
    if have_output {
        quiet_for >= quiet_period
    } else {
        quiet_for >= quiet_period * 2
    }
}
