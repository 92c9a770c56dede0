//! External control surface for a running overlay
//!
//! Controls (scale toggle, speed slider, quit) arrive as newline-delimited
//! JSON over a Unix socket. The listener is fully non-blocking and is
//! polled once per render-loop pass, so control changes land between ticks
//! and never mid-frame.

use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default Unix socket path for overlay control
pub const DEFAULT_SOCKET_PATH: &str = "/run/user/$UID/sonograph/control.sock";

/// Control socket error types
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("control socket I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("control message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Messages sent from external controls to the overlay
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlMessage {
    /// Flip between linear and logarithmic frequency scales
    Scale,
    /// Speed slider position, 1 (slow) to 10 (fast)
    Speed { value: u32 },
    /// Shut the overlay down
    Quit,
}

/// Expand `$UID` in a socket path to the current user id.
pub fn resolve_socket_path(path: &str) -> PathBuf {
    let uid = std::env::var("UID").unwrap_or_else(|_| {
        // Fallback: use nix to get actual UID
        nix::unistd::getuid().to_string()
    });
    PathBuf::from(path.replace("$UID", &uid))
}

/// Non-blocking listener side of the control socket.
pub struct ControlListener {
    path: PathBuf,
    listener: UnixListener,
    clients: Vec<ControlClient>,
}

struct ControlClient {
    stream: UnixStream,
    pending: Vec<u8>,
}

impl ControlListener {
    pub fn bind(path: &Path) -> Result<Self, ControlError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // A stale socket file from a previous run would make bind fail.
        let _ = std::fs::remove_file(path);

        let listener = UnixListener::bind(path)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            path: path.to_path_buf(),
            listener,
            clients: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept pending connections and drain complete messages, without ever
    /// blocking. Malformed lines are logged and skipped; hung-up clients
    /// are dropped.
    pub fn poll(&mut self) -> Vec<ControlMessage> {
        loop {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    if stream.set_nonblocking(true).is_ok() {
                        self.clients.push(ControlClient {
                            stream,
                            pending: Vec::new(),
                        });
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    eprintln!("control: accept failed: {}", e);
                    break;
                }
            }
        }

        let mut messages = Vec::new();
        self.clients.retain_mut(|client| client.drain(&mut messages));
        messages
    }
}

impl Drop for ControlListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl ControlClient {
    /// Read whatever is available; returns false once the peer hung up.
    fn drain(&mut self, messages: &mut Vec<ControlMessage>) -> bool {
        let mut chunk = [0u8; 512];
        let alive = loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => break false,
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break true,
                Err(e) => {
                    eprintln!("control: read failed: {}", e);
                    break false;
                }
            }
        };

        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(message) => messages.push(message),
                Err(e) => eprintln!("control: ignoring malformed message: {}", e),
            }
        }

        alive
    }
}

/// Send one control message to a running overlay.
pub fn send_message(path: &Path, message: &ControlMessage) -> Result<(), ControlError> {
    let mut stream = UnixStream::connect(path)?;
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    stream.write_all(line.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_messages_round_trip_as_tagged_json() {
        let json = serde_json::to_string(&ControlMessage::Speed { value: 3 }).unwrap();
        assert_eq!(json, r#"{"type":"speed","value":3}"#);

        let parsed: ControlMessage = serde_json::from_str(r#"{"type":"scale"}"#).unwrap();
        assert_eq!(parsed, ControlMessage::Scale);

        let parsed: ControlMessage = serde_json::from_str(r#"{"type":"quit"}"#).unwrap();
        assert_eq!(parsed, ControlMessage::Quit);
    }

    #[test]
    fn test_uid_placeholder_is_expanded() {
        let path = resolve_socket_path(DEFAULT_SOCKET_PATH);
        assert!(!path.to_string_lossy().contains("$UID"));
    }

    #[test]
    fn test_listener_receives_sent_messages() {
        let path = std::env::temp_dir().join(format!("sonograph-ctl-test-{}.sock", std::process::id()));
        let mut listener = ControlListener::bind(&path).unwrap();

        send_message(&path, &ControlMessage::Speed { value: 7 }).unwrap();
        send_message(&path, &ControlMessage::Scale).unwrap();

        let mut received = Vec::new();
        for _ in 0..50 {
            received.extend(listener.poll());
            if received.len() >= 2 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(
            received,
            vec![ControlMessage::Speed { value: 7 }, ControlMessage::Scale]
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let path = std::env::temp_dir().join(format!("sonograph-ctl-bad-{}.sock", std::process::id()));
        let mut listener = ControlListener::bind(&path).unwrap();

        let mut stream = UnixStream::connect(&path).unwrap();
        stream.write_all(b"not json\n{\"type\":\"quit\"}\n").unwrap();

        let mut received = Vec::new();
        for _ in 0..50 {
            received.extend(listener.poll());
            if !received.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(received, vec![ControlMessage::Quit]);
    }
}
