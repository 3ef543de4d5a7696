use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::transport::{DeviceTarget, DeviceTransport, TransportError};

/// Replays command output captured from a real switch, one file per command.
pub struct CaptureTransport {
    capture_dir: PathBuf,
    connected: bool,
}

impl CaptureTransport {
    pub fn new(capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            capture_dir: capture_dir.into(),
            connected: false,
        }
    }
}

/// `show interfaces Gi1/0/1` -> `show_interfaces_Gi1_0_1.txt`
pub fn capture_file_name(command: &str) -> String {
    let mut slug = String::with_capacity(command.len());
    for c in command.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    format!("{}.txt", slug.trim_matches('_'))
}

#[async_trait]
impl DeviceTransport for CaptureTransport {
    async fn connect(&mut self, target: &DeviceTarget) -> Result<(), TransportError> {
        if !self.capture_dir.is_dir() {
            return Err(TransportError::Io(format!(
                "capture directory {} not found",
                self.capture_dir.display()
            )));
        }
        info!(host = %target.host, dir = %self.capture_dir.display(), "replaying captured session");
        self.connected = true;
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        let path = self.capture_dir.join(capture_file_name(command));
        debug!(%command, path = %path.display(), "reading captured output");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| TransportError::Command {
                command: command.to_string(),
                reason: format!("{}: {err}", path.display()),
            })
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
