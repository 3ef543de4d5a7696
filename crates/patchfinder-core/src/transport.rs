use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DeviceTarget {
    pub host: String,
    pub credentials: Credentials,
}

impl DeviceTarget {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid username or password")]
    AuthenticationFailed,
    #[error("connection timeout")]
    ConnectionTimeout,
    #[error("no open session")]
    NotConnected,
    #[error("timed out waiting for output of `{command}`")]
    CommandTimeout { command: String },
    #[error("command `{command}` failed: {reason}")]
    Command { command: String, reason: String },
    #[error("io error: {0}")]
    Io(String),
}

/// A command session to one switch. Commands run strictly one at a time.
#[async_trait]
pub trait DeviceTransport: Send {
    async fn connect(&mut self, target: &DeviceTarget) -> Result<(), TransportError>;
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError>;
    async fn disconnect(&mut self) -> Result<(), TransportError>;
    fn is_connected(&self) -> bool;
}
