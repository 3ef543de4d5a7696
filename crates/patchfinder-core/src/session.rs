//! Process-wide device session for the HTTP API. At most one switch session
//! is live at a time; a request that arrives while another call holds the
//! session is turned away instead of replacing it.

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::poller::{collect, PollError};
use crate::report::SwitchReport;
use crate::transport::{DeviceTarget, DeviceTransport};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("another device call is in progress")]
    Busy,
    #[error(transparent)]
    Poll(#[from] PollError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active(String),
    Busy,
}

struct ActiveSession<T> {
    host: String,
    transport: T,
}

type TransportFactory<T> = Box<dyn Fn() -> T + Send + Sync>;

pub struct SessionManager<T: DeviceTransport> {
    factory: TransportFactory<T>,
    slot: Mutex<Option<ActiveSession<T>>>,
}

impl<T: DeviceTransport> SessionManager<T> {
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            slot: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SessionState {
        match self.slot.try_lock() {
            Ok(slot) => match slot.as_ref() {
                Some(active) => SessionState::Active(active.host.clone()),
                None => SessionState::Idle,
            },
            Err(_) => SessionState::Busy,
        }
    }

    /// Opens a session to `target` and collects its report. An idle session
    /// to a previous switch is closed first; the new one stays open until
    /// [`SessionManager::disconnect`].
    pub async fn connect(&self, target: &DeviceTarget) -> Result<SwitchReport, SessionError> {
        let mut slot = self.slot.try_lock().map_err(|_| SessionError::Busy)?;

        if let Some(mut previous) = slot.take() {
            info!(host = %previous.host, "closing previous session");
            if let Err(err) = previous.transport.disconnect().await {
                warn!(host = %previous.host, error = %err, "failed to close previous session");
            }
        }

        let mut transport = (self.factory)();
        transport.connect(target).await.map_err(PollError::from)?;

        match collect(&mut transport).await {
            Ok(snapshot) => {
                let report = snapshot.report(&target.host);
                *slot = Some(ActiveSession {
                    host: target.host.clone(),
                    transport,
                });
                Ok(report)
            }
            Err(err) => {
                if let Err(close_err) = transport.disconnect().await {
                    warn!(host = %target.host, error = %close_err, "failed to close session after error");
                }
                Err(err.into())
            }
        }
    }

    /// Closes the live session, if any, and returns the host it belonged to.
    pub async fn disconnect(&self) -> Result<Option<String>, SessionError> {
        let mut slot = self.slot.try_lock().map_err(|_| SessionError::Busy)?;
        let Some(mut active) = slot.take() else {
            return Ok(None);
        };
        active.transport.disconnect().await.map_err(PollError::from)?;
        info!(host = %active.host, "session closed");
        Ok(Some(active.host))
    }
}
