pub mod capture;
pub mod config;
pub mod normalize;
pub mod poe;
pub mod poller;
pub mod ranking;
pub mod report;
pub mod session;
pub mod ssh;
pub mod transport;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod ranking_tests;

pub use capture::CaptureTransport;
pub use config::PollConfig;
pub use normalize::{InterfaceRecord, PortStatus, StatsRecord, StatusRecord};
pub use poe::{PoeLayout, PoeRow, PoeStatus};
pub use poller::{collect, DeviceSnapshot, PollError, Poller};
pub use ranking::{LowestUsage, UsageRanking};
pub use report::{DisconnectedPort, ReportNotice, SwitchReport};
pub use session::{SessionError, SessionManager, SessionState};
pub use ssh::SshTransport;
pub use transport::{Credentials, DeviceTarget, DeviceTransport, TransportError};
