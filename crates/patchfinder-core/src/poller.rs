use std::collections::HashSet;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::normalize::{
    parse_hostname, parse_interface_stats, parse_interface_status, parse_uptime, InterfaceRecord,
};
use crate::poe::{parse_poe, PoeStatus};
use crate::ranking::{rank_usage, UsageRanking};
use crate::report::{assemble, ReportParts, SwitchReport};
use crate::transport::{DeviceTarget, DeviceTransport, TransportError};

pub const HOSTNAME_COMMAND: &str = "show running-config | include hostname";
pub const VERSION_COMMAND: &str = "show version";
pub const POE_COMMAND: &str = "show power inline";
pub const STATUS_COMMAND: &str = "show interfaces status";

pub fn stats_command(port: &str) -> String {
    format!("show interfaces {port}")
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("hostname not found in running configuration")]
    MissingHostname,
}

impl PollError {
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::Transport(TransportError::AuthenticationFailed))
    }

    pub fn is_connection_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::ConnectionTimeout))
    }
}

/// Everything gathered from one switch before it is shaped into a report.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub hostname: String,
    pub uptime: String,
    pub interfaces: Vec<InterfaceRecord>,
    pub ranking: UsageRanking,
    pub poe: PoeStatus,
}

impl DeviceSnapshot {
    pub fn report(&self, host: &str) -> SwitchReport {
        assemble(ReportParts {
            host,
            hostname: &self.hostname,
            uptime: &self.uptime,
            interfaces: &self.interfaces,
            ranking: &self.ranking,
            poe: &self.poe,
        })
    }
}

/// Runs the command sequence on an already open session.
pub async fn collect<T>(transport: &mut T) -> Result<DeviceSnapshot, PollError>
where
    T: DeviceTransport + ?Sized,
{
    let hostname = parse_hostname(&transport.send_command(HOSTNAME_COMMAND).await?)
        .ok_or(PollError::MissingHostname)?;

    let uptime = parse_uptime(&transport.send_command(VERSION_COMMAND).await?).unwrap_or_else(|| {
        warn!(%hostname, "uptime not found in show version output");
        String::new()
    });

    let poe = parse_poe(&transport.send_command(POE_COMMAND).await?);
    if poe.is_absent() {
        warn!(%hostname, "unable to fetch PoE details");
    }

    let statuses = parse_interface_status(&transport.send_command(STATUS_COMMAND).await?);
    let mut seen = HashSet::with_capacity(statuses.len());
    let mut interfaces = Vec::with_capacity(statuses.len());
    for status in statuses {
        if !seen.insert(status.port.clone()) {
            warn!(port = %status.port, "duplicate port in interface status, keeping first");
            continue;
        }
        let output = transport.send_command(&stats_command(&status.port)).await?;
        interfaces.push(InterfaceRecord::from_parts(status, parse_interface_stats(&output)));
    }

    let ranking = rank_usage(&interfaces);
    if ranking.lowest.is_none() {
        warn!(%hostname, "no disconnected interface has usable usage data");
    }

    Ok(DeviceSnapshot {
        hostname,
        uptime,
        interfaces,
        ranking,
        poe,
    })
}

pub struct Poller<D: DeviceTransport> {
    transport: D,
}

impl<D: DeviceTransport> Poller<D> {
    pub fn new(transport: D) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &D {
        &self.transport
    }

    /// Connects, collects and disconnects. The session is closed on every
    /// path, including when collection fails part way.
    pub async fn poll(&mut self, target: &DeviceTarget) -> Result<SwitchReport, PollError> {
        let started = Instant::now();
        self.transport.connect(target).await?;

        let collected = collect(&mut self.transport).await;

        if let Err(err) = self.transport.disconnect().await {
            warn!(host = %target.host, error = %err, "failed to close session cleanly");
        }

        let snapshot = collected?;
        info!(
            host = %target.host,
            hostname = %snapshot.hostname,
            interfaces = snapshot.interfaces.len(),
            elapsed_ms = %started.elapsed().as_millis(),
            "poll complete"
        );
        Ok(snapshot.report(&target.host))
    }

    /// Polls each target in turn. A failed device is reported and skipped.
    pub async fn poll_many(
        &mut self,
        targets: &[DeviceTarget],
    ) -> Vec<(String, Result<SwitchReport, PollError>)> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let result = self.poll(target).await;
            if let Err(err) = &result {
                warn!(host = %target.host, error = %err, "poll failed");
            }
            results.push((target.host.clone(), result));
        }
        results
    }
}
