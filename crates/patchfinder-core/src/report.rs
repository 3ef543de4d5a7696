use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::InterfaceRecord;
use crate::poe::{PoeRow, PoeStatus};
use crate::ranking::{LowestUsage, UsageRanking};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisconnectedPort {
    pub port: String,
    pub description: Option<String>,
    pub vlan: Option<String>,
    pub last_input: String,
    pub input_packets: String,
    pub output_packets: String,
    pub usage_percentage: Option<f64>,
}

/// Conditions the poll recovered from. They never fail a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportNotice {
    UnparsableInterfaceStats { port: String },
    UnavailablePoeData,
    NoUsableUsageData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchReport {
    pub host: String,
    pub hostname: String,
    pub uptime: String,
    pub generated_at: DateTime<Utc>,
    pub disconnected_ports: Vec<DisconnectedPort>,
    pub poe_status: Option<Vec<PoeRow>>,
    pub lowest_usage_interface: Option<LowestUsage>,
    #[serde(default)]
    pub notices: Vec<ReportNotice>,
}

pub struct ReportParts<'a> {
    pub host: &'a str,
    pub hostname: &'a str,
    pub uptime: &'a str,
    pub interfaces: &'a [InterfaceRecord],
    pub ranking: &'a UsageRanking,
    pub poe: &'a PoeStatus,
}

pub fn assemble(parts: ReportParts<'_>) -> SwitchReport {
    let disconnected_ports = parts
        .interfaces
        .iter()
        .filter(|record| record.status.is_notconnect())
        .map(|record| DisconnectedPort {
            port: record.port.clone(),
            description: record.description.clone(),
            vlan: record.vlan.clone(),
            last_input: record.last_input.clone(),
            input_packets: record.input_packets.clone(),
            output_packets: record.output_packets.clone(),
            usage_percentage: parts.ranking.percentage_for(&record.port),
        })
        .collect();

    let mut notices: Vec<ReportNotice> = parts
        .ranking
        .unparsable
        .iter()
        .map(|port| ReportNotice::UnparsableInterfaceStats { port: port.clone() })
        .collect();
    if parts.poe.is_absent() {
        notices.push(ReportNotice::UnavailablePoeData);
    }
    if parts.ranking.lowest.is_none() {
        notices.push(ReportNotice::NoUsableUsageData);
    }

    SwitchReport {
        host: parts.host.to_string(),
        hostname: parts.hostname.to_string(),
        uptime: parts.uptime.to_string(),
        generated_at: Utc::now(),
        disconnected_ports,
        poe_status: parts.poe.rows().map(<[PoeRow]>::to_vec),
        lowest_usage_interface: parts.ranking.lowest.clone(),
        notices,
    }
}
