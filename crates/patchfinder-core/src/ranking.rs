//! Ranks disconnected switchports by how much traffic they have carried,
//! relative to the busiest interface on the same switch.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::normalize::InterfaceRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageParseError {
    #[error("non-numeric input packet count {0:?}")]
    InputPackets(String),
    #[error("non-numeric output packet count {0:?}")]
    OutputPackets(String),
    #[error("packet total does not fit in 64 bits")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowestUsage {
    pub interface: String,
    pub usage_percentage: f64,
}

/// Usage outcome for one disconnected port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortUsage {
    pub port: String,
    pub total: Result<u64, UsageParseError>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsageRanking {
    pub max_usage: Option<u64>,
    /// Disconnected ports in input order.
    pub disconnected: Vec<PortUsage>,
    /// Every port, of any status, whose counters did not parse.
    pub unparsable: Vec<String>,
    pub lowest: Option<LowestUsage>,
}

impl UsageRanking {
    pub fn percentage_for(&self, port: &str) -> Option<f64> {
        self.disconnected
            .iter()
            .find(|usage| usage.port == port)
            .and_then(|usage| usage.percentage)
    }
}

pub fn usage_total(input_packets: &str, output_packets: &str) -> Result<u64, UsageParseError> {
    let input = input_packets
        .trim()
        .parse::<u64>()
        .map_err(|_| UsageParseError::InputPackets(input_packets.to_string()))?;
    let output = output_packets
        .trim()
        .parse::<u64>()
        .map_err(|_| UsageParseError::OutputPackets(output_packets.to_string()))?;
    input.checked_add(output).ok_or(UsageParseError::Overflow)
}

pub fn record_usage(record: &InterfaceRecord) -> Result<u64, UsageParseError> {
    usage_total(&record.input_packets, &record.output_packets)
}

/// Largest parsable total across all records, regardless of status.
pub fn max_usage(records: &[InterfaceRecord]) -> Option<u64> {
    records.iter().filter_map(|r| record_usage(r).ok()).max()
}

pub fn usage_percentage(total: u64, max_usage: u64) -> Option<f64> {
    if max_usage == 0 {
        return None;
    }
    Some(round2(total as f64 / max_usage as f64 * 100.0))
}

/// Rounds the exact binary value to two decimals, exact halves to even.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

pub fn rank_usage(records: &[InterfaceRecord]) -> UsageRanking {
    let totals: Vec<(&InterfaceRecord, Result<u64, UsageParseError>)> =
        records.iter().map(|r| (r, record_usage(r))).collect();

    let mut unparsable = Vec::new();
    for (record, total) in &totals {
        if let Err(err) = total {
            warn!(port = %record.port, error = %err, "unable to calculate stats for interface, likely a management interface");
            unparsable.push(record.port.clone());
        }
    }

    let max = max_usage(records);

    let disconnected: Vec<PortUsage> = totals
        .into_iter()
        .filter(|(record, _)| record.status.is_notconnect())
        .map(|(record, total)| {
            let percentage = match (&total, max) {
                (Ok(t), Some(max)) => usage_percentage(*t, max),
                _ => None,
            };
            PortUsage {
                port: record.port.clone(),
                total,
                percentage,
            }
        })
        .collect();

    let mut candidates: Vec<(f64, &str)> = disconnected
        .iter()
        .filter_map(|u| u.percentage.map(|p| (p, u.port.as_str())))
        .collect();
    // stable sort keeps the first-seen port ahead on exact ties
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let lowest = candidates.first().map(|(percentage, port)| LowestUsage {
        interface: port.to_string(),
        usage_percentage: *percentage,
    });

    UsageRanking {
        max_usage: max,
        disconnected,
        unparsable,
        lowest,
    }
}
