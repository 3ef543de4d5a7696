//! Turns raw Cisco IOS command output into structured interface records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operational state reported in the `Status` column of `show interfaces status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PortStatus {
    Connected,
    NotConnect,
    Other(String),
}

impl PortStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connected => "connected",
            Self::NotConnect => "notconnect",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_notconnect(&self) -> bool {
        matches!(self, Self::NotConnect)
    }
}

impl From<&str> for PortStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "connected" => Self::Connected,
            "notconnect" => Self::NotConnect,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PortStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<PortStatus> for String {
    fn from(status: PortStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `show interfaces status`.
///
/// Different template generations name the VLAN column either `vlan` or
/// `vlan_id`; both are accepted so captured structured records deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub port: String,
    #[serde(default)]
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub vlan: Option<String>,
    #[serde(default)]
    pub vlan_id: Option<String>,
}

/// Counters pulled from `show interfaces <port>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub input_packets: String,
    pub output_packets: String,
    pub last_input: String,
}

/// A switchport as seen during one poll. Packet counts keep their raw text;
/// the ranking engine decides whether they are numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub port: String,
    pub status: PortStatus,
    pub description: Option<String>,
    pub vlan: Option<String>,
    pub last_input: String,
    pub input_packets: String,
    pub output_packets: String,
}

impl InterfaceRecord {
    pub fn from_parts(status: StatusRecord, stats: StatsRecord) -> Self {
        Self {
            port: status.port,
            status: PortStatus::from(status.status.as_str()),
            description: non_empty(status.name),
            vlan: reconcile_vlan(status.vlan, status.vlan_id),
            last_input: stats.last_input,
            input_packets: stats.input_packets,
            output_packets: stats.output_packets,
        }
    }
}

pub fn reconcile_vlan(primary: Option<String>, secondary: Option<String>) -> Option<String> {
    primary.and_then(non_empty).or_else(|| secondary.and_then(non_empty))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Output of `show running-config | include hostname`.
pub fn parse_hostname(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some("hostname"), Some(name)) => Some(name.to_string()),
            _ => None,
        }
    })
}

/// Output of `show version`; returns the text after `uptime is`.
pub fn parse_uptime(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.split_once(" uptime is ")
            .map(|(_, uptime)| uptime.trim().to_string())
            .filter(|uptime| !uptime.is_empty())
    })
}

struct StatusColumns {
    name: usize,
    status: usize,
    vlan: usize,
    duplex: Option<usize>,
}

impl StatusColumns {
    fn from_header(line: &str) -> Option<Self> {
        if !line.trim_start().starts_with("Port") {
            return None;
        }
        let name = line.find("Name")?;
        let status = line.find("Status")?;
        let vlan = line.find("Vlan")?;
        if !(name < status && status < vlan) {
            return None;
        }
        Some(Self {
            name,
            status,
            vlan,
            duplex: line.find("Duplex"),
        })
    }
}

fn column(line: &str, start: usize, end: Option<usize>) -> &str {
    let end = end.unwrap_or(line.len()).min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).map(str::trim).unwrap_or_default()
}

/// Output of `show interfaces status`. Columns are located from the header
/// line, since the `Name` column may contain spaces or be blank.
pub fn parse_interface_status(output: &str) -> Vec<StatusRecord> {
    let mut lines = output.lines();
    let Some(columns) = lines.by_ref().find_map(StatusColumns::from_header) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() || line.trim_start().starts_with("---") {
            continue;
        }
        let port = column(line, 0, Some(columns.name));
        let status = column(line, columns.status, Some(columns.vlan));
        if port.is_empty() || status.is_empty() || port.contains(char::is_whitespace) {
            continue;
        }
        let vlan = column(line, columns.vlan, columns.duplex);

        records.push(StatusRecord {
            port: port.to_string(),
            name: column(line, columns.name, Some(columns.status)).to_string(),
            status: status.to_string(),
            vlan: None,
            vlan_id: Some(vlan.to_string()),
        });
    }

    records
}

/// Output of `show interfaces <port>`. Missing lines leave the field empty,
/// which the ranking engine treats as unparsable.
pub fn parse_interface_stats(output: &str) -> StatsRecord {
    let mut stats = StatsRecord::default();

    for line in output.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Last input ") {
            stats.last_input = rest
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
        } else if line.contains(" packets input") {
            stats.input_packets = first_token(line);
        } else if line.contains(" packets output") {
            stats.output_packets = first_token(line);
        }
    }

    stats
}

fn first_token(line: &str) -> String {
    line.split_whitespace().next().unwrap_or_default().to_string()
}
