use crossterm::style::Stylize;
use patchfinder_core::{PollError, SwitchReport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Highlight {
    None,
    Good,
    Bad,
}

struct Cell {
    text: String,
    highlight: Highlight,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlight: Highlight::None,
        }
    }

    fn styled(text: impl Into<String>, highlight: Highlight) -> Self {
        Self {
            text: text.into(),
            highlight,
        }
    }
}

/// `1.0` stays `1.0` rather than `1`, matching how the percentages read elsewhere.
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn render_table(headers: &[&str], rows: &[Vec<Cell>], color: bool) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.text.chars().count());
        }
    }

    let border = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{border}+");

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    let header_cells: Vec<String> = headers
        .iter()
        .zip(widths.iter().copied())
        .map(|(h, w)| {
            let padded = format!("{h:<w$}");
            if color {
                padded.bold().to_string()
            } else {
                padded
            }
        })
        .collect();
    out.push_str(&format!("| {} |\n", header_cells.join(" | ")));
    out.push_str(&border);
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, w)| {
                let padded = format!("{:<w$}", cell.text);
                match (color, cell.highlight) {
                    (true, Highlight::Good) => padded.green().to_string(),
                    (true, Highlight::Bad) => padded.red().to_string(),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out.push_str(&border);
    out
}

pub fn disconnected_table(report: &SwitchReport, color: bool) -> String {
    let rows: Vec<Vec<Cell>> = report
        .disconnected_ports
        .iter()
        .map(|port| {
            let usage = match port.usage_percentage {
                Some(p) if p == 0.0 => Cell::styled(format_percentage(p), Highlight::Good),
                Some(p) => Cell::plain(format_percentage(p)),
                None => Cell::plain("-"),
            };
            vec![
                Cell::plain(port.port.as_str()),
                Cell::plain(port.description.clone().unwrap_or_default()),
                Cell::plain(port.vlan.clone().unwrap_or_default()),
                Cell::plain(port.last_input.as_str()),
                Cell::plain(port.input_packets.as_str()),
                Cell::plain(port.output_packets.as_str()),
                usage,
            ]
        })
        .collect();

    render_table(
        &[
            "Port",
            "Port Description",
            "VLAN",
            "Last Input",
            "Input Packets",
            "Output Packets",
            "Percentage Use (%)",
        ],
        &rows,
        color,
    )
}

pub fn poe_table(report: &SwitchReport, color: bool) -> Option<String> {
    let rows: Vec<Vec<Cell>> = report
        .poe_status
        .as_ref()?
        .iter()
        .map(|row| {
            let free = if row.exhausted {
                Cell::styled(row.free.as_str(), Highlight::Bad)
            } else {
                Cell::plain(row.free.as_str())
            };
            vec![
                Cell::plain(row.switch_no.as_str()),
                Cell::plain(row.available.as_str()),
                Cell::plain(row.used.as_str()),
                free,
            ]
        })
        .collect();

    Some(render_table(&["Switch No.", "Available", "Used", "Free"], &rows, color))
}

pub fn lowest_usage_line(report: &SwitchReport) -> String {
    match &report.lowest_usage_interface {
        Some(lowest) => format!(
            "Interface {} has {}% the usage of the highest on the switch.",
            lowest.interface,
            format_percentage(lowest.usage_percentage)
        ),
        None => "No disconnected interface has usable traffic data.".to_string(),
    }
}

pub fn render_report(report: &SwitchReport, color: bool) -> String {
    let mut out = String::new();
    let connected = format!("[+] Connected to {}  ({})", report.host, report.hostname);
    out.push_str(&if color { connected.green().to_string() } else { connected });
    out.push_str("\n\n");
    out.push_str(&format!("Switch uptime: {}\n\n", report.uptime));

    out.push_str("Not-connect Switchports\n");
    out.push_str(&disconnected_table(report, color));
    out.push('\n');

    if let Some(table) = poe_table(report, color) {
        out.push_str("\nPoE Details\n");
        out.push_str(&table);
        out.push('\n');
    } else {
        out.push_str("\nPoE details unavailable for this switch.\n");
    }

    out.push('\n');
    out.push_str(&lowest_usage_line(report));
    out.push('\n');
    out
}

pub fn failure_line(host: &str, err: &PollError) -> String {
    match err {
        PollError::Transport(TransportError::AuthenticationFailed) => {
            format!("[-] Invalid username or password ({host}).")
        }
        PollError::Transport(TransportError::ConnectionTimeout) => {
            format!("[-] Connection timeout ({host}).")
        }
        other => format!("[-] Poll of {host} failed: {other}"),
    }
}
