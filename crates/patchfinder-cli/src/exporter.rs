use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use patchfinder_core::SwitchReport;

use crate::render::{disconnected_table, lowest_usage_line, poe_table};

const BANNER_WIDTH: usize = 103;

pub(crate) fn export_file_name(hostname: &str) -> String {
    let stem: String = hostname
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "switch.txt".to_string()
    } else {
        format!("{stem}.txt")
    }
}

pub(crate) fn render_export(report: &SwitchReport) -> String {
    let rule = "-".repeat(BANNER_WIDTH);
    let mut out = String::new();
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("PATCHFINDER RESULTS on hostname {}\n", report.hostname));
    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("Switch IP: {}\n", report.host));
    out.push_str(&format!("Switch hostname: {}\n", report.hostname));
    out.push_str(&format!("Switch uptime: {}\n", report.uptime));
    out.push_str(&format!("Generated: {}\n\n", report.generated_at.to_rfc3339()));

    out.push_str("Not-connect Interfaces\n");
    out.push_str(&disconnected_table(report, false));
    out.push_str("\n\nPoE Details\n");
    match poe_table(report, false) {
        Some(table) => out.push_str(&table),
        None => out.push_str("unavailable"),
    }
    out.push_str(&format!("\n\nLowest used interface: {}\n", lowest_usage_line(report)));
    out
}

/// Writes `<hostname>.txt` into `out_dir` and returns its path.
pub fn export_report(report: &SwitchReport, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = out_dir.join(export_file_name(&report.hostname));

    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(render_export(report).as_bytes())?;
    writer.flush()?;

    Ok(path)
}
