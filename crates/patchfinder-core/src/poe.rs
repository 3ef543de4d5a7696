//! Parses `show power inline` output. Two layouts exist in the field: a
//! per-module budget table (stacks, modular chassis) and a single
//! `Available:/Used:/Remaining:` summary line (fixed-config access switches).

use serde::{Deserialize, Serialize};
use tracing::debug;

const TABLE_HEADER: &str = "Interface";
// Tokens before this index belong to the module table's column headers.
const FIRST_ROW_TOKEN: usize = 7;
const SYSTEM_TOTAL_LABEL: &str = "System Total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoeRow {
    pub switch_no: String,
    pub available: String,
    pub used: String,
    pub free: String,
    pub exhausted: bool,
}

impl PoeRow {
    pub fn new(
        switch_no: impl Into<String>,
        available: impl Into<String>,
        used: impl Into<String>,
        free: impl Into<String>,
    ) -> Self {
        let free = free.into();
        Self {
            switch_no: switch_no.into(),
            available: available.into(),
            used: used.into(),
            exhausted: is_exhausted(&free),
            free,
        }
    }
}

/// Literal comparison against the two spellings IOS prints for an empty budget.
pub fn is_exhausted(free: &str) -> bool {
    free == "n/a" || free == "0.0"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoeLayout {
    PerModule,
    SystemTotal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoeStatus {
    Parsed { layout: PoeLayout, rows: Vec<PoeRow> },
    Absent,
}

impl PoeStatus {
    pub fn rows(&self) -> Option<&[PoeRow]> {
        match self {
            Self::Parsed { rows, .. } => Some(rows),
            Self::Absent => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<PoeRow>> {
        match self {
            Self::Parsed { rows, .. } => Some(rows),
            Self::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

pub fn tokenize(output: &str) -> Vec<String> {
    output
        .replace('-', "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn parse_poe(output: &str) -> PoeStatus {
    let tokens = tokenize(output);

    let rows = parse_module_rows(&tokens);
    if !rows.is_empty() {
        debug!(modules = rows.len(), "parsed per-module PoE table");
        return PoeStatus::Parsed {
            layout: PoeLayout::PerModule,
            rows,
        };
    }

    if let Some(row) = parse_system_total(&tokens) {
        debug!("parsed system total PoE summary");
        return PoeStatus::Parsed {
            layout: PoeLayout::SystemTotal,
            rows: vec![row],
        };
    }

    debug!("no PoE layout recognised");
    PoeStatus::Absent
}

/// Every pure-digit token between the column headers and the per-port table
/// opens a four-token row: module, available, used, remaining.
fn parse_module_rows(tokens: &[String]) -> Vec<PoeRow> {
    let Some(header) = tokens.iter().position(|t| t == TABLE_HEADER) else {
        return Vec::new();
    };

    (FIRST_ROW_TOKEN..header)
        .filter(|&idx| is_module_index(&tokens[idx]))
        .filter_map(|idx| match tokens.get(idx..idx + 4) {
            Some([module, available, used, free]) => {
                Some(PoeRow::new(module.as_str(), available.as_str(), used.as_str(), free.as_str()))
            }
            _ => None,
        })
        .collect()
}

fn is_module_index(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn parse_system_total(tokens: &[String]) -> Option<PoeRow> {
    let [available, used, remaining] = tokens.get(0..3)? else {
        return None;
    };
    if !(available.starts_with("Available")
        && used.starts_with("Used")
        && remaining.starts_with("Remaining"))
    {
        return None;
    }

    Some(PoeRow::new(
        SYSTEM_TOTAL_LABEL,
        summary_value(available)?,
        summary_value(used)?,
        summary_value(remaining)?,
    ))
}

fn summary_value(token: &str) -> Option<String> {
    let (_, value) = token.split_once(':')?;
    Some(value.replace("(w)", ""))
}
