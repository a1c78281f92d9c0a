use std::fmt::Write as _;

use mallab_filter_enum::FilterRecord;
use serde::Serialize;

use crate::config::ProbeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    FoundDefaultName,
    FoundAlternateName,
    NotFound,
}

impl Verdict {
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::FoundDefaultName | Verdict::FoundAlternateName => 0,
            Verdict::NotFound => 1,
        }
    }
}

/// Outcome of checking the enumerated filters against the driver under test.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub timestamp: String,
    pub target_altitude: i32,
    pub default_name: &'a str,
    pub verdict: Verdict,
    pub matches: Vec<&'a FilterRecord>,
    pub filters: &'a [FilterRecord],
}

pub fn evaluate<'a>(filters: &'a [FilterRecord], cfg: &'a ProbeConfig) -> Report<'a> {
    let matches: Vec<&FilterRecord> = filters
        .iter()
        .filter(|f| f.altitude() == cfg.target_altitude)
        .collect();

    // The altitude is what identifies the driver; the name only tells us if
    // it was renamed.
    let verdict = match matches.first() {
        None => Verdict::NotFound,
        Some(_) if matches.iter().any(|f| f.name() == cfg.default_name) => {
            Verdict::FoundDefaultName
        }
        Some(_) => Verdict::FoundAlternateName,
    };

    Report {
        timestamp: chrono::Utc::now().to_rfc3339(),
        target_altitude: cfg.target_altitude,
        default_name: &cfg.default_name,
        verdict,
        matches,
        filters,
    }
}

/// One line per matching filter, or a single "not found" line.
pub fn render_verdict(report: &Report, label: &str) -> String {
    if report.matches.is_empty() {
        return format!("[-] {} driver not found", label);
    }

    report
        .matches
        .iter()
        .map(|f| {
            if f.name() == report.default_name {
                format!(
                    "[+] Found the {} driver running with default name \"{}\"",
                    label,
                    f.name()
                )
            } else {
                format!(
                    "[+] Found the {} driver running with alternate name \"{}\"",
                    label,
                    f.name()
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Table of every filter in the style of `fltmc filters`.
pub fn render_table(filters: &[FilterRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<30}  {:>13}  {:>12}  {:>5}",
        "Filter Name", "Num Instances", "Altitude", "Frame"
    );
    let _ = writeln!(
        out,
        "{:-<30}  {:->13}  {:->12}  {:->5}",
        "", "", "", ""
    );
    for f in filters {
        let instances = f
            .instances()
            .map_or_else(|| "<Legacy>".to_string(), |n| n.to_string());
        let frame = f
            .frame_id()
            .map_or_else(|| "<Legacy>".to_string(), |n| n.to_string());
        let _ = writeln!(
            out,
            "{:<30}  {:>13}  {:>12}  {:>5}",
            f.name(),
            instances,
            f.altitude(),
            frame
        );
    }
    out
}

pub fn render_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
