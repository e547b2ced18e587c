//! Output formatting: table, JSON, YAML.
//!
//! Dumps render the whole snapshot (or per-kind counts as a table); a
//! migration prints its summary lines and, on request, the full report.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use ipam_core::{EntityKind, Snapshot, WriteReport};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Read")]
    read: String,
}

#[derive(Tabled)]
struct KindRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Created")]
    created: usize,
    #[tabled(rename = "Updated")]
    updated: usize,
    #[tabled(rename = "Skipped")]
    skipped: String,
}

#[derive(Tabled)]
struct SkippedRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Source ID")]
    source_id: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

// ── Render dispatchers ───────────────────────────────────────────────

pub fn render_snapshot(format: OutputFormat, snapshot: &Snapshot) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let options = snapshot.read_options();
            let rows: Vec<CountRow> = EntityKind::MIGRATION_ORDER
                .iter()
                .map(|&kind| CountRow {
                    kind: kind.plural(),
                    read: if options.reads(kind) {
                        snapshot.count(kind).to_string()
                    } else {
                        "-".into()
                    },
                })
                .collect();
            Ok(render_table(&rows))
        }
        other => render_structured(other, snapshot),
    }
}

pub fn render_report(format: OutputFormat, report: &WriteReport) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<KindRow> = report
                .kinds
                .iter()
                .map(|(kind, k)| KindRow {
                    kind: kind.plural(),
                    created: k.created,
                    updated: k.updated,
                    skipped: if k.unsupported {
                        "unsupported".into()
                    } else {
                        k.skipped.len().to_string()
                    },
                })
                .collect();
            let mut out = render_table(&rows);

            let skipped: Vec<SkippedRow> = report
                .skipped()
                .map(|s| SkippedRow {
                    kind: s.kind.to_string(),
                    source_id: s.source_id.to_string(),
                    key: s.key.clone().unwrap_or_default(),
                    reason: s.reason.clone(),
                })
                .collect();
            if !skipped.is_empty() {
                out.push('\n');
                out.push_str(&render_table(&skipped));
            }
            Ok(out)
        }
        other => render_structured(other, report),
    }
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) -> Result<(), CliError> {
    if output.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json | OutputFormat::Table => {
            serde_json::to_string_pretty(data).map_err(|e| e.to_string())
        }
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
    };
    rendered.map_err(|message| CliError::Render {
        format: format_name(format),
        message,
    })
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "json",
        OutputFormat::JsonCompact => "json-compact",
        OutputFormat::Yaml => "yaml",
        OutputFormat::Table => "table",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ipam_core::{Mode, ObjectId, ReadOptions, Vid, Vlan};
    use pretty_assertions::assert_eq;

    fn snapshot() -> Snapshot {
        let mut builder =
            Snapshot::builder("input", ReadOptions::default().skipping([EntityKind::Aggregate]));
        builder.insert(Vlan {
            id: ObjectId::new(3),
            name: Some("servers".into()),
            description: None,
            vid: Vid::new(10).unwrap(),
            vlan_group: None,
            tenant: None,
            site: None,
            status: None,
        });
        builder.build()
    }

    #[test]
    fn snapshot_table_counts_kinds() {
        let table = render_snapshot(OutputFormat::Table, &snapshot()).unwrap();
        let vlan_line = table.lines().find(|l| l.contains("VLANs ")).unwrap();
        assert!(vlan_line.contains('1'));
        let aggregate_line = table.lines().find(|l| l.contains("aggregates")).unwrap();
        assert!(aggregate_line.contains('-'));
    }

    #[test]
    fn snapshot_json_is_keyed_by_id() {
        let json = render_snapshot(OutputFormat::JsonCompact, &snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vlans"]["3"]["vid"], 10);
        assert_eq!(value["backend"], "input");
    }

    #[test]
    fn report_table_lists_skipped_items() {
        let report: WriteReport = {
            let mut report = WriteReport::new("output", Mode::Apply);
            report.kinds.insert(
                EntityKind::Prefix,
                ipam_core::migrate::KindReport {
                    created: 1,
                    skipped: vec![ipam_core::SkippedItem {
                        kind: EntityKind::Prefix,
                        source_id: ObjectId::new(9),
                        key: Some("prefix=10.0.0.0/24".into()),
                        reason: "HTTP 400".into(),
                    }],
                    ..Default::default()
                },
            );
            report
        };

        let table = render_report(OutputFormat::Table, &report).unwrap();
        assert!(table.contains("prefix=10.0.0.0/24"));
        assert!(table.contains("HTTP 400"));

        let yaml = render_report(OutputFormat::Yaml, &report).unwrap();
        assert!(yaml.contains("destination: output"));
    }
}
