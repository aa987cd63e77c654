//! Rendering of finished rankings
//!
//! `Text` is the line-oriented contract: one `[<id>]\t<rank>` line per node,
//! ascending by identifier. The other formats are conveniences.

use crate::algo::RankReport;
use crate::error::DecirankResult;
use comfy_table::{ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
    Table,
}

/// Render `report` as a string in the requested format
pub fn render(report: &RankReport, format: OutputFormat) -> DecirankResult<String> {
    let rendered = match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Csv => render_csv(report),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            json
        }
        OutputFormat::Table => render_table(report),
    };
    Ok(rendered)
}

/// Render and write in one go; nothing is written if rendering fails.
pub fn write_report<W: Write>(out: &mut W, report: &RankReport, format: OutputFormat) -> DecirankResult<()> {
    let rendered = render(report, format)?;
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn render_text(report: &RankReport) -> String {
    let mut out = String::new();
    for r in &report.ranks {
        out.push_str(&format!("[{}]\t{}\n", r.node, r.rank));
    }
    out
}

fn render_csv(report: &RankReport) -> String {
    let mut out = String::from("node,rank\n");
    for r in &report.ranks {
        out.push_str(&format!("{},{}\n", format_csv_value(&r.node), r.rank));
    }
    out
}

fn render_table(report: &RankReport) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["node", "rank"]);

    for r in &report.ranks {
        table.add_row(vec![r.node.clone(), r.rank.to_string()]);
    }

    format!("{}\n{} row(s)\n", table, report.ranks.len())
}

fn format_csv_value(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
