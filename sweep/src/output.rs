//! Output formatting for coverage reports.

use itsweep_core::{Column, ReportRow, Status};

use crate::error::Result;
use crate::report::CoverageReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Markdown,
    Table,
}

/// Formats a report in the requested output format.
pub fn format_report(report: &CoverageReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
        OutputFormat::Markdown => report_to_markdown(report),
        OutputFormat::Table => report_to_table(report),
    })
}

/// Cell text for one row, with grouped columns blanked on the continuation
/// rows of a merge group.
fn display_cells(report: &CoverageReport, index: usize, row: &ReportRow) -> Vec<String> {
    let continuation = report
        .group_of(index)
        .is_some_and(|group| group.start != index);
    let mut cells = row.cells(&report.columns);
    if continuation {
        for (cell, column) in cells.iter_mut().zip(&report.columns) {
            if column.is_grouped() {
                cell.clear();
            }
        }
    }
    cells
}

fn status_list() -> String {
    Status::ALL
        .iter()
        .map(|status| status.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary_line(report: &CoverageReport) -> String {
    let summary = &report.summary;
    format!(
        "{} fixtures ({} matched, {} unmatched), {}/{} endpoints covered ({:.0}%)",
        summary.fixtures,
        summary.matched,
        summary.unmatched,
        summary.covered,
        summary.declared,
        summary.coverage * 100.0
    )
}

fn markdown_cell(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

fn report_to_markdown(report: &CoverageReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Coverage report ({})\n\n", report.transport));
    out.push_str(&format!("**Generated:** {}\n\n", report.generated_at));
    out.push_str(&format!("**Summary:** {}\n\n", summary_line(report)));

    let headers = header_row(&report.columns);
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    let rule: Vec<String> = headers.iter().map(|header| "-".repeat(header.len())).collect();
    out.push_str(&format!("|{}|\n", rule.join("|")));

    for (index, row) in report.rows.iter().enumerate() {
        let cells: Vec<String> = display_cells(report, index, row)
            .iter()
            .map(|cell| markdown_cell(cell))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    out.push_str(&format!("\n**Allowed status values:** {}\n", status_list()));
    out
}

fn table_cell(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn report_to_table(report: &CoverageReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Transport: {}  Generated: {}\n",
        report.transport, report.generated_at
    ));
    out.push_str(&format!("{}\n\n", summary_line(report)));

    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            display_cells(report, index, row)
                .iter()
                .map(|cell| table_cell(cell))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = report
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            rows.iter()
                .map(|cells| cells[idx].chars().count())
                .chain(std::iter::once(column.header().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let headers = header_row(&report.columns);
    out.push_str(&pad_line(&headers, &widths));
    let rules: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&pad_line(&rules, &widths));
    for cells in &rows {
        out.push_str(&pad_line(cells, &widths));
    }

    out.push_str(&format!("\nAllowed status values: {}\n", status_list()));
    out
}

fn pad_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Returns the header text of each column, in order.
pub fn header_row(columns: &[Column]) -> Vec<&'static str> {
    columns.iter().map(|column| column.header()).collect()
}
