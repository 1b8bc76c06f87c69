//! Table formatting utilities for CLI list commands
//!
//! Rows are built from typed cells so every output format (aligned TSV for
//! terminals, CSV, Markdown, bare ids) renders the same data consistently.

use chrono::NaiveDate;
use console::style;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::{short_id, truncate_str};
use crate::cli::OutputFormat;
use crate::core::progress::ActionBucket;
use crate::core::Status;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Opaque id, cyan and shortened in terminals
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// RAG status; unset renders as "-"
    Status(Option<Status>),
    /// Whole-number percentage
    Progress(u8),
    /// Checked items out of total
    Quality(usize, usize),
    Number(i64),
    Date(NaiveDate),
    Bucket(ActionBucket),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Text for an optional field, "-" when unset
    pub fn optional(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
            _ => CellValue::Empty,
        }
    }

    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(short_id(id)).cyan(), width = width),
            CellValue::Text(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Status(Some(status)) => {
                let styled = match status {
                    Status::OnTrack => style(status.as_str()).green(),
                    Status::Progressing => style(status.as_str()).yellow(),
                    Status::OffTrack => style(status.as_str()).red(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Status(None) => format!("{:<width$}", style("-").dim(), width = width),
            CellValue::Progress(pct) => {
                let s = format!("{}%", pct);
                let styled = match pct {
                    70.. => style(s).green(),
                    30..=69 => style(s).yellow(),
                    _ => style(s).red(),
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Quality(checked, total) => {
                let s = format!("{}/{}", checked, total);
                let styled = if checked == total {
                    style(s).green()
                } else {
                    style(s).dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Date(date) => {
                format!("{:<width$}", date.format("%Y-%m-%d"), width = width)
            }
            CellValue::Bucket(bucket) => {
                let styled = match bucket {
                    ActionBucket::Overdue => style(bucket.as_str()).red().bold(),
                    ActionBucket::Open => style(bucket.as_str()).white(),
                    ActionBucket::Completed => style(bucket.as_str()).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Get raw string value (no formatting, for CSV and ID output)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::Status(status) => status.map(|s| s.to_string()).unwrap_or_default(),
            CellValue::Progress(pct) => pct.to_string(),
            CellValue::Quality(checked, total) => format!("{}/{}", checked, total),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            CellValue::Bucket(bucket) => bucket.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Status(None) | CellValue::Empty => "-".to_string(),
            CellValue::Progress(pct) => format!("{}%", pct),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(id) => short_id(id).chars().count(),
            CellValue::Text(s) => s.chars().count(),
            CellValue::Status(status) => status.map_or(1, |s| s.as_str().len()),
            CellValue::Progress(pct) => pct.to_string().len() + 1,
            CellValue::Date(_) => 10, // YYYY-MM-DD
            CellValue::Empty => 1,
            other => other.raw().len(),
        }
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], noun: &'static str) -> Self {
        Self {
            columns,
            noun,
            show_summary: true,
        }
    }

    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat) -> miette::Result<()>
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows)?,
            OutputFormat::Md => println!("{}", self.render_md(&rows)),
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.id);
                }
            }
            _ => self.output_tsv(&rows),
        }
        Ok(())
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(CellValue::display_width)
                    .max()
                    .unwrap_or(0);
                // +2 leaves room for the truncation buffer, capped at the defined width
                col.header.len().max(max_content.saturating_add(2)).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = w),
                })
                .collect();
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.noun);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) -> miette::Result<()> {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        let write_err = |e: csv::Error| miette::miette!("Failed to write CSV: {}", e);

        let mut header = vec!["id"];
        header.extend(self.columns.iter().map(|col| col.key));
        writer.write_record(&header).map_err(write_err)?;

        for row in rows {
            let mut record = vec![row.id.clone()];
            record.extend(
                self.columns
                    .iter()
                    .map(|col| row.get(col.key).map(CellValue::raw).unwrap_or_default()),
            );
            writer.write_record(&record).map_err(write_err)?;
        }
        writer
            .flush()
            .map_err(|e| miette::miette!("Failed to write CSV: {}", e))
    }

    pub fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|col| col.header.to_string()));
        for row in rows {
            builder.push_record(self.columns.iter().map(|col| {
                row.get(col.key)
                    .map(CellValue::format_md)
                    .unwrap_or_else(|| "-".to_string())
            }));
        }
        builder.build().with(Style::markdown()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_raw() {
        assert_eq!(CellValue::Status(Some(Status::OnTrack)).raw(), "on-track");
        assert_eq!(CellValue::Status(None).raw(), "");
        assert_eq!(CellValue::Quality(3, 8).raw(), "3/8");
        assert_eq!(
            CellValue::Date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()).raw(),
            "2026-01-05"
        );
    }

    #[test]
    fn test_optional_text() {
        assert!(matches!(CellValue::optional(None), CellValue::Empty));
        assert!(matches!(CellValue::optional(Some("")), CellValue::Empty));
        assert_eq!(CellValue::optional(Some("Sales")).raw(), "Sales");
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        assert_eq!(CellValue::text("a|b").format_md(), "a\\|b");
        assert_eq!(CellValue::Progress(40).format_md(), "40%");
        assert_eq!(CellValue::Empty.format_md(), "-");
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new("okr-1")
            .cell("objective", CellValue::text("Grow"))
            .cell("progress", CellValue::Progress(50));
        assert_eq!(row.get("objective").unwrap().raw(), "Grow");
        assert!(row.get("owner").is_none());
    }

    #[test]
    fn test_render_md() {
        const COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("objective", "OBJECTIVE", 40),
            ColumnDef::new("status", "STATUS", 12),
        ];
        let rows = vec![TableRow::new("okr-1")
            .cell("objective", CellValue::text("Grow"))
            .cell("status", CellValue::Status(None))];
        let md = TableFormatter::new(COLUMNS, "OKR").render_md(&rows);
        assert!(md.contains("OBJECTIVE"));
        assert!(md.contains("| Grow"));
        assert!(md.lines().count() >= 3);
    }
}
