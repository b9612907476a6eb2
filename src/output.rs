//! Output formatting and persistence for reports.
//!
//! Supports XLSX workbooks, one CSV per sheet (optionally gzipped), and JSON.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::report::{Cell, NamedSheet, Report, Table};
use crate::trend::TrendPoint;

const MAX_SHEET_NAME: usize = 31;
const ILLEGAL_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Makes a name acceptable as an Excel worksheet title.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if ILLEGAL_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME).collect();
    if truncated.is_empty() {
        "Unlabeled".to_string()
    } else {
        truncated
    }
}

/// Sanitized sheet names, made unique by suffixing ` (2)`, ` (3)`...
fn unique_sheet_names(sheets: &[NamedSheet]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    sheets
        .iter()
        .map(|s| {
            let base = sanitize_sheet_name(&s.name);
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.to_lowercase()) {
                let suffix = format!(" ({n})");
                let keep = MAX_SHEET_NAME.saturating_sub(suffix.len());
                name = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
                n += 1;
            }
            name
        })
        .collect()
}

/// Converts 1-based column and row numbers to an `A1` reference.
pub fn cell_ref(col: usize, row: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &row.to_string()
}

fn fill_worksheet(sheet: &mut umya_spreadsheet::Worksheet, table: &Table) {
    for (c, header) in table.headers.iter().enumerate() {
        sheet.get_cell_mut(cell_ref(c + 1, 1).as_str()).set_value(header.as_str());
    }

    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let coord = cell_ref(c + 1, r + 2);
            match cell {
                Cell::Text(s) => {
                    sheet.get_cell_mut(coord.as_str()).set_value(s.as_str());
                }
                Cell::Number(n) => {
                    sheet.get_cell_mut(coord.as_str()).set_value_number(*n);
                }
                Cell::Empty => {}
            }
        }
    }
}

/// Writes every sheet of the report to an XLSX workbook at `path`.
///
/// Returns `false` without touching the filesystem when the report is empty.
#[tracing::instrument(skip(report), fields(path = %path.display(), sheets = report.len()))]
pub fn write_xlsx(report: &Report, path: &Path) -> Result<bool> {
    if report.is_empty() {
        info!("Nothing to report, workbook not written");
        return Ok(false);
    }

    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let names = unique_sheet_names(report.sheets());

    for (name, named) in names.iter().zip(report.sheets()) {
        let table = named.sheet.to_table();
        let sheet = book
            .new_sheet(name.as_str())
            .map_err(|e| anyhow!("creating sheet {name}: {e}"))?;
        fill_worksheet(sheet, &table);
        debug!(sheet = %name, rows = table.rows.len(), "Worksheet filled");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| anyhow!("writing workbook {}: {e}", path.display()))?;

    info!("Workbook written");
    Ok(true)
}

fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(Cell::to_field))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one CSV per sheet into `dir`, gzip-compressed when `gzip` is set.
///
/// Returns the paths written, in report order.
#[tracing::instrument(skip(report), fields(dir = %dir.display(), gzip))]
pub fn write_csv_dir(report: &Report, dir: &Path, gzip: bool) -> Result<Vec<PathBuf>> {
    if report.is_empty() {
        info!("Nothing to report, no CSV written");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let names = unique_sheet_names(report.sheets());
    let mut written = Vec::new();

    for (name, named) in names.iter().zip(report.sheets()) {
        let table = named.sheet.to_table();
        let file_name = if gzip {
            format!("{name}.csv.gz")
        } else {
            format!("{name}.csv")
        };
        let path = dir.join(file_name);
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;

        if gzip {
            let mut encoder = GzEncoder::new(file, Compression::default());
            write_table(&mut encoder, &table)?;
            encoder.finish()?;
        } else {
            write_table(file, &table)?;
        }

        debug!(path = %path.display(), rows = table.rows.len(), "CSV written");
        written.push(path);
    }

    info!(files = written.len(), "CSV export complete");
    Ok(written)
}

#[derive(Serialize)]
struct ReportDocument {
    generated_at: DateTime<Utc>,
    sheets: Vec<DocumentSheet>,
}

#[derive(Serialize)]
struct DocumentSheet {
    name: String,
    #[serde(flatten)]
    table: Table,
}

/// Renders the report as pretty JSON, one entry per sheet.
pub fn to_json(report: &Report) -> Result<String> {
    let doc = ReportDocument {
        generated_at: Utc::now(),
        sheets: report
            .tables()
            .into_iter()
            .map(|(name, table)| DocumentSheet { name, table })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &Report) -> Result<()> {
    info!("{}", to_json(report)?);
    Ok(())
}

/// Writes trend points as CSV to `writer`.
pub fn write_trend<W: Write>(writer: W, points: &[TrendPoint]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    for point in points {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}
