//! Input loading for CSV and spreadsheet files.
//!
//! Both formats are read into a header row plus string cells, then mapped
//! onto [`RawRecord`] through a header alias table. Only the lane column is
//! required; absent columns arrive as `None` and are defaulted later.

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, Reader, open_workbook_auto};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::records::{RawRecord, RawUtilization};

/// Input columns the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Period,
    Day,
    Cluster,
    Lane,
    Route,
    RouteType,
    VendorType,
    SectionCost,
    CapacityMoved,
    SectionUtilization,
    SectionDistance,
    TripIndicator,
}

impl Column {
    /// Field name used by the normalizer's defaults table.
    pub fn field(self) -> &'static str {
        match self {
            Column::Period => "period",
            Column::Day => "day",
            Column::Cluster => "cluster",
            Column::Lane => "lane",
            Column::Route => "route",
            Column::RouteType => "route_type",
            Column::VendorType => "vendor_type",
            Column::SectionCost => "section_cost",
            Column::CapacityMoved => "capacity_moved",
            Column::SectionUtilization => "section_utilization",
            Column::SectionDistance => "section_distance",
            Column::TripIndicator => "trip_indicator",
        }
    }
}

/// Accepted header spellings after [`normalize_header`].
static HEADER_ALIASES: &[(Column, &[&str])] = &[
    (Column::Period, &["month", "period", "monthlabel"]),
    (Column::Day, &["day", "dayofmonth"]),
    (Column::Cluster, &["cluster", "clustercode"]),
    (Column::Lane, &["lane", "lanecode"]),
    (Column::Route, &["route", "routelabel"]),
    (Column::RouteType, &["routetype"]),
    (Column::VendorType, &["vendortype", "vendor"]),
    (Column::SectionCost, &["sectioncost", "cost", "totalcost"]),
    (
        Column::CapacityMoved,
        &["capacitymoved", "capacity", "totalcapacitymoved"],
    ),
    (
        Column::SectionUtilization,
        &["sectionutilization", "utilization", "util"],
    ),
    (Column::SectionDistance, &["sectiondistance", "distance"]),
    (
        Column::TripIndicator,
        &["trip", "trips", "tripcount", "tripindicator"],
    ),
];

/// Records read from one or more files, plus which columns were present.
#[derive(Debug, Default)]
pub struct LoadedDataset {
    pub records: Vec<RawRecord>,
    pub columns_present: BTreeSet<Column>,
    pub skipped_rows: usize,
}

impl LoadedDataset {
    pub fn extend(&mut self, other: LoadedDataset) {
        self.records.extend(other.records);
        self.columns_present.extend(other.columns_present);
        self.skipped_rows += other.skipped_rows;
    }
}

/// Lowercases and strips whitespace, underscores and hyphens.
pub fn normalize_header(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect()
}

fn resolve_column(header: &str) -> Option<Column> {
    let key = normalize_header(header);
    HEADER_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&key.as_str()))
        .map(|(col, _)| *col)
}

/// Text of a worksheet cell, as the CSV reader would have produced it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        // f64 Display drops a zero fraction and never saturates
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

/// Parses a numeric cell. Empty cells are `None`; `1,234.5` and `80%` are accepted.
pub fn parse_number(raw: &str) -> Result<Option<f64>> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }

    if let Some(pct) = cleaned.strip_suffix('%') {
        let value: f64 = pct
            .trim()
            .parse()
            .map_err(|_| anyhow!("not a number: {raw:?}"))?;
        return Ok(Some(value / 100.0));
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| anyhow!("not a number: {raw:?}"))?;
    Ok(Some(value))
}

/// Parses a utilization cell, keeping whether it carried a `%` sign.
pub fn parse_utilization(raw: &str) -> Result<Option<RawUtilization>> {
    let is_percent = raw.trim_end().ends_with('%');
    Ok(parse_number(raw)?.map(|v| {
        if is_percent {
            RawUtilization::Fraction(v)
        } else {
            RawUtilization::Bare(v)
        }
    }))
}

/// Maps a header row plus string rows onto raw records.
///
/// `source` is only used in error messages.
pub fn records_from_rows(
    source: &str,
    headers: &[String],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<LoadedDataset> {
    let mapping: Vec<Option<Column>> = headers.iter().map(|h| resolve_column(h)).collect();

    let columns_present: BTreeSet<Column> = mapping.iter().flatten().copied().collect();
    if !columns_present.contains(&Column::Lane) {
        bail!("{source}: no lane column among headers {headers:?}");
    }
    debug!(source, columns = ?columns_present, "Resolved input columns");

    let mut dataset = LoadedDataset {
        columns_present,
        ..Default::default()
    };

    for (index, row) in rows.into_iter().enumerate() {
        // header is line 1
        let line = index + 2;
        let mut record = RawRecord::default();

        for (cell, column) in row.iter().zip(&mapping) {
            let Some(column) = column else { continue };
            let text = || {
                let t = cell.trim();
                (!t.is_empty()).then(|| t.to_string())
            };
            let at = || format!("{source}, row {line}, column {column:?}");
            let number = || parse_number(cell).with_context(at);

            match column {
                Column::Period => record.period = text(),
                Column::Day => record.day = number()?,
                Column::Cluster => record.cluster = text(),
                Column::Lane => record.lane = cell.trim().to_string(),
                Column::Route => record.route = text(),
                Column::RouteType => record.route_type = text(),
                Column::VendorType => record.vendor_type = text(),
                Column::SectionCost => record.section_cost = number()?,
                Column::CapacityMoved => record.capacity_moved = number()?,
                Column::SectionUtilization => {
                    record.section_utilization = parse_utilization(cell).with_context(at)?
                }
                Column::SectionDistance => record.section_distance = number()?,
                Column::TripIndicator => record.trip_indicator = number()?,
            }
        }

        if record.lane.is_empty() {
            if row.iter().any(|c| !c.trim().is_empty()) {
                warn!(source, line, "Skipping row without lane");
            }
            dataset.skipped_rows += 1;
            continue;
        }

        dataset.records.push(record);
    }

    Ok(dataset)
}

/// Reads a CSV file with a header row.
pub fn load_csv(path: &Path) -> Result<LoadedDataset> {
    let source = path.display().to_string();
    let file = File::open(path).with_context(|| format!("opening {source}"))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {source}"))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    records_from_rows(&source, &headers, rows)
}

/// Reads the first worksheet of a spreadsheet workbook.
pub fn load_workbook(path: &Path) -> Result<LoadedDataset> {
    let source = path.display().to_string();
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening workbook {source}"))?;

    let names = workbook.sheet_names().to_owned();
    let Some(first) = names.first() else {
        bail!("{source}: workbook has no sheets");
    };

    let range = workbook
        .worksheet_range(first)
        .with_context(|| format!("reading sheet {first} of {source}"))?;

    let mut rows = range
        .rows()
        .map(|r| r.iter().map(cell_text).collect::<Vec<String>>());

    let Some(headers) = rows.next() else {
        return Ok(LoadedDataset::default());
    };

    records_from_rows(&source, &headers, rows)
}

/// Loads a single file, picking the reader by extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_file(path: &Path) -> Result<LoadedDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path)?,
        other => bail!("{}: unsupported file type {other:?}", path.display()),
    };

    info!(
        records = dataset.records.len(),
        skipped = dataset.skipped_rows,
        "File loaded"
    );
    Ok(dataset)
}

/// Loads and concatenates several files in order.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedDataset> {
    let mut all = LoadedDataset::default();
    for path in paths {
        all.extend(load_file(path.as_ref())?);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Section Cost "), "sectioncost");
        assert_eq!(normalize_header("route_type"), "routetype");
        assert_eq!(normalize_header("Day-Of-Month"), "dayofmonth");
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number("").unwrap(), None);
        assert_eq!(parse_number(" 12 ").unwrap(), Some(12.0));
        assert_eq!(parse_number("1,234.5").unwrap(), Some(1234.5));
        assert_eq!(parse_number("80%").unwrap(), Some(0.8));
        assert!(parse_number("abc").is_err());
    }

    #[test]
    fn test_records_from_rows_with_aliases() {
        let h = headers(&["Month", "Cluster", "Lane", "Cost", "Capacity Moved"]);
        let rows = vec![row(&["January", "DEL", "DEL-JAI", "500", "1000"])];
        let ds = records_from_rows("test", &h, rows).unwrap();

        assert_eq!(ds.records.len(), 1);
        let r = &ds.records[0];
        assert_eq!(r.period.as_deref(), Some("January"));
        assert_eq!(r.cluster.as_deref(), Some("DEL"));
        assert_eq!(r.lane, "DEL-JAI");
        assert_eq!(r.section_cost, Some(500.0));
        assert_eq!(r.capacity_moved, Some(1000.0));
        assert_eq!(r.route, None);
        assert_eq!(r.section_distance, None);
        assert!(!ds.columns_present.contains(&Column::Route));
    }

    #[test]
    fn test_missing_lane_column_is_an_error() {
        let h = headers(&["Month", "Cluster"]);
        let err = records_from_rows("test", &h, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("no lane column"));
    }

    #[test]
    fn test_rows_without_lane_are_skipped() {
        let h = headers(&["Lane", "Cost"]);
        let rows = vec![row(&["", "10"]), row(&["A-B", "5"]), row(&["", ""])];
        let ds = records_from_rows("test", &h, rows).unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.skipped_rows, 2);
    }

    #[test]
    fn test_bad_number_names_row_and_column() {
        let h = headers(&["Lane", "Section Cost"]);
        let rows = vec![row(&["A-B", "ten"])];
        let err = records_from_rows("input.csv", &h, rows).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("input.csv, row 2"));
        assert!(msg.contains("SectionCost"));
    }

    #[test]
    fn test_short_rows_leave_fields_missing() {
        let h = headers(&["Lane", "Route", "Section Distance"]);
        let rows = vec![row(&["A-B"])];
        let ds = records_from_rows("test", &h, rows).unwrap();
        assert_eq!(ds.records[0].route, None);
        assert_eq!(ds.records[0].section_distance, None);
    }

    #[test]
    fn test_utilization_keeps_percent_sign() {
        assert_eq!(
            parse_utilization("80%").unwrap(),
            Some(RawUtilization::Fraction(0.8))
        );
        assert_eq!(
            parse_utilization(" 80 ").unwrap(),
            Some(RawUtilization::Bare(80.0))
        );
        assert_eq!(parse_utilization("").unwrap(), None);

        let h = headers(&["Lane", "Util"]);
        let ds = records_from_rows("test", &h, vec![row(&["A-B", "75%"])]).unwrap();
        assert_eq!(
            ds.records[0].section_utilization,
            Some(RawUtilization::Fraction(0.75))
        );
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(500.0)), "500");
        assert_eq!(cell_text(&Data::Float(0.75)), "0.75");
        assert_eq!(cell_text(&Data::Float(1e20)), "100000000000000000000");
        assert_eq!(cell_text(&Data::Int(-3)), "-3");
        assert_eq!(cell_text(&Data::String(" DEL ".into())), "DEL");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_column_fields_match_defaults() {
        let fields: Vec<&str> = crate::normalize::DEFAULTS.iter().map(|(f, _)| *f).collect();
        for (column, _) in HEADER_ALIASES {
            if *column != Column::Lane {
                assert!(fields.contains(&column.field()), "{column:?}");
            }
        }
    }

    #[test]
    fn test_load_workbook_first_sheet() {
        let dir = std::env::temp_dir().join("lane_report_test_workbook");
        let _ = std::fs::remove_dir_all(&dir); // clean up any prior run
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("shipments.xlsx");

        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book.new_sheet("Shipments").unwrap();
        for (col, header) in ["Month", "Cluster", "Lane Code", "Section Cost", "Capacity", "Util"]
            .iter()
            .enumerate()
        {
            sheet
                .get_cell_mut(crate::output::cell_ref(col + 1, 1).as_str())
                .set_value(*header);
        }
        sheet.get_cell_mut("A2").set_value("January");
        sheet.get_cell_mut("B2").set_value("DEL");
        sheet.get_cell_mut("C2").set_value("DEL-JAI");
        sheet.get_cell_mut("D2").set_value_number(1500.0);
        sheet.get_cell_mut("E2").set_value_number(120.5);
        sheet.get_cell_mut("F2").set_value("80%");
        sheet.get_cell_mut("A3").set_value("January");
        sheet.get_cell_mut("C3").set_value("DEL-LKO");
        sheet.get_cell_mut("F3").set_value_number(0.6);
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

        let ds = load_files(&[&path]).unwrap();
        assert_eq!(ds.records.len(), 2);
        assert!(ds.columns_present.contains(&Column::SectionUtilization));
        assert!(!ds.columns_present.contains(&Column::Route));

        let first = &ds.records[0];
        assert_eq!(first.period.as_deref(), Some("January"));
        assert_eq!(first.lane, "DEL-JAI");
        assert_eq!(first.section_cost, Some(1500.0));
        assert_eq!(first.capacity_moved, Some(120.5));
        assert_eq!(first.section_utilization, Some(RawUtilization::Fraction(0.8)));

        let second = &ds.records[1];
        assert_eq!(second.cluster, None);
        assert_eq!(second.section_cost, None);
        assert_eq!(second.section_utilization, Some(RawUtilization::Bare(0.6)));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(load_file(Path::new("shipments.parquet")).is_err());
    }
}
