//! Report structure and its tabular rendering.
//!
//! A [`Report`] is an ordered list of named sheets: one per period, then an
//! optional `Comparison` sheet. [`Report::tables`] flattens each sheet into
//! header and cell rows for the writers.

use crate::engine::metrics::format_utilization;
use crate::engine::types::{ComparisonSheet, PeriodSheet, SummaryRow};
use serde::Serialize;

pub const COMPARISON_SHEET: &str = "Comparison";

/// Per-period column headers, in output order.
pub const PERIOD_COLUMNS: [&str; 7] = [
    "Lane",
    "route",
    "Total cost",
    "Total Capacity moved",
    "Util",
    "Total Trips",
    "cpkg",
];

/// Columns repeated per period in the comparison sheet.
const METRIC_COLUMNS: [&str; 5] = [
    "Total cost",
    "Total Capacity moved",
    "Util",
    "Total Trips",
    "cpkg",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn number(value: Option<f64>) -> Cell {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }

    fn text(value: Option<String>) -> Cell {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }

    /// String form used by CSV output; empty for null cells.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

fn metric_cells(row: &SummaryRow) -> [Cell; 5] {
    [
        Cell::Number(row.total_cost),
        Cell::Number(row.total_capacity),
        Cell::text(format_utilization(row.weighted_utilization)),
        Cell::Number(row.adjusted_trip_count),
        Cell::number(row.cost_per_unit_capacity),
    ]
}

fn period_table(sheet: &PeriodSheet) -> Table {
    let rows = sheet
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![Cell::Text(r.lane.clone()), Cell::Text(r.route.clone())];
            cells.extend(metric_cells(r));
            cells
        })
        .collect();

    Table {
        headers: PERIOD_COLUMNS.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

fn comparison_table(sheet: &ComparisonSheet) -> Table {
    let mut headers = vec!["Lane".to_string(), "route".to_string()];
    for period in &sheet.periods {
        headers.extend(METRIC_COLUMNS.iter().map(|m| format!("{m} ({period})")));
    }

    let rows = sheet
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![Cell::Text(r.lane.clone()), Cell::Text(r.route.clone())];
            for row in &r.per_period {
                cells.extend(metric_cells(row));
            }
            cells
        })
        .collect();

    Table { headers, rows }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSheet {
    Period(PeriodSheet),
    Comparison(ComparisonSheet),
}

impl ReportSheet {
    pub fn to_table(&self) -> Table {
        match self {
            ReportSheet::Period(s) => period_table(s),
            ReportSheet::Comparison(s) => comparison_table(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSheet {
    pub name: String,
    pub sheet: ReportSheet,
}

fn period_sheet_name(period: &str) -> String {
    if period.trim().eq_ignore_ascii_case(COMPARISON_SHEET) {
        format!("{} (period)", period.trim())
    } else {
        period.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    sheets: Vec<NamedSheet>,
}

impl Report {
    /// Assembles period sheets in order, then the comparison sheet if any.
    ///
    /// The `Comparison` name is reserved: a period with that label is named
    /// `Comparison (period)`.
    pub fn new(periods: Vec<PeriodSheet>, comparison: Option<ComparisonSheet>) -> Self {
        let mut sheets: Vec<NamedSheet> = periods
            .into_iter()
            .map(|p| NamedSheet {
                name: period_sheet_name(&p.period),
                sheet: ReportSheet::Period(p),
            })
            .collect();

        if let Some(c) = comparison {
            sheets.push(NamedSheet {
                name: COMPARISON_SHEET.to_string(),
                sheet: ReportSheet::Comparison(c),
            });
        }

        Self { sheets }
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheets(&self) -> &[NamedSheet] {
        &self.sheets
    }

    pub fn get(&self, name: &str) -> Option<&ReportSheet> {
        self.sheets.iter().find(|s| s.name == name).map(|s| &s.sheet)
    }

    pub fn comparison(&self) -> Option<&ComparisonSheet> {
        self.sheets.iter().find_map(|s| match &s.sheet {
            ReportSheet::Comparison(c) => Some(c),
            ReportSheet::Period(_) => None,
        })
    }

    pub fn tables(&self) -> Vec<(String, Table)> {
        self.sheets
            .iter()
            .map(|s| (s.name.clone(), s.sheet.to_table()))
            .collect()
    }
}
