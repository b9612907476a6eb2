use lane_report::engine::build_report;
use lane_report::filter::RecordFilter;
use lane_report::loader::load_files;
use lane_report::normalize::{Normalizer, UtilizationScale};
use lane_report::output::{to_json, write_csv_dir, write_xlsx};
use lane_report::records::{RawUtilization, ShipmentRecord};
use lane_report::report::{COMPARISON_SHEET, Cell, ReportSheet};
use lane_report::trend::{TrendKind, daily_trend};
use lane_report::zones::{EZoneGrouping, Zone, ZoneClassifier};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load(name: &str) -> Vec<ShipmentRecord> {
    let dataset = load_files(&[fixture(name)]).expect("Failed to load fixture");
    let (records, _) = Normalizer::new(UtilizationScale::Fraction)
        .normalize(dataset.records, &dataset.columns_present);
    records
}

#[test]
fn test_full_pipeline() {
    let records = load("shipments.csv");
    assert_eq!(records.len(), 7);

    let report = build_report(&records);
    assert_eq!(
        report.sheet_names(),
        vec!["January", "February", COMPARISON_SHEET]
    );

    let Some(ReportSheet::Period(january)) = report.get("January") else {
        panic!("January sheet missing");
    };
    // BLR-MAA carries only zero values and is dropped.
    let lanes: Vec<&str> = january.rows.iter().map(|r| r.lane.as_str()).collect();
    assert_eq!(lanes, vec!["AMB-IXJ", "DEL-JAI"]);

    let del = &january.rows[1];
    assert_eq!(del.total_cost, 500.0);
    assert_eq!(del.total_capacity, 150.0);
    assert!((del.adjusted_trip_count - 2.0 / 3.0).abs() < 1e-12);
    let util = del.weighted_utilization.unwrap();
    assert!((util - 110.0 / 150.0).abs() < 1e-12);
    let cpkg = del.cost_per_unit_capacity.unwrap();
    assert!((cpkg - 500.0 / (150.0 * util)).abs() < 1e-9);
}

#[test]
fn test_null_semantics_in_period_sheet() {
    let report = build_report(&load("shipments.csv"));
    let tables = report.tables();
    let (_, february) = tables.iter().find(|(n, _)| n == "February").unwrap();

    let util = february.column("Util").unwrap();
    let cpkg = february.column("cpkg").unwrap();
    let lane = february.column("Lane").unwrap();

    let row_for = |name: &str| {
        february
            .rows
            .iter()
            .find(|r| r[lane] == Cell::Text(name.into()))
            .unwrap()
    };

    // Zero cost and capacity, but a real utilization: kept, cpkg null.
    let amb = row_for("AMB-DEL");
    assert_eq!(amb[util], Cell::Text("45.00%".into()));
    assert_eq!(amb[cpkg], Cell::Empty);

    // Zero distance: utilization and cpkg are both null.
    let bom = row_for("BOM-GOI");
    assert_eq!(bom[util], Cell::Empty);
    assert_eq!(bom[cpkg], Cell::Empty);

    let del = row_for("DEL-JAI");
    assert_eq!(del[util], Cell::Text("50.00%".into()));
    assert_eq!(del[cpkg], Cell::Number(8.0));
}

#[test]
fn test_comparison_keeps_only_common_routes() {
    let report = build_report(&load("shipments.csv"));
    let cmp = report.comparison().expect("comparison sheet");

    assert_eq!(cmp.periods, vec!["January", "February"]);
    assert_eq!(cmp.rows.len(), 1);
    assert_eq!(cmp.rows[0].lane, "DEL-JAI");
    assert_eq!(cmp.rows[0].route, "DEL-JAI-LKO");

    let table = ReportSheet::Comparison(cmp.clone()).to_table();
    let jan = table.column("Total cost (January)").unwrap();
    let feb = table.column("Total cost (February)").unwrap();
    assert_eq!(table.rows[0][jan], Cell::Number(500.0));
    assert_eq!(table.rows[0][feb], Cell::Number(400.0));
}

#[test]
fn test_zone_filter_narrows_report() {
    let records = load("shipments.csv");
    let classifier = ZoneClassifier::new(EZoneGrouping::RprOverrides, &records);
    let filter = RecordFilter {
        zones: vec![Zone::N3],
        ..Default::default()
    };

    let kept = filter.apply(records, &classifier);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].lane, "AMB-IXJ");

    let report = build_report(&kept);
    assert_eq!(report.sheet_names(), vec!["January"]);
    assert!(report.comparison().is_none());
}

#[test]
fn test_empty_selection_is_nothing_to_report() {
    let records = load("shipments.csv");
    let classifier = ZoneClassifier::new(EZoneGrouping::RprOverrides, &records);
    let filter = RecordFilter {
        zones: vec![Zone::NE1],
        ..Default::default()
    };

    let report = build_report(&filter.apply(records, &classifier));
    assert!(report.is_empty());
}

#[test]
fn test_missing_optional_columns_are_defaulted() {
    let dataset = load_files(&[fixture("minimal.csv")]).unwrap();
    assert_eq!(dataset.skipped_rows, 1);

    let (records, norm) = Normalizer::new(UtilizationScale::Fraction)
        .normalize(dataset.records, &dataset.columns_present);
    assert_eq!(norm.defaulted_count("route"), 2);
    assert_eq!(norm.defaulted_count("section_distance"), 2);
    assert!(norm.is_absent("route"));
    assert!(norm.is_absent("section_distance"));

    let report = build_report(&records);
    assert_eq!(report.sheet_names(), vec!["January"]);

    let Some(ReportSheet::Period(sheet)) = report.get("January") else {
        panic!("January sheet missing");
    };
    let row = &sheet.rows[0];
    assert_eq!(row.route, "");
    assert_eq!(row.total_cost, 150.0);
    assert_eq!(row.adjusted_trip_count, 2.0);
    assert_eq!(row.weighted_utilization, None);
    assert_eq!(row.cost_per_unit_capacity, None);
}

#[test]
fn test_load_trend_from_fixture() {
    let points = daily_trend(&load("shipments.csv"), TrendKind::Load);
    let jan_day1 = points
        .iter()
        .find(|p| p.period == "January" && p.day == 1)
        .unwrap();
    assert_eq!(jan_day1.value, 150.0);
    assert_eq!(points.first().unwrap().period, "January");
    assert_eq!(points.last().unwrap().period, "February");
}

#[test]
fn test_report_writers() {
    let report = build_report(&load("shipments.csv"));
    let dir = std::env::temp_dir().join("lane_report_integration");
    let _ = std::fs::remove_dir_all(&dir);

    assert!(write_xlsx(&report, &dir.join("report.xlsx")).unwrap());
    let csvs = write_csv_dir(&report, &dir.join("csv"), false).unwrap();
    assert_eq!(csvs.len(), 3);
    assert!(csvs[2].ends_with("Comparison.csv"));

    let json = to_json(&report).unwrap();
    assert!(json.contains("\"Total cost (February)\""));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_written_workbook_loads_back() {
    let report = build_report(&load("shipments.csv"));
    let dir = std::env::temp_dir().join("lane_report_integration_reload");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("report.xlsx");
    assert!(write_xlsx(&report, &path).unwrap());

    // First worksheet is January; "Total cost" and "Util" resolve through aliases.
    let dataset = load_files(&[&path]).unwrap();
    let lanes: Vec<&str> = dataset.records.iter().map(|r| r.lane.as_str()).collect();
    assert_eq!(lanes, vec!["AMB-IXJ", "DEL-JAI"]);

    let del = &dataset.records[1];
    assert_eq!(del.route.as_deref(), Some("DEL-JAI-LKO"));
    assert_eq!(del.section_cost, Some(500.0));
    assert_eq!(del.capacity_moved, Some(150.0));
    let Some(RawUtilization::Fraction(util)) = del.section_utilization else {
        panic!("utilization should read as a percent cell");
    };
    assert!((util - 0.7333).abs() < 1e-12);

    let (records, norm) = Normalizer::new(UtilizationScale::Percent)
        .normalize(dataset.records, &dataset.columns_present);
    assert!((records[0].section_utilization - 0.5).abs() < 1e-12);
    assert!(norm.is_absent("period"));

    std::fs::remove_dir_all(&dir).unwrap();
}
