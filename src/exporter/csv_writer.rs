// exporter/csv_writer.rs

use crate::model::{ExportError, ResultTable};
use crate::utils::export_file_name;
use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
struct CsvRecord {
    date: String,
    original: String,
    trend: String,
    seasonal: String,
    remainder: String,
}

/// Plain decimal with at least one fractional digit; never an exponent.
/// `Display` for `f64` already prints the shortest round-trip digits in
/// positional form, it only drops the `.0` on whole numbers.
fn format_decimal(v: f64) -> String {
    let s = v.to_string();
    if v.is_finite() && !s.contains('.') {
        format!("{}.0", s)
    } else {
        s
    }
}

/// Date-only when every timestamp sits on midnight, full timestamp otherwise.
fn date_format(table: &ResultTable) -> &'static str {
    let all_midnight = table
        .rows
        .iter()
        .all(|r| r.date.num_seconds_from_midnight() == 0 && r.date.nanosecond() == 0);
    if all_midnight { "%Y-%m-%d" } else { "%Y-%m-%d %H:%M:%S" }
}

fn format_date(date: &DateTime<Utc>, fmt: &str) -> String {
    date.format(fmt).to_string()
}

/// Writes the header and one row per date.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<(), ExportError> {
    let fmt = date_format(table);
    let mut wtr = csv::Writer::from_writer(writer);
    if table.is_empty() {
        wtr.write_record(ResultTable::COLUMNS)?;
    }
    for row in &table.rows {
        wtr.serialize(CsvRecord {
            date: format_date(&row.date, fmt),
            original: format_decimal(row.original),
            trend: format_decimal(row.trend),
            seasonal: format_decimal(row.seasonal),
            remainder: format_decimal(row.remainder),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &ResultTable) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes `stl_<keyword>.csv` into `dir`, creating the directory if needed.
pub fn export_to_dir(
    table: &ResultTable,
    dir: impl AsRef<Path>,
    keyword: &str,
) -> Result<PathBuf, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(keyword));
    let file = fs::File::create(&path)?;
    write_csv(table, file)?;
    info!("Saved CSV: {}", path.display());
    Ok(path)
}

/// Where a finished table is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Stdout,
    Dir(PathBuf),
}

impl Destination {
    /// Writes the table; returns the file path when one was created.
    pub fn deliver(
        &self,
        table: &ResultTable,
        keyword: &str,
    ) -> Result<Option<PathBuf>, ExportError> {
        match self {
            Destination::Stdout => {
                write_csv(table, std::io::stdout().lock())?;
                Ok(None)
            }
            Destination::Dir(dir) => export_to_dir(table, dir, keyword).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultRow;
    use chrono::Duration;

    fn table(step: Duration, n: usize) -> ResultTable {
        let start = DateTime::from_timestamp(1_577_836_800, 0).unwrap();
        ResultTable {
            rows: (0..n)
                .map(|i| ResultRow {
                    date: start + step * i as i32,
                    original: 1.0 + i as f64,
                    trend: 0.5,
                    seasonal: 0.25,
                    remainder: 0.25 + i as f64,
                })
                .collect(),
        }
    }

    #[test]
    fn header_and_rows() {
        let csv = to_csv_string(&table(Duration::weeks(1), 2)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,original,trend,seasonal,remainder");
        assert_eq!(lines[1], "2020-01-01,1.0,0.5,0.25,0.25");
        assert_eq!(lines[2], "2020-01-08,2.0,0.5,0.25,1.25");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn tiny_and_huge_values_stay_positional() {
        let mut t = table(Duration::weeks(1), 1);
        t.rows[0].original = 2.5e16;
        t.rows[0].trend = 1e-15;
        t.rows[0].seasonal = -3e-7;
        t.rows[0].remainder = 0.0001;
        let csv = to_csv_string(&t).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "2020-01-01,25000000000000000.0,0.000000000000001,-0.0000003,0.0001"
        );
    }

    #[test]
    fn decimal_formatting() {
        assert_eq!(format_decimal(0.0), "0.0");
        assert_eq!(format_decimal(-4.0), "-4.0");
        assert_eq!(format_decimal(1.2878587085651816e-14), "0.000000000000012878587085651816");
        assert!(!format_decimal(f64::MAX).contains('e'));
    }

    #[test]
    fn intraday_dates_keep_time() {
        let csv = to_csv_string(&table(Duration::hours(6), 2)).unwrap();
        assert!(csv.lines().nth(2).unwrap().starts_with("2020-01-01 06:00:00,"));
    }

    #[test]
    fn empty_table_still_has_header() {
        let csv = to_csv_string(&ResultTable::default()).unwrap();
        assert_eq!(csv.trim_end(), "date,original,trend,seasonal,remainder");
    }

    #[test]
    fn delivery_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("exports");
        fs::write(&blocker, "not a directory").unwrap();

        let dest = Destination::Dir(blocker.clone());
        let err = dest.deliver(&table(Duration::weeks(1), 2), "kw").unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[test]
    fn delivery_into_a_dir_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Destination::Dir(dir.path().to_path_buf());
        let path = dest.deliver(&table(Duration::weeks(1), 2), "rocket stove").unwrap();
        assert_eq!(path, Some(dir.path().join("stl_rocket_stove.csv")));
    }

    #[test]
    fn export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let path = export_to_dir(&table(Duration::days(1), 3), out, "rocket stove").unwrap();
        assert_eq!(path.file_name().unwrap(), "stl_rocket_stove.csv");
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }
}
