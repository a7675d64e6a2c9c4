use crate::model::{CleanedSeries, TrendsFrame, TrendsTable};

/// Cleans a raw frame: drops the trailing (possibly in-progress) row, drops the
/// completeness flag, then sorts ascending by timestamp.
///
/// The trailing row is dropped by position before sorting. Duplicate timestamps
/// keep the row that came last in the source.
pub fn clean_frame(frame: TrendsFrame) -> TrendsTable {
    let TrendsFrame { columns, mut rows } = frame;
    rows.pop();

    rows.sort_by_key(|r| r.timestamp);

    let mut index = Vec::with_capacity(rows.len());
    let mut values: Vec<Vec<f64>> = Vec::with_capacity(rows.len());
    for row in rows {
        if index.last() == Some(&row.timestamp) {
            if let Some(last) = values.last_mut() {
                *last = row.values;
            }
            continue;
        }
        index.push(row.timestamp);
        values.push(row.values);
    }

    TrendsTable { columns, index, values }
}

/// Extracts the column named exactly `keyword`. `None` if the column is absent
/// or some row has no value for it.
pub fn select_series(table: &TrendsTable, keyword: &str) -> Option<CleanedSeries> {
    let pos = table.column_position(keyword)?;
    let points = table
        .index
        .iter()
        .zip(&table.values)
        .map(|(ts, row)| row.get(pos).map(|v| (*ts, *v)))
        .collect::<Option<Vec<_>>>()?;

    Some(CleanedSeries {
        keyword: keyword.to_string(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawObservation;
    use chrono::{DateTime, Duration, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_600_000_000, 0).unwrap() + Duration::days(n)
    }

    fn obs(n: i64, v: f64, partial: bool) -> RawObservation {
        RawObservation {
            timestamp: day(n),
            values: vec![v],
            is_partial: partial,
        }
    }

    fn frame(rows: Vec<RawObservation>) -> TrendsFrame {
        TrendsFrame {
            columns: vec!["kw".into()],
            rows,
        }
    }

    #[test]
    fn drops_trailing_row_even_when_complete() {
        let table = clean_frame(frame(vec![
            obs(0, 1.0, false),
            obs(1, 2.0, false),
            obs(2, 3.0, false),
        ]));
        assert_eq!(table.index, vec![day(0), day(1)]);
        assert_eq!(table.values, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn drops_by_position_then_sorts() {
        let table = clean_frame(frame(vec![
            obs(2, 3.0, false),
            obs(0, 1.0, false),
            obs(1, 2.0, true),
        ]));
        assert_eq!(table.index, vec![day(0), day(2)]);
    }

    #[test]
    fn single_row_becomes_empty() {
        assert!(clean_frame(frame(vec![obs(0, 1.0, true)])).is_empty());
        assert!(clean_frame(frame(vec![])).is_empty());
    }

    #[test]
    fn duplicates_keep_last() {
        let table = clean_frame(frame(vec![
            obs(0, 1.0, false),
            obs(1, 2.0, false),
            obs(1, 5.0, false),
            obs(3, 9.0, true),
        ]));
        assert_eq!(table.index, vec![day(0), day(1)]);
        assert_eq!(table.values[1], vec![5.0]);
    }

    #[test]
    fn output_is_strictly_increasing_and_shorter() {
        let rows: Vec<_> = [5, 3, 3, 8, 1, 0, 7].iter().map(|&d| obs(d, d as f64, false)).collect();
        let n = rows.len();
        let table = clean_frame(frame(rows));
        assert!(table.index.len() <= n - 1);
        assert!(table.index.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn select_requires_exact_column() {
        let table = clean_frame(frame(vec![
            obs(0, 1.0, false),
            obs(1, 2.0, false),
            obs(2, 0.0, true),
        ]));
        let series = select_series(&table, "kw").unwrap();
        assert_eq!(series.values(), vec![1.0, 2.0]);
        assert!(select_series(&table, "KW").is_none());
    }
}
