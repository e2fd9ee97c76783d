//! Correlation analytics
//!
//! Turns long-format (ticker, date, close) rows into a pairwise Pearson
//! correlation matrix. The pivot keeps only dates on which every fetched
//! ticker traded — an explicit intersection of trading calendars, so a
//! gap in the middle of one ticker's history never leaks a hole into the
//! correlation input.

use crate::db::CloseRow;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Symmetric ticker-by-ticker Pearson correlation matrix.
///
/// `values[i][j]` is the correlation between `tickers[i]` and
/// `tickers[j]`; the diagonal is 1.0. Cells for zero-variance series are
/// NaN, which serializes as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn empty() -> Self {
        Self {
            tickers: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// Wide-format close table: one row per date, one column per ticker
struct WideCloseTable {
    tickers: Vec<String>,
    /// One close series per ticker, aligned across the shared dates
    columns: Vec<Vec<f64>>,
}

/// Pivot long-format rows into wide form, restricted to the dates where
/// every ticker present in `rows` has a close.
fn pivot_shared_dates(rows: &[CloseRow]) -> WideCloseTable {
    let mut by_date: BTreeMap<&str, HashMap<&str, f64>> = BTreeMap::new();
    let mut tickers: BTreeSet<&str> = BTreeSet::new();

    for row in rows {
        tickers.insert(&row.ticker);
        by_date
            .entry(&row.date)
            .or_default()
            .insert(&row.ticker, row.close);
    }

    let tickers: Vec<String> = tickers.into_iter().map(String::from).collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); tickers.len()];

    // BTreeMap iteration keeps the dates ascending
    for closes in by_date.values() {
        if tickers.iter().all(|t| closes.contains_key(t.as_str())) {
            for (i, ticker) in tickers.iter().enumerate() {
                columns[i].push(closes[ticker.as_str()]);
            }
        }
    }

    WideCloseTable { tickers, columns }
}

/// Pearson correlation coefficient of two equal-length series.
///
/// NaN when either series has zero variance.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

/// Build the pairwise correlation matrix from long-format close rows.
///
/// Returns the empty matrix when the input is empty or fewer than two
/// dates survive the calendar intersection (Pearson needs at least two
/// observations).
pub fn correlation_matrix(rows: &[CloseRow]) -> CorrelationMatrix {
    if rows.is_empty() {
        return CorrelationMatrix::empty();
    }

    let wide = pivot_shared_dates(rows);
    let shared_dates = wide.columns.first().map(Vec::len).unwrap_or(0);
    if shared_dates < 2 {
        return CorrelationMatrix::empty();
    }

    let n = wide.tickers.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&wide.columns[i], &wide.columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        tickers: wide.tickers,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(ticker: &str, date: &str, close: f64) -> CloseRow {
        CloseRow {
            ticker: ticker.to_string(),
            date: date.to_string(),
            close,
        }
    }

    fn series(ticker: &str, closes: &[f64]) -> Vec<CloseRow> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| close(ticker, &format!("2024-01-{:02}", i + 1), c))
            .collect()
    }

    #[test]
    fn perfectly_anticorrelated_series() {
        let mut rows = series("A", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        rows.extend(series("B", &[5.0, 4.0, 3.0, 2.0, 1.0]));

        let matrix = correlation_matrix(&rows);
        assert_eq!(matrix.tickers, vec!["A", "B"]);
        assert!((matrix.values[0][1] - (-1.0)).abs() < 1e-12);
        assert!((matrix.values[1][0] - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn identical_series_correlate_to_one() {
        let mut rows = series("A", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        rows.extend(series("B", &[1.0, 2.0, 3.0, 4.0, 5.0]));

        let matrix = correlation_matrix(&rows);
        assert!((matrix.values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn diagonal_is_one_and_matrix_is_symmetric() {
        let mut rows = series("A", &[1.0, 3.0, 2.0, 5.0]);
        rows.extend(series("B", &[2.0, 1.0, 4.0, 3.0]));
        rows.extend(series("C", &[9.0, 7.0, 8.0, 6.0]));

        let matrix = correlation_matrix(&rows);
        assert_eq!(matrix.tickers.len(), 3);
        for i in 0..3 {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            }
        }
    }

    #[test]
    fn disjoint_calendars_yield_empty_matrix() {
        let mut rows = vec![
            close("A", "2024-01-01", 1.0),
            close("A", "2024-01-02", 2.0),
        ];
        rows.push(close("B", "2024-02-01", 3.0));
        rows.push(close("B", "2024-02-02", 4.0));

        assert!(correlation_matrix(&rows).is_empty());
    }

    #[test]
    fn interior_gaps_are_excluded_from_the_shared_calendar() {
        // B is missing 2024-01-03; that date must not feed the correlation
        let rows = vec![
            close("A", "2024-01-01", 1.0),
            close("A", "2024-01-02", 2.0),
            close("A", "2024-01-03", 100.0),
            close("A", "2024-01-04", 3.0),
            close("B", "2024-01-01", 1.0),
            close("B", "2024-01-02", 2.0),
            close("B", "2024-01-04", 3.0),
        ];

        let matrix = correlation_matrix(&rows);
        // With the gap date excluded the surviving series are identical
        assert!((matrix.values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_yields_empty_matrix() {
        assert!(correlation_matrix(&[]).is_empty());
    }

    #[test]
    fn single_shared_date_yields_empty_matrix() {
        let rows = vec![close("A", "2024-01-01", 1.0), close("B", "2024-01-01", 2.0)];
        assert!(correlation_matrix(&rows).is_empty());
    }

    #[test]
    fn zero_variance_series_produces_nan_cell() {
        let mut rows = series("A", &[1.0, 2.0, 3.0]);
        rows.extend(series("B", &[7.0, 7.0, 7.0]));

        let matrix = correlation_matrix(&rows);
        assert!(matrix.values[0][1].is_nan());
        assert_eq!(matrix.values[1][1], 1.0);
    }
}
