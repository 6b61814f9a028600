//! Price table assembly: normalize, drop empty rows, select fields, collapse.
//!
//! One code path regardless of ticker count: histories are always widened
//! into a single (ticker, field)-keyed frame first, and only projected down
//! to per-ticker frames after field selection. Callers never see a special
//! single-ticker shape.

use std::collections::{BTreeSet, HashMap};

use polars::prelude::*;

use crate::error::FetchError;
use crate::provider::TickerHistory;
use crate::request::PriceField;

/// The result of one fetch: per-ticker frames over a shared timestamp axis.
///
/// Every frame has a `timestamp` column (`Datetime(Milliseconds)`, UTC as
/// reported by the provider) followed by one `Float64` column per requested
/// field, named by the field's canonical label, in requested order. The axis
/// is the sorted union of all tickers' timestamps after dropping rows with no
/// observation anywhere; missing observations are nulls. A table with zero
/// rows is a valid result.
#[derive(Debug, Clone)]
pub struct PriceTable {
    tickers: Vec<String>,
    fields: Vec<PriceField>,
    frames: HashMap<String, DataFrame>,
}

impl PriceTable {
    /// Tickers in request order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Fields in requested order.
    pub fn fields(&self) -> &[PriceField] {
        &self.fields
    }

    /// The frame for one ticker.
    pub fn frame(&self, ticker: &str) -> Option<&DataFrame> {
        self.frames.get(ticker)
    }

    /// One field's series for one ticker.
    pub fn series(&self, ticker: &str, field: PriceField) -> Option<&Column> {
        self.frames.get(ticker)?.column(field.label()).ok()
    }

    /// The shared timestamp axis.
    pub fn timestamps(&self) -> Option<&Column> {
        let first = self.tickers.first()?;
        self.frames.get(first)?.column("timestamp").ok()
    }

    /// Number of rows on the shared axis.
    pub fn height(&self) -> usize {
        self.tickers
            .first()
            .and_then(|t| self.frames.get(t))
            .map_or(0, |f| f.height())
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }
}

/// Compound column name of the internal wide frame.
fn column_name(ticker: &str, field: PriceField) -> String {
    format!("{ticker} {}", field.label())
}

/// Shape per-ticker histories into a `PriceTable`.
///
/// Ticker order follows `histories`; field order follows `fields`.
pub(crate) fn assemble(
    histories: Vec<TickerHistory>,
    fields: &[PriceField],
) -> Result<PriceTable, FetchError> {
    let tickers: Vec<String> = histories.iter().map(|h| h.ticker.clone()).collect();

    // Normalize: sorted union of all timestamps becomes the shared axis.
    let axis: Vec<i64> = histories
        .iter()
        .flat_map(|h| h.rows.iter().map(|r| r.ts.and_utc().timestamp_millis()))
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();
    let index: HashMap<i64, usize> = axis.iter().enumerate().map(|(i, &ts)| (ts, i)).collect();

    let timestamp = Series::new("timestamp".into(), axis.clone())
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map_err(frame_err)?;

    // One column per (ticker, field), all six fields, aligned to the axis.
    let mut columns: Vec<Column> = Vec::with_capacity(1 + histories.len() * PriceField::ALL.len());
    columns.push(timestamp.into());

    for history in &histories {
        for field in PriceField::ALL {
            let mut cells: Vec<Option<f64>> = vec![None; axis.len()];
            for row in &history.rows {
                cells[index[&row.ts.and_utc().timestamp_millis()]] = row.value(field);
            }
            let series = Series::new(column_name(&history.ticker, field).into(), cells);
            columns.push(series.into());
        }
    }

    let wide = DataFrame::new(columns).map_err(frame_err)?;

    // Drop rows where not a single (ticker, field) cell has an observation.
    let observed: Vec<Expr> = wide
        .get_column_names()
        .iter()
        .skip(1)
        .map(|name| col(name.as_str()).is_not_null())
        .collect();
    let keep = any_horizontal(observed).map_err(frame_err)?;
    let wide = wide.lazy().filter(keep).collect().map_err(frame_err)?;

    // Select the requested fields and collapse the field level away: one
    // frame per ticker, columns renamed to the bare field labels.
    let mut frames = HashMap::with_capacity(tickers.len());
    for ticker in &tickers {
        let mut selection: Vec<String> = vec!["timestamp".into()];
        selection.extend(fields.iter().map(|&f| column_name(ticker, f)));
        let mut frame = wide.select(selection).map_err(frame_err)?;
        for &field in fields {
            frame
                .rename(&column_name(ticker, field), field.label().into())
                .map_err(frame_err)?;
        }
        frames.insert(ticker.clone(), frame);
    }

    Ok(PriceTable {
        tickers,
        fields: fields.to_vec(),
        frames,
    })
}

fn frame_err(e: PolarsError) -> FetchError {
    FetchError::Frame(e.to_string())
}
