//! History provider trait and the raw per-ticker currency.
//!
//! The `HistoryProvider` trait is the seam between the fetch pipeline and the
//! upstream source, so the pipeline can be driven by deterministic histories
//! in tests. Exactly one production implementation exists
//! ([`crate::yahoo::YahooProvider`]); this is not a provider registry.

use chrono::NaiveDateTime;

use crate::error::FetchError;
use crate::request::{FetchRequest, PriceField};

/// One timestamped observation as reported by the provider.
///
/// `None` means the provider had no value for that cell. Rows where every
/// cell is `None` are legal here — dropping them is the table layer's job,
/// once it can see all tickers at once.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub ts: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

impl HistoryRow {
    /// True when not a single field carries an observation.
    pub fn is_empty(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.adj_close.is_none()
            && self.volume.is_none()
    }

    pub(crate) fn value(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close,
            PriceField::Volume => self.volume,
        }
    }
}

/// Price history for a single ticker, rows in provider order.
#[derive(Debug, Clone)]
pub struct TickerHistory {
    pub ticker: String,
    pub rows: Vec<HistoryRow>,
}

/// Trait for history sources.
///
/// `Send + Sync` so the fetcher can fan out across tickers on a thread pool.
pub trait HistoryProvider: Send + Sync {
    /// Fetch the history of one ticker over the request's range and interval.
    ///
    /// An empty row set is a valid result. Failures propagate to the caller
    /// untranslated and abort the whole fetch.
    fn fetch_history(
        &self,
        ticker: &str,
        request: &FetchRequest,
    ) -> Result<TickerHistory, FetchError>;
}
