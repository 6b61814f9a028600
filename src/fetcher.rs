//! Fetch orchestration: per-ticker provider fan-out, then table assembly.

use rayon::prelude::*;

use crate::error::FetchError;
use crate::provider::{HistoryProvider, TickerHistory};
use crate::request::FetchRequest;
use crate::table::{self, PriceTable};
use crate::yahoo::YahooProvider;

/// Fetches the history described by a [`FetchRequest`] and shapes it into a
/// [`PriceTable`].
///
/// Holds no mutable state; every fetch produces a fresh table.
pub struct PriceFetcher {
    provider: Box<dyn HistoryProvider>,
}

impl PriceFetcher {
    /// A fetcher backed by Yahoo Finance.
    pub fn new() -> Self {
        Self::with_provider(Box::new(YahooProvider::new()))
    }

    /// A fetcher backed by an arbitrary history provider. This is the test
    /// seam; production code uses [`PriceFetcher::new`].
    pub fn with_provider(provider: Box<dyn HistoryProvider>) -> Self {
        Self { provider }
    }

    /// Retrieve the request's price history.
    ///
    /// Tickers are retrieved concurrently on rayon's pool when more than one
    /// is requested; retrieval order does not affect output order. The first
    /// failure aborts the whole fetch — there are no partial results.
    pub fn fetch(&self, request: FetchRequest) -> Result<PriceTable, FetchError> {
        let histories: Vec<TickerHistory> = if request.tickers().len() == 1 {
            vec![self.provider.fetch_history(&request.tickers()[0], &request)?]
        } else {
            request
                .tickers()
                .par_iter()
                .map(|ticker| self.provider.fetch_history(ticker, &request))
                .collect::<Result<_, _>>()?
        };

        table::assemble(histories, request.fields())
    }
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}
