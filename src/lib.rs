//! pricegrid — historical price tables from Yahoo Finance.
//!
//! Validates a fetch request (tickers, date range, sampling interval, price
//! fields), retrieves adjusted history per ticker — concurrently when more
//! than one ticker is requested — and shapes the result into per-ticker
//! polars frames over a shared timestamp axis:
//!
//! ```no_run
//! use pricegrid::{FetchRequest, PriceFetcher, PriceField};
//!
//! # fn main() -> Result<(), pricegrid::FetchError> {
//! let request = FetchRequest::new(
//!     vec!["AAPL".into(), "MSFT".into()],
//!     "2023-01-01",
//!     "2023-01-10",
//! )?
//! .with_interval("1d".parse()?)
//! .with_fields(vec![PriceField::Open, PriceField::Close])?;
//!
//! let table = PriceFetcher::new().fetch(request)?;
//! let closes = table.series("AAPL", PriceField::Close);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetcher;
pub mod provider;
pub mod request;
pub mod table;
pub mod yahoo;

pub use error::FetchError;
pub use fetcher::PriceFetcher;
pub use provider::{HistoryProvider, HistoryRow, TickerHistory};
pub use request::{FetchRequest, Interval, PriceField};
pub use table::PriceTable;
