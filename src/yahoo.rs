//! Yahoo Finance history provider.
//!
//! Fetches adjusted OHLCV history from Yahoo's v8 chart API. Yahoo has no
//! official API and is subject to unannounced format changes; broken shape
//! assumptions surface as `ResponseFormatChanged`.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::error::FetchError;
use crate::provider::{HistoryProvider, HistoryRow, TickerHistory};
use crate::request::FetchRequest;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance history provider.
///
/// Date bounds map to the chart API as `period1 = start 00:00:00 UTC`
/// (inclusive) and `period2 = end 00:00:00 UTC` (exclusive) — the upstream
/// convention, passed through rather than reinterpreted. Price adjustment is
/// always on: OHLC columns are scaled by `adjclose / close` per row, the raw
/// adjusted close is exposed as the `Adj Close` field, and volume is left
/// untouched.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Build the chart API URL for a ticker, date range, and interval.
    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate, interval: &str) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval={interval}\
             &includeAdjustedClose=true"
        )
    }

    /// Parse the chart API response into history rows.
    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<HistoryRow>, FetchError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => FetchError::TickerNotFound {
                ticker: ticker.to_string(),
            },
            Some(err) => FetchError::Upstream {
                ticker: ticker.to_string(),
                code: err.code,
                description: err.description,
            },
            None => FetchError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ResponseFormatChanged("result array is empty".into()))?;

        // No timestamps and no upstream error means no observations in the
        // requested window. An empty history is a valid result.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut rows = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let ts = DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| {
                    FetchError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten().map(|v| v as f64);
            let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

            // Adjustment ratio for the row. Rows without an adjusted close
            // (or with a zero close) pass through unscaled.
            let factor = match (close, adj_close) {
                (Some(c), Some(a)) if c != 0.0 => a / c,
                _ => 1.0,
            };

            rows.push(HistoryRow {
                ts,
                open: open.map(|v| v * factor),
                high: high.map(|v| v * factor),
                low: low.map(|v| v * factor),
                close: close.map(|v| v * factor),
                adj_close,
                volume,
            });
        }

        Ok(rows)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryProvider for YahooProvider {
    fn fetch_history(
        &self,
        ticker: &str,
        request: &FetchRequest,
    ) -> Result<TickerHistory, FetchError> {
        let url = Self::chart_url(
            ticker,
            request.start_date(),
            request.end_date(),
            request.interval().as_str(),
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                ticker: ticker.to_string(),
                code: format!("HTTP {status}"),
                description: "chart request rejected".into(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            FetchError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;

        let rows = Self::parse_response(ticker, chart)?;
        Ok(TickerHistory {
            ticker: ticker.to_string(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(ticker: &str, body: &str) -> Result<Vec<HistoryRow>, FetchError> {
        let chart: ChartResponse = serde_json::from_str(body).unwrap();
        YahooProvider::parse_response(ticker, chart)
    }

    #[test]
    fn parses_chart_payload_with_adjustment() {
        let sample = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1672756200, 1672842600],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, 102.0],
                            "high": [110.0, 104.0],
                            "low": [95.0, 101.0],
                            "close": [105.0, 103.0],
                            "volume": [1000, 2000]
                        }],
                        "adjclose": [{"adjclose": [52.5, 103.0]}]
                    }
                }],
                "error": null
            }
        }"#;

        let rows = parse("AAPL", sample).unwrap();

        assert_eq!(rows.len(), 2);
        // First row has adjclose/close = 0.5, so OHLC is halved.
        assert!((rows[0].open.unwrap() - 50.0).abs() < 1e-9);
        assert!((rows[0].high.unwrap() - 55.0).abs() < 1e-9);
        assert!((rows[0].low.unwrap() - 47.5).abs() < 1e-9);
        assert!((rows[0].close.unwrap() - 52.5).abs() < 1e-9);
        assert_eq!(rows[0].adj_close, Some(52.5));
        // Volume is never scaled.
        assert_eq!(rows[0].volume, Some(1000.0));
        // Second row has ratio 1.0.
        assert_eq!(rows[1].close, Some(103.0));
    }

    #[test]
    fn preserves_null_cells_and_all_null_rows() {
        let sample = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1672756200, 1672842600],
                    "indicators": {
                        "quote": [{
                            "open": [null, 102.0],
                            "high": [null, 104.0],
                            "low": [null, 101.0],
                            "close": [null, 103.0],
                            "volume": [null, 2000]
                        }],
                        "adjclose": [{"adjclose": [null, 103.0]}]
                    }
                }],
                "error": null
            }
        }"#;

        let rows = parse("AAPL", sample).unwrap();

        // All-null rows are kept; dropping them is the table layer's call.
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());
        assert!(!rows[1].is_empty());
    }

    #[test]
    fn missing_adjclose_block_passes_prices_through() {
        let sample = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1672756200],
                    "indicators": {
                        "quote": [{
                            "open": [100.0],
                            "high": [110.0],
                            "low": [95.0],
                            "close": [105.0],
                            "volume": [1000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let rows = parse("AAPL", sample).unwrap();

        assert_eq!(rows[0].close, Some(105.0));
        assert_eq!(rows[0].adj_close, None);
    }

    #[test]
    fn unknown_ticker_maps_to_ticker_not_found() {
        let sample = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;

        let err = parse("NOPE", sample).unwrap_err();
        match err {
            FetchError::TickerNotFound { ticker } => assert_eq!(ticker, "NOPE"),
            other => panic!("expected TickerNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn other_upstream_errors_propagate_untranslated() {
        let sample = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Bad Request", "description": "Invalid input - interval=17m"}
            }
        }"#;

        let err = parse("AAPL", sample).unwrap_err();
        match err {
            FetchError::Upstream { code, description, .. } => {
                assert_eq!(code, "Bad Request");
                assert!(description.contains("interval"));
            }
            other => panic!("expected Upstream, got: {other:?}"),
        }
    }

    #[test]
    fn missing_timestamps_is_an_empty_history() {
        let sample = r#"{
            "chart": {
                "result": [{
                    "timestamp": null,
                    "indicators": {"quote": [{"open": [], "high": [], "low": [], "close": [], "volume": []}]}
                }],
                "error": null
            }
        }"#;

        let rows = parse("AAPL", sample).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn chart_url_encodes_range_and_interval() {
        let url = YahooProvider::chart_url(
            "MSFT",
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            "1wk",
        );

        assert!(url.starts_with("https://query2.finance.yahoo.com/v8/finance/chart/MSFT?"));
        // 2023-01-01T00:00:00Z and 2023-01-10T00:00:00Z.
        assert!(url.contains("period1=1672531200"));
        assert!(url.contains("period2=1673308800"));
        assert!(url.contains("interval=1wk"));
        assert!(url.contains("includeAdjustedClose=true"));
    }
}
