//! Fetch request description: tickers, date range, interval, price fields.
//!
//! All validation lives here. A constructed `FetchRequest` is immutable and
//! satisfies every invariant the downstream pipeline relies on, so the
//! provider and table layers never re-check arguments.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Sampling granularity of returned observations.
///
/// The codes mirror the chart API's interval parameter exactly. `60m` and
/// `1h` are distinct codes upstream and stay distinct here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "90m")]
    NinetyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl Interval {
    /// Every supported interval, in ascending granularity order.
    pub const ALL: [Interval; 13] = [
        Interval::OneMinute,
        Interval::TwoMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::NinetyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::FiveDays,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonths,
    ];

    /// The upstream interval code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::TwoMinutes => "2m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::NinetyMinutes => "90m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| {
                let codes: Vec<&str> = Interval::ALL.iter().map(|i| i.as_str()).collect();
                FetchError::InvalidArgument(format!(
                    "invalid interval '{s}'; choose from {}",
                    codes.join(", ")
                ))
            })
    }
}

/// A price field of the returned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    #[serde(rename = "Adj Close")]
    AdjClose,
    Volume,
}

impl PriceField {
    /// Every field, in canonical column order.
    pub const ALL: [PriceField; 6] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::AdjClose,
        PriceField::Volume,
    ];

    /// Canonical column label.
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
            PriceField::AdjClose => "Adj Close",
            PriceField::Volume => "Volume",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriceField {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        PriceField::ALL
            .into_iter()
            .find(|field| normalize_label(field.label()) == wanted)
            .ok_or_else(|| {
                let labels: Vec<&str> = PriceField::ALL.iter().map(|f| f.label()).collect();
                FetchError::InvalidArgument(format!(
                    "invalid price field '{s}'; choose from {}",
                    labels.join(", ")
                ))
            })
    }
}

/// Label matching is case- and separator-insensitive: "Adj Close",
/// "adj_close" and "ADJCLOSE" all name the same field.
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// An immutable description of one historical price fetch.
///
/// Constructed once, consumed by value by a single fetch call, never mutated.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    tickers: Vec<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    interval: Interval,
    fields: Vec<PriceField>,
}

impl FetchRequest {
    /// Build a request for `tickers` over `[start_date, end_date)` with the
    /// defaults: daily interval, closing price only.
    ///
    /// Dates are `YYYY-MM-DD` strings. Whether the bounds are inclusive or
    /// exclusive is the provider's convention, not reinterpreted here; see
    /// [`crate::yahoo::YahooProvider`] for the upstream mapping.
    pub fn new(
        tickers: Vec<String>,
        start_date: &str,
        end_date: &str,
    ) -> Result<Self, FetchError> {
        if tickers.is_empty() {
            return Err(FetchError::InvalidArgument(
                "'tickers' is empty; provide at least one ticker".into(),
            ));
        }
        Ok(Self {
            tickers,
            start_date: parse_date(start_date)?,
            end_date: parse_date(end_date)?,
            interval: Interval::default(),
            fields: vec![PriceField::Close],
        })
    }

    /// Replace the default daily interval.
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the default `[Close]` field selection. Order is preserved in
    /// the resulting table. An empty selection is rejected.
    pub fn with_fields(mut self, fields: Vec<PriceField>) -> Result<Self, FetchError> {
        if fields.is_empty() {
            return Err(FetchError::InvalidArgument(
                "'fields' is empty; provide at least one price field".into(),
            ));
        }
        self.fields = fields;
        Ok(self)
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn fields(&self) -> &[PriceField] {
        &self.fields
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| FetchError::InvalidArgument(format!("invalid date '{s}'; expected YYYY-MM-DD")))
}
