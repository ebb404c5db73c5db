use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::AnalysisError;

/// OHLCV price point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(deserialize_with = "flexible_date")]
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Accepts RFC 3339 timestamps as well as plain `YYYY-MM-DD` trading dates.
fn flexible_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date '{}'", raw)))
}

/// Chronologically ordered, validated price history.
///
/// Construction is the only place input is checked; every indicator downstream
/// assumes the invariants hold (ascending unique dates, positive finite prices,
/// open/close inside the high/low range).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

/// Column-split view of a series, the form the indicator math works on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesColumns {
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, AnalysisError> {
        if points.is_empty() {
            return Err(AnalysisError::InvalidData("price series is empty".to_string()));
        }

        for (i, p) in points.iter().enumerate() {
            let prices = [p.open, p.high, p.low, p.close];
            if prices.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(AnalysisError::InvalidData(format!(
                    "non-positive or non-finite price at index {} ({})",
                    i, p.date
                )));
            }
            if p.high < p.low {
                return Err(AnalysisError::InvalidData(format!(
                    "high {} below low {} at index {}",
                    p.high, p.low, i
                )));
            }
            if p.close > p.high || p.close < p.low || p.open > p.high || p.open < p.low {
                return Err(AnalysisError::InvalidData(format!(
                    "open/close outside high-low range at index {}",
                    i
                )));
            }
            if i > 0 && p.date <= points[i - 1].date {
                return Err(AnalysisError::InvalidData(format!(
                    "dates must be strictly ascending: {} follows {}",
                    p.date,
                    points[i - 1].date
                )));
            }
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn columns(&self) -> SeriesColumns {
        SeriesColumns {
            closes: self.closes(),
            highs: self.points.iter().map(|p| p.high).collect(),
            lows: self.points.iter().map(|p| p.low).collect(),
            volumes: self.points.iter().map(|p| p.volume as f64).collect(),
        }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = AnalysisError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// Directional reading attached to every indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSignal {
    Bullish,
    Bearish,
    Neutral,
    Overbought,
    Oversold,
    NearSupport,
    NearResistance,
    StrongBullish,
    StrongBearish,
    InsufficientData,
}

/// Anything that carries a directional signal and an optional headline value.
pub trait SignalReading {
    fn signal(&self) -> IndicatorSignal;

    fn current(&self) -> Option<f64> {
        None
    }

    fn history(&self) -> &[f64] {
        &[]
    }
}

/// Outcome of a single indicator computation.
///
/// A short series is not an error: the indicator reports how many points it
/// needed so the remaining indicators can still be computed and shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Indicator<T> {
    Ready(T),
    InsufficientData { required: usize, available: usize },
}

impl<T> Indicator<T> {
    pub fn insufficient(required: usize, available: usize) -> Self {
        Indicator::InsufficientData { required, available }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Indicator::Ready(v) => Some(v),
            Indicator::InsufficientData { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Indicator::Ready(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Indicator<U> {
        match self {
            Indicator::Ready(v) => Indicator::Ready(f(v)),
            Indicator::InsufficientData { required, available } => {
                Indicator::InsufficientData { required, available }
            }
        }
    }
}

impl<T: SignalReading> Indicator<T> {
    pub fn signal(&self) -> IndicatorSignal {
        match self {
            Indicator::Ready(v) => v.signal(),
            Indicator::InsufficientData { .. } => IndicatorSignal::InsufficientData,
        }
    }

    /// Flatten into the display record used by charting clients.
    pub fn to_result(&self, period: usize) -> IndicatorResult {
        match self {
            Indicator::Ready(v) => IndicatorResult {
                current: v.current(),
                signal: v.signal(),
                period,
                values: v.history().to_vec(),
            },
            Indicator::InsufficientData { .. } => IndicatorResult {
                current: None,
                signal: IndicatorSignal::InsufficientData,
                period,
                values: Vec::new(),
            },
        }
    }
}

/// Flat per-indicator record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub current: Option<f64>,
    pub signal: IndicatorSignal,
    pub period: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallSignal {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeRecommendation {
    Buy,
    Sell,
    Hold,
}

/// Aggregated vote across the core indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub overall: OverallSignal,
    /// 0 to 100
    pub strength: u8,
    pub components: BTreeMap<String, IndicatorSignal>,
    pub recommendation: TradeRecommendation,
    pub bullish_votes: f64,
    pub bearish_votes: f64,
    /// Number of components that had enough data to vote
    pub total_signals: u32,
}

impl TradingSignal {
    /// Default returned when no component could vote.
    pub fn neutral(components: BTreeMap<String, IndicatorSignal>) -> Self {
        Self {
            overall: OverallSignal::Neutral,
            strength: 0,
            components,
            recommendation: TradeRecommendation::Hold,
            bullish_votes: 0.0,
            bearish_votes: 0.0,
            total_signals: 0,
        }
    }

    /// Distinguishes "no signal" from a confirmed neutral reading.
    pub fn has_signals(&self) -> bool {
        self.total_signals > 0
    }

    pub fn bullish_ratio(&self) -> f64 {
        if self.total_signals == 0 {
            return 0.0;
        }
        self.bullish_votes / self.total_signals as f64
    }

    pub fn bearish_ratio(&self) -> f64 {
        if self.total_signals == 0 {
            return 0.0;
        }
        self.bearish_votes / self.total_signals as f64
    }
}
