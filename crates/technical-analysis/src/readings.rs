use analysis_core::{Indicator, IndicatorSignal, SignalReading, TradingSignal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single-line indicator (RSI, SMA, EMA, ROC, Williams %R, CCI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReading {
    pub current: f64,
    pub signal: IndicatorSignal,
    pub period: usize,
    pub values: Vec<f64>,
}

impl SignalReading for LineReading {
    fn signal(&self) -> IndicatorSignal {
        self.signal
    }

    fn current(&self) -> Option<f64> {
        Some(self.current)
    }

    fn history(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal_line: f64,
    pub histogram: f64,
    pub signal: IndicatorSignal,
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    /// Full MACD line (starts `slow - 1` points into the series)
    pub macd_values: Vec<f64>,
    pub signal_values: Vec<f64>,
    /// Aligned with `signal_values`
    pub histogram_values: Vec<f64>,
}

impl SignalReading for MacdReading {
    fn signal(&self) -> IndicatorSignal {
        self.signal
    }

    fn current(&self) -> Option<f64> {
        Some(self.macd)
    }

    fn history(&self) -> &[f64] {
        &self.macd_values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle, in percent
    pub bandwidth: f64,
    /// Position of price inside the bands: 0 at lower, 1 at upper
    pub percent_b: f64,
    pub signal: IndicatorSignal,
    pub period: usize,
    pub k: f64,
    pub upper_band: Vec<f64>,
    pub middle_band: Vec<f64>,
    pub lower_band: Vec<f64>,
}

impl SignalReading for BollingerReading {
    fn signal(&self) -> IndicatorSignal {
        self.signal
    }

    fn current(&self) -> Option<f64> {
        Some(self.middle)
    }

    fn history(&self) -> &[f64] {
        &self.middle_band
    }
}

/// Support and resistance from pivot points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelsReading {
    /// Most recent pivot lows, ascending
    pub support: Vec<f64>,
    /// Most recent pivot highs, descending
    pub resistance: Vec<f64>,
    pub nearest_support: Option<f64>,
    pub nearest_resistance: Option<f64>,
    pub signal: IndicatorSignal,
    pub lookback: usize,
}

impl SignalReading for LevelsReading {
    fn signal(&self) -> IndicatorSignal {
        self.signal
    }

    fn current(&self) -> Option<f64> {
        self.nearest_support
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeReading {
    pub current_volume: f64,
    pub average_volume: f64,
    /// current / average
    pub volume_ratio: f64,
    pub obv: f64,
    pub vpt: f64,
    pub trend: VolumeTrend,
    pub signal: IndicatorSignal,
    pub period: usize,
    pub average_values: Vec<f64>,
    pub obv_values: Vec<f64>,
    pub vpt_values: Vec<f64>,
}

impl SignalReading for VolumeReading {
    fn signal(&self) -> IndicatorSignal {
        self.signal
    }

    fn current(&self) -> Option<f64> {
        Some(self.volume_ratio)
    }

    fn history(&self) -> &[f64] {
        &self.average_values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
    pub signal: IndicatorSignal,
    pub k_period: usize,
    pub d_period: usize,
    pub k_values: Vec<f64>,
    pub d_values: Vec<f64>,
}

impl SignalReading for StochasticReading {
    fn signal(&self) -> IndicatorSignal {
        self.signal
    }

    fn current(&self) -> Option<f64> {
        Some(self.k)
    }

    fn history(&self) -> &[f64] {
        &self.k_values
    }
}

/// Momentum oscillators, each gated on its own window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumBundle {
    pub roc: Indicator<LineReading>,
    pub stochastic: Indicator<StochasticReading>,
    pub williams_r: Indicator<LineReading>,
    pub cci: Indicator<LineReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma_short: Indicator<LineReading>,
    pub sma_medium: Indicator<LineReading>,
    pub sma_long: Indicator<LineReading>,
    pub ema_fast: Indicator<LineReading>,
    pub ema_slow: Indicator<LineReading>,
    /// Bullish while the medium SMA is above the long SMA (golden-cross regime)
    pub long_term_trend: Option<IndicatorSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub rsi: Indicator<LineReading>,
    pub macd: Indicator<MacdReading>,
    pub moving_averages: MovingAverages,
    pub bollinger_bands: Indicator<BollingerReading>,
    pub support_resistance: Indicator<LevelsReading>,
    pub volume_analysis: Indicator<VolumeReading>,
    pub momentum: MomentumBundle,
}

/// Full analysis of one price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub as_of: DateTime<Utc>,
    pub current_price: f64,
    pub data_points: usize,
    pub indicators: TechnicalIndicators,
    pub signals: TradingSignal,
}
