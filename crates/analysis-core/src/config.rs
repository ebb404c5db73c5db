use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::AnalysisError;

/// Indicator periods and signal thresholds.
///
/// The voting thresholds are heuristics tuned by hand; they live here as named
/// values so they can be tested and adjusted without touching the indicator math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // Oscillator periods
    pub rsi_period: usize,          // 14
    pub macd_fast: usize,           // 12
    pub macd_slow: usize,           // 26
    pub macd_signal: usize,         // 9
    pub roc_period: usize,          // 12
    pub stochastic_k: usize,        // 14
    pub stochastic_d: usize,        // 3
    pub williams_period: usize,     // 14
    pub cci_period: usize,          // 20

    // Moving averages
    pub sma_short: usize,           // 20
    pub sma_medium: usize,          // 50
    pub sma_long: usize,            // 200
    pub ema_fast: usize,            // 12
    pub ema_slow: usize,            // 26

    // Bands, levels, volume
    pub bollinger_period: usize,    // 20
    pub bollinger_k: f64,           // 2.0
    pub pivot_lookback: usize,      // 10
    pub max_levels: usize,          // 5 most recent pivots
    pub volume_period: usize,       // 20
    pub obv_trend_lag: usize,       // compare OBV with 5 points earlier

    // RSI bands
    pub rsi_overbought: f64,        // 70
    pub rsi_oversold: f64,          // 30
    pub rsi_midline: f64,           // 50
    pub rsi_loss_floor: f64,        // 0.0001

    // Volume ratio bands
    pub volume_strong_ratio: f64,   // 1.5
    pub volume_moderate_ratio: f64, // 1.2

    // Support/resistance proximity
    pub resistance_proximity: f64,  // price >= 0.98 x resistance
    pub support_proximity: f64,     // price <= 1.02 x support

    // Momentum bands
    pub stochastic_overbought: f64, // 80
    pub stochastic_oversold: f64,   // 20
    pub williams_overbought: f64,   // -20
    pub williams_oversold: f64,     // -80
    pub cci_overbought: f64,        // 100
    pub cci_oversold: f64,          // -100

    // Aggregation
    pub full_vote: f64,             // trend / overbought / oversold
    pub half_vote: f64,             // plain bullish / bearish direction
    pub decision_ratio: f64,        // 0.6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            roc_period: 12,
            stochastic_k: 14,
            stochastic_d: 3,
            williams_period: 14,
            cci_period: 20,

            sma_short: 20,
            sma_medium: 50,
            sma_long: 200,
            ema_fast: 12,
            ema_slow: 26,

            bollinger_period: 20,
            bollinger_k: 2.0,
            pivot_lookback: 10,
            max_levels: 5,
            volume_period: 20,
            obv_trend_lag: 5,

            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            rsi_midline: 50.0,
            rsi_loss_floor: 0.0001,

            volume_strong_ratio: 1.5,
            volume_moderate_ratio: 1.2,

            resistance_proximity: 0.98,
            support_proximity: 1.02,

            stochastic_overbought: 80.0,
            stochastic_oversold: 20.0,
            williams_overbought: -20.0,
            williams_oversold: -80.0,
            cci_overbought: 100.0,
            cci_oversold: -100.0,

            full_vote: 1.0,
            half_vote: 0.5,
            decision_ratio: 0.6,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, AnalysisError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AnalysisError::Config(format!("{}='{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}

impl EngineConfig {
    /// Defaults overridden by `TA_*` environment variables.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let d = Self::default();
        let config = Self {
            rsi_period: env_or("TA_RSI_PERIOD", d.rsi_period)?,
            macd_fast: env_or("TA_MACD_FAST", d.macd_fast)?,
            macd_slow: env_or("TA_MACD_SLOW", d.macd_slow)?,
            macd_signal: env_or("TA_MACD_SIGNAL", d.macd_signal)?,
            roc_period: env_or("TA_ROC_PERIOD", d.roc_period)?,
            stochastic_k: env_or("TA_STOCHASTIC_K", d.stochastic_k)?,
            stochastic_d: env_or("TA_STOCHASTIC_D", d.stochastic_d)?,
            williams_period: env_or("TA_WILLIAMS_PERIOD", d.williams_period)?,
            cci_period: env_or("TA_CCI_PERIOD", d.cci_period)?,

            sma_short: env_or("TA_SMA_SHORT", d.sma_short)?,
            sma_medium: env_or("TA_SMA_MEDIUM", d.sma_medium)?,
            sma_long: env_or("TA_SMA_LONG", d.sma_long)?,
            ema_fast: env_or("TA_EMA_FAST", d.ema_fast)?,
            ema_slow: env_or("TA_EMA_SLOW", d.ema_slow)?,

            bollinger_period: env_or("TA_BOLLINGER_PERIOD", d.bollinger_period)?,
            bollinger_k: env_or("TA_BOLLINGER_K", d.bollinger_k)?,
            pivot_lookback: env_or("TA_PIVOT_LOOKBACK", d.pivot_lookback)?,
            max_levels: env_or("TA_MAX_LEVELS", d.max_levels)?,
            volume_period: env_or("TA_VOLUME_PERIOD", d.volume_period)?,
            obv_trend_lag: env_or("TA_OBV_TREND_LAG", d.obv_trend_lag)?,

            rsi_overbought: env_or("TA_RSI_OVERBOUGHT", d.rsi_overbought)?,
            rsi_oversold: env_or("TA_RSI_OVERSOLD", d.rsi_oversold)?,
            rsi_midline: env_or("TA_RSI_MIDLINE", d.rsi_midline)?,
            rsi_loss_floor: d.rsi_loss_floor,

            volume_strong_ratio: env_or("TA_VOLUME_STRONG_RATIO", d.volume_strong_ratio)?,
            volume_moderate_ratio: env_or("TA_VOLUME_MODERATE_RATIO", d.volume_moderate_ratio)?,

            resistance_proximity: env_or("TA_RESISTANCE_PROXIMITY", d.resistance_proximity)?,
            support_proximity: env_or("TA_SUPPORT_PROXIMITY", d.support_proximity)?,

            stochastic_overbought: env_or("TA_STOCHASTIC_OVERBOUGHT", d.stochastic_overbought)?,
            stochastic_oversold: env_or("TA_STOCHASTIC_OVERSOLD", d.stochastic_oversold)?,
            williams_overbought: env_or("TA_WILLIAMS_OVERBOUGHT", d.williams_overbought)?,
            williams_oversold: env_or("TA_WILLIAMS_OVERSOLD", d.williams_oversold)?,
            cci_overbought: env_or("TA_CCI_OVERBOUGHT", d.cci_overbought)?,
            cci_oversold: env_or("TA_CCI_OVERSOLD", d.cci_oversold)?,

            full_vote: d.full_vote,
            half_vote: d.half_vote,
            decision_ratio: env_or("TA_DECISION_RATIO", d.decision_ratio)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("roc_period", self.roc_period),
            ("stochastic_k", self.stochastic_k),
            ("stochastic_d", self.stochastic_d),
            ("williams_period", self.williams_period),
            ("cci_period", self.cci_period),
            ("sma_short", self.sma_short),
            ("sma_medium", self.sma_medium),
            ("sma_long", self.sma_long),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("bollinger_period", self.bollinger_period),
            ("pivot_lookback", self.pivot_lookback),
            ("max_levels", self.max_levels),
            ("volume_period", self.volume_period),
            ("obv_trend_lag", self.obv_trend_lag),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(AnalysisError::Config(format!("{} must be greater than zero", name)));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::Config(
                "macd_fast must be shorter than macd_slow".to_string(),
            ));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(AnalysisError::Config(
                "rsi_oversold must be below rsi_overbought".to_string(),
            ));
        }
        if !(self.bollinger_k.is_finite() && self.bollinger_k > 0.0) {
            return Err(AnalysisError::Config("bollinger_k must be positive".to_string()));
        }
        if !(0.5..=1.0).contains(&self.decision_ratio) {
            return Err(AnalysisError::Config(
                "decision_ratio must be between 0.5 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}
