use analysis_core::{
    AnalysisError, EngineConfig, Indicator, IndicatorSignal, OverallSignal, TradeRecommendation, TradingSignal,
};
use std::collections::BTreeMap;

use crate::analyzer::TechnicalAnalysisEngine;
use crate::readings::{BollingerReading, LineReading, MacdReading, VolumeReading};

/// Precomputed indicators the aggregator votes over.
pub struct SignalInputs<'a> {
    pub rsi: &'a Indicator<LineReading>,
    pub macd: &'a Indicator<MacdReading>,
    pub sma_short: &'a Indicator<LineReading>,
    pub sma_medium: &'a Indicator<LineReading>,
    pub volume: &'a Indicator<VolumeReading>,
    pub bollinger: &'a Indicator<BollingerReading>,
}

#[derive(Debug, Default)]
struct Tally {
    bullish: f64,
    bearish: f64,
    total: u32,
}

impl Tally {
    fn bull(&mut self, weight: f64) {
        self.bullish += weight;
    }

    fn bear(&mut self, weight: f64) {
        self.bearish += weight;
    }
}

/// Fixed-weight voting across RSI, MACD, moving averages, volume and Bollinger Bands.
#[derive(Debug, Clone, Default)]
pub struct SignalAggregator {
    engine: TechnicalAnalysisEngine,
}

impl SignalAggregator {
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        Ok(Self { engine: TechnicalAnalysisEngine::with_config(config)? })
    }

    /// Aggregator sharing an engine's (already validated) parameters.
    pub fn for_engine(engine: &TechnicalAnalysisEngine) -> Self {
        Self { engine: engine.clone() }
    }

    fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Recompute the voting indicators from raw columns and aggregate them.
    /// Columns of unequal length are aligned on their most recent points.
    pub fn aggregate(&self, closes: &[f64], highs: &[f64], lows: &[f64], volumes: &[f64]) -> TradingSignal {
        let n = closes.len().min(highs.len()).min(lows.len()).min(volumes.len());
        if n < closes.len() {
            tracing::debug!("Aligning columns on the last {} of {} closes", n, closes.len());
        }
        let closes = &closes[closes.len() - n..];
        let volumes = &volumes[volumes.len() - n..];

        let engine = &self.engine;
        let rsi = engine.rsi(closes);
        let macd = engine.macd(closes);
        let sma_short = engine.sma(closes, self.config().sma_short);
        let sma_medium = engine.sma(closes, self.config().sma_medium);
        let volume = engine.volume_analysis(closes, volumes);
        let bollinger = engine.bollinger_bands(closes);

        self.aggregate_indicators(&SignalInputs {
            rsi: &rsi,
            macd: &macd,
            sma_short: &sma_short,
            sma_medium: &sma_medium,
            volume: &volume,
            bollinger: &bollinger,
        })
    }

    pub fn aggregate_indicators(&self, inputs: &SignalInputs<'_>) -> TradingSignal {
        let full = self.config().full_vote;
        let half = self.config().half_vote;
        let mut tally = Tally::default();
        let mut components = BTreeMap::new();

        // Oscillators: extremes are full votes, plain direction a half vote
        for (name, signal) in [
            ("rsi", inputs.rsi.signal()),
            ("bollinger_bands", inputs.bollinger.signal()),
        ] {
            components.insert(name.to_string(), signal);
            if signal == IndicatorSignal::InsufficientData {
                continue;
            }
            tally.total += 1;
            match signal {
                IndicatorSignal::Oversold => tally.bull(full),
                IndicatorSignal::Overbought => tally.bear(full),
                IndicatorSignal::Bullish => tally.bull(half),
                IndicatorSignal::Bearish => tally.bear(half),
                _ => {}
            }
        }

        // MACD only reports a direction once line, signal and histogram agree
        let macd = inputs.macd.signal();
        components.insert("macd".to_string(), macd);
        if macd != IndicatorSignal::InsufficientData {
            tally.total += 1;
            match macd {
                IndicatorSignal::Bullish => tally.bull(full),
                IndicatorSignal::Bearish => tally.bear(full),
                _ => {}
            }
        }

        let trend = Self::moving_average_trend(inputs.sma_short, inputs.sma_medium);
        components.insert("moving_averages".to_string(), trend.signal);
        if trend.signal != IndicatorSignal::InsufficientData {
            tally.total += 1;
            let weight = if trend.confirmed { full } else { half };
            match trend.signal {
                IndicatorSignal::Bullish => tally.bull(weight),
                IndicatorSignal::Bearish => tally.bear(weight),
                _ => {}
            }
        }

        let volume = inputs.volume.signal();
        components.insert("volume".to_string(), volume);
        if volume != IndicatorSignal::InsufficientData {
            tally.total += 1;
            match volume {
                IndicatorSignal::StrongBullish => tally.bull(full),
                IndicatorSignal::StrongBearish => tally.bear(full),
                IndicatorSignal::Bullish => tally.bull(half),
                IndicatorSignal::Bearish => tally.bear(half),
                _ => {}
            }
        }

        self.decide(tally, components)
    }

    fn decide(&self, tally: Tally, components: BTreeMap<String, IndicatorSignal>) -> TradingSignal {
        if tally.total == 0 {
            tracing::debug!("No indicator had enough data; returning neutral default");
            return TradingSignal::neutral(components);
        }

        let total = tally.total as f64;
        let bullish_ratio = tally.bullish / total;
        let bearish_ratio = tally.bearish / total;
        let strength = (100.0 * (bullish_ratio - bearish_ratio).abs()).round().clamp(0.0, 100.0) as u8;

        let (overall, recommendation) = if bullish_ratio > self.config().decision_ratio {
            (OverallSignal::Bullish, TradeRecommendation::Buy)
        } else if bearish_ratio > self.config().decision_ratio {
            (OverallSignal::Bearish, TradeRecommendation::Sell)
        } else {
            (OverallSignal::Neutral, TradeRecommendation::Hold)
        };

        TradingSignal {
            overall,
            strength,
            components,
            recommendation,
            bullish_votes: tally.bullish,
            bearish_votes: tally.bearish,
            total_signals: tally.total,
        }
    }

    /// Price above (below) both averages is a confirmed up (down) trend. Mixed
    /// readings carry no vote. With only the short average available its
    /// direction counts as an unconfirmed half vote.
    fn moving_average_trend(short: &Indicator<LineReading>, medium: &Indicator<LineReading>) -> MaTrend {
        match (short.signal(), medium.signal()) {
            (IndicatorSignal::InsufficientData, _) => MaTrend { signal: IndicatorSignal::InsufficientData, confirmed: false },
            (s, IndicatorSignal::InsufficientData) => MaTrend { signal: s, confirmed: false },
            (s, m) if s == m => MaTrend { signal: s, confirmed: true },
            _ => MaTrend { signal: IndicatorSignal::Neutral, confirmed: true },
        }
    }
}

struct MaTrend {
    signal: IndicatorSignal,
    confirmed: bool,
}
