use analysis_core::precision::{round_macd, round_price, round_series, MACD_DECIMALS, PRICE_DECIMALS};
use analysis_core::{AnalysisError, EngineConfig, Indicator, IndicatorSignal, PriceSeries, SeriesColumns};
use rayon::prelude::*;

use crate::indicators::*;
use crate::readings::*;
use crate::signals::{SignalAggregator, SignalInputs};

/// Series shorter than this still get analysed, indicator by indicator.
pub const RECOMMENDED_MIN_POINTS: usize = 50;

/// Stateless indicator engine. Safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct TechnicalAnalysisEngine {
    config: EngineConfig,
}

fn direction(price: f64, reference: f64) -> IndicatorSignal {
    if price > reference {
        IndicatorSignal::Bullish
    } else {
        IndicatorSignal::Bearish
    }
}

fn line(
    values: Vec<f64>,
    period: usize,
    available: usize,
    signal: impl FnOnce(f64) -> IndicatorSignal,
) -> Indicator<LineReading> {
    let values = round_series(&values, PRICE_DECIMALS);
    let Some(&current) = values.last() else {
        return Indicator::insufficient(period.max(1), available);
    };
    Indicator::Ready(LineReading {
        current,
        signal: signal(current),
        period,
        values,
    })
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom parameters. Rejects configurations `EngineConfig::validate` refuses.
    pub fn with_config(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// RSI with Wilder smoothing
    pub fn rsi(&self, closes: &[f64]) -> Indicator<LineReading> {
        let period = self.config.rsi_period;
        if closes.len() <= period {
            return Indicator::insufficient(period + 1, closes.len());
        }

        let c = &self.config;
        line(rsi(closes, period, c.rsi_loss_floor), period, closes.len(), |v| {
            if v > c.rsi_overbought {
                IndicatorSignal::Overbought
            } else if v < c.rsi_oversold {
                IndicatorSignal::Oversold
            } else if v > c.rsi_midline {
                IndicatorSignal::Bullish
            } else {
                IndicatorSignal::Bearish
            }
        })
    }

    pub fn sma(&self, closes: &[f64], period: usize) -> Indicator<LineReading> {
        if period == 0 || closes.len() < period {
            return Indicator::insufficient(period.max(1), closes.len());
        }
        let last = closes[closes.len() - 1];
        line(sma(closes, period), period, closes.len(), |v| direction(last, v))
    }

    pub fn ema(&self, closes: &[f64], period: usize) -> Indicator<LineReading> {
        if period == 0 || closes.len() < period {
            return Indicator::insufficient(period.max(1), closes.len());
        }
        let last = closes[closes.len() - 1];
        line(ema(closes, period), period, closes.len(), |v| direction(last, v))
    }

    pub fn macd(&self, closes: &[f64]) -> Indicator<MacdReading> {
        let (fast, slow, signal_period) = (self.config.macd_fast, self.config.macd_slow, self.config.macd_signal);
        let required = slow + signal_period;
        if closes.len() < required {
            return Indicator::insufficient(required, closes.len());
        }

        let raw = macd(closes, fast, slow, signal_period);
        if raw.signal_line.is_empty() {
            return Indicator::insufficient(required, closes.len());
        }

        let macd_values = round_series(&raw.macd_line, MACD_DECIMALS);
        let signal_values = round_series(&raw.signal_line, MACD_DECIMALS);
        // histogram from the rounded lines keeps macd - signal == histogram at every index
        let offset = macd_values.len() - signal_values.len();
        let histogram_values: Vec<f64> = signal_values
            .iter()
            .enumerate()
            .map(|(i, s)| round_macd(macd_values[i + offset] - s))
            .collect();

        let macd_now = macd_values[macd_values.len() - 1];
        let signal_now = signal_values[signal_values.len() - 1];
        let histogram = histogram_values[histogram_values.len() - 1];

        let signal = if macd_now > signal_now && histogram > 0.0 {
            IndicatorSignal::Bullish
        } else if macd_now < signal_now && histogram < 0.0 {
            IndicatorSignal::Bearish
        } else {
            IndicatorSignal::Neutral
        };

        Indicator::Ready(MacdReading {
            macd: macd_now,
            signal_line: signal_now,
            histogram,
            signal,
            fast_period: fast,
            slow_period: slow,
            signal_period,
            macd_values,
            signal_values,
            histogram_values,
        })
    }

    pub fn bollinger_bands(&self, closes: &[f64]) -> Indicator<BollingerReading> {
        let (period, k) = (self.config.bollinger_period, self.config.bollinger_k);
        if closes.len() < period {
            return Indicator::insufficient(period, closes.len());
        }

        let bands = bollinger_bands(closes, period, k);
        let upper_band = round_series(&bands.upper, PRICE_DECIMALS);
        let middle_band = round_series(&bands.middle, PRICE_DECIMALS);
        let lower_band = round_series(&bands.lower, PRICE_DECIMALS);

        let price = closes[closes.len() - 1];
        let upper = upper_band[upper_band.len() - 1];
        let middle = middle_band[middle_band.len() - 1];
        let lower = lower_band[lower_band.len() - 1];

        let signal = if price >= upper {
            IndicatorSignal::Overbought
        } else if price <= lower {
            IndicatorSignal::Oversold
        } else {
            direction(price, middle)
        };

        let bandwidth = if middle != 0.0 { (upper - lower) / middle * 100.0 } else { 0.0 };
        let percent_b = if upper > lower { (price - lower) / (upper - lower) } else { 0.5 };

        Indicator::Ready(BollingerReading {
            upper,
            middle,
            lower,
            bandwidth: round_price(bandwidth),
            percent_b: round_price(percent_b),
            signal,
            period,
            k,
            upper_band,
            middle_band,
            lower_band,
        })
    }

    /// Pivot-based support and resistance
    pub fn support_resistance(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> Indicator<LevelsReading> {
        let lookback = self.config.pivot_lookback;
        let n = closes.len().min(highs.len()).min(lows.len());
        let required = 2 * lookback + 2;
        if n < required {
            return Indicator::insufficient(required, n);
        }

        let pivots = pivot_points(&highs[..n], &lows[..n], lookback);
        let keep = self.config.max_levels;

        let mut resistance: Vec<f64> = pivots.highs.iter().rev().take(keep).map(|&(_, v)| round_price(v)).collect();
        resistance.sort_by(|a, b| b.total_cmp(a));
        let mut support: Vec<f64> = pivots.lows.iter().rev().take(keep).map(|&(_, v)| round_price(v)).collect();
        support.sort_by(|a, b| a.total_cmp(b));

        // Only levels on the correct side of price count; a broken level is not nearby.
        let price = closes[n - 1];
        let nearest_resistance = resistance.iter().copied().filter(|&r| r >= price).reduce(f64::min);
        let nearest_support = support.iter().copied().filter(|&s| s <= price).reduce(f64::max);

        let signal = match (nearest_resistance, nearest_support) {
            (Some(r), _) if price >= r * self.config.resistance_proximity => IndicatorSignal::NearResistance,
            (_, Some(s)) if price <= s * self.config.support_proximity => IndicatorSignal::NearSupport,
            _ => IndicatorSignal::Neutral,
        };

        Indicator::Ready(LevelsReading {
            support,
            resistance,
            nearest_support,
            nearest_resistance,
            signal,
            lookback,
        })
    }

    pub fn volume_analysis(&self, closes: &[f64], volumes: &[f64]) -> Indicator<VolumeReading> {
        let period = self.config.volume_period;
        let lag = self.config.obv_trend_lag;
        let n = closes.len().min(volumes.len());
        let required = period.max(lag + 1);
        if n < required {
            return Indicator::insufficient(required, n);
        }
        let (closes, volumes) = (&closes[..n], &volumes[..n]);

        let averages = sma(volumes, period);
        let average_volume = averages[averages.len() - 1];
        let current_volume = volumes[n - 1];
        let volume_ratio = if average_volume > 0.0 { current_volume / average_volume } else { 0.0 };

        let obv_values = round_series(&obv(closes, volumes), PRICE_DECIMALS);
        let vpt_values = round_series(&volume_price_trend(closes, volumes), PRICE_DECIMALS);

        let obv_now = obv_values[n - 1];
        let trend = if obv_now > obv_values[n - 1 - lag] {
            VolumeTrend::Increasing
        } else {
            VolumeTrend::Decreasing
        };

        let c = &self.config;
        let signal = match trend {
            _ if volume_ratio <= c.volume_moderate_ratio => IndicatorSignal::Neutral,
            VolumeTrend::Increasing if volume_ratio > c.volume_strong_ratio => IndicatorSignal::StrongBullish,
            VolumeTrend::Decreasing if volume_ratio > c.volume_strong_ratio => IndicatorSignal::StrongBearish,
            VolumeTrend::Increasing => IndicatorSignal::Bullish,
            VolumeTrend::Decreasing => IndicatorSignal::Bearish,
        };

        Indicator::Ready(VolumeReading {
            current_volume,
            average_volume: round_price(average_volume),
            volume_ratio: round_price(volume_ratio),
            obv: obv_now,
            vpt: vpt_values[n - 1],
            trend,
            signal,
            period,
            average_values: round_series(&averages, PRICE_DECIMALS),
            obv_values,
            vpt_values,
        })
    }

    pub fn momentum(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> MomentumBundle {
        let c = &self.config;
        let n = closes.len().min(highs.len()).min(lows.len());
        let (highs, lows, closes) = (&highs[..n], &lows[..n], &closes[..n]);

        let roc = if n > c.roc_period {
            line(rate_of_change(closes, c.roc_period), c.roc_period, n, |v| {
                if v > 0.0 {
                    IndicatorSignal::Bullish
                } else if v < 0.0 {
                    IndicatorSignal::Bearish
                } else {
                    IndicatorSignal::Neutral
                }
            })
        } else {
            Indicator::insufficient(c.roc_period + 1, n)
        };

        let stochastic_required = (c.stochastic_k + c.stochastic_d).saturating_sub(1).max(1);
        let raw = if n >= stochastic_required {
            stochastic(highs, lows, closes, c.stochastic_k, c.stochastic_d)
        } else {
            StochasticResult::default()
        };
        let stochastic = if let (Some(&k_last), Some(&d_last)) = (raw.k.last(), raw.d.last()) {
            let k_values = round_series(&raw.k, PRICE_DECIMALS);
            let d_values = round_series(&raw.d, PRICE_DECIMALS);
            let (k, d) = (round_price(k_last), round_price(d_last));
            let signal = if k > c.stochastic_overbought {
                IndicatorSignal::Overbought
            } else if k < c.stochastic_oversold {
                IndicatorSignal::Oversold
            } else if k > d {
                IndicatorSignal::Bullish
            } else if k < d {
                IndicatorSignal::Bearish
            } else {
                IndicatorSignal::Neutral
            };
            Indicator::Ready(StochasticReading {
                k,
                d,
                signal,
                k_period: c.stochastic_k,
                d_period: c.stochastic_d,
                k_values,
                d_values,
            })
        } else {
            Indicator::insufficient(stochastic_required, n)
        };

        let williams = if n >= c.williams_period {
            line(williams_r(highs, lows, closes, c.williams_period), c.williams_period, n, |v| {
                if v >= c.williams_overbought {
                    IndicatorSignal::Overbought
                } else if v <= c.williams_oversold {
                    IndicatorSignal::Oversold
                } else {
                    direction(v, -50.0)
                }
            })
        } else {
            Indicator::insufficient(c.williams_period, n)
        };

        let cci_reading = if n >= c.cci_period {
            line(cci(highs, lows, closes, c.cci_period), c.cci_period, n, |v| {
                if v > c.cci_overbought {
                    IndicatorSignal::Overbought
                } else if v < c.cci_oversold {
                    IndicatorSignal::Oversold
                } else {
                    direction(v, 0.0)
                }
            })
        } else {
            Indicator::insufficient(c.cci_period, n)
        };

        MomentumBundle {
            roc,
            stochastic,
            williams_r: williams,
            cci: cci_reading,
        }
    }

    pub fn moving_averages(&self, closes: &[f64]) -> MovingAverages {
        let c = &self.config;
        let sma_medium = self.sma(closes, c.sma_medium);
        let sma_long = self.sma(closes, c.sma_long);

        let long_term_trend = match (sma_medium.ready(), sma_long.ready()) {
            (Some(m), Some(l)) => Some(direction(m.current, l.current)),
            _ => None,
        };

        MovingAverages {
            sma_short: self.sma(closes, c.sma_short),
            sma_medium,
            sma_long,
            ema_fast: self.ema(closes, c.ema_fast),
            ema_slow: self.ema(closes, c.ema_slow),
            long_term_trend,
        }
    }

    /// Every indicator, each independently gated on its own window.
    pub fn indicators(&self, columns: &SeriesColumns) -> TechnicalIndicators {
        let SeriesColumns { closes, highs, lows, volumes } = columns;

        TechnicalIndicators {
            rsi: self.rsi(closes),
            macd: self.macd(closes),
            moving_averages: self.moving_averages(closes),
            bollinger_bands: self.bollinger_bands(closes),
            support_resistance: self.support_resistance(highs, lows, closes),
            volume_analysis: self.volume_analysis(closes, volumes),
            momentum: self.momentum(highs, lows, closes),
        }
    }

    /// Comprehensive analysis: indicator set plus the aggregated trading signal.
    pub fn analyze(&self, series: &PriceSeries) -> TechnicalAnalysis {
        if series.len() < RECOMMENDED_MIN_POINTS {
            tracing::warn!(
                "Analysing {} points; at least {} recommended, some indicators will be missing",
                series.len(),
                RECOMMENDED_MIN_POINTS
            );
        }

        let columns = series.columns();
        let indicators = self.indicators(&columns);

        let skipped = [
            ("rsi", indicators.rsi.is_ready()),
            ("macd", indicators.macd.is_ready()),
            ("bollinger_bands", indicators.bollinger_bands.is_ready()),
            ("support_resistance", indicators.support_resistance.is_ready()),
            ("volume_analysis", indicators.volume_analysis.is_ready()),
        ];
        for (name, _) in skipped.iter().filter(|(_, ready)| !ready) {
            tracing::debug!("{} skipped: insufficient data ({} points)", name, series.len());
        }

        let signals = SignalAggregator::for_engine(self).aggregate_indicators(&SignalInputs {
            rsi: &indicators.rsi,
            macd: &indicators.macd,
            sma_short: &indicators.moving_averages.sma_short,
            sma_medium: &indicators.moving_averages.sma_medium,
            volume: &indicators.volume_analysis,
            bollinger: &indicators.bollinger_bands,
        });

        // PriceSeries::new rejects empty input
        let (as_of, current_price) = series
            .last()
            .map(|p| (p.date, p.close))
            .unwrap_or_default();

        tracing::debug!(
            "Analysis complete: {:?} (strength {}, {} votes)",
            signals.overall,
            signals.strength,
            signals.total_signals
        );

        TechnicalAnalysis {
            as_of,
            current_price,
            data_points: series.len(),
            indicators,
            signals,
        }
    }

    /// Analyse many symbols in parallel. Output order matches input order.
    pub fn analyze_batch(&self, batch: &[(String, PriceSeries)]) -> Vec<(String, TechnicalAnalysis)> {
        tracing::info!("Analysing batch of {} symbols", batch.len());
        batch
            .par_iter()
            .map(|(symbol, series)| (symbol.clone(), self.analyze(series)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::PricePoint;
    use chrono::{Duration, TimeZone, Utc};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 100_000 + (i as u64 % 7) * 10_000,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + 10.0 * (i as f64 / 5.0).sin() + i as f64 * 0.1).collect()
    }

    #[test]
    fn test_sma_signal_for_ascending_closes() {
        let closes: Vec<f64> = (10..30).map(|v| v as f64).collect();
        let engine = TechnicalAnalysisEngine::new();
        let result = engine.sma(&closes, 20);

        let reading = result.ready().unwrap();
        assert_eq!(reading.current, 19.5);
        assert_eq!(reading.signal, IndicatorSignal::Bullish);
    }

    #[test]
    fn test_rsi_monotonic_series() {
        let engine = TechnicalAnalysisEngine::new();

        let up: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let signal = engine.rsi(&up).signal();
        assert!(matches!(signal, IndicatorSignal::Bullish | IndicatorSignal::Overbought));

        let down: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let signal = engine.rsi(&down).signal();
        assert!(matches!(signal, IndicatorSignal::Bearish | IndicatorSignal::Oversold));
    }

    #[test]
    fn test_rsi_insufficient_at_period() {
        let engine = TechnicalAnalysisEngine::new();
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let rsi = engine.rsi(&closes);
        assert_eq!(rsi, Indicator::insufficient(15, 14));

        let flat = rsi.to_result(14);
        assert_eq!(flat.current, None);
        assert_eq!(flat.signal, IndicatorSignal::InsufficientData);
    }

    #[test]
    fn test_rsi_idempotent_and_bounded() {
        let engine = TechnicalAnalysisEngine::new();
        let closes = wave(120);
        let first = engine.rsi(&closes);
        let second = engine.rsi(&closes);
        assert_eq!(first, second);
        for v in &first.ready().unwrap().values {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_macd_histogram_is_difference() {
        let engine = TechnicalAnalysisEngine::new();
        let macd = engine.macd(&wave(150));
        let reading = macd.ready().unwrap();

        let offset = reading.macd_values.len() - reading.signal_values.len();
        assert_eq!(reading.histogram_values.len(), reading.signal_values.len());
        for (i, h) in reading.histogram_values.iter().enumerate() {
            let diff = reading.macd_values[i + offset] - reading.signal_values[i];
            assert!((h - diff).abs() < 1e-9);
        }
        assert!((reading.histogram - (reading.macd - reading.signal_line)).abs() < 1e-9);
    }

    #[test]
    fn test_macd_gate() {
        let engine = TechnicalAnalysisEngine::new();
        assert!(!engine.macd(&wave(34)).is_ready());
        assert!(engine.macd(&wave(35)).is_ready());
    }

    #[test]
    fn test_macd_signal_consistency() {
        let engine = TechnicalAnalysisEngine::new();
        for n in [40, 60, 90, 150] {
            let macd = engine.macd(&wave(n));
            let r = macd.ready().unwrap();
            match r.signal {
                IndicatorSignal::Bullish => assert!(r.macd > r.signal_line && r.histogram > 0.0),
                IndicatorSignal::Bearish => assert!(r.macd < r.signal_line && r.histogram < 0.0),
                IndicatorSignal::Neutral => {}
                other => panic!("unexpected MACD signal {:?}", other),
            }
        }
    }

    #[test]
    fn test_bollinger_band_order() {
        let engine = TechnicalAnalysisEngine::new();
        let bb = engine.bollinger_bands(&wave(80));
        let r = bb.ready().unwrap();
        for i in 0..r.middle_band.len() {
            assert!(r.upper_band[i] >= r.middle_band[i]);
            assert!(r.middle_band[i] >= r.lower_band[i]);
        }
    }

    #[test]
    fn test_bollinger_extremes() {
        let engine = TechnicalAnalysisEngine::new();
        let mut closes = vec![100.0; 19];
        closes.extend([100.5, 100.0, 99.5, 100.0, 130.0]);
        assert_eq!(engine.bollinger_bands(&closes).signal(), IndicatorSignal::Overbought);

        let mut closes = vec![100.0; 19];
        closes.extend([100.5, 100.0, 99.5, 100.0, 70.0]);
        assert_eq!(engine.bollinger_bands(&closes).signal(), IndicatorSignal::Oversold);
    }

    #[test]
    fn test_support_resistance_drawn_from_input() {
        let engine = TechnicalAnalysisEngine::new();
        let series = series_from_closes(&wave(120));
        let cols = series.columns();
        let levels = engine.support_resistance(&cols.highs, &cols.lows, &cols.closes);
        let r = levels.ready().unwrap();

        assert!(!r.resistance.is_empty());
        assert!(!r.support.is_empty());
        assert!(r.resistance.len() <= 5 && r.support.len() <= 5);
        for level in &r.resistance {
            assert!(cols.highs.iter().any(|h| round_price(*h) == *level));
        }
        for level in &r.support {
            assert!(cols.lows.iter().any(|l| round_price(*l) == *level));
        }
        assert!(r.resistance.windows(2).all(|w| w[0] >= w[1]));
        assert!(r.support.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_support_resistance_gate() {
        let engine = TechnicalAnalysisEngine::new();
        let closes = wave(21);
        assert_eq!(
            engine.support_resistance(&closes, &closes, &closes),
            Indicator::insufficient(22, 21)
        );
    }

    #[test]
    fn test_near_resistance_signal() {
        let engine = TechnicalAnalysisEngine::new();
        // single peak of 120 at index 15, price returns to 119 at the end
        let mut highs: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.1).collect();
        highs[15] = 120.0;
        let lows: Vec<f64> = highs.iter().map(|h| h - 1.0).collect();
        let mut closes = lows.clone();
        closes[29] = 119.0;
        highs[29] = 119.5;

        let r = engine.support_resistance(&highs, &lows, &closes);
        let reading = r.ready().unwrap();
        assert_eq!(reading.resistance, vec![120.0]);
        assert_eq!(reading.signal, IndicatorSignal::NearResistance);
    }

    #[test]
    fn test_breakout_above_resistance_is_not_near_it() {
        let engine = TechnicalAnalysisEngine::new();
        // same peak of 120 at index 15, then price breaks out to 178
        let mut highs: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.1).collect();
        highs[15] = 120.0;
        let mut lows: Vec<f64> = highs.iter().map(|h| h - 1.0).collect();
        let mut closes = lows.clone();
        highs[29] = 178.5;
        lows[29] = 177.0;
        closes[29] = 178.0;

        let r = engine.support_resistance(&highs, &lows, &closes);
        let reading = r.ready().unwrap();
        assert_eq!(reading.resistance, vec![120.0]);
        assert_eq!(reading.nearest_resistance, None);
        assert_eq!(reading.signal, IndicatorSignal::Neutral);
    }

    #[test]
    fn test_near_support_signal() {
        let engine = TechnicalAnalysisEngine::new();
        // single trough of 80 at index 15 in a gently falling series
        let mut highs: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.1).collect();
        let mut lows: Vec<f64> = highs.iter().map(|h| h - 1.0).collect();
        lows[15] = 80.0;
        let mut closes = lows.clone();
        closes[15] = 81.0;
        highs[29] = 81.5;
        lows[29] = 80.5;
        closes[29] = 81.0;

        let r = engine.support_resistance(&highs, &lows, &closes);
        let reading = r.ready().unwrap();
        assert_eq!(reading.support, vec![80.0]);
        assert!(reading.resistance.is_empty());
        assert_eq!(reading.nearest_support, Some(80.0));
        assert_eq!(reading.signal, IndicatorSignal::NearSupport);

        // once price falls through the level it no longer counts as support
        highs[29] = 50.5;
        lows[29] = 49.5;
        closes[29] = 50.0;
        let r = engine.support_resistance(&highs, &lows, &closes);
        let reading = r.ready().unwrap();
        assert_eq!(reading.support, vec![80.0]);
        assert_eq!(reading.nearest_support, None);
        assert_eq!(reading.signal, IndicatorSignal::Neutral);
    }

    #[test]
    fn test_with_config_rejects_invalid_parameters() {
        let config = EngineConfig { williams_period: 0, ..EngineConfig::default() };
        assert!(matches!(
            TechnicalAnalysisEngine::with_config(config),
            Err(AnalysisError::Config(_))
        ));

        let config = EngineConfig { stochastic_k: 0, stochastic_d: 0, ..EngineConfig::default() };
        assert!(TechnicalAnalysisEngine::with_config(config).is_err());

        let tuned = EngineConfig { williams_period: 10, ..EngineConfig::default() };
        let engine = TechnicalAnalysisEngine::with_config(tuned).unwrap();
        let closes = wave(60);
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let momentum = engine.momentum(&highs, &lows, &closes);
        assert_eq!(momentum.williams_r.ready().unwrap().period, 10);
    }

    #[test]
    fn test_zero_period_moving_average_is_insufficient() {
        let engine = TechnicalAnalysisEngine::new();
        let closes = wave(30);
        assert!(!engine.sma(&closes, 0).is_ready());
        assert!(!engine.ema(&closes, 0).is_ready());
    }

    #[test]
    fn test_volume_spike_with_rising_obv() {
        let engine = TechnicalAnalysisEngine::new();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let mut volumes = vec![1000.0; 30];
        volumes[29] = 2000.0;

        let v = engine.volume_analysis(&closes, &volumes);
        let r = v.ready().unwrap();
        assert_eq!(r.trend, VolumeTrend::Increasing);
        assert!(r.volume_ratio > 1.5);
        assert_eq!(r.signal, IndicatorSignal::StrongBullish);
        assert_eq!(r.obv, 30_000.0);
    }

    #[test]
    fn test_volume_moderate_falling() {
        let engine = TechnicalAnalysisEngine::new();
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
        let mut volumes = vec![1000.0; 30];
        volumes[29] = 1300.0;

        let r = engine.volume_analysis(&closes, &volumes);
        assert_eq!(r.signal(), IndicatorSignal::Bearish);
        assert_eq!(r.ready().unwrap().trend, VolumeTrend::Decreasing);
    }

    #[test]
    fn test_momentum_subindicators_gate_independently() {
        let engine = TechnicalAnalysisEngine::new();
        let closes = wave(15);
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();

        let m = engine.momentum(&highs, &lows, &closes);
        assert!(m.roc.is_ready());
        assert!(!m.stochastic.is_ready());
        assert!(m.williams_r.is_ready());
        assert!(!m.cci.is_ready());

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["cci"]["status"], "insufficient_data");
        assert!(json["cci"].get("current").is_none());
    }

    #[test]
    fn test_momentum_ranges() {
        let engine = TechnicalAnalysisEngine::new();
        let series = series_from_closes(&wave(100));
        let cols = series.columns();
        let m = engine.momentum(&cols.highs, &cols.lows, &cols.closes);

        for k in &m.stochastic.ready().unwrap().k_values {
            assert!((0.0..=100.0).contains(k));
        }
        for w in &m.williams_r.ready().unwrap().values {
            assert!((-100.0..=0.0).contains(w));
        }
    }

    #[test]
    fn test_analyze_short_series_degrades_per_indicator() {
        let engine = TechnicalAnalysisEngine::new();
        let analysis = engine.analyze(&series_from_closes(&wave(25)));

        assert!(analysis.indicators.rsi.is_ready());
        assert!(analysis.indicators.bollinger_bands.is_ready());
        assert!(!analysis.indicators.macd.is_ready());
        assert!(!analysis.indicators.moving_averages.sma_medium.is_ready());
        assert_eq!(analysis.indicators.moving_averages.long_term_trend, None);
        assert_eq!(analysis.data_points, 25);
        assert!(analysis.signals.total_signals >= 3);
    }

    #[test]
    fn test_analyze_output_shape() {
        let engine = TechnicalAnalysisEngine::new();
        let analysis = engine.analyze(&series_from_closes(&wave(250)));
        let json = serde_json::to_value(&analysis).unwrap();

        for key in ["rsi", "macd", "moving_averages", "bollinger_bands", "support_resistance", "volume_analysis", "momentum"] {
            assert!(json["indicators"].get(key).is_some(), "missing {}", key);
        }
        assert!(json["signals"].get("overall").is_some());
        assert!(json["signals"].get("recommendation").is_some());
        assert!(analysis.indicators.moving_averages.long_term_trend.is_some());
    }

    #[test]
    fn test_analyze_batch_preserves_order() {
        let engine = TechnicalAnalysisEngine::new();
        let batch = vec![
            ("INFY".to_string(), series_from_closes(&wave(60))),
            ("TCS".to_string(), series_from_closes(&wave(90))),
            ("RELIANCE".to_string(), series_from_closes(&wave(30))),
        ];
        let results = engine.analyze_batch(&batch);
        let symbols: Vec<&str> = results.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(symbols, vec!["INFY", "TCS", "RELIANCE"]);
        assert_eq!(results[1].1, engine.analyze(&batch[1].1));
    }
}
