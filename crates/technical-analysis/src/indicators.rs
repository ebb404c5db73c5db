//! Raw indicator series.
//!
//! Every function returns only the defined part of the series: the first
//! element lines up with the first input index where the indicator has a full
//! window. Nothing is zero-padded. An empty vec means "not enough data".

use statrs::statistics::Statistics;

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average, seeded with the SMA of the first `period` values.
/// `result[0]` corresponds to `data[period - 1]`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = data[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(data.len() - period + 1);
    result.push(seed);
    for &price in &data[period..] {
        let prev = result[result.len() - 1];
        result.push(price * multiplier + prev * (1.0 - multiplier));
    }
    result
}

/// Relative Strength Index with Wilder smoothing.
/// `result[0]` corresponds to `data[period]`.
pub fn rsi(data: &[f64], period: usize, loss_floor: f64) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let to_rsi = |gain: f64, loss: f64| {
        let rs = gain / loss.max(loss_floor);
        100.0 - (100.0 / (1.0 + rs))
    };

    let mut rsi_values = Vec::with_capacity(data.len() - period);
    rsi_values.push(to_rsi(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        rsi_values.push(to_rsi(avg_gain, avg_loss));
    }

    rsi_values
}

/// MACD (Moving Average Convergence Divergence)
#[derive(Debug, Clone, Default)]
pub struct MacdResult {
    /// fast EMA - slow EMA, starting at `data[slow - 1]`
    pub macd_line: Vec<f64>,
    /// EMA of the MACD line, starting at `macd_line[signal - 1]`
    pub signal_line: Vec<f64>,
    /// Aligned with `signal_line`
    pub histogram: Vec<f64>,
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    if fast_period == 0 || signal_period == 0 || slow_period <= fast_period {
        return MacdResult::default();
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);
    if ema_slow.is_empty() {
        return MacdResult::default();
    }

    // ema_fast starts (slow - fast) points earlier than ema_slow
    let offset = slow_period - fast_period;
    let macd_line: Vec<f64> = (offset..ema_fast.len())
        .map(|i| ema_fast[i] - ema_slow[i - offset])
        .collect();

    let signal_line = ema(&macd_line, signal_period);

    let hist_offset = macd_line.len().saturating_sub(signal_line.len());
    let histogram = signal_line
        .iter()
        .enumerate()
        .map(|(i, s)| macd_line[i + hist_offset] - s)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands
#[derive(Debug, Clone, Default)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bands at `k` population standard deviations around the SMA.
pub fn bollinger_bands(data: &[f64], period: usize, k: f64) -> BollingerBands {
    if period == 0 || data.len() < period {
        return BollingerBands::default();
    }

    let middle = sma(data, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (i, mean) in middle.iter().enumerate() {
        let window = &data[i..i + period];
        let std = window.population_std_dev();

        upper.push(mean + k * std);
        lower.push(mean - k * std);
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// On-Balance Volume, starting from zero at the first point.
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let n = closes.len().min(volumes.len());
    if n == 0 {
        return vec![];
    }

    let mut obv_values = Vec::with_capacity(n);
    obv_values.push(0.0);

    for i in 1..n {
        let prev_obv = obv_values[i - 1];
        let new_obv = if closes[i] > closes[i - 1] {
            prev_obv + volumes[i]
        } else if closes[i] < closes[i - 1] {
            prev_obv - volumes[i]
        } else {
            prev_obv
        };
        obv_values.push(new_obv);
    }

    obv_values
}

/// Volume-Price Trend: running sum of volume x fractional price change.
pub fn volume_price_trend(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let n = closes.len().min(volumes.len());
    if n == 0 {
        return vec![];
    }

    let mut vpt = Vec::with_capacity(n);
    vpt.push(0.0);

    for i in 1..n {
        let change = if closes[i - 1] != 0.0 {
            (closes[i] - closes[i - 1]) / closes[i - 1]
        } else {
            0.0
        };
        vpt.push(vpt[i - 1] + volumes[i] * change);
    }

    vpt
}

/// Rate of change in percent over `period` points. `result[0]` corresponds to `data[period]`.
pub fn rate_of_change(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return vec![];
    }

    (period..data.len())
        .map(|i| {
            let base = data[i - period];
            if base != 0.0 {
                (data[i] - base) / base * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Stochastic Oscillator
#[derive(Debug, Clone, Default)]
pub struct StochasticResult {
    pub k: Vec<f64>,
    /// SMA of %K, aligned with the tail of `k`
    pub d: Vec<f64>,
}

pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> StochasticResult {
    let n = closes.len().min(highs.len()).min(lows.len());
    if k_period == 0 || n < k_period {
        return StochasticResult::default();
    }

    let mut k_values = Vec::with_capacity(n - k_period + 1);

    for i in k_period - 1..n {
        let (highest, lowest) = window_range(&highs[i + 1 - k_period..=i], &lows[i + 1 - k_period..=i]);

        let k = if highest == lowest {
            50.0
        } else {
            100.0 * (closes[i] - lowest) / (highest - lowest)
        };

        k_values.push(k);
    }

    let d_values = sma(&k_values, d_period);

    StochasticResult {
        k: k_values,
        d: d_values,
    }
}

/// Williams %R, in [-100, 0]. `result[0]` corresponds to `data[period - 1]`.
pub fn williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len().min(highs.len()).min(lows.len());
    if period == 0 || n < period {
        return vec![];
    }

    (period - 1..n)
        .map(|i| {
            let (highest, lowest) = window_range(&highs[i + 1 - period..=i], &lows[i + 1 - period..=i]);
            if highest == lowest {
                -50.0
            } else {
                -100.0 * (highest - closes[i]) / (highest - lowest)
            }
        })
        .collect()
}

/// Commodity Channel Index over the typical price (H+L+C)/3.
pub fn cci(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len().min(highs.len()).min(lows.len());
    if period == 0 || n < period {
        return vec![];
    }

    let typical: Vec<f64> = (0..n).map(|i| (highs[i] + lows[i] + closes[i]) / 3.0).collect();

    (period - 1..n)
        .map(|i| {
            let window = &typical[i + 1 - period..=i];
            let mean = window.mean();
            let mean_deviation = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
            if mean_deviation == 0.0 {
                0.0
            } else {
                (typical[i] - mean) / (0.015 * mean_deviation)
            }
        })
        .collect()
}

fn window_range(highs: &[f64], lows: &[f64]) -> (f64, f64) {
    let highest = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = lows.iter().copied().fold(f64::INFINITY, f64::min);
    (highest, lowest)
}

/// Pivot highs and lows as `(index, value)` pairs in chronological order.
#[derive(Debug, Clone, Default)]
pub struct PivotPoints {
    pub highs: Vec<(usize, f64)>,
    pub lows: Vec<(usize, f64)>,
}

/// Strict local extrema over a `2 * lookback + 1` window.
///
/// A tie with any neighbour disqualifies the point, so flat tops and bottoms
/// produce no pivots.
pub fn pivot_points(highs: &[f64], lows: &[f64], lookback: usize) -> PivotPoints {
    let n = highs.len().min(lows.len());
    let mut pivots = PivotPoints::default();
    if lookback == 0 || n < 2 * lookback + 1 {
        return pivots;
    }

    for i in lookback..n - lookback {
        let window = i - lookback..=i + lookback;

        if window.clone().filter(|&j| j != i).all(|j| highs[j] < highs[i]) {
            pivots.highs.push((i, highs[i]));
        }
        if window.filter(|&j| j != i).all(|j| lows[j] > lows[i]) {
            pivots.lows.push((i, lows[i]));
        }
    }

    pivots
}
