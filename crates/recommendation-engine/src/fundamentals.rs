use analysis_core::precision::round_price;
use serde::{Deserialize, Serialize};

/// Valuation and quality ratios supplied by the caller.
/// Percent-valued fields use percent units (ROE 18.0 means 18%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalMetrics {
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub profit_margin: Option<f64>,
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalAssessment {
    /// 0 to 100
    pub score: f64,
    pub reason: String,
}

/// Score the ratios the way the technical votes are scored: each triggered
/// check adds a weighted bullish or bearish signal, and the net weight is
/// mapped onto 0-100 around the neutral 50. `None` when no metric is present.
pub fn fundamental_score(metrics: &FundamentalMetrics) -> Option<FundamentalAssessment> {
    let present = [
        metrics.pe_ratio,
        metrics.pb_ratio,
        metrics.roe,
        metrics.debt_to_equity,
        metrics.profit_margin,
        metrics.revenue_growth,
        metrics.dividend_yield,
    ];
    if present.iter().all(|m| m.map_or(true, |v| !v.is_finite())) {
        return None;
    }

    let finite = |m: Option<f64>| m.filter(|v| v.is_finite());
    let mut signals: Vec<(&'static str, i32, bool)> = Vec::new();

    // P/E: <15 undervalued, >30 expensive, negative means losses
    if let Some(pe) = finite(metrics.pe_ratio) {
        if pe <= 0.0 {
            signals.push(("Negative Earnings", 3, false));
        } else if pe < 15.0 {
            signals.push(("Low P/E Ratio", 3, true));
        } else if pe > 30.0 {
            signals.push(("High P/E Ratio", 2, false));
        }
    }

    if let Some(pb) = finite(metrics.pb_ratio) {
        if pb > 0.0 && pb < 1.5 {
            signals.push(("Low P/B Ratio", 2, true));
        } else if pb > 5.0 {
            signals.push(("High P/B Ratio", 1, false));
        }
    }

    if let Some(roe) = finite(metrics.roe) {
        if roe > 15.0 {
            signals.push(("Strong ROE", 3, true));
        } else if roe < 5.0 {
            signals.push(("Weak ROE", 2, false));
        }
    }

    if let Some(margin) = finite(metrics.profit_margin) {
        if margin > 20.0 {
            signals.push(("High Profit Margin", 3, true));
        } else if margin < 5.0 {
            signals.push(("Low Profit Margin", 2, false));
        }
    }

    // D/E < 0.5 conservative, > 2.0 aggressive
    if let Some(d2e) = finite(metrics.debt_to_equity) {
        if d2e < 0.5 {
            signals.push(("Low Debt", 2, true));
        } else if d2e > 2.0 {
            signals.push(("High Debt", 3, false));
        }
    }

    if let Some(growth) = finite(metrics.revenue_growth) {
        if growth > 15.0 {
            signals.push(("Strong Revenue Growth", 2, true));
        } else if growth < 0.0 {
            signals.push(("Shrinking Revenue", 2, false));
        }
    }

    if let Some(yield_pct) = finite(metrics.dividend_yield) {
        if yield_pct > 2.0 {
            signals.push(("Dividend Payer", 1, true));
        }
    }

    let mut total_score = 0;
    let mut total_weight = 0;
    for (_, weight, bullish) in &signals {
        total_weight += weight;
        total_score += if *bullish { *weight } else { -weight };
    }

    let score = if total_weight > 0 {
        50.0 + 50.0 * total_score as f64 / total_weight as f64
    } else {
        50.0
    };

    let reason = signals
        .iter()
        .map(|(name, _, bullish)| format!("{} {}", if *bullish { "+" } else { "-" }, name))
        .collect::<Vec<_>>()
        .join(", ");

    Some(FundamentalAssessment {
        score: round_price(score),
        reason: if reason.is_empty() { "Ratios within normal ranges".to_string() } else { reason },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_metrics_is_none() {
        assert!(fundamental_score(&FundamentalMetrics::default()).is_none());
        let nan_only = FundamentalMetrics { roe: Some(f64::NAN), ..Default::default() };
        assert!(fundamental_score(&nan_only).is_none());
    }

    #[test]
    fn test_quality_company_scores_high() {
        let metrics = FundamentalMetrics {
            pe_ratio: Some(12.0),
            roe: Some(22.0),
            debt_to_equity: Some(0.2),
            profit_margin: Some(25.0),
            revenue_growth: Some(18.0),
            ..Default::default()
        };
        let a = fundamental_score(&metrics).unwrap();
        assert_eq!(a.score, 100.0);
        assert!(a.reason.contains("+ Strong ROE"));
    }

    #[test]
    fn test_mixed_company() {
        let metrics = FundamentalMetrics {
            pe_ratio: Some(45.0), // -2
            roe: Some(18.0), // +3
            debt_to_equity: Some(2.5), // -3
            ..Default::default()
        };
        let a = fundamental_score(&metrics).unwrap();
        // 50 + 50 * (-2 / 8)
        assert_eq!(a.score, 37.5);
        assert!(a.reason.contains("- High Debt"));
    }

    #[test]
    fn test_neutral_ratios() {
        let metrics = FundamentalMetrics { pe_ratio: Some(20.0), roe: Some(10.0), ..Default::default() };
        let a = fundamental_score(&metrics).unwrap();
        assert_eq!(a.score, 50.0);
        assert_eq!(a.reason, "Ratios within normal ranges");
    }
}
