use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Investment horizon a recommendation is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl TimeHorizon {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            TimeHorizon::Daily => "daily",
            TimeHorizon::Weekly => "weekly",
            TimeHorizon::Monthly => "monthly",
            TimeHorizon::Yearly => "yearly",
        }
    }

    /// All horizons, shortest first
    pub fn all() -> [TimeHorizon; 4] {
        [
            TimeHorizon::Daily,
            TimeHorizon::Weekly,
            TimeHorizon::Monthly,
            TimeHorizon::Yearly,
        ]
    }

    /// Technical signals dominate short horizons, fundamentals long ones.
    pub fn default_weights(&self) -> ScoreWeights {
        match self {
            TimeHorizon::Daily => ScoreWeights { technical: 0.70, fundamental: 0.10, sentiment: 0.20 },
            TimeHorizon::Weekly => ScoreWeights { technical: 0.60, fundamental: 0.20, sentiment: 0.20 },
            TimeHorizon::Monthly => ScoreWeights { technical: 0.40, fundamental: 0.40, sentiment: 0.20 },
            TimeHorizon::Yearly => ScoreWeights { technical: 0.20, fundamental: 0.70, sentiment: 0.10 },
        }
    }

    /// Return (as a fraction) a 100-confidence call is expected to make over the horizon
    pub fn max_expected_return(&self) -> f64 {
        match self {
            TimeHorizon::Daily => 0.02,
            TimeHorizon::Weekly => 0.05,
            TimeHorizon::Monthly => 0.12,
            TimeHorizon::Yearly => 0.30,
        }
    }

    /// Stop distance (fraction below entry) used when no support level exists
    pub fn stop_loss_floor(&self) -> f64 {
        match self {
            TimeHorizon::Daily => 0.02,
            TimeHorizon::Weekly => 0.04,
            TimeHorizon::Monthly => 0.07,
            TimeHorizon::Yearly => 0.12,
        }
    }
}

impl FromStr for TimeHorizon {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "1d" => Ok(TimeHorizon::Daily),
            "weekly" | "1w" => Ok(TimeHorizon::Weekly),
            "monthly" | "1m" => Ok(TimeHorizon::Monthly),
            "yearly" | "1y" => Ok(TimeHorizon::Yearly),
            other => Err(AnalysisError::InvalidData(format!("unknown time horizon '{}'", other))),
        }
    }
}

/// Blend of component scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
}

impl ScoreWeights {
    pub fn new(technical: f64, fundamental: f64, sentiment: f64) -> Result<Self, AnalysisError> {
        let weights = Self { technical, fundamental, sentiment };
        weights.validate()?;
        Ok(weights)
    }

    pub fn sum(&self) -> f64 {
        self.technical + self.fundamental + self.sentiment
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let parts = [self.technical, self.fundamental, self.sentiment];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::Config("weights must be finite and non-negative".to_string()));
        }
        if (self.sum() - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AnalysisError::Config(format!(
                "weights must sum to 1.0, got {}",
                self.sum()
            )));
        }
        Ok(())
    }
}

/// Weight set for every horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonWeights {
    pub daily: ScoreWeights,
    pub weekly: ScoreWeights,
    pub monthly: ScoreWeights,
    pub yearly: ScoreWeights,
}

impl Default for HorizonWeights {
    fn default() -> Self {
        Self {
            daily: TimeHorizon::Daily.default_weights(),
            weekly: TimeHorizon::Weekly.default_weights(),
            monthly: TimeHorizon::Monthly.default_weights(),
            yearly: TimeHorizon::Yearly.default_weights(),
        }
    }
}

impl HorizonWeights {
    pub fn for_horizon(&self, horizon: TimeHorizon) -> ScoreWeights {
        match horizon {
            TimeHorizon::Daily => self.daily,
            TimeHorizon::Weekly => self.weekly,
            TimeHorizon::Monthly => self.monthly,
            TimeHorizon::Yearly => self.yearly,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for horizon in TimeHorizon::all() {
            self.for_horizon(horizon).validate().map_err(|e| {
                AnalysisError::Config(format!("{} weights: {}", horizon.name(), e))
            })?;
        }
        Ok(())
    }
}
