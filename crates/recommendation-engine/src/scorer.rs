use analysis_core::{AnalysisError, TradingSignal};
use serde::{Deserialize, Serialize};

use crate::horizon::{HorizonWeights, ScoreWeights, TimeHorizon};

/// Score assumed for a component that was not analysed
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Raw 0-100 component scores; `None` when that analysis is unavailable
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub technical: Option<f64>,
    pub fundamental: Option<f64>,
    pub sentiment: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Technical,
    Fundamental,
    Sentiment,
}

/// Component scores after defaults were filled in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScores {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// 0 to 100
    pub confidence: u8,
    pub scores: ResolvedScores,
    /// Share of the weight backed by real scores (1.0 when nothing is missing)
    pub effective_weight: f64,
    pub missing: Vec<Component>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl RecommendationAction {
    /// Bands are inclusive on their lower bound.
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            c if c >= 80 => RecommendationAction::StrongBuy,
            c if c >= 65 => RecommendationAction::Buy,
            c if c >= 40 => RecommendationAction::Hold,
            c if c >= 25 => RecommendationAction::Sell,
            _ => RecommendationAction::StrongSell,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            RecommendationAction::StrongBuy => "Strong Buy",
            RecommendationAction::Buy => "Buy",
            RecommendationAction::Hold => "Hold",
            RecommendationAction::Sell => "Sell",
            RecommendationAction::StrongSell => "Strong Sell",
        }
    }
}

fn resolve(score: Option<f64>) -> Option<f64> {
    score.filter(|s| s.is_finite()).map(|s| s.clamp(0.0, 100.0))
}

/// Weighted confidence. Never fails: missing or non-finite components count
/// as the neutral midpoint and their weight is left out of `effective_weight`.
pub fn score(scores: &ComponentScores, weights: &ScoreWeights) -> ConfidenceScore {
    let mut missing = Vec::new();
    let mut effective_weight = 0.0;
    let mut total = 0.0;

    let mut resolved = [0.0; 3];
    let parts = [
        (Component::Technical, scores.technical, weights.technical),
        (Component::Fundamental, scores.fundamental, weights.fundamental),
        (Component::Sentiment, scores.sentiment, weights.sentiment),
    ];

    for (slot, (component, raw, weight)) in parts.into_iter().enumerate() {
        let value = match resolve(raw) {
            Some(v) => {
                effective_weight += weight;
                v
            }
            None => {
                missing.push(component);
                NEUTRAL_SCORE
            }
        };
        resolved[slot] = value;
        total += value * weight;
    }

    ConfidenceScore {
        confidence: total.round().clamp(0.0, 100.0) as u8,
        scores: ResolvedScores {
            technical: resolved[0],
            fundamental: resolved[1],
            sentiment: resolved[2],
        },
        effective_weight,
        missing,
    }
}

/// Map the aggregated vote onto 0-100: 50 + 50 x (bullish ratio - bearish ratio).
/// `None` when no indicator could vote.
pub fn technical_score(signal: &TradingSignal) -> Option<f64> {
    if !signal.has_signals() {
        return None;
    }
    let net = signal.bullish_ratio() - signal.bearish_ratio();
    Some((NEUTRAL_SCORE + 50.0 * net).clamp(0.0, 100.0))
}

/// Confidence scorer with a weight set per horizon
#[derive(Debug, Clone, Default)]
pub struct RecommendationScorer {
    weights: HorizonWeights,
}

impl RecommendationScorer {
    pub fn new(weights: HorizonWeights) -> Result<Self, AnalysisError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self, horizon: TimeHorizon) -> ScoreWeights {
        self.weights.for_horizon(horizon)
    }

    pub fn score(&self, scores: &ComponentScores, horizon: TimeHorizon) -> ConfidenceScore {
        score(scores, &self.weights.for_horizon(horizon))
    }
}
