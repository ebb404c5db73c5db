use analysis_core::precision::round_price;
use analysis_core::{AnalysisError, PriceSeries, TradingSignal};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use technical_analysis::{TechnicalAnalysis, TechnicalAnalysisEngine};

use crate::fundamentals::{fundamental_score, FundamentalMetrics};
use crate::horizon::TimeHorizon;
use crate::scorer::{technical_score, Component, ComponentScores, RecommendationAction, RecommendationScorer, ResolvedScores};
use crate::targets::{derive_targets, EntryPolicy};

/// Caller-supplied inputs beyond the price history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationInputs {
    #[serde(default)]
    pub fundamentals: Option<FundamentalMetrics>,
    /// 0 to 100 from an external sentiment source; out-of-range values are clamped
    #[serde(default)]
    pub sentiment: Option<f64>,
    #[serde(default)]
    pub entry_policy: EntryPolicy,
}

/// One recommendation for one symbol and horizon. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecommendation {
    pub symbol: String,
    pub time_horizon: TimeHorizon,
    pub scores: ResolvedScores,
    pub confidence: u8,
    pub action: RecommendationAction,
    pub target_price: f64,
    pub stop_loss: f64,
    pub entry_price: f64,
    pub expected_return: f64,
    pub effective_weight: f64,
    pub missing_components: Vec<Component>,
    pub technical_signal: TradingSignal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamental_reason: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Turns a price series (plus optional fundamentals and sentiment) into scored
/// recommendations per horizon.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    engine: TechnicalAnalysisEngine,
    scorer: RecommendationScorer,
}

impl Recommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(engine: TechnicalAnalysisEngine, scorer: RecommendationScorer) -> Self {
        Self { engine, scorer }
    }

    pub fn engine(&self) -> &TechnicalAnalysisEngine {
        &self.engine
    }

    pub fn recommend(
        &self,
        symbol: &str,
        series: &PriceSeries,
        horizon: TimeHorizon,
        inputs: &RecommendationInputs,
    ) -> Result<ScoredRecommendation, AnalysisError> {
        validate_symbol(symbol)?;
        let analysis = self.engine.analyze(series);
        Ok(self.recommend_from_analysis(symbol, &analysis, horizon, inputs))
    }

    /// One recommendation per horizon, sharing a single technical analysis.
    pub fn recommend_all_horizons(
        &self,
        symbol: &str,
        series: &PriceSeries,
        inputs: &RecommendationInputs,
    ) -> Result<Vec<ScoredRecommendation>, AnalysisError> {
        validate_symbol(symbol)?;
        let analysis = self.engine.analyze(series);
        Ok(TimeHorizon::all()
            .into_iter()
            .map(|horizon| self.recommend_from_analysis(symbol, &analysis, horizon, inputs))
            .collect())
    }

    /// Score a batch of symbols in parallel; one result per input, in order.
    pub fn recommend_batch(
        &self,
        batch: &[(String, PriceSeries)],
        horizon: TimeHorizon,
        inputs: &RecommendationInputs,
    ) -> Vec<Result<ScoredRecommendation, AnalysisError>> {
        tracing::info!("Scoring {} symbols for {} horizon", batch.len(), horizon.name());
        batch
            .par_iter()
            .map(|(symbol, series)| self.recommend(symbol, series, horizon, inputs))
            .collect()
    }

    /// Score an existing analysis without recomputing indicators.
    pub fn recommend_from_analysis(
        &self,
        symbol: &str,
        analysis: &TechnicalAnalysis,
        horizon: TimeHorizon,
        inputs: &RecommendationInputs,
    ) -> ScoredRecommendation {
        let fundamental = inputs.fundamentals.as_ref().and_then(fundamental_score);

        let components = ComponentScores {
            technical: technical_score(&analysis.signals),
            fundamental: fundamental.as_ref().map(|f| f.score),
            sentiment: inputs.sentiment,
        };
        let confidence = self.scorer.score(&components, horizon);
        let action = RecommendationAction::from_confidence(confidence.confidence);

        let supports: Vec<f64> = analysis
            .indicators
            .support_resistance
            .ready()
            .map(|levels| levels.support.clone())
            .unwrap_or_default();
        let targets = derive_targets(
            analysis.current_price,
            &supports,
            confidence.confidence,
            horizon,
            inputs.entry_policy,
        );

        if !confidence.missing.is_empty() {
            tracing::debug!(
                "{} {}: scored without {:?} (effective weight {:.2})",
                symbol,
                horizon.name(),
                confidence.missing,
                confidence.effective_weight
            );
        }
        tracing::info!(
            "{} {} recommendation: {} (confidence {})",
            symbol,
            horizon.name(),
            action.to_label(),
            confidence.confidence
        );

        ScoredRecommendation {
            symbol: symbol.to_string(),
            time_horizon: horizon,
            scores: ResolvedScores {
                technical: round_price(confidence.scores.technical),
                fundamental: round_price(confidence.scores.fundamental),
                sentiment: round_price(confidence.scores.sentiment),
            },
            confidence: confidence.confidence,
            action,
            target_price: targets.target_price,
            stop_loss: targets.stop_loss,
            entry_price: targets.entry_price,
            expected_return: targets.expected_return,
            effective_weight: confidence.effective_weight,
            missing_components: confidence.missing,
            technical_signal: analysis.signals.clone(),
            fundamental_reason: fundamental.map(|f| f.reason),
            generated_at: Utc::now(),
        }
    }
}

fn validate_symbol(symbol: &str) -> Result<(), AnalysisError> {
    if symbol.trim().is_empty() {
        return Err(AnalysisError::InvalidData("symbol must not be empty".to_string()));
    }
    Ok(())
}
