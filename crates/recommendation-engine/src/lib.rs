pub mod fundamentals;
pub mod horizon;
pub mod recommender;
pub mod scorer;
pub mod targets;

#[cfg(test)]
mod tests;

pub use fundamentals::{fundamental_score, FundamentalAssessment, FundamentalMetrics};
pub use horizon::{HorizonWeights, ScoreWeights, TimeHorizon};
pub use recommender::{RecommendationInputs, Recommender, ScoredRecommendation};
pub use scorer::{
    score, technical_score, Component, ComponentScores, ConfidenceScore, RecommendationAction,
    RecommendationScorer, ResolvedScores, NEUTRAL_SCORE,
};
pub use targets::{derive_targets, EntryPolicy, PriceTargets};
