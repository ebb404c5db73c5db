#[cfg(test)]
mod recommendation_tests {
    use crate::fundamentals::FundamentalMetrics;
    use crate::horizon::{HorizonWeights, ScoreWeights, TimeHorizon};
    use crate::recommender::{RecommendationInputs, Recommender};
    use crate::scorer::{Component, RecommendationAction, RecommendationScorer};
    use crate::targets::EntryPolicy;
    use analysis_core::{AnalysisError, PricePoint, PriceSeries};
    use chrono::{Duration, TimeZone, Utc};
    use technical_analysis::TechnicalAnalysisEngine;

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
                volume: 200_000 + (i as u64 % 5) * 25_000,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    /// Ten points: too short for every voting indicator
    fn short_series() -> PriceSeries {
        let closes: Vec<f64> = (0..10).map(|i| 109.0 - i as f64).collect();
        series_from_closes(&closes)
    }

    fn trending_series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 500.0 + i as f64 * 1.5 + 8.0 * (i as f64 / 4.0).sin())
            .collect();
        series_from_closes(&closes)
    }

    fn strong_fundamentals() -> FundamentalMetrics {
        FundamentalMetrics {
            pe_ratio: Some(11.0),
            roe: Some(24.0),
            debt_to_equity: Some(0.3),
            profit_margin: Some(21.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let recommender = Recommender::new();
        let err = recommender
            .recommend("  ", &short_series(), TimeHorizon::Daily, &RecommendationInputs::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData(_)));
    }

    #[test]
    fn test_sentiment_out_of_range_is_clamped() {
        let recommender = Recommender::new();
        let inputs = RecommendationInputs { sentiment: Some(140.0), ..Default::default() };
        let rec = recommender
            .recommend("TCS", &short_series(), TimeHorizon::Weekly, &inputs)
            .unwrap();

        assert_eq!(rec.scores.sentiment, 100.0);
        // 50 x 0.8 + 100 x 0.2
        assert_eq!(rec.confidence, 60);
        assert_eq!(rec.action, RecommendationAction::Hold);
    }

    #[test]
    fn test_short_history_falls_back_to_neutral_hold() {
        let recommender = Recommender::new();
        let rec = recommender
            .recommend("INFY", &short_series(), TimeHorizon::Weekly, &RecommendationInputs::default())
            .unwrap();

        assert_eq!(rec.symbol, "INFY");
        assert_eq!(rec.technical_signal.total_signals, 0);
        assert_eq!(
            rec.missing_components,
            vec![Component::Technical, Component::Fundamental, Component::Sentiment]
        );
        assert_eq!(rec.effective_weight, 0.0);
        assert_eq!(rec.confidence, 50);
        assert_eq!(rec.action, RecommendationAction::Hold);

        // No support levels: stop falls back to the 4% weekly floor
        assert_eq!(rec.entry_price, 100.0);
        assert_eq!(rec.stop_loss, 96.0);
        // 5% x 0.5
        assert_eq!(rec.target_price, 102.5);
        assert_eq!(rec.expected_return, 2.5);
    }

    #[test]
    fn test_fundamentals_drive_yearly_call() {
        let recommender = Recommender::new();
        let inputs = RecommendationInputs {
            fundamentals: Some(strong_fundamentals()),
            sentiment: Some(90.0),
            ..Default::default()
        };
        let rec = recommender
            .recommend("HDFCBANK", &short_series(), TimeHorizon::Yearly, &inputs)
            .unwrap();

        // 50 x 0.2 + 100 x 0.7 + 90 x 0.1
        assert_eq!(rec.confidence, 89);
        assert_eq!(rec.action, RecommendationAction::StrongBuy);
        assert_eq!(rec.missing_components, vec![Component::Technical]);
        assert!((rec.effective_weight - 0.8).abs() < 1e-9);
        assert_eq!(rec.scores.fundamental, 100.0);
        assert!(rec.fundamental_reason.as_deref().unwrap_or("").contains("Strong ROE"));
    }

    #[test]
    fn test_same_inputs_weigh_differently_per_horizon() {
        let recommender = Recommender::new();
        let inputs = RecommendationInputs {
            fundamentals: Some(strong_fundamentals()),
            ..Default::default()
        };
        let recs = recommender
            .recommend_all_horizons("ITC", &short_series(), &inputs)
            .unwrap();

        let horizons: Vec<TimeHorizon> = recs.iter().map(|r| r.time_horizon).collect();
        assert_eq!(horizons, TimeHorizon::all().to_vec());

        // Fundamental weight grows with the horizon
        // daily 50*0.9 + 100*0.1, weekly 50*0.8 + 100*0.2, monthly 50*0.6 + 100*0.4, yearly 50*0.3 + 100*0.7
        let confidences: Vec<u8> = recs.iter().map(|r| r.confidence).collect();
        assert_eq!(confidences, vec![55, 60, 70, 85]);
    }

    #[test]
    fn test_full_history_invariants() {
        let recommender = Recommender::new();
        let series = trending_series(260);
        let inputs = RecommendationInputs { sentiment: Some(60.0), ..Default::default() };

        for rec in recommender.recommend_all_horizons("RELIANCE", &series, &inputs).unwrap() {
            assert!(rec.technical_signal.has_signals());
            assert!(!rec.missing_components.contains(&Component::Technical));
            assert!(rec.confidence <= 100);
            assert_eq!(rec.action, RecommendationAction::from_confidence(rec.confidence));
            assert!(rec.target_price >= rec.entry_price);
            assert!(rec.stop_loss < rec.entry_price);
            assert!(rec.expected_return >= 0.0);
            assert!((0.0..=100.0).contains(&rec.scores.technical));
        }
    }

    #[test]
    fn test_support_pullback_entry_never_above_market() {
        let recommender = Recommender::new();
        let series = trending_series(120);
        let last_close = series.last().unwrap().close;

        let inputs = RecommendationInputs {
            entry_policy: EntryPolicy::SupportPullback,
            ..Default::default()
        };
        let rec = recommender
            .recommend("SBIN", &series, TimeHorizon::Daily, &inputs)
            .unwrap();

        assert!(rec.entry_price <= (last_close * 100.0).round() / 100.0 + 1e-9);
        assert!(rec.entry_price >= last_close * 0.97 - 0.01);
        assert!(rec.stop_loss < rec.entry_price);
    }

    #[test]
    fn test_custom_weights_are_used() {
        let mut weights = HorizonWeights::default();
        weights.daily = ScoreWeights::new(0.0, 0.0, 1.0).unwrap();
        let scorer = RecommendationScorer::new(weights).unwrap();
        let recommender = Recommender::with_parts(TechnicalAnalysisEngine::new(), scorer);

        let inputs = RecommendationInputs { sentiment: Some(20.0), ..Default::default() };
        let rec = recommender
            .recommend("WIPRO", &short_series(), TimeHorizon::Daily, &inputs)
            .unwrap();

        assert_eq!(rec.confidence, 20);
        assert_eq!(rec.action, RecommendationAction::StrongSell);
    }

    #[test]
    fn test_batch_preserves_order_and_errors() {
        let recommender = Recommender::new();
        let batch = vec![
            ("TCS".to_string(), short_series()),
            ("".to_string(), short_series()),
            ("INFY".to_string(), trending_series(80)),
        ];
        let results = recommender.recommend_batch(&batch, TimeHorizon::Monthly, &RecommendationInputs::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().symbol, "TCS");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().symbol, "INFY");
    }

    #[test]
    fn test_recommendation_serializes_snake_case() {
        let recommender = Recommender::new();
        let rec = recommender
            .recommend("TCS", &short_series(), TimeHorizon::Monthly, &RecommendationInputs::default())
            .unwrap();

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["time_horizon"], "monthly");
        assert_eq!(json["action"], "hold");
        assert_eq!(json["missing_components"][0], "technical");
        assert!(json.get("fundamental_reason").is_none());
    }
}
