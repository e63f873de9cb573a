//! Behavioral properties of the scoring engine checked through its public surface.
//!
//! Every scenario runs against the built-in registry or a registry loaded from JSON, the same
//! way the API service wires the engine.

mod common {
    use std::sync::Arc;

    use assessment_engine::scoring::{AssessmentTypeConfig, ScoringEngine};

    pub(super) const ASSESSMENT_TYPES: [&str; 3] = ["personality", "career", "communication"];

    pub(super) fn engine() -> ScoringEngine {
        ScoringEngine::standard().expect("standard registry loads")
    }

    pub(super) fn config(engine: &ScoringEngine, assessment_type: &str) -> Arc<AssessmentTypeConfig> {
        engine
            .registry()
            .get(assessment_type)
            .expect("built-in assessment type")
    }
}

use std::sync::Arc;

use assessment_engine::scoring::{
    sample_responses, AssessmentRegistry, ReliabilityVerdict, Response, SampleStyle,
    ScoringEngine,
};
use common::*;

#[test]
fn every_type_scores_an_empty_stream_as_neutral() {
    let engine = engine();

    for assessment_type in ASSESSMENT_TYPES {
        let config = config(&engine, assessment_type);
        let result = engine
            .score_attempt(assessment_type, &[])
            .expect("empty stream scores");

        assert_eq!(result.dimension_scores.len(), config.dimensions.len());
        assert!(result
            .dimension_scores
            .iter()
            .all(|score| score.scaled_score == 50.0 && score.raw_score.is_none()));
        assert_eq!(result.overall_score, 50.0);
        assert_eq!(
            result.validity_metrics.reliability_verdict,
            ReliabilityVerdict::Valid
        );
        assert!(result.issues.is_empty());
    }
}

#[test]
fn dimension_scores_follow_declaration_order() {
    let engine = engine();

    for assessment_type in ASSESSMENT_TYPES {
        let config = config(&engine, assessment_type);
        let result = engine
            .score_attempt(
                assessment_type,
                &sample_responses(&config, SampleStyle::Balanced),
            )
            .expect("scores");

        let scored: Vec<_> = result
            .dimension_scores
            .iter()
            .map(|score| score.dimension.clone())
            .collect();
        assert_eq!(scored, config.dimension_names());
    }
}

#[test]
fn dimension_scores_do_not_depend_on_answer_order() {
    let engine = engine();
    let config = config(&engine, "career");
    let forward = sample_responses(&config, SampleStyle::Favorable);
    let mut backward = forward.clone();
    backward.reverse();

    let first = engine.score_attempt("career", &forward).expect("scores");
    let second = engine.score_attempt("career", &backward).expect("scores");

    assert_eq!(first.dimension_scores, second.dimension_scores);
    assert_eq!(first.overall_score, second.overall_score);
    assert_eq!(first.profile, second.profile);
}

#[test]
fn stronger_swipes_never_lower_the_dimension() {
    let engine = engine();
    let mut previous = f64::MIN;

    for gesture in ["swipe_left", "skip", "swipe_right"] {
        let responses = vec![
            Response::choice("swipe-budget-model", "skip"),
            Response::choice("swipe-debug-code", gesture),
        ];
        let result = engine.score_attempt("career", &responses).expect("scores");
        let analytical = result
            .dimension("analytical")
            .expect("analytical")
            .scaled_score;

        assert!(analytical >= previous, "{gesture} lowered analytical");
        previous = analytical;
    }
}

#[test]
fn flattering_streams_are_never_trusted_outright() {
    let engine = engine();

    for assessment_type in ASSESSMENT_TYPES {
        let config = config(&engine, assessment_type);
        let result = engine
            .score_attempt(
                assessment_type,
                &sample_responses(&config, SampleStyle::Favorable),
            )
            .expect("scores");
        let validity = &result.validity_metrics;

        assert!(
            result.overall_score >= 90.0,
            "{assessment_type} scored {}",
            result.overall_score
        );
        assert!(
            validity.social_desirability_bias >= 80.0,
            "{assessment_type} did not register desirability"
        );
        assert!(validity.fake_good_index >= 60.0, "{assessment_type}");
        assert_eq!(
            validity.reliability_verdict,
            ReliabilityVerdict::Invalid,
            "{assessment_type}: {:?}",
            validity.triggered_indicators
        );
    }
}

#[test]
fn duplicated_career_ranks_undermine_consistency() {
    let engine = engine();
    let responses: Vec<Response> = [
        "rank-security",
        "rank-growth",
        "rank-impact",
        "rank-balance",
        "rank-income",
    ]
    .into_iter()
    .map(|item| Response::ranking(item, 1, 5))
    .collect();

    let result = engine.score_attempt("career", &responses).expect("scores");

    assert_eq!(result.scored_responses, 5);
    assert_eq!(result.validity_metrics.consistency, 40.0);
}

#[test]
fn registry_loaded_from_json_drives_scoring() {
    let json = r#"{
        "assessment_types": [{
            "id": "grit",
            "title": "Grit Check",
            "dimensions": [{"dimension": "grit", "normalization": {"scale": "symmetric", "bound": 5.0}}],
            "items": [
                {
                    "id": "g1", "kind": "choice",
                    "dimensions": [{"dimension": "grit"}],
                    "scoring": {"method": "options", "options": {"swipe_left": -5.0, "swipe_right": 5.0}}
                },
                {
                    "id": "g2", "kind": "choice",
                    "dimensions": [{"dimension": "grit"}],
                    "scoring": {"method": "options", "options": {"swipe_left": -5.0, "swipe_right": 5.0}}
                }
            ],
            "archetypes": [{"id": "finisher", "name": "Finisher", "weights": [{"dimension": "grit"}]}],
            "candidates": [
                {"id": "ultra", "title": "Ultramarathoner", "category": "career", "dimensions": ["grit"]}
            ],
            "recommendation_limit": 3
        }]
    }"#;
    let registry = AssessmentRegistry::from_reader(json.as_bytes()).expect("registry");
    let engine = ScoringEngine::new(Arc::new(registry));

    let result = engine
        .score_attempt(
            "grit",
            &[
                Response::choice("g1", "swipe_right"),
                Response::choice("g2", "swipe_right"),
            ],
        )
        .expect("scores");

    assert_eq!(result.assessment_type.as_str(), "grit");
    assert_eq!(result.overall_score, 100.0);
    assert_eq!(result.profile.archetype_id, "finisher");
    assert_eq!(result.profile.confidence, 1.0);
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].candidate_id, "ultra");
    assert_eq!(result.recommendations[0].match_percentage, 100.0);

    assert!(engine.score_attempt("personality", &[]).is_err());
}
