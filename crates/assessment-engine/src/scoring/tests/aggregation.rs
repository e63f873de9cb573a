use std::sync::Arc;

use serde_json::json;

use super::common::*;
use crate::scoring::aggregation::{Aggregator, IssueKind, WrittenResponseScorer};
use crate::scoring::domain::{Dimension, Item, Response, ResponseValue};

struct FixedScorer(f64);

impl WrittenResponseScorer for FixedScorer {
    fn score(&self, _item: &Item, _text: &str) -> f64 {
        self.0
    }
}

#[test]
fn unknown_items_are_skipped_and_reported() {
    let engine = engine();
    let mut responses = one_answer_per_dimension("4");
    responses.insert(2, Response::choice("retired-item", "5"));

    let result = engine
        .score_attempt("personality", &responses)
        .expect("scores");

    assert_eq!(result.scored_responses, 5);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].kind, IssueKind::UnknownItem);
    assert_eq!(result.issues[0].position, 2);
    assert_eq!(
        result.dimension("openness").expect("openness").scaled_score,
        75.0
    );
}

#[test]
fn malformed_responses_do_not_contribute() {
    let engine = engine();
    let responses = vec![
        Response::choice("ope-1", "5"),
        Response::ranking("ope-2", 1, 5),
        Response::choice("ope-3", "seven"),
    ];

    let result = engine
        .score_attempt("personality", &responses)
        .expect("scores");

    let openness = result.dimension("openness").expect("openness");
    assert_eq!(openness.sample_count, 1);
    assert_eq!(openness.scaled_score, 100.0);
    assert_eq!(result.issues.len(), 2);
    assert!(result
        .issues
        .iter()
        .all(|issue| issue.kind == IssueKind::Malformed));
}

#[test]
fn unreadable_submissions_keep_their_position() {
    let engine = engine();
    let responses: Vec<Response> = [
        json!({"item_id": "rank-growth", "value": {"kind": "ranking", "rank": 1, "total": 5}}),
        json!({"item_id": "rank-income", "value": {"kind": "ranking", "rank": "first", "total": 5}}),
        json!({"value": {"kind": "choice", "option": "swipe_right"}}),
        json!({"item_id": "swipe-debug-code", "value": {"kind": "choice", "option": "swipe_right"}}),
    ]
    .into_iter()
    .map(Response::from_json)
    .collect();

    assert_eq!(responses[0].value, ResponseValue::Ranking { rank: 1, total: 5 });
    assert!(matches!(
        &responses[1].value,
        ResponseValue::Unreadable { raw, .. } if raw.contains("first")
    ));
    assert_eq!(responses[1].item_id.as_str(), "rank-income");
    assert_eq!(responses[2].item_id.as_str(), "");
    assert_eq!(responses[2].value.kind(), None);

    let result = engine.score_attempt("career", &responses).expect("scores");

    assert_eq!(result.scored_responses, 2);
    assert_eq!(
        result.dimension("value_growth").expect("growth").scaled_score,
        100.0
    );
    let income = result.dimension("value_income").expect("income");
    assert_eq!(income.sample_count, 0);
    assert_eq!(income.scaled_score, 50.0);
    assert_eq!(
        result.dimension("analytical").expect("analytical").scaled_score,
        100.0
    );

    let skipped: Vec<(usize, IssueKind)> = result
        .issues
        .iter()
        .map(|issue| (issue.position, issue.kind))
        .collect();
    assert_eq!(
        skipped,
        vec![(1, IssueKind::Malformed), (2, IssueKind::UnknownItem)]
    );
}

#[test]
fn probes_never_accumulate_into_dimensions() {
    let engine = engine();
    let config = config(&engine, "personality");
    let dimensions = config.dimension_names();
    let scorer = FixedScorer(0.0);

    let responses = vec![
        Response::choice("fg-never-late", "5"),
        Response::choice("fb-nothing-right", "5"),
        Response::scenario("sd-white-lie", "never"),
        Response::choice("ext-1-repeat", "5"),
    ];
    let outcome = Aggregator::new(&config.items, &dimensions, &scorer).aggregate(&responses);

    assert_eq!(outcome.probe_responses, 4);
    assert_eq!(outcome.scored_responses, 0);
    assert!(outcome
        .accumulations
        .iter()
        .all(|accumulation| accumulation.sample_count == 0));
}

#[test]
fn accumulations_follow_declared_dimension_order() {
    let engine = engine();
    let config = config(&engine, "career");
    let dimensions = config.dimension_names();
    let scorer = FixedScorer(0.0);

    let outcome = Aggregator::new(&config.items, &dimensions, &scorer).aggregate(&[]);
    let order: Vec<&Dimension> = outcome
        .accumulations
        .iter()
        .map(|accumulation| &accumulation.dimension)
        .collect();
    assert_eq!(order, dimensions.iter().collect::<Vec<_>>());
}

#[test]
fn first_ranked_value_contributes_full_weight() {
    let engine = engine();
    let responses = vec![
        Response::ranking("rank-growth", 1, 5),
        Response::ranking("rank-income", 5, 5),
        Response::ranking("rank-impact", 3, 5),
    ];

    let result = engine.score_attempt("career", &responses).expect("scores");

    let growth = result.dimension("value_growth").expect("growth");
    assert_eq!(growth.raw_score, Some(1.0));
    assert_eq!(growth.scaled_score, 100.0);
    let income = result.dimension("value_income").expect("income");
    assert_eq!(income.raw_score, Some(0.0));
    assert_eq!(income.scaled_score, 0.0);
    assert_eq!(
        result.dimension("value_impact").expect("impact").scaled_score,
        50.0
    );
}

#[test]
fn swipe_scores_use_symmetric_scale() {
    let engine = engine();
    let responses = vec![
        Response::choice("swipe-debug-code", "swipe_right"),
        Response::choice("swipe-budget-model", "skip"),
        Response::choice("swipe-sketch-brand", "swipe_left"),
    ];

    let result = engine.score_attempt("career", &responses).expect("scores");

    assert_eq!(
        result.dimension("analytical").expect("analytical").scaled_score,
        75.0
    );
    assert_eq!(
        result.dimension("creative").expect("creative").scaled_score,
        0.0
    );
}

#[test]
fn written_scoring_is_pluggable() {
    let engine = engine().with_written_scorer(Arc::new(FixedScorer(64.0)));
    let responses = vec![Response::written("wr-difficult-feedback", "anything at all")];

    let result = engine
        .score_attempt("communication", &responses)
        .expect("scores");

    assert_eq!(
        result.dimension("empathy").expect("empathy").scaled_score,
        64.0
    );
}

#[test]
fn keyword_scoring_rewards_marker_terms() {
    let engine = engine();
    let responses = vec![
        Response::written(
            "wr-project-update",
            "Summary: the deadline moved, next steps below because QA slipped.",
        ),
        Response::written("wr-difficult-feedback", "Fine."),
    ];

    let result = engine
        .score_attempt("communication", &responses)
        .expect("scores");

    // baseline 20 + summary 15 + deadline 15 + next steps 20 + because 10
    assert_eq!(result.dimension("clarity").expect("clarity").scaled_score, 80.0);
    assert_eq!(result.dimension("empathy").expect("empathy").scaled_score, 20.0);
}

#[test]
fn processing_speed_follows_elapsed_time() {
    let engine = engine();

    let fast = engine
        .score_attempt(
            "communication",
            &[Response::simulation("sim-inbox-triage", None).with_response_time(3_000)],
        )
        .expect("scores");
    assert_eq!(
        fast.dimension("processing_speed").expect("speed").scaled_score,
        100.0
    );

    let midway = engine
        .score_attempt(
            "communication",
            &[Response::simulation("sim-inbox-triage", None).with_response_time(17_000)],
        )
        .expect("scores");
    assert_eq!(
        midway.dimension("processing_speed").expect("speed").scaled_score,
        50.0
    );

    let untimed = engine
        .score_attempt(
            "communication",
            &[Response::simulation("sim-inbox-triage", None)],
        )
        .expect("scores");
    assert_eq!(untimed.issues.len(), 1);
    assert_eq!(untimed.issues[0].kind, IssueKind::Malformed);
    assert_eq!(
        untimed
            .dimension("processing_speed")
            .expect("speed")
            .raw_score,
        None
    );
}

#[test]
fn raising_one_answer_never_lowers_its_dimension() {
    let engine = engine();
    let mut previous = f64::MIN;

    for option in ["1", "2", "3", "4", "5"] {
        let mut responses = likert_sweep("3");
        responses[3] = Response::choice("con-1", option);

        let result = engine
            .score_attempt("personality", &responses)
            .expect("scores");
        let score = result
            .dimension("conscientiousness")
            .expect("conscientiousness")
            .scaled_score;
        assert!(score >= previous, "{option} lowered the score");
        previous = score;
    }
}
