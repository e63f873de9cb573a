use crate::infra::{build_engine, load_responses};
use assessment_engine::config::{AppConfig, EngineConfig};
use assessment_engine::error::AppError;
use assessment_engine::scoring::{
    sample_responses, AssessmentTypeSummary, SampleStyle, ScoringEngine, ScoringError,
    ScoringResult,
};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Assessment type to score against (e.g. personality, career, communication)
    pub(crate) assessment_type: String,
    /// CSV export with item_id,kind,value,response_time_ms,timestamp,gesture columns
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Load assessment types from this JSON registry instead of the configured one
    #[arg(long)]
    pub(crate) registry: Option<PathBuf>,
    /// Print the full result as JSON instead of a readable summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Load assessment types from this JSON registry instead of the configured one
    #[arg(long)]
    pub(crate) registry: Option<PathBuf>,
    /// Print the catalog as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SampleArgs {
    /// Assessment type to generate answers for
    pub(crate) assessment_type: String,
    /// Answer style: balanced (mid-scale) or favorable (best-light answers everywhere)
    #[arg(long, default_value_t = SampleStyle::Balanced)]
    pub(crate) style: SampleStyle,
    /// Score the generated stream and print the summary instead of the stream itself
    #[arg(long)]
    pub(crate) score: bool,
    /// Load assessment types from this JSON registry instead of the configured one
    #[arg(long)]
    pub(crate) registry: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        assessment_type,
        responses,
        registry,
        json,
    } = args;

    let engine = engine_for(registry)?;
    let stream = load_responses(&responses)?;
    let result = engine.score_attempt(&assessment_type, &stream)?;

    if json {
        print_json(&result);
    } else {
        println!(
            "Scored {} responses from {}",
            stream.len(),
            responses.display()
        );
        render_result(&result);
    }
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let engine = engine_for(args.registry)?;
    let summaries: Vec<AssessmentTypeSummary> = engine
        .registry()
        .configs()
        .map(|config| config.summary())
        .collect();

    if args.json {
        print_json(&summaries);
        return Ok(());
    }

    println!("Assessment catalog ({} types)", summaries.len());
    for summary in &summaries {
        println!("- {} ({})", summary.id, summary.title);
        println!(
            "  {} items ({} validity probes) | {} archetypes | {} candidates",
            summary.item_count, summary.probe_count, summary.archetype_count, summary.candidate_count
        );
        let dimensions: Vec<&str> = summary
            .dimensions
            .iter()
            .map(|dimension| dimension.as_str())
            .collect();
        println!("  Dimensions: {}", dimensions.join(", "));
    }
    Ok(())
}

pub(crate) fn run_sample(args: SampleArgs) -> Result<(), AppError> {
    let SampleArgs {
        assessment_type,
        style,
        score,
        registry,
    } = args;

    let engine = engine_for(registry)?;
    let config = engine
        .registry()
        .get(&assessment_type)
        .ok_or_else(|| ScoringError::InvalidAssessmentType(assessment_type.clone()))?;
    let responses = sample_responses(&config, style);

    if !score {
        print_json(&responses);
        return Ok(());
    }

    let result = engine.score_attempt(&assessment_type, &responses)?;
    println!(
        "Sample attempt ({style}) with {} responses",
        responses.len()
    );
    render_result(&result);
    Ok(())
}

fn engine_for(registry: Option<PathBuf>) -> Result<ScoringEngine, AppError> {
    let mut engine_config: EngineConfig = AppConfig::load()?.engine;
    if registry.is_some() {
        engine_config.registry_path = registry;
    }
    build_engine(&engine_config)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("unable to render json: {err}"),
    }
}

pub(crate) fn render_result(result: &ScoringResult) {
    println!(
        "Assessment: {} | overall {:.1}",
        result.assessment_type, result.overall_score
    );

    println!("Dimensions:");
    for score in &result.dimension_scores {
        let raw = score
            .raw_score
            .map(|raw| format!("{raw:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  - {:<22} {:>5.1} (p{:>2}, {:?}) raw {} from {} answers",
            score.dimension.as_str(),
            score.scaled_score,
            score.percentile,
            score.level,
            raw,
            score.sample_count
        );
    }

    let profile = &result.profile;
    println!(
        "Profile: {} (confidence {:.0}%)",
        profile.name,
        profile.confidence * 100.0
    );
    if !profile.strengths.is_empty() {
        println!("  Strengths: {}", profile.strengths.join("; "));
    }
    if !profile.challenges.is_empty() {
        println!("  Challenges: {}", profile.challenges.join("; "));
    }

    let validity = &result.validity_metrics;
    println!(
        "Validity: {} | consistency {:.1} | authenticity {:.1} | engagement {:.1}",
        validity.reliability_verdict.label(),
        validity.consistency,
        validity.authenticity_score,
        validity.engagement_level
    );
    println!(
        "  fake-good {:.1} | fake-bad {:.1} | social desirability {:.1} | speed {:.1} | pattern {}",
        validity.fake_good_index,
        validity.fake_bad_index,
        validity.social_desirability_bias,
        validity.speed_flag_score,
        if validity.pattern_flag { "flagged" } else { "clear" }
    );
    if !validity.triggered_indicators.is_empty() {
        let indicators: Vec<String> = validity
            .triggered_indicators
            .iter()
            .map(|indicator| format!("{indicator:?}"))
            .collect();
        println!("  Triggered: {}", indicators.join(", "));
    }

    if result.recommendations.is_empty() {
        println!("Recommendations: none configured");
    } else {
        println!("Recommendations:");
        for item in &result.recommendations {
            println!(
                "  - {:>5.1}% {} [{}]",
                item.match_percentage, item.title, item.category
            );
        }
    }

    if !result.issues.is_empty() {
        println!("Skipped responses:");
        for issue in &result.issues {
            println!(
                "  - #{} {}: {}",
                issue.position, issue.item_id, issue.detail
            );
        }
    }
}
