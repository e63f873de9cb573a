use std::collections::BTreeMap;

use super::{AssessmentTypeConfig, DimensionSpec, RegistryError};
use crate::scoring::catalog::ItemCatalog;
use crate::scoring::domain::{
    AssessmentTypeId, Dimension, DimensionWeight, Item, ItemId, ItemKind, ItemScoring,
    SignalTable, SpeedCurve, ValidityKind,
};
use crate::scoring::normalization::NormalizationRule;
use crate::scoring::profile::Archetype;
use crate::scoring::ranking::{Candidate, CandidateCategory};

pub(super) fn assessment_types() -> Result<Vec<AssessmentTypeConfig>, RegistryError> {
    Ok(vec![personality()?, career()?, communication()?])
}

const LIKERT_STEPS: [(&str, f64); 5] = [
    ("1", 0.0),
    ("2", 25.0),
    ("3", 50.0),
    ("4", 75.0),
    ("5", 100.0),
];

fn options(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(option, delta)| (option.to_string(), *delta))
        .collect()
}

fn likert(id: &str, dimension: &str) -> Item {
    Item {
        id: ItemId::new(id),
        kind: ItemKind::Choice,
        dimensions: vec![DimensionWeight::unit(dimension)],
        scoring: ItemScoring::Options {
            options: options(&LIKERT_STEPS),
        },
        validity: None,
    }
}

fn likert_probe(id: &str, validity: ValidityKind) -> Item {
    Item {
        id: ItemId::new(id),
        kind: ItemKind::Choice,
        dimensions: Vec::new(),
        scoring: ItemScoring::Options {
            options: options(&LIKERT_STEPS),
        },
        validity: Some(validity),
    }
}

fn choice(id: &str, dimensions: &[&str], entries: &[(&str, f64)]) -> Item {
    option_item(id, ItemKind::Choice, dimensions, entries)
}

fn scenario(id: &str, dimensions: &[&str], entries: &[(&str, f64)]) -> Item {
    option_item(id, ItemKind::Scenario, dimensions, entries)
}

fn option_item(id: &str, kind: ItemKind, dimensions: &[&str], entries: &[(&str, f64)]) -> Item {
    Item {
        id: ItemId::new(id),
        kind,
        dimensions: dimensions
            .iter()
            .map(|dimension| DimensionWeight::unit(*dimension))
            .collect(),
        scoring: ItemScoring::Options {
            options: options(entries),
        },
        validity: None,
    }
}

fn repeat_probe(id: &str, paired_with: &str, entries: &[(&str, f64)]) -> Item {
    Item {
        id: ItemId::new(id),
        kind: ItemKind::Choice,
        dimensions: Vec::new(),
        scoring: ItemScoring::Options {
            options: options(entries),
        },
        validity: Some(ValidityKind::Inconsistency {
            paired_with: ItemId::new(paired_with),
            reversed: false,
        }),
    }
}

fn desirability_probe(id: &str, entries: &[(&str, f64)]) -> Item {
    Item {
        id: ItemId::new(id),
        kind: ItemKind::Scenario,
        dimensions: Vec::new(),
        scoring: ItemScoring::Options {
            options: options(entries),
        },
        validity: Some(ValidityKind::SocialDesirability),
    }
}

fn ranked_value(id: &str, dimension: &str) -> Item {
    Item {
        id: ItemId::new(id),
        kind: ItemKind::Ranking,
        dimensions: vec![DimensionWeight::unit(dimension)],
        scoring: ItemScoring::Rank,
        validity: None,
    }
}

fn keyword_item(
    id: &str,
    kind: ItemKind,
    dimension: &str,
    baseline: f64,
    terms: &[(&str, f64)],
) -> Item {
    Item {
        id: ItemId::new(id),
        kind,
        dimensions: vec![DimensionWeight::unit(dimension)],
        scoring: ItemScoring::Keywords {
            table: SignalTable {
                baseline,
                terms: options(terms),
                ceiling: 100.0,
            },
        },
        validity: None,
    }
}

fn archetype(
    id: &str,
    name: &str,
    weights: &[(&str, f64)],
    strengths: &[&str],
    challenges: &[&str],
) -> Archetype {
    Archetype {
        id: id.to_string(),
        name: name.to_string(),
        weights: weights
            .iter()
            .map(|(dimension, weight)| DimensionWeight::new(*dimension, *weight))
            .collect(),
        strengths: strengths.iter().map(|s| s.to_string()).collect(),
        challenges: challenges.iter().map(|s| s.to_string()).collect(),
    }
}

fn candidate(
    id: &str,
    title: &str,
    category: CandidateCategory,
    dimensions: &[&str],
    metadata: &[(&str, &str)],
) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: title.to_string(),
        category,
        dimensions: dimensions
            .iter()
            .map(|dimension| Dimension::new(*dimension))
            .collect(),
        metadata: metadata
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    }
}

fn percent_dimensions(names: &[&str]) -> Vec<DimensionSpec> {
    names
        .iter()
        .map(|name| DimensionSpec::new(*name, NormalizationRule::Percent))
        .collect()
}

const BIG_FIVE: [&str; 5] = [
    "openness",
    "conscientiousness",
    "extraversion",
    "agreeableness",
    "emotional_stability",
];

fn personality() -> Result<AssessmentTypeConfig, RegistryError> {
    let mut items = Vec::new();
    for dimension in BIG_FIVE {
        let prefix = &dimension[..3];
        for position in 1..=3 {
            items.push(likert(&format!("{prefix}-{position}"), dimension));
        }
    }

    items.extend([
        likert_probe("fg-never-late", ValidityKind::FakeGood),
        likert_probe("fg-always-kind", ValidityKind::FakeGood),
        likert_probe("fb-nothing-right", ValidityKind::FakeBad),
        desirability_probe(
            "sd-found-wallet",
            &[("keep_cash", 0.0), ("ask_around", 50.0), ("return_intact", 100.0)],
        ),
        desirability_probe(
            "sd-credit-taken",
            &[("let_it_go", 0.0), ("mention_later", 50.0), ("share_credit", 100.0)],
        ),
        desirability_probe(
            "sd-white-lie",
            &[("often", 0.0), ("sometimes", 50.0), ("never", 100.0)],
        ),
        repeat_probe("ext-1-repeat", "ext-1", &LIKERT_STEPS),
    ]);

    Ok(AssessmentTypeConfig {
        id: AssessmentTypeId::new("personality"),
        title: "Personality Profile".to_string(),
        dimensions: percent_dimensions(&BIG_FIVE),
        items: ItemCatalog::new(items)?,
        archetypes: vec![
            archetype(
                "director",
                "Director",
                &[("extraversion", 0.6), ("conscientiousness", 0.4)],
                &["Takes charge under pressure", "Drives decisions to closure"],
                &["Can overlook quieter voices"],
            ),
            archetype(
                "innovative_collaborator",
                "Innovative Collaborator",
                &[("openness", 0.5), ("agreeableness", 0.5)],
                &["Generates ideas with others", "Builds on teammates' input"],
                &["May avoid necessary conflict"],
            ),
            archetype(
                "steady_anchor",
                "Steady Anchor",
                &[("emotional_stability", 0.5), ("conscientiousness", 0.5)],
                &["Stays composed", "Delivers reliably"],
                &["Slow to embrace sudden change"],
            ),
            archetype(
                "explorer",
                "Explorer",
                &[("openness", 0.6), ("extraversion", 0.4)],
                &["Seeks out new experiences", "Energized by variety"],
                &["Loses interest in routine work"],
            ),
        ],
        candidates: vec![
            candidate(
                "project-manager",
                "Project Manager",
                CandidateCategory::Career,
                &["conscientiousness", "extraversion"],
                &[],
            ),
            candidate(
                "research-scientist",
                "Research Scientist",
                CandidateCategory::Career,
                &["openness", "conscientiousness"],
                &[],
            ),
            candidate(
                "counselor",
                "Counselor",
                CandidateCategory::Career,
                &["agreeableness", "emotional_stability"],
                &[],
            ),
            candidate(
                "sales-lead",
                "Sales Lead",
                CandidateCategory::Career,
                &["extraversion", "emotional_stability"],
                &[],
            ),
            candidate(
                "product-designer",
                "Product Designer",
                CandidateCategory::Career,
                &["openness", "agreeableness"],
                &[],
            ),
            candidate(
                "operations-analyst",
                "Operations Analyst",
                CandidateCategory::Career,
                &["conscientiousness", "emotional_stability"],
                &[],
            ),
        ],
        recommendation_limit: 5,
    })
}

const SWIPE: [(&str, f64); 3] = [("swipe_left", -5.0), ("skip", 0.0), ("swipe_right", 5.0)];

fn career() -> Result<AssessmentTypeConfig, RegistryError> {
    let swipe_scale = NormalizationRule::Symmetric { bound: 5.0 };
    let rank_scale = NormalizationRule::Bounded { min: 0.0, max: 1.0 };

    let mut dimensions: Vec<DimensionSpec> = ["analytical", "creative", "social", "leadership"]
        .into_iter()
        .map(|name| DimensionSpec::new(name, swipe_scale))
        .collect();
    dimensions.extend(
        [
            "value_security",
            "value_growth",
            "value_impact",
            "value_balance",
            "value_income",
        ]
        .into_iter()
        .map(|name| DimensionSpec::new(name, rank_scale)),
    );

    let items = vec![
        ranked_value("rank-security", "value_security"),
        ranked_value("rank-growth", "value_growth"),
        ranked_value("rank-impact", "value_impact"),
        ranked_value("rank-balance", "value_balance"),
        ranked_value("rank-income", "value_income"),
        choice("swipe-debug-code", &["analytical"], &SWIPE),
        choice("swipe-budget-model", &["analytical"], &SWIPE),
        choice("swipe-sketch-brand", &["creative"], &SWIPE),
        choice("swipe-write-story", &["creative"], &SWIPE),
        choice("swipe-coach-peer", &["social"], &SWIPE),
        choice("swipe-host-event", &["social"], &SWIPE),
        choice("swipe-lead-standup", &["leadership"], &SWIPE),
        choice("swipe-pitch-client", &["leadership", "social"], &SWIPE),
        scenario(
            "scn-missed-deadline",
            &["leadership"],
            &[
                ("reset_plan_with_team", 5.0),
                ("escalate_to_manager", 1.0),
                ("wait_for_direction", -4.0),
            ],
        ),
        scenario(
            "scn-ambiguous-data",
            &["analytical"],
            &[
                ("test_assumptions", 5.0),
                ("ask_for_guidance", 0.0),
                ("go_with_gut", -3.0),
            ],
        ),
        scenario(
            "scn-blank-canvas",
            &["creative"],
            &[
                ("prototype_many_ideas", 5.0),
                ("copy_a_template", -2.0),
                ("request_detailed_brief", -4.0),
            ],
        ),
        repeat_probe("swipe-debug-code-repeat", "swipe-debug-code", &SWIPE),
        likert_probe("fg-never-missed-deadline", ValidityKind::FakeGood),
        likert_probe("fg-loved-every-task", ValidityKind::FakeGood),
        desirability_probe(
            "sd-resume-polish",
            &[("round_up_titles", 0.0), ("minor_polish", 50.0), ("never_embellish", 100.0)],
        ),
        desirability_probe(
            "sd-always-volunteer",
            &[("only_when_asked", 0.0), ("when_it_fits", 50.0), ("every_time", 100.0)],
        ),
    ];

    Ok(AssessmentTypeConfig {
        id: AssessmentTypeId::new("career"),
        title: "Career Launch".to_string(),
        dimensions,
        items: ItemCatalog::new(items)?,
        archetypes: vec![
            archetype(
                "analytical_builder",
                "Analytical Builder",
                &[("analytical", 0.7), ("value_growth", 0.3)],
                &["Breaks down complex problems"],
                &["May over-engineer simple tasks"],
            ),
            archetype(
                "creative_innovator",
                "Creative Innovator",
                &[("creative", 0.7), ("value_impact", 0.3)],
                &["Sees possibilities others miss"],
                &["Finds rigid processes draining"],
            ),
            archetype(
                "people_champion",
                "People Champion",
                &[("social", 0.7), ("value_balance", 0.3)],
                &["Builds trust quickly"],
                &["Takes on others' workload"],
            ),
            archetype(
                "strategic_leader",
                "Strategic Leader",
                &[("leadership", 0.7), ("value_income", 0.3)],
                &["Rallies teams around goals"],
                &["Impatient with slow consensus"],
            ),
        ],
        candidates: vec![
            candidate(
                "software-engineer",
                "Software Engineer",
                CandidateCategory::Career,
                &["analytical", "value_growth"],
                &[("median_salary", "120000")],
            ),
            candidate(
                "data-scientist",
                "Data Scientist",
                CandidateCategory::Career,
                &["analytical", "value_income"],
                &[("median_salary", "115000")],
            ),
            candidate(
                "ux-designer",
                "UX Designer",
                CandidateCategory::Career,
                &["creative", "social"],
                &[("median_salary", "95000")],
            ),
            candidate(
                "registered-nurse",
                "Registered Nurse",
                CandidateCategory::Career,
                &["social", "value_impact", "value_security"],
                &[("median_salary", "82000")],
            ),
            candidate(
                "product-manager",
                "Product Manager",
                CandidateCategory::Career,
                &["leadership", "social", "value_growth"],
                &[("median_salary", "125000")],
            ),
            candidate(
                "financial-analyst",
                "Financial Analyst",
                CandidateCategory::Career,
                &["analytical", "value_income", "value_security"],
                &[("median_salary", "90000")],
            ),
            candidate(
                "computer-science",
                "Computer Science",
                CandidateCategory::Major,
                &["analytical", "value_growth"],
                &[],
            ),
            candidate(
                "psychology",
                "Psychology",
                CandidateCategory::Major,
                &["social", "value_impact"],
                &[],
            ),
            candidate(
                "business-administration",
                "Business Administration",
                CandidateCategory::Major,
                &["leadership", "value_income"],
                &[],
            ),
            candidate(
                "graphic-design",
                "Graphic Design",
                CandidateCategory::Major,
                &["creative"],
                &[],
            ),
            candidate(
                "northwind-health",
                "Northwind Health",
                CandidateCategory::Company,
                &["social", "value_impact", "value_balance"],
                &[("industry", "healthcare")],
            ),
            candidate(
                "contoso-labs",
                "Contoso Labs",
                CandidateCategory::Company,
                &["analytical", "creative", "value_growth"],
                &[("industry", "technology")],
            ),
            candidate(
                "fabrikam-capital",
                "Fabrikam Capital",
                CandidateCategory::Company,
                &["analytical", "leadership", "value_income"],
                &[("industry", "finance")],
            ),
        ],
        recommendation_limit: 10,
    })
}

fn communication() -> Result<AssessmentTypeConfig, RegistryError> {
    let items = vec![
        scenario(
            "scn-upset-customer",
            &["empathy"],
            &[
                ("acknowledge_feelings", 100.0),
                ("explain_policy", 40.0),
                ("transfer_call", 10.0),
            ],
        ),
        scenario(
            "scn-vague-request",
            &["clarity"],
            &[
                ("restate_and_confirm", 100.0),
                ("start_and_adjust", 50.0),
                ("guess_intent", 0.0),
            ],
        ),
        scenario(
            "scn-interrupted-meeting",
            &["assertiveness"],
            &[
                ("finish_point_politely", 100.0),
                ("raise_it_afterwards", 55.0),
                ("drop_the_point", 0.0),
            ],
        ),
        scenario(
            "scn-quiet-colleague",
            &["listening"],
            &[
                ("invite_their_view", 100.0),
                ("summarize_discussion", 60.0),
                ("move_on", 0.0),
            ],
        ),
        scenario(
            "scn-colleague-venting",
            &["listening"],
            &[
                ("let_them_finish", 100.0),
                ("offer_quick_fix", 40.0),
                ("change_subject", 0.0),
            ],
        ),
        scenario(
            "scn-handoff-notes",
            &["clarity"],
            &[
                ("write_clear_summary", 100.0),
                ("send_raw_notes", 30.0),
                ("explain_later", 0.0),
            ],
        ),
        keyword_item(
            "wr-difficult-feedback",
            ItemKind::Written,
            "empathy",
            20.0,
            &[
                ("understand", 15.0),
                ("appreciate", 15.0),
                ("how do you feel", 20.0),
                ("together", 10.0),
                ("support", 10.0),
            ],
        ),
        keyword_item(
            "wr-project-update",
            ItemKind::Written,
            "clarity",
            20.0,
            &[
                ("deadline", 15.0),
                ("next steps", 20.0),
                ("because", 10.0),
                ("summary", 15.0),
                ("by friday", 10.0),
            ],
        ),
        keyword_item(
            "sim-reply-draft",
            ItemKind::Simulation,
            "listening",
            25.0,
            &[
                ("you mentioned", 25.0),
                ("if i understand", 25.0),
                ("to confirm", 15.0),
            ],
        ),
        Item {
            id: ItemId::new("sim-inbox-triage"),
            kind: ItemKind::Simulation,
            dimensions: vec![DimensionWeight::unit("processing_speed")],
            scoring: ItemScoring::Elapsed {
                curve: SpeedCurve {
                    fast_ms: 4_000,
                    slow_ms: 30_000,
                    max_delta: 100.0,
                },
            },
            validity: None,
        },
        likert_probe("fg-never-misunderstood", ValidityKind::FakeGood),
        likert_probe("fg-always-clear", ValidityKind::FakeGood),
        desirability_probe(
            "sd-never-interrupt",
            &[("interrupt_sometimes", 0.0), ("rarely", 50.0), ("never_ever", 100.0)],
        ),
        desirability_probe(
            "sd-always-patient",
            &[("lose_patience", 0.0), ("mostly_patient", 50.0), ("always_patient", 100.0)],
        ),
    ];

    Ok(AssessmentTypeConfig {
        id: AssessmentTypeId::new("communication"),
        title: "Communication Style".to_string(),
        dimensions: percent_dimensions(&[
            "empathy",
            "clarity",
            "assertiveness",
            "listening",
            "processing_speed",
        ]),
        items: ItemCatalog::new(items)?,
        archetypes: vec![
            archetype(
                "harmonizer",
                "Harmonizer",
                &[("empathy", 0.5), ("listening", 0.5)],
                &["Makes people feel heard"],
                &["Softens hard messages too much"],
            ),
            archetype(
                "director",
                "Director",
                &[("assertiveness", 0.6), ("clarity", 0.4)],
                &["Direct and unambiguous"],
                &["Can come across as abrupt"],
            ),
            archetype(
                "rapid_responder",
                "Rapid Responder",
                &[("processing_speed", 0.6), ("clarity", 0.4)],
                &["Keeps conversations moving"],
                &["May reply before fully listening"],
            ),
        ],
        candidates: vec![
            candidate(
                "customer-success",
                "Customer Success Manager",
                CandidateCategory::Career,
                &["empathy", "listening"],
                &[],
            ),
            candidate(
                "account-executive",
                "Account Executive",
                CandidateCategory::Career,
                &["assertiveness", "clarity"],
                &[],
            ),
            candidate(
                "support-specialist",
                "Support Specialist",
                CandidateCategory::Career,
                &["processing_speed", "empathy"],
                &[],
            ),
            candidate(
                "communications-lead",
                "Communications Lead",
                CandidateCategory::Career,
                &["clarity", "listening", "assertiveness"],
                &[],
            ),
        ],
        recommendation_limit: 5,
    })
}
