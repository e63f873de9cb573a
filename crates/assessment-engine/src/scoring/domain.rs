use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier wrapper for catalog items.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named trait or construct measured by an assessment (e.g. `conscientiousness`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimension(pub String);

impl Dimension {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key selecting an assessment configuration from the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentTypeId(pub String);

impl AssessmentTypeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssessmentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interaction style of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Choice,
    Scenario,
    Ranking,
    Written,
    Simulation,
}

impl ItemKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::Scenario => "scenario",
            Self::Ranking => "ranking",
            Self::Written => "written",
            Self::Simulation => "simulation",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Answer payload, discriminated by the kind of item it responds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseValue {
    Choice { option: String },
    Scenario { option: String },
    Ranking { rank: u32, total: u32 },
    Written { text: String },
    Simulation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Payload that matched none of the shapes above. Kept so the answer keeps its place in
    /// the stream and is reported instead of dropped.
    Unreadable { raw: String, detail: String },
}

impl ResponseValue {
    /// Item kind the payload answers; `None` for unreadable payloads.
    pub fn kind(&self) -> Option<ItemKind> {
        match self {
            Self::Choice { .. } => Some(ItemKind::Choice),
            Self::Scenario { .. } => Some(ItemKind::Scenario),
            Self::Ranking { .. } => Some(ItemKind::Ranking),
            Self::Written { .. } => Some(ItemKind::Written),
            Self::Simulation { .. } => Some(ItemKind::Simulation),
            Self::Unreadable { .. } => None,
        }
    }
}

/// Client-side gesture metadata (drag, swipe) captured alongside an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionSignals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gesture: Option<String>,
    #[serde(default)]
    pub revisions: u32,
}

/// One answered item. The order of responses in a stream is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub item_id: ItemId,
    pub value: ResponseValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionSignals>,
}

impl Response {
    pub fn new(item_id: impl Into<String>, value: ResponseValue) -> Self {
        Self {
            item_id: ItemId::new(item_id),
            value,
            response_time_ms: None,
            timestamp: None,
            interaction: None,
        }
    }

    pub fn choice(item_id: impl Into<String>, option: impl Into<String>) -> Self {
        Self::new(
            item_id,
            ResponseValue::Choice {
                option: option.into(),
            },
        )
    }

    pub fn scenario(item_id: impl Into<String>, option: impl Into<String>) -> Self {
        Self::new(
            item_id,
            ResponseValue::Scenario {
                option: option.into(),
            },
        )
    }

    pub fn ranking(item_id: impl Into<String>, rank: u32, total: u32) -> Self {
        Self::new(item_id, ResponseValue::Ranking { rank, total })
    }

    pub fn written(item_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(item_id, ResponseValue::Written { text: text.into() })
    }

    pub fn simulation(item_id: impl Into<String>, text: Option<String>) -> Self {
        Self::new(item_id, ResponseValue::Simulation { text })
    }

    pub fn with_response_time(mut self, millis: u64) -> Self {
        self.response_time_ms = Some(millis);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionSignals) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Reads one submitted answer. A payload of the wrong shape (say, a rank given as text)
    /// becomes [`ResponseValue::Unreadable`] instead of failing the whole submission.
    pub fn from_json(entry: Value) -> Self {
        match LooseResponse::deserialize(&entry) {
            Ok(loose) => {
                let value = ResponseValue::deserialize(&loose.value).unwrap_or_else(|err| {
                    ResponseValue::Unreadable {
                        raw: loose.value.to_string(),
                        detail: err.to_string(),
                    }
                });
                Self {
                    item_id: loose.item_id,
                    value,
                    response_time_ms: loose.response_time_ms,
                    timestamp: loose.timestamp,
                    interaction: loose.interaction,
                }
            }
            Err(err) => {
                let item_id = entry
                    .get("item_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Self::new(
                    item_id,
                    ResponseValue::Unreadable {
                        raw: entry.to_string(),
                        detail: err.to_string(),
                    },
                )
            }
        }
    }
}

#[derive(Deserialize)]
struct LooseResponse {
    item_id: ItemId,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    response_time_ms: Option<u64>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    interaction: Option<InteractionSignals>,
}

/// `deserialize_with` helper for submitted streams; see [`Response::from_json`].
pub fn lenient_responses<'de, D>(deserializer: D) -> Result<Vec<Response>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries.into_iter().map(Response::from_json).collect())
}

fn unit_weight() -> f64 {
    1.0
}

/// Contribution weight of an item (or archetype) toward a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeight {
    pub dimension: Dimension,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

impl DimensionWeight {
    pub fn new(dimension: impl Into<String>, weight: f64) -> Self {
        Self {
            dimension: Dimension::new(dimension),
            weight,
        }
    }

    pub fn unit(dimension: impl Into<String>) -> Self {
        Self::new(dimension, 1.0)
    }
}

/// Marker-term table used to score free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTable {
    #[serde(default)]
    pub baseline: f64,
    pub terms: BTreeMap<String, f64>,
    pub ceiling: f64,
}

/// Linear elapsed-time curve for prompts that measure processing speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedCurve {
    pub fast_ms: u64,
    pub slow_ms: u64,
    pub max_delta: f64,
}

impl SpeedCurve {
    /// Full delta at or under `fast_ms`, nothing at or over `slow_ms`.
    pub fn delta_for(&self, elapsed_ms: u64) -> f64 {
        if elapsed_ms <= self.fast_ms {
            return self.max_delta;
        }
        if elapsed_ms >= self.slow_ms {
            return 0.0;
        }

        let span = (self.slow_ms - self.fast_ms) as f64;
        let remaining = (self.slow_ms - elapsed_ms) as f64;
        self.max_delta * (remaining / span)
    }
}

/// How an item's answer is converted into a score delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ItemScoring {
    Options { options: BTreeMap<String, f64> },
    Rank,
    Keywords { table: SignalTable },
    Elapsed { curve: SpeedCurve },
}

impl ItemScoring {
    pub fn supports(&self, kind: ItemKind) -> bool {
        matches!(
            (self, kind),
            (Self::Options { .. }, ItemKind::Choice | ItemKind::Scenario)
                | (Self::Rank, ItemKind::Ranking)
                | (Self::Keywords { .. }, ItemKind::Written | ItemKind::Simulation)
                | (Self::Elapsed { .. }, ItemKind::Simulation)
        )
    }
}

/// Distortion probes embedded in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "probe", rename_all = "snake_case")]
pub enum ValidityKind {
    FakeGood,
    FakeBad,
    SocialDesirability,
    Inconsistency {
        paired_with: ItemId,
        #[serde(default)]
        reversed: bool,
    },
}

/// Static catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    #[serde(default)]
    pub dimensions: Vec<DimensionWeight>,
    pub scoring: ItemScoring,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<ValidityKind>,
}

impl Item {
    pub fn is_validity_probe(&self) -> bool {
        self.validity.is_some()
    }

    pub fn option_table(&self) -> Option<&BTreeMap<String, f64>> {
        match &self.scoring {
            ItemScoring::Options { options } => Some(options),
            _ => None,
        }
    }

    /// Position of an option inside the item's option range, `0.0` lowest to `1.0` highest.
    pub fn relative_position(&self, option: &str) -> Option<f64> {
        let options = self.option_table()?;
        let selected = *options.get(option)?;
        let (min, max) = options
            .values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
                (lo.min(*value), hi.max(*value))
            });

        if max - min <= f64::EPSILON {
            return None;
        }

        Some((selected - min) / (max - min))
    }

    /// Option a respondent presenting themselves in the best light would pick.
    pub fn most_favorable_option(&self) -> Option<&str> {
        let options = self.option_table()?;
        let prefer_low = matches!(self.validity, Some(ValidityKind::FakeBad));

        let mut best: Option<(&str, f64)> = None;
        for (option, delta) in options {
            let better = match best {
                None => true,
                Some((_, current)) if prefer_low => *delta < current,
                Some((_, current)) => *delta > current,
            };
            if better {
                best = Some((option.as_str(), *delta));
            }
        }

        best.map(|(option, _)| option)
    }
}

/// Running per-dimension state built during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAccumulation {
    pub dimension: Dimension,
    pub raw_sum: f64,
    pub sample_count: u32,
}

impl DimensionAccumulation {
    pub fn empty(dimension: Dimension) -> Self {
        Self {
            dimension,
            raw_sum: 0.0,
            sample_count: 0,
        }
    }

    pub fn record(&mut self, delta: f64, weight: f64) {
        self.raw_sum += delta * weight;
        self.sample_count += 1;
    }
}

/// Categorical label derived from a scaled score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    Exceptional,
    Strong,
    AboveAverage,
    Average,
    BelowAverage,
    Developing,
}

impl ScoreLevel {
    pub fn from_score(scaled: f64) -> Self {
        if scaled >= 90.0 {
            Self::Exceptional
        } else if scaled >= 75.0 {
            Self::Strong
        } else if scaled >= 60.0 {
            Self::AboveAverage
        } else if scaled >= 40.0 {
            Self::Average
        } else if scaled >= 25.0 {
            Self::BelowAverage
        } else {
            Self::Developing
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional",
            Self::Strong => "Strong",
            Self::AboveAverage => "Above Average",
            Self::Average => "Average",
            Self::BelowAverage => "Below Average",
            Self::Developing => "Developing",
        }
    }
}

/// Normalized score for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Mean weighted delta; `None` when the dimension received no usable answers.
    pub raw_score: Option<f64>,
    pub scaled_score: f64,
    /// Fixed step bucket, not a percentile of any live population.
    pub percentile: u8,
    pub level: ScoreLevel,
    pub sample_count: u32,
}
