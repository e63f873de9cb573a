//! CSV import for response streams and candidate tables.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::domain::{Dimension, InteractionSignals, ItemId, ItemKind, Response, ResponseValue};
use super::ranking::{Candidate, CandidateCategory};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}

fn invalid(line: usize, reason: impl Into<String>) -> ImportError {
    ImportError::InvalidRow {
        line,
        reason: reason.into(),
    }
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    item_id: String,
    kind: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    response_time_ms: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gesture: Option<String>,
}

/// Reads `item_id,kind,value,response_time_ms,timestamp,gesture` rows in stream order.
///
/// Ranking values are written as `rank/total`; simulation rows may leave `value` empty. A row
/// whose value cannot be read stays in the stream as [`ResponseValue::Unreadable`], so the
/// engine reports it as a malformed answer at its position. Unparseable timing or timestamps
/// are dropped. Only a structurally broken file is an error.
pub fn responses_from_csv<R: Read>(reader: R) -> Result<Vec<Response>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut responses = Vec::new();

    for (index, record) in csv_reader.deserialize::<ResponseRow>().enumerate() {
        let line = index + 2;
        let row = record?;

        let value = match parse_value(&row.kind, row.value.as_deref()) {
            Ok(value) => value,
            Err(reason) => ResponseValue::Unreadable {
                raw: row.value.unwrap_or_default(),
                detail: format!("line {line}: {reason}"),
            },
        };

        let response_time_ms = row.response_time_ms.and_then(|raw| match raw.parse::<u64>() {
            Ok(millis) => Some(millis),
            Err(_) => {
                warn!(line, item_id = %row.item_id, "dropping unreadable response time `{raw}`");
                None
            }
        });
        let timestamp = row.timestamp.and_then(|raw| {
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                warn!(line, item_id = %row.item_id, "dropping unreadable timestamp `{raw}`");
            }
            parsed
        });

        responses.push(Response {
            item_id: ItemId::new(row.item_id),
            value,
            response_time_ms,
            timestamp,
            interaction: row.gesture.map(|gesture| InteractionSignals {
                gesture: Some(gesture),
                revisions: 0,
            }),
        });
    }

    Ok(responses)
}

fn parse_kind(raw: &str) -> Result<ItemKind, String> {
    match raw.to_ascii_lowercase().as_str() {
        "choice" => Ok(ItemKind::Choice),
        "scenario" => Ok(ItemKind::Scenario),
        "ranking" => Ok(ItemKind::Ranking),
        "written" => Ok(ItemKind::Written),
        "simulation" => Ok(ItemKind::Simulation),
        other => Err(format!("unknown response kind `{other}`")),
    }
}

fn parse_value(kind: &str, value: Option<&str>) -> Result<ResponseValue, String> {
    let kind = parse_kind(kind)?;
    let required = || {
        value
            .map(str::to_string)
            .ok_or_else(|| format!("{kind} responses need a value"))
    };

    match kind {
        ItemKind::Choice => Ok(ResponseValue::Choice {
            option: required()?,
        }),
        ItemKind::Scenario => Ok(ResponseValue::Scenario {
            option: required()?,
        }),
        ItemKind::Ranking => {
            let raw = required()?;
            raw.split_once('/')
                .and_then(|(rank, total)| {
                    Some(ResponseValue::Ranking {
                        rank: rank.trim().parse().ok()?,
                        total: total.trim().parse().ok()?,
                    })
                })
                .ok_or_else(|| format!("ranking value `{raw}` is not `rank/total`"))
        }
        ItemKind::Written => Ok(ResponseValue::Written {
            text: value.unwrap_or_default().to_string(),
        }),
        ItemKind::Simulation => Ok(ResponseValue::Simulation {
            text: value.map(str::to_string),
        }),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

const CANDIDATE_COLUMNS: [&str; 4] = ["id", "title", "category", "dimensions"];

/// Reads `id,title,category,dimensions` rows; `dimensions` is `;`-separated and any other
/// column is carried into the candidate's metadata.
pub fn candidates_from_csv<R: Read>(reader: R) -> Result<Vec<Candidate>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .ok_or(ImportError::MissingColumn(name))
    };
    let id_at = column("id")?;
    let title_at = column("title")?;
    let category_at = column("category")?;
    let dimensions_at = column("dimensions")?;

    let extra: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| {
            !CANDIDATE_COLUMNS
                .iter()
                .any(|known| header.eq_ignore_ascii_case(known))
        })
        .map(|(position, header)| (position, header.to_string()))
        .collect();

    let mut candidates = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let line = index + 2;
        let record = record?;
        let field = |position: usize| record.get(position).unwrap_or_default();

        let id = field(id_at);
        if id.is_empty() {
            return Err(invalid(line, "candidate id is empty"));
        }

        let category: CandidateCategory = field(category_at)
            .parse()
            .map_err(|err| invalid(line, format!("{err}")))?;

        let dimensions: Vec<Dimension> = field(dimensions_at)
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Dimension::new)
            .collect();
        if dimensions.is_empty() {
            return Err(invalid(line, format!("candidate `{id}` lists no dimensions")));
        }

        let metadata: BTreeMap<String, String> = extra
            .iter()
            .filter_map(|(position, header)| {
                let value = field(*position);
                (!value.is_empty()).then(|| (header.clone(), value.to_string()))
            })
            .collect();

        candidates.push(Candidate {
            id: id.to_string(),
            title: field(title_at).to_string(),
            category,
            dimensions,
            metadata,
        });
    }

    Ok(candidates)
}
