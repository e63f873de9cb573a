//! Typed per-assessment configuration, looked up once per scoring call.

mod standard;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog::{CatalogError, ItemCatalog};
use super::domain::{AssessmentTypeId, Dimension};
use super::normalization::NormalizationRule;
use super::profile::Archetype;
use super::ranking::Candidate;

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

fn default_recommendation_limit() -> usize {
    DEFAULT_RECOMMENDATION_LIMIT
}

/// Declared dimension together with the range its raw scores live on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub dimension: Dimension,
    #[serde(default)]
    pub normalization: NormalizationRule,
}

impl DimensionSpec {
    pub fn new(dimension: impl Into<String>, normalization: NormalizationRule) -> Self {
        Self {
            dimension: Dimension::new(dimension),
            normalization,
        }
    }
}

/// Everything the engine needs to score one assessment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentTypeConfig {
    pub id: AssessmentTypeId,
    pub title: String,
    pub dimensions: Vec<DimensionSpec>,
    pub items: ItemCatalog,
    pub archetypes: Vec<Archetype>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,
}

impl AssessmentTypeConfig {
    /// Declared dimensions in declaration order.
    pub fn dimension_names(&self) -> Vec<Dimension> {
        self.dimensions
            .iter()
            .map(|spec| spec.dimension.clone())
            .collect()
    }

    pub fn normalization_rules(&self) -> BTreeMap<Dimension, NormalizationRule> {
        self.dimensions
            .iter()
            .map(|spec| (spec.dimension.clone(), spec.normalization))
            .collect()
    }

    /// Dimensions referenced by items, archetypes, or candidates that the type does not declare.
    pub fn undeclared_dimensions(&self) -> BTreeSet<Dimension> {
        let declared: HashSet<&Dimension> =
            self.dimensions.iter().map(|spec| &spec.dimension).collect();

        let from_items = self.items.referenced_dimensions().into_iter();
        let from_archetypes = self
            .archetypes
            .iter()
            .flat_map(|archetype| archetype.weights.iter().map(|weight| &weight.dimension));
        let from_candidates = self
            .candidates
            .iter()
            .flat_map(|candidate| candidate.dimensions.iter());

        from_items
            .chain(from_archetypes)
            .chain(from_candidates)
            .filter(|dimension| !declared.contains(dimension))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> AssessmentTypeSummary {
        AssessmentTypeSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            dimensions: self.dimension_names(),
            item_count: self.items.len(),
            probe_count: self.items.probes().count(),
            archetype_count: self.archetypes.len(),
            candidate_count: self.candidates.len(),
        }
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.dimensions.is_empty() {
            return Err(RegistryError::NoDimensions(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for spec in &self.dimensions {
            if !seen.insert(&spec.dimension) {
                return Err(RegistryError::DuplicateDimension {
                    type_id: self.id.clone(),
                    dimension: spec.dimension.clone(),
                });
            }
            let valid_range = match spec.normalization {
                NormalizationRule::Percent => true,
                NormalizationRule::Symmetric { bound } => bound.is_finite() && bound > 0.0,
                NormalizationRule::Bounded { min, max } => {
                    min.is_finite() && max.is_finite() && max > min
                }
            };
            if !valid_range {
                return Err(RegistryError::InvalidNormalization {
                    type_id: self.id.clone(),
                    dimension: spec.dimension.clone(),
                });
            }
        }

        if self.archetypes.is_empty() {
            return Err(RegistryError::NoArchetypes(self.id.clone()));
        }

        if let Some(candidate) = self
            .candidates
            .iter()
            .find(|candidate| candidate.dimensions.is_empty())
        {
            return Err(RegistryError::CandidateWithoutDimensions {
                type_id: self.id.clone(),
                candidate_id: candidate.id.clone(),
            });
        }

        if !(1..=MAX_RECOMMENDATION_LIMIT).contains(&self.recommendation_limit) {
            return Err(RegistryError::InvalidRecommendationLimit {
                type_id: self.id.clone(),
                limit: self.recommendation_limit,
            });
        }

        Ok(())
    }
}

/// Catalog listing entry exposed over HTTP and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentTypeSummary {
    pub id: AssessmentTypeId,
    pub title: String,
    pub dimensions: Vec<Dimension>,
    pub item_count: usize,
    pub probe_count: usize,
    pub archetype_count: usize,
    pub candidate_count: usize,
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    assessment_types: Vec<AssessmentTypeConfig>,
}

/// Immutable set of assessment types shared across scoring calls.
#[derive(Debug, Clone, Default)]
pub struct AssessmentRegistry {
    types: BTreeMap<AssessmentTypeId, Arc<AssessmentTypeConfig>>,
}

impl AssessmentRegistry {
    /// Built-in personality, career, and communication assessments.
    pub fn standard() -> Result<Self, RegistryError> {
        Self::new(standard::assessment_types()?)
    }

    pub fn new(configs: Vec<AssessmentTypeConfig>) -> Result<Self, RegistryError> {
        if configs.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut types = BTreeMap::new();
        for config in configs {
            config.validate()?;

            for dimension in config.undeclared_dimensions() {
                warn!(
                    assessment_type = %config.id,
                    %dimension,
                    "dimension is referenced but not declared; it will score as neutral"
                );
            }

            let id = config.id.clone();
            if types.insert(id.clone(), Arc::new(config)).is_some() {
                return Err(RegistryError::DuplicateType(id));
            }
        }

        Ok(Self { types })
    }

    /// Reads a JSON document of the form `{"assessment_types": [...]}`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let document: RegistryDocument = serde_json::from_reader(reader)?;
        Self::new(document.assessment_types)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn get(&self, id: &str) -> Option<Arc<AssessmentTypeConfig>> {
        self.types.get(&AssessmentTypeId::new(id)).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = &AssessmentTypeId> {
        self.types.keys()
    }

    pub fn configs(&self) -> impl Iterator<Item = &Arc<AssessmentTypeConfig>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("registry defines no assessment types")]
    Empty,
    #[error("assessment type `{0}` is defined more than once")]
    DuplicateType(AssessmentTypeId),
    #[error("assessment type `{0}` declares no dimensions")]
    NoDimensions(AssessmentTypeId),
    #[error("assessment type `{type_id}` declares dimension `{dimension}` twice")]
    DuplicateDimension {
        type_id: AssessmentTypeId,
        dimension: Dimension,
    },
    #[error("assessment type `{type_id}` has an empty or non-finite range for `{dimension}`")]
    InvalidNormalization {
        type_id: AssessmentTypeId,
        dimension: Dimension,
    },
    #[error("assessment type `{0}` declares no archetypes")]
    NoArchetypes(AssessmentTypeId),
    #[error("candidate `{candidate_id}` in `{type_id}` weighs no dimensions")]
    CandidateWithoutDimensions {
        type_id: AssessmentTypeId,
        candidate_id: String,
    },
    #[error("assessment type `{type_id}` recommendation limit {limit} is outside 1..={max}", max = MAX_RECOMMENDATION_LIMIT)]
    InvalidRecommendationLimit {
        type_id: AssessmentTypeId,
        limit: usize,
    },
}
