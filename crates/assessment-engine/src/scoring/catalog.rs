use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::domain::{Dimension, Item, ItemId, ItemKind, ItemScoring, ValidityKind};

/// Raised when a response references an item the catalog does not define.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("item `{item_id}` has no catalog entry")]
pub struct CatalogLookupError {
    pub item_id: ItemId,
}

/// Configuration problems detected while loading a catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate catalog entry for item `{0}`")]
    DuplicateItem(ItemId),
    #[error("item `{item_id}` is a {kind} item but its scoring method does not apply to that kind")]
    IncompatibleScoring { item_id: ItemId, kind: ItemKind },
    #[error("item `{0}` has an empty option table")]
    EmptyOptions(ItemId),
    #[error("item `{0}` carries a non-finite weight or delta")]
    NonFinite(ItemId),
    #[error("item `{0}` has a speed curve whose fast bound is not below its slow bound")]
    InvalidSpeedCurve(ItemId),
    #[error("item `{0}` is a validity probe but is not option scored")]
    ProbeWithoutOptions(ItemId),
    #[error("inconsistency probe `{item_id}` pairs with unknown item `{paired_with}`")]
    UnknownPair { item_id: ItemId, paired_with: ItemId },
}

/// Read-only item definitions for one assessment type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Item>", into = "Vec<Item>")]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            validate_item(item)?;
            if index.insert(item.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateItem(item.id.clone()));
            }
        }

        for item in &items {
            if let Some(ValidityKind::Inconsistency { paired_with, .. }) = &item.validity {
                if !index.contains_key(paired_with) {
                    return Err(CatalogError::UnknownPair {
                        item_id: item.id.clone(),
                        paired_with: paired_with.clone(),
                    });
                }
            }
        }

        Ok(Self { items, index })
    }

    pub fn lookup(&self, item_id: &ItemId) -> Result<&Item, CatalogLookupError> {
        self.index
            .get(item_id)
            .map(|position| &self.items[*position])
            .ok_or_else(|| CatalogLookupError {
                item_id: item_id.clone(),
            })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn probes(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_validity_probe())
    }

    /// Item kinds offered by the trait-measuring (non-probe) part of the catalog.
    pub fn measured_kinds(&self) -> BTreeSet<ItemKind> {
        self.items
            .iter()
            .filter(|item| !item.is_validity_probe())
            .map(|item| item.kind)
            .collect()
    }

    pub fn referenced_dimensions(&self) -> BTreeSet<&Dimension> {
        self.items
            .iter()
            .flat_map(|item| item.dimensions.iter().map(|weight| &weight.dimension))
            .collect()
    }
}

impl TryFrom<Vec<Item>> for ItemCatalog {
    type Error = CatalogError;

    fn try_from(items: Vec<Item>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<ItemCatalog> for Vec<Item> {
    fn from(catalog: ItemCatalog) -> Self {
        catalog.items
    }
}

fn validate_item(item: &Item) -> Result<(), CatalogError> {
    if !item.scoring.supports(item.kind) {
        return Err(CatalogError::IncompatibleScoring {
            item_id: item.id.clone(),
            kind: item.kind,
        });
    }

    if item
        .dimensions
        .iter()
        .any(|weight| !weight.weight.is_finite())
    {
        return Err(CatalogError::NonFinite(item.id.clone()));
    }

    match &item.scoring {
        ItemScoring::Options { options } => {
            if options.is_empty() {
                return Err(CatalogError::EmptyOptions(item.id.clone()));
            }
            if options.values().any(|delta| !delta.is_finite()) {
                return Err(CatalogError::NonFinite(item.id.clone()));
            }
        }
        ItemScoring::Keywords { table } => {
            let finite = table.baseline.is_finite()
                && table.ceiling.is_finite()
                && table.terms.values().all(|delta| delta.is_finite());
            if !finite {
                return Err(CatalogError::NonFinite(item.id.clone()));
            }
        }
        ItemScoring::Elapsed { curve } => {
            if curve.fast_ms >= curve.slow_ms {
                return Err(CatalogError::InvalidSpeedCurve(item.id.clone()));
            }
            if !curve.max_delta.is_finite() {
                return Err(CatalogError::NonFinite(item.id.clone()));
            }
        }
        ItemScoring::Rank => {}
    }

    if item.is_validity_probe() && item.option_table().is_none() {
        return Err(CatalogError::ProbeWithoutOptions(item.id.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::DimensionWeight;
    use std::collections::BTreeMap;

    fn likert(id: &str) -> Item {
        let options: BTreeMap<String, f64> = (1..=5)
            .map(|step| (step.to_string(), f64::from(step - 1) * 25.0))
            .collect();
        Item {
            id: ItemId::new(id),
            kind: ItemKind::Choice,
            dimensions: vec![DimensionWeight::unit("openness")],
            scoring: ItemScoring::Options { options },
            validity: None,
        }
    }

    #[test]
    fn lookup_returns_not_found_for_unknown_ids() {
        let catalog = ItemCatalog::new(vec![likert("o1")]).expect("catalog builds");

        assert!(catalog.lookup(&ItemId::new("o1")).is_ok());
        let err = catalog
            .lookup(&ItemId::new("missing"))
            .expect_err("unknown id fails");
        assert_eq!(err.item_id, ItemId::new("missing"));
    }

    #[test]
    fn rejects_duplicate_items() {
        let err = ItemCatalog::new(vec![likert("o1"), likert("o1")]).expect_err("duplicate");
        assert_eq!(err, CatalogError::DuplicateItem(ItemId::new("o1")));
    }

    #[test]
    fn rejects_scoring_that_does_not_fit_the_kind() {
        let mut item = likert("r1");
        item.kind = ItemKind::Ranking;

        let err = ItemCatalog::new(vec![item]).expect_err("incompatible");
        assert!(matches!(err, CatalogError::IncompatibleScoring { .. }));
    }

    #[test]
    fn rejects_inconsistency_probe_with_dangling_pair() {
        let mut probe = likert("o1-repeat");
        probe.dimensions.clear();
        probe.validity = Some(ValidityKind::Inconsistency {
            paired_with: ItemId::new("o9"),
            reversed: false,
        });

        let err = ItemCatalog::new(vec![likert("o1"), probe]).expect_err("dangling pair");
        assert!(matches!(err, CatalogError::UnknownPair { .. }));
    }

    #[test]
    fn deserializes_from_a_json_array() {
        let json = r#"[
            {"id": "w1", "kind": "written",
             "dimensions": [{"dimension": "empathy"}],
             "scoring": {"method": "keywords",
                         "table": {"baseline": 10.0, "terms": {"listen": 20.0}, "ceiling": 100.0}}}
        ]"#;

        let catalog: ItemCatalog = serde_json::from_str(json).expect("catalog parses");
        let item = catalog.lookup(&ItemId::new("w1")).expect("item indexed");
        assert_eq!(item.kind, ItemKind::Written);
        assert_eq!(item.dimensions[0].weight, 1.0);
    }
}
