use crate::scoring::domain::{Item, ItemScoring, SignalTable};

/// Strategy turning free text into a score delta for written and simulation items.
pub trait WrittenResponseScorer: Send + Sync {
    fn score(&self, item: &Item, text: &str) -> f64;
}

/// Default scorer backed by the marker-term table declared on each item.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

impl WrittenResponseScorer for KeywordScorer {
    fn score(&self, item: &Item, text: &str) -> f64 {
        match &item.scoring {
            ItemScoring::Keywords { table } => table.score(text),
            _ => 0.0,
        }
    }
}

impl SignalTable {
    /// Marker terms present in `text`, in table order.
    pub fn matched_terms(&self, text: &str) -> Vec<&str> {
        let haystack = format!(" {} ", normalize_text(text));
        self.terms
            .keys()
            .filter(|term| {
                let needle = normalize_text(term);
                !needle.is_empty() && haystack.contains(&format!(" {needle} "))
            })
            .map(String::as_str)
            .collect()
    }

    pub fn score(&self, text: &str) -> f64 {
        let hits: f64 = self
            .matched_terms(text)
            .into_iter()
            .filter_map(|term| self.terms.get(term))
            .sum();

        let upper = self.ceiling.max(0.0);
        (self.baseline + hits).clamp(0.0, upper)
    }
}

pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .flat_map(|ch| {
            let keep = ch.is_alphanumeric() || ch == '\'';
            ch.to_lowercase().map(move |lower| if keep { lower } else { ' ' })
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
