pub mod disambiguate;
pub mod extract;
pub mod sections;
pub mod units;

use std::sync::LazyLock;

use crate::heuristics::Heuristics;
use extract::Extraction;

static DEFAULT_HEURISTICS: LazyLock<Heuristics> = LazyLock::new(Heuristics::default);

/// Two-pass pipeline: text → line groups → policy record.
pub fn extract_policy_fields(text: &str) -> Extraction {
    extract_policy_fields_with(text, &DEFAULT_HEURISTICS)
}

pub fn extract_policy_fields_with(text: &str, heuristics: &Heuristics) -> Extraction {
    let groups = sections::segment(text);
    extract::extract_all(text, &groups, heuristics)
}
