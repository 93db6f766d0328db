use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use config::{Config, Environment, File};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

const DEFAULT_ROAD_TOKENS: &[&str] = &[
    "ROAD", "RD", "STREET", "ST", "AVENUE", "AVE", "BOULEVARD", "BLVD", "HIGHWAY", "HWY",
    "DRIVE", "DR", "LANE", "LN", "WAY", "CIRCLE", "CIR", "COURT", "CT", "TOWNSHIP", "TWP",
    "PIKE", "PARKWAY", "PKWY", "ROUTE", "RTE", "TRAIL", "TRL", "PLACE", "PL", "TERRACE",
    "NORTH", "SOUTH", "EAST", "WEST",
];

/// Tunables for the vehicle/address disambiguation. Carrier documents differ,
/// so the year range and the road vocabulary are data, not code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    pub year_min: u16,
    pub year_max: u16,
    pub road_tokens: BTreeSet<String>,
}

impl Default for Heuristics {
    fn default() -> Self {
        Heuristics {
            year_min: 1900,
            year_max: 2035,
            road_tokens: DEFAULT_ROAD_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl Heuristics {
    /// Defaults, overlaid by an optional config file, overlaid by `POLICY_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("POLICY")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("road_tokens"),
            )
            .build()?;
        let heuristics: Heuristics = settings.try_deserialize()?;
        heuristics.validated()
    }

    /// Normalize tokens to upper case and reject unusable settings.
    pub fn validated(mut self) -> Result<Self, Error> {
        if self.year_min > self.year_max {
            return Err(Error::InvalidYearRange {
                min: self.year_min,
                max: self.year_max,
            });
        }
        self.road_tokens = self
            .road_tokens
            .into_iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
        if self.road_tokens.is_empty() {
            return Err(Error::NoRoadTokens);
        }
        Ok(self)
    }

    /// A bare 4-digit line inside the configured vehicle-year range.
    pub fn is_plausible_year(&self, line: &str) -> bool {
        let line = line.trim();
        YEAR_RE.is_match(line)
            && line
                .parse::<u16>()
                .is_ok_and(|y| (self.year_min..=self.year_max).contains(&y))
    }

    /// Any word of `line` is a road-type or directional token. Case is
    /// ignored on both sides, so unvalidated settings match too.
    pub fn has_road_token(&self, line: &str) -> bool {
        line.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .any(|w| self.road_tokens.iter().any(|t| t.eq_ignore_ascii_case(w)))
    }
}
