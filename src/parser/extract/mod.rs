pub mod address;
pub mod carrier;
pub mod contact;
pub mod coverages;
pub mod details;
pub mod drivers;
pub mod vehicles;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sections::{self, LineGroup};
use crate::heuristics::Heuristics;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressRecord {
    pub fn is_empty(&self) -> bool {
        self.street.is_empty() && self.city.is_empty() && self.state.is_empty() && self.zip.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    #[default]
    PowerUnit,
    Trailer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// As declared in the document, never renumbered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub year: String,
    pub make: String,
    pub model: String,
    pub identifier: String,
    pub kind: VehicleKind,
    pub low_confidence: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub name: String,
    pub age: String,
    pub license_number: String,
    /// `YYYY-MM-DD` when the `Date of Birth:` line parses, else as written.
    pub date_of_birth: String,
    pub license_state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDetails {
    pub policy_number: String,
    pub status: String,
    pub usdot_number: String,
    /// `YYYY-MM-DD`, empty when absent or unparseable.
    pub effective_date: String,
    pub expiration_date: String,
    /// Digits only, e.g. `8412.50`.
    pub premium: String,
    pub business_class: String,
    pub mobile_phone: String,
    pub business_owner: String,
    pub agent_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Owned by the caller's record-store identifier policy; the extractor
    /// never sets it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub carrier: String,
    pub details: PolicyDetails,
    pub address: AddressRecord,
    pub vehicles: Vec<VehicleRecord>,
    pub drivers: Vec<DriverRecord>,
    pub coverages: Vec<CoverageEntry>,
}

impl PolicyRecord {
    /// Value of the first coverage whose label contains `needle`
    /// (case-insensitive).
    pub fn coverage(&self, needle: &str) -> Option<&str> {
        let needle = needle.to_lowercase();
        self.coverages
            .iter()
            .find(|c| c.label.to_lowercase().contains(&needle))
            .map(|c| c.value.as_str())
    }
}

/// Counts of everything the extractor dropped or was unsure about, for a
/// human reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub headers_found: usize,
    pub dropped_vehicle_units: usize,
    pub low_confidence_vehicles: usize,
    pub folded_address_fragments: usize,
    pub discarded_address_fragments: usize,
    pub dropped_driver_units: usize,
    pub unpaired_coverage_lines: usize,
    pub unparsed_state_zip_lines: usize,
}

impl Diagnostics {
    pub fn needs_review(&self) -> bool {
        self.dropped_vehicle_units > 0
            || self.low_confidence_vehicles > 0
            || self.discarded_address_fragments > 0
            || self.dropped_driver_units > 0
            || self.unpaired_coverage_lines > 0
            || self.unparsed_state_zip_lines > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub record: PolicyRecord,
    pub diagnostics: Diagnostics,
}

pub fn extract_all(text: &str, groups: &[LineGroup], heuristics: &Heuristics) -> Extraction {
    let mut diagnostics = Diagnostics {
        headers_found: groups
            .iter()
            .filter(|g| g.label != sections::SectionLabel::Unlabeled)
            .count(),
        ..Diagnostics::default()
    };

    if !sections::has_headers(groups) {
        debug!("no section headers recognised, returning an empty record");
        return Extraction {
            record: PolicyRecord::default(),
            diagnostics,
        };
    }

    let contact = contact::extract(groups);
    let vehicles = vehicles::extract(groups, heuristics, &mut diagnostics);
    let address = address::extract(groups, &vehicles.leaked_address, &mut diagnostics);
    let drivers = drivers::extract(groups, &mut diagnostics);
    let coverages = coverages::extract(groups, &mut diagnostics);
    let mut policy_details = details::collect(groups);
    if policy_details.premium.is_empty() {
        policy_details.premium = coverages
            .iter()
            .find_map(|c| details::premium_entry(&c.label, &c.value))
            .unwrap_or_default();
    }

    Extraction {
        record: PolicyRecord {
            id: None,
            business_name: contact.business_name,
            email: contact.email,
            phone: contact.phone,
            carrier: carrier::detect(text),
            details: policy_details,
            address,
            vehicles: vehicles.vehicles,
            drivers,
            coverages,
        },
        diagnostics,
    }
}

// ── Tests ──
