pub mod error;
pub mod heuristics;
pub mod parser;

pub use error::Error;
pub use heuristics::Heuristics;
pub use parser::extract::{
    AddressRecord, CoverageEntry, Diagnostics, DriverRecord, Extraction, PolicyDetails,
    PolicyRecord, VehicleKind, VehicleRecord,
};
pub use parser::{extract_policy_fields, extract_policy_fields_with};
