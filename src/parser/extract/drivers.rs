use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::details::normalize_date;
use super::{Diagnostics, DriverRecord};
use crate::parser::sections::{LineGroup, SectionLabel};
use crate::parser::units::split_units;

static KEY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z ]*?)\s*:\s*(.*)$").unwrap());

/// Index-start units without disambiguation. Plain lines are read by
/// position (name, age, licence number); `License:`, `License State:` and
/// `Date of Birth:` lines fill their fields wherever they appear.
pub fn extract(groups: &[LineGroup], diagnostics: &mut Diagnostics) -> Vec<DriverRecord> {
    let mut drivers = Vec::new();

    for group in groups.iter().filter(|g| g.label == SectionLabel::Drivers) {
        for unit in split_units(&group.lines, |_| false) {
            if unit.lines.is_empty() {
                warn!(index = ?unit.index, "empty driver unit dropped");
                diagnostics.dropped_driver_units += 1;
                continue;
            }
            for (n, person) in people(&unit.lines).into_iter().enumerate() {
                // Unindexed runs can hold several people; only the first
                // carries the unit index.
                let index = if n == 0 { unit.index } else { None };
                drivers.push(assemble(index, person));
            }
        }
    }

    drivers
}

fn key_line(line: &str) -> Option<(String, &str)> {
    let caps = KEY_LINE_RE.captures(line.trim())?;
    let value = caps.get(2)?.as_str().trim();
    Some((caps[1].to_lowercase(), value))
}

/// Split a unit into people: a plain line directly followed by a key line
/// starts a new person once the current one already has key lines.
fn people(lines: &[String]) -> Vec<&[String]> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut seen_key = false;

    for (i, line) in lines.iter().enumerate() {
        let is_key = key_line(line).is_some();
        let opens_person = !is_key && lines.get(i + 1).is_some_and(|next| key_line(next).is_some());
        if opens_person && seen_key && i > start {
            out.push(&lines[start..i]);
            start = i;
            seen_key = false;
        }
        seen_key |= is_key;
    }
    out.push(&lines[start..]);
    out
}

fn assemble(index: Option<u32>, lines: &[String]) -> DriverRecord {
    let mut driver = DriverRecord {
        index,
        ..DriverRecord::default()
    };
    let mut plain = Vec::new();

    for line in lines {
        let Some((key, value)) = key_line(line) else {
            plain.push(line.clone());
            continue;
        };
        match key.as_str() {
            "license" | "licence" | "license number" => driver.license_number = value.to_string(),
            "license state" => driver.license_state = value.to_string(),
            "date of birth" | "dob" => {
                driver.date_of_birth = normalize_date(value).unwrap_or_else(|| value.to_string())
            }
            _ => debug!(key = %key, "driver detail ignored"),
        }
    }

    let mut plain = plain.into_iter();
    driver.name = plain.next().unwrap_or_default();
    driver.age = plain.next().unwrap_or_default();
    if driver.license_number.is_empty() {
        driver.license_number = plain.next().unwrap_or_default();
    }
    driver
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::segment;

    fn run(text: &str) -> (Vec<DriverRecord>, Diagnostics) {
        let mut d = Diagnostics::default();
        let drivers = extract(&segment(text), &mut d);
        (drivers, d)
    }

    #[test]
    fn full_driver_units() {
        let (drivers, d) = run("Drivers\n1\nJAMES CARTER\n45\nT12345678\n2\nANA RUIZ\n31");
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].index, Some(1));
        assert_eq!(drivers[0].name, "JAMES CARTER");
        assert_eq!(drivers[0].age, "45");
        assert_eq!(drivers[0].license_number, "T12345678");
        assert_eq!(drivers[1].name, "ANA RUIZ");
        assert_eq!(drivers[1].age, "31");
        assert!(drivers[1].license_number.is_empty());
        assert_eq!(d.dropped_driver_units, 0);
    }

    #[test]
    fn age_equal_to_next_index_is_still_data() {
        // 45 does not continue the sequence after 1, so it stays the age.
        let (drivers, _) = run("Drivers\n1\nJOHN DOE\n45\n2\nJANE DOE");
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].age, "45");
    }

    #[test]
    fn empty_driver_unit_dropped() {
        let (drivers, d) = run("Drivers\n1\n2\nJANE DOE\n52");
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].index, Some(2));
        assert_eq!(d.dropped_driver_units, 1);
    }

    #[test]
    fn no_drivers_section() {
        let (drivers, d) = run("Business Name\nACME LLC");
        assert!(drivers.is_empty());
        assert_eq!(d.dropped_driver_units, 0);
    }

    #[test]
    fn keyed_driver_lines() {
        let (drivers, _) = run(
            "Drivers\n1\nJAMES CARTER\nDate of Birth: 04/12/1979\nLicense State: VA\nLicense: T12345678",
        );
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].name, "JAMES CARTER");
        assert_eq!(drivers[0].date_of_birth, "1979-04-12");
        assert_eq!(drivers[0].license_state, "VA");
        assert_eq!(drivers[0].license_number, "T12345678");
        assert!(drivers[0].age.is_empty());
    }

    #[test]
    fn unindexed_keyed_drivers_split_per_person() {
        let (drivers, _) = run(
            "Drivers\nJOHN SMITH\nDate of Birth: 01/02/1980\nLicense: S1234\nJANE DOE\nLicense State: OH\nProgressive Points: 0",
        );
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].name, "JOHN SMITH");
        assert_eq!(drivers[0].license_number, "S1234");
        assert_eq!(drivers[1].name, "JANE DOE");
        assert_eq!(drivers[1].license_state, "OH");
        assert!(drivers[1].age.is_empty());
    }

    #[test]
    fn age_before_key_line_stays_with_the_driver() {
        let (drivers, _) = run("Drivers\n1\nJOHN DOE\n45\nLicense: D1234567");
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].age, "45");
        assert_eq!(drivers[0].license_number, "D1234567");
    }
}
