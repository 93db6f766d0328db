//! Vehicle vs. leaked street address.
//!
//! When the upstream layout collapses sections, a street line such as
//! `1158 TOWNSHIP ROAD 126` (or its split form `1158` / `TOWNSHIP ROAD 126`)
//! lands inside the Vehicles block, where the house number reads like a
//! vehicle year and the road name like a make. The rules here decide which
//! lines of a vehicle unit are really an address fragment.

use std::sync::LazyLock;

use regex::Regex;

use crate::heuristics::Heuristics;

static BARE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static STREET_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,6})\s+([A-Za-z].*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Kept as a vehicle; `low_confidence` when the year candidate is not a
    /// plausible year but nothing marks the unit as an address either.
    Vehicle { low_confidence: bool },
    AddressFragment,
}

pub fn is_bare_number(line: &str) -> bool {
    BARE_NUMBER_RE.is_match(line.trim())
}

/// Split form: a number outside the vehicle-year range immediately followed
/// by a line carrying a road-type token.
fn is_split_street(lines: &[String], heuristics: &Heuristics) -> bool {
    match lines {
        [first, second, ..] => {
            is_bare_number(first)
                && !heuristics.is_plausible_year(first)
                && heuristics.has_road_token(second)
        }
        _ => false,
    }
}

/// Single-line form: a house number that is not a plausible year, followed
/// by words that include a road-type token.
fn is_street_line(line: &str, heuristics: &Heuristics) -> bool {
    STREET_LINE_RE.captures(line.trim()).is_some_and(|caps| {
        !heuristics.is_plausible_year(&caps[1]) && heuristics.has_road_token(&caps[2])
    })
}

/// Number of head lines of `lines` that form a street fragment, if any.
pub fn fragment_len(lines: &[String], heuristics: &Heuristics) -> Option<usize> {
    if is_split_street(lines, heuristics) {
        return Some(2);
    }
    is_street_line(lines.first()?, heuristics).then_some(1)
}

pub fn is_address_fragment(lines: &[String], heuristics: &Heuristics) -> bool {
    fragment_len(lines, heuristics).is_some()
}

/// An index line that is really a short house number: the unit body opens
/// with a road line instead of a year, a `YEAR MAKE` line or a street of its
/// own. Covers `126` / `MAIN STREET`, where `126` was taken as an index.
pub fn index_is_house_number(lines: &[String], heuristics: &Heuristics) -> bool {
    let Some(first) = lines.first() else {
        return false;
    };
    heuristics.has_road_token(first)
        && !is_bare_number(first)
        && !starts_with_year(first, heuristics)
        && !is_address_fragment(lines, heuristics)
}

/// Classify the body of a vehicle unit (the lines after its index).
pub fn classify_unit(lines: &[String], heuristics: &Heuristics) -> Verdict {
    if is_address_fragment(lines, heuristics) {
        return Verdict::AddressFragment;
    }
    let low_confidence = lines
        .first()
        .is_some_and(|first| !heuristics.is_plausible_year(first) && !starts_with_year(first, heuristics));
    Verdict::Vehicle { low_confidence }
}

/// `YEAR MAKE MODEL…` on one line.
pub fn starts_with_year(line: &str, heuristics: &Heuristics) -> bool {
    let mut words = line.split_whitespace();
    matches!((words.next(), words.next()), (Some(year), Some(_)) if heuristics.is_plausible_year(year))
}

/// Cut a unit body at the first address fragment. Lines before it remain
/// the vehicle body; the fragment and everything after it are returned as
/// the leaked address lines.
///
/// The head of the body may be either street form. Past the head only the
/// split form counts: a mid-unit line such as `4 DR` is body-style text.
pub fn split_fragment<'a>(
    lines: &'a [String],
    heuristics: &Heuristics,
) -> (&'a [String], Option<&'a [String]>) {
    let at = |k: usize| {
        if k == 0 {
            is_address_fragment(lines, heuristics)
        } else {
            is_split_street(&lines[k..], heuristics)
        }
    };
    match (0..lines.len()).find(|&k| at(k)) {
        Some(k) => (&lines[..k], Some(&lines[k..])),
        None => (lines, None),
    }
}
