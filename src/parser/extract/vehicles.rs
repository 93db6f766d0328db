use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::{Diagnostics, VehicleKind, VehicleRecord};
use crate::heuristics::Heuristics;
use crate::parser::disambiguate::{self, Verdict};
use crate::parser::sections::{LineGroup, SectionLabel};
use crate::parser::units::{split_units, Unit};

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]*\d[A-Za-z0-9-]*$").unwrap());
static VIN_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^VIN\s*:\s*(\S+)$").unwrap());

const TRAILER_WORDS: &[&str] = &["trailer", "gooseneck"];

pub struct VehicleOutput {
    pub vehicles: Vec<VehicleRecord>,
    /// Line runs the disambiguator took out of the vehicle block.
    pub leaked_address: Vec<Vec<String>>,
}

pub fn extract(
    groups: &[LineGroup],
    heuristics: &Heuristics,
    diagnostics: &mut Diagnostics,
) -> VehicleOutput {
    let mut out = VehicleOutput {
        vehicles: Vec::new(),
        leaked_address: Vec::new(),
    };

    for group in groups.iter().filter(|g| g.label == SectionLabel::Vehicles) {
        let units = split_units(&group.lines, |next| heuristics.is_plausible_year(next));
        for unit in &units {
            extract_unit(unit, heuristics, diagnostics, &mut out);
        }
    }

    out
}

fn extract_unit(
    unit: &Unit,
    heuristics: &Heuristics,
    diagnostics: &mut Diagnostics,
    out: &mut VehicleOutput,
) {
    if let Some(n) = unit.index {
        if disambiguate::index_is_house_number(&unit.lines, heuristics) {
            debug!(index = n, lines = ?unit.lines, "index line is a house number");
            let mut fragment = vec![n.to_string()];
            fragment.extend(unit.lines.iter().cloned());
            out.leaked_address.push(fragment);
            return;
        }
    }

    let (body, leaked) = disambiguate::split_fragment(&unit.lines, heuristics);
    if let Some(leaked) = leaked {
        debug!(index = ?unit.index, fragment = ?leaked, "address fragment inside vehicle block");
        out.leaked_address.push(leaked.to_vec());
    }

    if body.is_empty() {
        if leaked.is_none() {
            warn!(index = ?unit.index, "empty vehicle unit dropped");
            diagnostics.dropped_vehicle_units += 1;
        }
        return;
    }

    let Verdict::Vehicle { low_confidence } = disambiguate::classify_unit(body, heuristics) else {
        // split_fragment already cut every fragment out of the body
        return;
    };

    let mut vehicle = assemble(unit.index, body, heuristics);
    vehicle.low_confidence = low_confidence;

    if !is_complete(&vehicle) {
        warn!(index = ?unit.index, lines = ?body, "incomplete vehicle unit dropped");
        diagnostics.dropped_vehicle_units += 1;
        return;
    }
    if low_confidence {
        warn!(index = ?unit.index, year = %vehicle.year, "vehicle kept with low confidence");
        diagnostics.low_confidence_vehicles += 1;
    }
    debug!(index = ?vehicle.index, year = %vehicle.year, make = %vehicle.make, "vehicle");
    out.vehicles.push(vehicle);
}

/// Positional read of a unit body: year, make, then model lines, with a
/// trailing identifier when one can be told apart from the model.
pub fn assemble(index: Option<u32>, body: &[String], heuristics: &Heuristics) -> VehicleRecord {
    let mut vehicle = VehicleRecord {
        index,
        ..VehicleRecord::default()
    };

    let first = body[0].as_str();
    let mut rest: Vec<String> = Vec::new();
    if heuristics.is_plausible_year(first) || disambiguate::is_bare_number(first) {
        vehicle.year = first.to_string();
        vehicle.make = body.get(1).cloned().unwrap_or_default();
        rest.extend(body.iter().skip(2).cloned());
    } else if disambiguate::starts_with_year(first, heuristics) {
        let mut words = first.split_whitespace();
        vehicle.year = words.next().unwrap_or_default().to_string();
        vehicle.make = words.next().unwrap_or_default().to_string();
        let model_head = words.collect::<Vec<_>>().join(" ");
        if !model_head.is_empty() {
            rest.push(model_head);
        }
        rest.extend(body.iter().skip(1).cloned());
    } else {
        vehicle.make = first.to_string();
        rest.extend(body.iter().skip(1).cloned());
    }

    if let Some(pos) = rest.iter().position(|l| VIN_LINE_RE.is_match(l)) {
        let line = rest.remove(pos);
        vehicle.identifier = VIN_LINE_RE
            .captures(&line)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
    } else if rest.len() >= 2 {
        let last = &rest[rest.len() - 1];
        if IDENT_RE.is_match(last) && *last != vehicle.year {
            vehicle.identifier = rest.pop().unwrap_or_default();
        }
    }

    vehicle.model = rest.join(" ");
    vehicle.kind = kind_of(&vehicle);
    vehicle
}

fn kind_of(vehicle: &VehicleRecord) -> VehicleKind {
    let text = format!("{} {}", vehicle.make, vehicle.model).to_lowercase();
    if TRAILER_WORDS.iter().any(|w| text.contains(w)) {
        VehicleKind::Trailer
    } else {
        VehicleKind::PowerUnit
    }
}

/// At least two of year, make, model.
pub fn is_complete(vehicle: &VehicleRecord) -> bool {
    [&vehicle.year, &vehicle.make, &vehicle.model]
        .iter()
        .filter(|f| !f.is_empty())
        .count()
        >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::segment;

    fn run(text: &str) -> (VehicleOutput, Diagnostics) {
        let mut d = Diagnostics::default();
        let out = extract(&segment(text), &Heuristics::default(), &mut d);
        (out, d)
    }

    fn lines(s: &str) -> Vec<String> {
        s.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn positional_fields() {
        let v = assemble(Some(1), &lines("1998\nPETERBILT\n379\n45052"), &Heuristics::default());
        assert_eq!(v.year, "1998");
        assert_eq!(v.make, "PETERBILT");
        assert_eq!(v.model, "379");
        assert_eq!(v.identifier, "45052");
        assert_eq!(v.kind, VehicleKind::PowerUnit);
    }

    #[test]
    fn single_model_line_is_not_an_identifier() {
        let v = assemble(Some(2), &lines("2025\nUnidentified\nTrailer For 45052"), &Heuristics::default());
        assert_eq!(v.model, "Trailer For 45052");
        assert!(v.identifier.is_empty());
        assert_eq!(v.kind, VehicleKind::Trailer);
    }

    #[test]
    fn single_line_year_make_model() {
        let v = assemble(
            None,
            &lines("2019 FREIGHTLINER CASCADIA 126\nVIN: 3AKJHHDR5KSKA1234"),
            &Heuristics::default(),
        );
        assert_eq!(v.year, "2019");
        assert_eq!(v.make, "FREIGHTLINER");
        assert_eq!(v.model, "CASCADIA 126");
        assert_eq!(v.identifier, "3AKJHHDR5KSKA1234");
    }

    #[test]
    fn partial_vehicle_without_model_accepted() {
        let (out, d) = run("Vehicles\n1\n2020\nKENWORTH");
        assert_eq!(out.vehicles.len(), 1);
        assert!(out.vehicles[0].model.is_empty());
        assert_eq!(d.dropped_vehicle_units, 0);
    }

    #[test]
    fn index_only_unit_dropped() {
        let (out, d) = run("Vehicles\n1");
        assert!(out.vehicles.is_empty());
        assert_eq!(d.dropped_vehicle_units, 1);
    }

    #[test]
    fn empty_unit_does_not_disturb_neighbours() {
        let (out, d) = run("Vehicles\n1\n2\n2021\nMACK\nANTHEM\n3\n2018\nVOLVO\nVNL");
        assert_eq!(out.vehicles.len(), 2);
        assert_eq!(out.vehicles[0].index, Some(2));
        assert_eq!(out.vehicles[1].index, Some(3));
        assert_eq!(d.dropped_vehicle_units, 1);
    }

    #[test]
    fn one_field_unit_dropped() {
        let (out, d) = run("Vehicles\n1\nUNKNOWN");
        assert!(out.vehicles.is_empty());
        assert_eq!(d.dropped_vehicle_units, 1);
    }

    #[test]
    fn street_number_rejected_as_vehicle() {
        let (out, d) = run("Vehicles\n1158\nTOWNSHIP ROAD 126\n1\n1998\nPETERBILT\n379\n45052");
        assert_eq!(out.vehicles.len(), 1);
        assert_eq!(out.vehicles[0].year, "1998");
        assert_eq!(out.leaked_address, vec![lines("1158\nTOWNSHIP ROAD 126")]);
        assert_eq!(d.dropped_vehicle_units, 0);
    }

    #[test]
    fn indexed_unit_holding_a_street_is_rejected() {
        let (out, _) = run("Vehicles\n1\n1158 TOWNSHIP ROAD 126\n2\n2025\nUnidentified\nTrailer");
        assert_eq!(out.vehicles.len(), 1);
        assert_eq!(out.vehicles[0].index, Some(2));
        assert_eq!(out.leaked_address, vec![lines("1158 TOWNSHIP ROAD 126")]);
    }

    #[test]
    fn trailing_street_cut_from_vehicle() {
        let (out, _) = run("Vehicles\n1\n1998\nPETERBILT\n379\n45052\n1158\nTOWNSHIP ROAD 126\nNOVA\nOH 44859");
        assert_eq!(out.vehicles.len(), 1);
        assert_eq!(out.vehicles[0].identifier, "45052");
        assert_eq!(out.leaked_address[0], lines("1158\nTOWNSHIP ROAD 126\nNOVA\nOH 44859"));
    }

    #[test]
    fn undecidable_number_kept_low_confidence() {
        let (out, d) = run("Vehicles\n1\n1158\nPETERBILT\n379");
        assert_eq!(out.vehicles.len(), 1);
        assert!(out.vehicles[0].low_confidence);
        assert_eq!(out.vehicles[0].year, "1158");
        assert_eq!(d.low_confidence_vehicles, 1);
        assert!(d.needs_review());
    }

    #[test]
    fn single_line_vehicle_with_road_word_kept() {
        let (out, d) = run("Vehicles\n1\n2014 FORD FOCUS ST\n2\n2019\nPETERBILT\n579");
        assert_eq!(out.vehicles.len(), 2);
        assert_eq!(out.vehicles[0].year, "2014");
        assert_eq!(out.vehicles[0].make, "FORD");
        assert_eq!(out.vehicles[0].model, "FOCUS ST");
        assert!(out.leaked_address.is_empty());
        assert!(!d.needs_review());
    }

    #[test]
    fn short_house_number_read_as_index_goes_to_address() {
        let (out, _) = run("Vehicles\n126\nMAIN STREET\nNOVA\nOH 44859\n1\n1998\nPETERBILT\n379");
        assert_eq!(out.vehicles.len(), 1);
        assert_eq!(out.vehicles[0].index, Some(1));
        assert_eq!(out.vehicles[0].year, "1998");
        assert_eq!(out.leaked_address, vec![lines("126\nMAIN STREET\nNOVA\nOH 44859")]);
    }

    #[test]
    fn body_style_line_keeps_vin() {
        let (out, _) = run("Vehicles\n1\n2018\nCHEVROLET\nSILVERADO\n4 DR\n1GCUYDED5JZ123456");
        assert_eq!(out.vehicles.len(), 1);
        assert_eq!(out.vehicles[0].model, "SILVERADO 4 DR");
        assert_eq!(out.vehicles[0].identifier, "1GCUYDED5JZ123456");
        assert!(out.leaked_address.is_empty());
    }
}
