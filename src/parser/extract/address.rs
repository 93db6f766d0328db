use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::{AddressRecord, Diagnostics};
use crate::parser::sections::{lines_of, LineGroup, SectionLabel};

static STATE_ZIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([A-Za-z][A-Za-z .'-]*?)\s*,\s*)?([A-Za-z]{2})\s+(\d{5}(?:-\d{4})?)$").unwrap()
});

struct StateZip {
    city: Option<String>,
    state: String,
    zip: String,
}

fn parse_state_zip(line: &str) -> Option<StateZip> {
    let caps = STATE_ZIP_RE.captures(line.trim())?;
    Some(StateZip {
        city: caps.get(1).map(|m| m.as_str().trim().to_string()),
        state: caps[2].to_uppercase(),
        zip: caps[3].to_string(),
    })
}

/// Positional split: street lines, then city, then `ST 12345`
/// (or `CITY, ST 12345` as the final line).
///
/// The last line always takes the `STATE ZIP` slot. When it does not parse,
/// it is dropped with a diagnostic and state and zip stay empty; the lines
/// before it still split the same way, the one before the last being the
/// city and any earlier ones the street.
pub fn assemble(lines: &[String], diagnostics: &mut Diagnostics) -> AddressRecord {
    let mut address = AddressRecord::default();
    let Some((last, head)) = lines.split_last() else {
        return address;
    };

    match parse_state_zip(last) {
        Some(StateZip {
            city: Some(city),
            state,
            zip,
        }) => {
            address.street = head.join(" ");
            address.city = city;
            address.state = state;
            address.zip = zip;
        }
        Some(StateZip { city: None, state, zip }) => {
            if let Some((city, street)) = head.split_last() {
                address.street = street.join(" ");
                address.city = city.clone();
            }
            address.state = state;
            address.zip = zip;
        }
        None => {
            warn!(line = %last, "address line is not STATE ZIP");
            diagnostics.unparsed_state_zip_lines += 1;
            if let Some((city, street)) = head.split_last() {
                address.street = street.join(" ");
                address.city = city.clone();
            }
        }
    }

    address
}

/// Address of a leaked fragment: positional when it carries its own
/// `STATE ZIP` tail, otherwise one joined street line.
fn assemble_leaked(fragment: &[String]) -> AddressRecord {
    let has_tail = fragment.len() >= 3
        && fragment.last().is_some_and(|l| parse_state_zip(l).is_some());
    if has_tail {
        return assemble(fragment, &mut Diagnostics::default());
    }
    AddressRecord {
        street: fragment.join(" "),
        ..AddressRecord::default()
    }
}

fn same_street(a: &str, b: &str) -> bool {
    let norm = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    norm(a) == norm(b)
}

fn fill(slot: &mut String, value: String) {
    if slot.is_empty() {
        *slot = value;
    }
}

/// Fold a fragment rejected by the vehicle disambiguator into the address.
pub fn fold_fragment(address: &mut AddressRecord, fragment: &[String], diagnostics: &mut Diagnostics) {
    let leaked = assemble_leaked(fragment);

    if address.street.is_empty() || same_street(&address.street, &leaked.street) {
        fill(&mut address.street, leaked.street);
        diagnostics.folded_address_fragments += 1;
    } else {
        warn!(
            fragment = %leaked.street,
            street = %address.street,
            "street already set, discarding leaked address fragment"
        );
        diagnostics.discarded_address_fragments += 1;
        return;
    }

    fill(&mut address.city, leaked.city);
    fill(&mut address.state, leaked.state);
    fill(&mut address.zip, leaked.zip);
}

pub fn extract(
    groups: &[LineGroup],
    leaked: &[Vec<String>],
    diagnostics: &mut Diagnostics,
) -> AddressRecord {
    let lines: Vec<String> = lines_of(groups, SectionLabel::MailingAddress).cloned().collect();
    let mut address = assemble(&lines, diagnostics);
    for fragment in leaked {
        fold_fragment(&mut address, fragment, diagnostics);
    }
    address
}
