use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::PolicyDetails;
use crate::parser::sections::{LineGroup, SectionLabel};

static DETAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(policy number|status|usdot number|policy period|business class|mobile phone number|mobile phone|business owner|agent code)\s*:\s*(.*)$",
    )
    .unwrap()
});
static PREMIUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:premium|total\s+cost|annual\s+cost)\b").unwrap());
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\s*(\d[\d,]*(?:\.\d+)?)").unwrap());

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"];

/// Smaller amounts on a premium line are fees or counts, not the premium.
const MIN_PREMIUM: f64 = 100.0;

/// Groups that may carry `Key: value` metadata next to their own value.
const DETAIL_GROUPS: &[SectionLabel] = &[
    SectionLabel::Unlabeled,
    SectionLabel::BusinessName,
    SectionLabel::Email,
    SectionLabel::Phone,
];

pub fn is_detail_line(line: &str) -> bool {
    let line = line.trim();
    DETAIL_RE.is_match(line) || (PREMIUM_RE.is_match(line) && amount(line).is_some())
}

/// Details from the preamble and the contact groups.
pub fn collect(groups: &[LineGroup]) -> PolicyDetails {
    let lines: Vec<String> = groups
        .iter()
        .filter(|g| DETAIL_GROUPS.contains(&g.label))
        .flat_map(|g| g.lines.iter().cloned())
        .collect();
    extract(&lines)
}

/// Collect `Key: value` policy metadata lines and the premium. First
/// occurrence wins.
pub fn extract(lines: &[String]) -> PolicyDetails {
    let mut details = PolicyDetails::default();

    for (i, line) in lines.iter().enumerate() {
        if details.premium.is_empty() {
            if let Some(premium) = premium_at(lines, i) {
                details.premium = premium;
                continue;
            }
        }
        let Some(caps) = DETAIL_RE.captures(line.trim()) else {
            continue;
        };
        let value = caps[2].trim();
        let slot = match caps[1].to_lowercase().as_str() {
            "policy number" => &mut details.policy_number,
            "status" => &mut details.status,
            "usdot number" => &mut details.usdot_number,
            "business class" => &mut details.business_class,
            "mobile phone number" | "mobile phone" => &mut details.mobile_phone,
            "business owner" => &mut details.business_owner,
            "agent code" => &mut details.agent_code,
            _ => {
                if details.effective_date.is_empty() {
                    if let Some((from, to)) = parse_period(value) {
                        details.effective_date = from;
                        details.expiration_date = to;
                    }
                }
                continue;
            }
        };
        if slot.is_empty() {
            *slot = value.to_string();
        }
    }

    details
}

/// Premium named on line `i`, with the amount on the same line or the next.
fn premium_at(lines: &[String], i: usize) -> Option<String> {
    let line = &lines[i];
    if !PREMIUM_RE.is_match(line) {
        return None;
    }
    amount(line).or_else(|| lines.get(i + 1).and_then(|next| amount(next)))
}

/// Premium from a coverage pair such as `Total Premium` / `$8,412.50`.
pub fn premium_entry(label: &str, value: &str) -> Option<String> {
    if PREMIUM_RE.is_match(label) {
        amount(value)
    } else {
        None
    }
}

/// Dollar amount with separators stripped, if above [`MIN_PREMIUM`].
fn amount(text: &str) -> Option<String> {
    let caps = AMOUNT_RE.captures(text)?;
    let digits = caps[1].replace(',', "");
    let value: f64 = digits.parse().ok()?;
    (value > MIN_PREMIUM).then_some(digits)
}

fn parse_period(period: &str) -> Option<(String, String)> {
    let (from, to) = period.split_once(" - ")?;
    Some((normalize_date(from)?, normalize_date(to)?))
}

/// Normalize a date in any of the carrier formats to `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}
