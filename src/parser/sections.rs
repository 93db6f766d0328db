use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static INLINE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z ]{1,40}?)\s*:\s*(.*)$").unwrap());

/// The closed header vocabulary of the upstream policy documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionLabel {
    BusinessName,
    Email,
    Phone,
    MailingAddress,
    Vehicles,
    Drivers,
    PolicyCoverages,
    Unlabeled,
}

impl SectionLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionLabel::BusinessName => "Business Name",
            SectionLabel::Email => "Email",
            SectionLabel::Phone => "Phone",
            SectionLabel::MailingAddress => "Mailing Address",
            SectionLabel::Vehicles => "Vehicles",
            SectionLabel::Drivers => "Drivers",
            SectionLabel::PolicyCoverages => "Policy Coverages",
            SectionLabel::Unlabeled => "Unlabeled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineGroup {
    pub label: SectionLabel,
    pub lines: Vec<String>,
}

impl LineGroup {
    fn new(label: SectionLabel) -> Self {
        LineGroup {
            label,
            lines: Vec::new(),
        }
    }
}

/// Classify a whole line as a section header. Exact match (case-insensitive),
/// except the coverages header whose suffix varies by carrier.
pub fn classify_header(line: &str) -> Option<SectionLabel> {
    let lower = line.trim().to_lowercase();
    match lower.as_str() {
        "business name" => Some(SectionLabel::BusinessName),
        "email" | "email address" => Some(SectionLabel::Email),
        "phone" | "phone number" | "business phone number" => Some(SectionLabel::Phone),
        "mailing address" => Some(SectionLabel::MailingAddress),
        "vehicles" | "vehicle" => Some(SectionLabel::Vehicles),
        "drivers" | "driver" => Some(SectionLabel::Drivers),
        _ if lower.starts_with("policy coverages") => Some(SectionLabel::PolicyCoverages),
        _ => None,
    }
}

/// Header on its own line, or `Label: value` with the value as first line.
fn detect_header(line: &str) -> Option<(SectionLabel, Option<String>)> {
    if let Some(label) = classify_header(line) {
        return Some((label, None));
    }
    let caps = INLINE_LABEL_RE.captures(line)?;
    let label = classify_header(&caps[1])?;
    let value = caps[2].trim();
    Some((label, (!value.is_empty()).then(|| value.to_string())))
}

/// Split raw text into trimmed non-empty lines grouped under the nearest
/// preceding header. Lines before any header form a leading Unlabeled group.
pub fn segment(text: &str) -> Vec<LineGroup> {
    let mut groups: Vec<LineGroup> = Vec::new();
    let mut current = LineGroup::new(SectionLabel::Unlabeled);

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((label, inline_value)) = detect_header(line) {
            debug!(header = label.as_str(), "section header");
            let finished = std::mem::replace(&mut current, LineGroup::new(label));
            push_group(&mut groups, finished);
            current.lines.extend(inline_value);
            continue;
        }
        current.lines.push(line.to_string());
    }
    push_group(&mut groups, current);

    groups
}

// Header groups are kept even when empty; an empty preamble is not.
fn push_group(groups: &mut Vec<LineGroup>, group: LineGroup) {
    if group.label != SectionLabel::Unlabeled || !group.lines.is_empty() {
        groups.push(group);
    }
}

/// The leading Unlabeled group, if the document has one.
pub fn preamble(groups: &[LineGroup]) -> Option<&LineGroup> {
    groups
        .first()
        .filter(|g| g.label == SectionLabel::Unlabeled)
}

pub fn has_headers(groups: &[LineGroup]) -> bool {
    groups.iter().any(|g| g.label != SectionLabel::Unlabeled)
}

/// All lines of every group carrying `label`, in document order.
pub fn lines_of(groups: &[LineGroup], label: SectionLabel) -> impl Iterator<Item = &String> {
    groups
        .iter()
        .filter(move |g| g.label == label)
        .flat_map(|g| &g.lines)
}
