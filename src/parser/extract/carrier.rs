const GEICO_INDICATORS: &[&str] = &[
    "ELECTRONIC FUNDS TRANSFER (EFT) PROGRAM",
    "CHANGE YOUR BANK ACCOUNT INFORMATION",
    "BUSINESS INFORMATION",
    "FILING ADDED",
    "FILINGS INFORMATION",
    "ADDITIONAL INTERESTS (AI/DI/COI)",
    "POLICY COVERAGES - FOR THE INSURED AND OTHERS",
    "COMBINED SINGLE LIMIT LIABILITY (CSL)",
    "MOTOR TRUCK CARGO (MTC)",
    "ACTIVE STATE AND/OR FEDERAL FILINGS",
];

const PROGRESSIVE_INDICATORS: &[&str] = &[
    "POLICY DETAILS",
    "INSURED INFORMATION:",
    "BUSINESS INFORMATION:",
    "BUSINESS OWNER:",
    "USDOT NUMBER:",
    "RATING INFORMATION:",
    "CHANNEL: AGENCY",
    "AGENT CODE:",
    "COMPANY:",
    "NAIC:",
    "RATE REVISION:",
    "PROGRESSIVE PREFERRED INSURANCE CO",
    "PROGRESSIVE POINTS:",
    "COVERED PROPERTY (VEHICLES)",
    "VEHICLE GROUPS:",
    "GARAGING:",
    "RADIUS:",
    "AUTO INSURANCE HISTORY",
    "CONTINUOUS COVERAGE INDICATOR:",
    "BLANKET ADDITIONAL INSURED ENDORSEMENT",
    "BLANKET WAIVER OF SUBROGATION ENDORSEMENT",
    "POLICY ATTACHMENTS",
];

// Checked in order when neither scored carrier is confident.
const NAMED_CARRIERS: &[(&str, &str)] = &[
    ("STATE FARM", "State Farm"),
    ("ALLSTATE", "Allstate"),
    ("LIBERTY MUTUAL", "Liberty Mutual"),
    ("NATIONWIDE", "Nationwide"),
    ("FARMERS", "Farmers"),
    ("USAA", "USAA"),
    ("TRAVELERS", "Travelers"),
];

const MIN_SCORE: usize = 3;
const NAME_BONUS: usize = 3;

fn score(upper: &str, indicators: &[&str], name: &str) -> usize {
    let hits = indicators.iter().filter(|i| upper.contains(*i)).count();
    if upper.contains(name) {
        hits + NAME_BONUS
    } else {
        hits
    }
}

/// Guess the issuing carrier from indicator phrases. Empty when unsure.
pub fn detect(text: &str) -> String {
    let upper = text.to_uppercase();
    let geico = score(&upper, GEICO_INDICATORS, "GEICO");
    let progressive = score(&upper, PROGRESSIVE_INDICATORS, "PROGRESSIVE");

    if geico >= MIN_SCORE && geico > progressive {
        return "GEICO".to_string();
    }
    if progressive >= MIN_SCORE && progressive > geico {
        return "Progressive".to_string();
    }
    NAMED_CARRIERS
        .iter()
        .find(|(needle, _)| upper.contains(needle))
        .map(|(_, name)| name.to_string())
        .unwrap_or_default()
}
