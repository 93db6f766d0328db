use itertools::Itertools;
use tracing::warn;

use super::{CoverageEntry, Diagnostics};
use crate::parser::sections::{lines_of, LineGroup, SectionLabel};

/// Label line followed by value line, two at a time in document order.
pub fn extract(groups: &[LineGroup], diagnostics: &mut Diagnostics) -> Vec<CoverageEntry> {
    let lines: Vec<&String> = lines_of(groups, SectionLabel::PolicyCoverages).collect();

    let entries: Vec<CoverageEntry> = lines
        .iter()
        .tuples()
        .map(|(label, value)| CoverageEntry {
            label: label.to_string(),
            value: value.to_string(),
        })
        .collect();

    if lines.len() % 2 == 1 {
        if let Some(unpaired) = lines.last() {
            warn!(line = %unpaired, "unpaired coverage line discarded");
        }
        diagnostics.unpaired_coverage_lines += 1;
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::segment;

    fn run(text: &str) -> (Vec<CoverageEntry>, Diagnostics) {
        let mut d = Diagnostics::default();
        let entries = extract(&segment(text), &mut d);
        (entries, d)
    }

    #[test]
    fn pairs_in_document_order() {
        let (entries, d) = run(
            "Policy Coverages\nCombined Single Limit Liability (CSL)\n$1,000,000\nMotor Truck Cargo (MTC)\n$100k/$2500 deductible",
        );
        assert_eq!(
            entries,
            vec![
                CoverageEntry {
                    label: "Combined Single Limit Liability (CSL)".into(),
                    value: "$1,000,000".into(),
                },
                CoverageEntry {
                    label: "Motor Truck Cargo (MTC)".into(),
                    value: "$100k/$2500 deductible".into(),
                },
            ]
        );
        assert_eq!(d.unpaired_coverage_lines, 0);
    }

    #[test]
    fn odd_trailing_line_discarded() {
        let (entries, d) = run("Policy Coverages - For the Insured and Others\nA\n1\nB\n2\nC");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].label, "B");
        assert_eq!(d.unpaired_coverage_lines, 1);
    }

    #[test]
    fn entry_count_is_half_the_lines() {
        for n in 0..7 {
            let body: Vec<String> = (0..n).map(|i| format!("line {}", i)).collect();
            let (entries, _) = run(&format!("Policy Coverages\n{}", body.join("\n")));
            assert_eq!(entries.len(), n / 2);
        }
    }
}
