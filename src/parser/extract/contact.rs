use crate::parser::extract::details;
use crate::parser::sections::{lines_of, preamble, LineGroup, SectionLabel};

pub struct Contact {
    pub business_name: String,
    pub email: String,
    pub phone: String,
}

pub fn extract(groups: &[LineGroup]) -> Contact {
    let business_name = first_line(groups, SectionLabel::BusinessName)
        .or_else(|| {
            // Preamble fallback, skipping `Policy Number: …` style lines.
            preamble(groups).and_then(|g| {
                g.lines
                    .iter()
                    .find(|l| !details::is_detail_line(l))
                    .cloned()
            })
        })
        .unwrap_or_default();

    Contact {
        business_name,
        email: first_line(groups, SectionLabel::Email).unwrap_or_default(),
        phone: first_line(groups, SectionLabel::Phone).unwrap_or_default(),
    }
}

fn first_line(groups: &[LineGroup], label: SectionLabel) -> Option<String> {
    lines_of(groups, label).next().cloned()
}
