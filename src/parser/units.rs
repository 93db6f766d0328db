use std::sync::LazyLock;

use regex::Regex;

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,3}$").unwrap());

/// One repeated record inside a Vehicles or Drivers block: the declared
/// sequence index (absent for lines before the first index) and its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub index: Option<u32>,
    pub lines: Vec<String>,
}

impl Unit {
    fn open(index: Option<u32>) -> Self {
        Unit {
            index,
            lines: Vec::new(),
        }
    }

    fn is_blank(&self) -> bool {
        self.index.is_none() && self.lines.is_empty()
    }
}

/// Parse a short standalone integer (1-3 digits, nothing else on the line).
pub fn index_value(line: &str) -> Option<u32> {
    let line = line.trim();
    if INDEX_RE.is_match(line) {
        line.parse().ok()
    } else {
        None
    }
}

/// Split a flat line run into units at index-start lines.
///
/// A short integer only opens a unit when nothing indexed is open yet, when it
/// continues the declared sequence (open index + 1), or when `anchors_unit`
/// accepts the following line. Anything else is data: a model "379" or a
/// driver age "45" stays inside the current unit.
pub fn split_units<F>(lines: &[String], anchors_unit: F) -> Vec<Unit>
where
    F: Fn(&str) -> bool,
{
    let mut units = Vec::new();
    let mut current = Unit::open(None);

    for (i, line) in lines.iter().enumerate() {
        if let Some(n) = index_value(line) {
            let continues = current.index.is_some_and(|open| open.checked_add(1) == Some(n));
            let anchored = lines.get(i + 1).is_some_and(|next| anchors_unit(next));
            if current.index.is_none() || continues || anchored {
                let finished = std::mem::replace(&mut current, Unit::open(Some(n)));
                if !finished.is_blank() {
                    units.push(finished);
                }
                continue;
            }
        }
        current.lines.push(line.clone());
    }
    if !current.is_blank() {
        units.push(current);
    }

    units
}
