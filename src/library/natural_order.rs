//! Human lesson ordering for file and directory names.
//!
//! Names with a leading number sort numerically on that number, then by the
//! case-folded rest of the name. Names without one sort after every numbered
//! name, by their case-folded full text.

use std::cmp::Ordering;

/// Sort key derived from a name
#[derive(Debug, Clone, PartialEq, Eq)]
enum SortKey<'a> {
    /// Leading digit run (leading zeros stripped) plus folded remainder
    Numbered { digits: &'a str, rest: String },

    /// No leading digits: orders after all numbered names
    Plain(String),
}

impl<'a> SortKey<'a> {
    fn of(name: &'a str) -> Self {
        let end = name
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(name.len());

        if end == 0 {
            return SortKey::Plain(name.to_lowercase());
        }

        let run = &name[..end];
        let digits = run.trim_start_matches('0');
        SortKey::Numbered {
            digits,
            rest: name[end..].to_lowercase(),
        }
    }
}

/// Compare two digit strings without leading zeros by numeric value.
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare two names in natural lesson order.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (SortKey::of(a), SortKey::of(b)) {
        (
            SortKey::Numbered { digits: da, rest: ra },
            SortKey::Numbered { digits: db, rest: rb },
        ) => compare_digits(da, db).then_with(|| ra.cmp(&rb)),
        (SortKey::Numbered { .. }, SortKey::Plain(_)) => Ordering::Less,
        (SortKey::Plain(_), SortKey::Numbered { .. }) => Ordering::Greater,
        (SortKey::Plain(ra), SortKey::Plain(rb)) => ra.cmp(&rb),
    }
}

/// Sort a slice of values in natural order of the name returned by `name`.
///
/// The sort is stable, so values whose keys compare equal keep their input order.
pub fn sort_by_name<T, F>(values: &mut [T], name: F)
where
    F: Fn(&T) -> &str,
{
    values.sort_by(|a, b| compare(name(a), name(b)));
}
