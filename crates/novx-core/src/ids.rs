//! Identifier prefixes and generation.
//!
//! Every entity kind has a fixed two-letter prefix; identifier uniqueness is
//! scoped per kind. New identifiers fill the lowest free number of their
//! kind, so deleted numbers get reused.

use std::collections::HashSet;

pub const CHAPTER_PREFIX: &str = "ch";
pub const SECTION_PREFIX: &str = "sc";
pub const CHARACTER_PREFIX: &str = "cr";
pub const LOCATION_PREFIX: &str = "lc";
pub const ITEM_PREFIX: &str = "it";
pub const PLOT_LINE_PREFIX: &str = "ac";
pub const PLOT_POINT_PREFIX: &str = "ap";
pub const PROJECT_NOTE_PREFIX: &str = "pn";

/// Returns the first `{prefix}{n}`, n = 1, 2, …, not contained in `existing`.
#[must_use]
pub fn new_id<'a, I>(existing: I, prefix: &str) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let taken: HashSet<&str> = existing.into_iter().map(String::as_str).collect();
    let mut number = 1;
    loop {
        let candidate = format!("{}{}", prefix, number);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        number += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_starts_at_one() {
        let existing: Vec<String> = Vec::new();
        assert_eq!(new_id(&existing, CHAPTER_PREFIX), "ch1");
    }

    #[test]
    fn new_id_fills_the_lowest_gap() {
        let existing = vec!["sc1".to_string(), "sc2".to_string(), "sc4".to_string()];
        assert_eq!(new_id(&existing, SECTION_PREFIX), "sc3");
    }

    #[test]
    fn new_id_ignores_other_kinds() {
        let existing = vec!["ch1".to_string()];
        assert_eq!(new_id(&existing, PLOT_LINE_PREFIX), "ac1");
    }
}
