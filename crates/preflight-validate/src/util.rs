//! Predicates shared by the table checks.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::{CheckError, Result};

/// `<base>.<digits>`, the suffix spreadsheet importers give colliding headers.
static COLLISION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.(\d+)$").expect("Invalid collision suffix regex"));

/// First wanted value absent from `present`.
pub fn first_missing<'a, S: AsRef<str>>(wanted: &'a [S], present: &[String]) -> Option<&'a str> {
    let present: HashSet<&str> = present.iter().map(String::as_str).collect();
    wanted
        .iter()
        .map(AsRef::as_ref)
        .find(|value| !present.contains(value))
}

/// Column names that are duplicated, either literally or as a collision
/// suffix (`a.1` next to `a`). Reported once each by base name, in order.
pub fn duplicate_column_names(names: &[String]) -> Vec<String> {
    let all: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for name in names {
        let base = if counts[name.as_str()] > 1 {
            Some(name.as_str())
        } else {
            COLLISION_SUFFIX
                .captures(name)
                .and_then(|caps| caps.get(1))
                .map(|base| base.as_str())
                .filter(|base| all.contains(base))
        };
        if let Some(base) = base {
            if seen.insert(base) {
                duplicates.push(base.to_string());
            }
        }
    }
    duplicates
}

/// Values occurring more than once, in first-occurrence order.
pub fn duplicate_values(values: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|value| counts[value.as_str()] > 1 && seen.insert(value.as_str()))
        .cloned()
        .collect()
}

/// First wanted value that occurs more than once in `values`.
pub fn first_repeated<'a, S: AsRef<str>>(wanted: &'a [S], values: &[String]) -> Option<&'a str> {
    wanted
        .iter()
        .map(AsRef::as_ref)
        .find(|target| values.iter().filter(|value| value == target).count() > 1)
}

/// Compile `pattern` so that it must match at the start of a value.
pub fn anchored_regex(pattern: &str, ignore_case: bool) -> Result<Regex> {
    RegexBuilder::new(&format!("^(?:{pattern})"))
        .case_insensitive(ignore_case)
        .build()
        .map_err(|source| CheckError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}

/// True when `value` lies within the optional inclusive limits.
pub fn in_range(value: f64, llim: Option<f64>, ulim: Option<f64>) -> bool {
    llim.is_none_or(|low| value >= low) && ulim.is_none_or(|high| value <= high)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_first_missing() {
        let present = strings(&["idx", "col_1"]);
        assert_eq!(first_missing(&["idx", "col_1", "col_2"], &present), Some("col_2"));
        assert_eq!(first_missing(&["col_1"], &present), None);
    }

    #[test]
    fn test_duplicate_column_names() {
        assert_eq!(
            duplicate_column_names(&strings(&["1002", "1003", "1003.1"])),
            vec!["1003"]
        );
        assert_eq!(
            duplicate_column_names(&strings(&["a", "a", "b", "b.2"])),
            vec!["a", "b"]
        );
        // A dotted name with no matching base is legitimate
        assert!(duplicate_column_names(&strings(&["rate.1", "idx"])).is_empty());
    }

    #[test]
    fn test_duplicate_values() {
        assert_eq!(
            duplicate_values(&strings(&["1", "2", "2", "3", "1"])),
            vec!["1", "2"]
        );
    }

    #[test]
    fn test_first_repeated() {
        let values = strings(&["a", "b", "b"]);
        assert_eq!(first_repeated(&["a", "b"], &values), Some("b"));
        assert_eq!(first_repeated(&["a", "c"], &values), None);
    }

    #[test]
    fn test_anchored_regex() {
        let re = anchored_regex("[a-z]+_[a-z]+$", false).expect("regex");
        assert!(re.is_match("first_row"));
        assert!(!re.is_match("first.row"));
        assert!(!re.is_match("1first_row"));

        let re = anchored_regex(r"FC [TB] \w+", true).expect("regex");
        assert!(re.is_match("fc t value"));
        assert!(anchored_regex("(", false).is_err());
    }

    #[test]
    fn test_in_range() {
        assert!(in_range(5.0, Some(0.0), Some(50.0)));
        assert!(in_range(50.0, None, Some(50.0)));
        assert!(!in_range(51.0, None, Some(50.0)));
        assert!(!in_range(-1.0, Some(0.0), None));
        assert!(in_range(1e9, None, None));
    }
}
