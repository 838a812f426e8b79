//! Tag key classification.
//!
//! Keys are sorted into four mutually exclusive buckets. The rules are kept as
//! an ordered list and the first matching rule wins, so a key that would pass
//! several raw tests always lands in the same bucket.

use std::fmt;

use serde::Serialize;

/// Characters that disqualify a key from being stored as a document field.
pub const PROBLEM_CHARS: [char; 20] = [
    '=', '+', '/', '&', '<', '>', ';', '\'', '"', '?', '%', '#', '$', '@', ',', '.', ' ', '\t',
    '\r', '\n',
];

/// Bucket a tag key falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyClass {
    /// Lowercase letters and underscores only, e.g. `amenity`.
    Lower,
    /// Two lowercase segments joined by a single colon, e.g. `addr:street`.
    LowerColon,
    /// Contains at least one of [`PROBLEM_CHARS`].
    #[serde(rename = "problemchars")]
    ProblemChars,
    /// Anything else, e.g. `FIXME` or `addr:street:name`.
    Other,
}

impl KeyClass {
    /// Every class, in precedence order.
    pub const ALL: [Self; 4] = [Self::Lower, Self::LowerColon, Self::ProblemChars, Self::Other];

    /// Stable label used in audit reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::LowerColon => "lower_colon",
            Self::ProblemChars => "problemchars",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

type Rule = (fn(&str) -> bool, KeyClass);

const RULES: [Rule; 3] = [
    (is_lower, KeyClass::Lower),
    (is_lower_colon, KeyClass::LowerColon),
    (has_problem_chars, KeyClass::ProblemChars),
];

/// Classify a tag key.
///
/// # Examples
/// ```
/// use osm_audit_core::{KeyClass, classify_key};
///
/// assert_eq!(classify_key("amenity"), KeyClass::Lower);
/// assert_eq!(classify_key("addr:street"), KeyClass::LowerColon);
/// assert_eq!(classify_key("bad=key"), KeyClass::ProblemChars);
/// assert_eq!(classify_key("FIXME"), KeyClass::Other);
/// ```
#[must_use]
pub fn classify_key(key: &str) -> KeyClass {
    RULES
        .iter()
        .find(|(matches, _)| matches(key))
        .map_or(KeyClass::Other, |(_, class)| *class)
}

/// Returns true when the key contains any of [`PROBLEM_CHARS`].
#[must_use]
pub fn has_problem_chars(key: &str) -> bool {
    key.chars().any(|ch| PROBLEM_CHARS.contains(&ch))
}

fn is_lower(key: &str) -> bool {
    key.chars().all(|ch| ch.is_ascii_lowercase() || ch == '_')
}

fn is_lower_colon(key: &str) -> bool {
    key.split_once(':')
        .is_some_and(|(namespace, name)| is_lower(namespace) && is_lower(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("amenity", KeyClass::Lower)]
    #[case("opening_hours", KeyClass::Lower)]
    #[case("", KeyClass::Lower)]
    #[case("addr:street", KeyClass::LowerColon)]
    #[case("name:en", KeyClass::LowerColon)]
    #[case(":", KeyClass::LowerColon)]
    #[case("bad=key", KeyClass::ProblemChars)]
    #[case("two words", KeyClass::ProblemChars)]
    #[case("addr.street", KeyClass::ProblemChars)]
    #[case("tab\tkey", KeyClass::ProblemChars)]
    #[case("FIXME", KeyClass::Other)]
    #[case("addr:street:name", KeyClass::Other)]
    #[case("name_1:fr2", KeyClass::Other)]
    fn classifies_keys(#[case] key: &str, #[case] expected: KeyClass) {
        assert_eq!(classify_key(key), expected, "key {key:?}");
    }

    #[rstest]
    fn labels_match_report_names() {
        let labels: Vec<_> = KeyClass::ALL.iter().map(|class| class.label()).collect();
        assert_eq!(labels, ["lower", "lower_colon", "problemchars", "other"]);
    }

    proptest! {
        /// The first matching rule decides, so the buckets never overlap.
        #[test]
        fn classes_partition_keys(key in "[a-z_:A-Z0-9=. @]{0,12}") {
            let class = classify_key(&key);
            let lower = is_lower(&key);
            let lower_colon = is_lower_colon(&key);
            let problem = has_problem_chars(&key);
            let expected = if lower {
                KeyClass::Lower
            } else if lower_colon {
                KeyClass::LowerColon
            } else if problem {
                KeyClass::ProblemChars
            } else {
                KeyClass::Other
            };
            prop_assert_eq!(class, expected);
            if matches!(class, KeyClass::Lower | KeyClass::LowerColon) {
                prop_assert!(!problem);
            }
        }
    }
}
