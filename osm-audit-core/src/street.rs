//! Street-name auditing and repair.
//!
//! Repairs are driven by a curated [`StreetCorrections`] table built offline
//! from a street-type audit: names whose final token is not an accepted
//! suffix ([`ExpectedStreetTypes`]) are reviewed by hand and either mapped as
//! an abbreviation or as a literal whole-name rewrite.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::Read,
};

use serde::{Deserialize, Serialize};

/// Two-tier street-name correction table.
///
/// - `abbreviated` maps substrings to their canonical form (`"Rd."` to
///   `"Road"`). Entries apply in ascending key order, so keys must not
///   overlap.
/// - `incorrect` maps whole raw names to a replacement
///   (`"Foster"` to `"Foster Crescent"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreetCorrections {
    #[serde(default)]
    abbreviated: BTreeMap<String, String>,
    #[serde(default)]
    incorrect: BTreeMap<String, String>,
}

impl StreetCorrections {
    /// Construct a table from its two tiers.
    #[must_use]
    pub const fn new(
        abbreviated: BTreeMap<String, String>,
        incorrect: BTreeMap<String, String>,
    ) -> Self {
        Self {
            abbreviated,
            incorrect,
        }
    }

    /// Table curated from the Mississauga, Ontario extract audit.
    #[must_use]
    pub fn curated() -> Self {
        let abbreviated = [("Rd.", "Road"), ("St.", "Street")];
        let incorrect = [
            ("Foster", "Foster Crescent"),
            ("Winston Churchill", "Winston Churchill Boulevard"),
            ("The Keanegate", "The Keanegate Street"),
            ("Meyerside Drive, Unit 9", "Meyerside Drive"),
            ("restaurant", "Mississauga Road"),
        ];
        Self::new(owned_pairs(abbreviated), owned_pairs(incorrect))
    }

    /// Load a table from JSON shaped like
    /// `{"abbreviated": {...}, "incorrect": {...}}`.
    ///
    /// # Errors
    /// Returns the `serde_json` error when the input is not a valid table.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Repair a street name.
    ///
    /// A raw name found in the whole-name tier is replaced outright. Any other
    /// name has every abbreviation it contains expanded. Lookups that find
    /// nothing leave the name unchanged.
    ///
    /// # Examples
    /// ```
    /// use osm_audit_core::StreetCorrections;
    ///
    /// let table = StreetCorrections::curated();
    /// assert_eq!(table.repair("Advance Rd."), "Advance Road");
    /// assert_eq!(table.repair("Foster"), "Foster Crescent");
    /// assert_eq!(table.repair("Main Street"), "Main Street");
    /// ```
    #[must_use]
    pub fn repair(&self, name: &str) -> String {
        if let Some(replacement) = self.incorrect.get(name) {
            return replacement.clone();
        }
        let mut repaired = name.to_owned();
        for (abbreviation, canonical) in &self.abbreviated {
            if !abbreviation.is_empty() && repaired.contains(abbreviation.as_str()) {
                repaired = repaired.replace(abbreviation.as_str(), canonical);
            }
        }
        repaired
    }

    /// Whether neither tier has any entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abbreviated.is_empty() && self.incorrect.is_empty()
    }
}

fn owned_pairs<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(from, to)| (from.to_owned(), to.to_owned()))
        .collect()
}

/// Street-type suffixes accepted without review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedStreetTypes {
    types: BTreeSet<String>,
}

impl ExpectedStreetTypes {
    /// Accept exactly the supplied suffixes.
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `street_type` is accepted.
    #[must_use]
    pub fn contains(&self, street_type: &str) -> bool {
        self.types.contains(street_type)
    }
}

impl Default for ExpectedStreetTypes {
    fn default() -> Self {
        Self::new([
            "Street",
            "Avenue",
            "Boulevard",
            "Drive",
            "Court",
            "Place",
            "Square",
            "Lane",
            "Road",
            "Trail",
            "Parkway",
            "Commons",
            "Glen",
            "Walk",
            "Ridge",
            "Hills",
            "Bend",
            "Gallops",
            "Heights",
            "End",
            "Hill",
            "Way",
            "Gate",
            "Circle",
            "Oaks",
            "Baseline",
            "Valley",
            "Mews",
            "Centre",
            "Downs",
            "Rise",
            "Park",
            "Loft",
            "Manor",
            "Cove",
            "Queensway",
            "Promenade",
            "Collegeway",
            "Dell",
            "Kingsway",
            "Path",
            "Line",
            "Terrace",
            "Greenway",
            "Orchard",
            "Grove",
            "Glade",
            "Heath",
            "Abbey",
            "Wold",
            "Crossing",
            "Lanes",
            "Thicket",
            "Gardens",
            "Outlook",
            "Run",
            "Pines",
            "Point",
            "Millway",
            "Hollow",
            "Woods",
            "Crescent",
            "Woodlands",
            "Close",
            "Chase",
            "Row",
            "North",
            "South",
            "East",
            "West",
            "Glenn",
            "Wynd",
            "Mall",
            "Homestead",
        ])
    }
}

/// Street type of a name: the final whitespace-delimited token, starting
/// at its first word character.
///
/// Leading punctuation is not part of the type, trailing punctuation is.
/// Names that end in whitespace, or whose final token has no word
/// characters, have no street type.
///
/// # Examples
/// ```
/// use osm_audit_core::street_type;
///
/// assert_eq!(street_type("Advance Rd."), Some("Rd."));
/// assert_eq!(street_type("Foster"), Some("Foster"));
/// assert_eq!(street_type("Foo -Bar"), Some("Bar"));
/// assert_eq!(street_type("Main Street "), None);
/// ```
#[must_use]
pub fn street_type(name: &str) -> Option<&str> {
    if name.ends_with(char::is_whitespace) {
        return None;
    }
    let token = name
        .split_whitespace()
        .next_back()?
        .trim_start_matches(|ch: char| !is_word_char(ch));
    (!token.is_empty()).then_some(token)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
