use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Finding;

/// Rank given to a theme name that is not one of the fixed themes.
pub const UNKNOWN_THEME_RANK: u32 = 99;

/// Thematic error-code family used for macro grouping and theme-wide disposition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Structuur,
    Labels,
    Codes,
    Format,
    Premie,
    Datums,
    Branche,
    Validatie,
    Overig,
}

impl Theme {
    pub const ALL: [Theme; 9] = [
        Theme::Structuur,
        Theme::Labels,
        Theme::Codes,
        Theme::Format,
        Theme::Premie,
        Theme::Datums,
        Theme::Branche,
        Theme::Validatie,
        Theme::Overig,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Theme::Structuur => "structuur",
            Theme::Labels => "labels",
            Theme::Codes => "codes",
            Theme::Format => "format",
            Theme::Premie => "premie",
            Theme::Datums => "datums",
            Theme::Branche => "branche",
            Theme::Validatie => "validatie",
            Theme::Overig => "overig",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::Structuur => "Structuur & hiërarchie",
            Theme::Labels => "Labels & attributen",
            Theme::Codes => "Codes & codelijsten",
            Theme::Format => "Formaat & datakwaliteit",
            Theme::Premie => "Premies & bedragen",
            Theme::Datums => "Datums & prolongatie",
            Theme::Branche => "Branche & dekking",
            Theme::Validatie => "Verbandscontroles & certificering",
            Theme::Overig => "Overig",
        }
    }

    /// Display order, 1 first; `overig` is always last.
    pub fn rank(&self) -> u32 {
        match self {
            Theme::Structuur => 1,
            Theme::Labels => 2,
            Theme::Codes => 3,
            Theme::Format => 4,
            Theme::Premie => 5,
            Theme::Datums => 6,
            Theme::Branche => 7,
            Theme::Validatie => 8,
            Theme::Overig => 9,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| format!("unknown theme: {key}"))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Every documented code of every engine. Anything else is `overig`.
const THEME_TABLE: &[(&str, Theme)] = &[
    // engine 0: XSD
    ("E0-001", Theme::Structuur),
    ("E0-002", Theme::Structuur),
    ("E0-003", Theme::Structuur),
    ("E0-004", Theme::Structuur),
    // engine 1: schema
    ("E1-001", Theme::Labels),
    ("E1-002", Theme::Codes),
    ("E1-003", Theme::Format),
    ("E1-004", Theme::Format),
    ("E1-005", Theme::Labels),
    ("E1-006", Theme::Structuur),
    ("E1-007", Theme::Labels),
    ("E1-008", Theme::Structuur),
    ("E1-009", Theme::Codes),
    ("E1-010", Theme::Format),
    // engine 2: business rules
    ("E2-001", Theme::Structuur),
    ("E2-002", Theme::Premie),
    ("E2-003", Theme::Datums),
    ("E2-004", Theme::Structuur),
    ("E2-005", Theme::Premie),
    ("E2-006", Theme::Datums),
    ("E2-007", Theme::Format),
    ("E2-008", Theme::Format),
    ("E2-009", Theme::Structuur),
    ("E2-010", Theme::Premie),
    ("E2-011", Theme::Format),
    ("E2-012", Theme::Datums),
    ("E2-013", Theme::Branche),
    ("E2-014", Theme::Datums),
    ("E2-015", Theme::Premie),
    ("E2-016", Theme::Branche),
    ("E2-017", Theme::Branche),
    // engine 3: semantic analysis
    ("E3-001", Theme::Branche),
    ("E3-002", Theme::Validatie),
    ("E3-003", Theme::Validatie),
    ("E3-004", Theme::Validatie),
    // xpath relation checks
    ("EX-001", Theme::Validatie),
    ("EX-002", Theme::Validatie),
    // encoding and data quality
    ("EE-001", Theme::Format),
    ("EE-002", Theme::Format),
    ("EE-003", Theme::Format),
    ("EE-004", Theme::Format),
    ("EE-005", Theme::Format),
    ("EE-006", Theme::Format),
    ("EE-007", Theme::Format),
    // final certification
    ("EF-001", Theme::Validatie),
    ("EF-002", Theme::Validatie),
    ("EF-003", Theme::Validatie),
    ("EF-004", Theme::Validatie),
    ("EF-005", Theme::Validatie),
];

pub fn theme_for_code(code: &str) -> Theme {
    let code = code.trim();
    THEME_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, t)| *t)
        .unwrap_or(Theme::Overig)
}

pub fn theme_of(finding: &Finding) -> Theme {
    theme_for_code(&finding.code)
}

/// Sort rank for a theme key; names outside the fixed set rank last.
pub fn sort_rank_of(theme: &str) -> u32 {
    theme
        .parse::<Theme>()
        .map(|t| t.rank())
        .unwrap_or(UNKNOWN_THEME_RANK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_their_theme() {
        assert_eq!(theme_for_code("E0-003"), Theme::Structuur);
        assert_eq!(theme_for_code("E1-002"), Theme::Codes);
        assert_eq!(theme_for_code("E2-002"), Theme::Premie);
        assert_eq!(theme_for_code("E2-006"), Theme::Datums);
        assert_eq!(theme_for_code("E2-013"), Theme::Branche);
        assert_eq!(theme_for_code("EF-001"), Theme::Validatie);
    }

    #[test]
    fn unknown_codes_are_overig() {
        assert_eq!(theme_for_code("E9-999"), Theme::Overig);
        assert_eq!(theme_for_code(""), Theme::Overig);
        assert_eq!(theme_for_code("E3-ERR"), Theme::Overig);
    }

    #[test]
    fn ranks_are_a_total_order() {
        let ranks: Vec<u32> = Theme::ALL.iter().map(Theme::rank).collect();
        assert_eq!(ranks, (1..=9).collect::<Vec<_>>());
        assert_eq!(sort_rank_of("overig"), 9);
        assert_eq!(sort_rank_of("premie"), 5);
        assert_eq!(sort_rank_of("iets-anders"), UNKNOWN_THEME_RANK);
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        let mut codes: Vec<&str> = THEME_TABLE.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        let before = codes.len();
        codes.dedup();
        assert_eq!(before, codes.len());
    }
}
