use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Finding;

const EMPTY_VALUES: [&str; 6] = ["", "0", "0.00", "0,00", "null", "undefined"];

const MISSING_MARKERS: [&str; 6] = ["ontbreekt", "ontbrekend", "leeg", "niet ingevuld", "verplicht", "missing"];

/// Kind of defect: a value that is not there, or a value that is wrong.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Missing,
    ContentError,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Missing => "missing",
            Category::ContentError => "content-error",
        }
    }
}

/// First match wins: an empty-looking value, then a description that talks
/// about something missing, otherwise a content error.
pub fn categorize(finding: &Finding) -> Category {
    let value = finding.waarde.trim().to_lowercase();
    if EMPTY_VALUES.contains(&value.as_str()) {
        return Category::Missing;
    }
    let description = finding.omschrijving.to_lowercase();
    if MISSING_MARKERS.iter().any(|m| description.contains(m)) {
        return Category::Missing;
    }
    Category::ContentError
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    #[default]
    All,
    Missing,
    ContentError,
}

impl CategoryFilter {
    pub fn matches(&self, finding: &Finding) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Missing => categorize(finding) == Category::Missing,
            CategoryFilter::ContentError => categorize(finding) == Category::ContentError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Missing => "missing",
            CategoryFilter::ContentError => "content-error",
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "missing" => Ok(CategoryFilter::Missing),
            "content-error" | "content_error" => Ok(CategoryFilter::ContentError),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(waarde: &str, omschrijving: &str) -> Finding {
        Finding {
            waarde: waarde.into(),
            omschrijving: omschrijving.into(),
            ..Default::default()
        }
    }

    #[test]
    fn zero_amount_is_missing() {
        assert_eq!(categorize(&finding("0.00", "x")), Category::Missing);
        assert_eq!(categorize(&finding(" 0,00 ", "x")), Category::Missing);
        assert_eq!(categorize(&finding("NULL", "x")), Category::Missing);
        assert_eq!(categorize(&finding("", "x")), Category::Missing);
    }

    #[test]
    fn wrong_amount_is_content_error() {
        assert_eq!(categorize(&finding("123", "Bedrag klopt niet")), Category::ContentError);
    }

    #[test]
    fn description_markers_mean_missing() {
        assert_eq!(categorize(&finding("AB", "Verplicht attribuut ontbreekt")), Category::Missing);
        assert_eq!(categorize(&finding("AB", "Veld is LEEG")), Category::Missing);
        assert_eq!(categorize(&finding("AB", "Value missing")), Category::Missing);
    }

    #[test]
    fn value_rule_runs_before_description_rule() {
        // "0" alone decides; the description is never consulted.
        assert_eq!(categorize(&finding("0", "Bedrag klopt niet")), Category::Missing);
    }

    #[test]
    fn filter_selects_by_category() {
        let missing = finding("", "x");
        let wrong = finding("12", "x");
        assert!(CategoryFilter::All.matches(&missing));
        assert!(CategoryFilter::Missing.matches(&missing));
        assert!(!CategoryFilter::Missing.matches(&wrong));
        assert!(CategoryFilter::ContentError.matches(&wrong));
        assert_eq!("content-error".parse::<CategoryFilter>().unwrap(), CategoryFilter::ContentError);
    }
}
