use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Business-impact tier of a finding.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Criticality {
    Kritiek,
    #[default]
    Aandacht,
    Info,
}

impl Criticality {
    pub const ALL: [Criticality; 3] = [Criticality::Kritiek, Criticality::Aandacht, Criticality::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::Kritiek => "KRITIEK",
            Criticality::Aandacht => "AANDACHT",
            Criticality::Info => "INFO",
        }
    }
}

impl FromStr for Criticality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KRITIEK" => Ok(Criticality::Kritiek),
            "AANDACHT" => Ok(Criticality::Aandacht),
            "INFO" => Ok(Criticality::Info),
            other => Err(format!("unknown criticality: {other}")),
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Absent, null and unknown values all fall back to AANDACHT.
impl<'de> Deserialize<'de> for Criticality {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(raw
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Review disposition of a single finding.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Open,
    Geaccepteerd,
    Genegeerd,
    Opgelost,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Open, Status::Geaccepteerd, Status::Genegeerd, Status::Opgelost];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Geaccepteerd => "GEACCEPTEERD",
            Status::Genegeerd => "GENEGEERD",
            Status::Opgelost => "OPGELOST",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Geaccepteerd => "Geaccepteerd",
            Status::Genegeerd => "Genegeerd",
            Status::Opgelost => "Opgelost",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Status::Open)
    }

    /// Only accepting or ignoring a finding offers to do the same for similar ones.
    pub fn offers_bulk(&self) -> bool {
        matches!(self, Status::Geaccepteerd | Status::Genegeerd)
    }

    pub(crate) fn ordinal(&self) -> usize {
        match self {
            Status::Open => 0,
            Status::Geaccepteerd => 1,
            Status::Genegeerd => 2,
            Status::Opgelost => 3,
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Status::Open),
            "GEACCEPTEERD" => Ok(Status::Geaccepteerd),
            "GENEGEERD" => Ok(Status::Genegeerd),
            "OPGELOST" => Ok(Status::Opgelost),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Id of the engine that produced a finding, kept in the JSON form it arrived in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineRef {
    Number(i64),
    Name(String),
}

impl Default for EngineRef {
    fn default() -> Self {
        EngineRef::Name(String::new())
    }
}

impl fmt::Display for EngineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineRef::Number(n) => write!(f, "{n}"),
            EngineRef::Name(s) => f.write_str(s),
        }
    }
}
