//! Minion targeting.
//!
//! The expression is opaque here; it is handed to the API as `tgt` together
//! with its matcher type as `tgt_type`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Salt matcher used to interpret a target expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Glob,
    Pcre,
    List,
    Grain,
    GrainPcre,
    Pillar,
    PillarPcre,
    Nodegroup,
    Range,
    Compound,
    Ipcidr,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Glob => "glob",
            Self::Pcre => "pcre",
            Self::List => "list",
            Self::Grain => "grain",
            Self::GrainPcre => "grain_pcre",
            Self::Pillar => "pillar",
            Self::PillarPcre => "pillar_pcre",
            Self::Nodegroup => "nodegroup",
            Self::Range => "range",
            Self::Compound => "compound",
            Self::Ipcidr => "ipcidr",
        }
    }

    pub const ALL: [TargetType; 11] = [
        Self::Glob,
        Self::Pcre,
        Self::List,
        Self::Grain,
        Self::GrainPcre,
        Self::Pillar,
        Self::PillarPcre,
        Self::Nodegroup,
        Self::Range,
        Self::Compound,
        Self::Ipcidr,
    ];
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown target type: {0}")]
pub struct UnknownTargetType(pub String);

impl FromStr for TargetType {
    type Err = UnknownTargetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownTargetType(s.to_string()))
    }
}

/// Which minions a call applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    expression: String,
    target_type: TargetType,
}

impl Target {
    pub fn new(expression: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            expression: expression.into(),
            target_type,
        }
    }

    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::new(pattern, TargetType::Glob)
    }

    /// Explicit minion IDs, sent comma separated
    pub fn list<I, S>(minions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = minions
            .into_iter()
            .map(|m| m.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(joined, TargetType::List)
    }

    pub fn grain(key: &str, value: &str) -> Self {
        Self::new(format!("{}:{}", key, value), TargetType::Grain)
    }

    pub fn compound(expression: impl Into<String>) -> Self {
        Self::new(expression, TargetType::Compound)
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::glob("*")
    }
}
