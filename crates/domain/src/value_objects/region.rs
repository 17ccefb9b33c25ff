//! Deployment region of the target CMS

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// CMS region a user account lives in
///
/// Each region has its own API and application base URL pair, resolved
/// from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    /// North America (AWS)
    Na,
    /// Europe (AWS)
    Eu,
    /// North America (Azure)
    AzureNa,
    /// Europe (Azure)
    AzureEu,
}

impl Region {
    /// All supported regions in a stable order
    pub const ALL: [Self; 4] = [Self::Na, Self::Eu, Self::AzureNa, Self::AzureEu];

    /// Canonical wire name (`NA`, `EU`, `AZURE_NA`, `AZURE_EU`)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Na => "NA",
            Self::Eu => "EU",
            Self::AzureNa => "AZURE_NA",
            Self::AzureEu => "AZURE_EU",
        }
    }

    /// Wire names of all regions, for validation rule tables
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidRegion(s.to_string()))
    }
}
