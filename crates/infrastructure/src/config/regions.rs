//! CMS endpoints per region.

use domain::Region;
use serde::{Deserialize, Serialize};

/// API and web application base URLs of one region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEndpoints {
    /// Base URL of the management API, including the version segment
    pub api_url: String,
    /// Base URL of the web application
    pub app_url: String,
}

impl RegionEndpoints {
    fn new(api_url: &str, app_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            app_url: app_url.to_string(),
        }
    }
}

/// Endpoint pairs for every supported region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionsConfig {
    #[serde(default = "default_na")]
    pub na: RegionEndpoints,
    #[serde(default = "default_eu")]
    pub eu: RegionEndpoints,
    #[serde(default = "default_azure_na")]
    pub azure_na: RegionEndpoints,
    #[serde(default = "default_azure_eu")]
    pub azure_eu: RegionEndpoints,
}

fn default_na() -> RegionEndpoints {
    RegionEndpoints::new("https://api.contentstack.io/v3", "https://app.contentstack.com")
}

fn default_eu() -> RegionEndpoints {
    RegionEndpoints::new(
        "https://eu-api.contentstack.com/v3",
        "https://eu-app.contentstack.com",
    )
}

fn default_azure_na() -> RegionEndpoints {
    RegionEndpoints::new(
        "https://azure-na-api.contentstack.com/v3",
        "https://azure-na-app.contentstack.com",
    )
}

fn default_azure_eu() -> RegionEndpoints {
    RegionEndpoints::new(
        "https://azure-eu-api.contentstack.com/v3",
        "https://azure-eu-app.contentstack.com",
    )
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            na: default_na(),
            eu: default_eu(),
            azure_na: default_azure_na(),
            azure_eu: default_azure_eu(),
        }
    }
}

impl RegionsConfig {
    /// Endpoints of a region
    #[must_use]
    pub const fn endpoints(&self, region: Region) -> &RegionEndpoints {
        match region {
            Region::Na => &self.na,
            Region::Eu => &self.eu,
            Region::AzureNa => &self.azure_na,
            Region::AzureEu => &self.azure_eu,
        }
    }

    /// Point every region at the same endpoints
    #[must_use]
    pub fn uniform(api_url: &str, app_url: &str) -> Self {
        let endpoints = RegionEndpoints::new(api_url, app_url);
        Self {
            na: endpoints.clone(),
            eu: endpoints.clone(),
            azure_na: endpoints.clone(),
            azure_eu: endpoints,
        }
    }
}
