use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Identifies one of the upstream data providers.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    CountryRegistry, // https://restcountries.com/v3.1
    Weather,         // https://api.open-meteo.com/v1
    Encyclopedia,    // https://en.wikipedia.org/api/rest_v1
    PhotoSearch,     // https://api.unsplash.com
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [Self::CountryRegistry, Self::Weather, Self::Encyclopedia, Self::PhotoSearch];
}

/// Static connection facts for a provider.
pub trait ToProviderInfo {
    /// Environment variable that overrides the base URL.
    fn env_var(&self) -> &'static str;
    fn default_base_url(&self) -> &'static str;
    /// Human readable name used in logs and error messages.
    fn display_name(&self) -> &'static str;
}

impl ToProviderInfo for ProviderId {
    fn env_var(&self) -> &'static str {
        match self {
            Self::CountryRegistry => "ATLAS_COUNTRIES_BASE",
            Self::Weather => "ATLAS_WEATHER_BASE",
            Self::Encyclopedia => "ATLAS_WIKI_BASE",
            Self::PhotoSearch => "ATLAS_PHOTOS_BASE",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::CountryRegistry => "https://restcountries.com/v3.1",
            Self::Weather => "https://api.open-meteo.com/v1",
            Self::Encyclopedia => "https://en.wikipedia.org/api/rest_v1",
            Self::PhotoSearch => "https://api.unsplash.com",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::CountryRegistry => "REST Countries",
            Self::Weather => "Open-Meteo",
            Self::Encyclopedia => "Wikipedia",
            Self::PhotoSearch => "Unsplash",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderId {
    type Err = ParseProviderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "country-registry" => Ok(Self::CountryRegistry),
            "weather" => Ok(Self::Weather),
            "encyclopedia" => Ok(Self::Encyclopedia),
            "photo-search" => Ok(Self::PhotoSearch),
            _ => Err(ParseProviderIdError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseProviderIdError;

impl fmt::Display for ParseProviderIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid provider id; expected 'country-registry', 'weather', 'encyclopedia' or 'photo-search'")
    }
}

impl Error for ParseProviderIdError {}
