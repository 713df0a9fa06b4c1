//! Country registry records.
//!
//! The registry answers with camelCase JSON. Every field other than the
//! identity codes, the name and the region may be absent, either because the
//! upstream record lacks it or because the request was field-reduced.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field selection used for the list request.
pub const LIST_FIELDS: &[&str] = &["name", "region", "capital", "flags", "cca2", "cca3", "capitalInfo", "latlng"];

/// Field selection used for the detail (name search) request.
pub const DETAIL_FIELDS: &[&str] = &[
    "name",
    "region",
    "subregion",
    "capital",
    "flags",
    "cca2",
    "cca3",
    "capitalInfo",
    "latlng",
    "population",
    "languages",
    "currencies",
];

/// A single country as returned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntity {
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub cca3: String,
    pub name: CountryName,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_info: Option<CapitalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currencies: Option<IndexMap<String, Currency>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Interpret a registry `[lat, lng]` array. Short or non-finite arrays yield `None`.
    pub fn from_pair(values: &[f64]) -> Option<Self> {
        match values {
            [latitude, longitude, ..] if latitude.is_finite() && longitude.is_finite() => Some(Self::new(*latitude, *longitude)),
            _ => None,
        }
    }
}

impl CountryEntity {
    /// Coordinates used for the weather lookup: the capital's when known,
    /// otherwise the country's own.
    pub fn weather_coordinates(&self) -> Option<Coordinates> {
        self.capital_info
            .as_ref()
            .and_then(|info| info.latlng.as_deref())
            .and_then(Coordinates::from_pair)
            .or_else(|| self.latlng.as_deref().and_then(Coordinates::from_pair))
    }

    pub fn primary_capital(&self) -> Option<&str> {
        self.capital
            .as_ref()
            .and_then(|capitals| capitals.first())
            .map(String::as_str)
            .filter(|capital| !capital.trim().is_empty())
    }

    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    /// Preferred flag image reference (vector first).
    pub fn flag_image(&self) -> Option<&str> {
        self.flags.svg.as_deref().or(self.flags.png.as_deref())
    }

    /// Language names in registry order.
    pub fn language_names(&self) -> Vec<&str> {
        self.languages
            .as_ref()
            .map(|languages| languages.values().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Currencies rendered as `Name (symbol)`.
    pub fn currency_labels(&self) -> Vec<String> {
        self.currencies
            .as_ref()
            .map(|currencies| {
                currencies
                    .values()
                    .map(|currency| match &currency.symbol {
                        Some(symbol) => format!("{} ({})", currency.name, symbol),
                        None => currency.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
