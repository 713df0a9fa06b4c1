//! Shareable list-view parameters.
//!
//! These are the only values that survive navigation: they travel in the
//! query string as `query`, `region`, `page` and `pageSize`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Region filter. `All` disables filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[default]
    All,
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
    Antarctic,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Self::All,
        Self::Africa,
        Self::Americas,
        Self::Asia,
        Self::Europe,
        Self::Oceania,
        Self::Antarctic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Africa => "Africa",
            Self::Americas => "Americas",
            Self::Asia => "Asia",
            Self::Europe => "Europe",
            Self::Oceania => "Oceania",
            Self::Antarctic => "Antarctic",
        }
    }

    /// Whether an entity's region passes this filter.
    pub fn admits(&self, region: &str) -> bool {
        match self {
            Self::All => true,
            other => other.as_str() == region,
        }
    }

    /// Lenient parse used for incoming shareable state: unknown values become `All`.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseRegionError(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown region '{0}'; expected one of All, Africa, Americas, Asia, Europe, Oceania, Antarctic")]
pub struct ParseRegionError(String);

/// List-view state: free-text query, region filter, 1-based page and page size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParameters {
    pub query: String,
    pub region: Region,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListParameters {
    fn default() -> Self {
        Self {
            query: String::new(),
            region: Region::All,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListParameters {
    /// Build parameters from a shareable query string (with or without a leading `?`).
    ///
    /// Missing keys take their defaults; non-numeric or non-positive numbers
    /// fall back to the defaults as well. The first occurrence of a key wins.
    pub fn from_query_string(raw: &str) -> Self {
        let mut parameters = Self::default();
        let mut seen = [false; 4];
        let trimmed = raw.trim().trim_start_matches('?');

        for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
            match key.as_ref() {
                "query" if !seen[0] => {
                    seen[0] = true;
                    parameters.query = value.into_owned();
                }
                "region" if !seen[1] => {
                    seen[1] = true;
                    parameters.region = Region::parse_lenient(&value);
                }
                "page" if !seen[2] => {
                    seen[2] = true;
                    parameters.page = parse_positive(&value).unwrap_or(DEFAULT_PAGE);
                }
                "pageSize" if !seen[3] => {
                    seen[3] = true;
                    parameters.page_size = parse_positive(&value).unwrap_or(DEFAULT_PAGE_SIZE);
                }
                _ => {}
            }
        }
        parameters
    }

    /// Canonical shareable form. Default values are omitted.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !self.query.is_empty() {
            serializer.append_pair("query", &self.query);
        }
        if self.region != Region::All {
            serializer.append_pair("region", self.region.as_str());
        }
        if self.page != DEFAULT_PAGE {
            serializer.append_pair("page", &self.page.to_string());
        }
        if self.page_size != DEFAULT_PAGE_SIZE {
            serializer.append_pair("pageSize", &self.page_size.to_string());
        }
        serializer.finish()
    }
}

fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|number| *number > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_string_yields_defaults() {
        assert_eq!(ListParameters::from_query_string(""), ListParameters::default());
        assert_eq!(ListParameters::from_query_string("?"), ListParameters::default());
    }

    #[test]
    fn parses_all_shareable_keys() {
        let parameters = ListParameters::from_query_string("?query=fra&region=Europe&page=5&pageSize=20");
        assert_eq!(parameters.query, "fra");
        assert_eq!(parameters.region, Region::Europe);
        assert_eq!(parameters.page, 5);
        assert_eq!(parameters.page_size, 20);
    }

    #[test]
    fn invalid_numbers_and_regions_fall_back_to_defaults() {
        let parameters = ListParameters::from_query_string("region=Atlantis&page=0&pageSize=abc");
        assert_eq!(parameters.region, Region::All);
        assert_eq!(parameters.page, DEFAULT_PAGE);
        assert_eq!(parameters.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn first_occurrence_wins_and_text_is_decoded() {
        let parameters = ListParameters::from_query_string("query=c%C3%B4te+d%27ivoire&query=other");
        assert_eq!(parameters.query, "côte d'ivoire");
    }

    #[test]
    fn canonical_form_omits_defaults() {
        assert_eq!(ListParameters::default().to_query_string(), "");
        let parameters = ListParameters {
            query: "new z".into(),
            region: Region::Oceania,
            page: 2,
            page_size: DEFAULT_PAGE_SIZE,
        };
        let encoded = parameters.to_query_string();
        assert_eq!(encoded, "query=new+z&region=Oceania&page=2");
        assert_eq!(ListParameters::from_query_string(&encoded), parameters);
    }

    #[test]
    fn region_parsing_is_case_insensitive() {
        assert_eq!("europe".parse::<Region>(), Ok(Region::Europe));
        assert!("Mars".parse::<Region>().is_err());
        assert!(Region::All.admits("Asia"));
        assert!(!Region::Asia.admits("Europe"));
    }
}
