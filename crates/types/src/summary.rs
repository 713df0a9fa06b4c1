use serde::{Deserialize, Serialize};

/// Encyclopedia page summary, keyed by display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub title: String,
    #[serde(default)]
    pub extract: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_urls: Option<ContentUrls>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<PageLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SummaryRecord {
    /// Canonical page link, if the service reported one.
    pub fn page_link(&self) -> Option<&str> {
        self.content_urls
            .as_ref()
            .and_then(|urls| urls.desktop.as_ref())
            .and_then(|desktop| desktop.page.as_deref())
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_ref().and_then(|thumbnail| thumbnail.source.as_deref())
    }
}
