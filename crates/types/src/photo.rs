use serde::{Deserialize, Serialize};

/// Maximum number of photos attached to a detail view.
pub const MAX_PHOTOS: usize = 4;

/// A single photo search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    #[serde(default)]
    pub alt_description: Option<String>,
    pub urls: PhotoUrls,
    pub links: PhotoLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PhotoAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub small: String,
    pub regular: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoLinks {
    pub html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PhotoRecord {
    pub fn author(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.name.as_deref())
    }
}

/// Envelope returned by the photo search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoSearchPage {
    #[serde(default)]
    pub results: Vec<PhotoRecord>,
}
