//! Promotional banners shown in the marketplace apps.

use serde::{Deserialize, Serialize};

use taskmaster_core::BannerKey;

use super::lenient;
use crate::blob::storage_path_from_download_url;
use crate::db::Entity;

/// A promotional banner (`banners/{id}`).
///
/// The image lives in the blob store. Banners created by this service
/// record the blob path in `image_path`; older banners only carry the
/// download URL, from which the path is recovered on delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Banner {
    /// Copy of the record key.
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub image_url: String,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub active: bool,
    /// Creation time in epoch milliseconds.
    #[serde(deserialize_with = "lenient::epoch_millis", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: None,
            link: None,
            image_url: String::new(),
            image_path: None,
            active: true,
            created_at: None,
        }
    }
}

impl Banner {
    /// Blob path of the banner image.
    ///
    /// Uses the recorded `image_path`, falling back to parsing the
    /// download URL for banners created before the path was recorded.
    #[must_use]
    pub fn blob_path(&self) -> Option<String> {
        self.image_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .or_else(|| storage_path_from_download_url(&self.image_url))
    }
}

impl Entity for Banner {
    type Key = BannerKey;
    const COLLECTION: &'static str = "banners";

    fn search_fields<'a>(&'a self, _key: &'a BannerKey) -> Vec<&'a str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.link.as_deref());
        fields
    }
}
