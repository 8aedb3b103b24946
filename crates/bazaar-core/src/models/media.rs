use serde::{Deserialize, Serialize};

/// `data` of the media upload endpoint: where the CDN is hosting the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    #[serde(alias = "secure_url", alias = "imageUrl")]
    pub url: String,
    #[serde(default, alias = "public_id")]
    pub public_id: Option<String>,
}
