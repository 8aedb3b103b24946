use std::path::Path;

use futures::future::try_join_all;

use crate::api::{ApiClient, ApiError, FormPart};
use crate::models::UploadedMedia;

/// Multipart field name the upload endpoint reads.
pub const IMAGE_FIELD: &str = "image";

/// Image uploads to the media CDN.
pub struct MediaService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl MediaService<'_> {
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMedia, ApiError> {
        let Some(mime) = guess_mime(file_name) else {
            return Err(ApiError::InvalidRequest(format!(
                "Unsupported image type: {}",
                file_name
            )));
        };
        if bytes.is_empty() {
            return Err(ApiError::InvalidRequest("Image file is empty".to_string()));
        }

        let part = FormPart::file(IMAGE_FIELD, file_name, mime, bytes);
        self.client.upload("/upload/image", vec![part]).await
    }

    /// Upload a product gallery concurrently. Fails on the first error;
    /// results keep the input order.
    pub async fn upload_images(
        &self,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<UploadedMedia>, ApiError> {
        try_join_all(
            files
                .into_iter()
                .map(|(name, bytes)| async move { self.upload_image(&name, bytes).await }),
        )
        .await
    }
}

/// MIME type for the image extensions the CDN accepts.
pub fn guess_mime(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("photo.JPG"), Some("image/jpeg"));
        assert_eq!(guess_mime("/tmp/banner.webp"), Some("image/webp"));
        assert_eq!(guess_mime("notes.txt"), None);
        assert_eq!(guess_mime("noext"), None);
    }
}
