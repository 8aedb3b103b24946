//! Typed wrappers for each endpoint group.
//!
//! Services borrow the [`ApiClient`] and only shape requests and responses.
//! Credentials, refresh and notices are handled by the client pipeline.

mod admin;
mod auth;
mod cart;
mod catalog;
mod media;
mod orders;
mod seller;
mod subscription;

pub use admin::{AdminOverview, AdminService};
pub use auth::AuthService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use media::{guess_mime, MediaService, IMAGE_FIELD};
pub use orders::OrderService;
pub use seller::SellerService;
pub use subscription::SubscriptionService;

use crate::api::{ApiClient, ApiError};

impl ApiClient {
    pub fn auth(&self) -> AuthService<'_> {
        AuthService { client: self }
    }

    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService { client: self }
    }

    pub fn cart(&self) -> CartService<'_> {
        CartService { client: self }
    }

    pub fn orders(&self) -> OrderService<'_> {
        OrderService { client: self }
    }

    pub fn seller(&self) -> SellerService<'_> {
        SellerService { client: self }
    }

    pub fn admin(&self) -> AdminService<'_> {
        AdminService { client: self }
    }

    pub fn subscription(&self) -> SubscriptionService<'_> {
        SubscriptionService { client: self }
    }

    pub fn media(&self) -> MediaService<'_> {
        MediaService { client: self }
    }
}

/// Validate an id before splicing it into a path.
pub(crate) fn segment(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#', ' ']) {
        return Err(ApiError::InvalidRequest(format!("Invalid resource id: {:?}", id)));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment() {
        assert_eq!(segment(" 64f0c2 ").unwrap(), "64f0c2");
        assert!(segment("").is_err());
        assert!(segment("a/b").is_err());
        assert!(segment("a?x=1").is_err());
    }
}
