use super::segment;
use crate::api::{ApiClient, ApiError};
use crate::models::{Category, CategoryList, Product, ProductList, ProductQuery, ProductResponse};

/// Public catalog: categories and product browsing.
pub struct CatalogService<'a> {
    pub(crate) client: &'a ApiClient,
}

impl CatalogService<'_> {
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let list: CategoryList = self.client.get("/categories").await?;
        Ok(list.categories)
    }

    /// Root categories with their children nested.
    pub async fn category_tree(&self) -> Result<Vec<Category>, ApiError> {
        let list: CategoryList = self.client.get("/categories/tree").await?;
        Ok(list.categories)
    }

    pub async fn products(&self, query: &ProductQuery) -> Result<ProductList, ApiError> {
        self.client.get_query("/products", query).await
    }

    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let path = format!("/products/{}", segment(id)?);
        let response: ProductResponse = self.client.get(&path).await?;
        Ok(response.product)
    }
}
