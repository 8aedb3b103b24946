use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{deserialize_ref, Pagination};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_ref")]
    pub parent: Option<String>,
    #[serde(default, alias = "subcategories")]
    pub children: Vec<Category>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Depth-first search by id or slug.
    pub fn find<'a>(categories: &'a [Category], key: &str) -> Option<&'a Category> {
        for category in categories {
            if category.id == key || category.slug.as_deref() == Some(key) {
                return Some(category);
            }
            if let Some(found) = Self::find(&category.children, key) {
                return Some(found);
            }
        }
        None
    }
}

/// A category with its depth in the tree, for indented rendering.
#[derive(Debug, Clone, Copy)]
pub struct CategoryNode<'a> {
    pub depth: usize,
    pub category: &'a Category,
}

/// Flatten a category tree depth-first, parents before children.
pub fn flatten_tree(categories: &[Category]) -> Vec<CategoryNode<'_>> {
    fn walk<'a>(categories: &'a [Category], depth: usize, out: &mut Vec<CategoryNode<'a>>) {
        for category in categories {
            out.push(CategoryNode { depth, category });
            walk(&category.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(categories, 0, &mut out);
    out
}

/// `data` of `GET /categories` and `GET /categories/tree`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryList {
    #[serde(alias = "tree")]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    #[serde(alias = "active")]
    Approved,
    Rejected,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Pending => write!(f, "Pending review"),
            ProductStatus::Approved => write!(f, "Approved"),
            ProductStatus::Rejected => write!(f, "Rejected"),
            ProductStatus::Inactive => write!(f, "Inactive"),
            ProductStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, alias = "mrp", alias = "compareAtPrice")]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_ref")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_ref")]
    pub seller: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whole-percent discount against the original price, if there is one.
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original <= 0.0 || self.price >= original || self.price < 0.0 {
            return None;
        }
        Some((((original - self.price) / original) * 100.0).round() as u32)
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A product field that may be an id or a populated product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(Box<Product>),
    Id(String),
}

impl ProductRef {
    pub fn id(&self) -> &str {
        match self {
            ProductRef::Populated(product) => &product.id,
            ProductRef::Id(id) => id,
        }
    }

    pub fn product(&self) -> Option<&Product> {
        match self {
            ProductRef::Populated(product) => Some(product),
            ProductRef::Id(_) => None,
        }
    }
}

/// Filters for `GET /products`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ProductQuery {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }
}

/// `data` of product list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `data` of single product endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// Seller product form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub category: String,
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, original: Option<f64>) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Kettle".to_string(),
            description: String::new(),
            price,
            original_price: original,
            images: vec![],
            category: None,
            seller: None,
            stock: 0,
            rating: None,
            num_reviews: 0,
            status: None,
            created_at: None,
        }
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(product(750.0, Some(1000.0)).discount_percent(), Some(25));
        assert_eq!(product(666.0, Some(999.0)).discount_percent(), Some(33));
        assert_eq!(product(1000.0, Some(1000.0)).discount_percent(), None);
        assert_eq!(product(1200.0, Some(1000.0)).discount_percent(), None);
        assert_eq!(product(100.0, None).discount_percent(), None);
        assert_eq!(product(100.0, Some(0.0)).discount_percent(), None);
    }

    #[test]
    fn test_parse_product_with_populated_refs() {
        let json = r#"{"_id":"p9","name":"Lamp","price":499,"mrp":799,"images":["a.jpg"],"category":{"_id":"c1","name":"Home"},"seller":"s1","stock":3,"status":"active"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category.as_deref(), Some("c1"));
        assert_eq!(product.seller.as_deref(), Some("s1"));
        assert_eq!(product.original_price, Some(799.0));
        assert_eq!(product.status, Some(ProductStatus::Approved));
        assert_eq!(product.primary_image(), Some("a.jpg"));
        assert!(product.in_stock());
    }

    #[test]
    fn test_product_ref_variants() {
        let r: ProductRef = serde_json::from_str(r#""p1""#).unwrap();
        assert_eq!(r.id(), "p1");
        assert!(r.product().is_none());

        let r: ProductRef = serde_json::from_str(r#"{"_id":"p2","name":"Mug","price":5}"#).unwrap();
        assert_eq!(r.id(), "p2");
        assert_eq!(r.product().unwrap().name, "Mug");
    }

    #[test]
    fn test_flatten_tree_and_find() {
        let json = r#"[
            {"_id":"c1","name":"Electronics","slug":"electronics","children":[
                {"_id":"c2","name":"Phones","parent":"c1","children":[
                    {"_id":"c3","name":"Cases","slug":"cases","parent":{"_id":"c2"}}
                ]}
            ]},
            {"_id":"c4","name":"Books"}
        ]"#;
        let tree: Vec<Category> = serde_json::from_str(json).unwrap();

        let flat = flatten_tree(&tree);
        let names: Vec<(usize, &str)> = flat
            .iter()
            .map(|n| (n.depth, n.category.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![(0, "Electronics"), (1, "Phones"), (2, "Cases"), (0, "Books")]
        );

        let cases = Category::find(&tree, "cases").unwrap();
        assert_eq!(cases.parent.as_deref(), Some("c2"));
        assert!(Category::find(&tree, "c4").unwrap().is_root());
        assert!(Category::find(&tree, "toys").is_none());
    }
}
