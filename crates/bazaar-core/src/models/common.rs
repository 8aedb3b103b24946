use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page", alias = "currentPage")]
    pub page: u32,
    #[serde(default, alias = "perPage")]
    pub limit: u32,
    #[serde(default, alias = "totalItems", alias = "count")]
    pub total: u64,
    #[serde(default, alias = "totalPages")]
    pub pages: u32,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn display(&self) -> String {
        format!("Page {} of {} ({} total)", self.page, self.pages.max(1), self.total)
    }
}

/// Plain page/limit/status filter used by list endpoints.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }
}

/// Accept a document reference as either `"id"` or `{"_id": "id", ...}`.
pub(crate) fn deserialize_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(Value::Object(map)) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_ref")]
        seller: Option<String>,
    }

    #[test]
    fn test_deserialize_ref_accepts_id_or_object() {
        let h: Holder = serde_json::from_str(r#"{"seller":"s1"}"#).unwrap();
        assert_eq!(h.seller.as_deref(), Some("s1"));

        let h: Holder = serde_json::from_str(r#"{"seller":{"_id":"s2","name":"Acme"}}"#).unwrap();
        assert_eq!(h.seller.as_deref(), Some("s2"));

        let h: Holder = serde_json::from_str(r#"{"seller":null}"#).unwrap();
        assert_eq!(h.seller, None);

        let h: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(h.seller, None);
    }

    #[test]
    fn test_pagination_defaults_and_aliases() {
        let p: Pagination =
            serde_json::from_str(r#"{"currentPage":2,"totalPages":5,"total":48,"limit":10}"#).unwrap();
        assert_eq!(p.page, 2);
        assert!(p.has_next());
        assert!(p.has_prev());
        assert_eq!(p.display(), "Page 2 of 5 (48 total)");

        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.page, 1);
        assert!(!p.has_next());
    }
}
