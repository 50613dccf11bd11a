use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{error::ProtocolError, query::SortDirection};

/// One list query as sent to the service:
/// `GET <collection>?page=&perPage=&search=&sort=&criteria=[&<filter>=true]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    pub page: u64,
    pub per_page: u64,
    pub search: String,
    pub sort: String,
    pub criteria: SortDirection,
    pub filter_tag: Option<String>,
}

impl ListRequest {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("perPage".to_string(), self.per_page.to_string()),
            ("search".to_string(), self.search.clone()),
            ("sort".to_string(), self.sort.clone()),
            ("criteria".to_string(), self.criteria.as_wire().to_string()),
        ];
        if let Some(tag) = &self.filter_tag {
            pairs.push((tag.clone(), "true".to_string()));
        }
        pairs
    }
}

/// A page of rows plus the size of the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub total_count: u64,
}

impl<R> Page<R> {
    pub fn new(items: Vec<R>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<R> Default for Page<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// Where a collection lives and which response fields carry its rows and count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub path: String,
    pub items_field: String,
    pub count_field: String,
}

impl CollectionSpec {
    pub fn new(
        path: impl Into<String>,
        items_field: impl Into<String>,
        count_field: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            items_field: items_field.into(),
            count_field: count_field.into(),
        }
    }

    pub fn affiliates() -> Self {
        Self::new("/affiliates/all", "users", "numOfUsers")
    }

    pub fn users() -> Self {
        Self::new("/users/all", "users", "numOfUsers")
    }

    pub fn decode_page<R: DeserializeOwned>(&self, body: Value) -> Result<Page<R>, ProtocolError> {
        let Value::Object(mut body) = body else {
            return Err(ProtocolError::NotAnObject);
        };

        let items = body
            .remove(&self.items_field)
            .ok_or_else(|| ProtocolError::MissingField {
                field: self.items_field.clone(),
            })?;
        let items: Vec<R> =
            serde_json::from_value(items).map_err(|err| ProtocolError::InvalidField {
                field: self.items_field.clone(),
                reason: err.to_string(),
            })?;

        let total_count = body
            .get(&self.count_field)
            .ok_or_else(|| ProtocolError::MissingField {
                field: self.count_field.clone(),
            })?
            .as_u64()
            .ok_or_else(|| ProtocolError::InvalidField {
                field: self.count_field.clone(),
                reason: "expected a non-negative integer".to_string(),
            })?;

        Ok(Page { items, total_count })
    }
}
