use serde::{Deserialize, Serialize};

/// Marker carried by the three tags auto-created for a transformation
/// category. Nothing else may mint tags with this type.
pub const TRANSFORMATION_STATUS_TAG_TYPE: &str = "transformation-status";

/// Auto-created tag names for a transformation category, in sort order.
pub const TRANSFORMATION_TAG_NAMES: [&str; 3] = ["Before", "In Progress", "After"];

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Normal,
    Transformation,
}

/// A named grouping that owns a set of tags.
///
/// The stored field shapes (camelCase) are a schema contract shared with the
/// admin UI; renaming a field strands existing records.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_type: CategoryType,
    /// Advisory only: the UI nags when an image misses a tag from a
    /// required category, nothing is enforced here.
    #[serde(default)]
    pub required: bool,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: String,
}

impl Tag {
    pub fn is_transformation_status(&self) -> bool {
        self.tag_type.as_deref() == Some(TRANSFORMATION_STATUS_TAG_TYPE)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub category_type: CategoryType,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
}

/// No `tagType` on purpose: transformation-status tags only come from the
/// category auto-creation path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagPayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}
