use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Normalized tag assignment: category id -> deduplicated tag ids.
/// A category with nothing assigned is absent from the map, never an empty
/// list.
pub type TagMap = BTreeMap<String, Vec<String>>;

/// Gallery image record. The binary lives on the image host; this side only
/// stores the reference and the tag assignment.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: TagMap,
    pub uploaded_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImagePayload {
    pub url: String,
    pub alt_text: Option<String>,
}

/// Per-category tag value as the UI sends it. Older screens send a single
/// tag id, newer ones a list; both normalize to the same stored shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagSelection {
    One(String),
    Many(Vec<String>),
}

impl TagSelection {
    fn into_ids(self) -> Vec<String> {
        match self {
            TagSelection::One(id) => vec![id],
            TagSelection::Many(ids) => ids,
        }
    }
}

/// Collapse the wire shape into a [`TagMap`]: dedupe preserving first-seen
/// order, drop categories whose value resolves to an empty set.
pub fn normalize_tag_map(raw: HashMap<String, TagSelection>) -> TagMap {
    let mut normalized = TagMap::new();
    for (category_id, selection) in raw {
        let mut seen = Vec::new();
        for id in selection.into_ids() {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        if !seen.is_empty() {
            normalized.insert(category_id, seen);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_id_and_list_normalize_identically() {
        let mut single = HashMap::new();
        single.insert("catA".to_string(), TagSelection::One("tag1".to_string()));
        let mut list = HashMap::new();
        list.insert(
            "catA".to_string(),
            TagSelection::Many(vec!["tag1".to_string()]),
        );

        assert_eq!(normalize_tag_map(single), normalize_tag_map(list));
    }

    #[test]
    fn duplicates_collapse_and_empty_categories_disappear() {
        let mut raw = HashMap::new();
        raw.insert(
            "catA".to_string(),
            TagSelection::Many(vec![
                "tag1".to_string(),
                "tag2".to_string(),
                "tag1".to_string(),
            ]),
        );
        raw.insert("catB".to_string(), TagSelection::Many(vec![]));

        let normalized = normalize_tag_map(raw);
        assert_eq!(normalized.get("catA").unwrap(), &["tag1", "tag2"]);
        assert!(!normalized.contains_key("catB"));
    }

    #[test]
    fn wire_shapes_deserialize_from_json() {
        let raw: HashMap<String, TagSelection> =
            serde_json::from_str(r#"{"catA": "tag1", "catB": ["tag2", "tag3"]}"#).unwrap();
        let normalized = normalize_tag_map(raw);
        assert_eq!(normalized.get("catA").unwrap(), &["tag1"]);
        assert_eq!(normalized.get("catB").unwrap(), &["tag2", "tag3"]);
    }
}
