use serde_json::Value;

use super::model::{
    Category, CategoryType, CreateCategoryPayload, CreateTagPayload, Tag, UpdateCategoryPayload,
    UpdateTagPayload, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, TRANSFORMATION_STATUS_TAG_TYPE,
    TRANSFORMATION_TAG_NAMES,
};
use crate::error::CoreError;
use crate::store::{collections, decode, encode, Record, RecordStore};

/// Load every category record, active or not. Sort order assignment and
/// duplicate checks both need the full history.
async fn load_all_categories(store: &impl RecordStore) -> Result<Vec<Category>, CoreError> {
    let records = store.scan(collections::CATEGORIES, &[]).await?;
    records
        .into_iter()
        .map(|r| decode::<Category>(r).map_err(CoreError::from))
        .collect()
}

fn validate_category_fields(
    name: Option<&str>,
    color: Option<&str>,
    description: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(name) = name {
        if name.trim().is_empty() {
            errors.push("category name is required".to_string());
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.push(format!("category name must be {} characters or fewer", MAX_NAME_LEN));
        }
    }
    if let Some(color) = color {
        if color.trim().is_empty() {
            errors.push("category color is required".to_string());
        }
    }
    if let Some(description) = description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "category description must be {} characters or fewer",
                MAX_DESCRIPTION_LEN
            ));
        }
    }

    errors
}

/// Create a category. A transformation category immediately gets its three
/// status tags (Before / In Progress / After); there is no multi-document
/// transaction, so a failed tag write surfaces as a dependency error with
/// the category already persisted.
pub async fn create_category(
    store: &impl RecordStore,
    payload: CreateCategoryPayload,
) -> Result<Category, CoreError> {
    let mut errors = validate_category_fields(
        Some(&payload.name),
        Some(&payload.color),
        payload.description.as_deref(),
    );

    let existing = load_all_categories(store).await?;
    let wanted = payload.name.trim().to_lowercase();
    if existing
        .iter()
        .any(|c| c.is_active && c.name.to_lowercase() == wanted)
    {
        errors.push(format!("a category named \"{}\" already exists", payload.name.trim()));
    }
    if !errors.is_empty() {
        return Err(CoreError::Validation(errors));
    }

    // Soft-deleted categories keep their slot so sort orders never collide.
    let sort_order = existing.iter().map(|c| c.sort_order).max().unwrap_or(0) + 1;

    let mut category = Category {
        id: String::new(),
        name: payload.name.trim().to_string(),
        color: payload.color.trim().to_string(),
        description: payload.description,
        category_type: payload.category_type,
        required: payload.required,
        sort_order,
        is_active: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    let mut fields = encode(&category)?;
    fields.remove("id");
    category.id = store.create(collections::CATEGORIES, fields).await?;

    if category.category_type == CategoryType::Transformation {
        create_transformation_tags(store, &category.id).await?;
    }

    tracing::info!("created category {} ({})", category.name, category.id);
    Ok(category)
}

/// The only code path that writes `tagType = "transformation-status"`.
async fn create_transformation_tags(
    store: &impl RecordStore,
    category_id: &str,
) -> Result<Vec<Tag>, CoreError> {
    let mut tags = Vec::with_capacity(TRANSFORMATION_TAG_NAMES.len());
    for (idx, name) in TRANSFORMATION_TAG_NAMES.iter().enumerate() {
        let mut tag = Tag {
            id: String::new(),
            category_id: category_id.to_string(),
            name: (*name).to_string(),
            description: None,
            tag_type: Some(TRANSFORMATION_STATUS_TAG_TYPE.to_string()),
            sort_order: idx as i64 + 1,
            is_active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let mut fields = encode(&tag)?;
        fields.remove("id");
        tag.id = store.create(collections::TAGS, fields).await?;
        tags.push(tag);
    }
    Ok(tags)
}

pub async fn get_category(store: &impl RecordStore, id: &str) -> Result<Category, CoreError> {
    let record = store
        .get(collections::CATEGORIES, id)
        .await?
        .ok_or_else(|| CoreError::not_found("category", id))?;
    Ok(decode(record)?)
}

/// Active categories in display order.
pub async fn list_categories(store: &impl RecordStore) -> Result<Vec<Category>, CoreError> {
    let mut categories: Vec<Category> = load_all_categories(store)
        .await?
        .into_iter()
        .filter(|c| c.is_active)
        .collect();
    categories.sort_by_key(|c| c.sort_order);
    Ok(categories)
}

/// Patch name / color / description / required. The category type is fixed
/// at creation: flipping it later would orphan or duplicate the status triad.
pub async fn update_category(
    store: &impl RecordStore,
    id: &str,
    payload: UpdateCategoryPayload,
) -> Result<Category, CoreError> {
    let current = get_category(store, id).await?;

    let mut errors = validate_category_fields(
        payload.name.as_deref(),
        payload.color.as_deref(),
        payload.description.as_deref(),
    );

    if let Some(name) = payload.name.as_deref() {
        let wanted = name.trim().to_lowercase();
        let taken = load_all_categories(store)
            .await?
            .iter()
            .any(|c| c.id != current.id && c.is_active && c.name.to_lowercase() == wanted);
        if taken {
            errors.push(format!("a category named \"{}\" already exists", name.trim()));
        }
    }
    if !errors.is_empty() {
        return Err(CoreError::Validation(errors));
    }

    let mut patch = Record::new();
    if let Some(name) = payload.name {
        patch.insert("name".to_string(), Value::String(name.trim().to_string()));
    }
    if let Some(color) = payload.color {
        patch.insert("color".to_string(), Value::String(color.trim().to_string()));
    }
    if let Some(description) = payload.description {
        patch.insert("description".to_string(), Value::String(description));
    }
    if let Some(required) = payload.required {
        patch.insert("required".to_string(), Value::Bool(required));
    }

    if !patch.is_empty() {
        store.update(collections::CATEGORIES, id, patch).await?;
    }

    get_category(store, id).await
}

/// Flag-only delete: tags and already-tagged images keep their references
/// for history.
pub async fn soft_delete_category(store: &impl RecordStore, id: &str) -> Result<(), CoreError> {
    get_category(store, id).await?;

    let mut patch = Record::new();
    patch.insert("isActive".to_string(), Value::Bool(false));
    store.update(collections::CATEGORIES, id, patch).await?;

    tracing::info!("soft-deleted category {}", id);
    Ok(())
}

pub async fn create_tag(
    store: &impl RecordStore,
    category_id: &str,
    payload: CreateTagPayload,
) -> Result<Tag, CoreError> {
    let category = get_category(store, category_id).await?;
    if !category.is_active {
        return Err(CoreError::not_found("category", category_id));
    }

    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push("tag name is required".to_string());
    } else if payload.name.chars().count() > MAX_NAME_LEN {
        errors.push(format!("tag name must be {} characters or fewer", MAX_NAME_LEN));
    }
    if let Some(description) = payload.description.as_deref() {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "tag description must be {} characters or fewer",
                MAX_DESCRIPTION_LEN
            ));
        }
    }

    let siblings = load_tags_for_category(store, category_id).await?;
    let wanted = payload.name.trim().to_lowercase();
    if siblings
        .iter()
        .any(|t| t.is_active && t.name.to_lowercase() == wanted)
    {
        errors.push(format!(
            "a tag named \"{}\" already exists in this category",
            payload.name.trim()
        ));
    }
    if !errors.is_empty() {
        return Err(CoreError::Validation(errors));
    }

    let sort_order = siblings.iter().map(|t| t.sort_order).max().unwrap_or(0) + 1;

    let mut tag = Tag {
        id: String::new(),
        category_id: category_id.to_string(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        tag_type: None,
        sort_order,
        is_active: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let mut fields = encode(&tag)?;
    fields.remove("id");
    tag.id = store.create(collections::TAGS, fields).await?;

    Ok(tag)
}

async fn load_tags_for_category(
    store: &impl RecordStore,
    category_id: &str,
) -> Result<Vec<Tag>, CoreError> {
    let records = store
        .scan(
            collections::TAGS,
            &[("categoryId", Value::String(category_id.to_string()))],
        )
        .await?;
    records
        .into_iter()
        .map(|r| decode::<Tag>(r).map_err(CoreError::from))
        .collect()
}

/// Active tags of a category, ordered by sort order then name.
pub async fn list_tags_by_category(
    store: &impl RecordStore,
    category_id: &str,
) -> Result<Vec<Tag>, CoreError> {
    let mut tags: Vec<Tag> = load_tags_for_category(store, category_id)
        .await?
        .into_iter()
        .filter(|t| t.is_active)
        .collect();
    tags.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(tags)
}

pub async fn get_tag(store: &impl RecordStore, id: &str) -> Result<Tag, CoreError> {
    let record = store
        .get(collections::TAGS, id)
        .await?
        .ok_or_else(|| CoreError::not_found("tag", id))?;
    Ok(decode(record)?)
}

pub async fn update_tag(
    store: &impl RecordStore,
    id: &str,
    payload: UpdateTagPayload,
) -> Result<Tag, CoreError> {
    let current = get_tag(store, id).await?;

    let mut errors = Vec::new();
    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            errors.push("tag name is required".to_string());
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.push(format!("tag name must be {} characters or fewer", MAX_NAME_LEN));
        } else {
            let wanted = name.trim().to_lowercase();
            let taken = load_tags_for_category(store, &current.category_id)
                .await?
                .iter()
                .any(|t| t.id != current.id && t.is_active && t.name.to_lowercase() == wanted);
            if taken {
                errors.push(format!(
                    "a tag named \"{}\" already exists in this category",
                    name.trim()
                ));
            }
        }
    }
    if let Some(description) = payload.description.as_deref() {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "tag description must be {} characters or fewer",
                MAX_DESCRIPTION_LEN
            ));
        }
    }
    if !errors.is_empty() {
        return Err(CoreError::Validation(errors));
    }

    let mut patch = Record::new();
    if let Some(name) = payload.name {
        patch.insert("name".to_string(), Value::String(name.trim().to_string()));
    }
    if let Some(description) = payload.description {
        patch.insert("description".to_string(), Value::String(description));
    }
    if !patch.is_empty() {
        store.update(collections::TAGS, id, patch).await?;
    }

    get_tag(store, id).await
}

pub async fn soft_delete_tag(store: &impl RecordStore, id: &str) -> Result<(), CoreError> {
    get_tag(store, id).await?;

    let mut patch = Record::new();
    patch.insert("isActive".to_string(), Value::Bool(false));
    store.update(collections::TAGS, id, patch).await?;
    Ok(())
}

/// Ids of the status triad for one transformation category, in sort order
/// (Before, In Progress, After). A validation error if the category exists
/// but is not a transformation category.
pub async fn transformation_tag_ids(
    store: &impl RecordStore,
    category_id: &str,
) -> Result<Vec<String>, CoreError> {
    let category = get_category(store, category_id).await?;
    if category.category_type != CategoryType::Transformation {
        return Err(CoreError::validation(
            "category is not a transformation category",
        ));
    }

    let mut triad: Vec<Tag> = load_tags_for_category(store, category_id)
        .await?
        .into_iter()
        .filter(|t| t.is_transformation_status())
        .collect();
    triad.sort_by_key(|t| t.sort_order);
    Ok(triad.into_iter().map(|t| t.id).collect())
}

/// Ids of every transformation category, active or not. Piece tag maps must
/// exclude these even when the category was since soft-deleted.
pub async fn transformation_category_ids(
    store: &impl RecordStore,
) -> Result<Vec<String>, CoreError> {
    Ok(load_all_categories(store)
        .await?
        .into_iter()
        .filter(|c| c.category_type == CategoryType::Transformation)
        .map(|c| c.id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn category_payload(name: &str, category_type: CategoryType) -> CreateCategoryPayload {
        CreateCategoryPayload {
            name: name.to_string(),
            color: "#8b5a2b".to_string(),
            description: None,
            category_type,
            required: false,
        }
    }

    #[tokio::test]
    async fn transformation_category_auto_creates_status_triad() {
        let store = MemoryStore::new();
        let category = create_category(
            &store,
            category_payload("Transformation", CategoryType::Transformation),
        )
        .await
        .unwrap();

        let tags = list_tags_by_category(&store, &category.id).await.unwrap();
        assert_eq!(tags.len(), 3);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Before", "In Progress", "After"]);
        assert_eq!(
            tags.iter().map(|t| t.sort_order).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert!(tags.iter().all(|t| t.is_transformation_status()));
    }

    #[tokio::test]
    async fn normal_category_creates_no_tags() {
        let store = MemoryStore::new();
        let category = create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();
        assert_eq!(category.sort_order, 1);

        let tags = list_tags_by_category(&store, &category.id).await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn duplicate_category_name_is_rejected_case_insensitively() {
        let store = MemoryStore::new();
        create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();

        let err = create_category(&store, category_payload("  fabric ", CategoryType::Normal))
            .await
            .unwrap_err();
        match err {
            CoreError::Validation(messages) => {
                assert!(messages[0].contains("already exists"), "{:?}", messages)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn soft_deleted_category_frees_its_name_but_not_its_sort_order() {
        let store = MemoryStore::new();
        let fabric = create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();
        soft_delete_category(&store, &fabric.id).await.unwrap();

        assert!(list_categories(&store).await.unwrap().is_empty());

        let again = create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();
        assert_eq!(again.sort_order, 2);

        // the old record stays readable for history
        let old = get_category(&store, &fabric.id).await.unwrap();
        assert!(!old.is_active);
    }

    #[tokio::test]
    async fn validation_failures_collect_every_message() {
        let store = MemoryStore::new();
        let err = create_category(
            &store,
            CreateCategoryPayload {
                name: "".to_string(),
                color: " ".to_string(),
                description: Some("x".repeat(201)),
                category_type: CategoryType::Normal,
                required: false,
            },
        )
        .await
        .unwrap_err();

        match err {
            CoreError::Validation(messages) => assert_eq!(messages.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn tag_creation_assigns_per_category_sort_order_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let fabric = create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();
        let colors = create_category(&store, category_payload("Colour", CategoryType::Normal))
            .await
            .unwrap();

        let velvet = create_tag(
            &store,
            &fabric.id,
            CreateTagPayload {
                name: "Velvet".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(velvet.sort_order, 1);
        assert!(velvet.tag_type.is_none());

        let linen = create_tag(
            &store,
            &fabric.id,
            CreateTagPayload {
                name: "Linen".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(linen.sort_order, 2);

        // per-category numbering restarts
        let teal = create_tag(
            &store,
            &colors.id,
            CreateTagPayload {
                name: "Teal".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(teal.sort_order, 1);

        let err = create_tag(
            &store,
            &fabric.id,
            CreateTagPayload {
                name: "velvet".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn tag_creation_on_unknown_category_is_not_found() {
        let store = MemoryStore::new();
        let err = create_tag(
            &store,
            "missing",
            CreateTagPayload {
                name: "Velvet".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "category", .. }));
    }

    #[tokio::test]
    async fn triad_lookup_returns_ids_in_status_order() {
        let store = MemoryStore::new();
        let category = create_category(
            &store,
            category_payload("Transformation", CategoryType::Transformation),
        )
        .await
        .unwrap();

        let triad = transformation_tag_ids(&store, &category.id).await.unwrap();
        assert_eq!(triad.len(), 3);

        let tags = list_tags_by_category(&store, &category.id).await.unwrap();
        let expected: Vec<String> = tags.into_iter().map(|t| t.id).collect();
        assert_eq!(triad, expected);

        let fabric = create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();
        assert!(transformation_tag_ids(&store, &fabric.id).await.is_err());
    }

    #[tokio::test]
    async fn category_rename_excludes_itself_from_the_duplicate_check() {
        let store = MemoryStore::new();
        let fabric = create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();
        let colour = create_category(&store, category_payload("Colour", CategoryType::Normal))
            .await
            .unwrap();

        // re-casing its own name is not a collision
        let updated = update_category(
            &store,
            &fabric.id,
            UpdateCategoryPayload {
                name: Some("FABRIC".to_string()),
                color: None,
                description: None,
                required: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "FABRIC");

        // taking a sibling's name is
        let err = update_category(
            &store,
            &colour.id,
            UpdateCategoryPayload {
                name: Some("fabric".to_string()),
                color: None,
                description: None,
                required: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // an all-None patch just reads the record back
        let same = update_category(
            &store,
            &colour.id,
            UpdateCategoryPayload {
                name: None,
                color: None,
                description: None,
                required: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(same.name, "Colour");
        assert_eq!(same.sort_order, colour.sort_order);
    }

    #[tokio::test]
    async fn tag_rename_excludes_itself_from_the_duplicate_check() {
        let store = MemoryStore::new();
        let fabric = create_category(&store, category_payload("Fabric", CategoryType::Normal))
            .await
            .unwrap();
        let velvet = create_tag(
            &store,
            &fabric.id,
            CreateTagPayload {
                name: "Velvet".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        let linen = create_tag(
            &store,
            &fabric.id,
            CreateTagPayload {
                name: "Linen".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

        let renamed = update_tag(
            &store,
            &velvet.id,
            UpdateTagPayload {
                name: Some("velvet".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "velvet");

        let err = update_tag(
            &store,
            &linen.id,
            UpdateTagPayload {
                name: Some("VELVET".to_string()),
                description: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
