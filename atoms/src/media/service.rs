use std::collections::HashMap;

use serde_json::Value;

use super::model::{normalize_tag_map, CreateImagePayload, Image, TagMap, TagSelection};
use crate::error::CoreError;
use crate::filter::matches_tag_filter;
use crate::store::{collections, decode, encode, Record, RecordStore};

/// Register an image reference in the gallery. The upload itself happens
/// against the image host before this is called.
pub async fn create_image(
    store: &impl RecordStore,
    payload: CreateImagePayload,
) -> Result<Image, CoreError> {
    if payload.url.trim().is_empty() {
        return Err(CoreError::validation("image url is required"));
    }

    let mut image = Image {
        id: String::new(),
        url: payload.url,
        alt_text: payload.alt_text,
        tags: TagMap::new(),
        uploaded_at: chrono::Utc::now().to_rfc3339(),
    };
    let mut fields = encode(&image)?;
    fields.remove("id");
    image.id = store.create(collections::IMAGES, fields).await?;

    Ok(image)
}

pub async fn get_image(store: &impl RecordStore, id: &str) -> Result<Image, CoreError> {
    let record = store
        .get(collections::IMAGES, id)
        .await?
        .ok_or_else(|| CoreError::not_found("image", id))?;
    Ok(decode(record)?)
}

/// Every gallery image, newest first.
pub async fn list_images(store: &impl RecordStore) -> Result<Vec<Image>, CoreError> {
    let records = store.scan(collections::IMAGES, &[]).await?;
    let mut images: Vec<Image> = records
        .into_iter()
        .map(|r| decode::<Image>(r).map_err(CoreError::from))
        .collect::<Result<_, _>>()?;
    images.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    Ok(images)
}

/// Replace an image's whole tag map. Not a merge: a category missing from
/// the payload ends up missing from the stored map too.
pub async fn set_image_tags(
    store: &impl RecordStore,
    image_id: &str,
    tags_by_category: HashMap<String, TagSelection>,
) -> Result<Image, CoreError> {
    let mut image = get_image(store, image_id).await?;
    let normalized = normalize_tag_map(tags_by_category);

    let mut patch = Record::new();
    if normalized.is_empty() {
        // absence of the field means "nothing assigned", never an empty map
        patch.insert("tags".to_string(), Value::Null);
    } else {
        patch.insert(
            "tags".to_string(),
            serde_json::to_value(&normalized)
                .map_err(|e| CoreError::validation(format!("invalid tag map: {}", e)))?,
        );
    }
    store.update(collections::IMAGES, image_id, patch).await?;

    image.tags = normalized;
    Ok(image)
}

/// Images whose tag map satisfies the filter (see [`crate::filter`]).
pub async fn images_matching_tags(
    store: &impl RecordStore,
    filter: &TagMap,
) -> Result<Vec<Image>, CoreError> {
    let images = list_images(store).await?;
    Ok(images
        .into_iter()
        .filter(|img| matches_tag_filter(&img.tags, filter))
        .collect())
}

/// Hard delete of the image record only. Detaching the image from furniture
/// pieces first is the caller's job (see the tagging block's
/// delete-image-everywhere workflow).
pub async fn delete_image(store: &impl RecordStore, id: &str) -> Result<(), CoreError> {
    get_image(store, id).await?;
    store.delete(collections::IMAGES, id).await?;
    tracing::info!("deleted image {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn seed_image(store: &MemoryStore) -> Image {
        create_image(
            store,
            CreateImagePayload {
                url: "https://cdn.example.com/sofa-1.jpg".to_string(),
                alt_text: Some("green sofa before reupholstery".to_string()),
            },
        )
        .await
        .unwrap()
    }

    fn one(category: &str, tag: &str) -> HashMap<String, TagSelection> {
        let mut map = HashMap::new();
        map.insert(category.to_string(), TagSelection::One(tag.to_string()));
        map
    }

    #[tokio::test]
    async fn set_image_tags_is_idempotent_and_deduplicates() {
        let store = MemoryStore::new();
        let image = seed_image(&store).await;

        let mut raw = HashMap::new();
        raw.insert(
            "catA".to_string(),
            TagSelection::Many(vec!["t1".to_string(), "t1".to_string(), "t2".to_string()]),
        );

        set_image_tags(&store, &image.id, raw.clone()).await.unwrap();
        let first = get_image(&store, &image.id).await.unwrap();

        set_image_tags(&store, &image.id, raw).await.unwrap();
        let second = get_image(&store, &image.id).await.unwrap();

        assert_eq!(first.tags, second.tags);
        assert_eq!(first.tags.get("catA").unwrap(), &["t1", "t2"]);
    }

    #[tokio::test]
    async fn legacy_single_id_round_trips_like_a_list() {
        let store = MemoryStore::new();
        let image = seed_image(&store).await;

        set_image_tags(&store, &image.id, one("catA", "tag1"))
            .await
            .unwrap();
        let via_single = get_image(&store, &image.id).await.unwrap().tags;

        let mut as_list = HashMap::new();
        as_list.insert(
            "catA".to_string(),
            TagSelection::Many(vec!["tag1".to_string()]),
        );
        set_image_tags(&store, &image.id, as_list).await.unwrap();
        let via_list = get_image(&store, &image.id).await.unwrap().tags;

        assert_eq!(via_single, via_list);

        let mut filter = TagMap::new();
        filter.insert("catA".to_string(), vec!["tag1".to_string()]);
        assert!(matches_tag_filter(&via_single, &filter));
        assert!(matches_tag_filter(&via_list, &filter));
    }

    #[tokio::test]
    async fn replace_is_full_not_a_merge() {
        let store = MemoryStore::new();
        let image = seed_image(&store).await;

        set_image_tags(&store, &image.id, one("catA", "t1"))
            .await
            .unwrap();
        set_image_tags(&store, &image.id, one("catB", "t2"))
            .await
            .unwrap();

        let tags = get_image(&store, &image.id).await.unwrap().tags;
        assert!(!tags.contains_key("catA"));
        assert_eq!(tags.get("catB").unwrap(), &["t2"]);
    }

    #[tokio::test]
    async fn clearing_tags_removes_the_field_entirely() {
        let store = MemoryStore::new();
        let image = seed_image(&store).await;

        set_image_tags(&store, &image.id, one("catA", "t1"))
            .await
            .unwrap();
        set_image_tags(&store, &image.id, HashMap::new())
            .await
            .unwrap();

        // raw record must not carry an empty tags map
        let record = store
            .get(collections::IMAGES, &image.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!record.contains_key("tags"));

        let image = get_image(&store, &image.id).await.unwrap();
        assert!(image.tags.is_empty());
    }

    #[tokio::test]
    async fn tagging_a_missing_image_is_not_found() {
        let store = MemoryStore::new();
        let err = set_image_tags(&store, "nope", one("catA", "t1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "image", .. }));
    }

    #[tokio::test]
    async fn images_matching_tags_applies_the_filter() {
        let store = MemoryStore::new();
        let tagged = seed_image(&store).await;
        let untagged = seed_image(&store).await;

        set_image_tags(&store, &tagged.id, one("fabric", "velvet"))
            .await
            .unwrap();

        let mut filter = TagMap::new();
        filter.insert("fabric".to_string(), vec!["velvet".to_string()]);

        let hits = images_matching_tags(&store, &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, tagged.id);

        // empty filter matches everything, untagged images included
        let all = images_matching_tags(&store, &TagMap::new()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|i| i.id == untagged.id));
    }
}
