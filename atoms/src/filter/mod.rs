//! Tag-set and text predicates shared by the gallery and piece screens.
//!
//! Everything here is pure: the store-facing callers load records and hand
//! the maps in.

use crate::media::model::{Image, TagMap};
use crate::pieces::model::FurniturePiece;

/// Does an entity's tag map satisfy a filter?
///
/// OR within a category (any overlap counts), AND across categories.
/// Categories absent from the filter impose no constraint; a filter category
/// the entity has nothing for never matches. An empty filter matches
/// everything.
pub fn matches_tag_filter(entity_tags: &TagMap, filter: &TagMap) -> bool {
    filter.iter().all(|(category_id, wanted)| {
        if wanted.is_empty() {
            return true;
        }
        match entity_tags.get(category_id) {
            Some(assigned) => wanted.iter().any(|tag_id| assigned.contains(tag_id)),
            None => false,
        }
    })
}

/// Case-insensitive substring match across the caller-supplied text fields
/// (name, description, alt text, ...). An empty term matches everything.
pub fn matches_text_search<'a, I>(fields: I, term: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Add one tag id to a filter/selection for a category.
pub fn select_tag(selection: &mut TagMap, category_id: &str, tag_id: &str) {
    let tags = selection.entry(category_id.to_string()).or_default();
    if !tags.iter().any(|t| t == tag_id) {
        tags.push(tag_id.to_string());
    }
}

/// Remove one tag id; a category whose set empties is dropped from the map.
pub fn deselect_tag(selection: &mut TagMap, category_id: &str, tag_id: &str) {
    if let Some(tags) = selection.get_mut(category_id) {
        tags.retain(|t| t != tag_id);
        if tags.is_empty() {
            selection.remove(category_id);
        }
    }
}

/// Combined-triad toggle for a transformation category: the UI treats the
/// Before / In Progress / After tags as one control. Expands to three
/// elementary select/deselect calls so the underlying selection stays plain
/// per-tag storage, but driven only through here the triad is all-or-nothing.
pub fn toggle_transformation_triad(
    selection: &mut TagMap,
    category_id: &str,
    triad_ids: &[String],
    enable: bool,
) {
    for tag_id in triad_ids {
        if enable {
            select_tag(selection, category_id, tag_id);
        } else {
            deselect_tag(selection, category_id, tag_id);
        }
    }
}

/// Images not referenced by any piece; the candidate pool when building a
/// new piece.
pub fn unassigned_images<'a>(
    all_images: &'a [Image],
    all_pieces: &[FurniturePiece],
) -> Vec<&'a Image> {
    all_images
        .iter()
        .filter(|image| {
            !all_pieces
                .iter()
                .any(|piece| piece.images.iter().any(|pi| pi.image_id == image.id))
        })
        .collect()
}
