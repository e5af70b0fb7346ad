use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::media::model::{TagMap, TagSelection};

/// Where an image sits in a piece's documentation arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationStatus {
    Before,
    InProgress,
    After,
}

/// Overall completeness of a piece, derived from which status buckets hold
/// images. Never persisted; recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceStatus {
    Complete,
    BeforeOnly,
    AfterOnly,
    InProgress,
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PieceImage {
    pub image_id: String,
    pub status: TransformationStatus,
    pub is_default: bool,
    pub assigned_at: String,
}

/// A furniture piece groups tagged gallery images into one
/// before / in-progress / after transformation record.
///
/// `tags` never holds transformation categories: that axis lives entirely in
/// `images[].status`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FurniturePiece {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furniture_type: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub images: Vec<PieceImage>,
    #[serde(default, skip_serializing_if = "TagMap::is_empty")]
    pub tags: TagMap,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl FurniturePiece {
    pub fn derived_status(&self) -> PieceStatus {
        derived_status(&self.images)
    }
}

/// Pure completeness function over the image list.
pub fn derived_status(images: &[PieceImage]) -> PieceStatus {
    let count = |status: TransformationStatus| {
        images.iter().filter(|img| img.status == status).count()
    };
    let before = count(TransformationStatus::Before);
    let during = count(TransformationStatus::InProgress);
    let after = count(TransformationStatus::After);

    match (before, during, after) {
        (0, 0, 0) => PieceStatus::Unknown,
        (b, i, a) if b > 0 && i > 0 && a > 0 => PieceStatus::Complete,
        (b, 0, 0) if b > 0 => PieceStatus::BeforeOnly,
        (0, 0, a) if a > 0 => PieceStatus::AfterOnly,
        _ => PieceStatus::InProgress,
    }
}

/// Read-model wrapper: the piece plus its status computed at read time.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PieceWithStatus {
    #[serde(flatten)]
    pub piece: FurniturePiece,
    pub status: PieceStatus,
}

impl From<FurniturePiece> for PieceWithStatus {
    fn from(piece: FurniturePiece) -> Self {
        let status = piece.derived_status();
        Self { piece, status }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAssignment {
    pub image_id: String,
    pub status: TransformationStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePiecePayload {
    pub name: String,
    pub description: Option<String>,
    pub furniture_type: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageAssignment>,
    pub tags: Option<HashMap<String, TagSelection>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePiecePayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub furniture_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignImagePayload {
    pub image_id: String,
    pub status: TransformationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(status: TransformationStatus) -> PieceImage {
        PieceImage {
            image_id: uuid::Uuid::new_v4().to_string(),
            status,
            is_default: false,
            assigned_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn derived_status_truth_table() {
        use PieceStatus::{AfterOnly, BeforeOnly, Complete, Unknown};
        use TransformationStatus::*;

        let cases: Vec<(Vec<PieceImage>, PieceStatus)> = vec![
            (vec![], Unknown),
            (vec![img(Before)], BeforeOnly),
            (vec![img(Before), img(Before)], BeforeOnly),
            (vec![img(After)], AfterOnly),
            (vec![img(InProgress)], PieceStatus::InProgress),
            // before + after without an in-progress shot is NOT complete
            (vec![img(Before), img(After)], PieceStatus::InProgress),
            (vec![img(Before), img(InProgress)], PieceStatus::InProgress),
            (vec![img(InProgress), img(After)], PieceStatus::InProgress),
            (vec![img(Before), img(InProgress), img(After)], Complete),
        ];

        for (images, expected) in cases {
            assert_eq!(derived_status(&images), expected, "images: {:?}", images);
            // pure: same input, same answer
            assert_eq!(derived_status(&images), expected);
        }
    }

    #[test]
    fn statuses_use_the_stored_wire_names() {
        assert_eq!(
            serde_json::to_string(&TransformationStatus::InProgress).unwrap(),
            "\"inprogress\""
        );
        assert_eq!(
            serde_json::to_string(&TransformationStatus::Before).unwrap(),
            "\"before\""
        );
        assert_eq!(
            serde_json::to_string(&PieceStatus::BeforeOnly).unwrap(),
            "\"beforeOnly\""
        );
    }

    #[test]
    fn piece_with_status_flattens_for_the_ui() {
        let piece = FurniturePiece {
            id: "p1".to_string(),
            name: "Sofa #1".to_string(),
            description: None,
            furniture_type: Some("sofa".to_string()),
            created_by: "admin".to_string(),
            images: vec![img(TransformationStatus::Before)],
            tags: TagMap::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
        };

        let value = serde_json::to_value(PieceWithStatus::from(piece)).unwrap();
        assert_eq!(value["name"], "Sofa #1");
        assert_eq!(value["status"], "beforeOnly");
    }
}
