use serde::{Deserialize, Serialize};

use marlow_atoms::media::model::TagMap;

// ========== BROWSE ==========
/// Combined piece query: optional free-text term AND optional tag filter.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BrowsePiecesPayload {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub tags: Option<TagMap>,
}

// ========== TRIAD TOGGLE ==========
/// Expand the combined Before/In Progress/After control into per-tag
/// selection changes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriadTogglePayload {
    pub category_id: String,
    #[serde(default)]
    pub selection: TagMap,
    pub enable: bool,
}

// ========== BEST-EFFORT COMPOSITES ==========
/// One step of a best-effort multi-document operation. Steps run
/// independently; a failure does not roll back the ones already applied.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ok: true,
            error: None,
        }
    }

    pub fn failed(step: impl Into<String>, error: impl ToString) -> Self {
        Self {
            step: step.into(),
            ok: false,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregate report for a best-effort composite.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub ok: bool,
    pub steps: Vec<StepOutcome>,
}

impl StepReport {
    pub fn new(steps: Vec<StepOutcome>) -> Self {
        let ok = steps.iter().all(|s| s.ok);
        Self { ok, steps }
    }
}

// ========== RE-EXPORTS ==========
pub use marlow_atoms::categories::model::{Category, Tag};
pub use marlow_atoms::media::model::Image;
pub use marlow_atoms::pieces::model::{FurniturePiece, PieceWithStatus};
