// ========== CATEGORY / TAG ==========
pub use marlow_atoms::categories::model::{
    Category, CategoryType, CreateCategoryPayload, CreateTagPayload, Tag, UpdateCategoryPayload,
    UpdateTagPayload,
};

// ========== IMAGE ==========
pub use marlow_atoms::media::model::{CreateImagePayload, Image, TagMap, TagSelection};

// ========== FURNITURE PIECE ==========
pub use marlow_atoms::pieces::model::{
    AssignImagePayload, CreatePiecePayload, FurniturePiece, ImageAssignment, PieceImage,
    PieceStatus, PieceWithStatus, TransformationStatus, UpdatePiecePayload,
};

// ========== WORKFLOWS ==========
pub use tagging_block::types::{
    BrowsePiecesPayload, StepOutcome, StepReport, TriadTogglePayload,
};
