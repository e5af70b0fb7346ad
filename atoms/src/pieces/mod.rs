
// Re-export model types and service functions
pub mod http;
pub mod model;
pub mod service;

pub use model::{
    AssignImagePayload, CreatePiecePayload, FurniturePiece, ImageAssignment, PieceImage,
    PieceStatus, PieceWithStatus, TransformationStatus, UpdatePiecePayload,
};
pub use service::*;
