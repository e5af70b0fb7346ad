
// Re-export model types and service functions
pub mod http;
pub mod model;
pub mod service;

pub use model::{
    Category, CategoryType, CreateCategoryPayload, CreateTagPayload, Tag, UpdateCategoryPayload,
    UpdateTagPayload,
};
pub use service::*;
