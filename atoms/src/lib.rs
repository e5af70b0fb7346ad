pub mod error;
pub mod store;

pub mod categories;
pub mod filter;
pub mod media;
pub mod pieces;

pub use error::CoreError;
