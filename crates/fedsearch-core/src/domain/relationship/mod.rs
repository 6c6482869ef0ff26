//! Relationship domain module
//!
//! Block, mute, follow and domain-block state between a viewer and the
//! authors of candidate search results.
//!
//! # Architecture
//!
//! - **Repository trait**: `RelationshipStore`, one batched lookup per relation type
//! - **Maps**: `RelationshipMaps`, the per-request lookup tables
//! - **Builder**: `RelationshipMapBuilder`, fills the maps for a candidate set

pub mod maps;
pub mod repository_trait;

pub use maps::{RelationshipMapBuilder, RelationshipMaps};
pub use repository_trait::RelationshipStore;
