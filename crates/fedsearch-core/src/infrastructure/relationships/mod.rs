//! Relationship infrastructure module
//!
//! Database repository for follows, blocks, mutes and domain blocks.

pub mod repository;

pub use repository::SqliteRelationshipRepository;
