//! Domain layer
//!
//! Contains the core business logic and domain models.

pub mod relationship;
pub mod search;
pub mod social;
pub mod specification;
