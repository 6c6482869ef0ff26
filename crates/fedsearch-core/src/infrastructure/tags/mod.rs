//! Hashtag infrastructure module

pub mod repository;

pub use repository::SqliteTagRepository;
