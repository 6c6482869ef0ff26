//! Social graph entities
//!
//! Accounts, statuses (content items) and hashtags as seen by search.

pub mod account;
pub mod status;
pub mod tag;

pub use account::{Account, AccountId};
pub use status::{Status, StatusId, Visibility};
pub use tag::{Tag, TagId};
