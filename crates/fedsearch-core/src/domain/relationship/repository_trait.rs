//! Repository trait for relationship lookups
//!
//! Every map method answers for the whole candidate list in a single round
//! trip. Implementations must not issue one query per candidate.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::social::AccountId;
use crate::error::Result;

/// Read-only access to relationships relative to one viewer
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Candidates the viewer blocks
    async fn blocking_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>>;

    /// Candidates that block the viewer
    async fn blocked_by_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>>;

    /// Candidates the viewer mutes
    async fn muting_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>>;

    /// Candidates the viewer follows
    async fn following_map(
        &self,
        ids: &[AccountId],
        viewer_id: AccountId,
    ) -> Result<HashMap<AccountId, bool>>;

    /// Candidate domains the viewer has blocked
    async fn domain_blocking_map(
        &self,
        domains: &[String],
        viewer_id: AccountId,
    ) -> Result<HashMap<String, bool>>;

    /// Every account the viewer follows
    async fn following_ids(&self, viewer_id: AccountId) -> Result<Vec<AccountId>>;
}
