//! Per-request relationship lookup tables

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use super::repository_trait::RelationshipStore;
use crate::domain::social::{AccountId, Status};
use crate::error::Result;

/// Relationship state between one viewer and a set of candidate accounts
///
/// Every candidate passed to the builder has an entry in each account map
/// (and each candidate domain in the domain map), so a missing key means the
/// account was not part of the candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipMaps {
    pub blocking: HashMap<AccountId, bool>,
    pub blocked_by: HashMap<AccountId, bool>,
    pub muting: HashMap<AccountId, bool>,
    pub following: HashMap<AccountId, bool>,
    pub domain_blocking: HashMap<String, bool>,
}

impl RelationshipMaps {
    pub fn is_blocking(&self, id: AccountId) -> bool {
        self.blocking.get(&id).copied().unwrap_or(false)
    }

    pub fn is_blocked_by(&self, id: AccountId) -> bool {
        self.blocked_by.get(&id).copied().unwrap_or(false)
    }

    pub fn is_muting(&self, id: AccountId) -> bool {
        self.muting.get(&id).copied().unwrap_or(false)
    }

    pub fn is_following(&self, id: AccountId) -> bool {
        self.following.get(&id).copied().unwrap_or(false)
    }

    pub fn is_domain_blocking(&self, domain: &str) -> bool {
        self.domain_blocking.get(domain).copied().unwrap_or(false)
    }
}

/// Builds `RelationshipMaps` with one store round trip per relation type
#[derive(Clone)]
pub struct RelationshipMapBuilder {
    store: Arc<dyn RelationshipStore>,
}

impl RelationshipMapBuilder {
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self { store }
    }

    /// Build maps for explicit candidate accounts and domains
    pub async fn build(
        &self,
        viewer_id: AccountId,
        account_ids: &[AccountId],
        domains: &[String],
    ) -> Result<RelationshipMaps> {
        let ids: Vec<AccountId> = account_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let domains: Vec<String> = domains
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if ids.is_empty() && domains.is_empty() {
            return Ok(RelationshipMaps::default());
        }

        debug!(
            viewer_id,
            accounts = ids.len(),
            domains = domains.len(),
            "Building relationship maps"
        );

        let (blocking, blocked_by, muting, following, domain_blocking) = tokio::try_join!(
            self.store.blocking_map(&ids, viewer_id),
            self.store.blocked_by_map(&ids, viewer_id),
            self.store.muting_map(&ids, viewer_id),
            self.store.following_map(&ids, viewer_id),
            self.store.domain_blocking_map(&domains, viewer_id),
        )?;

        Ok(RelationshipMaps {
            blocking: complete(&ids, blocking),
            blocked_by: complete(&ids, blocked_by),
            muting: complete(&ids, muting),
            following: complete(&ids, following),
            domain_blocking: complete(&domains, domain_blocking),
        })
    }

    /// Build maps for the authors of a list of statuses
    pub async fn for_statuses(
        &self,
        viewer_id: AccountId,
        statuses: &[Status],
    ) -> Result<RelationshipMaps> {
        let account_ids: Vec<AccountId> = statuses.iter().map(Status::account_id).collect();
        let domains: Vec<String> = statuses
            .iter()
            .filter_map(|s| s.account_domain().map(str::to_string))
            .collect();
        self.build(viewer_id, &account_ids, &domains).await
    }
}

/// Give every candidate an entry, defaulting to `false`
fn complete<K: Eq + Hash + Clone>(candidates: &[K], found: HashMap<K, bool>) -> HashMap<K, bool> {
    let mut map: HashMap<K, bool> = candidates.iter().map(|k| (k.clone(), false)).collect();
    for (key, value) in found {
        if let Some(slot) = map.get_mut(&key) {
            *slot = value;
        }
    }
    map
}
