//! Post-fetch visibility filtering
//!
//! Decides which fetched statuses a viewer must not see, using the
//! relationship maps built for the result page.

use tracing::debug;

use crate::domain::relationship::RelationshipMaps;
use crate::domain::social::{Account, AccountId, Status, Visibility};
use crate::domain::specification::{AnySpecification, Specification};

/// Judges whether a status is hidden from a viewer
pub trait VisibilityFilter: Send + Sync {
    fn is_hidden(&self, status: &Status, viewer: &Account, relations: &RelationshipMaps) -> bool;
}

/// Everything a hiding rule looks at
pub struct FilterCandidate<'a> {
    pub status: &'a Status,
    pub viewer: &'a Account,
    pub relations: &'a RelationshipMaps,
}

impl FilterCandidate<'_> {
    fn author_id(&self) -> AccountId {
        self.status.account_id()
    }

    fn mentions_viewer(&self) -> bool {
        self.status.mentions(self.viewer.id)
    }
}

/// Direct statuses not addressed to the viewer, followers-only statuses
/// by accounts the viewer does not follow
pub struct BlockedByPolicy;

impl Specification<FilterCandidate<'_>> for BlockedByPolicy {
    fn is_satisfied_by(&self, c: &FilterCandidate<'_>) -> bool {
        match c.status.visibility {
            Visibility::Public | Visibility::Unlisted => false,
            Visibility::Private => {
                !(c.relations.is_following(c.author_id()) || c.mentions_viewer())
            }
            Visibility::Direct => !c.mentions_viewer(),
        }
    }

    fn name(&self) -> &'static str {
        "policy"
    }
}

/// Either side blocks the other
pub struct BlockingAccount;

impl Specification<FilterCandidate<'_>> for BlockingAccount {
    fn is_satisfied_by(&self, c: &FilterCandidate<'_>) -> bool {
        c.relations.is_blocking(c.author_id()) || c.relations.is_blocked_by(c.author_id())
    }

    fn name(&self) -> &'static str {
        "blocking_account"
    }
}

pub struct MutingAccount;

impl Specification<FilterCandidate<'_>> for MutingAccount {
    fn is_satisfied_by(&self, c: &FilterCandidate<'_>) -> bool {
        c.relations.is_muting(c.author_id())
    }

    fn name(&self) -> &'static str {
        "muting_account"
    }
}

pub struct BlockingDomain;

impl Specification<FilterCandidate<'_>> for BlockingDomain {
    fn is_satisfied_by(&self, c: &FilterCandidate<'_>) -> bool {
        c.status
            .account_domain()
            .is_some_and(|domain| c.relations.is_domain_blocking(domain))
    }

    fn name(&self) -> &'static str {
        "blocking_domain"
    }
}

/// Silenced authors stay hidden from non-silenced viewers who don't follow them
pub struct SilencedAccount;

impl Specification<FilterCandidate<'_>> for SilencedAccount {
    fn is_satisfied_by(&self, c: &FilterCandidate<'_>) -> bool {
        !c.viewer.silenced
            && c.status.account.silenced
            && !c.relations.is_following(c.author_id())
    }

    fn name(&self) -> &'static str {
        "silenced_account"
    }
}

/// Default `VisibilityFilter`
///
/// A viewer always sees their own statuses. Anything else is hidden as
/// soon as one rule matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFilter;

impl StatusFilter {
    pub fn new() -> Self {
        Self
    }

    fn rules<'a>() -> AnySpecification<FilterCandidate<'a>> {
        AnySpecification::new()
            .with(BlockedByPolicy)
            .with(BlockingAccount)
            .with(BlockingDomain)
            .with(MutingAccount)
            .with(SilencedAccount)
    }
}

impl VisibilityFilter for StatusFilter {
    fn is_hidden(&self, status: &Status, viewer: &Account, relations: &RelationshipMaps) -> bool {
        if status.account_id() == viewer.id {
            return false;
        }

        let candidate = FilterCandidate {
            status,
            viewer,
            relations,
        };
        match Self::rules().first_match(&candidate) {
            Some(rule) => {
                debug!(status_id = status.id, rule = rule.name(), "Hiding status from viewer");
                true
            }
            None => false,
        }
    }
}
