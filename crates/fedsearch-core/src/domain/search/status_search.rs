//! Status (content) search backend
//!
//! Composes the compiled query with the viewer's searchable scope, runs it
//! against the index and drops anything the viewer must not see.

use std::sync::Arc;

use tracing::{debug, warn};

use super::backends::IndexClient;
use super::entity::{SearchOptions, VisibilityScope};
use super::filter::VisibilityFilter;
use super::query::{BoolQuery, Clause, IndexField, IndexQuery, QueryCompiler, RangeBounds};
use crate::domain::relationship::{RelationshipMapBuilder, RelationshipStore};
use crate::domain::social::{Account, AccountId, Status, Visibility};
use crate::error::Result;

/// Status search backend
#[derive(Clone)]
pub struct StatusSearchBackend {
    compiler: Arc<dyn QueryCompiler>,
    index: Arc<dyn IndexClient>,
    relationships: Arc<dyn RelationshipStore>,
    filter: Arc<dyn VisibilityFilter>,
    visibility_scope: String,
}

impl StatusSearchBackend {
    pub fn new(
        compiler: Arc<dyn QueryCompiler>,
        index: Arc<dyn IndexClient>,
        relationships: Arc<dyn RelationshipStore>,
        filter: Arc<dyn VisibilityFilter>,
        visibility_scope: impl Into<String>,
    ) -> Self {
        Self {
            compiler,
            index,
            relationships,
            filter,
            visibility_scope: visibility_scope.into(),
        }
    }

    /// Search statuses visible to `viewer`
    ///
    /// Fails with `SyntaxRejection` when the query does not compile and with
    /// `Configuration` for an unknown visibility scope. Index or compiler
    /// connectivity failures produce an empty result instead of an error.
    pub async fn search(
        &self,
        query: &str,
        viewer: &Account,
        limit: u64,
        offset: u64,
        options: &SearchOptions,
    ) -> Result<Vec<Status>> {
        let compiled = match self.compiler.compile(query).await {
            Ok(compiled) => compiled,
            Err(e) if e.is_downstream_unavailable() => {
                warn!(error = %e, "Query compiler unavailable, returning no statuses");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let required = compiled.required_blocker_ids();
        if !required.is_empty() {
            let blocked_by = self.relationships.blocked_by_map(&required, viewer.id).await?;
            if blocked_by.values().any(|blocked| *blocked) {
                debug!(viewer_id = viewer.id, "Viewer blocked by a queried account, skipping index");
                return Ok(Vec::new());
            }
        }

        let scope = VisibilityScope::parse(&self.visibility_scope)?;

        let mut following_ids = self.relationships.following_ids(viewer.id).await?;
        following_ids.push(viewer.id);

        let mut index_query = compiled.apply_to(
            Self::scoped_query(scope, viewer.id),
            viewer.id,
            &following_ids,
        );
        if let Some(account_id) = options.account_id {
            index_query = index_query.filter(Clause::term(IndexField::AccountId, account_id));
        }
        let id_range = RangeBounds::exclusive(options.min_id, options.max_id);
        if !id_range.is_unbounded() {
            index_query = index_query.filter(Clause::range(IndexField::Id, id_range));
        }

        debug!(query = %index_query.to_json(), limit, offset, "Executing status index query");

        let hits = match self.index.execute(&index_query, limit, offset).await {
            Ok(hits) => hits,
            Err(e) if e.is_downstream_unavailable() => {
                warn!(error = %e, "Status index unavailable, returning no statuses");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let hit_count = hits.len();
        let statuses: Vec<Status> = hits.into_iter().flatten().collect();
        if statuses.len() < hit_count {
            debug!(
                dangling = hit_count - statuses.len(),
                "Dropped index entries without a backing status"
            );
        }

        let relations = RelationshipMapBuilder::new(Arc::clone(&self.relationships))
            .for_statuses(viewer.id, &statuses)
            .await?;

        Ok(statuses
            .into_iter()
            .filter(|status| !self.filter.is_hidden(status, viewer, &relations))
            .collect())
    }

    /// Base query: statuses the viewer may search, widened by the scope
    fn scoped_query(scope: VisibilityScope, viewer_id: AccountId) -> IndexQuery {
        let mut allowed = vec![Clause::term(IndexField::SearchableBy, viewer_id)];
        match scope {
            VisibilityScope::Classic => {}
            VisibilityScope::Discoverable => {
                allowed.push(Clause::Bool(BoolQuery::all_of(vec![
                    Clause::term(IndexField::Visibility, Visibility::Public),
                    Clause::term(IndexField::Discoverable, true),
                    Clause::term(IndexField::Silenced, false),
                ])));
            }
            VisibilityScope::Public => {
                allowed.push(Clause::term(IndexField::Visibility, Visibility::Public));
            }
            VisibilityScope::PublicOrUnlisted => {
                allowed.push(Clause::terms(
                    IndexField::Visibility,
                    [Visibility::Public, Visibility::Unlisted],
                ));
            }
        }
        IndexQuery::new().filter(Clause::Bool(BoolQuery::any_of(allowed)))
    }
}
