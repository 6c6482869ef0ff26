//! fedsearch Core Integration Tests
//!
//! The first half drives `SearchService` with counting fakes to check
//! routing and the rejection policy; the second half runs the full stack
//! against an in-memory SQLite database.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fedsearch_core::domain::relationship::{RelationshipMapBuilder, RelationshipStore};
use fedsearch_core::domain::search::{
    AccountLookup, AccountSearch, AccountSearchBackend, AccountSearchOptions, IndexClient,
    IndexQuery, NoopResolver, Resource, ResourceResolver, SearchOptions, SearchService,
    SearchSettings, SearchType, StandardQueryCompiler, StatusFilter, StatusSearchBackend,
    TagSearch, TagSearchBackend, TagSearchOptions,
};
use fedsearch_core::domain::social::{Account, AccountId, Status, Tag, Visibility};
use fedsearch_core::infrastructure::{
    SqliteAccountRepository, SqliteRelationshipRepository, SqliteStatusIndex,
    SqliteStatusRepository, SqliteTagRepository,
};
use fedsearch_core::storage::Database;
use fedsearch_core::{Error, Result};

// ========== Counting fakes ==========

#[derive(Clone, Copy)]
enum Outcome {
    Found,
    Reject(&'static str),
}

struct FakeAccounts {
    outcome: Outcome,
    calls: AtomicUsize,
    last: Mutex<Option<(u64, AccountSearchOptions)>>,
}

impl FakeAccounts {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }
}

#[async_trait]
impl AccountSearch for FakeAccounts {
    async fn search(
        &self,
        _query: &str,
        _viewer: Option<&Account>,
        limit: u64,
        options: AccountSearchOptions,
    ) -> Result<Vec<Account>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((limit, options));
        match self.outcome {
            Outcome::Found => Ok(vec![Account::local(7, "found")]),
            Outcome::Reject(fragment) => Err(Error::syntax(fragment)),
        }
    }
}

struct FakeTags {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl FakeTags {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TagSearch for FakeTags {
    async fn search(&self, _query: &str, _limit: u64, _options: TagSearchOptions) -> Result<Vec<Tag>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Found => Ok(vec![Tag::new(1, "found")]),
            Outcome::Reject(fragment) => Err(Error::syntax(fragment)),
        }
    }
}

/// Wraps any index and counts executions
struct CountingIndex {
    inner: Arc<dyn IndexClient>,
    calls: AtomicUsize,
}

impl CountingIndex {
    fn new(inner: Arc<dyn IndexClient>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexClient for CountingIndex {
    async fn execute(&self, query: &IndexQuery, limit: u64, offset: u64) -> Result<Vec<Option<Status>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(query, limit, offset).await
    }
}

struct EmptyIndex;

#[async_trait]
impl IndexClient for EmptyIndex {
    async fn execute(&self, _query: &IndexQuery, _limit: u64, _offset: u64) -> Result<Vec<Option<Status>>> {
        Ok(Vec::new())
    }
}

struct NobodyLookup;

#[async_trait]
impl AccountLookup for NobodyLookup {
    async fn find_by_acct(&self, _username: &str, _domain: Option<&str>) -> Result<Option<Account>> {
        Ok(None)
    }
}

struct FakeResolver {
    resource: Option<Resource>,
    calls: AtomicUsize,
}

#[async_trait]
impl ResourceResolver for FakeResolver {
    async fn resolve(&self, _url: &str, _on_behalf_of: Option<&Account>) -> Result<Option<Resource>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.resource.clone())
    }
}

/// Every lookup fails as if the relationship store were unreachable
struct OfflineRelationships;

fn offline<T>() -> Result<T> {
    Err(Error::Other("relationship store offline".into()))
}

#[async_trait]
impl RelationshipStore for OfflineRelationships {
    async fn blocking_map(&self, _ids: &[AccountId], _viewer_id: AccountId) -> Result<HashMap<AccountId, bool>> {
        offline()
    }

    async fn blocked_by_map(&self, _ids: &[AccountId], _viewer_id: AccountId) -> Result<HashMap<AccountId, bool>> {
        offline()
    }

    async fn muting_map(&self, _ids: &[AccountId], _viewer_id: AccountId) -> Result<HashMap<AccountId, bool>> {
        offline()
    }

    async fn following_map(&self, _ids: &[AccountId], _viewer_id: AccountId) -> Result<HashMap<AccountId, bool>> {
        offline()
    }

    async fn domain_blocking_map(&self, _domains: &[String], _viewer_id: AccountId) -> Result<HashMap<String, bool>> {
        offline()
    }

    async fn following_ids(&self, _viewer_id: AccountId) -> Result<Vec<AccountId>> {
        offline()
    }
}

struct BrokenResolver;

#[async_trait]
impl ResourceResolver for BrokenResolver {
    async fn resolve(&self, _url: &str, _on_behalf_of: Option<&Account>) -> Result<Option<Resource>> {
        Err(Error::Other("fetch queue closed".into()))
    }
}

/// Service over the given relationship store and resolver, with found accounts and tags
fn service_with(
    relationships: Arc<dyn RelationshipStore>,
    resolver: Arc<dyn ResourceResolver>,
) -> (SearchService, Arc<FakeAccounts>) {
    let accounts = FakeAccounts::new(Outcome::Found);
    let statuses = StatusSearchBackend::new(
        Arc::new(StandardQueryCompiler::new(Arc::new(NobodyLookup))),
        CountingIndex::new(Arc::new(EmptyIndex)),
        relationships,
        Arc::new(StatusFilter::new()),
        "discoverable",
    );
    let service = SearchService::new(
        SearchSettings {
            index_enabled: true,
            ..Default::default()
        },
        resolver,
        AccountSearchBackend::new(accounts.clone()),
        statuses,
        TagSearchBackend::new(FakeTags::new(Outcome::Found)),
    );
    (service, accounts)
}

struct Harness {
    service: SearchService,
    accounts: Arc<FakeAccounts>,
    tags: Arc<FakeTags>,
    index: Arc<CountingIndex>,
    resolver: Arc<FakeResolver>,
    viewer: Account,
}

impl Harness {
    async fn new(accounts: Outcome, tags: Outcome, resolved: Option<Resource>) -> Self {
        Self::with_settings(
            SearchSettings {
                index_enabled: true,
                ..Default::default()
            },
            accounts,
            tags,
            resolved,
        )
        .await
    }

    async fn with_settings(
        settings: SearchSettings,
        accounts: Outcome,
        tags: Outcome,
        resolved: Option<Resource>,
    ) -> Self {
        let db = Database::in_memory().await.expect("Failed to create database");
        let accounts = FakeAccounts::new(accounts);
        let tags = FakeTags::new(tags);
        let index = CountingIndex::new(Arc::new(EmptyIndex));
        let resolver = Arc::new(FakeResolver {
            resource: resolved,
            calls: AtomicUsize::new(0),
        });

        let statuses = StatusSearchBackend::new(
            Arc::new(StandardQueryCompiler::new(Arc::new(NobodyLookup))),
            index.clone(),
            Arc::new(SqliteRelationshipRepository::new(db)),
            Arc::new(StatusFilter::new()),
            settings.visibility_scope.clone(),
        );

        let service = SearchService::new(
            settings,
            resolver.clone(),
            AccountSearchBackend::new(accounts.clone()),
            statuses,
            TagSearchBackend::new(tags.clone()),
        );

        Self {
            service,
            accounts,
            tags,
            index,
            resolver,
            viewer: Account::local(1, "viewer"),
        }
    }

    fn backend_calls(&self) -> (usize, usize, usize) {
        (
            self.accounts.calls.load(Ordering::SeqCst),
            self.index.calls(),
            self.tags.calls.load(Ordering::SeqCst),
        )
    }
}

// ========== Routing and policy ==========

#[tokio::test]
async fn test_blank_query_and_nonpositive_limit_call_nothing() {
    let h = Harness::new(Outcome::Found, Outcome::Found, None).await;
    let options = SearchOptions::new();

    for (query, limit) in [("   ", 20), ("rust", 0), ("rust", -5), ("", 10)] {
        let results = h
            .service
            .search(query, Some(&h.viewer), limit, &options)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    assert_eq!(h.backend_calls(), (0, 0, 0));
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_url_query_is_resolved_instead_of_searched() {
    let remote = Account::remote(9, "bob", "remote.example");
    let h = Harness::new(Outcome::Found, Outcome::Found, Some(Resource::Account(remote.clone()))).await;
    let options = SearchOptions::new().with_resolve(true);

    let results = h
        .service
        .search("https://remote.example/@bob", Some(&h.viewer), 20, &options)
        .await
        .unwrap();

    assert_eq!(results.accounts, vec![remote]);
    assert!(results.statuses.is_empty());
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.backend_calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_url_query_with_offset_skips_resolution() {
    let remote = Account::remote(9, "bob", "remote.example");
    let h = Harness::new(Outcome::Found, Outcome::Found, Some(Resource::Account(remote))).await;
    let options = SearchOptions::new()
        .with_resolve(true)
        .with_type(SearchType::Accounts)
        .with_offset(5);

    let results = h
        .service
        .search("https://remote.example/@bob", Some(&h.viewer), 20, &options)
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.backend_calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_url_resolution_respects_requested_type() {
    let remote = Account::remote(9, "bob", "remote.example");
    let h = Harness::new(Outcome::Found, Outcome::Found, Some(Resource::Account(remote))).await;
    let options = SearchOptions::new()
        .with_resolve(true)
        .with_type(SearchType::Statuses);

    let results = h
        .service
        .search("https://remote.example/@bob", Some(&h.viewer), 20, &options)
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_url_without_resolve_is_plain_text() {
    let h = Harness::new(Outcome::Found, Outcome::Found, None).await;
    let results = h
        .service
        .search("https://remote.example/@bob", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(results.accounts.len(), 1);
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_typed_search_only_calls_that_backend() {
    let h = Harness::new(Outcome::Found, Outcome::Found, None).await;
    let options = SearchOptions::new().with_type(SearchType::Accounts);

    let results = h
        .service
        .search("rust", Some(&h.viewer), 20, &options)
        .await
        .unwrap();

    assert_eq!(results.accounts.len(), 1);
    assert_eq!(h.backend_calls(), (1, 0, 0));
}

#[tokio::test]
async fn test_at_sign_never_routes_to_hashtags() {
    let h = Harness::new(Outcome::Found, Outcome::Found, None).await;
    let results = h
        .service
        .search("bob@remote.example", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap();

    assert!(results.hashtags.is_empty());
    assert_eq!(h.backend_calls(), (1, 1, 0));
}

#[tokio::test]
async fn test_statuses_need_index_and_viewer() {
    let h = Harness::with_settings(SearchSettings::default(), Outcome::Found, Outcome::Found, None).await;
    h.service
        .search("rust", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(h.backend_calls(), (1, 0, 1));

    let h = Harness::new(Outcome::Found, Outcome::Found, None).await;
    h.service
        .search("rust", None, 20, &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(h.backend_calls(), (1, 0, 1));
}

#[tokio::test]
async fn test_limit_is_clamped_and_offset_needs_type() {
    let h = Harness::new(Outcome::Found, Outcome::Found, None).await;

    h.service
        .search("rust", Some(&h.viewer), 500, &SearchOptions::new().with_offset(10))
        .await
        .unwrap();
    let (limit, options) = h.accounts.last.lock().unwrap().unwrap();
    assert_eq!(limit, 40);
    assert_eq!(options.offset, 0);

    h.service
        .search(
            "rust",
            Some(&h.viewer),
            5,
            &SearchOptions::new().with_type(SearchType::Accounts).with_offset(10),
        )
        .await
        .unwrap();
    let (limit, options) = h.accounts.last.lock().unwrap().unwrap();
    assert_eq!(limit, 5);
    assert_eq!(options.offset, 10);
}

#[tokio::test]
async fn test_one_rejection_is_tolerated() {
    let h = Harness::new(Outcome::Found, Outcome::Reject("tag"), None).await;
    let results = h
        .service
        .search("rust", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(results.accounts.len(), 1);
    assert!(results.hashtags.is_empty());
}

#[tokio::test]
async fn test_status_rejection_tolerated_when_accounts_succeed() {
    let h = Harness::new(Outcome::Found, Outcome::Found, None).await;
    let results = h
        .service
        .search("from:ghost", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap();

    assert_eq!(results.accounts.len(), 1);
    assert_eq!(h.index.calls(), 0);
}

#[tokio::test]
async fn test_all_rejections_return_the_latest() {
    let h = Harness::new(Outcome::Reject("acct"), Outcome::Reject("tag"), None).await;
    let err = h
        .service
        .search("\"open", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SyntaxRejection { ref fragment } if fragment == "tag"));

    // Without hashtags the status rejection is the latest
    let h = Harness::new(Outcome::Reject("acct"), Outcome::Reject("tag"), None).await;
    let err = h
        .service
        .search("\"open @someone", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SyntaxRejection { ref fragment } if fragment.starts_with('"')));
    assert_eq!(h.tags.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_zero_max_limit_calls_nothing() {
    let settings = SearchSettings {
        index_enabled: true,
        max_limit: 0,
        ..Default::default()
    };
    let h = Harness::with_settings(settings, Outcome::Found, Outcome::Found, None).await;
    let results = h
        .service
        .search("rust", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(h.backend_calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_unknown_visibility_scope_fails_despite_account_results() {
    let settings = SearchSettings {
        index_enabled: true,
        visibility_scope: "bogus".into(),
        ..Default::default()
    };
    let h = Harness::with_settings(settings, Outcome::Found, Outcome::Found, None).await;
    let err = h
        .service
        .search("alice", Some(&h.viewer), 20, &SearchOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(err.code(), "E100");
    assert_eq!(h.accounts.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.index.calls(), 0);
}

#[tokio::test]
async fn test_relationship_store_failure_propagates() {
    let (service, accounts) = service_with(Arc::new(OfflineRelationships), Arc::new(NoopResolver));
    let viewer = Account::local(1, "viewer");
    let err = service
        .search("rust", Some(&viewer), 20, &SearchOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Other(ref msg) if msg == "relationship store offline"));
    assert_eq!(accounts.calls.load(Ordering::SeqCst), 1);

    // Without a viewer status search is skipped and the store is never asked
    let results = service
        .search("rust", None, 20, &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(results.accounts.len(), 1);
}

#[tokio::test]
async fn test_resolver_failure_is_a_resolver_error() {
    let (service, accounts) = service_with(Arc::new(OfflineRelationships), Arc::new(BrokenResolver));
    let err = service
        .search(
            "https://remote.example/@bob",
            None,
            20,
            &SearchOptions::new().with_resolve(true),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Resolver(ref msg) if msg.contains("fetch queue closed")));
    assert_eq!(err.code(), "E201");
    assert_eq!(accounts.calls.load(Ordering::SeqCst), 0);
}

// ========== Full stack over SQLite ==========

struct Stack {
    db: Database,
    accounts: SqliteAccountRepository,
    statuses: SqliteStatusRepository,
    status_index: SqliteStatusIndex,
    tags: SqliteTagRepository,
    relationships: SqliteRelationshipRepository,
    index_calls: Arc<CountingIndex>,
    alice: Account,
    bob: Account,
    carol: Account,
}

impl Stack {
    async fn new() -> Self {
        let db = Database::in_memory().await.expect("Failed to create database");
        let accounts = SqliteAccountRepository::new(db.clone());
        let status_index = SqliteStatusIndex::new(db.clone());

        let alice = Account::local(1, "alice").discoverable(true);
        let bob = Account::local(2, "bob").discoverable(true);
        let carol = Account::remote(3, "carol", "remote.example").discoverable(true);
        for account in [&alice, &bob, &carol] {
            accounts.insert(account).await.unwrap();
        }

        Self {
            statuses: SqliteStatusRepository::new(db.clone()),
            tags: SqliteTagRepository::new(db.clone()),
            relationships: SqliteRelationshipRepository::new(db.clone()),
            index_calls: CountingIndex::new(Arc::new(status_index.clone())),
            status_index,
            accounts,
            db,
            alice,
            bob,
            carol,
        }
    }

    fn service(&self, scope: &str) -> SearchService {
        let settings = SearchSettings {
            index_enabled: true,
            visibility_scope: scope.to_string(),
            ..Default::default()
        };
        let relationships: Arc<dyn RelationshipStore> = Arc::new(self.relationships.clone());
        let statuses = StatusSearchBackend::new(
            Arc::new(StandardQueryCompiler::new(Arc::new(self.accounts.clone()))),
            self.index_calls.clone(),
            relationships,
            Arc::new(StatusFilter::new()),
            scope,
        );
        SearchService::new(
            settings,
            Arc::new(NoopResolver),
            AccountSearchBackend::new(Arc::new(self.accounts.clone())),
            statuses,
            TagSearchBackend::new(Arc::new(self.tags.clone())),
        )
    }

    async fn post(&self, status: Status) {
        self.statuses.insert(&status).await.unwrap();
        self.status_index.index_status(&status, &[]).await.unwrap();
    }

    async fn status_ids(&self, scope: &str, query: &str, options: SearchOptions) -> Vec<i64> {
        self.service(scope)
            .search(query, Some(&self.alice), 40, &options.with_type(SearchType::Statuses))
            .await
            .unwrap()
            .statuses
            .iter()
            .map(|s| s.id)
            .collect()
    }
}

fn day(d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_classic_scope_only_finds_own_and_involving_statuses() {
    let s = Stack::new().await;
    s.post(Status::new(1, s.alice.clone(), "rust by alice").with_created_at(day(1))).await;
    s.post(Status::new(2, s.bob.clone(), "rust by bob").with_created_at(day(2))).await;
    s.post(
        Status::new(3, s.bob.clone(), "rust for @alice")
            .with_mentions(vec![1])
            .with_created_at(day(3)),
    )
    .await;

    assert_eq!(s.status_ids("classic", "rust", SearchOptions::new()).await, vec![3, 1]);
    assert_eq!(s.status_ids("public", "rust", SearchOptions::new()).await, vec![3, 2, 1]);
}

#[tokio::test]
async fn test_id_window_is_exclusive() {
    let s = Stack::new().await;
    for id in [5, 10, 15, 20, 25] {
        s.post(Status::new(id, s.alice.clone(), "window").with_created_at(day(1))).await;
    }

    let options = SearchOptions::new().with_min_id(10).with_max_id(20);
    assert_eq!(s.status_ids("classic", "window", options).await, vec![15]);
}

#[tokio::test]
async fn test_blocked_viewer_never_reaches_index() {
    let s = Stack::new().await;
    s.post(Status::new(1, s.bob.clone(), "rust by bob")).await;
    s.relationships.block(s.bob.id, s.alice.id).await.unwrap();

    assert!(s.status_ids("public", "from:bob rust", SearchOptions::new()).await.is_empty());
    assert_eq!(s.index_calls.calls(), 0);

    // Negated authors are not a reason to skip the search
    s.status_ids("public", "-from:bob rust", SearchOptions::new()).await;
    assert_eq!(s.index_calls.calls(), 1);
}

#[tokio::test]
async fn test_from_operator_and_unknown_author() {
    let s = Stack::new().await;
    s.post(Status::new(1, s.bob.clone(), "rust by bob").with_created_at(day(1))).await;
    s.post(Status::new(2, s.carol.clone(), "rust by carol").with_created_at(day(2))).await;

    assert_eq!(
        s.status_ids("public", "rust from:carol@remote.example", SearchOptions::new()).await,
        vec![2]
    );

    let err = s
        .service("public")
        .search(
            "from:ghost",
            Some(&s.alice),
            20,
            &SearchOptions::new().with_type(SearchType::Statuses),
        )
        .await
        .unwrap_err();
    assert!(err.is_syntax_rejection());
}

#[tokio::test]
async fn test_relationship_filters_apply_after_fetch() {
    let s = Stack::new().await;
    s.post(Status::new(1, s.bob.clone(), "rust by bob").with_created_at(day(1))).await;
    s.post(Status::new(2, s.carol.clone(), "rust by carol").with_created_at(day(2))).await;
    s.post(
        Status::new(3, s.bob.clone(), "rust but private")
            .with_visibility(Visibility::Private)
            .with_created_at(day(3)),
    )
    .await;

    assert_eq!(s.status_ids("public", "rust", SearchOptions::new()).await, vec![2, 1]);

    s.relationships.mute(s.alice.id, s.bob.id).await.unwrap();
    s.relationships.block_domain(s.alice.id, "remote.example").await.unwrap();
    assert!(s.status_ids("public", "rust", SearchOptions::new()).await.is_empty());
}

#[tokio::test]
async fn test_dangling_index_entries_are_dropped() {
    let s = Stack::new().await;
    s.post(Status::new(1, s.alice.clone(), "kept").with_created_at(day(1))).await;
    s.post(Status::new(2, s.alice.clone(), "kept too").with_created_at(day(2))).await;
    s.statuses.delete(2).await.unwrap();

    assert_eq!(s.status_ids("classic", "kept", SearchOptions::new()).await, vec![1]);
}

#[tokio::test]
async fn test_unified_search_over_sqlite() {
    let s = Stack::new().await;
    s.tags.insert(&Tag::new(1, "rustlang")).await.unwrap();
    s.post(Status::new(1, s.alice.clone(), "learning rustlang")).await;

    let results = s
        .service("classic")
        .search("rustlang", Some(&s.alice), 20, &SearchOptions::new())
        .await
        .unwrap();

    assert!(results.accounts.is_empty());
    assert_eq!(results.statuses.len(), 1);
    assert_eq!(results.hashtags.len(), 1);

    let results = s
        .service("classic")
        .search("bo", Some(&s.alice), 20, &SearchOptions::new())
        .await
        .unwrap();
    assert_eq!(results.accounts.len(), 1);
    assert_eq!(results.accounts[0].username, "bob");
}

#[tokio::test]
async fn test_offset_beyond_signed_range_is_past_the_end() {
    let s = Stack::new().await;
    s.tags.insert(&Tag::new(1, "rustlang")).await.unwrap();
    s.post(Status::new(1, s.alice.clone(), "learning rustlang")).await;

    let options = SearchOptions::new().with_offset(u64::MAX);
    let service = s.service("classic");
    for search_type in [SearchType::Accounts, SearchType::Statuses, SearchType::Hashtags] {
        let results = service
            .search("rustlang", Some(&s.alice), 20, &options.clone().with_type(search_type))
            .await
            .unwrap();
        assert!(results.is_empty());
    }
    assert_eq!(s.status_ids("classic", "rustlang", SearchOptions::new()).await, vec![1]);
}

#[tokio::test]
async fn test_relationship_maps_are_deterministic() {
    let s = Stack::new().await;
    s.relationships.follow(s.alice.id, s.bob.id).await.unwrap();
    s.relationships.block(s.carol.id, s.alice.id).await.unwrap();

    let builder = RelationshipMapBuilder::new(Arc::new(s.relationships.clone()));
    let ids = [s.carol.id, s.bob.id, s.bob.id];
    let domains = ["remote.example".to_string()];

    let first = builder.build(s.alice.id, &ids, &domains).await.unwrap();
    let second = builder.build(s.alice.id, &ids, &domains).await.unwrap();

    assert_eq!(first, second);
    assert!(first.is_following(s.bob.id));
    assert!(first.is_blocked_by(s.carol.id));
    assert!(!first.is_domain_blocking("remote.example"));
    assert_eq!(s.db.migration_status().await.unwrap().current_version, 2);
}
