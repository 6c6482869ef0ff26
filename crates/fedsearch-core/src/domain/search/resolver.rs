//! Remote resource resolution

use async_trait::async_trait;

use super::entity::Resource;
use crate::domain::social::Account;
use crate::error::Result;

/// Resolves a URL to a local representation of a remote account, status or tag
///
/// Implementations return `Ok(None)` for anything that cannot be resolved
/// (unreachable host, unsupported document, validation failure). `Err` is
/// reserved for failures of the resolver's own infrastructure; the search
/// aborts with `Error::Resolver`.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    async fn resolve(&self, url: &str, on_behalf_of: Option<&Account>) -> Result<Option<Resource>>;
}

/// Resolver for deployments without federation; resolves nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

#[async_trait]
impl ResourceResolver for NoopResolver {
    async fn resolve(&self, _url: &str, _on_behalf_of: Option<&Account>) -> Result<Option<Resource>> {
        Ok(None)
    }
}

/// Whether `query` has the shape of an http(s) URL
pub fn is_url_query(query: &str) -> bool {
    let lower = query.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(rest) => !rest.is_empty() && !rest.chars().any(char::is_whitespace),
        None => false,
    }
}
