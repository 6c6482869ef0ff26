//! Infrastructure layer
//!
//! SQLite implementations of the collaborator traits the search domain
//! depends on.

pub mod accounts;
pub mod relationships;
pub mod statuses;
pub mod tags;

pub use accounts::SqliteAccountRepository;
pub use relationships::SqliteRelationshipRepository;
pub use statuses::{SqliteStatusIndex, SqliteStatusRepository};
pub use tags::SqliteTagRepository;

/// Escape `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Convert a `LIMIT`/`OFFSET` count to SQLite's signed integer,
/// saturating instead of wrapping to a negative value
pub(crate) fn sql_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
