//! Search query language
//!
//! - `parser`: tokenizes free text
//! - `compiler`: the `QueryCompiler` / `CompiledQuery` boundary and the default compiler
//! - `index`: the `IndexQuery` builder compiled queries are written into

pub mod compiler;
pub mod index;
pub mod parser;

pub use compiler::{
    AccountLookup, Author, CompiledQuery, QueryCompiler, QueryTerm, StandardQuery,
    StandardQueryCompiler, Term,
};
pub use index::{BoolQuery, Clause, FieldValue, IndexField, IndexQuery, RangeBounds};
pub use parser::{QueryParser, Token, TokenKind};
