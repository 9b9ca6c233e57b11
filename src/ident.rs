//! Column identifier validation
//! ----------------------------
//! Single gate for identifiers that end up in a query as names rather than bound
//! parameters. An identifier is accepted only when it has plain column shape
//! (`[A-Za-z_][A-Za-z0-9_]*`, optionally one `qualifier.` prefix), is not a SQL keyword,
//! and carries no statement terminator, comment opener or quote.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Longest identifier accepted (MySQL's limit; Postgres truncates at 63).
pub const MAX_IDENT_LEN: usize = 64;

static IDENT_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("identifier regex")
});

// Statement verbs and operators that change query structure when interpolated.
static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "select", "insert", "update", "delete", "drop", "truncate", "create", "alter", "grant",
        "revoke", "deny", "call", "exec", "execute", "declare", "show", "rename", "set", "union",
        "into", "from", "where", "and", "or", "not", "like", "between", "having", "group",
        "order", "limit", "offset", "join", "table", "database", "procedure", "trigger",
        "sleep", "benchmark", "waitfor", "delay", "binary", "collate", "null", "true", "false",
    ]
    .into_iter()
    .collect()
});

const FORBIDDEN_SEQUENCES: [&str; 7] = [";", "--", "/*", "*/", "#", "'", "\""];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentRejection {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier exceeds 64 characters")]
    TooLong,
    #[error("identifier contains forbidden sequence '{0}'")]
    ForbiddenSequence(&'static str),
    #[error("identifier '{0}' is a reserved keyword")]
    Keyword(String),
    #[error("identifier is not a plain column name")]
    Shape,
}

/// Validate `ident` as a column (or `qualifier.column`) name.
pub fn validate_identifier(ident: &str) -> Result<(), IdentRejection> {
    if ident.trim().is_empty() { return Err(IdentRejection::Empty); }
    if ident.len() > MAX_IDENT_LEN { return Err(IdentRejection::TooLong); }
    if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|s| ident.contains(**s)) {
        return Err(IdentRejection::ForbiddenSequence(*seq));
    }
    if !IDENT_SHAPE.is_match(ident) { return Err(IdentRejection::Shape); }
    for part in ident.split('.') {
        let lower = part.to_ascii_lowercase();
        if KEYWORDS.contains(lower.as_str()) { return Err(IdentRejection::Keyword(part.to_string())); }
    }
    Ok(())
}

#[inline]
pub fn is_safe_identifier(ident: &str) -> bool { validate_identifier(ident).is_ok() }

/// Gate consulted before an identifier is used in a query.
pub trait IdentifierGuard: Send + Sync {
    fn check(&self, ident: &str) -> Result<(), IdentRejection>;

    fn is_safe(&self, ident: &str) -> bool { self.check(ident).is_ok() }
}

/// Default allow-list guard backed by [`validate_identifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlIdentifierGuard;

impl IdentifierGuard for SqlIdentifierGuard {
    fn check(&self, ident: &str) -> Result<(), IdentRejection> { validate_identifier(ident) }
}
