//! Existence query contract
//! ------------------------
//! The one query shape issued by the verifier: select a set of columns, AND-combine
//! equality filters, each filter carrying its own comparison mode. Values are always
//! bound parameters; column and table names are validated identifiers and are quoted
//! when rendered to SQL.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};
use crate::ident::{IdentifierGuard, SqlIdentifierGuard};

/// Named column of entity `E` together with its in-memory accessor.
pub struct Field<E, T> {
    name: Cow<'static, str>,
    getter: fn(&E) -> T,
}

impl<E, T> Field<E, T> {
    pub const fn new(name: &'static str, getter: fn(&E) -> T) -> Self {
        Self { name: Cow::Borrowed(name), getter }
    }

    pub fn named(name: impl Into<String>, getter: fn(&E) -> T) -> Self {
        Self { name: Cow::Owned(name.into()), getter }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn get(&self, entity: &E) -> T { (self.getter)(entity) }
}

impl<E, T> Clone for Field<E, T> {
    fn clone(&self) -> Self { Self { name: self.name.clone(), getter: self.getter } }
}

impl<E, T> fmt::Debug for Field<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// How a string equality filter compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collation {
    /// Whatever the store does by default (often case-insensitive).
    #[default]
    Default,
    /// Byte-wise comparison; values differing only in case are distinct.
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqFilter {
    pub column: String,
    pub value: String,
    #[serde(default)]
    pub collation: Collation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceQuery {
    pub select: Vec<String>,
    pub filters: Vec<EqFilter>,
}

impl ExistenceQuery {
    pub fn new() -> Self { Self::default() }

    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.select.push(column.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(EqFilter { column: column.into(), value: value.into(), collation: Collation::Default });
        self
    }

    pub fn eq_binary(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(EqFilter { column: column.into(), value: value.into(), collation: Collation::Binary });
        self
    }

    /// Render as a parameterized statement. Returns the SQL text and the bound
    /// parameters in placeholder order. Every identifier (table included) is checked
    /// by the default guard before being quoted.
    pub fn to_sql(&self, table: &str, dialect: Dialect) -> VerifyResult<(String, Vec<String>)> {
        self.to_sql_guarded(table, dialect, &SqlIdentifierGuard)
    }

    pub fn to_sql_guarded(&self, table: &str, dialect: Dialect, guard: &dyn IdentifierGuard) -> VerifyResult<(String, Vec<String>)> {
        let checked = |ident: &str| -> VerifyResult<String> {
            guard.check(ident).map_err(|e| VerifyError::security("unsafe_identifier".to_string(), format!("{}: {}", ident, e)))?;
            Ok(dialect.quote_ident(ident))
        };
        let cols = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select.iter().map(|c| checked(c)).collect::<VerifyResult<Vec<_>>>()?.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", cols, checked(table)?);
        let mut params = Vec::with_capacity(self.filters.len());
        for (i, f) in self.filters.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            let col = checked(&f.column)?;
            params.push(f.value.clone());
            let ph = dialect.placeholder(params.len());
            match f.collation {
                Collation::Default => sql.push_str(&format!("{} = {}", col, ph)),
                Collation::Binary => sql.push_str(&dialect.binary_eq(&col, &ph)),
            }
        }
        Ok((sql, params))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    /// Quote an identifier, doubling any embedded quote character. Dotted names are
    /// quoted per segment.
    pub fn quote_ident(&self, ident: &str) -> String {
        let q = match self { Dialect::Postgres => '"', Dialect::MySql => '`' };
        ident
            .split('.')
            .map(|part| {
                let escaped = part.replace(q, &format!("{q}{q}"));
                format!("{q}{escaped}{q}")
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            Dialect::MySql => "?".to_string(),
        }
    }

    fn binary_eq(&self, col: &str, ph: &str) -> String {
        match self {
            Dialect::Postgres => format!("{} COLLATE \"C\" = {}", col, ph),
            Dialect::MySql => format!("BINARY {} = {}", col, ph),
        }
    }
}
