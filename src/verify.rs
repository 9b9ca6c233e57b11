//! Field existence verification
//! ----------------------------
//! Answers "is this value already taken?" for uniqueness checks on insert and update:
//! does a record exist whose `column` equals `value` (byte-wise, after trimming the
//! value), optionally ignoring soft-deleted records and optionally ignoring one record
//! by id (the record being updated).
//!
//! Concurrency caveat: the check and the caller's subsequent write are not atomic. Two
//! concurrent callers can both observe "not exists" and both insert. Callers that need
//! a hard guarantee must back the column with a unique constraint in the store.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::VerifierConfig;
use crate::error::{VerifyError, VerifyResult};
use crate::ident::{IdentifierGuard, SqlIdentifierGuard};
use crate::query::{ExistenceQuery, Field};
use crate::store::RecordStore;

/// Stateless existence checker. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct FieldVerifier {
    config: VerifierConfig,
    guard: Arc<dyn IdentifierGuard>,
}

impl Default for FieldVerifier {
    fn default() -> Self { Self::new(VerifierConfig::default()) }
}

impl FieldVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config, guard: Arc::new(SqlIdentifierGuard) }
    }

    /// Replace the identifier guard. The guard is still consulted on every call.
    pub fn with_guard(mut self, guard: impl IdentifierGuard + 'static) -> Self {
        self.guard = Arc::new(guard);
        self
    }

    pub fn config(&self) -> &VerifierConfig { &self.config }

    pub fn not_delete_flag(&self) -> &str { &self.config.not_delete_flag }

    /// Does a record with `column == value` exist? No soft-delete filter, no exclusion.
    pub fn exists_simple<E, K, S>(&self, store: &S, id: &Field<E, K>, column: &str, value: Option<&str>) -> VerifyResult<bool>
    where
        S: RecordStore<E> + ?Sized,
        K: PartialEq + Debug,
    {
        self.exists::<E, K, (), S>(store, id, None, None, column, value)
    }

    /// Like [`exists_simple`](Self::exists_simple), ignoring soft-deleted records.
    pub fn exists_live<E, K, L, S>(
        &self,
        store: &S,
        id: &Field<E, K>,
        soft_delete: Option<&Field<E, L>>,
        column: &str,
        value: Option<&str>,
    ) -> VerifyResult<bool>
    where
        S: RecordStore<E> + ?Sized,
        K: PartialEq + Debug,
    {
        self.exists(store, id, soft_delete, None, column, value)
    }

    /// Full check.
    ///
    /// * `id` - primary key field; the only column selected.
    /// * `soft_delete` - when present, only records whose column equals the configured
    ///   not-deleted flag are considered.
    /// * `exclude_id` - when present and equal to the first matching record's id, that
    ///   match does not count.
    /// * `column` - store column name; must pass the identifier guard.
    /// * `value` - required; compared after trimming, case-sensitively.
    ///
    /// Guard and argument failures are returned before the store is touched. Store
    /// errors are returned as [`VerifyError::Store`] with the original error intact.
    pub fn exists<E, K, L, S>(
        &self,
        store: &S,
        id: &Field<E, K>,
        soft_delete: Option<&Field<E, L>>,
        exclude_id: Option<&K>,
        column: &str,
        value: Option<&str>,
    ) -> VerifyResult<bool>
    where
        S: RecordStore<E> + ?Sized,
        K: PartialEq + Debug,
    {
        let query = self.build_query(id, soft_delete, column, value)?;
        debug!(target: "recordkit::verify", "exists: select={:?} filters={:?}", query.select, query.filters);

        let records = store.list(&query)?;
        let Some(first) = records.first() else {
            debug!(target: "recordkit::verify", "exists: column={} no match", column);
            return Ok(false);
        };
        let matched = id.get(first);
        let found = exclude_id.map_or(true, |ex| *ex != matched);
        debug!(
            target: "recordkit::verify",
            "exists: column={} matches={} first_id={:?} exclude_id={:?} -> {}",
            column, records.len(), matched, exclude_id, found
        );
        Ok(found)
    }

    /// Validate inputs and assemble the existence query without running it.
    pub fn build_query<E, K, L>(
        &self,
        id: &Field<E, K>,
        soft_delete: Option<&Field<E, L>>,
        column: &str,
        value: Option<&str>,
    ) -> VerifyResult<ExistenceQuery> {
        if let Err(reason) = self.guard.check(column) {
            warn!(target: "recordkit::verify", "rejected column identifier {:?}: {}", column, reason);
            return Err(VerifyError::security("unsafe_identifier".to_string(), format!("column {:?} rejected: {}", column, reason)));
        }
        let Some(value) = value else {
            return Err(VerifyError::invalid("missing_value", "field value must not be null"));
        };

        let mut query = ExistenceQuery::new().select(id.name());
        if let Some(sd) = soft_delete {
            query = query.eq(sd.name(), self.config.not_delete_flag.as_str());
        }
        Ok(query.eq_binary(column, value.trim()))
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod verify_tests;
