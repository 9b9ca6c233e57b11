use super::*;
use crate::query::{Collation, Field};
use anyhow::Result;
use std::cell::Cell;

// Typed entity backed by a hand-rolled store, to check the verifier against a
// non-JSON record type and numeric ids.
#[derive(Debug, Clone)]
struct Account {
    id: u64,
    email: String,
    removed: u8,
}

struct AccountTable {
    rows: Vec<Account>,
    calls: Cell<u32>,
}

impl AccountTable {
    fn new(rows: Vec<Account>) -> Self { Self { rows, calls: Cell::new(0) } }
}

impl RecordStore<Account> for AccountTable {
    fn list(&self, query: &ExistenceQuery) -> Result<Vec<Account>> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(query.select, vec!["id".to_string()]);
        Ok(self
            .rows
            .iter()
            .filter(|a| {
                query.filters.iter().all(|f| {
                    let v = match f.column.as_str() {
                        "email" => a.email.clone(),
                        "removed" => a.removed.to_string(),
                        other => panic!("unexpected column {}", other),
                    };
                    match f.collation {
                        Collation::Binary => v == f.value,
                        Collation::Default => v.eq_ignore_ascii_case(&f.value),
                    }
                })
            })
            .cloned()
            .collect())
    }
}

const ID: Field<Account, u64> = Field::new("id", |a| a.id);
const REMOVED: Field<Account, u8> = Field::new("removed", |a| a.removed);

fn table() -> AccountTable {
    AccountTable::new(vec![
        Account { id: 10, email: "a@x.io".into(), removed: 0 },
        Account { id: 11, email: "b@x.io".into(), removed: 1 },
    ])
}

#[test]
fn query_shape_selects_id_and_binds_trimmed_value() {
    let v = FieldVerifier::default();
    let q = v.build_query(&ID, Some(&REMOVED), "email", Some("  a@x.io ")).unwrap();
    assert_eq!(q.select, vec!["id".to_string()]);
    assert_eq!(q.filters.len(), 2);
    assert_eq!((q.filters[0].column.as_str(), q.filters[0].value.as_str()), ("removed", "0"));
    assert_eq!(q.filters[0].collation, Collation::Default);
    assert_eq!((q.filters[1].column.as_str(), q.filters[1].value.as_str()), ("email", "a@x.io"));
    assert_eq!(q.filters[1].collation, Collation::Binary);
}

#[test]
fn no_soft_delete_field_means_no_flag_filter() {
    let v = FieldVerifier::default();
    let q = v.build_query::<Account, u64, ()>(&ID, None, "email", Some("a")).unwrap();
    assert_eq!(q.filters.len(), 1);
}

#[test]
fn numeric_ids_and_exclusion() {
    let t = table();
    let v = FieldVerifier::default();
    assert!(v.exists_simple(&t, &ID, "email", Some("a@x.io")).unwrap());
    assert!(!v.exists(&t, &ID, Some(&REMOVED), Some(&10), "email", Some("a@x.io")).unwrap());
    assert!(v.exists(&t, &ID, Some(&REMOVED), Some(&99), "email", Some("a@x.io")).unwrap());
    assert_eq!(t.calls.get(), 3);
}

#[test]
fn soft_deleted_rows_are_ignored_with_configured_flag() {
    let t = table();
    let v = FieldVerifier::default();
    assert!(v.exists_simple(&t, &ID, "email", Some("b@x.io")).unwrap());
    assert!(!v.exists_live(&t, &ID, Some(&REMOVED), "email", Some("b@x.io")).unwrap());

    // a store where "1" means live
    let inverted = FieldVerifier::new(VerifierConfig::new("1"));
    assert!(inverted.exists_live(&t, &ID, Some(&REMOVED), "email", Some("b@x.io")).unwrap());
    assert!(!inverted.exists_live(&t, &ID, Some(&REMOVED), "email", Some("a@x.io")).unwrap());
}

#[test]
fn guard_and_value_failures_skip_the_store() {
    let t = table();
    let v = FieldVerifier::default();
    let err = v.exists_simple(&t, &ID, "email; DROP TABLE accounts", Some("a")).unwrap_err();
    assert!(err.is_security_violation());
    let err = v.exists_simple(&t, &ID, "email", None).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(t.calls.get(), 0);
}

#[test]
fn unsafe_column_wins_over_missing_value() {
    let t = table();
    let err = FieldVerifier::default().exists_simple(&t, &ID, "--", None).unwrap_err();
    assert!(err.is_security_violation());
}

#[test]
fn custom_guard_is_consulted() {
    struct OnlyEmail;
    impl IdentifierGuard for OnlyEmail {
        fn check(&self, ident: &str) -> Result<(), crate::ident::IdentRejection> {
            if ident == "email" { Ok(()) } else { Err(crate::ident::IdentRejection::Shape) }
        }
    }
    let t = table();
    let v = FieldVerifier::default().with_guard(OnlyEmail);
    assert!(v.exists_simple(&t, &ID, "email", Some("a@x.io")).unwrap());
    assert!(v.exists_simple(&t, &ID, "removed", Some("0")).unwrap_err().is_security_violation());
}

#[test]
fn verifier_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FieldVerifier>();
}
