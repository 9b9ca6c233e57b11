pub mod collections;
pub mod projection;
pub mod ident;
pub mod query;
pub mod store;
pub mod config;
pub mod error;
pub mod verify;

pub use config::VerifierConfig;
pub use error::{VerifyError, VerifyResult};
pub use query::{Collation, Dialect, ExistenceQuery, Field};
pub use store::{MemoryStore, RecordStore, Row};
pub use verify::FieldVerifier;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

// Test-only printing helper: expands to tprintln! during tests and is absent otherwise.
// Usage in tests: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
