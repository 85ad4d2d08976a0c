//! Embedded file-backed JSON document store.
//!
//! Records are JSON documents grouped into named collections. Each collection
//! is a directory under the store root and each record a pretty-printed file
//! inside it:
//!
//! ```text
//! <root>/
//!   <collection>/
//!     <resource>.json       -- indented JSON, trailing newline
//!     <resource>.json.tmp   -- transient, present only mid-write
//! ```
//!
//! # Design Rules
//!
//! 1. Writes go to a temporary sibling and are renamed into place, so readers
//!    never observe a partially written record.
//! 2. Writes and deletes are serialized per collection; different collections
//!    proceed independently.
//! 3. Reads take no lock. Last writer wins.
//! 4. Locking is in-memory only; one process per store root.
//! 5. All errors are returned to the caller, never retried or suppressed.
//!
//! ```no_run
//! use jsondrive_store::Store;
//! use serde_json::json;
//!
//! let store = Store::new("./db")?;
//! store.write("users", "rohan", &json!({"name": "Rohan", "age": 18}))?;
//! let user: serde_json::Value = store.read("users", "rohan")?;
//! let everyone = store.read_all("users")?;
//! store.delete("users", "rohan")?;
//! # Ok::<(), jsondrive_store::StoreError>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod logger;
pub mod names;

mod locks;
mod store;

pub use config::{StoreConfig, StoreOptions};
pub use error::{Result, StoreError};
pub use logger::{LogLevel, Logger, TracingLogger, TARGET as LOG_TARGET};
pub use store::Store;

/// Version of the store crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
