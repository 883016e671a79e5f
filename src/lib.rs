//! Single-file JSON document store with a read-side user directory.
//!
//! A [`DocumentStore`] owns one JSON array on disk and swaps it wholesale; a
//! [`RecordDirectory`] loads that array and answers login, lookup, validation
//! and statistics queries over user-shaped records.
//!
//! ```rust,no_run
//! use json_roster::{DocumentStore, RecordDirectory};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = Arc::new(DocumentStore::open("data/data.json").unwrap());
//! store.update(|doc| doc.push(json!({"nom": "Jo", "age": "10"}))).unwrap();
//!
//! let directory = RecordDirectory::new(Arc::clone(&store));
//! directory.load();
//! println!("{:?}", directory.validate());
//! ```
//!
//! **Single-process only.** Writers inside one process are serialized by the
//! store's lock; separate processes sharing the file are not.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod directory;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod persist;
pub mod record;
pub mod serializer;
pub mod store;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod gateway;

pub use directory::{DemoCredential, Loaded, Mode, RecordDirectory, Statistics, ValidationReport};
pub use error::{Error, Result};
pub use extract::{extract_array, extract_array_or_empty};
pub use record::{Record, Role, Status};
pub use store::{DocumentStore, DocumentStoreBuilder};

/// The unit of persistence: an ordered array of records.
pub type Document = Vec<serde_json::Value>;
