//! Local caching of the organization snapshot.
//!
//! The server identifies each snapshot of the initial data (employees,
//! company groups, field configs) with an opaque hash. `InitialDataStore`
//! sends the hash it holds; when the server confirms it, the cached snapshot
//! is reused and nothing is downloaded or decompressed. Otherwise the
//! compressed payload replaces the snapshot.
//!
//! Persistence is best-effort: a full storage quota leaves the fresh snapshot
//! in memory for the rest of the session.

pub mod initial_data;

pub use initial_data::{FetchOutcome, InitialDataSource, InitialDataStore};
