//! HRIS client core.
//!
//! Everything a front-end needs to talk to the HRIS backend:
//!
//! - `api`: REST client (sign-in, initial data, holidays, leave, work blocks)
//! - `cache`: the hash-validated initial-data snapshot store
//! - `org`: subordinate trees and TEAM/PART org charts built from the snapshot
//! - `auth`: session persistence and remembered credentials
//! - `storage`: the durable key-value capability the stores persist through
//! - `routes`: screens and the authentication guard
//!
//! The library logs through `tracing` but never installs a subscriber.

pub mod api;
pub mod auth;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod org;
pub mod routes;
pub mod storage;

pub use config::Config;
pub use error::HrisError;
