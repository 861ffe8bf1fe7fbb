//! REST API client for the HRIS backend.
//!
//! This module provides the `ApiClient` used to sign in, fetch the initial
//! data snapshot, holidays, leave balances and work blocks.
//!
//! Requests normally go through the same-origin proxy, which rewrites the
//! `/api` prefix to the backend's `/v1`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
