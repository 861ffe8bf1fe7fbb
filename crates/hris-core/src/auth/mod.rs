//! Authentication state.
//!
//! This module provides:
//! - `SessionStore`: Bearer token and user profile, persisted through a
//!   `KeyValueStore`
//! - `CredentialStore`: Remembered passwords in the OS keychain via keyring

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::SessionStore;
