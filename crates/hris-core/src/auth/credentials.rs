//! Remembered sign-in passwords.
//!
//! Signing in with "remember me" saves the password in the OS keychain under
//! the username. The next sign-in for that username uses it without a prompt.
//! A password the server rejects, and the password of a user who signs out,
//! is forgotten again.

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "hris-client";

pub struct CredentialStore;

impl CredentialStore {
    fn entry(username: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, username)
            .with_context(|| format!("Failed to open keychain entry for {}", username))
    }

    /// Save the password of a "remember me" sign-in.
    pub fn remember(username: &str, password: &str) -> Result<()> {
        Self::entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")?;
        debug!(username = username, "Password remembered");
        Ok(())
    }

    /// The remembered password for `username`, `None` when there is none or
    /// the keychain cannot be read.
    pub fn remembered_password(username: &str) -> Option<String> {
        let entry = match Self::entry(username) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Keychain unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(password) => Some(password),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(username = username, error = %e, "Failed to read remembered password");
                None
            }
        }
    }

    /// Drop the remembered password. Nothing remembered is not an error;
    /// keychain failures are logged and otherwise ignored so they never block
    /// a sign-in or sign-out.
    pub fn forget(username: &str) {
        let result = Self::entry(username).and_then(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        });
        match result {
            Ok(()) => debug!(username = username, "Remembered password forgotten"),
            Err(e) => warn!(username = username, error = %e, "Failed to forget password"),
        }
    }
}
