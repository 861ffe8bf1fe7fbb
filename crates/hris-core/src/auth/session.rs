use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{LoginResponse, User};
use crate::storage::{KeyValueStore, StorageError, TOKEN_KEY, USER_KEY};

/// Bearer token and profile of the signed-in user, mirrored to storage.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    token: Option<String>,
    user: Option<User>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            token: None,
            user: None,
        }
    }

    /// Adopt a successful sign-in and persist it.
    pub fn set_auth_data(&mut self, response: &LoginResponse) -> Result<(), StorageError> {
        let user = User::from(response);
        let user_json = serde_json::to_string(&user)?;

        self.token = Some(response.token.clone());
        self.user = Some(user);

        self.storage.set(TOKEN_KEY, &response.token)?;
        self.storage.set(USER_KEY, &user_json)?;
        debug!(employee_id = %response.employee_id, "Stored session");
        Ok(())
    }

    /// Restore a persisted session. Returns whether one was found.
    ///
    /// Both the token and the user profile must be present; an unreadable
    /// profile is treated as no session.
    pub fn load_auth_data(&mut self) -> Result<bool, StorageError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(false);
        };

        match serde_json::from_str::<User>(&user) {
            Ok(user) => {
                self.token = Some(token);
                self.user = Some(user);
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse stored user profile");
                Ok(false)
            }
        }
    }

    /// Forget the session in memory and in storage.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.token = None;
        self.user = None;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Employee id of the signed-in user.
    pub fn employee_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.employee_id.as_str())
    }
}
