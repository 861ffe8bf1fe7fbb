//! Application state shared by all commands.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use hris_core::api::ApiClient;
use hris_core::auth::{CredentialStore, SessionStore};
use hris_core::cache::{FetchOutcome, InitialDataStore};
use hris_core::models::{CachedInitialData, LoginRequest};
use hris_core::routes::{guard, Navigation, Route};
use hris_core::storage::{FileStore, KeyValueStore};
use hris_core::Config;
use tracing::{debug, info, warn};

/// Subdirectory of the cache directory holding the key-value files.
const STORAGE_DIR: &str = "storage";

pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub initial_data: InitialDataStore,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api = %config.api_base_url, language = %config.language, "Config loaded");

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let storage: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::new(cache_dir.join(STORAGE_DIR))
                .context("Failed to open local storage")?
                .with_quota(config.storage_quota_bytes),
        );

        let mut session = SessionStore::new(storage.clone());
        match session.load_auth_data() {
            Ok(found) => debug!(found, "Session loaded"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        let mut api = ApiClient::new(config.api_base_url.clone())?;
        if let Some(token) = session.token() {
            api.set_token(token.to_string());
        }

        let mut initial_data = InitialDataStore::new(storage);
        if let Some(data) = initial_data.load_from_cache() {
            debug!(employees = data.employees().len(), "Cached initial data loaded");
        }

        Ok(Self {
            config,
            session,
            api,
            initial_data,
        })
    }

    /// Run the route guard for a command's screen.
    pub fn authorize(&mut self, route: Route) -> Result<()> {
        match guard(route, &mut self.session) {
            Navigation::Proceed => {
                if let Some(token) = self.session.token() {
                    self.api.set_token(token.to_string());
                }
                Ok(())
            }
            Navigation::Redirect(Route::Login) => {
                bail!("Not signed in. Run `hris login <username>` first.")
            }
            Navigation::Redirect(_) => {
                let who = self.session.user().map(|u| u.username.as_str()).unwrap_or("someone");
                bail!("Already signed in as {}. Run `hris logout` first.", who)
            }
        }
    }

    pub async fn login(&mut self, username: Option<String>, remember: bool) -> Result<()> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(u) => u,
            None => prompt_username()?,
        };

        let remembered = CredentialStore::remembered_password(&username);
        let used_remembered = remembered.is_some();
        let password = match remembered {
            Some(stored) => {
                debug!("Using remembered password");
                stored
            }
            None => rpassword::prompt_password("Password: ")?,
        };

        let request = LoginRequest {
            username: username.clone(),
            password: password.clone(),
            remember_me: remember,
        };
        let response = match self.api.sign_in(&request).await {
            Ok(r) => r,
            Err(e) => {
                // A stale remembered password must not lock the user out.
                if used_remembered {
                    CredentialStore::forget(&username);
                }
                return Err(e);
            }
        };
        if response.token.is_empty() {
            bail!("Sign-in returned no token");
        }

        self.session
            .set_auth_data(&response)
            .context("Failed to save session")?;
        self.api.set_token(response.token.clone());

        if remember {
            if let Err(e) = CredentialStore::remember(&username, &password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!(employee_id = %response.employee_id, "Login successful");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(username) = self.session.user().map(|u| u.username.clone()) {
            CredentialStore::forget(&username);
        }
        self.session.logout().context("Failed to clear session")?;
        self.api.clear_token();
        info!("Logged out");
        Ok(())
    }

    /// Language for the next fetch: explicit, else the one used last, else
    /// the configured default.
    fn language(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| self.initial_data.stored_language())
            .unwrap_or_else(|| self.config.language.clone())
    }

    pub async fn sync(&mut self, language: Option<&str>) -> Result<FetchOutcome> {
        let language = self.language(language);
        let outcome = self
            .initial_data
            .fetch_initial_data(&self.api, &language)
            .await?;
        Ok(outcome)
    }

    /// The current snapshot, fetching it first if none is held.
    pub async fn snapshot(&mut self) -> Result<Arc<CachedInitialData>> {
        if let Some(data) = self.initial_data.data() {
            return Ok(data.clone());
        }
        self.sync(None).await?;
        self.initial_data
            .data()
            .cloned()
            .ok_or_else(|| anyhow!("The server returned no organization data"))
    }

    pub fn clear_cache(&mut self) -> Result<()> {
        self.initial_data.clear_cache()?;
        Ok(())
    }

    /// `explicit`, else the signed-in user's employee id.
    pub fn employee_id(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .or_else(|| self.session.employee_id())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("No employee id given and none known for this session"))
    }
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim();
    if username.is_empty() {
        bail!("Username required");
    }
    Ok(username.to_string())
}
