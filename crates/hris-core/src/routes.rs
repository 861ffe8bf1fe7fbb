//! Screens of the client and the authentication guard in front of them.

use std::fmt;

use tracing::{debug, warn};

use crate::auth::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    InitialData,
    Subordinates,
    Debug,
    OrgChart,
    About,
    WorkReports,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::Login,
        Route::InitialData,
        Route::Subordinates,
        Route::Debug,
        Route::OrgChart,
        Route::About,
        Route::WorkReports,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::InitialData => "/initial-data",
            Route::Subordinates => "/subordinates",
            Route::Debug => "/debug",
            Route::OrgChart => "/org-chart",
            Route::About => "/about",
            Route::WorkReports => "/work-reports",
        }
    }

    /// Route for `path`; a trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn requires_auth(self) -> bool {
        self != Route::Login
    }

    /// Only reachable while signed out.
    pub fn is_guest(self) -> bool {
        self == Route::Login
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

/// Decide whether navigating to `route` may proceed.
///
/// A persisted session is restored first if none is held, so the first
/// navigation after a restart does not bounce to the login screen.
pub fn guard(route: Route, session: &mut SessionStore) -> Navigation {
    if !session.is_authenticated() {
        if let Err(e) = session.load_auth_data() {
            warn!(error = %e, "Failed to restore session");
        }
    }

    let authenticated = session.is_authenticated();
    let decision = if route.requires_auth() && !authenticated {
        Navigation::Redirect(Route::Login)
    } else if route.is_guest() && authenticated {
        Navigation::Redirect(Route::Home)
    } else {
        Navigation::Proceed
    };
    debug!(route = %route, authenticated, ?decision, "Route guard");
    decision
}
