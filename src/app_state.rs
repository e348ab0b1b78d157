//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    appwrite::Appwrite, auth::DEFAULT_COOKIE_DURATION, dwolla::Dwolla,
    pagination::PaginationConfig, plaid::Plaid,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// Accounts, sessions and documents.
    pub appwrite: Arc<dyn Appwrite>,

    /// Linked bank accounts and their transactions.
    pub plaid: Arc<dyn Plaid>,

    /// Transfers between linked bank accounts.
    pub dwolla: Arc<dyn Dwolla>,
}

impl AppState {
    /// Create a new [AppState] from the API clients.
    ///
    /// The cookie key is derived from `cookie_secret`.
    pub fn new(
        cookie_secret: &str,
        pagination_config: PaginationConfig,
        appwrite: Arc<dyn Appwrite>,
        plaid: Arc<dyn Plaid>,
        dwolla: Arc<dyn Dwolla>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            pagination_config,
            appwrite,
            plaid,
            dwolla,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Appwrite> {
    fn from_ref(state: &AppState) -> Self {
        state.appwrite.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
