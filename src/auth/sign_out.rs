//! Sign-out route handler that ends the Appwrite session, invalidates the session cookie and
//! redirects users.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    AppState,
    appwrite::Appwrite,
    auth::cookie::{get_token_from_cookies, invalidate_auth_cookie},
    endpoints,
};

/// The state needed to sign out a user.
#[derive(Clone)]
pub struct SignOutState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// Deletes the session.
    pub appwrite: Arc<dyn Appwrite>,
}

impl FromRef<AppState> for SignOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            appwrite: state.appwrite.clone(),
        }
    }
}

impl FromRef<SignOutState> for Key {
    fn from_ref(state: &SignOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// Delete the Appwrite session, invalidate the session cookie and redirect the client to the
/// sign-in page.
///
/// The cookie is invalidated even if Appwrite could not delete the session.
pub async fn get_sign_out(State(state): State<SignOutState>, jar: PrivateCookieJar) -> Response {
    if let Ok(token) = get_token_from_cookies(&jar) {
        if let Err(error) = state.appwrite.delete_session(&token.session_secret).await {
            tracing::warn!("Could not delete session for user {}: {error}", token.user_id);
        }
    }

    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::SIGN_IN_VIEW)).into_response()
}

#[cfg(test)]
mod sign_out_tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        app_state::create_cookie_key,
        appwrite::Appwrite,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        endpoints,
        test_utils::{FakeAppwrite, test_user},
    };

    use super::{SignOutState, get_sign_out};

    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    fn assert_cookie_expired(response: &Response<Body>) {
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("session cookie not set");

        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn sign_out_deletes_session_and_invalidates_cookie() {
        let appwrite = Arc::new(FakeAppwrite::new());
        let user = appwrite.add_user(test_user(), "password123");
        let session = appwrite.sign_in(&user.email, "password123");
        let state = SignOutState {
            cookie_key: create_cookie_key("42"),
            appwrite: appwrite.clone(),
        };
        let jar = set_auth_cookie(
            PrivateCookieJar::new(state.cookie_key.clone()),
            &session,
            DEFAULT_COOKIE_DURATION,
        )
        .unwrap();

        let response = get_sign_out(State(state), jar).await;

        assert_redirect(&response, endpoints::SIGN_IN_VIEW);
        assert_cookie_expired(&response);
        assert_eq!(
            appwrite.get_account(&session.secret).await,
            Err(Error::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn sign_out_without_cookie_still_redirects() {
        let state = SignOutState {
            cookie_key: create_cookie_key("42"),
            appwrite: Arc::new(FakeAppwrite::new()),
        };

        let response = get_sign_out(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key.clone()),
        )
        .await;

        assert_redirect(&response, endpoints::SIGN_IN_VIEW);
        assert_cookie_expired(&response);
    }
}
