//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    alert::Alert, endpoints, internal_server_error::InternalServerError, not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination was rejected by the auth provider.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request does not carry a valid session, or the auth provider no
    /// longer recognises the session.
    #[error("the session is missing, expired or invalid")]
    Unauthenticated,

    /// An account with the same email already exists with the auth provider.
    #[error("an account with the email already exists")]
    DuplicateEmail,

    /// The session cookie could not be created.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not create the session cookie: {0}")]
    CookieError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The bank chosen to send money from does not exist or belongs to
    /// another user.
    #[error("the source bank does not exist or belongs to another user")]
    SourceBankNotFound,

    /// The aggregator returned no accounts for a linked item.
    #[error("the linked item does not have any accounts")]
    NoAccounts,

    /// A shareable ID could not be decoded into an account ID.
    #[error("\"{0}\" is not a valid shareable ID")]
    InvalidShareableId(String),

    /// A transfer amount was not a positive whole number of cents.
    #[error("{0} is not a valid transfer amount")]
    InvalidAmount(String),

    /// The payments processor did not return the URL of a created resource.
    #[error("the payments processor response for {0} did not include a location")]
    MissingLocationHeader(&'static str),

    /// The auth provider or document database returned an unexpected response.
    #[error("Appwrite request failed with status {status}: {message}")]
    Appwrite {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message from the response body.
        message: String,
    },

    /// The aggregator returned an error response.
    #[error("Plaid request failed with status {status} ({error_code}): {message}")]
    Plaid {
        /// The HTTP status code of the response.
        status: u16,
        /// The Plaid error code, e.g. "ITEM_LOGIN_REQUIRED".
        error_code: String,
        /// The human readable error message.
        message: String,
    },

    /// The payments processor returned an error response.
    #[error("Dwolla request failed with status {status}: {message}")]
    Dwolla {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message from the response body.
        message: String,
    },

    /// A request to an external API could not be sent or its response could
    /// not be read.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// An error occurred while serializing or deserializing JSON.
    #[error("could not (de)serialize JSON: {0}")]
    JSONSerializationError(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        tracing::error!("an HTTP client error occurred: {value}");
        Error::HttpError(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::Unauthenticated => Redirect::to(endpoints::SIGN_IN_VIEW).into_response(),
            Error::NoAccounts => InternalServerError {
                description: "No accounts found",
                fix: "The bank you linked did not share any accounts. Try linking the bank again.",
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    ///
    /// [Error::Unauthenticated] has no alert, the client is sent to the sign-in page instead.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Unauthenticated => {
                return (HxRedirect(endpoints::SIGN_IN_VIEW.to_owned()), StatusCode::OK)
                    .into_response();
            }
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Alert::Error {
                    message: "Could not sign in".to_owned(),
                    details: "The email or password is incorrect.".to_owned(),
                },
            ),
            Error::DuplicateEmail => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Email already registered".to_owned(),
                    details: "An account with this email already exists. Sign in instead."
                        .to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Bank account not found".to_owned(),
                    details: "Check the shareable ID and try again.".to_owned(),
                },
            ),
            Error::SourceBankNotFound => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Bank not found".to_owned(),
                    details: "Select one of your linked banks to send from.".to_owned(),
                },
            ),
            Error::InvalidShareableId(id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid shareable ID".to_owned(),
                    details: format!("\"{id}\" is not a valid shareable ID."),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "{amount} is not a valid amount. Enter a positive amount in dollars and cents."
                    ),
                },
            ),
            Error::NoAccounts => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "No accounts found".to_owned(),
                    details: "The bank you linked did not share any accounts.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
