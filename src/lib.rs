//! Horizon is a web app for managing your bank accounts in one place.
//!
//! Users link their banks through Plaid, see balances and transactions from
//! every linked account and send money to other Horizon users through Dwolla.
//! Accounts, sessions and documents are stored with Appwrite.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod appwrite;
mod auth;
mod bank;
mod config;
mod dashboard;
mod dwolla;
mod endpoints;
mod error;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod plaid;
mod routing;
mod shareable_id;
mod transaction;
mod transfer;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use appwrite::{Appwrite, AppwriteClient};
pub use config::{
    AppwriteConfig, DwollaConfig, DwollaEnvironment, PlaidConfig, PlaidEnvironment,
    UnknownEnvironment,
};
pub use dwolla::{Dwolla, DwollaClient};
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use plaid::{Plaid, PlaidClient};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
