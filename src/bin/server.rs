use std::{fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use horizon::{
    AppState, AppwriteClient, AppwriteConfig, DwollaClient, DwollaConfig, DwollaEnvironment,
    PaginationConfig, PlaidClient, PlaidConfig, PlaidEnvironment, build_router, graceful_shutdown,
    logging_middleware,
};

/// The web server for Horizon.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The Appwrite API endpoint, e.g. "https://cloud.appwrite.io/v1".
    #[arg(long, env = "APPWRITE_ENDPOINT")]
    appwrite_endpoint: String,

    /// The Appwrite project ID.
    #[arg(long, env = "APPWRITE_PROJECT")]
    appwrite_project: String,

    /// An Appwrite server API key.
    #[arg(long, env = "APPWRITE_KEY", hide_env_values = true)]
    appwrite_key: String,

    /// The ID of the Appwrite database.
    #[arg(long, env = "APPWRITE_DATABASE_ID")]
    appwrite_database_id: String,

    /// The ID of the collection of user profiles.
    #[arg(long, env = "APPWRITE_USER_COLLECTION_ID")]
    appwrite_user_collection_id: String,

    /// The ID of the collection of linked banks.
    #[arg(long, env = "APPWRITE_BANK_COLLECTION_ID")]
    appwrite_bank_collection_id: String,

    /// The ID of the collection of transfers.
    #[arg(long, env = "APPWRITE_TRANSACTION_COLLECTION_ID")]
    appwrite_transaction_collection_id: String,

    /// The Plaid client ID.
    #[arg(long, env = "PLAID_CLIENT_ID")]
    plaid_client_id: String,

    /// The Plaid secret.
    #[arg(long, env = "PLAID_SECRET", hide_env_values = true)]
    plaid_secret: String,

    /// The Plaid environment: sandbox, development or production.
    #[arg(long, env = "PLAID_ENV", default_value = "sandbox")]
    plaid_env: PlaidEnvironment,

    /// The Dwolla application key.
    #[arg(long, env = "DWOLLA_KEY")]
    dwolla_key: String,

    /// The Dwolla application secret.
    #[arg(long, env = "DWOLLA_SECRET", hide_env_values = true)]
    dwolla_secret: String,

    /// The Dwolla environment: sandbox or production.
    #[arg(long, env = "DWOLLA_ENV", default_value = "sandbox")]
    dwolla_env: DwollaEnvironment,

    /// The secret used to sign and encrypt cookies.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    secret: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// File path to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let appwrite = AppwriteClient::new(AppwriteConfig {
        endpoint: args.appwrite_endpoint,
        project_id: args.appwrite_project,
        api_key: args.appwrite_key,
        database_id: args.appwrite_database_id,
        user_collection_id: args.appwrite_user_collection_id,
        bank_collection_id: args.appwrite_bank_collection_id,
        transaction_collection_id: args.appwrite_transaction_collection_id,
    });
    let plaid = PlaidClient::new(PlaidConfig {
        client_id: args.plaid_client_id,
        secret: args.plaid_secret,
        environment: args.plaid_env,
    });
    let dwolla = DwollaClient::new(DwollaConfig {
        key: args.dwolla_key,
        secret: args.dwolla_secret,
        environment: args.dwolla_env,
    });

    let (appwrite, plaid, dwolla) = match (appwrite, plaid, dwolla) {
        (Ok(appwrite), Ok(plaid), Ok(dwolla)) => (appwrite, plaid, dwolla),
        (Err(error), _, _) | (_, Err(error), _) | (_, _, Err(error)) => {
            tracing::error!("Could not create API clients: {error}");
            exit(1);
        }
    };

    let state = AppState::new(
        &args.secret,
        PaginationConfig::default(),
        Arc::new(appwrite),
        Arc::new(plaid),
        Arc::new(dwolla),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &str) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .unwrap_or_else(|error| {
            eprintln!("Could not create log file {log_path}: {error}");
            exit(1);
        });

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    // RUST_LOG replaces the default levels when it is set.
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => tracing_subscriber::registry()
            .with(stdout_log.and_then(debug_log).with_filter(env_filter))
            .init(),
        Err(_) => tracing_subscriber::registry()
            .with(
                stdout_log
                    .with_filter(filter::LevelFilter::INFO)
                    .and_then(debug_log)
                    .with_filter(filter::LevelFilter::DEBUG),
            )
            .init(),
    }
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
