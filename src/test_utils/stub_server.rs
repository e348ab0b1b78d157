use axum::Router;
use tokio::net::TcpListener;

/// Serve `router` on a random local port and return its base URL.
///
/// Used to test the HTTP clients for the external APIs without a network.
pub(crate) async fn spawn_stub_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("could not bind stub server");
    let address = listener
        .local_addr()
        .expect("could not get stub server address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("stub server stopped unexpectedly");
    });

    format!("http://{address}")
}
