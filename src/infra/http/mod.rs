//! HTTP surface: public pages, feeds, sign-in and the admin area.

mod admin;
mod auth;
mod extract;
mod middleware;
mod public;
mod state;

use std::{future::IntoFuture, net::SocketAddr, time::Duration};

use axum::{Router, middleware as axum_middleware};
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{info, warn};

use crate::infra::error::InfraError;

pub use extract::{SESSION_COOKIE, SESSION_IDENTITY};
pub use state::{AdminServices, HttpConfig, HttpRepositories, HttpState};

/// Assemble every route with the request-context and response-logging layers.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .merge(admin::routes())
        .merge(auth::routes())
        .merge(public::routes())
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

/// Serve until SIGINT or SIGTERM, then give in-flight requests `grace` to finish.
pub async fn serve(addr: SocketAddr, router: Router, grace: Duration) -> Result<(), InfraError> {
    let listener = TcpListener::bind(addr).await?;
    info!(target = "pblog::http", %addr, "listening");

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    })
    .into_future();

    let deadline = async move {
        if signalled_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result.map_err(InfraError::from),
        () = deadline => {
            warn!(
                target = "pblog::http",
                grace_seconds = grace.as_secs(),
                "graceful shutdown deadline reached; dropping open connections"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "pblog::http", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(target = "pblog::http", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!(target = "pblog::http", "shutdown signal received");
}
