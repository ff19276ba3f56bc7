//! Server assembly and lifecycle.
//!
//! Builds the Axum router from configuration and registries: one POST
//! endpoint per configured route plus `/ready`, wrapped in request
//! tracing, a request timeout, and request-id injection. Serving handles
//! SIGINT/SIGTERM with a bounded grace period for in-flight requests.

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use signet_registry::forward_backend_options;
use signet_signer::SignerRegistry;
use signet_webhook::HandlerRegistry;

use crate::config::Config;
use crate::error::GatewayError;
use crate::pipeline::Route;
use crate::sink::{ArchiveSink, LocalDirSink, Sink};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

/// Builds the router for every servable configured route.
///
/// Signers and handlers are resolved once here; requests only read the
/// resulting route table. Configuration errors (unknown types, unknown
/// options, unknown backends) fail assembly outright. Routes whose
/// secret or key material cannot be loaded are logged and skipped so the
/// remaining routes still serve.
///
/// # Errors
///
/// Returns [`GatewayError`] for configuration errors and for a failing
/// attestation-directory write probe. Both are fatal to startup.
pub async fn build_router(
    config: &Config,
    handlers: &HandlerRegistry,
    signers: &SignerRegistry,
) -> Result<Router, GatewayError> {
    let sinks = build_sinks(config)?;

    let mut router = Router::new().route("/ready", get(ready));

    for (name, route_config) in &config.webhooks {
        if !crate::config::is_valid_route_name(name) {
            return Err(GatewayError::InvalidRouteName { name: name.clone() });
        }

        let mut provider = signers
            .build_from_config_map(&route_config.signer, &route_config.signer_options)
            .map_err(|source| GatewayError::Configuration {
                name: name.clone(),
                source,
            })?;

        // Composite providers get their backend options forwarded from
        // the same flat map, one phase after the provider itself.
        if let Some(composite) = provider.as_composite_mut() {
            forward_backend_options(composite, &route_config.signer_options).map_err(
                |source| GatewayError::Configuration {
                    name: name.clone(),
                    source,
                },
            )?;
        }

        let signer = match provider.signer().await {
            Ok(signer) => signer,
            Err(err) => {
                error!(webhook = %name, error = %err, "could not resolve signer, skipping route");
                continue;
            },
        };

        let mut handler = handlers
            .build_from_config_map(&route_config.handler_type, &route_config.options)
            .map_err(|source| GatewayError::Configuration {
                name: name.clone(),
                source,
            })?;

        if let Err(err) = handler.prepare() {
            error!(webhook = %name, error = %err, "could not prepare handler, skipping route");
            continue;
        }

        let route = Arc::new(Route::new(name.clone(), handler, signer, Arc::clone(&sinks)));
        info!(webhook = %name, handler = %route_config.handler_type, signer = %route_config.signer, "webhook route bound");

        router = router.merge(
            Router::new()
                .route(&format!("/{name}"), post(handle_webhook))
                .with_state(route),
        );
    }

    Ok(router
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id)))
}

/// Converts middleware errors into responses; only the timeout can fail.
async fn handle_middleware_error(err: tower::BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!(timeout = ?REQUEST_TIMEOUT, "request timed out");
        StatusCode::REQUEST_TIMEOUT
    } else {
        error!(error = %err, "middleware failure");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Buffers the body and hands the request to the route's pipeline.
async fn handle_webhook(
    State(route): State<Arc<Route>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    route.process(&headers, body).await
}

/// Liveness probe: answers 200 while the server is accepting requests.
async fn ready() -> StatusCode {
    StatusCode::OK
}

/// Middleware that tags every response with an `X-Request-Id` header.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

fn build_sinks(config: &Config) -> Result<Arc<Vec<Box<dyn Sink>>>, GatewayError> {
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();

    if let Some(url) = &config.archive_url {
        sinks.push(Box::new(ArchiveSink::new(url)?));
        info!(archive = %url, "remote archive sink enabled");
    }

    if let Some(dir) = &config.attestation_dir {
        sinks.push(Box::new(LocalDirSink::new(dir.clone())?));
        info!(dir = %dir.display(), "local attestation sink enabled");
    }

    if sinks.is_empty() {
        debug!("no sinks configured, envelopes will only be logged");
    }

    Ok(Arc::new(sinks))
}

/// Serves the router until a shutdown signal arrives.
///
/// Stops accepting new connections on SIGINT or SIGTERM and waits a
/// bounded grace period for in-flight requests before returning.
///
/// # Errors
///
/// Returns `std::io::Error` when binding or serving fails.
pub async fn serve(addr: std::net::SocketAddr, router: Router) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "gateway listening");

    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = drain_tx.send(());
            })
            .await
    });

    tokio::select! {
        result = &mut server => return result.map_err(std::io::Error::other)?,
        _ = drain_rx => {},
    }

    warn!(grace = ?SHUTDOWN_GRACE, "waiting for in-flight requests to complete");
    match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
        Ok(result) => result.map_err(std::io::Error::other)??,
        Err(_) => {
            warn!("grace period elapsed, closing remaining connections");
            server.abort();
        },
    }

    info!("gateway stopped");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                error!(error = %err, "failed to install sigterm handler");
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("received ctrl-c, starting graceful shutdown");
        },
        () = terminate => {
            info!("received sigterm, starting graceful shutdown");
        },
    }
}
