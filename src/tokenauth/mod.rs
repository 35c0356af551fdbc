//! HTTP service protected by the token gate.

pub mod handlers;
mod openapi;

pub use openapi::openapi;

use crate::gate::{require_token, Authenticator, Authorizer, TokenAuth};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

const REQUEST_ID: &str = "x-request-id";

/// Build the service router. Everything except `/health` and
/// `/openapi.json` sits behind `auth`.
pub fn router<A, Z>(auth: Arc<TokenAuth<A, Z>>) -> Router
where
    A: Authenticator,
    Z: Authorizer,
{
    let protected = Router::new()
        .route("/whoami", get(handlers::whoami))
        .route_layer(middleware::from_fn_with_state(auth, require_token::<A, Z>));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(|| async { Json(openapi()) }))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new<A, Z>(port: u16, auth: Arc<TokenAuth<A, Z>>) -> Result<()>
where
    A: Authenticator,
    Z: Authorizer,
{
    let app = router(auth);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
