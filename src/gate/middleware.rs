use super::{Authenticator, Authorizer, TokenAuth};
use axum::{
    extract::{Request, State},
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Axum middleware enforcing token authentication.
///
/// Attach with `axum::middleware::from_fn_with_state(auth, require_token::<A, Z>)`
/// where `auth` is an `Arc<TokenAuth<A, Z>>`.
#[instrument(skip_all, fields(http.path = %request.uri().path()))]
pub async fn require_token<A, Z>(
    State(auth): State<Arc<TokenAuth<A, Z>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    A: Authenticator,
    Z: Authorizer,
{
    match auth.admit(&mut request).await {
        Ok(user) => {
            debug!(remote_user = %user, "request authenticated");
            next.run(request).await
        }
        Err(rejection) => {
            debug!(reason = %rejection, "request rejected");
            unauthorized(auth.challenge().clone())
        }
    }
}

// Same response for every failure cause.
pub(super) fn unauthorized(challenge: HeaderValue) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, challenge)],
        Json(json!({ "error": "Not Authorized" })),
    )
        .into_response()
}
