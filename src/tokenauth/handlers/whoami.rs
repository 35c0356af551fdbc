use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::RemoteUser;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct WhoAmI {
    pub user: String,
}

#[utoipa::path(
    get,
    path = "/whoami",
    responses(
        (status = 200, description = "Identity resolved from the token", body = WhoAmI, content_type = "application/json"),
        (status = 401, description = "Missing, malformed, unknown or unauthorized token"),
    ),
    security(("token" = [])),
    tag = "auth"
)]
pub async fn whoami(user: RemoteUser) -> impl IntoResponse {
    Json(WhoAmI {
        user: user.to_string(),
    })
}
