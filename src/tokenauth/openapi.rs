use super::handlers::{health, whoami};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(health::health, whoami::whoami),
    components(schemas(health::Health, whoami::WhoAmI)),
    modifiers(&TokenScheme),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Routes behind the token gate")
    )
)]
pub struct ApiDoc;

// `Authorization: Token <base64url>` has no dedicated OpenAPI scheme, so it
// is described as an API key carried in the header.
struct TokenScheme;

impl Modify for TokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token <base64url>",
                ))),
            );
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
