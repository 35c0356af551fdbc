use super::*;
use crate::credential::encode;
use axum::http::header::AUTHORIZATION;

const KNOWN: &[u8] = b"known-token";

async fn known_only(token: Token) -> Option<String> {
    (token.expose_secret() == KNOWN).then(|| "user-42".to_string())
}

fn request(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn known_header() -> String {
    format!("Token {}", encode(KNOWN))
}

#[test]
fn build_requires_realm() {
    let result = TokenAuth::builder().authenticator(known_only).build();
    assert!(matches!(result, Err(Error::MissingRealm)));

    let result = TokenAuth::builder()
        .realm("")
        .authenticator(known_only)
        .build();
    assert!(matches!(result, Err(Error::MissingRealm)));
}

#[test]
fn build_requires_authenticator() {
    let result = TokenAuth::<fn(Token) -> std::future::Ready<Option<String>>>::builder()
        .realm("api")
        .build();
    assert!(matches!(result, Err(Error::MissingAuthenticator)));
}

#[test]
fn build_rejects_zero_entropy() {
    let result = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .entropy(0)
        .build();
    assert!(matches!(result, Err(Error::InvalidEntropy)));
}

#[test]
fn build_rejects_realm_that_cannot_be_a_header() {
    let result = TokenAuth::builder()
        .realm("line\nbreak")
        .authenticator(known_only)
        .build();
    assert!(matches!(result, Err(Error::InvalidRealm(_))));
}

#[test]
fn build_resolves_defaults() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .build()?;
    assert_eq!(auth.realm(), "api");
    assert_eq!(auth.entropy(), 32);
    assert_eq!(auth.query_param(), None);
    assert_eq!(auth.challenge(), "Token realm=\"api\"");
    Ok(())
}

#[test]
fn challenge_escapes_quotes() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm(r#"my "quoted" \ realm"#)
        .authenticator(known_only)
        .build()?;
    assert_eq!(
        auth.challenge(),
        r#"Token realm="my \"quoted\" \\ realm""#
    );
    Ok(())
}

#[test]
fn generate_honours_entropy() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .entropy(48)
        .build()?;
    let token = auth.generate()?;
    assert_eq!(crate::credential::decode(&token)?.len(), 48);
    assert_ne!(token, auth.generate()?);
    assert!(auth.equal(&token, &token));
    assert!(!auth.equal(&token, "other"));
    Ok(())
}

#[tokio::test]
async fn admit_attaches_identity() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .build()?;
    let mut req = request("/", Some(&known_header()));

    let user = auth.admit(&mut req).await.unwrap();
    assert_eq!(user.as_str(), "user-42");
    assert_eq!(req.extensions().get::<RemoteUser>(), Some(&user));
    Ok(())
}

#[tokio::test]
async fn admit_rejects_missing_credential() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .build()?;
    let mut req = request("/", None);

    assert!(matches!(
        auth.admit(&mut req).await,
        Err(Rejection::NoCredential)
    ));
    assert!(req.extensions().get::<RemoteUser>().is_none());
    Ok(())
}

#[tokio::test]
async fn admit_rejects_bad_headers() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .build()?;

    let mut wrong_scheme = request("/", Some("Bearer abc"));
    assert!(matches!(
        auth.admit(&mut wrong_scheme).await,
        Err(Rejection::Credential(Error::MalformedHeader))
    ));

    let mut bad_base64 = request("/", Some("Token not*base64"));
    assert!(matches!(
        auth.admit(&mut bad_base64).await,
        Err(Rejection::Credential(Error::InvalidEncoding))
    ));
    Ok(())
}

#[tokio::test]
async fn admit_rejects_unknown_and_empty_identities() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .build()?;
    let mut unknown = request("/", Some(&format!("Token {}", encode(b"other"))));
    assert!(matches!(
        auth.admit(&mut unknown).await,
        Err(Rejection::UnknownToken)
    ));

    let empty = TokenAuth::builder()
        .realm("api")
        .authenticator(|_token: Token| async { Some(String::new()) })
        .build()?;
    let mut req = request("/", Some(&known_header()));
    assert!(matches!(
        empty.admit(&mut req).await,
        Err(Rejection::UnknownToken)
    ));
    assert!(req.extensions().get::<RemoteUser>().is_none());
    Ok(())
}

#[tokio::test]
async fn admit_consults_authorizer_after_authentication() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .authorizer(|user: &RemoteUser, request: &Request<Body>| {
            user.as_str() == "user-42" && request.uri().path() != "/admin"
        })
        .build()?;

    let mut allowed = request("/items", Some(&known_header()));
    assert!(auth.admit(&mut allowed).await.is_ok());

    let mut denied = request("/admin", Some(&known_header()));
    assert!(matches!(auth.admit(&mut denied).await, Err(Rejection::Denied)));
    assert!(denied.extensions().get::<RemoteUser>().is_none());
    Ok(())
}

#[tokio::test]
async fn admit_prefers_query_parameter() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .query_param("access_token")
        .build()?;

    let uri = format!("/?access_token={}", encode(KNOWN));
    let mut req = request(&uri, Some("Bearer ignored"));
    assert!(auth.admit(&mut req).await.is_ok());

    let uri = format!("/?access_token={}", encode(b"other"));
    let mut req = request(&uri, Some(&known_header()));
    assert!(matches!(
        auth.admit(&mut req).await,
        Err(Rejection::UnknownToken)
    ));

    // An empty value falls back to the header.
    let mut req = request("/?access_token=", Some(&known_header()));
    assert!(auth.admit(&mut req).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn query_parameter_ignored_unless_configured() -> Result<(), Error> {
    let auth = TokenAuth::builder()
        .realm("api")
        .authenticator(known_only)
        .build()?;
    let uri = format!("/?access_token={}", encode(KNOWN));
    let mut req = request(&uri, None);
    assert!(matches!(
        auth.admit(&mut req).await,
        Err(Rejection::NoCredential)
    ));
    Ok(())
}

#[tokio::test]
async fn remote_user_without_gate_gets_uniform_rejection() {
    use axum::{
        body::to_bytes,
        http::{header::WWW_AUTHENTICATE, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    let app = Router::new().route("/", get(|user: RemoteUser| async move { user.to_string() }));
    let response = app.oneshot(request("/", Some(&known_header()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(WWW_AUTHENTICATE).unwrap().to_str().unwrap(),
        header::SCHEME
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Not Authorized");
}
