//! Token authentication gate.
//!
//! Flow Overview: take the credential from the configured query parameter or
//! the `Authorization` header, decode it, resolve it to a user with the
//! [`Authenticator`], ask the [`Authorizer`], then either forward the request
//! with a [`RemoteUser`] attached or answer with a uniform `401` challenge.
//! The reason for a rejection is only logged, never returned to the client.

mod callbacks;
mod middleware;

pub use callbacks::{AllowAll, Authenticator, Authorizer};
pub use middleware::require_token;

use crate::{
    credential::{self, TokenGenerator, DEFAULT_ENTROPY},
    header, Error, Token,
};
use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue, Request, Uri},
    response::Response,
};
use std::fmt;

/// Identity resolved by the [`Authenticator`]. This is the `REMOTE_USER` of
/// the request: downstream handlers read it from the request extensions or
/// take it as an extractor.
///
/// The extractor only succeeds behind [`require_token`]. Without it the
/// request gets the usual `401` body with a realm-less `Token` challenge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteUser(String);

impl RemoteUser {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RemoteUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| middleware::unauthorized(HeaderValue::from_static(header::SCHEME)))
    }
}

/// Why a request was turned away. Logged server-side only.
#[derive(Debug)]
pub enum Rejection {
    NoCredential,
    Credential(Error),
    UnknownToken,
    Denied,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredential => f.write_str("no credential"),
            Self::Credential(err) => write!(f, "{err}"),
            Self::UnknownToken => f.write_str("unknown token"),
            Self::Denied => f.write_str("authorization denied"),
        }
    }
}

/// Immutable gate configuration, shared by every request.
#[derive(Debug)]
pub struct TokenAuth<A, Z = AllowAll> {
    realm: String,
    challenge: HeaderValue,
    authenticator: A,
    authorizer: Z,
    generator: TokenGenerator,
    query_param: Option<String>,
}

impl<A: Authenticator> TokenAuth<A> {
    #[must_use]
    pub fn builder() -> TokenAuthBuilder<A> {
        TokenAuthBuilder {
            realm: None,
            authenticator: None,
            authorizer: AllowAll,
            entropy: DEFAULT_ENTROPY,
            query_param: None,
        }
    }
}

impl<A, Z> TokenAuth<A, Z>
where
    A: Authenticator,
    Z: Authorizer,
{
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Value sent in `WWW-Authenticate` on every rejection.
    #[must_use]
    pub fn challenge(&self) -> &HeaderValue {
        &self.challenge
    }

    #[must_use]
    pub fn entropy(&self) -> usize {
        self.generator.entropy()
    }

    #[must_use]
    pub fn query_param(&self) -> Option<&str> {
        self.query_param.as_deref()
    }

    /// Mint a fresh token with the configured entropy.
    ///
    /// # Errors
    /// Returns [`Error::EntropySource`] if the random source fails.
    pub fn generate(&self) -> Result<String, Error> {
        self.generator.generate()
    }

    #[must_use]
    pub fn hash(&self, token: &Token) -> String {
        token.hash()
    }

    #[must_use]
    pub fn equal(&self, a: &str, b: &str) -> bool {
        credential::equal(a, b)
    }

    /// Run the authentication sequence against `request`.
    ///
    /// On success the [`RemoteUser`] is inserted into the request extensions
    /// and returned. On failure the request is left untouched.
    ///
    /// # Errors
    /// Returns the [`Rejection`] that stopped the request.
    pub async fn admit(&self, request: &mut Request<Body>) -> Result<RemoteUser, Rejection> {
        let token = self.extract(request)?;

        let user = self
            .authenticator
            .authenticate(token)
            .await
            .filter(|user_id| !user_id.is_empty())
            .map(RemoteUser)
            .ok_or(Rejection::UnknownToken)?;

        if !self.authorizer.authorize(&user, request) {
            return Err(Rejection::Denied);
        }

        request.extensions_mut().insert(user.clone());
        Ok(user)
    }

    fn extract(&self, request: &Request<Body>) -> Result<Token, Rejection> {
        if let Some(value) = self
            .query_param
            .as_deref()
            .and_then(|name| query_value(request.uri(), name))
        {
            return credential::decode(&value)
                .map(Token::from)
                .map_err(Rejection::Credential);
        }

        let value = request
            .headers()
            .get(AUTHORIZATION)
            .ok_or(Rejection::NoCredential)?
            .to_str()
            .map_err(|_| Rejection::Credential(Error::MalformedHeader))?;

        header::decode(value).map_err(Rejection::Credential)
    }
}

fn query_value(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn challenge(realm: &str) -> Result<HeaderValue, Error> {
    let escaped = realm.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_str(&format!("{} realm=\"{escaped}\"", header::SCHEME))
        .map_err(|_| Error::InvalidRealm(realm.to_string()))
}

/// Collects gate settings; [`TokenAuthBuilder::build`] validates them once.
pub struct TokenAuthBuilder<A, Z = AllowAll> {
    realm: Option<String>,
    authenticator: Option<A>,
    authorizer: Z,
    entropy: usize,
    query_param: Option<String>,
}

impl<A, Z> TokenAuthBuilder<A, Z>
where
    A: Authenticator,
    Z: Authorizer,
{
    /// Realm shown in the challenge header. Required.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Token lookup callback. Required.
    #[must_use]
    pub fn authenticator(mut self, authenticator: A) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Per-request access check. Defaults to [`AllowAll`].
    #[must_use]
    pub fn authorizer<Y: Authorizer>(self, authorizer: Y) -> TokenAuthBuilder<A, Y> {
        TokenAuthBuilder {
            realm: self.realm,
            authenticator: self.authenticator,
            authorizer,
            entropy: self.entropy,
            query_param: self.query_param,
        }
    }

    /// Bytes of randomness per generated token. Defaults to 32.
    #[must_use]
    pub fn entropy(mut self, entropy: usize) -> Self {
        self.entropy = entropy;
        self
    }

    /// Also accept the encoded token from this query parameter. A non-empty
    /// query value takes precedence over the `Authorization` header.
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = Some(name.into());
        self
    }

    /// # Errors
    /// [`Error::MissingRealm`], [`Error::InvalidRealm`],
    /// [`Error::MissingAuthenticator`] or [`Error::InvalidEntropy`].
    pub fn build(self) -> Result<TokenAuth<A, Z>, Error> {
        let realm = self
            .realm
            .filter(|realm| !realm.is_empty())
            .ok_or(Error::MissingRealm)?;
        let challenge = challenge(&realm)?;
        let authenticator = self.authenticator.ok_or(Error::MissingAuthenticator)?;
        let generator = TokenGenerator::new(self.entropy)?;

        Ok(TokenAuth {
            realm,
            challenge,
            authenticator,
            authorizer: self.authorizer,
            generator,
            query_param: self.query_param.filter(|name| !name.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests;
