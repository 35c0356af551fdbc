use super::RemoteUser;
use crate::Token;
use axum::{body::Body, http::Request};
use std::future::Future;

/// Resolves a decoded token to an identity.
///
/// Implementations look the token up in caller-managed storage (usually by
/// [`Token::hash`]) and return `None` when it is unknown, expired or revoked.
/// "Not found" is an ordinary answer, not an error. An empty identity is
/// treated the same as `None`.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, token: Token) -> impl Future<Output = Option<String>> + Send;
}

impl<F, Fut> Authenticator for F
where
    F: Fn(Token) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<String>> + Send,
{
    fn authenticate(&self, token: Token) -> impl Future<Output = Option<String>> + Send {
        self(token)
    }
}

/// Decides whether an authenticated user may proceed with this request.
/// Only called after authentication succeeded.
pub trait Authorizer: Send + Sync + 'static {
    fn authorize(&self, user: &RemoteUser, request: &Request<Body>) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&RemoteUser, &Request<Body>) -> bool + Send + Sync + 'static,
{
    fn authorize(&self, user: &RemoteUser, request: &Request<Body>) -> bool {
        self(user, request)
    }
}

/// Default authorizer: every authenticated user is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _user: &RemoteUser, _request: &Request<Body>) -> bool {
        true
    }
}
