//! # tokenauth
//!
//! Token authentication for axum services.
//!
//! Clients send `Authorization: Token <base64url>`. The gate decodes the
//! token, hands it to an [`Authenticator`] that resolves it to a user (usually
//! by looking up [`credential::hash`] of the token in a store), optionally
//! asks an [`Authorizer`], and then either forwards the request with a
//! [`RemoteUser`] attached or answers `401` with
//! `WWW-Authenticate: Token realm="<realm>"`.
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use std::sync::Arc;
//! use tokenauth::{require_token, store::MemoryStore, AllowAll, RemoteUser, TokenAuth};
//!
//! # fn main() -> Result<(), tokenauth::Error> {
//! let auth = Arc::new(
//!     TokenAuth::builder()
//!         .realm("api")
//!         .authenticator(MemoryStore::new())
//!         .build()?,
//! );
//!
//! let app: Router = Router::new()
//!     .route("/me", get(|user: RemoteUser| async move { user.to_string() }))
//!     .route_layer(middleware::from_fn_with_state(
//!         auth,
//!         require_token::<MemoryStore, AllowAll>,
//!     ));
//! # Ok(())
//! # }
//! ```
//!
//! Storage, expiry and rate limiting are left to the caller.

pub mod cli;
pub mod credential;
mod error;
pub mod gate;
pub mod header;
pub mod store;
pub mod tokenauth;

pub use self::error::Error;
pub use self::gate::{
    require_token, AllowAll, Authenticator, Authorizer, Rejection, RemoteUser, TokenAuth,
    TokenAuthBuilder,
};
pub use self::header::Token;
