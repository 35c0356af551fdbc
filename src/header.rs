//! `Authorization: Token <base64url>` parsing.

use crate::{credential, Error};
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;

/// Authentication scheme accepted in the `Authorization` header.
pub const SCHEME: &str = "Token";

/// Decoded bearer credential. The bytes are redacted from `Debug` output.
pub struct Token(SecretSlice<u8>);

impl Token {
    #[must_use]
    pub fn expose_secret(&self) -> &[u8] {
        self.0.expose_secret()
    }

    /// Storage key for this token, see [`credential::hash`].
    #[must_use]
    pub fn hash(&self) -> String {
        credential::hash(self.expose_secret())
    }
}

impl From<Vec<u8>> for Token {
    fn from(bytes: Vec<u8>) -> Self {
        Self(SecretSlice::from(bytes))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

/// Extract the token from an `Authorization` header value.
///
/// # Errors
/// [`Error::MalformedHeader`] unless the value is exactly `Token <value>`
/// with a non-empty value, [`Error::InvalidEncoding`] if the value is not
/// URL-safe base64.
pub fn decode(header: &str) -> Result<Token, Error> {
    let (scheme, value) = header
        .split_once(|c: char| c.is_ascii_whitespace())
        .ok_or(Error::MalformedHeader)?;

    if scheme != SCHEME || value.is_empty() || value.contains(|c: char| c.is_ascii_whitespace())
    {
        return Err(Error::MalformedHeader);
    }

    credential::decode(value).map(Token::from)
}
