//! Credential primitives: token generation, constant-time comparison and
//! one-way hashing for at-rest storage.
//!
//! Tokens travel as URL-safe base64 (RFC 4648 §5). Generated values are
//! unpadded; [`decode`] also accepts the padded form so tokens minted by
//! other implementations keep working.

use crate::Error;
use base64ct::{Base64Url, Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// 32 bytes == 256 bits, the recommended entropy for a bearer credential.
pub const DEFAULT_ENTROPY: usize = 32;

/// Mints fresh random tokens of a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenGenerator {
    entropy: usize,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self {
            entropy: DEFAULT_ENTROPY,
        }
    }
}

impl TokenGenerator {
    /// # Errors
    /// Returns [`Error::InvalidEntropy`] if `entropy` is zero.
    pub fn new(entropy: usize) -> Result<Self, Error> {
        if entropy == 0 {
            return Err(Error::InvalidEntropy);
        }
        Ok(Self { entropy })
    }

    #[must_use]
    pub fn entropy(&self) -> usize {
        self.entropy
    }

    /// Create a new token, already encoded for the wire.
    ///
    /// # Errors
    /// Returns [`Error::EntropySource`] if the OS random source fails. The
    /// failure is never papered over with a weaker value.
    pub fn generate(&self) -> Result<String, Error> {
        let mut bytes = vec![0u8; self.entropy];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(encode(&bytes))
    }
}

/// Encode raw token bytes with the unpadded URL-safe alphabet.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(bytes)
}

/// Decode a wire token into its raw bytes.
///
/// # Errors
/// Returns [`Error::InvalidEncoding`] if `value` is not canonical URL-safe
/// base64, padded or unpadded.
pub fn decode(value: &str) -> Result<Vec<u8>, Error> {
    let decoded = if value.ends_with('=') {
        Base64Url::decode_vec(value)
    } else {
        Base64UrlUnpadded::decode_vec(value)
    };
    decoded.map_err(|_| Error::InvalidEncoding)
}

/// Constant-time equality of two credentials.
///
/// Only a length mismatch returns early. Prefer looking tokens up by
/// [`hash`] over scanning a store with this.
#[must_use]
pub fn equal(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Hash decoded token bytes into a storage key.
///
/// SHA-256 is intentionally fast: tokens are already high entropy, so the
/// hash only has to keep stored keys from being usable as bearer credentials.
/// Callers must detect key collisions on insert and mint a new token instead
/// of overwriting.
#[must_use]
pub fn hash(token: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(token.as_ref());
    Base64UrlUnpadded::encode_string(&digest)
}
