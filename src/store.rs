//! Hashed token storage.
//!
//! Only [`credential::hash`] of the decoded token is kept, so a leaked store
//! does not hand out working credentials. Keys are never overwritten: when a
//! freshly minted token collides with an existing key, [`issue`] mints
//! another one.

use crate::{
    credential::{self, TokenGenerator},
    gate::Authenticator,
    Error, Token,
};
use std::{collections::HashMap, future::Future};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// How many fresh tokens [`issue`] tries before giving up.
pub const MAX_ISSUE_ATTEMPTS: usize = 3;

pub trait TokenStore: Send + Sync {
    /// Store `user_id` under `key`.
    ///
    /// Must fail with [`Error::AlreadyExists`] instead of replacing an
    /// existing entry.
    fn insert(&self, key: String, user_id: String) -> impl Future<Output = Result<(), Error>> + Send;

    fn lookup(&self, key: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Mint a token for `user_id` and store its hash.
///
/// Returns the wire-encoded token; it is the only time the raw value exists.
///
/// # Errors
/// [`Error::EntropySource`] if generation fails, or
/// [`Error::CollisionRetriesExhausted`] after [`MAX_ISSUE_ATTEMPTS`] key
/// collisions. Other store errors are returned as is.
pub async fn issue<S: TokenStore>(
    store: &S,
    generator: &TokenGenerator,
    user_id: &str,
) -> Result<String, Error> {
    for attempt in 1..=MAX_ISSUE_ATTEMPTS {
        let token = generator.generate()?;
        let key = credential::hash(credential::decode(&token)?);

        match store.insert(key, user_id.to_string()).await {
            Ok(()) => return Ok(token),
            Err(Error::AlreadyExists) => {
                warn!(attempt, "token key collision, minting a new token");
            }
            Err(err) => return Err(err),
        }
    }

    Err(Error::CollisionRetriesExhausted(MAX_ISSUE_ATTEMPTS))
}

/// Process-local store, useful for tests and small deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(user_id, key)` pairs.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyExists`] if two pairs share a key.
    pub fn from_credentials<I>(credentials: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries = HashMap::new();
        for (user_id, key) in credentials {
            if entries.insert(key, user_id).is_some() {
                return Err(Error::AlreadyExists);
            }
        }
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Drop the entry for `key`, returning the user it belonged to.
    pub async fn revoke(&self, key: &str) -> Option<String> {
        self.entries.write().await.remove(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl TokenStore for MemoryStore {
    async fn insert(&self, key: String, user_id: String) -> Result<(), Error> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return Err(Error::AlreadyExists);
        }
        entries.insert(key, user_id);
        Ok(())
    }

    async fn lookup(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }
}

impl Authenticator for MemoryStore {
    async fn authenticate(&self, token: Token) -> Option<String> {
        let user_id = self.lookup(&token.hash()).await;
        if user_id.is_none() {
            debug!("token not found");
        }
        user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Reports a collision for the first `collisions` inserts.
    struct CollidingStore {
        collisions: usize,
        calls: AtomicUsize,
        inner: MemoryStore,
    }

    impl CollidingStore {
        fn new(collisions: usize) -> Self {
            Self {
                collisions,
                calls: AtomicUsize::new(0),
                inner: MemoryStore::new(),
            }
        }
    }

    impl TokenStore for CollidingStore {
        async fn insert(&self, key: String, user_id: String) -> Result<(), Error> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.collisions {
                return Err(Error::AlreadyExists);
            }
            self.inner.insert(key, user_id).await
        }

        async fn lookup(&self, key: &str) -> Option<String> {
            self.inner.lookup(key).await
        }
    }

    #[tokio::test]
    async fn issue_stores_hash_of_decoded_token() -> Result<(), Error> {
        let store = MemoryStore::new();
        let token = issue(&store, &TokenGenerator::default(), "user-42").await?;

        let key = credential::hash(credential::decode(&token)?);
        assert_eq!(store.lookup(&key).await.as_deref(), Some("user-42"));
        assert_eq!(store.lookup(&token).await, None);
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn issue_regenerates_on_collision() -> Result<(), Error> {
        let store = CollidingStore::new(1);
        let token = issue(&store, &TokenGenerator::default(), "user-42").await?;

        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
        let key = credential::hash(credential::decode(&token)?);
        assert_eq!(store.lookup(&key).await.as_deref(), Some("user-42"));
        Ok(())
    }

    #[tokio::test]
    async fn issue_gives_up_after_max_attempts() {
        let store = CollidingStore::new(MAX_ISSUE_ATTEMPTS);
        let result = issue(&store, &TokenGenerator::default(), "user-42").await;

        assert!(matches!(
            result,
            Err(Error::CollisionRetriesExhausted(MAX_ISSUE_ATTEMPTS))
        ));
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn insert_never_overwrites() -> Result<(), Error> {
        let store = MemoryStore::new();
        store.insert("key".into(), "alice".into()).await?;

        let second = store.insert("key".into(), "mallory".into()).await;
        assert!(matches!(second, Err(Error::AlreadyExists)));
        assert_eq!(store.lookup("key").await.as_deref(), Some("alice"));
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_resolves_known_tokens_only() -> Result<(), Error> {
        let store = MemoryStore::new();
        let token = issue(&store, &TokenGenerator::default(), "user-42").await?;

        let known = Token::from(credential::decode(&token)?);
        assert_eq!(store.authenticate(known).await.as_deref(), Some("user-42"));

        let unknown = Token::from(b"not-issued".to_vec());
        assert_eq!(store.authenticate(unknown).await, None);
        Ok(())
    }

    #[tokio::test]
    async fn revoke_removes_entry() -> Result<(), Error> {
        let store = MemoryStore::new();
        let token = issue(&store, &TokenGenerator::default(), "user-42").await?;
        let key = credential::hash(credential::decode(&token)?);

        assert_eq!(store.revoke(&key).await.as_deref(), Some("user-42"));
        assert_eq!(store.authenticate(Token::from(credential::decode(&token)?)).await, None);
        Ok(())
    }

    #[test]
    fn from_credentials_rejects_duplicate_keys() {
        let result = MemoryStore::from_credentials([
            ("alice".to_string(), "key".to_string()),
            ("bob".to_string(), "key".to_string()),
        ]);
        assert!(matches!(result, Err(Error::AlreadyExists)));
    }
}
