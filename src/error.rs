use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("realm is required")]
    MissingRealm,
    #[error("invalid realm: {0}")]
    InvalidRealm(String),
    #[error("authenticator is required")]
    MissingAuthenticator,
    #[error("token entropy must be a positive number of bytes")]
    InvalidEntropy,
    #[error("entropy source failure: {0}")]
    EntropySource(#[from] rand::Error),
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid base64url encoding")]
    InvalidEncoding,
    #[error("token key already exists")]
    AlreadyExists,
    #[error("could not issue a unique token after {0} attempts")]
    CollisionRetriesExhausted(usize),
}
