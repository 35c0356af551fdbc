use crate::{
    credential,
    store::MemoryStore,
    tokenauth, TokenAuth,
};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub realm: String,
    pub entropy: usize,
    pub query_param: Option<String>,
    /// `(user, token hash)` pairs.
    pub credentials: Vec<(String, String)>,
}

/// Parse `<user>=<token hash>` as printed by the generate command.
/// # Errors
/// Returns an error if the user is empty or the hash is not a SHA-256 digest
/// in URL-safe base64.
pub fn parse_credential(value: &str) -> Result<(String, String)> {
    let (user, key) = value
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("invalid credential, expected <user>=<hash>"))?;

    let user = user.trim();
    let key = key.trim();

    if user.is_empty() {
        return Err(anyhow!("invalid credential, missing user"));
    }

    let digest = credential::decode(key).context("invalid credential hash")?;
    if digest.len() != 32 {
        return Err(anyhow!("invalid credential hash for {user}: not a SHA-256 digest"));
    }

    Ok((user.to_string(), key.to_string()))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the gate configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        realm = %args.realm,
        entropy = args.entropy,
        query_param = args.query_param.as_deref().unwrap_or("none"),
        credentials = args.credentials.len(),
        "Startup configuration"
    );

    if args.credentials.is_empty() {
        warn!("No credentials configured, every protected request will be rejected");
    }

    let store = MemoryStore::from_credentials(args.credentials)
        .context("duplicate credential hash")?;

    let mut builder = TokenAuth::builder()
        .realm(args.realm)
        .authenticator(store)
        .entropy(args.entropy);
    if let Some(name) = args.query_param {
        builder = builder.query_param(name);
    }
    let auth = builder.build().context("invalid token auth configuration")?;

    tokenauth::new(args.port, Arc::new(auth)).await
}
