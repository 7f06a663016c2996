use async_trait::async_trait;
use ethers::types::Address;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::pipeline::InvocationContext;
use crate::auth::identity::Identity;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    /// The credential is malformed, expired or not signed by a trusted key
    #[error("{0}")]
    Rejected(String),

    /// The verifier itself could not run
    #[error("{0}")]
    Unavailable(String),
}

/// External credential verifier: validates a bearer credential and recovers
/// the account address it was issued for.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Address, VerifierError>;
}

/// Trust boundary between token extraction and the credential verifier.
#[derive(Clone)]
pub struct Authorizer {
    verifier: Arc<dyn CredentialVerifier>,
}

impl Authorizer {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Verify the caller's token. An empty token fails without reaching the
    /// verifier; any other token is handed to it exactly once.
    #[tracing::instrument(skip(self, token), fields(request_id = %ctx.request_id))]
    pub async fn verify(&self, ctx: &InvocationContext, token: &str) -> ApiResult<Identity> {
        let token = bearer_token(token);
        if token.is_empty() {
            warn!("Missing authorization token");
            return Err(ApiError::Unauthenticated(
                "Missing authorization token".to_string(),
            ));
        }

        let address = self.verifier.verify(token).await.map_err(|e| {
            warn!("Credential verification failed: {}", e);
            ApiError::from(e)
        })?;

        let identity = Identity::verified(address);
        debug!(address = %identity, "Caller authenticated");
        Ok(identity)
    }
}

/// Strip an optional `Bearer` scheme, matched case-insensitively. A bare
/// scheme with nothing after it is an empty token.
fn bearer_token(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if raw.eq_ignore_ascii_case("bearer") => "",
        _ => raw,
    }
}
