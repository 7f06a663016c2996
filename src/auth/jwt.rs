use async_trait::async_trait;
use ethers::types::Address;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::identity::parse_address;
use crate::auth::verifier::{CredentialVerifier, VerifierError};

const DID_PKH_PREFIX: &str = "did:pkh:eip155:";

/// JWT claims issued at sign-in.
/// The 'did' claim has the form did:pkh:eip155:1:0xADDRESS
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    did: String,
    exp: i64,
}

/// Verifies HS256 JWTs carrying a `did:pkh` account claim.
pub struct JwtDidVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtDidVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are not issued for a specific audience
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl CredentialVerifier for JwtDidVerifier {
    async fn verify(&self, token: &str) -> Result<Address, VerifierError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::warn!("JWT validation failed: {}", e);
                VerifierError::Rejected(format!("Invalid JWT token: {}", e))
            })?;

        address_from_did(&token_data.claims.did)
            .ok_or_else(|| VerifierError::Rejected("Invalid DID format in JWT".to_string()))
    }
}

/// did:pkh:eip155:<chain>:0xADDRESS -> address
fn address_from_did(did: &str) -> Option<Address> {
    let rest = did.strip_prefix(DID_PKH_PREFIX)?;
    let (_chain, address) = rest.split_once(':')?;
    parse_address(address)
}
