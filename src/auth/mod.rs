pub mod identity;
pub mod jwt;
pub mod verifier;

pub use identity::Identity;
pub use jwt::JwtDidVerifier;
pub use verifier::{Authorizer, CredentialVerifier, VerifierError};
