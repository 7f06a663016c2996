pub mod api;
pub mod auth;
pub mod config;
pub mod ingest;
pub mod media_account;
pub mod notify;
pub mod secrets;
pub mod telemetry;

// Re-export commonly used types
pub use api::{
    ApiError, ApiResult, BusinessService, Envelope, ErrorKind, FromArguments, InvocationContext,
    NormalizedResponse, Pipeline,
};

pub use auth::{Authorizer, CredentialVerifier, Identity, JwtDidVerifier, VerifierError};

pub use config::{BigQueryConfig, ConfigError, HandlerConfig};
