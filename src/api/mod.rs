pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod response;

pub use envelope::{Envelope, GatewayEnvelope, ResolverEnvelope};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use pipeline::{BusinessService, FromArguments, InvocationContext, Pipeline};
pub use response::{cors_headers, failure, success, NormalizedResponse};
