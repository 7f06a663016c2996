pub mod models;
pub mod repository;
pub mod service;

pub use models::{ApplicationStatus, ApplyForMediaInput, ApplyForMediaOutput, MediaApplication};
pub use repository::{DynamoDbMediaAccountRepository, MediaAccountRepository};
pub use service::MediaAccountService;
