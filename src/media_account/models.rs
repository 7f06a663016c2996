use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::envelope::Envelope;
use crate::api::pipeline::FromArguments;

/// Arguments of the `applyForMedia` resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyForMediaInput {
    pub name: String,
    pub mail_address: String,
    pub url: String,
}

impl FromArguments for ApplyForMediaInput {
    fn from_arguments(envelope: &Envelope) -> Self {
        Self {
            name: envelope.field("name"),
            mail_address: envelope.field("mailAddress"),
            url: envelope.field("url"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting review; the only state this handler writes
    Pending,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ApplicationStatus::Pending),
            _ => None,
        }
    }
}

/// Stored media account application, one per account address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaApplication {
    pub id: Uuid,
    pub address: String,
    pub name: String,
    pub mail_address: String,
    pub url: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl MediaApplication {
    pub fn pending(address: String, input: ApplyForMediaInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            address,
            name: input.name,
            mail_address: input.mail_address,
            url: input.url,
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        }
    }
}

pub type ApplyForMediaOutput = MediaApplication;
