mod error;
mod store;

pub use error::CertificateError;
pub use store::CertificateStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A certificate held by the store, PEM text kept as imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub name: String,
    pub pem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_pem: Option<String>,
    pub subject: String,
    pub issuer: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub serial_number: String,
}

impl Certificate {
    pub fn has_private_key(&self) -> bool {
        self.private_key_pem.is_some()
    }
}
