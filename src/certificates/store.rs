use std::sync::{Arc, LazyLock};

use chrono::{Duration, Utc};
use dashmap::DashMap;
use regex::Regex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::certificates::{Certificate, CertificateError};

static SUBJECT_CN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Subject:.*?CN\s*=\s*([^,\n]+)").expect("Invalid regex pattern for Subject")
});

static ISSUER_CN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Issuer:.*?CN\s*=\s*([^,\n]+)").expect("Invalid regex pattern for Issuer")
});

const DEFAULT_NAME: &str = "Imported Certificate";
const UNKNOWN: &str = "Unknown";
const VALIDITY_DAYS: i64 = 365;

/// In-memory certificate store.
///
/// Clones share the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct CertificateStore {
    certificates: Arc<DashMap<String, Certificate>>,
}

impl CertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a PEM certificate, with its private key when given.
    ///
    /// The PEM is not parsed. Subject and issuer common names are picked up
    /// from `Subject: ... CN=` and `Issuer: ... CN=` lines when the text
    /// bundle carries them.
    pub fn import(&self, pem: &str, private_key_pem: Option<String>) -> Certificate {
        let id = Uuid::new_v4().to_string();
        let subject = common_name(&SUBJECT_CN, pem);
        let issuer = common_name(&ISSUER_CN, pem);
        let now = Utc::now();

        let certificate = Certificate {
            name: subject.clone().unwrap_or_else(|| DEFAULT_NAME.to_string()),
            subject: subject.unwrap_or_else(|| UNKNOWN.to_string()),
            issuer: issuer.unwrap_or_else(|| UNKNOWN.to_string()),
            pem: pem.to_string(),
            private_key_pem,
            valid_from: now,
            valid_to: now + Duration::days(VALIDITY_DAYS),
            serial_number: id.clone(),
            id: id.clone(),
        };

        self.certificates.insert(id, certificate.clone());
        info!(
            "Imported certificate {} ({})",
            certificate.id, certificate.name
        );
        certificate
    }

    pub fn get(&self, id: &str) -> Option<Certificate> {
        self.certificates.get(id).map(|entry| entry.value().clone())
    }

    /// All certificates, ordered by name then id.
    pub fn list(&self) -> Vec<Certificate> {
        let mut certificates: Vec<Certificate> = self
            .certificates
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        certificates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        certificates
    }

    pub fn delete(&self, id: &str) -> Result<(), CertificateError> {
        match self.certificates.remove(id) {
            Some(_) => {
                info!("Deleted certificate {id}");
                Ok(())
            }
            None => Err(CertificateError::NotFound(id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Generating certificates needs a crypto backend this build does not have.
    pub fn create(&self, subject: &str) -> Result<Certificate, CertificateError> {
        debug!("Certificate creation requested for subject {subject}");
        Err(CertificateError::Unsupported("creation"))
    }

    pub fn clone_certificate(&self, id: &str) -> Result<Certificate, CertificateError> {
        if !self.certificates.contains_key(id) {
            return Err(CertificateError::NotFound(id.to_string()));
        }
        Err(CertificateError::Unsupported("cloning"))
    }
}

fn common_name(pattern: &Regex, pem: &str) -> Option<String> {
    pattern
        .captures(pem)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
