//! Request level façade over the SAML engine and the certificate store.
//!
//! Every operation answers with a [`BackendResponse`] and never panics on bad
//! input, so hosts can forward the JSON form of the response as is.

mod errors;

pub use errors::{BackendError, SamlError, codes};

use serde::{Deserialize, Serialize};
use config::ConfigError;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    certificates::{Certificate, CertificateError, CertificateStore},
    config::Config,
    saml::{
        self, Binding, SamlMessage,
        info::{SamlInfo, extract_info},
        signer,
        validation::{ValidationResult, validate},
    },
    session::SessionManager,
    telemetry,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SamlError>,
}

impl<T> BackendResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: SamlError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn into_result(self) -> std::result::Result<Option<T>, SamlError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

type Result<T> = std::result::Result<T, BackendError>;

/// SAML operations, certificate management and editing sessions.
#[derive(Debug, Clone, Default)]
pub struct SamlBackend {
    certificates: CertificateStore,
    sessions: SessionManager,
    default_binding: Binding,
}

impl SamlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            certificates: CertificateStore::new(),
            sessions: SessionManager::from_config(&config.session),
            default_binding: config.codec.default_binding,
        }
    }

    /// Loads [`Config`], installs tracing with its filter and builds a backend.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        let config = Config::load()?;
        telemetry::init_tracing_with(&config.telemetry.filter);
        info!("Loaded configuration: {:?}", config);
        Ok(Self::from_config(&config))
    }

    pub fn certificates(&self) -> &CertificateStore {
        &self.certificates
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Decodes `raw`; `binding` falls back to the configured default.
    pub fn decode_saml(&self, raw: &str, binding: Option<&str>) -> BackendResponse<String> {
        respond("decodeSAML", || {
            Ok(saml::decode(raw, self.binding(binding)?)?)
        })
    }

    pub fn encode_saml(&self, xml: &str, binding: Option<&str>) -> BackendResponse<String> {
        respond("encodeSAML", || Ok(saml::encode(xml, self.binding(binding)?)))
    }

    /// Finds and decodes the SAML parameter of a query string or form body.
    pub fn find_message(&self, data: &str) -> BackendResponse<SamlMessage> {
        respond("findMessage", || find_message(data))
    }

    pub fn remove_signatures(&self, xml: &str) -> BackendResponse<String> {
        respond("removeSignatures", || Ok(saml::strip_all_signatures(xml)?))
    }

    pub fn remove_document_signature(&self, xml: &str) -> BackendResponse<String> {
        respond("removeDocumentSignature", || {
            Ok(saml::strip_document_signature(xml)?)
        })
    }

    pub fn remove_assertion_signatures(&self, xml: &str) -> BackendResponse<String> {
        respond("removeAssertionSignatures", || {
            Ok(saml::strip_assertion_signatures(xml)?)
        })
    }

    pub fn sign_saml(&self, xml: &str, certificate_id: &str) -> BackendResponse<String> {
        respond("signSAML", || {
            let certificate = self
                .certificates
                .get(certificate_id)
                .ok_or_else(|| CertificateError::NotFound(certificate_id.to_string()))?;
            Ok(signer::sign(xml, &certificate)?)
        })
    }

    pub fn apply_xsw(&self, xml: &str, variant: i64) -> BackendResponse<String> {
        respond("applyXSW", || Ok(saml::apply_xsw(xml, variant)?))
    }

    pub fn apply_xxe(&self, xml: &str, server_url: &str) -> BackendResponse<String> {
        BackendResponse::ok(saml::apply_xxe(xml, server_url))
    }

    pub fn apply_xslt(&self, xml: &str, payload: &str) -> BackendResponse<String> {
        BackendResponse::ok(saml::apply_xslt(xml, payload))
    }

    pub fn get_certificates(&self) -> BackendResponse<Vec<Certificate>> {
        BackendResponse::ok(self.certificates.list())
    }

    pub fn import_certificate(
        &self,
        pem: &str,
        private_key_pem: Option<String>,
    ) -> BackendResponse<Certificate> {
        BackendResponse::ok(self.certificates.import(pem, private_key_pem))
    }

    pub fn delete_certificate(&self, id: &str) -> BackendResponse<()> {
        respond("deleteCertificate", || Ok(self.certificates.delete(id)?))
    }

    pub fn clone_certificate(&self, id: &str) -> BackendResponse<Certificate> {
        respond("cloneCertificate", || {
            Ok(self.certificates.clone_certificate(id)?)
        })
    }

    pub fn create_certificate(&self, subject: &str) -> BackendResponse<Certificate> {
        respond("createCertificate", || Ok(self.certificates.create(subject)?))
    }

    pub fn extract_info(&self, xml: &str) -> BackendResponse<SamlInfo> {
        respond("extractInfo", || Ok(extract_info(xml)?))
    }

    pub fn validate(&self, xml: &str) -> BackendResponse<ValidationResult> {
        BackendResponse::ok(validate(xml))
    }

    /// Opens an editing session on the SAML message found in `data`.
    pub fn open_session(&self, data: &str) -> BackendResponse<Uuid> {
        respond("openSession", || {
            let message = find_message(data)?;
            Ok(self.sessions.open(message)?)
        })
    }

    fn binding(&self, name: Option<&str>) -> Result<Binding> {
        match name {
            Some(name) => Ok(name.parse()?),
            None => Ok(self.default_binding),
        }
    }
}

fn find_message(data: &str) -> Result<SamlMessage> {
    let parameter = saml::find_saml(data).ok_or(BackendError::NoSamlParameter)?;
    Ok(SamlMessage::decode(parameter)?)
}

fn respond<T>(operation: &str, f: impl FnOnce() -> Result<T>) -> BackendResponse<T> {
    match f() {
        Ok(data) => BackendResponse::ok(data),
        Err(e) => {
            error!("Error in {operation}: {e}");
            BackendResponse::failure(e.to_error())
        }
    }
}
