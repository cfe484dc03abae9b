use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    certificates::CertificateError,
    saml::{AttackError, CodecError, SignError, StripError, XmlError},
    session::SessionError,
};

/// Machine readable error codes of [`SamlError`]
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const NO_ASSERTION: &str = "NO_ASSERTION";
    pub const NO_SIGNATURE: &str = "NO_SIGNATURE";
    pub const CERT_NOT_FOUND: &str = "CERT_NOT_FOUND";
    pub const CERT_NO_KEY: &str = "CERT_NO_KEY";
    pub const INVALID_VARIANT: &str = "INVALID_VARIANT";
    pub const UNSUPPORTED: &str = "UNSUPPORTED";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const SESSION_ERROR: &str = "SESSION_ERROR";
}

/// Error payload of a failed [`BackendResponse`](crate::backend::BackendResponse)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamlError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Attack(#[from] AttackError),
    #[error(transparent)]
    Strip(#[from] StripError),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    Certificate(#[from] CertificateError),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("No SAMLRequest or SAMLResponse parameter found")]
    NoSamlParameter,
}

impl BackendError {
    /// Convert this error to an error code
    pub fn code(&self) -> &'static str {
        use BackendError::*;

        match self {
            Codec(CodecError::Decode { .. }) | Xml(_) => codes::PARSE_ERROR,
            Codec(CodecError::UnknownBinding(_)) => codes::INVALID_INPUT,
            Attack(AttackError::MissingAssertion) => codes::NO_ASSERTION,
            Attack(AttackError::MissingSignature(_) | AttackError::SignatureLost) => {
                codes::NO_SIGNATURE
            }
            Attack(AttackError::InvalidVariant(_)) => codes::INVALID_VARIANT,
            Attack(AttackError::MissingResponse | AttackError::MissingResponseClose) => {
                codes::INVALID_INPUT
            }
            Strip(_) | NoSamlParameter => codes::INVALID_INPUT,
            Certificate(CertificateError::NotFound(_)) => codes::CERT_NOT_FOUND,
            Certificate(CertificateError::Unsupported(_)) | Sign(SignError::Unsupported) => {
                codes::UNSUPPORTED
            }
            Sign(SignError::MissingPrivateKey) => codes::CERT_NO_KEY,
            Session(_) => codes::SESSION_ERROR,
        }
    }

    /// Convert this error to the payload sent back to callers
    pub fn to_error(&self) -> SamlError {
        let details = self.to_string();
        let message = match self {
            BackendError::Xml(_) => format!("Invalid XML: {details}"),
            _ => details.clone(),
        };
        SamlError {
            code: self.code().to_string(),
            message,
            details: Some(details),
        }
    }
}
