use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertificateError {
    #[error("Certificate not found: {0}")]
    NotFound(String),

    #[error(
        "Certificate {0} is not available in this version. \
        No cryptographic backend is available in this environment. \
        Please import an existing certificate instead."
    )]
    Unsupported(&'static str),
}
