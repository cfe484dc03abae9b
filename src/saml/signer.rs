//! XML signing entry point.
//!
//! No signing backend is linked in, so signing always fails with an explicit
//! error and never hands back an unsigned document.

use tracing::warn;

use crate::{certificates::Certificate, saml::SignError};

/// Signs `xml` with `certificate`.
pub fn sign(xml: &str, certificate: &Certificate) -> Result<String, SignError> {
    if certificate.private_key_pem.is_none() {
        return Err(SignError::MissingPrivateKey);
    }
    warn!(
        "Refusing to sign a {} byte document with certificate {}: signing unavailable",
        xml.len(),
        certificate.id
    );
    Err(SignError::Unsupported)
}
