pub mod codec;
pub mod editor;
mod error;
pub mod info;
pub mod injection;
pub mod locator;
pub mod message;
pub mod signer;
pub mod stripper;
pub mod tree;
pub mod validation;
pub mod xsw;

pub use codec::{decode, encode};
pub use error::{AttackError, CodecError, SignError, StripError, XmlError};
pub use injection::{apply_xslt, apply_xxe};
pub use locator::{ElementKind, ElementSpan, locate};
pub use message::{SamlMessage, SamlParameter, find_saml, is_saml};
pub use stripper::{strip_all_signatures, strip_assertion_signatures, strip_document_signature};
pub use xsw::{AttackResult, XswVariant, apply_xsw};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Literal markers written into attacked documents.
///
/// Downstream detection tooling greps for these exact strings.
pub mod markers {
    pub const EVIL_RESPONSE_ID: &str = "_evil_response_ID";
    pub const EVIL_ASSERTION_ID: &str = "_evil_assertion_ID";
    pub const EVIL_NAME_ID_PREFIX: &str = "evil-";
}

/// Request parameter names carrying SAML messages.
pub mod params {
    pub const SAML_REQUEST: &str = "SAMLRequest";
    pub const SAML_RESPONSE: &str = "SAMLResponse";
}

/// SAML transport binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    #[default]
    #[serde(rename = "POST", alias = "post", alias = "Post")]
    Post,
    #[serde(rename = "Redirect", alias = "redirect", alias = "REDIRECT")]
    Redirect,
}

impl Binding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Binding::Post => "POST",
            Binding::Redirect => "Redirect",
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Binding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("post") {
            Ok(Binding::Post)
        } else if s.eq_ignore_ascii_case("redirect") {
            Ok(Binding::Redirect)
        } else {
            Err(CodecError::UnknownBinding(s.to_string()))
        }
    }
}
