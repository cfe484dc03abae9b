use thiserror::Error;

use crate::saml::{Binding, xsw::XswVariant};

/// Transport codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Error decoding SAML message ({binding} binding): {source}")]
    Decode {
        binding: Binding,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Unknown SAML binding: {0}")]
    UnknownBinding(String),
}

/// Errors raised while building an XSW document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttackError {
    #[error("No Response element found")]
    MissingResponse,

    #[error("No SAML Assertion found in the XML")]
    MissingAssertion,

    #[error("No Signature element found for {0}")]
    MissingSignature(XswVariant),

    #[error("Signature lost during modification")]
    SignatureLost,

    #[error("No Response closing tag found")]
    MissingResponseClose,

    #[error("XSW variant {0} is not supported. Valid variants are 1-8.")]
    InvalidVariant(i64),
}

impl AttackError {
    /// Returns true when the document lacks an element the attack needs.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, AttackError::InvalidVariant(_))
    }
}

/// Signature stripper errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StripError {
    #[error("Invalid XML input for signature removal")]
    InvalidInput,
}

/// Errors produced while reading a document as a tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("XML is empty")]
    Empty,

    #[error("XML parsing failed at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl XmlError {
    /// Builds a syntax error located at a byte offset of `xml`.
    pub(crate) fn at(xml: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(xml, offset);
        XmlError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// One-based (line, column) of the error, (1, 1) when unknown.
    pub fn position(&self) -> (usize, usize) {
        match self {
            XmlError::Empty => (1, 1),
            XmlError::Syntax { line, column, .. } => (*line, *column),
        }
    }
}

/// SAML signing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("Certificate has no private key for signing")]
    MissingPrivateKey,

    #[error(
        "SAML signing is not available in this version. \
        No cryptographic signing backend is available in this environment. \
        Please use an external tool to sign SAML messages."
    )]
    Unsupported,
}

fn line_column(xml: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(xml.len());
    while !xml.is_char_boundary(end) {
        end -= 1;
    }
    let before = &xml[..end];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(pos) => before[pos + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
