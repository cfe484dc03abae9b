//! Base64 transport codec for the POST and Redirect bindings.
//!
//! Redirect messages are neither inflated on decode nor deflated on encode.
//! Real Redirect binding traffic is DEFLATE compressed and decodes to
//! garbage here; only this codec's own output round-trips.

use base64::{
    Engine as _,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD},
};
use tracing::debug;

use crate::saml::{Binding, CodecError};

/// Standard alphabet; padding optional and stray trailing bits ignored on decode
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes a transport encoded SAML message into XML text.
///
/// ASCII whitespace inside `raw` is ignored. POST payloads that are not valid
/// UTF-8 are read one byte per character.
pub fn decode(raw: &str, binding: Binding) -> Result<String, CodecError> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = FORGIVING
        .decode(compact.as_bytes())
        .map_err(|source| CodecError::Decode { binding, source })?;

    let xml = match binding {
        Binding::Post => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
        },
        Binding::Redirect => String::from_utf8_lossy(&bytes).into_owned(),
    };

    debug!(
        "Decoded {} byte {binding} message into {} bytes of XML",
        raw.len(),
        xml.len()
    );
    Ok(xml)
}

/// Encodes XML text for transport with the given binding.
pub fn encode(xml: &str, binding: Binding) -> String {
    let encoded = STANDARD.encode(xml.as_bytes());
    debug!(
        "Encoded {} bytes of XML into a {} byte {binding} message",
        xml.len(),
        encoded.len()
    );
    encoded
}
