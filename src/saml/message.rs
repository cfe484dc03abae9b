//! Locating SAML parameters in request data and decoding them into messages.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::saml::{
    Binding, CodecError, codec,
    params::{SAML_REQUEST, SAML_RESPONSE},
};

/// A SAML parameter found in a query string or form body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamlParameter {
    /// Parameter value, URL decoded but still transport encoded
    pub raw: String,
    pub binding: Binding,
    pub parameter: String,
}

/// A decoded SAML message and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamlMessage {
    pub id: String,
    pub raw: String,
    pub decoded: String,
    pub is_response: bool,
    pub binding: Binding,
    pub parameter_name: String,
}

impl SamlMessage {
    /// Decodes the XML carried by `parameter`.
    pub fn decode(parameter: SamlParameter) -> Result<Self, CodecError> {
        let decoded = codec::decode(&parameter.raw, parameter.binding)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            is_response: parameter.parameter == SAML_RESPONSE,
            decoded,
            raw: parameter.raw,
            binding: parameter.binding,
            parameter_name: parameter.parameter,
        })
    }

    /// Re-encodes `xml` with this message's binding.
    pub fn encode_for_parameter(&self, xml: &str) -> String {
        encode_for_parameter(xml, self.binding)
    }
}

/// Finds the SAML parameter of a URL encoded query string or form body.
///
/// `SAMLRequest` takes precedence and implies the Redirect binding,
/// `SAMLResponse` implies POST. Empty values are ignored.
pub fn find_saml(data: &str) -> Option<SamlParameter> {
    let pairs: Vec<(String, String)> = data
        .strip_prefix('?')
        .unwrap_or(data)
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (form_decode(name), form_decode(value))
        })
        .collect();

    let lookup = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .filter(|value| !value.is_empty())
    };

    let found = if let Some(raw) = lookup(SAML_REQUEST) {
        SamlParameter {
            raw,
            binding: Binding::Redirect,
            parameter: SAML_REQUEST.to_string(),
        }
    } else {
        SamlParameter {
            raw: lookup(SAML_RESPONSE)?,
            binding: Binding::Post,
            parameter: SAML_RESPONSE.to_string(),
        }
    };
    debug!("Found {} parameter ({} binding)", found.parameter, found.binding);
    Some(found)
}

/// Cheap check for text that looks like a SAML document.
pub fn is_saml(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('<')
        && [
            "samlp:Response",
            "samlp:AuthnRequest",
            "saml:Assertion",
            SAML_REQUEST,
            SAML_RESPONSE,
        ]
        .iter()
        .any(|needle| trimmed.contains(needle))
}

/// Transport encodes an edited document so the host can put it back into
/// the request. URL encoding is left to the host.
pub fn encode_for_parameter(xml: &str, binding: Binding) -> String {
    codec::encode(xml, binding)
}

fn form_decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes()))
            .into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_saml_response() {
        let found = find_saml("RelayState=abc&SAMLResponse=PGEvPg%3D%3D").unwrap();
        assert_eq!(found.raw, "PGEvPg==");
        assert_eq!(found.binding, Binding::Post);
        assert_eq!(found.parameter, "SAMLResponse");
    }

    #[test]
    fn test_request_wins_over_response() {
        let found = find_saml("?SAMLResponse=x&SAMLRequest=y").unwrap();
        assert_eq!(found.raw, "y");
        assert_eq!(found.binding, Binding::Redirect);
        assert_eq!(found.parameter, "SAMLRequest");
    }

    #[test]
    fn test_plus_is_space() {
        let found = find_saml("SAMLResponse=ab+cd").unwrap();
        assert_eq!(found.raw, "ab cd");
    }

    #[test]
    fn test_empty_or_missing() {
        assert!(find_saml("").is_none());
        assert!(find_saml("foo=bar").is_none());
        assert!(find_saml("SAMLRequest=&SAMLResponse=").is_none());
        let found = find_saml("SAMLRequest=&SAMLResponse=z").unwrap();
        assert_eq!(found.binding, Binding::Post);
    }

    #[test]
    fn test_decode_message() {
        let parameter = find_saml("SAMLResponse=PGEvPg%3D%3D").unwrap();
        let message = SamlMessage::decode(parameter).unwrap();
        assert_eq!(message.decoded, "<a/>");
        assert!(message.is_response);
        assert_eq!(message.parameter_name, "SAMLResponse");
        assert!(Uuid::parse_str(&message.id).is_ok());
        assert_eq!(message.encode_for_parameter("<a/>"), "PGEvPg==");
    }

    #[test]
    fn test_decode_invalid() {
        let parameter = SamlParameter {
            raw: "!!".to_string(),
            binding: Binding::Redirect,
            parameter: SAML_REQUEST.to_string(),
        };
        assert!(SamlMessage::decode(parameter).is_err());
    }

    #[test]
    fn test_is_saml() {
        assert!(is_saml("  <samlp:Response ID=\"x\"/>"));
        assert!(is_saml("<root><saml:Assertion/></root>"));
        assert!(!is_saml("SAMLResponse=abc"));
        assert!(!is_saml("<html></html>"));
    }

    #[test]
    fn test_message_json_shape() {
        let message = SamlMessage {
            id: "1".to_string(),
            raw: "r".to_string(),
            decoded: "d".to_string(),
            is_response: false,
            binding: Binding::Redirect,
            parameter_name: "SAMLRequest".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["isResponse"], false);
        assert_eq!(json["parameterName"], "SAMLRequest");
        assert_eq!(json["binding"], "Redirect");
    }
}
