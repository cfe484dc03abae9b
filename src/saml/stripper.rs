//! Signature removal with three scopes: everything, the document-level
//! signature only, or assertion signatures only.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::saml::{
    StripError,
    editor::strip_signatures,
    locator::{ElementKind, locate_all},
};

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[\r\n]").expect("Invalid regex pattern for blank lines"));

const PLACEHOLDER_PREFIX: &str = "__ASSERTION_PLACEHOLDER_";

/// Removes every Signature element of the document.
pub fn strip_all_signatures(xml: &str) -> Result<String, StripError> {
    check_input(xml)?;
    let stripped = strip_signatures(xml);
    debug!("Removed {} signature(s)", count_removed(xml, &stripped));
    Ok(collapse_blank_lines(&stripped))
}

/// Removes the Signature elements that are not inside an Assertion.
pub fn strip_document_signature(xml: &str) -> Result<String, StripError> {
    check_input(xml)?;

    let assertion = ElementKind::Assertion.pattern();
    let mut assertions = Vec::new();
    let masked = assertion.replace_all(xml, |span| {
        assertions.push(span.raw);
        placeholder(assertions.len() - 1)
    });

    let mut result = strip_signatures(&masked);
    for (index, original) in assertions.iter().enumerate() {
        result = result.replacen(&placeholder(index), original, 1);
    }

    debug!(
        "Removed {} document signature(s), kept {} assertion(s)",
        count_removed(xml, &result),
        assertions.len()
    );
    Ok(collapse_blank_lines(&result))
}

/// Removes the Signature elements nested inside each Assertion and leaves
/// everything outside assertions alone.
pub fn strip_assertion_signatures(xml: &str) -> Result<String, StripError> {
    check_input(xml)?;

    let result = ElementKind::Assertion.pattern().replace_all(xml, |span| {
        format!(
            "{}{}{}",
            span.open_tag(),
            strip_signatures(span.content()),
            span.close_tag()
        )
    });

    debug!(
        "Removed {} assertion signature(s)",
        count_removed(xml, &result)
    );
    Ok(collapse_blank_lines(&result))
}

fn check_input(xml: &str) -> Result<(), StripError> {
    if xml.is_empty() {
        return Err(StripError::InvalidInput);
    }
    Ok(())
}

fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}__")
}

fn collapse_blank_lines(xml: &str) -> String {
    BLANK_LINES.replace_all(xml, "").into_owned()
}

fn count_removed(before: &str, after: &str) -> usize {
    let count = |text: &str| locate_all(ElementKind::Signature, text).count();
    count(before).saturating_sub(count(after))
}
