//! Text-surgery primitives over a single element's text.
//!
//! Each function returns a new string and leaves the input untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::saml::{
    locator::{ElementKind, NAME_ID},
    markers::EVIL_NAME_ID_PREFIX,
};

static ID_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)ID="[^"]*""#).expect("Invalid regex pattern for ID"));

/// Removes every `Signature` subtree found anywhere in `element`.
pub fn strip_signatures(element: &str) -> String {
    ElementKind::Signature
        .pattern()
        .replace_all(element, |_| String::new())
}

/// Replaces the first `ID="..."` attribute with `new_id`.
///
/// The caller must pass text scoped to the element whose ID should change.
pub fn set_id(element: &str, new_id: &str) -> String {
    match ID_ATTRIBUTE.find(element) {
        Some(m) => {
            let mut result = String::with_capacity(element.len() + new_id.len());
            result.push_str(&element[..m.start()]);
            result.push_str("ID=\"");
            result.push_str(new_id);
            result.push('"');
            result.push_str(&element[m.end()..]);
            result
        }
        None => element.to_string(),
    }
}

/// Prefixes the text of every `NameID` element with `evil-`.
pub fn mark_evil(element: &str) -> String {
    NAME_ID.replace_all(element, |span| {
        format!(
            "{}{EVIL_NAME_ID_PREFIX}{}{}",
            span.open_tag(),
            span.content(),
            span.close_tag()
        )
    })
}
