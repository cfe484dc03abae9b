//! Prefix-agnostic element scanning over raw XML text.
//!
//! Elements are recognised by local name whatever namespace prefix is bound
//! to them. The closing tag must carry the same prefix as the opening tag, or
//! none at all, and the first acceptable closing tag wins. An element nested
//! inside another element of the same local name therefore ends the outer
//! match early. Documents are never parsed into a tree here, so untouched
//! bytes stay untouched.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RESPONSE: LazyLock<ElementPattern> =
    LazyLock::new(|| ElementPattern::new("Response", false, Content::Any));

static ASSERTION: LazyLock<ElementPattern> =
    LazyLock::new(|| ElementPattern::new("Assertion", true, Content::Any));

static SIGNATURE: LazyLock<ElementPattern> =
    LazyLock::new(|| ElementPattern::new("Signature", true, Content::Any));

/// `NameID` elements whose content is plain text.
pub(crate) static NAME_ID: LazyLock<ElementPattern> =
    LazyLock::new(|| ElementPattern::new("NameID", false, Content::TextOnly));

static ID_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)ID="([^"]+)""#).expect("Invalid regex pattern for ID"));

/// Element kinds the locator knows how to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Response,
    Assertion,
    Signature,
}

impl ElementKind {
    pub fn local_name(&self) -> &'static str {
        self.pattern().local_name
    }

    pub(crate) fn pattern(&self) -> &'static ElementPattern {
        match self {
            ElementKind::Response => &RESPONSE,
            ElementKind::Assertion => &ASSERTION,
            ElementKind::Signature => &SIGNATURE,
        }
    }
}

/// A located element, borrowed from the scanned document.
///
/// `raw == source[start..end]` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan<'a> {
    /// Text of the whole element, opening and closing tags included
    pub raw: &'a str,
    /// Absolute byte offset of the opening `<`
    pub start: usize,
    /// Absolute byte offset just past the closing `>`
    pub end: usize,
    /// Namespace prefix of the opening tag including the colon, or `""`
    pub prefix: &'a str,
    /// Value of the `ID` attribute, or `""`
    pub id: &'a str,
    open_end: usize,
    close_start: usize,
}

impl<'a> ElementSpan<'a> {
    /// The opening tag, attributes included
    pub fn open_tag(&self) -> &'a str {
        &self.raw[..self.open_end - self.start]
    }

    /// Everything between the opening and the closing tag
    pub fn content(&self) -> &'a str {
        &self.raw[self.open_end - self.start..self.close_start - self.start]
    }

    /// The closing tag
    pub fn close_tag(&self) -> &'a str {
        &self.raw[self.close_start - self.start..]
    }

    /// Absolute byte offset of the closing tag
    pub fn close_start(&self) -> usize {
        self.close_start
    }
}

/// Finds the first element of `kind` in `xml`.
pub fn locate(kind: ElementKind, xml: &str) -> Option<ElementSpan<'_>> {
    kind.pattern().find_at(xml, 0)
}

/// Iterates over the non-overlapping elements of `kind` in document order.
pub fn locate_all(kind: ElementKind, xml: &str) -> Elements<'static, '_> {
    kind.pattern().find_iter(xml)
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Content {
    /// Anything up to the first acceptable closing tag
    Any,
    /// Text only, the closing tag must follow the first `<`
    TextOnly,
}

/// Opening tag regex plus the closing tag rules of one local name
#[derive(Debug)]
pub(crate) struct ElementPattern {
    local_name: &'static str,
    open: Regex,
    content: Content,
}

impl ElementPattern {
    fn new(local_name: &'static str, word_boundary: bool, content: Content) -> Self {
        let boundary = if word_boundary { r"\b" } else { "" };
        let pattern = format!(r"(?i)<([a-zA-Z0-9]*:)?{local_name}{boundary}([^>]*)>");
        Self {
            local_name,
            open: Regex::new(&pattern).expect("Invalid regex pattern for element"),
            content,
        }
    }

    /// Finds the first element starting at or after `from`.
    ///
    /// An opening tag without an acceptable closing tag is skipped and the
    /// scan resumes one character after its `<`.
    pub(crate) fn find_at<'t>(&self, text: &'t str, mut from: usize) -> Option<ElementSpan<'t>> {
        while from <= text.len() {
            let caps = self.open.captures_at(text, from)?;
            let open = caps.get(0)?;
            let prefix = caps.get(1).map_or("", |m| m.as_str());

            if let Some((close_start, end)) = self.close_after(text, open.end(), prefix) {
                let attributes = caps.get(2).map_or("", |m| m.as_str());
                return Some(ElementSpan {
                    raw: &text[open.start()..end],
                    start: open.start(),
                    end,
                    prefix,
                    id: extract_id(attributes),
                    open_end: open.end(),
                    close_start,
                });
            }
            // '<' is a single byte, so this stays on a char boundary
            from = open.start() + 1;
        }
        None
    }

    pub(crate) fn find_iter<'p, 't>(&'p self, text: &'t str) -> Elements<'p, 't> {
        Elements {
            pattern: self,
            text,
            pos: 0,
        }
    }

    /// Replaces every element with the output of `replace`, copying the text
    /// between matches unchanged.
    pub(crate) fn replace_all<'t, F>(&self, text: &'t str, mut replace: F) -> String
    where
        F: FnMut(&ElementSpan<'t>) -> String,
    {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for span in self.find_iter(text) {
            result.push_str(&text[last..span.start]);
            result.push_str(&replace(&span));
            last = span.end;
        }
        result.push_str(&text[last..]);
        result
    }

    fn close_after(&self, text: &str, from: usize, prefix: &str) -> Option<(usize, usize)> {
        let bytes = text.as_bytes();
        let tail = &text[from..];
        match self.content {
            Content::Any => tail.match_indices("</").find_map(|(offset, _)| {
                let at = from + offset;
                close_tag_len(&bytes[at..], prefix, self.local_name).map(|len| (at, at + len))
            }),
            Content::TextOnly => {
                let at = from + tail.find('<')?;
                close_tag_len(&bytes[at..], prefix, self.local_name).map(|len| (at, at + len))
            }
        }
    }
}

/// Iterator over elements, see [`locate_all`]
#[derive(Debug)]
pub struct Elements<'p, 't> {
    pattern: &'p ElementPattern,
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for Elements<'_, 't> {
    type Item = ElementSpan<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.pattern.find_at(self.text, self.pos)?;
        self.pos = span.end;
        Some(span)
    }
}

/// Length of the closing tag at the start of `bytes`, if it closes
/// `local_name` with either `prefix` or no prefix.
fn close_tag_len(bytes: &[u8], prefix: &str, local_name: &str) -> Option<usize> {
    let rest = bytes.strip_prefix(b"</")?;
    let name_at = |skip: usize| {
        let end = skip + local_name.len();
        let name = rest.get(skip..end)?;
        (name.eq_ignore_ascii_case(local_name.as_bytes()) && rest.get(end) == Some(&b'>'))
            .then_some(2 + end + 1)
    };

    let prefixed = rest
        .get(..prefix.len())
        .filter(|p| !prefix.is_empty() && p.eq_ignore_ascii_case(prefix.as_bytes()))
        .and_then(|_| name_at(prefix.len()));
    prefixed.or_else(|| name_at(0))
}

fn extract_id(attributes: &str) -> &str {
    ID_ATTRIBUTE
        .captures(attributes)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_any_prefix() {
        for (xml, prefix) in [
            (r#"<samlp:Response ID="r1">x</samlp:Response>"#, "samlp:"),
            (r#"<saml2p:Response ID="r1">x</saml2p:Response>"#, "saml2p:"),
            (r#"<Response ID="r1">x</Response>"#, ""),
        ] {
            let span = locate(ElementKind::Response, xml).expect("response");
            assert_eq!(span.prefix, prefix);
            assert_eq!(span.id, "r1");
            assert_eq!(span.raw, xml);
            assert_eq!(span.content(), "x");
        }
    }

    #[test]
    fn test_span_offsets() {
        let xml = r#"<?xml version="1.0"?><r><saml:Assertion ID="a1"><b/></saml:Assertion></r>"#;
        let span = locate(ElementKind::Assertion, xml).unwrap();
        assert_eq!(&xml[span.start..span.end], span.raw);
        assert_eq!(span.open_tag(), r#"<saml:Assertion ID="a1">"#);
        assert_eq!(span.close_tag(), "</saml:Assertion>");
        assert_eq!(&xml[span.close_start()..span.end], "</saml:Assertion>");
    }

    #[test]
    fn test_mismatched_prefix_does_not_match() {
        let xml = r#"<saml:Assertion ID="a">x</saml2:Assertion>"#;
        assert!(locate(ElementKind::Assertion, xml).is_none());
    }

    #[test]
    fn test_unprefixed_close_is_accepted() {
        let xml = r#"<saml:Assertion ID="a">x</Assertion>"#;
        let span = locate(ElementKind::Assertion, xml).unwrap();
        assert_eq!(span.close_tag(), "</Assertion>");
    }

    #[test]
    fn test_case_insensitive() {
        let xml = r#"<SAML:ASSERTION id="low">x</saml:assertion>"#;
        let span = locate(ElementKind::Assertion, xml).unwrap();
        assert_eq!(span.id, "low");
        assert_eq!(span.prefix, "SAML:");
    }

    #[test]
    fn test_nested_same_name_binds_to_first_close() {
        let xml = r#"<saml:Assertion ID="outer"><saml:Assertion ID="inner">a</saml:Assertion>b</saml:Assertion>"#;
        let span = locate(ElementKind::Assertion, xml).unwrap();
        assert_eq!(span.id, "outer");
        assert_eq!(
            span.raw,
            r#"<saml:Assertion ID="outer"><saml:Assertion ID="inner">a</saml:Assertion>"#
        );
    }

    #[test]
    fn test_missing_id_is_empty() {
        let xml = "<ds:Signature><ds:SignedInfo/></ds:Signature>";
        let span = locate(ElementKind::Signature, xml).unwrap();
        assert_eq!(span.id, "");
        assert_eq!(span.prefix, "ds:");
    }

    #[test]
    fn test_not_found() {
        assert!(locate(ElementKind::Assertion, "<samlp:Response/>").is_none());
        assert!(locate(ElementKind::Signature, "").is_none());
    }

    #[test]
    fn test_word_boundary_for_signature() {
        let xml = "<ds:SignatureValue>abc</ds:SignatureValue>";
        assert!(locate(ElementKind::Signature, xml).is_none());
    }

    #[test]
    fn test_unclosed_element_is_skipped() {
        let xml = r#"<saml:Assertion ID="x"><foo/><saml2:Assertion ID="y">z</saml2:Assertion>"#;
        let span = locate(ElementKind::Assertion, xml).unwrap();
        assert_eq!(span.id, "y");
        assert_eq!(span.prefix, "saml2:");
    }

    #[test]
    fn test_locate_all_in_order() {
        let xml = r#"<r><a:Assertion ID="1"/>x</a:Assertion><Assertion ID="2">y</Assertion></r>"#;
        let ids: Vec<_> = locate_all(ElementKind::Assertion, xml)
            .map(|span| span.id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_name_id_requires_text_content() {
        let xml = "<saml:NameID>user</saml:NameID><NameID><b/>x</NameID>";
        let spans: Vec<_> = NAME_ID.find_iter(xml).collect();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content(), "user");
    }

    #[test]
    fn test_replace_all_keeps_gaps() {
        let xml = "a<ds:Signature>1</ds:Signature>b<Signature>2</Signature>c";
        let result = SIGNATURE.replace_all(xml, |span| format!("[{}]", span.content()));
        assert_eq!(result, "a[1]b[2]c");
    }
}
