//! Summary of the identity claims carried by a SAML document.

use serde::{Deserialize, Serialize};

use crate::saml::{
    XmlError,
    tree::{NodeId, XmlTree},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamlInfo {
    pub issuer_response: String,
    pub issuer_assertion: String,
    pub assertion_id: String,
    pub subject: Subject,
    pub conditions: Conditions,
    pub attributes: Vec<Attribute>,
    pub signature_present: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name_id: String,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub not_before: Option<String>,
    pub not_on_or_after: Option<String>,
    pub audiences: Vec<String>,
}

/// One attribute value; multi-valued attributes yield one entry per value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Extracts issuers, subject, conditions and attributes from `xml`.
pub fn extract_info(xml: &str) -> Result<SamlInfo, XmlError> {
    let tree = XmlTree::parse(xml)?;
    let mut info = SamlInfo::default();

    if let Some(response) = tree.find_first("Response") {
        info.issuer_response = child_text(&tree, response, "Issuer");
    }

    if let Some(assertion) = tree.find_first("Assertion") {
        info.assertion_id = tree.attr(assertion, "ID").unwrap_or_default().to_string();
        info.issuer_assertion = child_text(&tree, assertion, "Issuer");
    }

    if info.issuer_response.is_empty() && info.issuer_assertion.is_empty() {
        if let Some(issuer) = tree.find_first("Issuer") {
            info.issuer_assertion = tree.text(issuer);
        }
    }

    if let Some(subject) = tree.find_first("Subject") {
        if let Some(name_id) = tree.first_descendant(subject, "NameID") {
            info.subject = Subject {
                name_id: tree.text(name_id),
                format: tree.attr(name_id, "Format").unwrap_or_default().to_string(),
            };
        }
    }

    if let Some(conditions) = tree.find_first("Conditions") {
        info.conditions = Conditions {
            not_before: tree.attr(conditions, "NotBefore").map(str::to_string),
            not_on_or_after: tree.attr(conditions, "NotOnOrAfter").map(str::to_string),
            audiences: tree
                .descendants(conditions, "AudienceRestriction")
                .into_iter()
                .flat_map(|restriction| tree.descendants(restriction, "Audience"))
                .map(|audience| tree.text(audience))
                .filter(|audience| !audience.is_empty())
                .collect(),
        };
    }

    for statement in tree.find_all("AttributeStatement") {
        for attribute in tree.descendants(statement, "Attribute") {
            let name = tree.attr(attribute, "Name").unwrap_or_default();
            for value in tree.descendants(attribute, "AttributeValue") {
                info.attributes.push(Attribute {
                    name: name.to_string(),
                    value: tree.text(value),
                });
            }
        }
    }

    info.signature_present = tree.find_first("Signature").is_some();
    Ok(info)
}

fn child_text(tree: &XmlTree, node: NodeId, local_name: &str) -> String {
    tree.child(node, local_name)
        .map(|child| tree.text(child))
        .unwrap_or_default()
}
