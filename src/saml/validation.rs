use serde::{Deserialize, Serialize};

use crate::saml::{XmlError, tree::XmlTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self::at(1, 1, message, Severity::Error)
    }

    fn warning(message: impl Into<String>) -> Self {
        Self::at(1, 1, message, Severity::Warning)
    }

    fn at(line: usize, column: usize, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: !errors.iter().any(|e| e.severity == Severity::Error),
            errors,
        }
    }
}

/// Checks well-formedness first and, for well-formed documents, the presence
/// of the SAML elements a login flow relies on.
pub fn validate(xml: &str) -> ValidationResult {
    let tree = match XmlTree::parse(xml) {
        Ok(tree) => tree,
        Err(XmlError::Empty) => {
            return ValidationResult::from_issues(vec![ValidationIssue::error("XML is empty")]);
        }
        Err(error @ XmlError::Syntax { .. }) => {
            let (line, column) = error.position();
            return ValidationResult::from_issues(vec![ValidationIssue::at(
                line,
                column,
                error.to_string(),
                Severity::Error,
            )]);
        }
    };

    let mut issues = Vec::new();
    if tree.find_first("Assertion").is_none() {
        issues.push(ValidationIssue::error("No SAML Assertion element found"));
    }
    if tree.find_first("Issuer").is_none() {
        issues.push(ValidationIssue::warning("No SAML Issuer element found"));
    }
    if tree.find_first("Subject").is_none() {
        issues.push(ValidationIssue::warning("No SAML Subject element found"));
    }
    ValidationResult::from_issues(issues)
}
