use super::types::SyntaxIssue;

const MAX_LABEL_LEN: usize = 63;

/// Converts the domain to its IDNA form, then checks every label.
pub(crate) fn domain_issues(domain: &str, issues: &mut Vec<SyntaxIssue>) {
    if domain.is_empty() {
        issues.push(SyntaxIssue::EmptyDomain);
        return;
    }
    let Ok(ascii) = idna::domain_to_ascii(domain) else {
        issues.push(SyntaxIssue::DomainNotAscii);
        return;
    };
    if ascii.is_empty() {
        issues.push(SyntaxIssue::EmptyDomain);
        return;
    }
    if !ascii.contains('.') {
        issues.push(SyntaxIssue::DomainWithoutDot);
    }
    for label in ascii.split('.') {
        label_issues(label, issues);
    }
}

fn label_issues(label: &str, issues: &mut Vec<SyntaxIssue>) {
    if label.is_empty() {
        issues.push(SyntaxIssue::EmptyLabel);
        return;
    }
    if label.len() > MAX_LABEL_LEN {
        issues.push(SyntaxIssue::LabelTooLong {
            label: label.to_string(),
        });
    }
    if label.starts_with('-') || label.ends_with('-') {
        issues.push(SyntaxIssue::LabelHyphen {
            label: label.to_string(),
        });
    }
    if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        issues.push(SyntaxIssue::LabelCharacters {
            label: label.to_string(),
        });
    }
}

/// Lower-cased IDNA form of `domain`; the lower-cased input when the
/// conversion fails.
pub(crate) fn ascii_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    idna::domain_to_ascii(&lower).unwrap_or(lower)
}
