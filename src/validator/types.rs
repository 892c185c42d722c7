use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Dot-atom local parts only.
    #[default]
    Strict,
    /// Also accepts a simple quoted local part.
    Relaxed,
}

/// One reason an address failed the syntax check.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxIssue {
    TooLong { len: usize },
    AtSignCount { found: usize },
    LocalLength { len: usize },
    LocalCharacters,
    EmptyDomain,
    DomainNotAscii,
    DomainWithoutDot,
    EmptyLabel,
    LabelTooLong { label: String },
    LabelHyphen { label: String },
    LabelCharacters { label: String },
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { len } => write!(f, "total length {len} > 254"),
            Self::AtSignCount { found } => write!(f, "expected exactly one '@', found {found}"),
            Self::LocalLength { len } => write!(f, "local part length {len} invalid (1..=64)"),
            Self::LocalCharacters => f.write_str("invalid local part"),
            Self::EmptyDomain => f.write_str("domain is empty"),
            Self::DomainNotAscii => f.write_str("domain punycode conversion failed"),
            Self::DomainWithoutDot => f.write_str("domain must contain at least one dot"),
            Self::EmptyLabel => f.write_str("empty domain label"),
            Self::LabelTooLong { label } => {
                write!(f, "domain label '{label}' length {} > 63", label.len())
            }
            Self::LabelHyphen { label } => {
                write!(f, "domain label '{label}' cannot start/end with '-'")
            }
            Self::LabelCharacters { label } => write!(f, "domain label '{label}' has invalid chars"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub issues: Vec<SyntaxIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}
