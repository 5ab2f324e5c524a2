use std::fmt;

use thiserror::Error;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Strict,
    Relaxed,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Relaxed => f.write_str("relaxed"),
        }
    }
}

/// An address that passed the syntax checks, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    /// Trimmed input, as submitted.
    pub address: String,
    pub local: String,
    /// Domain as written, lower-cased.
    pub domain: String,
    /// IDNA (punycode) form of the domain, used for DNS.
    pub ascii_domain: String,
}

/// First syntax rule an address violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("address is empty")]
    Empty,
    #[error("total length {0} > 254")]
    TooLong(usize),
    #[error("must contain exactly one '@'")]
    AtSign,
    #[error("local part length {0} invalid (1..=64)")]
    LocalLength(usize),
    #[error("invalid local part ({0} rules)")]
    LocalChars(ValidationMode),
    #[error("domain part is empty")]
    EmptyDomain,
    #[error("domain punycode conversion failed")]
    Idna,
    #[error("domain must contain at least one dot")]
    NoDot,
    #[error("empty domain label")]
    EmptyLabel,
    #[error("domain label '{label}' length {len} > 63")]
    LabelTooLong { label: String, len: usize },
    #[error("domain label '{0}' cannot start/end with '-'")]
    LabelHyphen(String),
    #[error("domain label '{0}' has invalid chars")]
    LabelChars(String),
}
