use std::fmt;

/// Outcome of checking one address. Every failure mode funnels into one of
/// these four.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Valid,
    Invalid,
    Greylisted,
    Blacklisted,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Valid,
        Status::Invalid,
        Status::Greylisted,
        Status::Blacklisted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::Greylisted => "Greylisted",
            Self::Blacklisted => "Blacklisted",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the report: the address as submitted (trimmed), its status
/// and a human-readable detail.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub address: String,
    pub status: Status,
    pub detail: String,
}

impl Classification {
    pub fn new(address: impl Into<String>, status: Status, detail: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status,
            detail: detail.into(),
        }
    }

    pub fn invalid(address: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(address, Status::Invalid, detail)
    }
}
