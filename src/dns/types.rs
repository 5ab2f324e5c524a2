use std::time::Duration;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Resolver knobs for [`SystemResolver`](super::SystemResolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsOptions {
    /// Deadline for a single MX query.
    pub timeout: Duration,
    pub attempts: usize,
}

impl Default for DnsOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            attempts: 1,
        }
    }
}
