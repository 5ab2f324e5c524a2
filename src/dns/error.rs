use thiserror::Error;

use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::error::ProtoErrorKind;
use trust_dns_resolver::proto::op::ResponseCode;

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain {domain} does not exist")]
    NoSuchDomain { domain: String },
    #[error("no MX records for {domain}")]
    NoRecords { domain: String },
    #[error("MX query for {domain} timed out")]
    Timeout { domain: String },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("{message}")]
    Lookup { domain: String, message: String },
}

impl DnsError {
    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    /// Sorts a resolver failure into the cases callers report separately.
    pub(crate) fn from_resolve(domain: &str, err: &ResolveError) -> Self {
        let domain = domain.to_string();
        match err.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. }
                if *response_code == ResponseCode::NXDomain =>
            {
                Self::NoSuchDomain { domain }
            }
            ResolveErrorKind::NoRecordsFound { .. } => Self::NoRecords { domain },
            ResolveErrorKind::Timeout => Self::Timeout { domain },
            ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
                Self::Timeout { domain }
            }
            ResolveErrorKind::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
                Self::Timeout { domain }
            }
            _ => Self::Lookup {
                domain,
                message: err.to_string(),
            },
        }
    }
}
