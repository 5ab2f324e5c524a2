use std::time::Duration;

use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::system_conf::read_system_conf;

use super::{DnsError, DnsOptions, MxRecord};

/// A zero query deadline would fail every lookup immediately.
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Resolve the MX records of `domain`, sorted by ascending preference.
///
/// An empty answer is reported as [`DnsError::NoRecords`], so a successful
/// result always holds at least one exchange.
pub fn resolve_mx<R>(resolver: &R, domain: &str) -> Result<Vec<MxRecord>, DnsError>
where
    R: LookupMx + ?Sized,
{
    let ascii = normalize_domain(domain)?;
    let mut records = resolver.lookup_mx(&ascii)?;

    records.sort();
    records.dedup();

    if records.is_empty() {
        Err(DnsError::NoRecords { domain: ascii })
    } else {
        Ok(records)
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    Ok(trimmed.to_ascii_lowercase())
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// Source of MX answers. Implemented by [`SystemResolver`] and by test stubs.
pub trait LookupMx: Send + Sync {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
}

/// MX lookups through the host's resolver configuration with an explicit
/// deadline.
///
/// The blocking `Resolver` serialises queries on an internal lock, so one is
/// built per lookup; workers never wait on each other's DNS traffic.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    pub(crate) config: ResolverConfig,
    pub(crate) opts: ResolverOpts,
}

impl SystemResolver {
    pub fn from_system_conf(options: &DnsOptions) -> Result<Self, DnsError> {
        let (config, opts) = read_system_conf().map_err(DnsError::resolver_init)?;
        Ok(Self::with_config(config, opts, options))
    }

    pub fn with_config(
        config: ResolverConfig,
        mut opts: ResolverOpts,
        options: &DnsOptions,
    ) -> Self {
        opts.timeout = options.timeout.max(MIN_TIMEOUT);
        opts.attempts = options.attempts.max(1);
        Self { config, opts }
    }
}

impl LookupMx for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let resolver =
            Resolver::new(self.config.clone(), self.opts.clone()).map_err(DnsError::resolver_init)?;
        let lookup = resolver
            .mx_lookup(domain)
            .map_err(|err| DnsError::from_resolve(domain, &err))?;
        let records = lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(mx.exchange().to_utf8())))
            .collect();
        Ok(records)
    }
}
