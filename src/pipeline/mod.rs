//! Per-address pipeline: syntax, blacklist, MX lookup, SMTP probe.
//!
//! [`Pipeline::check`] stops at the first stage that does not pass and
//! always returns a [`Classification`]; no stage error escapes it.

mod types;

pub use types::{Classification, Status};

use std::sync::Arc;

use tracing::debug;

use crate::blacklist::Blacklist;
use crate::dns::{DnsError, LookupMx, SystemResolver, resolve_mx};
use crate::smtp::{Probe, ProbeResponse, SmtpError, SmtpProber};
use crate::validator::{ValidationMode, validate_address};

pub const DETAIL_VALID: &str = "Email exists and is reachable.";
pub const DETAIL_NO_MAILBOX: &str = "Mailbox does not exist.";
pub const DETAIL_GREYLISTED: &str = "Temporary error, try again later.";
pub const DETAIL_NO_DOMAIN: &str = "Domain does not exist.";
pub const DETAIL_DNS_TIMEOUT: &str = "DNS query timed out.";
pub const DETAIL_NO_MX: &str = "No MX records found for domain.";
pub const DETAIL_CONNECTION_FAILED: &str = "SMTP connection failed.";

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub validation_mode: ValidationMode,
}

pub struct Pipeline<R = SystemResolver, P = SmtpProber> {
    config: PipelineConfig,
    blacklist: Arc<Blacklist>,
    resolver: R,
    prober: P,
}

impl<R, P> Pipeline<R, P>
where
    R: LookupMx,
    P: Probe,
{
    pub fn new(
        config: PipelineConfig,
        blacklist: impl Into<Arc<Blacklist>>,
        resolver: R,
        prober: P,
    ) -> Self {
        Self {
            config,
            blacklist: blacklist.into(),
            resolver,
            prober,
        }
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    /// Classifies one address. Only the highest-priority exchange is probed.
    pub fn check(&self, address: &str) -> Classification {
        let parsed = match validate_address(address, self.config.validation_mode) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(address, %err, "syntax check failed");
                return Classification::invalid(
                    address.trim(),
                    format!("Invalid email syntax: {err}."),
                );
            }
        };

        if self.blacklist.contains_address(&parsed.address) {
            debug!(address = %parsed.address, "domain blacklisted");
            return Classification::new(
                parsed.address,
                Status::Blacklisted,
                format!("Domain {} is blacklisted.", parsed.domain),
            );
        }

        let records = match resolve_mx(&self.resolver, &parsed.ascii_domain) {
            Ok(records) => records,
            Err(err) => {
                debug!(address = %parsed.address, %err, "MX lookup failed");
                return Classification::invalid(parsed.address, dns_detail(&err));
            }
        };
        let Some(primary) = records.first() else {
            return Classification::invalid(parsed.address, DETAIL_NO_MX);
        };

        match self.prober.probe(&primary.exchange, &parsed.address) {
            Ok(response) => {
                let (status, detail) = classify_response(&response);
                debug!(
                    address = %parsed.address,
                    exchange = %primary.exchange,
                    code = response.reply.code,
                    %status,
                    "probe finished"
                );
                Classification::new(parsed.address, status, detail)
            }
            Err(err) => {
                debug!(
                    address = %parsed.address,
                    exchange = %primary.exchange,
                    %err,
                    "probe failed"
                );
                Classification::invalid(parsed.address, smtp_detail(&err))
            }
        }
    }
}

/// Maps the reply that ended the SMTP dialogue to a status.
///
/// Only a `RCPT TO` reply says anything about the mailbox; a refusal at an
/// earlier step is reported by its code alone.
pub fn classify_response(response: &ProbeResponse) -> (Status, String) {
    let code = response.reply.code;
    if !response.reached_rcpt() {
        return (Status::Invalid, format!("SMTP response code {code}."));
    }
    match code {
        250 => (Status::Valid, DETAIL_VALID.to_string()),
        550 => (Status::Invalid, DETAIL_NO_MAILBOX.to_string()),
        451 => (Status::Greylisted, DETAIL_GREYLISTED.to_string()),
        other => (Status::Invalid, format!("SMTP response code {other}.")),
    }
}

fn dns_detail(err: &DnsError) -> String {
    match err {
        DnsError::NoSuchDomain { .. } => DETAIL_NO_DOMAIN.to_string(),
        DnsError::Timeout { .. } => DETAIL_DNS_TIMEOUT.to_string(),
        DnsError::NoRecords { .. } => DETAIL_NO_MX.to_string(),
        other => format!("DNS lookup failed: {other}"),
    }
}

fn smtp_detail(err: &SmtpError) -> String {
    if err.is_connection_failure() {
        DETAIL_CONNECTION_FAILED.to_string()
    } else {
        format!("SMTP error: {err}")
    }
}
