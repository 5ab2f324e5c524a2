//! SMTP recipient probing.
//!
//! [`SmtpProber`] connects to a mail exchange, walks the envelope up to
//! `RCPT TO` and returns the reply that ended the exchange. Interpreting the
//! code is left to the caller; no retries happen here.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use error::SmtpError;
pub use options::{DEFAULT_SENDER, ProbeOptions};
pub use probe::{Probe, SmtpProber};
pub use types::{ProbeResponse, ProbeStage, SmtpReply};

#[cfg(test)]
pub(crate) use probe::tests as mock;
