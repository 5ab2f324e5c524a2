#![forbid(unsafe_code)]
//! mailsweep : vérification en masse de la délivrabilité d'adresses e-mail.
//!
//! Each address goes through syntax validation, a domain blacklist, an MX
//! lookup and an SMTP `RCPT TO` probe against the preferred exchange; a
//! bounded worker pool runs many addresses at once.
//!
//! The SMTP probe is a heuristic. Catch-all domains accept any recipient,
//! and servers that verify senders or greylist unknown clients may refuse
//! the probe itself, so `Valid` and `Invalid` are indications, not proof.

pub mod blacklist;
pub mod dns;
pub mod input;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod smtp;
pub mod validator;

pub use blacklist::{Blacklist, BlacklistError};
pub use dns::{DnsError, DnsOptions, LookupMx, MxRecord, SystemResolver, resolve_mx};
pub use input::read_list;
pub use pipeline::{Classification, Pipeline, PipelineConfig, Status, classify_response};
pub use report::{RunReport, StatusCounts};
pub use scheduler::{
    CancelToken, NoProgress, Progress, ProgressObserver, RunOptions, Scheduler, SchedulerError,
};
pub use smtp::{
    DEFAULT_SENDER, Probe, ProbeOptions, ProbeResponse, ProbeStage, SmtpError, SmtpProber,
    SmtpReply,
};
pub use validator::{ParsedAddress, SyntaxError, ValidationMode, validate_address};
