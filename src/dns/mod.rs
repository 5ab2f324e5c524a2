//! DNS MX resolution.
//!
//! [`resolve_mx`] runs a lookup through any [`LookupMx`] implementation and
//! returns the exchanges ordered by preference. Failures are split into
//! "no such domain", "timed out", "no MX records" and everything else.

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{LookupMx, SystemResolver, resolve_mx};
pub use types::{DnsOptions, MxRecord};
