//! Caller-supplied set of disallowed domains.
//!
//! The set is built once before a run and only read afterwards, so workers
//! share it behind an `Arc` without locking.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::input::read_list;

#[derive(Debug, Error)]
pub enum BlacklistError {
    #[error("cannot open blacklist {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read blacklist: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    domains: HashSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .filter_map(|d| normalize_entry(d.as_ref()))
            .collect();
        Self { domains }
    }

    /// One domain per line; blank lines and `#` comments are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, BlacklistError> {
        let entries = read_list(reader).map_err(|source| BlacklistError::Read { source })?;
        Ok(Self::new(entries))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BlacklistError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BlacklistError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Case-insensitive exact match on the domain.
    pub fn contains(&self, domain: &str) -> bool {
        if self.domains.is_empty() {
            return false;
        }
        normalize_entry(domain).is_some_and(|d| self.domains.contains(&d))
    }

    /// Looks up the domain of `address`, i.e. the text after its last '@'.
    pub fn contains_address(&self, address: &str) -> bool {
        self.contains(domain_of(address))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Text after the last '@', or the empty string.
pub fn domain_of(address: &str) -> &str {
    address
        .trim()
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .unwrap_or("")
}

fn normalize_entry(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('@').trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    Some(idna::domain_to_ascii(&lowered).unwrap_or(lowered))
}
