//! Aggregated outcome of a run, and its tabular export.

use crate::pipeline::{Classification, Status};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub valid: usize,
    pub invalid: usize,
    pub greylisted: usize,
    pub blacklisted: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Status) {
        *self.slot(status) += 1;
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Valid => self.valid,
            Status::Invalid => self.invalid,
            Status::Greylisted => self.greylisted,
            Status::Blacklisted => self.blacklisted,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.greylisted + self.blacklisted
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Valid => &mut self.valid,
            Status::Invalid => &mut self.invalid,
            Status::Greylisted => &mut self.greylisted,
            Status::Blacklisted => &mut self.blacklisted,
        }
    }
}

impl<'a> FromIterator<&'a Classification> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a Classification>>(iter: I) -> Self {
        let mut counts = Self::default();
        for classification in iter {
            counts.record(classification.status);
        }
        counts
    }
}

/// All classifications of a run plus per-status counts.
///
/// `results` are in completion order; use [`RunReport::into_sorted`] when
/// a stable order is needed.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub results: Vec<Classification>,
    pub counts: StatusCounts,
    /// Addresses never submitted because the run was cancelled.
    pub unsubmitted: Vec<String>,
}

impl RunReport {
    pub fn new(results: Vec<Classification>, unsubmitted: Vec<String>) -> Self {
        let counts = results.iter().collect();
        Self {
            results,
            counts,
            unsubmitted,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unsubmitted.is_empty()
    }

    /// True when any row is `Invalid` or `Blacklisted`.
    pub fn has_rejections(&self) -> bool {
        self.counts.invalid > 0 || self.counts.blacklisted > 0
    }

    /// Orders rows by address; ties keep their completion order.
    pub fn into_sorted(mut self) -> Self {
        self.results.sort_by(|a, b| a.address.cmp(&b.address));
        self
    }

    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Status::ALL
            .iter()
            .map(|status| {
                let name = status.as_str().to_lowercase();
                format!("{name}={}", self.counts.get(*status))
            })
            .collect();
        if !self.is_complete() {
            parts.push(format!("unsubmitted={}", self.unsubmitted.len()));
        }
        format!("{} checked: {}", self.results.len(), parts.join(", "))
    }

    /// Writes `Email,Status,Message` rows, header first.
    #[cfg(feature = "with-csv")]
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["Email", "Status", "Message"])?;
        for row in &self.results {
            wtr.write_record([
                row.address.as_str(),
                row.status.as_str(),
                row.detail.as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    #[cfg(feature = "with-csv")]
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }
}
