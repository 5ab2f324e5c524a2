use std::time::Duration;

pub const DEFAULT_SENDER: &str = "probe@example.com";

/// Configuration for [`SmtpProber`](super::SmtpProber).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Name announced in `HELO`.
    pub helo_domain: String,
    /// Envelope sender for `MAIL FROM`. Nothing is ever delivered to or from it.
    pub sender: String,
    pub port: u16,
    /// Applies to the TCP connect and to every read and write.
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            helo_domain: "localhost".to_string(),
            sender: DEFAULT_SENDER.to_string(),
            port: 25,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ProbeOptions {
    pub fn helo_name(&self) -> &str {
        let trimmed = self.helo_domain.trim();
        if trimmed.is_empty() { "localhost" } else { trimmed }
    }

    /// `MAIL FROM` argument; an empty sender gives the null reverse-path.
    pub fn envelope(&self) -> String {
        format!("MAIL FROM:<{}>", self.sender.trim())
    }

    /// Session budget, kept within one millisecond and one day.
    pub(crate) fn effective_timeout(&self) -> Duration {
        self.timeout
            .clamp(Duration::from_millis(1), Duration::from_secs(24 * 60 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_sender() {
        let options = ProbeOptions::default();
        assert_eq!(options.envelope(), "MAIL FROM:<probe@example.com>");
        let null = ProbeOptions {
            sender: String::new(),
            ..ProbeOptions::default()
        };
        assert_eq!(null.envelope(), "MAIL FROM:<>");
    }

    #[test]
    fn blank_helo_falls_back() {
        let options = ProbeOptions {
            helo_domain: "  ".to_string(),
            ..ProbeOptions::default()
        };
        assert_eq!(options.helo_name(), "localhost");
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let options = ProbeOptions {
            timeout: Duration::ZERO,
            ..ProbeOptions::default()
        };
        assert_eq!(options.effective_timeout(), Duration::from_millis(1));

        let huge = ProbeOptions {
            timeout: Duration::from_millis(u64::MAX),
            ..ProbeOptions::default()
        };
        assert_eq!(huge.effective_timeout(), Duration::from_secs(86_400));
    }
}
