use std::io;

use thiserror::Error;

use super::ProbeStage;

#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("cannot resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("connection closed by server during {stage}")]
    Closed { stage: ProbeStage },
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: ProbeStage,
        #[source]
        source: io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SmtpError {
    /// The server could not be reached, or hung up before greeting us.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. }
                | Self::Connect { .. }
                | Self::Closed {
                    stage: ProbeStage::Greeting
                }
        )
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Connect { source, .. } | Self::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    pub(crate) fn io(stage: ProbeStage, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::UnexpectedEof {
            Self::Closed { stage }
        } else {
            Self::Io { stage, source }
        }
    }
}
