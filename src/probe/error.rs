use std::io;

use thiserror::Error;

use super::types::ProbeStage;

/// Transport-level failures of one SMTP session. They end the current
/// candidate only.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("timed out during {stage}")]
    Timeout { stage: ProbeStage },
    #[error("connection closed during {stage}")]
    Closed { stage: ProbeStage },
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: ProbeStage,
        #[source]
        source: io::Error,
    },
    #[error("protocol error during {stage}: {detail}")]
    Protocol { stage: ProbeStage, detail: String },
}

impl SessionError {
    pub(crate) fn io(stage: ProbeStage, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout { stage },
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Closed { stage },
            io::ErrorKind::InvalidData => Self::Protocol {
                stage,
                detail: source.to_string(),
            },
            _ => Self::Io { stage, source },
        }
    }

    pub(crate) fn protocol(stage: ProbeStage, detail: impl Into<String>) -> Self {
        Self::Protocol {
            stage,
            detail: detail.into(),
        }
    }

    pub fn stage(&self) -> ProbeStage {
        match self {
            Self::Connect { .. } => ProbeStage::Connect,
            Self::Timeout { stage }
            | Self::Closed { stage }
            | Self::Io { stage, .. }
            | Self::Protocol { stage, .. } => *stage,
        }
    }
}
