use std::fmt;

use crate::mx::CandidateSource;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    Connect,
    Greeting,
    Ehlo,
    Helo,
    MailFrom,
    RcptTo,
    Quit,
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Quit => "QUIT",
        })
    }
}

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }

    /// 250 or 251, the only codes that count as acceptance for the sender
    /// and recipient steps.
    pub fn is_affirmative(&self) -> bool {
        matches!(self.code, 250 | 251)
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message.replace('\n', " / "))
        }
    }
}

/// A recorded `SMTP` transcript event used for diagnostics.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpEvent {
    Sent {
        stage: ProbeStage,
        command: String,
    },
    Received {
        stage: ProbeStage,
        reply: SmtpReply,
    },
    Error {
        stage: ProbeStage,
        message: String,
    },
}

/// How a single candidate ended.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// `RCPT TO` answered 250/251.
    Accepted { reply: SmtpReply },
    /// `RCPT TO` answered with a permanent (5xx) failure.
    RecipientRefused { reply: SmtpReply },
    /// `RCPT TO` answered 4xx. Greylisting lands here and cannot be told
    /// apart from a real refusal at this depth.
    RecipientDeferred { reply: SmtpReply },
    /// `MAIL FROM` was not answered 250/251; `RCPT TO` was never sent.
    SenderRefused { reply: SmtpReply },
    /// A reply that fits none of the above (non-220 banner, EHLO and HELO
    /// both refused, 2xx/3xx other than 250/251 on `RCPT TO`).
    Unexpected { stage: ProbeStage, reply: SmtpReply },
    /// Connection refused, reset, timed out or malformed reply.
    Transport { stage: ProbeStage, message: String },
}

/// What the candidate loop does after a candidate ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stop: the recipient is accepted; later candidates are not contacted.
    Accept,
    /// Try the next candidate, if any.
    NextCandidate,
}

impl CandidateOutcome {
    pub fn decision(&self) -> Decision {
        match self {
            Self::Accepted { .. } => Decision::Accept,
            _ => Decision::NextCandidate,
        }
    }

    pub fn as_reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Accepted { reply }
            | Self::RecipientRefused { reply }
            | Self::RecipientDeferred { reply }
            | Self::SenderRefused { reply }
            | Self::Unexpected { reply, .. } => Some(reply),
            Self::Transport { .. } => None,
        }
    }
}

impl fmt::Display for CandidateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { reply } => write!(f, "accepted ({reply})"),
            Self::RecipientRefused { reply } => write!(f, "recipient refused ({reply})"),
            Self::RecipientDeferred { reply } => write!(f, "recipient deferred ({reply})"),
            Self::SenderRefused { reply } => write!(f, "sender refused ({reply})"),
            Self::Unexpected { stage, reply } => write!(f, "unexpected {stage} reply ({reply})"),
            Self::Transport { stage, message } => write!(f, "{stage} failed: {message}"),
        }
    }
}

/// Detailed report for a single SMTP server interrogation.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAttempt {
    pub exchange: String,
    pub events: Vec<SmtpEvent>,
    pub outcome: CandidateOutcome,
}

/// Tri-state result of a probe. Only [`ProbeOutcome::Accepted`] maps to
/// `true`; `Unknown` (greylisting, unreachable servers) collapses to `false`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Accepted,
    Rejected,
    Unknown,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A candidate affirmed the recipient.
    Accepted { exchange: String },
    /// Every candidate was tried without an affirmation.
    Exhausted,
    /// The domain has no usable mail path.
    NoMailServer,
    /// The address could not be split; nothing was sent on the network.
    Malformed { reason: String },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { exchange } => write!(f, "accepted by {exchange}"),
            Self::Exhausted => f.write_str("no candidate accepted the recipient"),
            Self::NoMailServer => f.write_str("no mail server for domain"),
            Self::Malformed { reason } => write!(f, "malformed address: {reason}"),
        }
    }
}

/// Aggregated result of [`inspect_address`](crate::inspect_address).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub address: String,
    pub source: Option<CandidateSource>,
    pub candidates: Vec<String>,
    pub attempts: Vec<ServerAttempt>,
    pub verdict: Verdict,
}

impl VerificationReport {
    pub(crate) fn malformed(address: &str, reason: impl fmt::Display) -> Self {
        Self {
            address: address.to_string(),
            source: None,
            candidates: Vec::new(),
            attempts: Vec::new(),
            verdict: Verdict::Malformed {
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.verdict, Verdict::Accepted { .. })
    }

    /// Accepted wins; otherwise a single permanent `RCPT TO` refusal makes
    /// the address rejected, and anything else stays unknown.
    pub fn outcome(&self) -> ProbeOutcome {
        match &self.verdict {
            Verdict::Accepted { .. } => ProbeOutcome::Accepted,
            Verdict::Malformed { .. } | Verdict::NoMailServer => ProbeOutcome::Rejected,
            Verdict::Exhausted => {
                if self
                    .attempts
                    .iter()
                    .any(|a| matches!(a.outcome, CandidateOutcome::RecipientRefused { .. }))
                {
                    ProbeOutcome::Rejected
                } else {
                    ProbeOutcome::Unknown
                }
            }
        }
    }
}
