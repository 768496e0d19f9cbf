#![forbid(unsafe_code)]
//! mxprobe — does a mail server accept this recipient? (MX + partial SMTP)

pub mod address;
pub use address::{AddressError, CandidateAddress};

pub mod mx;
pub use mx::{CandidateSource, MailCandidates, MxRecord, resolve_mail_candidates};

pub mod probe;
pub use probe::{
    CandidateOutcome, Dialer, ProbeOptions, ProbeOutcome, ServerAttempt, SmtpReply, TcpDialer,
    Verdict, VerificationReport, inspect_address, verify_address, verify_address_with_options,
};
