//! Mail-exchange resolution.
//!
//! [`resolve_mail_candidates`] turns a domain into the ordered list of hosts
//! worth an SMTP attempt: MX records by ascending preference, the domain
//! itself when it has no MX but an A record, nothing otherwise.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{LookupMx, resolve_candidates, resolve_mail_candidates, resolve_with};
pub use types::{CandidateSource, MailCandidates, MxRecord};
