//! SMTP acceptance probing.
//!
//! [`verify_address`] splits the address, resolves the mail candidates and
//! walks them in order with a minimal `EHLO`/`MAIL FROM`/`RCPT TO` dialogue,
//! stopping at the first 250/251 on `RCPT TO`. No message is ever sent.
//! Everything that goes wrong, from a malformed address to a reset
//! connection, ends up as `false`; [`inspect_address`] keeps the details.

mod error;
mod options;
mod session;
mod types;

pub use error::SessionError;
pub use options::{DEFAULT_SENDER, DEFAULT_SMTP_PORT, DEFAULT_TIMEOUT, ProbeOptions};
pub use session::{Dialer, TcpDialer};
pub use types::{
    CandidateOutcome, Decision, ProbeOutcome, ProbeStage, ServerAttempt, SmtpEvent, SmtpReply,
    Verdict, VerificationReport,
};

use tracing::{debug, info};

use crate::address::CandidateAddress;
use crate::mx::{self, LookupMx, MailCandidates};
use session::SmtpSession;

/// Probe `address` with default options (sender `test@example.com`, 20 s
/// timeout, port 25).
pub fn verify_address(address: &str) -> bool {
    verify_address_with_options(address, &ProbeOptions::default())
}

/// Identical to [`verify_address`], but with caller-supplied sender, timeout
/// and port.
pub fn verify_address_with_options(address: &str, options: &ProbeOptions) -> bool {
    inspect_address(address, options).is_accepted()
}

/// Full report of a probe against the live DNS and SMTP servers.
pub fn inspect_address(address: &str, options: &ProbeOptions) -> VerificationReport {
    let target = match CandidateAddress::parse(address) {
        Ok(target) => target,
        Err(err) => {
            debug!(address, error = %err, "malformed address");
            return VerificationReport::malformed(address, err);
        }
    };
    let candidates = mx::resolve_candidates(&target.domain, Some(options.timeout()));
    run_probe(address, &target, candidates, options, &TcpDialer)
}

/// [`inspect_address`] with an injected resolver and dialer.
pub fn inspect_with<R, D>(
    address: &str,
    options: &ProbeOptions,
    resolver: &R,
    dialer: &D,
) -> VerificationReport
where
    R: LookupMx + ?Sized,
    D: Dialer + ?Sized,
{
    let target = match CandidateAddress::parse(address) {
        Ok(target) => target,
        Err(err) => {
            debug!(address, error = %err, "malformed address");
            return VerificationReport::malformed(address, err);
        }
    };
    let candidates = mx::resolve_with(resolver, &target.domain);
    run_probe(address, &target, candidates, options, dialer)
}

fn run_probe<D>(
    address: &str,
    target: &CandidateAddress,
    candidates: MailCandidates,
    options: &ProbeOptions,
    dialer: &D,
) -> VerificationReport
where
    D: Dialer + ?Sized,
{
    let attempts = probe_candidates(target, &candidates.hosts, options, dialer);
    let verdict = if candidates.is_empty() {
        Verdict::NoMailServer
    } else {
        attempts
            .iter()
            .find(|a| a.outcome.decision() == Decision::Accept)
            .map(|a| Verdict::Accepted {
                exchange: a.exchange.clone(),
            })
            .unwrap_or(Verdict::Exhausted)
    };
    let report = VerificationReport {
        address: address.to_string(),
        source: Some(candidates.source),
        candidates: candidates.hosts,
        attempts,
        verdict,
    };
    info!(
        address,
        outcome = %report.outcome(),
        verdict = %report.verdict,
        tried = report.attempts.len(),
        "probe finished"
    );
    report
}

/// Try `hosts` strictly in order and stop after the first acceptance. The
/// returned attempts are in the order they were made.
pub fn probe_candidates<D>(
    target: &CandidateAddress,
    hosts: &[String],
    options: &ProbeOptions,
    dialer: &D,
) -> Vec<ServerAttempt>
where
    D: Dialer + ?Sized,
{
    let mut attempts = Vec::new();
    for host in hosts {
        let attempt = probe_host(host, target, options, dialer);
        debug!(host = %host, outcome = %attempt.outcome, "candidate finished");
        let decision = attempt.outcome.decision();
        attempts.push(attempt);
        if decision == Decision::Accept {
            break;
        }
    }
    attempts
}

fn probe_host<D>(
    host: &str,
    target: &CandidateAddress,
    options: &ProbeOptions,
    dialer: &D,
) -> ServerAttempt
where
    D: Dialer + ?Sized,
{
    let mut session = match SmtpSession::open(dialer, host, options.smtp_port, options.timeout()) {
        Ok(session) => session,
        Err(err) => {
            return ServerAttempt {
                exchange: host.to_string(),
                events: vec![SmtpEvent::Error {
                    stage: err.stage(),
                    message: err.to_string(),
                }],
                outcome: CandidateOutcome::Transport {
                    stage: err.stage(),
                    message: err.to_string(),
                },
            };
        }
    };

    let outcome = match converse(&mut session, target, options) {
        Ok(outcome) => outcome,
        Err(err) => {
            session.record_error(&err);
            CandidateOutcome::Transport {
                stage: err.stage(),
                message: err.to_string(),
            }
        }
    };

    ServerAttempt {
        exchange: host.to_string(),
        events: session.into_events(),
        outcome,
    }
}

/// Greeting, `EHLO` (or `HELO`), `MAIL FROM`, `RCPT TO`. Transport errors
/// bubble up; every reply is mapped to a [`CandidateOutcome`].
fn converse<S>(
    session: &mut SmtpSession<S>,
    target: &CandidateAddress,
    options: &ProbeOptions,
) -> Result<CandidateOutcome, SessionError>
where
    S: std::io::Read + std::io::Write,
{
    let banner = session.read_reply(ProbeStage::Greeting)?;
    if banner.code != 220 {
        return Ok(CandidateOutcome::Unexpected {
            stage: ProbeStage::Greeting,
            reply: banner,
        });
    }

    let helo = options.helo_name();
    let ehlo = session.command(&format!("EHLO {helo}"), ProbeStage::Ehlo)?;
    if !ehlo.is_positive_completion() {
        let reply = session.command(&format!("HELO {helo}"), ProbeStage::Helo)?;
        if !reply.is_positive_completion() {
            session.quit();
            return Ok(CandidateOutcome::Unexpected {
                stage: ProbeStage::Helo,
                reply,
            });
        }
    }

    let mail_cmd = format!("MAIL FROM:<{}>", options.sender_address);
    let mail_reply = session.command(&mail_cmd, ProbeStage::MailFrom)?;
    if !mail_reply.is_affirmative() {
        session.quit();
        return Ok(CandidateOutcome::SenderRefused { reply: mail_reply });
    }

    let rcpt_cmd = format!("RCPT TO:<{}>", target.full());
    let rcpt_reply = session.command(&rcpt_cmd, ProbeStage::RcptTo)?;
    session.quit();
    Ok(classify_recipient(rcpt_reply))
}

fn classify_recipient(reply: SmtpReply) -> CandidateOutcome {
    if reply.is_affirmative() {
        CandidateOutcome::Accepted { reply }
    } else if reply.is_transient_failure() {
        CandidateOutcome::RecipientDeferred { reply }
    } else if reply.is_permanent_failure() {
        CandidateOutcome::RecipientRefused { reply }
    } else {
        CandidateOutcome::Unexpected {
            stage: ProbeStage::RcptTo,
            reply,
        }
    }
}
