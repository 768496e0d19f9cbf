use std::fmt::Write as _;

use mxprobe::probe::SmtpEvent;
use mxprobe::{CandidateSource, VerificationReport};

pub fn render_human(report: &VerificationReport, transcript: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} -> {} ({})",
        report.address,
        report.outcome(),
        report.verdict
    );
    if let Some(source) = report.source {
        if !report.candidates.is_empty() {
            let _ = writeln!(
                out,
                "candidates ({}): {}",
                source_label(source),
                report.candidates.join(", ")
            );
        }
    }
    for attempt in &report.attempts {
        let _ = writeln!(out, "  {}: {}", attempt.exchange, attempt.outcome);
        if transcript {
            for event in &attempt.events {
                let _ = writeln!(out, "    {}", render_event(event));
            }
        }
    }
    out
}

fn source_label(source: CandidateSource) -> &'static str {
    match source {
        CandidateSource::Exchange => "MX",
        CandidateSource::AddressRecord => "A fallback",
        CandidateSource::Unresolvable => "none",
    }
}

fn render_event(event: &SmtpEvent) -> String {
    match event {
        SmtpEvent::Sent { command, .. } => format!("C: {command}"),
        SmtpEvent::Received { reply, .. } => format!("S: {reply}"),
        SmtpEvent::Error { stage, message } => format!("!  {stage}: {message}"),
    }
}

#[cfg(feature = "with-serde")]
pub fn render_json(report: &VerificationReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
