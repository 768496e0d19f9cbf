use std::borrow::Cow;
use std::time::Duration;

pub const DEFAULT_SENDER: &str = "test@example.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Controls how [`verify_address_with_options`](crate::verify_address_with_options)
/// interrogates SMTP servers.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Envelope sender for `MAIL FROM`. Some servers judge the transaction
    /// on the sender domain's reputation.
    pub sender_address: String,
    /// Bound for the connection and for every command round-trip.
    pub timeout: Duration,
    pub smtp_port: u16,
    pub helo_domain: Option<String>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            sender_address: DEFAULT_SENDER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            smtp_port: DEFAULT_SMTP_PORT,
            helo_domain: None,
        }
    }
}

impl ProbeOptions {
    /// Effective timeout. Zero is not "no deadline": it falls back to
    /// [`DEFAULT_TIMEOUT`] so no call blocks forever.
    pub fn timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// Name announced in `EHLO`/`HELO`: the configured one, else the sender's
    /// domain, else `localhost`.
    pub fn helo_name(&self) -> Cow<'_, str> {
        if let Some(helo) = self.helo_domain.as_deref().filter(|v| !v.trim().is_empty()) {
            return Cow::Borrowed(helo.trim());
        }
        match self.sender_address.rsplit_once('@') {
            Some((_, domain)) if !domain.is_empty() => Cow::Borrowed(domain),
            _ => Cow::Borrowed("localhost"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let options = ProbeOptions::default();
        assert_eq!(options.sender_address, "test@example.com");
        assert_eq!(options.timeout(), Duration::from_secs(20));
        assert_eq!(options.smtp_port, 25);
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let options = ProbeOptions {
            timeout: Duration::ZERO,
            ..ProbeOptions::default()
        };
        assert_eq!(options.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn helo_name_prefers_explicit_then_sender_domain() {
        let mut options = ProbeOptions::default();
        assert_eq!(options.helo_name(), "example.com");

        options.helo_domain = Some("probe.example.net".to_string());
        assert_eq!(options.helo_name(), "probe.example.net");

        options.helo_domain = Some("  ".to_string());
        options.sender_address = "no-domain".to_string();
        assert_eq!(options.helo_name(), "localhost");
    }
}
