#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Where the candidate hosts came from.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// MX records, ranked by preference.
    Exchange,
    /// No MX record; the domain's own A record is used as implicit MX.
    AddressRecord,
    /// No usable mail path (absent records, null MX or DNS failure).
    Unresolvable,
}

/// Ordered, deduplicated delivery targets for one domain. Built fresh for
/// every lookup.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCandidates {
    pub domain: String,
    pub hosts: Vec<String>,
    pub source: CandidateSource,
}

impl MailCandidates {
    pub(crate) fn unresolvable(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            hosts: Vec::new(),
            source: CandidateSource::Unresolvable,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn into_hosts(self) -> Vec<String> {
        self.hosts
    }
}
