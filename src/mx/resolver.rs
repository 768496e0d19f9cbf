use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, warn};
use trust_dns_resolver::Resolver;
use trust_dns_resolver::system_conf::read_system_conf;

use super::{CandidateSource, Error, MailCandidates, MxRecord};

/// Resolve the ordered SMTP candidates for `domain` with the system resolver.
///
/// Never fails: every DNS problem, including a resolver that cannot be built,
/// ends up as an empty list.
pub fn resolve_mail_candidates(domain: &str) -> Vec<String> {
    resolve_candidates(domain, None).into_hosts()
}

/// Same as [`resolve_mail_candidates`] but keeps the [`CandidateSource`] and
/// lets the caller bound each DNS query.
/// A zero timeout keeps the resolver default.
pub fn resolve_candidates(domain: &str, timeout: Option<Duration>) -> MailCandidates {
    resolve_or_give_up(system_resolver(dns_timeout(timeout)), domain)
}

pub(crate) fn resolve_or_give_up<R: LookupMx>(
    resolver: Result<R, Error>,
    domain: &str,
) -> MailCandidates {
    match resolver {
        Ok(resolver) => resolve_with(&resolver, domain),
        Err(err) => {
            warn!(domain, error = %err, "DNS resolver unavailable");
            MailCandidates::unresolvable(domain.trim())
        }
    }
}

pub(crate) fn dns_timeout(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|timeout| !timeout.is_zero())
}

fn system_resolver(timeout: Option<Duration>) -> Result<Resolver, Error> {
    let (config, mut opts) = read_system_conf().map_err(Error::resolver_init)?;
    if let Some(timeout) = timeout {
        opts.timeout = timeout;
    }
    Resolver::new(config, opts).map_err(Error::resolver_init)
}

/// MX first; the A-record fallback only runs when the MX query says the
/// record or the domain is absent. Any other failure yields no candidates.
pub fn resolve_with<R>(resolver: &R, domain: &str) -> MailCandidates
where
    R: LookupMx + ?Sized,
{
    let ascii = match normalize_domain(domain) {
        Ok(ascii) => ascii,
        Err(err) => {
            warn!(domain, error = %err, "domain cannot be queried");
            return MailCandidates::unresolvable(domain.trim());
        }
    };

    match resolver.lookup_mx(&ascii) {
        Ok(records) if !records.is_empty() => {
            let hosts = rank_exchanges(records);
            if hosts.is_empty() {
                debug!(domain = %ascii, "null MX, domain accepts no mail");
                return MailCandidates::unresolvable(ascii);
            }
            debug!(domain = %ascii, ?hosts, "MX candidates");
            MailCandidates {
                domain: ascii,
                hosts,
                source: CandidateSource::Exchange,
            }
        }
        Ok(_) => address_fallback(resolver, ascii),
        Err(err) if err.is_absent() => {
            debug!(domain = %ascii, reason = %err, "no MX, trying A record");
            address_fallback(resolver, ascii)
        }
        Err(err) => {
            warn!(domain = %ascii, error = %err, "MX lookup failed");
            MailCandidates::unresolvable(ascii)
        }
    }
}

fn address_fallback<R>(resolver: &R, ascii: String) -> MailCandidates
where
    R: LookupMx + ?Sized,
{
    match resolver.has_address(&ascii) {
        Ok(true) => MailCandidates {
            hosts: vec![ascii.clone()],
            domain: ascii,
            source: CandidateSource::AddressRecord,
        },
        Ok(false) => {
            debug!(domain = %ascii, "no A record either");
            MailCandidates::unresolvable(ascii)
        }
        Err(err) => {
            debug!(domain = %ascii, error = %err, "A lookup failed");
            MailCandidates::unresolvable(ascii)
        }
    }
}

/// Stable sort on preference (equal preferences keep response order), then
/// drop repeated exchanges and null-MX entries.
pub(crate) fn rank_exchanges(mut records: Vec<MxRecord>) -> Vec<String> {
    records.sort_by_key(|record| record.preference);
    let mut seen = HashSet::new();
    records
        .into_iter()
        .map(|record| record.exchange)
        .filter(|exchange| !exchange.is_empty())
        .filter(|exchange| seen.insert(exchange.clone()))
        .collect()
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(Error::idna)
}

/// Absolute form of `ascii`, so the resolver never walks the search list.
pub(crate) fn fully_qualified(ascii: &str) -> String {
    format!("{ascii}.")
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// DNS queries the resolver needs. Implemented for the system resolver and
/// swapped for stubs in tests.
pub trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error>;

    /// Whether `domain` has at least one A record.
    fn has_address(&self, domain: &str) -> Result<bool, Error>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        let lookup =
            Resolver::mx_lookup(self, fully_qualified(domain)).map_err(Error::lookup)?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }

    fn has_address(&self, domain: &str) -> Result<bool, Error> {
        let lookup =
            Resolver::ipv4_lookup(self, fully_qualified(domain)).map_err(Error::lookup)?;
        Ok(lookup.iter().next().is_some())
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        self.mx_calls.set(self.mx_calls.get() + 1);
        (self.on_mx)(domain)
    }

    fn has_address(&self, domain: &str) -> Result<bool, Error> {
        self.address_calls.set(self.address_calls.get() + 1);
        (self.on_address)(domain)
    }
}
