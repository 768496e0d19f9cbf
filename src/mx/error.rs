use std::fmt::Display;

use thiserror::Error;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("no record of the requested type")]
    NoRecords,
    #[error("domain does not exist (NXDOMAIN)")]
    NoSuchDomain,
    #[error("DNS lookup failed: {source}")]
    Lookup {
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn resolver_init<E: Display>(err: E) -> Self {
        Self::ResolverInit {
            source: std::io::Error::other(err.to_string()),
        }
    }

    /// Split resolver failures into "the record/domain is absent" and
    /// everything else. Only the former allows the address-record fallback.
    ///
    /// trust-dns also reports SERVFAIL, REFUSED and friends as
    /// `NoRecordsFound`; only NOERROR and NXDOMAIN mean absent.
    pub(crate) fn lookup(source: ResolveError) -> Self {
        let code = match source.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. } => Some(*response_code),
            _ => None,
        };
        match code {
            Some(ResponseCode::NXDomain) => Self::NoSuchDomain,
            Some(ResponseCode::NoError) => Self::NoRecords,
            _ => Self::Lookup { source },
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::NoRecords | Self::NoSuchDomain)
    }
}
