//! Splitting of raw candidate addresses into local part and domain.
//!
//! Only the `@` separator is interpreted; the full address grammar is not
//! validated. Anything that could smuggle extra SMTP commands (whitespace,
//! control characters) is refused up front.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must contain exactly one '@' (found {found})")]
    SeparatorCount { found: usize },
    #[error("local part is empty")]
    EmptyLocalPart,
    #[error("domain is empty")]
    EmptyDomain,
    #[error("address contains forbidden character {0:?}")]
    ForbiddenCharacter(char),
}

/// A raw address split on its single `@`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateAddress {
    pub local_part: String,
    pub domain: String,
}

impl CandidateAddress {
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        if let Some(bad) = raw.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(AddressError::ForbiddenCharacter(bad));
        }

        let parts: Vec<&str> = raw.split('@').collect();
        if parts.len() != 2 {
            return Err(AddressError::SeparatorCount {
                found: parts.len() - 1,
            });
        }
        let (local, domain) = (parts[0], parts[1]);
        if local.is_empty() {
            return Err(AddressError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(AddressError::EmptyDomain);
        }

        Ok(Self {
            local_part: local.to_string(),
            domain: domain.to_string(),
        })
    }

    /// The address as sent in `RCPT TO`.
    pub fn full(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }
}

impl std::str::FromStr for CandidateAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_single_separator() {
        let addr = CandidateAddress::parse("john.doe@Example.org").expect("valid");
        assert_eq!(addr.local_part, "john.doe");
        assert_eq!(addr.domain, "Example.org");
        assert_eq!(addr.full(), "john.doe@Example.org");
    }

    #[test]
    fn rejects_missing_separator() {
        let err = CandidateAddress::parse("nobody.example.org").expect_err("no '@'");
        assert_eq!(err, AddressError::SeparatorCount { found: 0 });
    }

    #[test]
    fn rejects_multiple_separators() {
        let err = CandidateAddress::parse("a@b@example.org").expect_err("two '@'");
        assert_eq!(err, AddressError::SeparatorCount { found: 2 });
    }

    #[test]
    fn rejects_empty_parts() {
        assert_eq!(
            CandidateAddress::parse("@example.org"),
            Err(AddressError::EmptyLocalPart)
        );
        assert_eq!(
            CandidateAddress::parse("user@"),
            Err(AddressError::EmptyDomain)
        );
    }

    #[test]
    fn rejects_line_breaks() {
        let err = CandidateAddress::parse("user@example.org\r\nDATA").expect_err("crlf");
        assert_eq!(err, AddressError::ForbiddenCharacter('\r'));
    }
}
