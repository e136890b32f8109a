//! DNS "A" record model.

use crate::error::{Result, SudError};
use std::str::FromStr;

/// Default TTL for records created by sud.
pub const DEFAULT_TTL: u32 = 300;

/// A DNS "A" record, either desired (built from a hostname) or as returned
/// by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ARecordInfo {
    /// Subdomain label(s), empty for the zone apex.
    pub name: String,
    /// Zone: the last two labels of the hostname.
    pub domain: String,
    /// TTL in seconds.
    pub ttl: u32,
    /// IPv4 address, absent until looked up or created.
    pub address: Option<String>,
}

impl ARecordInfo {
    /// Split a fully-qualified hostname into record name and zone.
    ///
    /// `"x.y.example.com"` becomes `{name: "x.y", domain: "example.com"}`,
    /// `"example.com"` becomes `{name: "", domain: "example.com"}`. A single
    /// trailing dot is ignored.
    pub fn from_hostname(hostname: &str) -> Result<Self> {
        let trimmed = hostname.trim();
        if trimmed.is_empty() {
            return Err(SudError::invalid_hostname(hostname, "hostname is required"));
        }

        let fqdn = trimmed.strip_suffix('.').unwrap_or(trimmed);
        let labels: Vec<&str> = fqdn.split('.').collect();

        if labels.len() < 2 {
            return Err(SudError::invalid_hostname(
                hostname,
                "at least a name and a top-level domain are required",
            ));
        }
        if labels.iter().any(|label| label.is_empty()) {
            return Err(SudError::invalid_hostname(hostname, "empty label"));
        }

        let split = labels.len() - 2;
        Ok(Self {
            name: labels[..split].join("."),
            domain: labels[split..].join("."),
            ttl: DEFAULT_TTL,
            address: None,
        })
    }

    /// Canonical, trailing-dot DNS name of the record.
    pub fn dns_name(&self) -> String {
        if self.name.is_empty() {
            format!("{}.", self.domain)
        } else {
            format!("{}.{}.", self.name, self.domain)
        }
    }
}

impl FromStr for ARecordInfo {
    type Err = SudError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hostname(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain() {
        let info = ARecordInfo::from_hostname("test.example.com").unwrap();
        assert_eq!(info.name, "test");
        assert_eq!(info.domain, "example.com");
        assert_eq!(info.ttl, 300);
        assert_eq!(info.address, None);
        assert_eq!(info.dns_name(), "test.example.com.");
    }

    #[test]
    fn test_zone_apex() {
        let info = ARecordInfo::from_hostname("example.com").unwrap();
        assert_eq!(info.name, "");
        assert_eq!(info.domain, "example.com");
        assert_eq!(info.dns_name(), "example.com.");
    }

    #[test]
    fn test_nested_labels() {
        let info: ARecordInfo = "x.y.z.example.com".parse().unwrap();
        assert_eq!(info.name, "x.y.z");
        assert_eq!(info.domain, "example.com");
    }

    #[test]
    fn test_dns_name_round_trip() {
        for hostname in ["example.com", "a.example.com", "x.y.z.example.org"] {
            let info = ARecordInfo::from_hostname(hostname).unwrap();
            assert_eq!(info.dns_name(), format!("{}.", hostname));

            let dotted = format!("{}.", hostname);
            let info = ARecordInfo::from_hostname(&dotted).unwrap();
            assert_eq!(info.dns_name(), dotted);
        }
    }

    #[test]
    fn test_empty_hostname() {
        let err = ARecordInfo::from_hostname("").unwrap_err();
        assert!(matches!(err, SudError::InvalidHostname { .. }));
        assert!(err.to_string().contains("hostname is required"));
    }

    #[test]
    fn test_single_label() {
        let err = ARecordInfo::from_hostname("xxxx").unwrap_err();
        assert!(matches!(err, SudError::InvalidHostname { .. }));
        assert!(err.to_string().starts_with("Invalid hostname 'xxxx'"));
    }

    #[test]
    fn test_empty_label() {
        assert!(ARecordInfo::from_hostname("a..example.com").is_err());
        assert!(ARecordInfo::from_hostname(".com").is_err());
    }
}
