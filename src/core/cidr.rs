use crate::core::errors::{Error, Result};
use crate::core::prefix_type::PrefixType;
use ipnetwork::IpNetwork;

/*-------------------------------------------------------------------------------------------------
  CIDR Validation
-------------------------------------------------------------------------------------------------*/

/// Validate that `candidate` is a CIDR prefix (`address/length`) and report its address family.
///
/// ```
/// use cloudipranges::{cidr, PrefixType};
///
/// assert_eq!(cidr::validate("34.80.0.0/15").unwrap(), PrefixType::IPv4);
/// assert_eq!(cidr::validate("2600:1901::/48").unwrap(), PrefixType::IPv6);
/// assert!(cidr::validate("34.80.0.0").is_err());
/// ```
pub fn validate(candidate: &str) -> Result<PrefixType> {
    // IpNetwork accepts a bare address as a host route; a prefix length is required here.
    let Some((_, length)) = candidate.split_once('/') else {
        return Err(invalid(candidate, "missing prefix length"));
    };
    if length.is_empty() || !length.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid(candidate, "prefix length is not a non-negative integer"));
    }

    candidate
        .parse::<IpNetwork>()
        .map(|network| PrefixType::from(&network))
        .map_err(|error| invalid(candidate, error))
}

fn invalid(candidate: &str, reason: impl ToString) -> Error {
    Error::InvalidCidr {
        cidr: candidate.to_string(),
        reason: reason.to_string(),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ipv4_boundary_prefixes() {
        for candidate in [
            "10.0.0.0/8",
            "172.16.0.0/12",
            "34.80.0.0/15",
            "192.168.1.0/24",
            "52.93.178.234/32",
            "0.0.0.0/0",
        ] {
            assert_eq!(validate(candidate).unwrap(), PrefixType::IPv4, "{candidate}");
        }
    }

    #[test]
    fn test_validate_ipv6_boundary_prefixes() {
        for candidate in [
            "2600:1f15::/32",
            "2600:1901::/48",
            "2600:1901:1:1000::/52",
            "2001:489a:3103::140/123",
            "2001:db8::1/128",
        ] {
            assert_eq!(validate(candidate).unwrap(), PrefixType::IPv6, "{candidate}");
        }
    }

    #[test]
    fn test_validate_rejects_malformed_prefixes() {
        for candidate in [
            "",
            "10.0.0.0",
            "10.0.0.0/",
            "10.0.0.256/24",
            "10.0.0.0/-1",
            "10.0.0.0/33",
            "10.0.0.0/24 trailing",
            "2600:1901::/129",
            "2600:zz::/48",
            "not-a-prefix",
            r"173.245.48.0\/20",
        ] {
            match validate(candidate) {
                Err(Error::InvalidCidr { cidr, .. }) => assert_eq!(cidr, candidate),
                other => panic!("expected InvalidCidr for {candidate:?}, got {other:?}"),
            }
        }
    }
}
