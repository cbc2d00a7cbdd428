use ipnetwork::IpNetwork;
use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Prefix Type
-------------------------------------------------------------------------------------------------*/

/// Address family of a validated CIDR; selects the prefix list a CIDR is stored in.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PrefixType {
    IPv4,
    IPv6,
}

impl From<&IpNetwork> for PrefixType {
    fn from(network: &IpNetwork) -> Self {
        match network {
            IpNetwork::V4(_) => PrefixType::IPv4,
            IpNetwork::V6(_) => PrefixType::IPv6,
        }
    }
}

impl fmt::Display for PrefixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixType::IPv4 => write!(f, "IPv4"),
            PrefixType::IPv6 => write!(f, "IPv6"),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
