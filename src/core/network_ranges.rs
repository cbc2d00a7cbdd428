use crate::core::cidr;
use crate::core::compound_name::{split_pair, AZURE_DELIMITER};
use crate::core::errors::Result;
use crate::core::prefix_type::PrefixType;
use crate::core::redundancy::{resolve, RedundancyPolicy, RegionServicePair};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/*-------------------------------------------------------------------------------------------------
  Service IP Ranges
-------------------------------------------------------------------------------------------------*/

/// All of the IP prefixes announced for one service within a region.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIpRanges {
    pub service_name: String,

    /// Sample IPv4 prefix: `8.8.0.0/16`
    pub ipv4_prefixes: Vec<String>,

    /// Sample IPv6 prefix: `2600:1901::/48`
    pub ipv6_prefixes: Vec<String>,
}

impl ServiceIpRanges {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    pub fn ip_prefix_count(&self) -> usize {
        self.ipv4_prefixes.len() + self.ipv6_prefixes.len()
    }

    fn prefixes_mut(&mut self, prefix_type: PrefixType) -> &mut Vec<String> {
        match prefix_type {
            PrefixType::IPv4 => &mut self.ipv4_prefixes,
            PrefixType::IPv6 => &mut self.ipv6_prefixes,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Region Network Detail
-------------------------------------------------------------------------------------------------*/

/// The services, and their IP prefixes, announced within one region.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionNetworkDetail {
    pub region_name: String,
    pub service_networks: Vec<ServiceIpRanges>,
}

impl RegionNetworkDetail {
    pub fn new(region_name: impl Into<String>) -> Self {
        Self {
            region_name: region_name.into(),
            service_networks: Vec::new(),
        }
    }

    pub fn get_service(&self, service_name: &str) -> Option<&ServiceIpRanges> {
        self.service_networks
            .iter()
            .find(|service| service.service_name == service_name)
    }

    pub fn ip_prefix_count(&self) -> usize {
        self.service_networks
            .iter()
            .map(ServiceIpRanges::ip_prefix_count)
            .sum()
    }
}

/*-------------------------------------------------------------------------------------------------
  Provider Network Ranges
-------------------------------------------------------------------------------------------------*/

/// Every region, service, and IP prefix crawled for a single provider.
///
/// Built incrementally with [ProviderNetworkRanges::add_ip_prefix] while a crawler parses its
/// vendor payload, then treated as read-only.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderNetworkRanges {
    pub provider_name: String,
    pub region_networks: Vec<RegionNetworkDetail>,

    /// (region, service) pairs currently holding each literal CIDR.
    #[serde(skip)]
    prefix_holders: HashMap<String, Vec<RegionServicePair>>,
}

/*--------------------------------------------------------------------------------------
  Provider Network Ranges Implementation
--------------------------------------------------------------------------------------*/

impl ProviderNetworkRanges {
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            ..Self::default()
        }
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn region_networks(&self) -> &[RegionNetworkDetail] {
        &self.region_networks
    }

    pub fn get_region(&self, region_name: &str) -> Option<&RegionNetworkDetail> {
        self.region_networks
            .iter()
            .find(|region| region.region_name == region_name)
    }

    pub fn get_service(&self, region_name: &str, service_name: &str) -> Option<&ServiceIpRanges> {
        self.get_region(region_name)
            .and_then(|region| region.get_service(service_name))
    }

    pub fn ip_prefix_count(&self) -> usize {
        self.region_networks
            .iter()
            .map(RegionNetworkDetail::ip_prefix_count)
            .sum()
    }

    /*-------------------------------------------------------------------------
      Add IP Prefix
    -------------------------------------------------------------------------*/

    /// Record `cidr` under the (`region`, `service`) pair.
    ///
    /// The CIDR is validated first; a malformed literal fails the whole insert. Under the
    /// hierarchical policy both names must also split into at most two components. Inserting a CIDR
    /// already held by the same pair is a no-op. When the same CIDR is held by other pairs, each
    /// is resolved against the new pair under `policy`: a holder that subsumes the new pair keeps
    /// the CIDR (the insert is dropped), and a holder subsumed by the new pair gives it up.
    pub fn add_ip_prefix(
        &mut self,
        region: &str,
        service: &str,
        cidr: &str,
        policy: RedundancyPolicy,
    ) -> Result<()> {
        let prefix_type = cidr::validate(cidr)?;
        if policy == RedundancyPolicy::HierarchicalSubset {
            split_pair(AZURE_DELIMITER, region)?;
            split_pair(AZURE_DELIMITER, service)?;
        }
        let new_pair = RegionServicePair::new(region, service);

        let holders = self.prefix_holders.get(cidr).cloned().unwrap_or_default();
        let mut absorbed = Vec::new();
        for holder in &holders {
            match resolve(holder, &new_pair, policy)? {
                Some(survivor) if std::ptr::eq(survivor, holder) => {
                    trace!(
                        "{}: {cidr} under ({region}, {service}) is covered by ({}, {})",
                        self.provider_name,
                        holder.region,
                        holder.service
                    );
                    return Ok(());
                }
                Some(_) => absorbed.push(holder.clone()),
                None => {}
            }
        }

        for holder in absorbed {
            trace!(
                "{}: ({region}, {service}) absorbs {cidr} from ({}, {})",
                self.provider_name,
                holder.region,
                holder.service
            );
            self.remove_ip_prefix(&holder, cidr, prefix_type);
        }

        self.service_mut(region, service)
            .prefixes_mut(prefix_type)
            .push(cidr.to_string());
        self.prefix_holders
            .entry(cidr.to_string())
            .or_default()
            .push(new_pair);

        Ok(())
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    /// Locate or create the service entry, preserving first-appearance order.
    fn service_mut(&mut self, region: &str, service: &str) -> &mut ServiceIpRanges {
        let region_index = match self
            .region_networks
            .iter()
            .position(|detail| detail.region_name == region)
        {
            Some(index) => index,
            None => {
                self.region_networks.push(RegionNetworkDetail::new(region));
                self.region_networks.len() - 1
            }
        };
        let region_detail = &mut self.region_networks[region_index];

        let service_index = match region_detail
            .service_networks
            .iter()
            .position(|ranges| ranges.service_name == service)
        {
            Some(index) => index,
            None => {
                region_detail
                    .service_networks
                    .push(ServiceIpRanges::new(service));
                region_detail.service_networks.len() - 1
            }
        };
        &mut region_detail.service_networks[service_index]
    }

    /// Remove `cidr` from the pair's prefix list, pruning the service and region if emptied.
    fn remove_ip_prefix(&mut self, pair: &RegionServicePair, cidr: &str, prefix_type: PrefixType) {
        if let Some(holders) = self.prefix_holders.get_mut(cidr) {
            holders.retain(|holder| holder != pair);
        }

        let Some(region_detail) = self
            .region_networks
            .iter_mut()
            .find(|detail| detail.region_name == pair.region)
        else {
            return;
        };
        if let Some(ranges) = region_detail
            .service_networks
            .iter_mut()
            .find(|ranges| ranges.service_name == pair.service)
        {
            ranges.prefixes_mut(prefix_type).retain(|prefix| prefix != cidr);
        }

        region_detail
            .service_networks
            .retain(|ranges| ranges.ip_prefix_count() > 0);
        self.region_networks
            .retain(|detail| !detail.service_networks.is_empty());
    }
}

impl PartialEq for ProviderNetworkRanges {
    fn eq(&self, other: &Self) -> bool {
        self.provider_name == other.provider_name && self.region_networks == other.region_networks
    }
}

impl Eq for ProviderNetworkRanges {}

/*-------------------------------------------------------------------------------------------------
  External Network Sources
-------------------------------------------------------------------------------------------------*/

/// The published document: one [ProviderNetworkRanges] per successfully crawled provider.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNetworkSources {
    pub provider_networks: Vec<ProviderNetworkRanges>,
}

impl ExternalNetworkSources {
    pub fn push(&mut self, provider_networks: ProviderNetworkRanges) {
        self.provider_networks.push(provider_networks);
    }

    pub fn is_empty(&self) -> bool {
        self.provider_networks.is_empty()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::errors::Error;
    use std::collections::HashMap;

    /*----------------------------------------------------------------------------------
      Test Helper Functions
    ----------------------------------------------------------------------------------*/

    /// Map each region name to its detail for order-independent lookups.
    pub(crate) fn regions_by_name(
        provider: &ProviderNetworkRanges,
    ) -> HashMap<&str, &RegionNetworkDetail> {
        provider
            .region_networks
            .iter()
            .map(|region| (region.region_name.as_str(), region))
            .collect()
    }

    /// Assert the service holds exactly the expected prefixes, ignoring order.
    pub(crate) fn assert_service_prefixes(
        region: &RegionNetworkDetail,
        service_name: &str,
        expected_ipv4: &[&str],
        expected_ipv6: &[&str],
    ) {
        let service = region
            .get_service(service_name)
            .unwrap_or_else(|| panic!("service {service_name} not found in {}", region.region_name));

        let mut ipv4 = service.ipv4_prefixes.clone();
        let mut expected: Vec<String> = expected_ipv4.iter().map(|s| s.to_string()).collect();
        ipv4.sort();
        expected.sort();
        assert_eq!(ipv4, expected, "IPv4 prefixes of {service_name}");

        let mut ipv6 = service.ipv6_prefixes.clone();
        let mut expected: Vec<String> = expected_ipv6.iter().map(|s| s.to_string()).collect();
        ipv6.sort();
        expected.sort();
        assert_eq!(ipv6, expected, "IPv6 prefixes of {service_name}");
    }

    /*----------------------------------------------------------------------------------
      Add IP Prefix
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_add_ip_prefix_routes_by_family() {
        let mut provider = ProviderNetworkRanges::new("Test");
        provider
            .add_ip_prefix("region", "service", "10.0.0.0/8", RedundancyPolicy::ExactMatch)
            .unwrap();
        provider
            .add_ip_prefix("region", "service", "2001:db8::/32", RedundancyPolicy::ExactMatch)
            .unwrap();

        let service = provider.get_service("region", "service").unwrap();
        assert_eq!(service.ipv4_prefixes, vec!["10.0.0.0/8"]);
        assert_eq!(service.ipv6_prefixes, vec!["2001:db8::/32"]);
        assert_eq!(provider.ip_prefix_count(), 2);
    }

    #[test]
    fn test_add_ip_prefix_is_idempotent() {
        let mut provider = ProviderNetworkRanges::new("Test");
        for _ in 0..2 {
            provider
                .add_ip_prefix("region", "service", "10.0.0.0/8", RedundancyPolicy::ExactMatch)
                .unwrap();
        }
        let service = provider.get_service("region", "service").unwrap();
        assert_eq!(service.ipv4_prefixes.len(), 1);
    }

    #[test]
    fn test_add_ip_prefix_exact_match_keeps_distinct_services() {
        let mut provider = ProviderNetworkRanges::new("Test");
        provider
            .add_ip_prefix("region", "service1", "10.0.0.0/8", RedundancyPolicy::ExactMatch)
            .unwrap();
        provider
            .add_ip_prefix("region", "service2", "10.0.0.0/8", RedundancyPolicy::ExactMatch)
            .unwrap();

        let region = provider.get_region("region").unwrap();
        assert_eq!(region.service_networks.len(), 2);
        assert_service_prefixes(region, "service1", &["10.0.0.0/8"], &[]);
        assert_service_prefixes(region, "service2", &["10.0.0.0/8"], &[]);
    }

    #[test]
    fn test_add_ip_prefix_rejects_invalid_cidr() {
        let mut provider = ProviderNetworkRanges::new("Test");
        let result =
            provider.add_ip_prefix("region", "service", "10.0.0.0", RedundancyPolicy::ExactMatch);
        assert!(matches!(result, Err(Error::InvalidCidr { .. })));
        assert!(provider.region_networks().is_empty());
    }

    #[test]
    fn test_add_ip_prefix_preserves_insertion_order() {
        let mut provider = ProviderNetworkRanges::new("Test");
        let policy = RedundancyPolicy::ExactMatch;
        provider.add_ip_prefix("b", "y", "10.0.0.0/8", policy).unwrap();
        provider.add_ip_prefix("a", "z", "10.1.0.0/16", policy).unwrap();
        provider.add_ip_prefix("b", "x", "10.2.0.0/16", policy).unwrap();

        let regions: Vec<&str> = provider
            .region_networks()
            .iter()
            .map(|region| region.region_name.as_str())
            .collect();
        assert_eq!(regions, vec!["b", "a"]);

        let services: Vec<&str> = provider.region_networks()[0]
            .service_networks
            .iter()
            .map(|service| service.service_name.as_str())
            .collect();
        assert_eq!(services, vec!["y", "x"]);
    }

    /*----------------------------------------------------------------------------------
      Hierarchical Redundancy
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_hierarchical_insertions_collapse_to_most_specific_pair() {
        let mut provider = ProviderNetworkRanges::new("Azure");
        let policy = RedundancyPolicy::HierarchicalSubset;
        let addr = "20.140.48.160/27";

        provider.add_ip_prefix("cloud", "platform/service", addr, policy).unwrap();
        provider.add_ip_prefix("cloud", "platform", addr, policy).unwrap();
        provider.add_ip_prefix("cloud/region", "platform", addr, policy).unwrap();
        provider
            .add_ip_prefix("cloud/region", "platform/service", addr, policy)
            .unwrap();

        assert_eq!(provider.region_networks().len(), 1);
        let region = provider.get_region("cloud/region").unwrap();
        assert_eq!(region.service_networks.len(), 1);
        assert_service_prefixes(region, "platform/service", &[addr], &[]);

        // A later broad insertion routes to the surviving pair.
        provider.add_ip_prefix("cloud", "platform", addr, policy).unwrap();
        assert_eq!(provider.region_networks().len(), 1);
        assert_eq!(provider.ip_prefix_count(), 1);
    }

    #[test]
    fn test_hierarchical_absorption_keeps_other_prefixes() {
        let mut provider = ProviderNetworkRanges::new("Azure");
        let policy = RedundancyPolicy::HierarchicalSubset;

        provider.add_ip_prefix("cloud", "platform", "10.0.0.0/24", policy).unwrap();
        provider.add_ip_prefix("cloud", "platform", "10.0.1.0/24", policy).unwrap();
        provider
            .add_ip_prefix("cloud/region", "platform/service", "10.0.0.0/24", policy)
            .unwrap();

        let regions = regions_by_name(&provider);
        assert_eq!(regions.len(), 2);
        assert_service_prefixes(regions["cloud"], "platform", &["10.0.1.0/24"], &[]);
        assert_service_prefixes(
            regions["cloud/region"],
            "platform/service",
            &["10.0.0.0/24"],
            &[],
        );
    }

    #[test]
    fn test_hierarchical_malformed_name_fails() {
        let mut provider = ProviderNetworkRanges::new("Azure");
        let policy = RedundancyPolicy::HierarchicalSubset;
        provider.add_ip_prefix("cloud", "platform", "10.0.0.0/24", policy).unwrap();
        let result = provider.add_ip_prefix("cloud/a/b", "platform", "10.0.0.0/24", policy);
        assert!(matches!(result, Err(Error::InvalidCompoundName { .. })));
    }

    #[test]
    fn test_hierarchical_malformed_name_fails_for_new_prefix() {
        let mut provider = ProviderNetworkRanges::new("Azure");
        let policy = RedundancyPolicy::HierarchicalSubset;

        let result = provider.add_ip_prefix("cloud/a/b", "platform", "10.0.0.0/24", policy);
        assert!(matches!(result, Err(Error::InvalidCompoundName { .. })));

        let result = provider.add_ip_prefix("cloud", "platform/a/b", "10.0.1.0/24", policy);
        assert!(matches!(result, Err(Error::InvalidCompoundName { .. })));
        assert!(provider.region_networks().is_empty());

        // Flat names are not split under exact matching.
        provider
            .add_ip_prefix("cloud/a/b", "platform", "10.0.2.0/24", RedundancyPolicy::ExactMatch)
            .unwrap();
    }

    /*----------------------------------------------------------------------------------
      Serialization
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_serialized_field_names() {
        let mut provider = ProviderNetworkRanges::new("Google");
        provider
            .add_ip_prefix("asia-east1", "Google Cloud", "34.80.0.0/15", RedundancyPolicy::ExactMatch)
            .unwrap();
        let sources = ExternalNetworkSources {
            provider_networks: vec![provider],
        };

        let json = serde_json::to_string(&sources).unwrap();
        assert_eq!(
            json,
            r#"{"providerNetworks":[{"providerName":"Google","regionNetworks":[{"regionName":"asia-east1","serviceNetworks":[{"serviceName":"Google Cloud","ipv4Prefixes":["34.80.0.0/15"],"ipv6Prefixes":[]}]}]}]}"#
        );

        let deserialized: ExternalNetworkSources = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, sources);
    }
}
