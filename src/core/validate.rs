use crate::core::errors::{Error, Result};
use crate::core::network_ranges::{ExternalNetworkSources, ProviderNetworkRanges};
use log::debug;
use std::collections::BTreeMap;

/*-------------------------------------------------------------------------------------------------
  Validation
-------------------------------------------------------------------------------------------------*/

/// Check the crawled sources are complete enough to publish.
///
/// Providers, regions, and services are walked in order and the first violation found is
/// returned. `thresholds` maps a provider name to the minimum number of prefixes (IPv4 and IPv6
/// combined) its crawl must yield; every provider must have an entry.
pub fn validate(
    sources: &ExternalNetworkSources,
    thresholds: &BTreeMap<String, usize>,
) -> Result<()> {
    if sources.is_empty() {
        return Err(Error::NoCrawlSources);
    }

    for provider in &sources.provider_networks {
        let observed = validate_provider(provider)?;

        let provider_name = provider.provider_name();
        let Some(&required) = thresholds.get(provider_name) else {
            return Err(Error::MissingPrefixThreshold {
                provider: provider_name.to_string(),
            });
        };
        if observed < required {
            return Err(Error::InsufficientIpPrefixCount {
                provider: provider_name.to_string(),
                observed,
                required,
            });
        }
        debug!("{provider_name}: {observed} IP prefixes passed validation");
    }

    Ok(())
}

/// Structural checks for one provider; returns the provider's total prefix count.
fn validate_provider(provider: &ProviderNetworkRanges) -> Result<usize> {
    let provider_name = provider.provider_name();
    if provider_name.is_empty() {
        return Err(Error::EmptyProviderName);
    }
    if provider.region_networks().is_empty() {
        return Err(Error::NoRegionsForProvider {
            provider: provider_name.to_string(),
        });
    }

    let mut observed = 0;
    for region in provider.region_networks() {
        let region_name = &region.region_name;
        if region_name.is_empty() {
            return Err(Error::EmptyRegionName {
                provider: provider_name.to_string(),
            });
        }
        if region.service_networks.is_empty() {
            return Err(Error::NoServicesForRegion {
                provider: provider_name.to_string(),
                region: region_name.to_string(),
            });
        }

        for service in &region.service_networks {
            if service.service_name.is_empty() {
                return Err(Error::EmptyServiceName {
                    provider: provider_name.to_string(),
                    region: region_name.to_string(),
                });
            }
            if service.ip_prefix_count() == 0 {
                return Err(Error::NoIpPrefixesForService {
                    provider: provider_name.to_string(),
                    region: region_name.to_string(),
                    service: service.service_name.to_string(),
                });
            }
            observed += service.ip_prefix_count();
        }
    }

    Ok(observed)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
