use crate::core::client::Fetch;
use crate::core::errors::{Error, Result};
use crate::core::network_ranges::ProviderNetworkRanges;
use crate::core::redundancy::RedundancyPolicy;
use crate::crawlers::{NetworkCrawler, Provider};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Google Cloud JSON
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct GcpNetworkSpec {
    #[serde(default)]
    sync_token: String,
    #[serde(default)]
    creation_time: String,
    prefixes: Vec<GcpIpSpec>,
}

/// One prefix entry; Google sets exactly one of the two prefix fields.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct GcpIpSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    ipv4_prefix: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    ipv6_prefix: String,
    service: String,
    scope: String,
}

/*-------------------------------------------------------------------------------------------------
  Google Cloud Crawler
-------------------------------------------------------------------------------------------------*/

/// Crawls `cloud.json`; the entry's `scope` is its region.
pub struct GcpNetworkCrawler {
    url: &'static str,
}

impl GcpNetworkCrawler {
    pub fn new() -> Self {
        Self {
            url: Provider::Google.urls()[0],
        }
    }

    fn parse_networks(&self, data: &[u8]) -> Result<ProviderNetworkRanges> {
        let spec: GcpNetworkSpec =
            serde_json::from_slice(data).map_err(|source| Error::DecodeFailed {
                provider: self.human_readable_name().to_string(),
                source,
            })?;
        debug!(
            "Google ranges syncToken={} creationTime={}",
            spec.sync_token, spec.creation_time
        );

        let mut provider_networks = ProviderNetworkRanges::new(self.provider_key().as_str());
        for ip_spec in &spec.prefixes {
            if ip_spec.ipv4_prefix.is_empty() && ip_spec.ipv6_prefix.is_empty() {
                warn!("Received a Google prefix entry without any prefix: {ip_spec:?}");
                continue;
            }
            for prefix in [&ip_spec.ipv4_prefix, &ip_spec.ipv6_prefix] {
                if prefix.is_empty() {
                    continue;
                }
                provider_networks.add_ip_prefix(
                    &ip_spec.scope,
                    &ip_spec.service,
                    prefix,
                    RedundancyPolicy::ExactMatch,
                )?;
            }
        }

        Ok(provider_networks)
    }
}

impl Default for GcpNetworkCrawler {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCrawler for GcpNetworkCrawler {
    fn crawl(&self, fetch: &dyn Fetch) -> Result<ProviderNetworkRanges> {
        let data = fetch.get(self.url)?;
        self.parse_networks(&data)
    }

    fn human_readable_name(&self) -> &'static str {
        "Google Cloud"
    }

    fn provider_key(&self) -> Provider {
        Provider::Google
    }

    fn min_required_ip_prefixes(&self) -> usize {
        400
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
