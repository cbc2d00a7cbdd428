use crate::core::client::Fetch;
use crate::core::errors::{Error, Result};
use crate::core::network_ranges::ProviderNetworkRanges;
use crate::core::redundancy::RedundancyPolicy;
use crate::crawlers::{NetworkCrawler, Provider};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  AWS IP Ranges JSON
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Default, Deserialize, Serialize)]
struct AwsNetworkSpec {
    #[serde(rename = "syncToken", default)]
    sync_token: String,
    #[serde(rename = "createDate", default)]
    create_date: String,
    prefixes: Vec<AwsIpv4Spec>,
    #[serde(default)]
    ipv6_prefixes: Vec<AwsIpv6Spec>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct AwsIpv4Spec {
    #[serde(default)]
    ip_prefix: String,
    region: String,
    #[serde(default)]
    network_border_group: String,
    service: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct AwsIpv6Spec {
    #[serde(default)]
    ipv6_prefix: String,
    region: String,
    #[serde(default)]
    network_border_group: String,
    service: String,
}

/*-------------------------------------------------------------------------------------------------
  AWS Crawler
-------------------------------------------------------------------------------------------------*/

pub struct AwsNetworkCrawler {
    url: &'static str,
}

impl AwsNetworkCrawler {
    pub fn new() -> Self {
        Self {
            url: Provider::Amazon.urls()[0],
        }
    }

    fn parse_networks(&self, data: &[u8]) -> Result<ProviderNetworkRanges> {
        let spec: AwsNetworkSpec =
            serde_json::from_slice(data).map_err(|source| Error::DecodeFailed {
                provider: self.human_readable_name().to_string(),
                source,
            })?;
        debug!(
            "AWS ranges syncToken={} createDate={}",
            spec.sync_token, spec.create_date
        );

        let mut provider_networks = ProviderNetworkRanges::new(self.provider_key().as_str());
        for ipv4_spec in &spec.prefixes {
            if ipv4_spec.ip_prefix.is_empty() {
                warn!("Received an empty IPv4 definition: {ipv4_spec:?}");
                continue;
            }
            provider_networks.add_ip_prefix(
                &ipv4_spec.region,
                &ipv4_spec.service,
                &ipv4_spec.ip_prefix,
                RedundancyPolicy::ExactMatch,
            )?;
        }
        for ipv6_spec in &spec.ipv6_prefixes {
            if ipv6_spec.ipv6_prefix.is_empty() {
                warn!("Received an empty IPv6 definition: {ipv6_spec:?}");
                continue;
            }
            provider_networks.add_ip_prefix(
                &ipv6_spec.region,
                &ipv6_spec.service,
                &ipv6_spec.ipv6_prefix,
                RedundancyPolicy::ExactMatch,
            )?;
        }

        Ok(provider_networks)
    }
}

impl Default for AwsNetworkCrawler {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCrawler for AwsNetworkCrawler {
    fn crawl(&self, fetch: &dyn Fetch) -> Result<ProviderNetworkRanges> {
        let data = fetch.get(self.url)?;
        self.parse_networks(&data)
    }

    fn human_readable_name(&self) -> &'static str {
        "Amazon Web Services"
    }

    fn provider_key(&self) -> Provider {
        Provider::Amazon
    }

    fn min_required_ip_prefixes(&self) -> usize {
        // Recent documents carry a little over 4200 prefixes.
        4000
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
