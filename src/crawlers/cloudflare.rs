use crate::core::client::Fetch;
use crate::core::config::{DEFAULT_REGION, DEFAULT_SERVICE};
use crate::core::errors::{Error, Result};
use crate::core::network_ranges::ProviderNetworkRanges;
use crate::core::redundancy::RedundancyPolicy;
use crate::crawlers::{NetworkCrawler, Provider};
use serde::Deserialize;

/*-------------------------------------------------------------------------------------------------
  Cloudflare API JSON
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize)]
struct CloudflareResponse {
    result: CloudflareIpSpec,
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CloudflareIpSpec {
    #[serde(default)]
    ipv4_cidrs: Vec<String>,
    #[serde(default)]
    ipv6_cidrs: Vec<String>,
}

fn default_success() -> bool {
    true
}

/*-------------------------------------------------------------------------------------------------
  Cloudflare Crawler
-------------------------------------------------------------------------------------------------*/

/// Crawls the Cloudflare IP API. Cloudflare does not segment its ranges, so every prefix lands
/// under the default region and service.
pub struct CloudflareNetworkCrawler {
    url: &'static str,
}

impl CloudflareNetworkCrawler {
    pub fn new() -> Self {
        Self {
            url: Provider::Cloudflare.urls()[0],
        }
    }

    fn parse_networks(&self, data: &[u8]) -> Result<ProviderNetworkRanges> {
        let response: CloudflareResponse =
            serde_json::from_slice(data).map_err(|source| Error::DecodeFailed {
                provider: self.human_readable_name().to_string(),
                source,
            })?;
        if !response.success {
            return Err(Error::UnsuccessfulResponse {
                provider: self.human_readable_name().to_string(),
                reason: format!("API reported errors: {:?}", response.errors),
            });
        }

        let mut provider_networks = ProviderNetworkRanges::new(self.provider_key().as_str());
        let cidrs = response
            .result
            .ipv4_cidrs
            .iter()
            .chain(response.result.ipv6_cidrs.iter());
        for cidr in cidrs {
            // Slashes may arrive escaped even after JSON decoding.
            let cidr = cidr.replace(r"\/", "/");
            provider_networks.add_ip_prefix(
                DEFAULT_REGION,
                DEFAULT_SERVICE,
                &cidr,
                RedundancyPolicy::ExactMatch,
            )?;
        }

        Ok(provider_networks)
    }
}

impl Default for CloudflareNetworkCrawler {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCrawler for CloudflareNetworkCrawler {
    fn crawl(&self, fetch: &dyn Fetch) -> Result<ProviderNetworkRanges> {
        let data = fetch.get(self.url)?;
        self.parse_networks(&data)
    }

    fn human_readable_name(&self) -> &'static str {
        "Cloudflare"
    }

    fn provider_key(&self) -> Provider {
        Provider::Cloudflare
    }

    fn min_required_ip_prefixes(&self) -> usize {
        10
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
