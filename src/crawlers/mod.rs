/*-------------------------------------------------------------------------------------------------
  Provider Crawler Modules
-------------------------------------------------------------------------------------------------*/

pub mod aws;
pub mod azure;
pub mod cloudflare;
pub mod gcp;
pub mod oracle;

use crate::core::client::Fetch;
use crate::core::errors::{Error, Result};
use crate::core::network_ranges::ProviderNetworkRanges;
use log::info;
use std::fmt;
use std::str::FromStr;

/*-------------------------------------------------------------------------------------------------
  Network Crawler
-------------------------------------------------------------------------------------------------*/

/// Fetches a provider's published IP ranges and normalizes them into a [ProviderNetworkRanges].
pub trait NetworkCrawler {
    /// Fetch, decode, and normalize the provider's public network ranges.
    fn crawl(&self, fetch: &dyn Fetch) -> Result<ProviderNetworkRanges>;

    fn human_readable_name(&self) -> &'static str;

    fn provider_key(&self) -> Provider;

    /// Sanity threshold for the total number of prefixes a healthy crawl yields.
    fn min_required_ip_prefixes(&self) -> usize;
}

/*-------------------------------------------------------------------------------------------------
  Provider
-------------------------------------------------------------------------------------------------*/

/// The closed set of providers this crate knows how to crawl, in crawl order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Provider {
    Google,
    Amazon,
    Azure,
    Cloudflare,
    Oracle,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Google,
        Provider::Amazon,
        Provider::Azure,
        Provider::Cloudflare,
        Provider::Oracle,
    ];

    /// Endpoints publishing the provider's IP ranges.
    pub fn urls(&self) -> &'static [&'static str] {
        match self {
            Provider::Google => &["https://www.gstatic.com/ipranges/cloud.json"],
            Provider::Amazon => &["https://ip-ranges.amazonaws.com/ip-ranges.json"],
            // Download confirmation pages; the JSON links on them change with every release.
            Provider::Azure => &[
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519",
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=57063",
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=57062",
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=57064",
            ],
            Provider::Cloudflare => &["https://api.cloudflare.com/client/v4/ips"],
            Provider::Oracle => &["https://docs.oracle.com/en-us/iaas/tools/public_ip_ranges.json"],
        }
    }

    /// The crawler implementation for this provider.
    pub fn crawler(&self) -> Box<dyn NetworkCrawler> {
        match self {
            Provider::Google => Box::new(gcp::GcpNetworkCrawler::new()),
            Provider::Amazon => Box::new(aws::AwsNetworkCrawler::new()),
            Provider::Azure => Box::new(azure::AzureNetworkCrawler::new()),
            Provider::Cloudflare => Box::new(cloudflare::CloudflareNetworkCrawler::new()),
            Provider::Oracle => Box::new(oracle::OciNetworkCrawler::new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Amazon => "Amazon",
            Provider::Azure => "Azure",
            Provider::Cloudflare => "Cloudflare",
            Provider::Oracle => "Oracle",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "google" | "gcp" => Ok(Provider::Google),
            "amazon" | "aws" => Ok(Provider::Amazon),
            "azure" | "microsoft" => Ok(Provider::Azure),
            "cloudflare" => Ok(Provider::Cloudflare),
            "oracle" | "oci" => Ok(Provider::Oracle),
            _ => Err(Error::InvalidProvider(value.to_string())),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Crawler Selection
-------------------------------------------------------------------------------------------------*/

/// Crawlers for every provider not listed in `skipped`, in [Provider::ALL] order.
pub fn get(skipped: &[Provider]) -> Vec<Box<dyn NetworkCrawler>> {
    Provider::ALL
        .iter()
        .map(Provider::crawler)
        .filter(|crawler| {
            let skip = skipped.contains(&crawler.provider_key());
            if skip {
                info!(
                    "Skipping crawling networks for {}...",
                    crawler.human_readable_name()
                );
            }
            !skip
        })
        .collect()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_display() {
        for provider in Provider::ALL {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!("GCP".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!(" aws ".parse::<Provider>().unwrap(), Provider::Amazon);
        assert_eq!("oci".parse::<Provider>().unwrap(), Provider::Oracle);
        assert!(matches!(
            "digitalocean".parse::<Provider>(),
            Err(Error::InvalidProvider(_))
        ));
    }

    #[test]
    fn test_crawler_lookup_matches_provider() {
        for provider in Provider::ALL {
            let crawler = provider.crawler();
            assert_eq!(crawler.provider_key(), provider);
            assert!(crawler.min_required_ip_prefixes() > 0);
            assert!(!provider.urls().is_empty());
        }
    }

    #[test]
    fn test_get_skips_providers_and_keeps_order() {
        let crawlers = get(&[Provider::Amazon, Provider::Oracle]);
        let providers: Vec<Provider> = crawlers.iter().map(|c| c.provider_key()).collect();
        assert_eq!(
            providers,
            vec![Provider::Google, Provider::Azure, Provider::Cloudflare]
        );
    }

    #[test]
    fn test_get_without_skips_returns_all() {
        assert_eq!(get(&[]).len(), Provider::ALL.len());
    }
}
