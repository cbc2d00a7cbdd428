use crate::core::client::{resolve_download_url, Fetch};
use crate::core::compound_name::{join, AZURE_DELIMITER};
use crate::core::errors::{Error, Result};
use crate::core::network_ranges::ProviderNetworkRanges;
use crate::core::redundancy::RedundancyPolicy;
use crate::crawlers::{NetworkCrawler, Provider};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Azure Service Tags JSON
-------------------------------------------------------------------------------------------------*/

/// One Service Tags document; Microsoft publishes one per cloud (Public, AzureGovernment,
/// AzureChina, AzureGermany).
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct AzureCloud {
    #[serde(default)]
    change_number: i64,
    cloud: String,
    values: Vec<AzureCloudEntity>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct AzureCloudEntity {
    #[serde(default)]
    name: String,
    #[serde(default)]
    id: String,
    properties: AzureCloudEntityProperties,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct AzureCloudEntityProperties {
    #[serde(default)]
    change_number: i64,
    #[serde(default)]
    region: String,
    #[serde(default)]
    region_id: i64,
    #[serde(default)]
    platform: String,
    #[serde(default)]
    system_service: String,
    #[serde(default)]
    address_prefixes: Vec<String>,
    #[serde(default)]
    network_features: Vec<String>,
}

/*-------------------------------------------------------------------------------------------------
  Azure Crawler
-------------------------------------------------------------------------------------------------*/

/// Crawls the Azure Service Tags documents of every Azure cloud.
///
/// Region names are `<cloud>/<region>` and service names `<platform>/<systemService>`; an empty
/// region or system service leaves just the outer component (`Public`, `Azure`). The same CIDR
/// is often listed under both a broad and a specific tag, so the hierarchical redundancy policy
/// keeps only the most specific (region, service) pair.
pub struct AzureNetworkCrawler {
    urls: &'static [&'static str],
}

impl AzureNetworkCrawler {
    pub fn new() -> Self {
        Self {
            urls: Provider::Azure.urls(),
        }
    }

    /// Resolve every download confirmation page and fetch the JSON it links to.
    ///
    /// Any failure aborts the crawl; a partial Azure dataset is not published.
    fn fetch_all(&self, fetch: &dyn Fetch) -> Result<Vec<Vec<u8>>> {
        let mut documents = Vec::with_capacity(self.urls.len());
        for page_url in self.urls {
            let json_url = resolve_download_url(fetch, page_url)?;
            info!("Received Azure network JSON URL: {json_url}");
            documents.push(fetch.get(&json_url)?);
        }
        Ok(documents)
    }

    fn parse_networks(&self, documents: &[Vec<u8>]) -> Result<ProviderNetworkRanges> {
        let mut provider_networks = ProviderNetworkRanges::new(self.provider_key().as_str());

        for data in documents {
            let cloud: AzureCloud =
                serde_json::from_slice(data).map_err(|source| Error::DecodeFailed {
                    provider: self.human_readable_name().to_string(),
                    source,
                })?;
            debug!(
                "Parsing Azure cloud {} (changeNumber {}, {} entities)",
                cloud.cloud,
                cloud.change_number,
                cloud.values.len()
            );

            for entity in &cloud.values {
                let properties = &entity.properties;
                if properties.address_prefixes.is_empty() {
                    continue;
                }

                let region = join(AZURE_DELIMITER, [&cloud.cloud, &properties.region]);
                let service = join(
                    AZURE_DELIMITER,
                    [&properties.platform, &properties.system_service],
                );
                for prefix in &properties.address_prefixes {
                    provider_networks.add_ip_prefix(
                        &region,
                        &service,
                        prefix,
                        RedundancyPolicy::HierarchicalSubset,
                    )?;
                }
            }
        }

        Ok(provider_networks)
    }
}

impl Default for AzureNetworkCrawler {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCrawler for AzureNetworkCrawler {
    fn crawl(&self, fetch: &dyn Fetch) -> Result<ProviderNetworkRanges> {
        let documents = self.fetch_all(fetch)?;
        self.parse_networks(&documents)
    }

    fn human_readable_name(&self) -> &'static str {
        "Microsoft Azure"
    }

    fn provider_key(&self) -> Provider {
        Provider::Azure
    }

    fn min_required_ip_prefixes(&self) -> usize {
        2000
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::StaticFetch;
    use crate::core::network_ranges::tests::{assert_service_prefixes, regions_by_name};
    use test_log::test;

    fn entity(
        region: &str,
        platform: &str,
        system_service: &str,
        prefixes: &[&str],
    ) -> AzureCloudEntity {
        let name = join('.', [platform, system_service]);
        AzureCloudEntity {
            name: name.clone(),
            id: name,
            properties: AzureCloudEntityProperties {
                region: region.to_string(),
                platform: platform.to_string(),
                system_service: system_service.to_string(),
                address_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                ..AzureCloudEntityProperties::default()
            },
        }
    }

    fn cloud(name: &str, values: Vec<AzureCloudEntity>) -> Vec<u8> {
        serde_json::to_vec(&AzureCloud {
            change_number: 1,
            cloud: name.to_string(),
            values,
        })
        .unwrap()
    }

    #[test]
    fn test_azure_parse_networks() {
        let (cloud1, cloud2) = ("Public", "AzureGovernment");
        let (service1, service2) = ("ActionGroup", "AzureStorage");
        let (region1, region2) = ("useast", "usgovcentral");
        let platform = "Azure";

        let (c1r1s1_ipv41, c1r1s1_ipv42) = ("20.140.48.160/27", "20.140.56.160/27");
        let c1r1s2_ipv6 = "2001:489a:3103::140/123";
        let (c1r1_ipv4, c1r1_ipv6) = ("20.140.64.160/27", "2001:489a:3203::140/123");
        let c2r2s2_ipv4 = "20.140.72.160/27";
        let (c2_ipv4, c2_ipv6) = ("52.127.49.96/27", "2001:489a:3303::140/123");

        let documents = vec![
            cloud(
                cloud1,
                vec![
                    entity(region1, platform, service1, &[c1r1s1_ipv41, c1r1s1_ipv42]),
                    entity(region1, platform, service2, &[c1r1s2_ipv6]),
                    entity(region1, platform, "", &[c1r1_ipv4, c1r1_ipv6]),
                    entity(region1, platform, "AzureSQL", &[]),
                ],
            ),
            cloud(
                cloud2,
                vec![
                    entity(region2, platform, service2, &[c2r2s2_ipv4]),
                    entity("", platform, "", &[c2_ipv4, c2_ipv6]),
                ],
            ),
        ];

        let parsed = AzureNetworkCrawler::new().parse_networks(&documents).unwrap();
        assert_eq!(parsed.provider_name(), "Azure");

        // Public/useast, AzureGovernment/usgovcentral and AzureGovernment
        let regions = regions_by_name(&parsed);
        assert_eq!(regions.len(), 3);

        let c1r1 = regions["Public/useast"];
        assert_eq!(c1r1.service_networks.len(), 3);
        assert_service_prefixes(c1r1, "Azure/ActionGroup", &[c1r1s1_ipv41, c1r1s1_ipv42], &[]);
        assert_service_prefixes(c1r1, "Azure/AzureStorage", &[], &[c1r1s2_ipv6]);
        assert_service_prefixes(c1r1, "Azure", &[c1r1_ipv4], &[c1r1_ipv6]);

        let c2r2 = regions["AzureGovernment/usgovcentral"];
        assert_eq!(c2r2.service_networks.len(), 1);
        assert_service_prefixes(c2r2, "Azure/AzureStorage", &[c2r2s2_ipv4], &[]);

        let c2 = regions["AzureGovernment"];
        assert_eq!(c2.service_networks.len(), 1);
        assert_service_prefixes(c2, "Azure", &[c2_ipv4], &[c2_ipv6]);
    }

    #[test]
    fn test_azure_region_service_redundancy_check() {
        let addr = "20.140.48.160/27";
        let documents = vec![cloud(
            "test-cloud",
            vec![
                entity("", "test-platform", "test-service", &[addr]),
                entity("", "test-platform", "", &[addr]),
                entity("test-region", "test-platform", "", &[addr]),
                entity("test-region", "test-platform", "test-service", &[addr]),
            ],
        )];

        let parsed = AzureNetworkCrawler::new().parse_networks(&documents).unwrap();

        // Only the most specific entry survives.
        assert_eq!(parsed.region_networks().len(), 1);
        let region = parsed.get_region("test-cloud/test-region").unwrap();
        assert_eq!(region.service_networks.len(), 1);
        assert_service_prefixes(region, "test-platform/test-service", &[addr], &[]);
    }

    #[test]
    fn test_azure_invalid_prefix_fails_crawl() {
        let documents = vec![cloud(
            "Public",
            vec![entity("eastus", "Azure", "AzureStorage", &["20.140.48.160"])],
        )];
        let result = AzureNetworkCrawler::new().parse_networks(&documents);
        assert!(matches!(result, Err(Error::InvalidCidr { .. })));
    }

    #[test]
    fn test_azure_undecodable_document_fails_crawl() {
        let documents = vec![
            cloud("Public", vec![entity("eastus", "Azure", "", &["20.140.48.160/27"])]),
            b"<html>not json</html>".to_vec(),
        ];
        let result = AzureNetworkCrawler::new().parse_networks(&documents);
        assert!(matches!(result, Err(Error::DecodeFailed { .. })));
    }

    /*----------------------------------------------------------------------------------
      Crawl Through Download Pages
    ----------------------------------------------------------------------------------*/

    fn confirmation_page(json_url: &str) -> String {
        format!(r#"<html><a class="failoverLink" href="{json_url}">click here</a></html>"#)
    }

    #[test]
    fn test_azure_crawl_resolves_download_pages() {
        let mut fetch = StaticFetch::default();
        for (index, page_url) in Provider::Azure.urls().iter().enumerate() {
            let json_url =
                format!("https://download.microsoft.com/download/{index}/ServiceTags.json");
            let document = cloud(
                &format!("Cloud{index}"),
                vec![entity("", "Azure", "", &[&format!("10.{index}.0.0/16")])],
            );
            fetch = fetch
                .with(page_url, confirmation_page(&json_url))
                .with(&json_url, document);
        }

        let parsed = AzureNetworkCrawler::new().crawl(&fetch).unwrap();
        assert_eq!(parsed.region_networks().len(), Provider::Azure.urls().len());
        let region = parsed.get_region("Cloud2").unwrap();
        assert_service_prefixes(region, "Azure", &["10.2.0.0/16"], &[]);
    }

    #[test]
    fn test_azure_crawl_fails_when_any_source_is_unreachable() {
        let page_url = Provider::Azure.urls()[0];
        let json_url = "https://download.microsoft.com/download/0/ServiceTags.json";
        let fetch = StaticFetch::default()
            .with(page_url, confirmation_page(json_url))
            .with(json_url, cloud("Public", vec![]));

        let result = AzureNetworkCrawler::new().crawl(&fetch);
        assert!(matches!(result, Err(Error::FetchFailed { .. })));
    }
}
