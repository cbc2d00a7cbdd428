use cloudipranges::{ExternalNetworkSources, PrefixType, ProviderNetworkRanges, Snapshot};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;
use std::path::Path;

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Provider Summary Table
--------------------------------------------------------------------------------------*/

pub fn provider_table(sources: &ExternalNetworkSources) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let ipv4_header = prefix_header(PrefixType::IPv4);
    let ipv6_header = prefix_header(PrefixType::IPv6);
    table.set_header(
        ["Provider", "Regions", "Services", ipv4_header.as_str(), ipv6_header.as_str()]
            .into_iter()
            .map(|header| {
                Cell::new(header)
                    .add_attribute(Attribute::Bold)
                    .fg(Color::Green)
            }),
    );

    for provider in &sources.provider_networks {
        let counts = ProviderCounts::from(provider);
        table.add_row(vec![
            Cell::new(provider.provider_name()).add_attribute(Attribute::Bold),
            Cell::new(counts.regions),
            Cell::new(counts.services),
            Cell::new(counts.ipv4_prefixes),
            Cell::new(counts.ipv6_prefixes),
        ]);
    }

    // Right-align the count columns
    for index in 1..5 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    println!("{table}");
}

/*--------------------------------------------------------------------------------------
  Snapshot Summary
--------------------------------------------------------------------------------------*/

pub fn snapshot_summary(bucket: &str, location: &Path, snapshot: &Snapshot, dry_run: bool) {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let bucket = if dry_run {
        format!("{bucket} (dry run, nothing written)")
    } else {
        bucket.to_string()
    };
    table.add_row(vec![Cell::new("Bucket").add_attribute(Attribute::Bold), Cell::new(bucket)]);
    table.add_row(vec![
        Cell::new("Location").add_attribute(Attribute::Bold),
        Cell::new(location.display()),
    ]);
    table.add_row(vec![
        Cell::new("Snapshot").add_attribute(Attribute::Bold),
        Cell::new(&snapshot.prefix),
    ]);
    table.add_row(vec![
        Cell::new("Checksum").add_attribute(Attribute::Bold),
        Cell::new(&snapshot.checksum),
    ]);
    table.add_row(vec![
        Cell::new("Timestamp").add_attribute(Attribute::Bold),
        Cell::new(&snapshot.timestamp),
    ]);

    println!("{table}");
}

/*--------------------------------------------------------------------------------------
  Helpers
--------------------------------------------------------------------------------------*/

fn prefix_header(prefix_type: PrefixType) -> String {
    format!("{prefix_type} Prefixes")
}

#[derive(Debug, Default, PartialEq)]
struct ProviderCounts {
    regions: usize,
    services: usize,
    ipv4_prefixes: usize,
    ipv6_prefixes: usize,
}

impl From<&ProviderNetworkRanges> for ProviderCounts {
    fn from(provider: &ProviderNetworkRanges) -> Self {
        let mut counts = ProviderCounts {
            regions: provider.region_networks().len(),
            ..ProviderCounts::default()
        };
        for region in provider.region_networks() {
            counts.services += region.service_networks.len();
            for service in &region.service_networks {
                counts.ipv4_prefixes += service.ipv4_prefixes.len();
                counts.ipv6_prefixes += service.ipv6_prefixes.len();
            }
        }
        counts
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use cloudipranges::RedundancyPolicy;

    #[test]
    fn test_prefix_headers() {
        assert_eq!(prefix_header(PrefixType::IPv4), "IPv4 Prefixes");
        assert_eq!(prefix_header(PrefixType::IPv6), "IPv6 Prefixes");
    }

    #[test]
    fn test_provider_counts() {
        let mut provider = ProviderNetworkRanges::new("Test");
        let policy = RedundancyPolicy::ExactMatch;
        provider.add_ip_prefix("r1", "s1", "10.0.0.0/8", policy).unwrap();
        provider.add_ip_prefix("r1", "s2", "2001:db8::/32", policy).unwrap();
        provider.add_ip_prefix("r2", "s1", "10.1.0.0/16", policy).unwrap();

        assert_eq!(
            ProviderCounts::from(&provider),
            ProviderCounts {
                regions: 2,
                services: 3,
                ipv4_prefixes: 2,
                ipv6_prefixes: 1,
            }
        );
    }
}
