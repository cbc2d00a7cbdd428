use cloudipranges::crawlers::NetworkCrawler;
use cloudipranges::CrawlReport;
use log::{info, warn};

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Crawl Plan
--------------------------------------------------------------------------------------*/

pub fn crawl_plan(crawlers: &[Box<dyn NetworkCrawler>], dry_run: bool) {
    if dry_run {
        info!("Dry run specified. Networks are crawled and validated but nothing is uploaded");
    }
    if crawlers.is_empty() {
        warn!("Every provider was skipped; there is nothing to crawl");
    }
}

/*--------------------------------------------------------------------------------------
  Crawl Report
--------------------------------------------------------------------------------------*/

pub fn crawl_report(report: &CrawlReport) {
    let crawled = report.sources.provider_networks.len();
    let prefixes: usize = report
        .sources
        .provider_networks
        .iter()
        .map(|provider| provider.ip_prefix_count())
        .sum();
    info!("Crawled {prefixes} IP prefix(es) from {crawled} provider(s)");

    if !report.failed.is_empty() {
        warn!(
            "Failed to crawl {} provider(s): {}",
            report.failed.len(),
            report.failed.join(", ")
        );
    }
}

/*--------------------------------------------------------------------------------------
  Truncation
--------------------------------------------------------------------------------------*/

pub fn truncated(deleted: &[String]) {
    if deleted.is_empty() {
        info!("No outdated network definitions to remove");
    } else {
        info!("Removed {} outdated network definition(s)", deleted.len());
    }
}
