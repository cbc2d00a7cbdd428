use clap::Parser;
use cloudipranges::crawlers::Provider;
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Crawl cloud provider IP ranges and publish them as a snapshot.",
    long_about = None
)]
pub struct Args {
    /// Bucket to publish the external networks to
    #[arg(long)]
    pub bucket_name: String,

    /// Crawl and validate, but skip uploading and truncating
    #[arg(long)]
    pub dry_run: bool,

    /// Comma separated list of providers to skip (google, amazon, azure, cloudflare, oracle)
    #[arg(long, value_delimiter = ',', value_parser = parse_provider)]
    pub skipped_providers: Vec<Provider>,

    /// Publish the providers that crawled successfully even if others fail
    #[arg(long)]
    pub lenient: bool,

    /// Directory holding the buckets [env: CLOUDIPRANGES_STORAGE_ROOT]
    #[arg(long)]
    pub storage_root: Option<PathBuf>,

    /// Number of snapshots to keep in the bucket
    #[arg(long, default_value_t = cloudipranges::config::MAX_NUM_DEFINITIONS)]
    pub max_definitions: usize,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

fn parse_provider(value: &str) -> Result<Provider, String> {
    value.parse().map_err(|error: cloudipranges::Error| error.to_string())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
