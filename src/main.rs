mod cli;

use clap::Parser;
use cloudipranges::{crawl_all, crawlers, Client, LocalObjectStore, Publisher, Strictness};
use log::error;
use std::process::ExitCode;

/*-------------------------------------------------------------------------------------------------
  Main CLI Function
-------------------------------------------------------------------------------------------------*/

fn main() -> ExitCode {
    let args = cli::Args::parse();

    // Initialize logging
    if let Err(error) = stderrlog::new()
        .module(module_path!())
        .module("cloudipranges")
        .verbosity(args.verbose.log_level_filter())
        .init()
    {
        eprintln!("Failed to initialize logging: {error}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("External network crawler failed: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &cli::Args) -> cloudipranges::Result<()> {
    let crawlers = crawlers::get(&args.skipped_providers);
    cli::log::crawl_plan(&crawlers, args.dry_run);

    let strictness = if args.lenient {
        Strictness::Lenient
    } else {
        Strictness::Strict
    };
    let report = crawl_all(&crawlers, &Client::new(), strictness)?;
    cli::log::crawl_report(&report);
    cli::output::provider_table(&report.sources);

    let store = match &args.storage_root {
        Some(root) => LocalObjectStore::new(root),
        None => LocalObjectStore::default(),
    };
    let publisher = Publisher::new(&store, args.bucket_name.as_str())
        .dry_run(args.dry_run)
        .max_definitions(args.max_definitions);

    let snapshot = publisher.publish(&report)?;
    cli::output::snapshot_summary(
        publisher.bucket(),
        &store.bucket_path(publisher.bucket()),
        &snapshot,
        args.dry_run,
    );

    // Keep the number of snapshots in the bucket under the limit
    let deleted = publisher.truncate_outdated()?;
    cli::log::truncated(&deleted);

    report.ensure_complete()
}
