use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use tvchannels_core::compact::compact_source;
use tvchannels_core::config::CatalogConfig;
use tvchannels_core::{Catalog, CatalogError, ChannelsOptions, FsSource};

mod args;
use args::{Cli, Commands};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("no catalog for country '{0}'")]
    UnknownCountry(String),

    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

type CliResult = Result<(), CliError>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "tvchannels=debug"
    } else {
        "tvchannels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult {
    let mut config = match &cli.config {
        Some(path) => CatalogConfig::load_from(path)?,
        None => CatalogConfig::load()?,
    };
    if let Some(dir) = cli.data_dir {
        config.catalog.data_dir = Some(dir);
    }

    let root = config.data_dir();
    tracing::debug!(root = %root.display(), "Using catalog root");
    let catalog = Catalog::new(FsSource::new(root)).with_ceilings(config.ceilings());

    match cli.command {
        Commands::Countries => print_json(&catalog.countries().await?),
        Commands::Channels {
            code,
            fail_on_missing,
        } => {
            let data = catalog
                .channels(&code, ChannelsOptions { fail_on_missing })
                .await?
                .ok_or(CliError::UnknownCountry(code))?;
            print_json(data.as_ref())
        }
        Commands::Search {
            keywords,
            countries,
            categories,
            retransmits,
            limit,
        } => {
            let mut opts = config.search_options();
            opts.countries = non_empty(countries);
            opts.categories = non_empty(categories);
            opts.retransmits = retransmits.into();
            if let Some(limit) = limit {
                opts.limit = limit;
            }
            print_json(&catalog.search(&keywords, &opts).await?)
        }
        Commands::Generate {
            countries,
            categories,
            retransmits,
            main_country_full,
            limit,
            min_per_category,
            free_only,
            fail_on_missing,
        } => {
            let mut opts = config.generate_options();
            opts.countries = countries;
            opts.categories = non_empty(categories);
            opts.retransmits = retransmits.into();
            opts.main_country_full = main_country_full;
            opts.free_only = free_only;
            opts.fail_on_missing = fail_on_missing;
            if let Some(limit) = limit {
                opts.limit = limit;
            }
            if let Some(min) = min_per_category {
                opts.min_per_category = min;
            }
            print_json(&catalog.generate(&opts).await?)
        }
        Commands::Stats => print_json(&catalog.stats().await?),
        Commands::Compact { dry_run } => {
            let reports = compact_source(catalog.source(), dry_run)
                .await
                .map_err(CatalogError::from)?;
            print_json(&reports)
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
