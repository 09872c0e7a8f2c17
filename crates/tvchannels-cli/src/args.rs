use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tvchannels_core::RetransmitFilter;

#[derive(Parser)]
#[command(name = "tvchannels")]
#[command(about = "Per-country TV channel catalogs: search and lineup generation")]
#[command(version)]
pub struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Catalog root holding the channels/ directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Retransmits {
    #[default]
    All,
    Parents,
    Affiliates,
}

impl From<Retransmits> for RetransmitFilter {
    fn from(value: Retransmits) -> Self {
        match value {
            Retransmits::All => RetransmitFilter::All,
            Retransmits::Parents => RetransmitFilter::Parents,
            Retransmits::Affiliates => RetransmitFilter::Affiliates,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the country codes the catalog knows about
    Countries,

    /// Print one country's normalized catalog
    Channels {
        /// Country code (e.g. br, us)
        code: String,

        /// Fail when the country has no channel file
        #[arg(long)]
        fail_on_missing: bool,
    },

    /// Search channels by keyword
    Search {
        /// Text matched against name and keywords
        keywords: String,

        /// Restrict to these countries (repeatable)
        #[arg(short, long = "country")]
        countries: Vec<String>,

        /// Restrict to these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Which channels to keep by retransmission status
        #[arg(long, value_enum, default_value_t)]
        retransmits: Retransmits,

        /// Maximum results (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Build a channel lineup across countries
    Generate {
        /// Countries in preference order; the first is the main country
        #[arg(short, long = "country", required = true)]
        countries: Vec<String>,

        /// Restrict to these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Which channels to keep by retransmission status
        #[arg(long, value_enum, default_value_t)]
        retransmits: Retransmits,

        /// Take every eligible channel of the main country
        #[arg(long)]
        main_country_full: bool,

        /// Maximum lineup size (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Channels to aim for per category (default from config)
        #[arg(long)]
        min_per_category: Option<usize>,

        /// Only free-to-air channels
        #[arg(long)]
        free_only: bool,

        /// Fail when a requested country has no channel file
        #[arg(long)]
        fail_on_missing: bool,
    },

    /// Channel counts per country
    Stats,

    /// Strip stored fields that normalization would fill in anyway
    Compact {
        /// Report without writing files
        #[arg(long)]
        dry_run: bool,
    },
}
