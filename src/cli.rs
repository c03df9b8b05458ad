use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bugsift",
    version,
    about = "Version-bucketed bug report generator for GitHub issue trackers"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = "bugsift.toml",
        help = "Config file (TOML; a missing file falls back to built-in defaults)"
    )]
    pub config: String,
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Directory holding the JSON hand-off artifacts"
    )]
    pub data_dir: String,
    #[arg(
        long,
        global = true,
        default_value = "reports",
        help = "Directory rendered reports are written to"
    )]
    pub reports_dir: String,
    #[arg(long, global = true, help = "Repository owner (overrides config)")]
    pub owner: Option<String>,
    #[arg(long, global = true, help = "Repository name (overrides config)")]
    pub repo: Option<String>,
    #[arg(long, global = true, help = "Issue label to fetch (overrides config)")]
    pub label: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Product name used for labeled-line matching and report headers (overrides config)"
    )]
    pub product: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline: enrich, group, roll up, and render all reports.
    Run {
        #[arg(
            long,
            default_value_t = false,
            help = "Fetch issues and fixed-in milestones from GitHub before reporting"
        )]
        refresh: bool,
        #[arg(
            long,
            default_value_t = false,
            help = "Ignore the local tag cache and refetch release tags"
        )]
        no_cache: bool,
        #[arg(long, help = "Maximum issue pages to fetch (overrides config)")]
        pages: Option<u32>,
        #[arg(
            long,
            help = "Local repository checkout used to count commits between releases"
        )]
        checkout: Option<String>,
    },
    /// Print the stats summary derived from existing artifacts.
    Stats,
    /// List known release tags, most recent first.
    Tags {
        #[arg(
            long,
            default_value_t = false,
            help = "Ignore the local tag cache and refetch release tags"
        )]
        no_cache: bool,
    },
}
