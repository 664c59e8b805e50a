use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "episode-scraper")]
#[command(about = "Scrape per-season episode tables into a JSON episode list")]
pub struct Cli {
    /// Path to a TOML config file (defaults to $XDG_CONFIG_HOME/episode-scraper/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where to write the JSON output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// First season to scrape
    #[arg(long)]
    pub first_season: Option<u64>,

    /// Last season to scrape (inclusive)
    #[arg(long)]
    pub last_season: Option<u64>,

    /// Page URL template; `{season}` is replaced by the season number
    #[arg(long)]
    pub url_template: Option<String>,

    /// Log extraction details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
