use anyhow::Result;
use std::ops::RangeInclusive;
use tracing::{debug, info};

use crate::config::ScrapeConfig;
use crate::domain::models::Episode;
use crate::infra::fetch::{HttpFetcher, PageSource};
use crate::infra::output;
use crate::workflows::extract::{EpisodeLog, RowScanner};

/// Fetches and scans every season in order. The first failure aborts the run.
pub fn scrape_seasons(
    source: &dyn PageSource,
    scanner: &RowScanner,
    seasons: RangeInclusive<u64>,
) -> Result<Vec<Episode>> {
    let mut log = EpisodeLog::new();

    for season in seasons {
        println!("Scraping Season {season}: {}", source.describe(season));

        let html = source.fetch_page(season)?;
        let rows = scanner.scan(&html);
        debug!(season, rows = rows.len(), "classified rows");

        let before = log.len();
        log.record_season(season, rows);
        debug!(season, episodes = log.len() - before, "recorded season");
    }

    Ok(log.into_episodes())
}

pub fn run(config: &ScrapeConfig) -> Result<()> {
    let fetcher = HttpFetcher::new(config.url_template.clone());
    let scanner = RowScanner::new(&config.markers)?;

    let episodes = scrape_seasons(&fetcher, &scanner, config.seasons())?;

    output::write_episodes(&config.output, &episodes)?;
    info!(path = %config.output.display(), count = episodes.len(), "wrote episodes");
    println!(
        "Data written to {} ({} episodes)",
        config.output.display(),
        episodes.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RowMarkers;
    use crate::infra::fetch::FetchError;
    use reqwest::StatusCode;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Serves canned pages; seasons without a page answer 404.
    struct StaticPages {
        pages: HashMap<u64, String>,
        requested: RefCell<Vec<u64>>,
    }

    impl StaticPages {
        fn new(pages: &[(u64, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(season, html)| (*season, html.to_string()))
                    .collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for StaticPages {
        fn describe(&self, season: u64) -> String {
            format!("memory://season/{season}")
        }

        fn fetch_page(&self, season: u64) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(season);
            self.pages
                .get(&season)
                .cloned()
                .ok_or(FetchError::Status {
                    season,
                    status: StatusCode::NOT_FOUND,
                })
        }
    }

    const SEASON_ONE: &str = r#"<table class="wikiepisodetable">
        <tr><th>No.</th><th>Title</th><th>Directed by</th></tr>
        <tr class="vevent"><th>1</th><td>1</td><td>"The Seinfeld Chronicles"</td><td>Art Wolff</td></tr>
        <tr class="expand-child"><td><div class="shortSummaryText"> Jerry meets a woman. </div></td></tr>
        <tr class="vevent"><th>2</th><td>2</td><td>"The Stake Out"</td><td>Tom Cherones</td></tr>
        <tr class="expand-child"><td><div class="shortSummaryText">Elaine sets Jerry up.</div></td></tr>
    </table>"#;

    const SEASON_TWO: &str = r#"<table class="wikiepisodetable">
        <tr class="vevent"><th>6</th><td>1</td><td>"The Ex-Girlfriend"</td><td>Tom Cherones</td></tr>
        <tr class="vevent"><th>7</th><td>2</td><td>"The Pony Remark"</td><td>Tom Cherones</td></tr>
        <tr class="expand-child"><td><div class="shortSummaryText">Jerry insults a relative.</div></td></tr>
    </table>"#;

    fn scanner() -> RowScanner {
        RowScanner::new(&RowMarkers::default()).unwrap()
    }

    #[test]
    fn test_scrape_seasons_accumulates_in_order() {
        let source = StaticPages::new(&[(1, SEASON_ONE), (2, SEASON_TWO)]);

        let episodes = scrape_seasons(&source, &scanner(), 1..=2).unwrap();

        let summary: Vec<(u64, u64, &str, &str)> = episodes
            .iter()
            .map(|e| {
                (
                    e.season,
                    e.episode,
                    e.title.as_str(),
                    e.description.as_str(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, 1, "The Seinfeld Chronicles", "Jerry meets a woman."),
                (1, 2, "The Stake Out", "Elaine sets Jerry up."),
                (2, 1, "The Ex-Girlfriend", ""),
                (2, 2, "The Pony Remark", "Jerry insults a relative."),
            ]
        );
    }

    #[test]
    fn test_scrape_seasons_stops_at_first_failure() {
        let source = StaticPages::new(&[(1, SEASON_ONE), (3, SEASON_TWO)]);

        let err = scrape_seasons(&source, &scanner(), 1..=3).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Status { season: 2, .. })
        ));
        assert_eq!(*source.requested.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_failed_season_writes_no_output() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("episodes.json");
        let source = StaticPages::new(&[(1, SEASON_ONE)]);

        let result = scrape_seasons(&source, &scanner(), 1..=2)
            .and_then(|episodes| output::write_episodes(&output_path, &episodes));

        assert!(result.is_err());
        assert!(!output_path.exists());
    }

    #[test]
    fn test_output_length_matches_entry_rows() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("episodes.json");
        let source = StaticPages::new(&[(1, SEASON_ONE), (2, SEASON_TWO)]);

        let episodes = scrape_seasons(&source, &scanner(), 1..=2).unwrap();
        output::write_episodes(&output_path, &episodes).unwrap();

        let written = output::read_episodes(&output_path).unwrap();
        assert_eq!(written.len(), 4);
        assert_eq!(written, episodes);
    }

    #[test]
    fn test_run_against_unreachable_host_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let config = ScrapeConfig {
            url_template: format!("http://{addr}/season_{{season}}"),
            first_season: 1,
            last_season: 1,
            output: temp_dir.path().join("episodes.json"),
            ..ScrapeConfig::default()
        };

        assert!(run(&config).is_err());
        assert!(!config.output.exists());
    }
}
