use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::RowMarkers;
use crate::domain::models::Episode;

/// A table row that matters for extraction, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Entry { title: String },
    Detail { synopsis: String },
}

/// Classifies the rows of a season page's episode table.
pub struct RowScanner {
    rows: Selector,
    cells: Selector,
    summary: Selector,
    entry_class: String,
    detail_class: String,
    title_cell: usize,
    min_cells: usize,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector `{selector}`: {e:?}"))
}

impl RowScanner {
    pub fn new(markers: &RowMarkers) -> Result<Self> {
        Ok(Self {
            rows: parse_selector(&format!("table.{} tr", markers.table))?,
            cells: parse_selector("td")?,
            summary: parse_selector(&format!("div.{}", markers.summary))?,
            entry_class: markers.entry_row.clone(),
            detail_class: markers.detail_row.clone(),
            title_cell: markers.title_cell,
            min_cells: markers.min_cells,
        })
    }

    pub fn scan(&self, html: &str) -> Vec<Row> {
        let document = Html::parse_document(html);
        let mut rows = Vec::new();

        for row in document.select(&self.rows) {
            if has_class(&row, &self.entry_class) {
                if let Some(title) = self.entry_title(&row) {
                    rows.push(Row::Entry { title });
                }
            }
            if has_class(&row, &self.detail_class) {
                let synopsis: String = row
                    .select(&self.summary)
                    .flat_map(|summary| summary.text())
                    .collect();
                rows.push(Row::Detail {
                    synopsis: synopsis.trim().to_string(),
                });
            }
        }

        rows
    }

    fn entry_title(&self, row: &ElementRef) -> Option<String> {
        let cells: Vec<ElementRef> = row.select(&self.cells).collect();
        if cells.len() < self.min_cells {
            debug!(cells = cells.len(), "skipping entry row with too few cells");
            return None;
        }
        let text: String = cells.get(self.title_cell)?.text().collect();
        Some(clean_title(&text))
    }
}

fn has_class(element: &ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Strips the quotes and whitespace surrounding a title cell's text.
pub fn clean_title(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '"' || c.is_whitespace())
        .to_string()
}

/// The ordered episode list accumulated across all seasons.
///
/// Detail rows carry no key linking them to an entry row; a synopsis always
/// lands on the most recently pushed episode, whichever season it came from.
#[derive(Debug, Default)]
pub struct EpisodeLog {
    episodes: Vec<Episode>,
    season: u64,
    next_episode: u64,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_season(&mut self, season: u64) {
        self.season = season;
        self.next_episode = 1;
    }

    pub fn push_entry(&mut self, title: String) {
        self.episodes.push(Episode {
            season: self.season,
            episode: self.next_episode,
            title,
            description: String::new(),
        });
        self.next_episode += 1;
    }

    pub fn attach_synopsis(&mut self, synopsis: String) {
        match self.episodes.last_mut() {
            Some(episode) => episode.description = synopsis,
            None => debug!(season = self.season, "dropping detail row seen before any entry row"),
        }
    }

    /// Records one season's classified rows, in order.
    pub fn record_season(&mut self, season: u64, rows: Vec<Row>) {
        self.begin_season(season);
        for row in rows {
            match row {
                Row::Entry { title } => self.push_entry(title),
                Row::Detail { synopsis } => self.attach_synopsis(synopsis),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn into_episodes(self) -> Vec<Episode> {
        self.episodes
    }
}
