use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::page_url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to get season {season} from {url}: {source}")]
    Transport {
        season: u64,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("status code error for season {season}: {status}")]
    Status { season: u64, status: StatusCode },
    #[error("failed to read body for season {season}: {source}")]
    Body {
        season: u64,
        #[source]
        source: reqwest::Error,
    },
}

/// Where season pages come from.
pub trait PageSource {
    /// Human-readable location of a season's page, used for progress output.
    fn describe(&self, season: u64) -> String;

    fn fetch_page(&self, season: u64) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    url_template: String,
}

impl HttpFetcher {
    pub fn new(url_template: String) -> Self {
        Self::with_client(Client::new(), url_template)
    }

    pub fn with_client(client: Client, url_template: String) -> Self {
        Self {
            client,
            url_template,
        }
    }
}

impl PageSource for HttpFetcher {
    fn describe(&self, season: u64) -> String {
        page_url(&self.url_template, season)
    }

    fn fetch_page(&self, season: u64) -> Result<String, FetchError> {
        let url = self.describe(season);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Transport {
                season,
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status { season, status });
        }

        response
            .text()
            .map_err(|source| FetchError::Body { season, source })
    }
}
