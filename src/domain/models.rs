use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Episode {
    pub season: u64,
    pub episode: u64,
    pub title: String,
    pub description: String,
}
