use std::fmt;

use serde::Deserialize;

/// One movie entry as stored in `data_entries`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub title: String,
    pub rating: String,
    pub reference_url: String,
}

/// An element of the source payload.
#[derive(Clone, Debug, Deserialize)]
pub struct SourceItem {
    pub id: i64,
    pub movie: String,
    pub rating: Rating,
    pub imdb_url: String,
}

/// The source sends ratings either as numbers or as strings.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Number(n) => write!(f, "{n}"),
            Rating::Text(s) => f.write_str(s),
        }
    }
}

impl From<SourceItem> for Record {
    fn from(item: SourceItem) -> Self {
        Self {
            id: item.id,
            rating: item.rating.to_string(),
            title: item.movie,
            reference_url: item.imdb_url,
        }
    }
}
