use serde::{Deserialize, Serialize};

/// Sentinel the remote catalog uses for missing fields, most visibly the poster.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Poster {
    Url(String),
    NotAvailable,
}

impl Poster {
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == NOT_AVAILABLE {
            Poster::NotAvailable
        } else {
            Poster::Url(raw.to_string())
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Poster::Url(url) => Some(url),
            Poster::NotAvailable => None,
        }
    }
}

/// One hit of a catalog search. Carries only what the search endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    pub imdb_id: String,
    pub title: String,
    pub year: String, // Ranges like "2010–2014" show up for series
    pub poster: Poster,
}

/// Full movie record as returned by a detail lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: Poster,
    pub genre: String,
    pub director: String,
    pub actors: Vec<String>,
    pub plot: String,
}

impl Movie {
    /// Case-insensitive substring match against the genre field.
    pub fn matches_genre(&self, genre: &str) -> bool {
        self.genre.to_lowercase().contains(&genre.trim().to_lowercase())
    }

    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            imdb_id: self.imdb_id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            poster: self.poster.clone(),
        }
    }
}
