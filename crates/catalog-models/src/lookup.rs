use serde::{Deserialize, Serialize};
use crate::movie::Movie;

/// Outcome of a single detail lookup against the remote catalog.
///
/// The catalog reports "not found" inside a well-formed response, so that case
/// is kept apart from transport and decoding failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MovieLookup {
    Found(Movie),
    NotFound(String),
    TransportError(String),
}

impl MovieLookup {
    pub fn into_movie(self) -> Option<Movie> {
        match self {
            MovieLookup::Found(movie) => Some(movie),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MovieLookup::Found(_))
    }
}
