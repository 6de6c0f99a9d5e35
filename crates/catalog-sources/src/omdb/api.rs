use catalog_models::{Movie, MovieLookup, MovieSummary, Poster, NOT_AVAILABLE};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use crate::error::SourceError;
use crate::traits::SearchRequest;

const RESPONSE_TRUE: &str = "True";
const DEFAULT_NOT_FOUND: &str = "Movie not found!";

#[derive(Debug, Deserialize)]
struct OmdbEnvelope {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<serde_json::Value>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct OmdbMovie {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Plot", default)]
    plot: String,
}

impl From<OmdbSearchItem> for MovieSummary {
    fn from(item: OmdbSearchItem) -> Self {
        MovieSummary {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: Poster::from_raw(&item.poster),
        }
    }
}

impl From<OmdbMovie> for Movie {
    fn from(movie: OmdbMovie) -> Self {
        Movie {
            imdb_id: movie.imdb_id,
            title: movie.title,
            year: movie.year,
            poster: Poster::from_raw(&movie.poster),
            genre: movie.genre,
            director: movie.director,
            actors: split_actors(&movie.actors),
            plot: movie.plot,
        }
    }
}

/// "A, B, C" -> ["A", "B", "C"]; the "N/A" sentinel yields no actors
fn split_actors(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NOT_AVAILABLE {
        return Vec::new();
    }
    raw.split(',')
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
        .collect()
}

fn is_success(body: &serde_json::Value) -> Result<bool, String> {
    let envelope: OmdbEnvelope = serde_json::from_value(body.clone())
        .map_err(|e| format!("unexpected response shape: {}", e))?;
    if envelope.response == RESPONSE_TRUE {
        Ok(true)
    } else {
        debug!(
            "Catalog reported failure: {}",
            envelope.error.as_deref().unwrap_or("no error message")
        );
        Ok(false)
    }
}

/// Map a decoded search response to its hits.
///
/// A "False" status, a missing `Search` list and individually malformed hits
/// all degrade to fewer (or zero) results.
pub fn parse_search_response(body: &serde_json::Value) -> Vec<MovieSummary> {
    match is_success(body) {
        Ok(true) => {}
        Ok(false) => return Vec::new(),
        Err(e) => {
            warn!("Ignoring search response: {}", e);
            return Vec::new();
        }
    }

    let response: OmdbSearchResponse = match serde_json::from_value(body.clone()) {
        Ok(response) => response,
        Err(e) => {
            warn!("Ignoring search response without a usable Search list: {}", e);
            return Vec::new();
        }
    };

    debug!(
        "Search returned {} hits (total reported: {})",
        response.search.len(),
        response.total_results.as_deref().unwrap_or("?")
    );

    response
        .search
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<OmdbSearchItem>(raw) {
            Ok(item) => Some(MovieSummary::from(item)),
            Err(e) => {
                warn!("Skipping malformed search hit: {}", e);
                None
            }
        })
        .collect()
}

/// Map a decoded detail response to a lookup outcome.
pub fn parse_details_response(body: &serde_json::Value) -> MovieLookup {
    let envelope: OmdbEnvelope = match serde_json::from_value(body.clone()) {
        Ok(envelope) => envelope,
        Err(e) => return MovieLookup::TransportError(format!("unexpected response shape: {}", e)),
    };

    if envelope.response != RESPONSE_TRUE {
        return MovieLookup::NotFound(
            envelope.error.unwrap_or_else(|| DEFAULT_NOT_FOUND.to_string()),
        );
    }

    match serde_json::from_value::<OmdbMovie>(body.clone()) {
        Ok(movie) => MovieLookup::Found(movie.into()),
        Err(e) => MovieLookup::TransportError(format!("malformed movie record: {}", e)),
    }
}

/// Search hits from a raw response body. A body that is not JSON at all is
/// treated like any other malformed response: no hits.
pub fn parse_search_body(text: &str) -> Vec<MovieSummary> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(body) => parse_search_response(&body),
        Err(e) => {
            warn!("Ignoring search response that is not JSON: {}", e);
            Vec::new()
        }
    }
}

/// Body of a successful response; non-2xx statuses are errors.
async fn get_text(
    client: &Client,
    base_url: &str,
    params: &[(&str, String)],
) -> Result<String, SourceError> {
    let response = client.get(base_url).query(params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.text().await?)
}

async fn get_json(
    client: &Client,
    base_url: &str,
    params: &[(&str, String)],
) -> Result<serde_json::Value, SourceError> {
    let text = get_text(client, base_url, params).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Search titles (`s`, optional `y`, `page`)
pub async fn search_movies(
    client: &Client,
    base_url: &str,
    api_key: &str,
    request: &SearchRequest,
) -> Result<Vec<MovieSummary>, SourceError> {
    let mut params = vec![
        ("apikey", api_key.to_string()),
        ("s", request.term.clone()),
        ("page", request.page.max(1).to_string()),
    ];
    if let Some(year) = &request.year {
        params.push(("y", year.clone()));
    }

    debug!("Searching catalog: term={:?} year={:?} page={}", request.term, request.year, request.page);
    // Transport and HTTP status failures propagate, anything after that degrades to no hits
    let text = get_text(client, base_url, &params).await?;
    Ok(parse_search_body(&text))
}

/// Fetch a full record by identifier (`i`)
pub async fn get_movie_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> MovieLookup {
    let params = [
        ("apikey", api_key.to_string()),
        ("i", imdb_id.to_string()),
        ("plot", "short".to_string()),
    ];

    match get_json(client, base_url, &params).await {
        Ok(body) => parse_details_response(&body),
        Err(e) => {
            warn!("Detail lookup for {} failed: {}", imdb_id, e);
            MovieLookup::TransportError(e.to_string())
        }
    }
}
