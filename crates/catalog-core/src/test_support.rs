//! In-crate doubles for the catalog and the key-value store.

use async_trait::async_trait;
use catalog_models::{Movie, MovieLookup, MovieSummary, Poster};
use catalog_sources::{CatalogSource, SearchRequest, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use crate::store::{KeyValueStore, MemoryStore, StoreError};

pub fn movie(imdb_id: &str, title: &str, genre: &str) -> Movie {
    Movie {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2001".to_string(),
        poster: Poster::NotAvailable,
        genre: genre.to_string(),
        director: "Director".to_string(),
        actors: vec!["Actor One".to_string()],
        plot: "Plot".to_string(),
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    movies: HashMap<String, Movie>,
    pages: HashMap<String, Vec<Vec<String>>>,
    broken_details: HashSet<String>,
    failing_terms: HashSet<String>,
    delays: HashMap<String, Duration>,
    search_calls: Mutex<Vec<SearchRequest>>,
    detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movie(mut self, movie: Movie) -> Self {
        self.movies.insert(movie.imdb_id.clone(), movie);
        self
    }

    /// Append a page of hits for `term`. Ids without a registered movie
    /// resolve to `NotFound` on detail lookup.
    pub fn with_page(mut self, term: &str, ids: &[&str]) -> Self {
        self.pages
            .entry(term.to_string())
            .or_default()
            .push(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    /// Register `count` movies `{prefix}{n}` of `genre` as one page for `term`.
    pub fn with_generated_page(mut self, term: &str, prefix: &str, count: usize, genre: &str) -> Self {
        let ids: Vec<String> = (0..count).map(|n| format!("{}{}", prefix, n)).collect();
        for id in &ids {
            self.movies.insert(id.clone(), movie(id, &format!("Title {}", id), genre));
        }
        self.pages.entry(term.to_string()).or_default().push(ids);
        self
    }

    pub fn with_broken_details(mut self, imdb_id: &str) -> Self {
        self.broken_details.insert(imdb_id.to_string());
        self
    }

    pub fn with_failing_search(mut self, term: &str) -> Self {
        self.failing_terms.insert(term.to_string());
        self
    }

    /// Slow down searches for `key` as a term and detail lookups for `key`
    /// as an identifier.
    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn search_calls(&self) -> Vec<SearchRequest> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<MovieSummary>, SourceError> {
        self.search_calls.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delays.get(&request.term) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_terms.contains(&request.term) {
            return Err(SourceError::Status { status: 503, body: "unavailable".to_string() });
        }

        let index = request.page.saturating_sub(1) as usize;
        let ids = self
            .pages
            .get(&request.term)
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default();

        Ok(ids
            .into_iter()
            .map(|id| match self.movies.get(&id) {
                Some(movie) => movie.summary(),
                None => MovieSummary {
                    imdb_id: id.clone(),
                    title: id,
                    year: "2001".to_string(),
                    poster: Poster::NotAvailable,
                },
            })
            .collect())
    }

    async fn details(&self, imdb_id: &str) -> MovieLookup {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(imdb_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.broken_details.contains(imdb_id) {
            return MovieLookup::TransportError("connection reset".to_string());
        }
        match self.movies.get(imdb_id) {
            Some(movie) => MovieLookup::Found(movie.clone()),
            None => MovieLookup::NotFound("Incorrect IMDb ID.".to_string()),
        }
    }
}

/// Counts writes and yields between every step so unlocked
/// read-modify-write cycles would interleave.
#[derive(Default)]
pub struct InstrumentedStore {
    inner: MemoryStore,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InstrumentedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        tokio::task::yield_now().await;
        self.check(key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.check(key)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}
