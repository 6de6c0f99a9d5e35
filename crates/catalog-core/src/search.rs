use catalog_config::SearchConfig;
use catalog_models::{Movie, MovieLookup};
use catalog_sources::{CatalogSource, SearchRequest, SourceError};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use crate::debounce::{Debouncer, Generation};

pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    Searching,
    Results,
    Empty,
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    pub term: String,
    pub year: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub input: SearchInput,
    pub status: SearchStatus,
    pub movies: Vec<Movie>,
    pub page: u32,
    /// Heuristic: the last page reached the threshold
    pub has_more: bool,
    pub loading_more: bool,
    /// Input changed since the listed results were fetched; a page-1 search
    /// is scheduled but has not started yet.
    pub input_pending: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            input: SearchInput::default(),
            status: SearchStatus::Idle,
            movies: Vec::new(),
            page: 0,
            has_more: false,
            loading_more: false,
            input_pending: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub default_term: String,
    pub debounce: Duration,
    pub has_more_threshold: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            default_term: config.default_term.clone(),
            debounce: Duration::from_millis(config.debounce_ms),
            has_more_threshold: config.has_more_threshold.max(1),
        }
    }
}

/// Empty or whitespace-only terms fall back to `default_term`.
pub fn effective_term<'a>(term: &'a str, default_term: &'a str) -> &'a str {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        default_term
    } else {
        trimmed
    }
}

/// Keep the successfully looked-up movies whose genre contains `genre`.
/// A missing or blank genre keeps every found movie.
pub fn filter_by_genre(lookups: Vec<MovieLookup>, genre: Option<&str>) -> Vec<Movie> {
    let genre = genre.map(str::trim).filter(|g| !g.is_empty());
    lookups
        .into_iter()
        .filter_map(MovieLookup::into_movie)
        .filter(|movie| genre.map_or(true, |g| movie.matches_genre(g)))
        .collect()
}

struct SearchInner {
    source: Arc<dyn CatalogSource>,
    options: SearchOptions,
    state: watch::Sender<SearchState>,
    generation: Generation,
}

impl SearchInner {
    async fn fetch_page(&self, input: &SearchInput, page: u32) -> Result<Vec<Movie>, SourceError> {
        let term = effective_term(&input.term, &self.options.default_term);
        let request = SearchRequest::new(term)
            .with_year(input.year.clone())
            .with_page(page);

        let hits = self.source.search(&request).await?;
        // The search endpoint has no genre support, so every hit needs its details
        let lookups = join_all(hits.iter().map(|hit| self.source.details(&hit.imdb_id))).await;
        let movies = filter_by_genre(lookups, input.genre.as_deref());

        debug!(
            "Page {} for {:?}: {} hits, {} kept",
            page,
            term,
            hits.len(),
            movies.len()
        );
        Ok(movies)
    }

    async fn run(self: Arc<Self>, page: u32) {
        // Claim the latest generation; anything started earlier is now stale
        let tag = self.generation.advance();
        let append = page > 1;
        let input = self.state.borrow().input.clone();

        // Page 1 replaces the listing, later pages only flag a background load
        self.state.send_modify(|state| {
            if append {
                state.loading_more = true;
            } else {
                state.status = SearchStatus::Searching;
                state.input_pending = false;
            }
        });

        let outcome = self.fetch_page(&input, page).await;

        // A newer search or input change took over while we were fetching
        if !self.generation.is_current(tag) {
            debug!("Discarding stale search result (page {} of {:?})", page, input.term);
            return;
        }

        // No total count from the catalog, so a full page means "maybe more"
        let threshold = self.options.has_more_threshold;
        self.state.send_modify(|state| {
            state.loading_more = false;
            match outcome {
                Ok(movies) => {
                    state.has_more = movies.len() >= threshold;
                    state.page = page;
                    if append {
                        state.movies.extend(movies);
                    } else {
                        state.movies = movies;
                    }
                    state.status = if state.movies.is_empty() {
                        SearchStatus::Empty
                    } else {
                        SearchStatus::Results
                    };
                    info!(
                        "Search {:?} page {}: {} movies listed",
                        state.input.term,
                        page,
                        state.movies.len()
                    );
                }
                Err(e) => {
                    warn!("Search failed: {}", e);
                    state.has_more = false;
                    state.status = SearchStatus::Error(SEARCH_FAILED_MESSAGE.to_string());
                }
            }
        });
    }
}

/// Paginated, filtered, debounced search over a catalog.
///
/// State is published through a watch channel; see [`SearchViewModel::subscribe`].
pub struct SearchViewModel {
    inner: Arc<SearchInner>,
    debouncer: Debouncer,
}

impl SearchViewModel {
    pub fn new(source: Arc<dyn CatalogSource>, options: SearchOptions) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        let debouncer = Debouncer::new(options.debounce);
        Self {
            inner: Arc::new(SearchInner {
                source,
                options,
                state,
                generation: Generation::new(),
            }),
            debouncer,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.inner.options
    }

    pub fn set_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.update_input(|input| input.term = term);
    }

    pub fn set_year(&self, year: Option<String>) {
        self.update_input(|input| input.year = year.filter(|y| !y.trim().is_empty()));
    }

    pub fn set_genre(&self, genre: Option<String>) {
        self.update_input(|input| input.genre = genre.filter(|g| !g.trim().is_empty()));
    }

    /// Apply an input change and schedule a page-1 search after the quiet period.
    fn update_input(&self, change: impl FnOnce(&mut SearchInput)) {
        let changed = self.inner.state.send_if_modified(|state| {
            let before = state.input.clone();
            change(&mut state.input);
            if state.input == before {
                return false;
            }
            // Listed results belong to the previous input until page 1 runs
            state.input_pending = true;
            true
        });
        if !changed {
            return;
        }
        self.debouncer.schedule(self.inner.clone().run(1));
    }

    /// Search page 1 for the current input right away, dropping any pending
    /// debounced search.
    pub async fn search_now(&self) {
        self.debouncer.cancel();
        self.inner.clone().run(1).await;
    }

    /// Fetch and append the next page. Returns `false` when there is nothing
    /// to load (no results yet, no more pages, a load already running, or an
    /// input change still waiting for its first page).
    pub async fn load_more(&self) -> bool {
        let next_page = {
            let state = self.inner.state.borrow();
            if state.status != SearchStatus::Results
                || !state.has_more
                || state.loading_more
                || state.input_pending
            {
                return false;
            }
            state.page + 1
        };

        self.inner.clone().run(next_page).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{movie, FakeCatalog};

    fn view_model(catalog: Arc<FakeCatalog>) -> SearchViewModel {
        SearchViewModel::new(catalog, SearchOptions::default())
    }

    #[test]
    fn test_effective_term() {
        assert_eq!(effective_term("", "action"), "action");
        assert_eq!(effective_term("   ", "action"), "action");
        assert_eq!(effective_term(" alien ", "action"), "alien");
    }

    #[test]
    fn test_genre_filter_excludes_failed_lookups() {
        let lookups = vec![
            MovieLookup::Found(movie("tt1", "One", "Horror")),
            MovieLookup::Found(movie("tt2", "Two", "Action, Horror")),
            MovieLookup::TransportError("timeout".to_string()),
            MovieLookup::Found(movie("tt3", "Three", "Comedy")),
            MovieLookup::NotFound("Incorrect IMDb ID.".to_string()),
        ];

        let kept = filter_by_genre(lookups.clone(), Some("horror"));
        let ids: Vec<_> = kept.iter().map(|m| m.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["tt1", "tt2"]);

        assert_eq!(filter_by_genre(lookups.clone(), None).len(), 3);
        assert_eq!(filter_by_genre(lookups, Some("  ")).len(), 3);
    }

    #[tokio::test]
    async fn test_empty_term_uses_default() {
        let catalog = Arc::new(FakeCatalog::new().with_generated_page("action", "tt", 3, "Action"));
        let vm = view_model(catalog.clone());

        vm.search_now().await;
        vm.set_term("action");
        vm.search_now().await;

        let calls = catalog.search_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert_eq!(calls[0].term, "action");
        assert_eq!(vm.state().movies.len(), 3);
        assert_eq!(vm.state().status, SearchStatus::Results);
    }

    #[tokio::test]
    async fn test_pagination_appends() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_generated_page("movie", "a", 10, "Drama")
                .with_page("movie", &["a0", "a1", "a2"]),
        );
        let vm = view_model(catalog.clone());
        vm.set_term("movie");
        vm.search_now().await;

        let first = vm.state();
        assert_eq!(first.page, 1);
        assert!(first.has_more);

        assert!(vm.load_more().await);
        let second = vm.state();
        assert_eq!(second.page, 2);
        assert_eq!(second.movies.len(), 13);
        assert_eq!(second.movies[..10], first.movies[..]);
        // Duplicates across pages are kept
        assert_eq!(second.movies[10].imdb_id, "a0");
        assert!(!second.has_more);
        assert!(!vm.load_more().await);

        assert_eq!(catalog.search_calls()[1].page, 2);
    }

    #[tokio::test]
    async fn test_input_change_resets_pagination() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_generated_page("movie", "a", 10, "Drama")
                .with_generated_page("movie", "b", 10, "Drama")
                .with_generated_page("other", "c", 2, "Drama"),
        );
        let vm = view_model(catalog.clone());
        vm.set_term("movie");
        vm.search_now().await;
        vm.load_more().await;
        assert_eq!(vm.state().movies.len(), 20);

        vm.set_term("other");
        vm.search_now().await;
        let state = vm.state();
        assert_eq!(state.page, 1);
        assert_eq!(state.movies.len(), 2);
        assert_eq!(catalog.search_calls().last().unwrap().page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_waits_for_pending_input() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_generated_page("movie", "m", 10, "Drama")
                .with_generated_page("other", "o", 10, "Drama")
                .with_generated_page("other", "p", 3, "Drama"),
        );
        let vm = view_model(catalog.clone());
        vm.set_term("movie");
        vm.search_now().await;
        assert!(vm.state().has_more);

        vm.set_term("other");
        assert!(vm.state().input_pending);
        assert!(!vm.load_more().await);

        let state = vm.state();
        assert_eq!(state.page, 1);
        assert!(state.movies.iter().all(|m| m.imdb_id.starts_with('m')));
        assert_eq!(catalog.search_calls().len(), 1);

        // The debounced page-1 search replaces the listing, then paging resumes
        tokio::time::sleep(Duration::from_millis(600)).await;
        let state = vm.state();
        assert!(!state.input_pending);
        assert_eq!(state.input.term, "other");
        assert!(state.movies.iter().all(|m| m.imdb_id.starts_with('o')));

        assert!(vm.load_more().await);
        let calls: Vec<_> = catalog
            .search_calls()
            .into_iter()
            .map(|c| (c.term, c.page))
            .collect();
        assert_eq!(
            calls,
            vec![
                ("movie".to_string(), 1),
                ("other".to_string(), 1),
                ("other".to_string(), 2)
            ]
        );
        assert_eq!(vm.state().movies.len(), 13);
    }

    #[tokio::test]
    async fn test_genre_and_year_filters() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_movie(movie("tt1", "One", "Horror"))
                .with_movie(movie("tt2", "Two", "Action, Horror"))
                .with_movie(movie("tt4", "Four", "Romance"))
                .with_broken_details("tt3")
                .with_page("night", &["tt1", "tt2", "tt3", "tt4"]),
        );
        let vm = view_model(catalog.clone());
        vm.set_term("night");
        vm.set_year(Some("1984".to_string()));
        vm.set_genre(Some("HORROR".to_string()));
        vm.search_now().await;

        let state = vm.state();
        let ids: Vec<_> = state.movies.iter().map(|m| m.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["tt1", "tt2"]);
        assert!(!state.has_more);
        assert_eq!(catalog.search_calls()[0].year.as_deref(), Some("1984"));
        assert_eq!(catalog.detail_calls(), 4);
    }

    #[tokio::test]
    async fn test_no_hits_is_empty_state() {
        let catalog = Arc::new(FakeCatalog::new());
        let vm = view_model(catalog);
        vm.set_term("zzzz");
        vm.search_now().await;
        assert_eq!(vm.state().status, SearchStatus::Empty);
    }

    #[tokio::test]
    async fn test_failure_maps_to_error_state() {
        let catalog = Arc::new(FakeCatalog::new().with_failing_search("broken"));
        let vm = view_model(catalog);
        vm.set_term("broken");
        vm.search_now().await;
        assert_eq!(
            vm.state().status,
            SearchStatus::Error(SEARCH_FAILED_MESSAGE.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_issues_one_search() {
        let catalog = Arc::new(FakeCatalog::new().with_generated_page("abc", "tt", 2, "Drama"));
        let vm = view_model(catalog.clone());
        let updates = vm.subscribe();

        for term in ["a", "ab", "abc"] {
            vm.set_term(term);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(catalog.search_calls().is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let calls = catalog.search_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].term, "abc");

        let state = updates.borrow().clone();
        assert_eq!(state.status, SearchStatus::Results);
        assert_eq!(state.movies.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_input_does_not_search() {
        let catalog = Arc::new(FakeCatalog::new());
        let vm = view_model(catalog.clone());
        vm.set_genre(None);
        vm.set_year(Some("  ".to_string()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(catalog.search_calls().is_empty());
        assert_eq!(vm.state().status, SearchStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_is_discarded() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_generated_page("slow", "s", 4, "Drama")
                .with_generated_page("fast", "f", 2, "Drama")
                .with_delay("slow", Duration::from_secs(2)),
        );
        let vm = Arc::new(view_model(catalog.clone()));

        vm.set_term("slow");
        let first = {
            let vm = vm.clone();
            tokio::spawn(async move { vm.search_now().await })
        };
        while catalog.search_calls().is_empty() {
            tokio::task::yield_now().await;
        }

        vm.set_term("fast");
        vm.search_now().await;
        first.await.unwrap();

        let state = vm.state();
        assert_eq!(state.input.term, "fast");
        let ids: Vec<_> = state.movies.iter().map(|m| m.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["f0", "f1"]);
    }
}
