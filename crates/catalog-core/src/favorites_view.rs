use catalog_models::{Movie, MovieLookup};
use catalog_sources::CatalogSource;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use crate::debounce::Generation;
use crate::favorites::FavoritesRepository;

pub const FAVORITES_FAILED_MESSAGE: &str = "Could not load your favorites. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesState {
    Idle,
    Loading,
    Loaded(Vec<Movie>),
    Empty,
    Error(String),
}

/// Favorited identifiers resolved to full records.
///
/// Identifiers the catalog no longer resolves are left out of the listing but
/// stay in storage.
pub struct FavoritesViewModel {
    source: Arc<dyn CatalogSource>,
    favorites: FavoritesRepository,
    state: watch::Sender<FavoritesState>,
    generation: Generation,
}

impl FavoritesViewModel {
    pub fn new(source: Arc<dyn CatalogSource>, favorites: FavoritesRepository) -> Self {
        let (state, _) = watch::channel(FavoritesState::Idle);
        Self {
            source,
            favorites,
            state,
            generation: Generation::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FavoritesState {
        self.state.borrow().clone()
    }

    pub async fn refresh(&self) {
        let tag = self.generation.advance();
        self.state.send_replace(FavoritesState::Loading);

        let next = match self.favorites.list_favorites().await {
            Ok(ids) => {
                let lookups = join_all(ids.iter().map(|id| self.source.details(id))).await;
                let total = lookups.len();
                let movies: Vec<Movie> = lookups
                    .into_iter()
                    .filter_map(MovieLookup::into_movie)
                    .collect();

                if movies.len() < total {
                    debug!("{} favorites could not be resolved", total - movies.len());
                }
                info!("Listed {} favorites", movies.len());

                if movies.is_empty() {
                    FavoritesState::Empty
                } else {
                    FavoritesState::Loaded(movies)
                }
            }
            Err(e) => {
                warn!("Could not read favorites: {}", e);
                FavoritesState::Error(FAVORITES_FAILED_MESSAGE.to_string())
            }
        };

        if !self.generation.is_current(tag) {
            debug!("Discarding stale favorites listing");
            return;
        }
        self.state.send_replace(next);
    }
}
