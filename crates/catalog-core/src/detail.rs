use catalog_models::{Movie, MovieLookup, Review, MAX_RATING, MIN_RATING};
use catalog_sources::CatalogSource;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use crate::debounce::Generation;
use crate::favorites::FavoritesRepository;
use crate::reviews::{average_rating, ReviewsRepository};
use crate::store::StoreError;

pub const DETAILS_NOT_FOUND_MESSAGE: &str = "Movie details not found.";
pub const DETAILS_FAILED_MESSAGE: &str = "Could not load movie details. Please try again later.";
pub const STORAGE_FAILED_MESSAGE: &str = "Could not read your saved favorites and reviews. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub movie: Movie,
    pub is_favorite: bool,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Idle,
    Loading { imdb_id: String },
    Loaded(MovieDetail),
    Error(String),
}

impl DetailState {
    pub fn detail(&self) -> Option<&MovieDetail> {
        match self {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReviewRejection {
    #[error("a name is required")]
    MissingName,
    #[error("a message is required")]
    MissingMessage,
    #[error("select a rating between 1 and 5 stars (got {0})")]
    RatingOutOfRange(u8),
}

/// Review as entered in the form, before it is stamped and stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub name: String,
    pub message: String,
    pub rating: u8, // 0 = no star selected
}

impl ReviewDraft {
    pub fn new(name: impl Into<String>, message: impl Into<String>, rating: u8) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            rating,
        }
    }

    pub fn validate(&self) -> Result<(), ReviewRejection> {
        if self.name.trim().is_empty() {
            return Err(ReviewRejection::MissingName);
        }
        if self.message.trim().is_empty() {
            return Err(ReviewRejection::MissingMessage);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewRejection::RatingOutOfRange(self.rating));
        }
        Ok(())
    }

    fn into_review(self) -> Review {
        Review {
            name: self.name.trim().to_string(),
            message: self.message.trim().to_string(),
            rating: self.rating,
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("invalid review: {0}")]
    InvalidReview(#[from] ReviewRejection),

    #[error("no movie is loaded")]
    NotLoaded,

    #[error("saving failed, please retry: {0}")]
    Storage(#[from] StoreError),
}

/// One movie's record joined with its favorite flag and reviews.
pub struct DetailViewModel {
    source: Arc<dyn CatalogSource>,
    favorites: FavoritesRepository,
    reviews: ReviewsRepository,
    state: watch::Sender<DetailState>,
    generation: Generation,
}

impl DetailViewModel {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        favorites: FavoritesRepository,
        reviews: ReviewsRepository,
    ) -> Self {
        let (state, _) = watch::channel(DetailState::Idle);
        Self {
            source,
            favorites,
            reviews,
            state,
            generation: Generation::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    fn loaded_id(&self) -> Result<String, DetailError> {
        self.state
            .borrow()
            .detail()
            .map(|detail| detail.movie.imdb_id.clone())
            .ok_or(DetailError::NotLoaded)
    }

    /// Fetch the record, favorite flag and reviews together. The state leaves
    /// `Loading` only once all three are in.
    pub async fn load(&self, imdb_id: &str) {
        let tag = self.generation.advance();
        self.state.send_replace(DetailState::Loading {
            imdb_id: imdb_id.to_string(),
        });

        let (lookup, is_favorite, reviews) = tokio::join!(
            self.source.details(imdb_id),
            self.favorites.is_favorite(imdb_id),
            self.reviews.get_reviews(imdb_id),
        );

        if !self.generation.is_current(tag) {
            debug!("Discarding stale details for {}", imdb_id);
            return;
        }

        let next = match lookup {
            MovieLookup::Found(movie) => match (is_favorite, reviews) {
                (Ok(is_favorite), Ok(reviews)) => {
                    info!("Loaded {} ({} reviews)", movie.imdb_id, reviews.len());
                    DetailState::Loaded(MovieDetail {
                        average_rating: average_rating(&reviews),
                        movie,
                        is_favorite,
                        reviews,
                    })
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Could not read local data for {}: {}", imdb_id, e);
                    DetailState::Error(STORAGE_FAILED_MESSAGE.to_string())
                }
            },
            MovieLookup::NotFound(reason) => {
                debug!("{} not found: {}", imdb_id, reason);
                DetailState::Error(DETAILS_NOT_FOUND_MESSAGE.to_string())
            }
            MovieLookup::TransportError(reason) => {
                warn!("Detail lookup for {} failed: {}", imdb_id, reason);
                DetailState::Error(DETAILS_FAILED_MESSAGE.to_string())
            }
        };
        self.state.send_replace(next);
    }

    /// Validate and store a review, then refresh the list from storage.
    ///
    /// Invalid drafts are rejected before any storage call.
    pub async fn submit_review(&self, draft: ReviewDraft) -> Result<(), DetailError> {
        draft.validate()?;
        let imdb_id = self.loaded_id()?;

        self.reviews.add_review(&imdb_id, draft.into_review()).await?;
        let reviews = self.reviews.get_reviews(&imdb_id).await?;

        self.state.send_if_modified(|state| match state {
            DetailState::Loaded(detail) if detail.movie.imdb_id == imdb_id => {
                detail.average_rating = average_rating(&reviews);
                detail.reviews = reviews;
                true
            }
            _ => false,
        });
        Ok(())
    }

    /// Flip the favorite flag. Returns the new flag.
    ///
    /// The local flag is set from the action taken, not read back from storage.
    pub async fn toggle_favorite(&self) -> Result<bool, DetailError> {
        let imdb_id = self.loaded_id()?;

        let was_favorite = self.favorites.is_favorite(&imdb_id).await?;
        if was_favorite {
            self.favorites.remove_favorite(&imdb_id).await?;
        } else {
            self.favorites.add_favorite(&imdb_id).await?;
        }
        let now_favorite = !was_favorite;

        self.state.send_if_modified(|state| match state {
            DetailState::Loaded(detail) if detail.movie.imdb_id == imdb_id => {
                detail.is_favorite = now_favorite;
                true
            }
            _ => false,
        });
        Ok(now_favorite)
    }
}
