use catalog_models::Review;
use std::collections::BTreeMap;
use tracing::info;
use crate::store::{SharedStore, StoreError};

/// Key holding the JSON object of identifier -> reviews.
pub const REVIEWS_KEY: &str = "@movie_reviews";

type ReviewMap = BTreeMap<String, Vec<Review>>;

/// Arithmetic mean of the ratings, 0 for no reviews. Not rounded.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    total / reviews.len() as f64
}

/// Append-only review lists per movie, persisted as one mapping.
///
/// Ratings are stored as given; range checks belong to the caller.
#[derive(Clone)]
pub struct ReviewsRepository {
    store: SharedStore,
}

impl ReviewsRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn load_all(&self) -> Result<ReviewMap, StoreError> {
        Ok(self.store.read_json(REVIEWS_KEY).await?.unwrap_or_default())
    }

    pub async fn get_reviews(&self, imdb_id: &str) -> Result<Vec<Review>, StoreError> {
        Ok(self.load_all().await?.remove(imdb_id).unwrap_or_default())
    }

    /// Appends and rewrites the mapping for every movie in one write.
    pub async fn add_review(&self, imdb_id: &str, review: Review) -> Result<(), StoreError> {
        let _guard = self.store.lock(REVIEWS_KEY).await;

        let mut all = self.load_all().await?;
        let reviews = all.entry(imdb_id.to_string()).or_default();
        reviews.push(review);
        let count = reviews.len();

        self.store.write_json(REVIEWS_KEY, &all).await?;
        info!("Saved review for {} ({} total)", imdb_id, count);
        Ok(())
    }

    pub async fn get_average_rating(&self, imdb_id: &str) -> Result<f64, StoreError> {
        Ok(average_rating(&self.get_reviews(imdb_id).await?))
    }

    pub async fn review_count(&self, imdb_id: &str) -> Result<usize, StoreError> {
        Ok(self.get_reviews(imdb_id).await?.len())
    }
}
