use tracing::{debug, info};
use crate::store::{SharedStore, StoreError};

/// Key holding the JSON array of favorited identifiers.
pub const FAVORITES_KEY: &str = "@favorite_movies";

/// Set of favorited movie identifiers, persisted as one list.
///
/// Every call reads the persisted list again; there is no in-memory copy.
/// Mutations hold the key's lock for the full read-modify-write.
#[derive(Clone)]
pub struct FavoritesRepository {
    store: SharedStore,
}

impl FavoritesRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_favorites(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.store.read_json(FAVORITES_KEY).await?.unwrap_or_default())
    }

    pub async fn is_favorite(&self, imdb_id: &str) -> Result<bool, StoreError> {
        Ok(self.list_favorites().await?.iter().any(|id| id == imdb_id))
    }

    /// Returns `false` (and writes nothing) when `imdb_id` was already present.
    pub async fn add_favorite(&self, imdb_id: &str) -> Result<bool, StoreError> {
        let _guard = self.store.lock(FAVORITES_KEY).await;

        let mut favorites = self.list_favorites().await?;
        if favorites.iter().any(|id| id == imdb_id) {
            debug!("{} is already a favorite", imdb_id);
            return Ok(false);
        }

        favorites.push(imdb_id.to_string());
        self.store.write_json(FAVORITES_KEY, &favorites).await?;
        info!("Added {} to favorites ({} total)", imdb_id, favorites.len());
        Ok(true)
    }

    /// Always rewrites the list, even when `imdb_id` was absent.
    pub async fn remove_favorite(&self, imdb_id: &str) -> Result<(), StoreError> {
        let _guard = self.store.lock(FAVORITES_KEY).await;

        let favorites = self.list_favorites().await?;
        let before = favorites.len();
        let updated: Vec<String> = favorites.into_iter().filter(|id| id != imdb_id).collect();
        self.store.write_json(FAVORITES_KEY, &updated).await?;

        if updated.len() < before {
            info!("Removed {} from favorites ({} left)", imdb_id, updated.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InstrumentedStore;
    use std::sync::Arc;

    fn repo_with_store() -> (FavoritesRepository, Arc<InstrumentedStore>) {
        let store = Arc::new(InstrumentedStore::new());
        let repo = FavoritesRepository::new(SharedStore::from_arc(store.clone()));
        (repo, store)
    }

    #[tokio::test]
    async fn test_empty_store_has_no_favorites() {
        let (repo, store) = repo_with_store();
        assert!(repo.list_favorites().await.unwrap().is_empty());
        assert!(!repo.is_favorite("tt001").await.unwrap());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_add_then_remove() {
        let (repo, _) = repo_with_store();

        assert!(repo.add_favorite("tt001").await.unwrap());
        assert!(repo.is_favorite("tt001").await.unwrap());

        repo.remove_favorite("tt001").await.unwrap();
        assert!(!repo.is_favorite("tt001").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (repo, store) = repo_with_store();

        assert!(repo.add_favorite("tt001").await.unwrap());
        assert!(!repo.add_favorite("tt001").await.unwrap());

        assert_eq!(repo.list_favorites().await.unwrap(), vec!["tt001".to_string()]);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_insertion_order_is_kept() {
        let (repo, _) = repo_with_store();
        for id in ["tt003", "tt001", "tt002"] {
            repo.add_favorite(id).await.unwrap();
        }
        assert_eq!(repo.list_favorites().await.unwrap(), vec!["tt003", "tt001", "tt002"]);
    }

    #[tokio::test]
    async fn test_remove_absent_still_writes() {
        let (repo, store) = repo_with_store();
        repo.add_favorite("tt001").await.unwrap();

        repo.remove_favorite("tt999").await.unwrap();
        assert_eq!(store.writes(), 2);
        assert_eq!(repo.list_favorites().await.unwrap(), vec!["tt001".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let (repo, _) = repo_with_store();
        // A second repository over a clone of the same handle shares the locks
        let other = repo.clone();

        let adds = (0..20).map(|n| {
            let repo = if n % 2 == 0 { repo.clone() } else { other.clone() };
            async move { repo.add_favorite(&format!("tt{:03}", n)).await }
        });
        for result in futures::future::join_all(adds).await {
            result.unwrap();
        }

        let favorites = repo.list_favorites().await.unwrap();
        assert_eq!(favorites.len(), 20);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let (repo, store) = repo_with_store();
        store.set_failing(true);

        let err = repo.add_favorite("tt001").await.unwrap_err();
        assert!(err.is_retryable());

        store.set_failing(false);
        assert!(repo.list_favorites().await.unwrap().is_empty());
    }
}
