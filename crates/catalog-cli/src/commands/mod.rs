pub mod config;
pub mod details;
pub mod favorites;
pub mod review;
pub mod search;

use catalog_config::{Config, PathManager};
use catalog_core::{FavoritesRepository, FileStore, ReviewsRepository, SharedStore};
use catalog_models::{Movie, Review};
use catalog_sources::{CatalogSource, OmdbClient};
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs: loaded config, resolved paths and the shared store.
pub struct AppContext {
    pub config: Config,
    pub paths: PathManager,
    pub config_file: PathBuf,
    store: SharedStore,
}

impl AppContext {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let paths = PathManager::default();
        let config_file = config_override.unwrap_or_else(|| paths.config_file());
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        let store_dir = resolve_store_dir(&config, &paths);

        Ok(Self {
            config,
            paths,
            config_file,
            store: SharedStore::new(FileStore::new(store_dir)),
        })
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.config.logging.file.clone()
    }

    pub fn store_dir(&self) -> PathBuf {
        resolve_store_dir(&self.config, &self.paths)
    }

    /// Catalog client; fails with a pointer to `config init` when no key is set.
    pub fn catalog(&self) -> Result<Arc<dyn CatalogSource>> {
        self.config.validate().map_err(|e| {
            eyre!("{}\nRun 'moviecatalog config init --api-key <KEY>' to configure it.", e)
        })?;
        let client = OmdbClient::from_config(&self.config.omdb).wrap_err("Failed to create OMDb client")?;
        Ok(Arc::new(client))
    }

    pub fn favorites(&self) -> FavoritesRepository {
        FavoritesRepository::new(self.store.clone())
    }

    pub fn reviews(&self) -> ReviewsRepository {
        ReviewsRepository::new(self.store.clone())
    }
}

fn resolve_store_dir(config: &Config, paths: &PathManager) -> PathBuf {
    config
        .storage
        .data_dir
        .clone()
        .unwrap_or_else(|| paths.store_dir())
}

pub(crate) fn stars(rating: f64) -> String {
    let full = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
}

pub(crate) fn movie_json(movie: &Movie) -> Value {
    json!({
        "imdb_id": movie.imdb_id,
        "title": movie.title,
        "year": movie.year,
        "genre": movie.genre,
        "director": movie.director,
        "actors": movie.actors,
        "plot": movie.plot,
        "poster": movie.poster.url(),
    })
}

pub(crate) fn review_json(review: &Review) -> Value {
    json!({
        "name": review.name,
        "message": review.message,
        "rating": review.rating,
        "date": review.date.to_rfc3339(),
    })
}
