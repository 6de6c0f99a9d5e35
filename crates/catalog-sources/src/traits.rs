use async_trait::async_trait;
use catalog_models::{MovieLookup, MovieSummary};
use std::sync::Arc;
use crate::error::SourceError;

/// One page of a title search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    pub year: Option<String>,
    pub page: u32, // 1-based
}

impl SearchRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            year: None,
            page: 1,
        }
    }

    pub fn with_year(mut self, year: Option<String>) -> Self {
        self.year = year.filter(|y| !y.trim().is_empty());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

/// Remote movie catalog.
///
/// `search` reports "no match" as an empty list, never as an error. `details`
/// folds every outcome, including transport failures, into a `MovieLookup`.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn search(&self, request: &SearchRequest) -> Result<Vec<MovieSummary>, SourceError>;

    async fn details(&self, imdb_id: &str) -> MovieLookup;
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    fn source_name(&self) -> &str {
        (**self).source_name()
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<MovieSummary>, SourceError> {
        (**self).search(request).await
    }

    async fn details(&self, imdb_id: &str) -> MovieLookup {
        (**self).details(imdb_id).await
    }
}
