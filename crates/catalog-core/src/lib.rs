pub mod debounce;
pub mod detail;
pub mod favorites;
pub mod favorites_view;
pub mod reviews;
pub mod search;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use debounce::{Debouncer, Generation};
pub use detail::{DetailError, DetailState, DetailViewModel, MovieDetail, ReviewDraft, ReviewRejection};
pub use favorites::{FavoritesRepository, FAVORITES_KEY};
pub use favorites_view::{FavoritesState, FavoritesViewModel};
pub use reviews::{average_rating, ReviewsRepository, REVIEWS_KEY};
pub use search::{SearchInput, SearchOptions, SearchState, SearchStatus, SearchViewModel};
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedStore, StoreError};
