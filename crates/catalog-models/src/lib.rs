pub mod lookup;
pub mod movie;
pub mod review;

pub use lookup::MovieLookup;
pub use movie::{Movie, MovieSummary, Poster, NOT_AVAILABLE};
pub use review::{Review, MAX_RATING, MIN_RATING};
