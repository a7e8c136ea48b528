pub mod listing;
pub mod syndication;

pub use listing::ListingParser;
