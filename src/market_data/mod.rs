pub mod provider;
pub mod yahoo;

// Re-export for convenient access (e.g. `use crate::market_data::PriceHistory`).
pub use provider::{PriceHistory, QuoteProvider};
pub use yahoo::YahooClient;
