pub mod quote;
pub mod ticker;

pub use quote::{PriceHistoryPoint, RawQuoteInfo};
pub use ticker::Ticker;
