pub mod error;
pub mod fragment;
pub mod maps;
mod retry;
pub mod saturation;
pub mod source;
pub mod webdriver;

pub use error::ScraperError;
pub use fragment::{first_match, RawReview};
pub use maps::{match_business, MapsOptions, MapsSource};
pub use saturation::{load_until_saturated, Saturation, MAX_SATURATION_STEPS};
pub use source::{dedup_preserving_order, ReviewSource};
pub use webdriver::WebDriverClient;
