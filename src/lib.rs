pub mod cache;
pub mod client;
pub mod code;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod files;
pub mod locale;
pub mod org;
pub mod parsing;
pub mod types;

pub use cache::CachedFetcher;
pub use client::DlsiteClient;
pub use code::ProductCode;
pub use config::Config;
pub use error::DlsiteError;
pub use fetcher::WorkFetcher;
#[cfg(feature = "mock")]
pub use fetcher::MockWorkFetcher;
pub use locale::Locale;
pub use org::{OrganizeOptions, PathRename};
pub use parsing::WorkParser;
pub use types::{AgeRating, Track, Work};

// Re-export scraper types for testing
pub use scraper::Html;

pub type Result<T> = std::result::Result<T, DlsiteError>;
