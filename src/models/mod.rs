pub mod config;
pub mod types;

pub use config::{Config, FeedConfig, SearchConfig};
pub use types::{
    Author, CategorySummary, PostDraft, PostPatch, PostRecord, SearchQuery, SortMode,
};
