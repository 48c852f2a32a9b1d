pub mod cli;
pub mod core;
pub mod models;
pub mod repo;
pub mod store;
pub mod theme;
pub mod utils;
pub mod widgets;

// Re-export commonly used types and traits
pub use crate::core::{App, Server};
pub use crate::models::{
    Author, CategorySummary, Config, PostDraft, PostPatch, PostRecord, SearchQuery, SortMode,
};
pub use crate::repo::ContentRepository;
pub use crate::store::{BlobStore, DocumentStore, LocalStore};
pub use crate::theme::renderer::ThemeRenderer;
pub use crate::widgets::{Pagination, SearchForm, ShareLinks};
