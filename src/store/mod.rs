pub mod document;
pub mod local;

pub use document::{
    BlobStore, Direction, Document, DocumentStore, Filter, Query, StoreError, StoreResult,
};
pub use local::LocalStore;
