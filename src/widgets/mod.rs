pub mod pagination;
pub mod search;
pub mod share;

pub use pagination::{PageItem, Pagination};
pub use search::SearchForm;
pub use share::ShareLinks;
