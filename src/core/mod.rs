pub mod api;
pub mod app;
pub mod feed;
pub mod pages;
pub mod search;
pub mod server;

pub use app::App;
pub use server::Server;
