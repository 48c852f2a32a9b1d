pub mod default;
pub mod renderer;

pub use renderer::ThemeRenderer;
