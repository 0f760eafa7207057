pub mod droid;
pub mod extractor;
#[cfg(test)]
pub mod fake_browser;
pub mod render_pool;
pub mod renderer;

pub use droid::*;
pub use extractor::*;
pub use render_pool::*;
pub use renderer::*;
