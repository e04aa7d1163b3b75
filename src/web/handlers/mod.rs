//! Admin page handlers.

mod index;
mod model;
mod render;

pub use index::index_handler;
pub use model::{model_get_handler, model_post_handler};
pub use render::render;
