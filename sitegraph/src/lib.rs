// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    MapOptions, MapSummary, display_path, expand_path, load_sitemap, resolve_origin, run_map,
};
