pub mod handler;

pub use handler::{handle_count, handle_get, handle_metadata};
