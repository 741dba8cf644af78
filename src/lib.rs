// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod render;
pub mod reveal;
pub mod store;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::{Backend, CareMind};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use store::SessionStore;
pub use types::*;
