// Public modules
pub mod login_outcome;
pub mod message;
pub mod session;
pub mod transcript;

// Re-exports
pub use login_outcome::LoginOutcome;
pub use message::{Message, MessageRole};
pub use session::{Session, UserProfile};
pub use transcript::Transcript;
