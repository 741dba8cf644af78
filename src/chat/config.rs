//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_API_URL;
use crate::reveal::RevealPolicy;
use crate::store::SessionStore;

/// Command-line arguments for the caremind-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the backend.
    #[arrrg(optional, "Backend base URL (default: http://127.0.0.1:8000/)", "URL")]
    pub url: Option<String>,

    /// Path to the saved session file.
    #[arrrg(optional, "Session file path (default: per-user config dir)", "PATH")]
    pub session_file: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Print replies immediately instead of animating them.
    #[arrrg(flag, "Disable the typing animation")]
    pub no_typing: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The base URL of the backend.
    pub base_url: String,

    /// Where the session token is persisted.
    pub store_path: PathBuf,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// How replies are revealed.
    pub reveal: RevealPolicy,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: http://127.0.0.1:8000/
    /// - Session file: per-user config directory
    /// - Color: enabled
    /// - Typing animation: enabled
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            store_path: SessionStore::default_path(),
            use_color: true,
            reveal: RevealPolicy::default(),
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the session file path.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Disables the typing animation; replies print all at once.
    pub fn without_typing(mut self) -> Self {
        self.reveal = RevealPolicy::instant();
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let mut config = ChatConfig::new();
        if let Some(url) = args.url {
            config.base_url = url;
        }
        if let Some(path) = args.session_file {
            config.store_path = PathBuf::from(path);
        }
        config.use_color = !args.no_color;
        if args.no_typing {
            config.reveal = RevealPolicy::instant();
        }
        config
    }
}
