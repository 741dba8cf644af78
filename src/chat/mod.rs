//! Chat application module for interactive conversations with the companion.
//!
//! This module provides a REPL chat interface built on top of the caremind
//! client library. It supports:
//!
//! - Incremental reveal of replies with a typing animation
//! - ANSI-styled output
//! - Slash commands for session control
//! - Configurable backend URL and session file location
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and backend interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, DEFAULT_GREETING, SessionState, SessionStats, TURN_APOLOGY};
