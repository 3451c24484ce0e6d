//! Chat application module for interactive conversations with a local
//! reasoning model.
//!
//! This module provides the REPL layer built on top of the thinker client
//! library. It supports:
//!
//! - Streaming responses with thinking hidden until the answer begins
//! - Input classification for session commands
//! - Configurable model, sampling parameters, and endpoint
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: input classification for the REPL
//! - [`session`]: conversation state and per-turn streaming

mod commands;
mod config;
mod session;

pub use commands::{ChatInput, classify_input};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, interrupt_cleanup};
