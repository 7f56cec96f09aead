//! Gratis is a command-line chatbot client for the OpenRouter API that
//! favors free models and automatically rotates away from ones that fail.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the retry/selection engine: model availability tracking,
//!   free-model selection, conversation persistence, the ask state machine,
//!   and configuration.
//! - [`api`] defines the chat/model payloads and the HTTP calls that carry
//!   them.
//! - [`auth`] stores and resolves the API credential.
//! - [`render`] turns Markdown answers and stored transcripts into plain
//!   terminal text.
//! - [`cli`] parses arguments and drives the engine from the terminal.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod render;
pub mod utils;
