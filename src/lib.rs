//! # inbox-extract
//!
//! A CLI tool that pulls every message written by one participant out of an exported
//! chat archive and appends them, one per line, to a plain ASCII text file.
//!
//! ## What it does
//!
//! Chat exports lay out one directory per conversation under an inbox root
//! (`messages/inbox` by default). Each conversation holds one or more
//! `message*.json` files with a `messages` array. This tool walks those directories in
//! sorted order, keeps the messages whose `sender_name` matches exactly and which carry
//! a `content` string, strips every non-ASCII character, and appends the result to the
//! output file.
//!
//! The output is **append-only**: running twice over the same archive writes every
//! line twice. Nothing is ever truncated.
//!
//! ## Usage
//!
//! ```sh
//! # Extract into ./output.txt from ./messages/inbox
//! inbox-extract "Jane Doe"
//!
//! # Custom paths, and keep going past malformed files
//! inbox-extract "Jane Doe" -i ~/export/messages/inbox -o jane.txt --on-error skip
//! ```
//!
//! Preferences can be persisted in `~/.config/inbox-extract/config.toml`.
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod sanitize;
pub mod sink;
pub mod thread;
pub mod walker;

pub use config::{ExtractConfig, FailurePolicy};
pub use error::ExtractError;
pub use extract::{ExtractSummary, execute};
