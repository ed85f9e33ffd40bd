//! Agentic Chat Core - Shared types library.
//!
//! This crate provides common types used across all Agentic Chat components:
//! - `widget` - Session lifecycle, message dispatch and response rendering
//! - `cli` - Terminal front end for the widget
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Prices, context tokens, utterances and widget enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
