//! Core types for Agentic Chat.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod price;
pub mod status;
pub mod token;
pub mod utterance;

pub use price::{CurrencyCode, Price};
pub use status::*;
pub use token::ContextToken;
pub use utterance::Utterance;
