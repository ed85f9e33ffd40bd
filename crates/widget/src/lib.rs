//! Agentic Chat widget library.
//!
//! The client-side core of the storefront chat widget: it keeps the shopper's
//! context token fresh, sends utterances to the conversational backend and
//! turns structured replies into view models appended to a message log.
//!
//! # Modules
//!
//! - [`config`] - Host configuration and validation
//! - [`session`] - Context token manager and diagnostic mirrors
//! - [`client`] - Message dispatcher and wire types
//! - [`render`] - Response renderer and rendering strategies
//! - [`log`] - Append-only message log
//! - [`widget`] - Panel/sending state machine tying the pieces together
//! - [`html`] - Escaped HTML fragments for rendered messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod html;
pub mod log;
pub mod render;
pub mod session;
pub mod widget;

pub use client::{DispatchError, MessageClient, ResponsePayload};
pub use config::{ConfigError, HostConfig, Theme, WidgetConfig};
pub use log::{ChatMessage, MessageLog};
pub use render::MessageBody;
pub use session::{SessionContext, TokenFetchError};
pub use widget::{ChatWidget, SubmitOutcome};
