//! Fetch the shopper's context token.
//!
//! Useful for checking that the context endpoint is reachable and that a
//! configured token mirror is being written.

use agentic_chat_widget::{ChatWidget, ConfigError, HostConfig};
use thiserror::Error;

/// Errors that can occur while fetching the token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The widget could not be activated.
    #[error("Widget not activated: {0}")]
    Config(#[from] ConfigError),

    /// The context endpoint did not yield a token.
    #[error("No context token available from {0}")]
    Unavailable(String),
}

/// Activate the widget and print the token it obtained.
///
/// # Errors
///
/// Returns an error if configuration is invalid or no token was fetched.
#[allow(clippy::print_stdout)]
pub async fn run(host: &HostConfig) -> Result<(), TokenError> {
    let widget = ChatWidget::activate(host).await?;
    let session = widget.session();

    let token = session
        .current()
        .ok_or_else(|| TokenError::Unavailable(session.endpoint().to_string()))?;

    println!("{}", token.expose());
    Ok(())
}
