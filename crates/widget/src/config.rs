//! Widget configuration supplied by the host page.
//!
//! The host hands the widget a [`HostConfig`] (the `agenticAiConfig` object
//! on the storefront page, a JSON file, or environment variables). It is
//! validated once into a [`WidgetConfig`]; nothing in the core reads ambient
//! globals after that.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AGENTIC_CHAT_ENABLED` - Must be `true` for the widget to activate
//! - `AGENTIC_CHAT_API_ENDPOINT` - Conversational backend URL
//! - `AGENTIC_CHAT_ACCESS_KEY` - Store API access key
//! - `AGENTIC_CHAT_SHOP_URL` - Public storefront URL
//!
//! ## Optional
//! - `AGENTIC_CHAT_CONTEXT_ENDPOINT` - Token endpoint (default: `<shop>/agentic-ai/context`)
//! - `AGENTIC_CHAT_PRIMARY_COLOR` - Theme color (default: `#007bff`)
//! - `AGENTIC_CHAT_POSITION` - `bottom-right` (default) or `bottom-left`
//! - `AGENTIC_CHAT_TOKEN_MIRROR` - File the current token is mirrored to for debugging

use std::path::{Path, PathBuf};

use agentic_chat_core::WidgetPosition;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Theme color used when the host does not set one.
pub const DEFAULT_PRIMARY_COLOR: &str = "#007bff";

/// Path of the storefront route that hands out the current context token.
pub const CONTEXT_TOKEN_PATH: &str = "/agentic-ai/context";

/// CSS custom property carrying the theme color.
pub const PRIMARY_COLOR_VARIABLE: &str = "--agentic-primary-color";

/// Configuration errors that can occur during loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Chat widget is disabled")]
    Disabled,
    #[error("Missing configuration field: {0}")]
    MissingField(&'static str),
    #[error("Invalid URL in {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid boolean in {0}: {1}")]
    InvalidFlag(&'static str, String),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw settings as provided by the host page.
///
/// Field names follow the storefront's `agenticAiConfig` object so the same
/// JSON can be fed to [`HostConfig::from_json`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// Gates whether the widget initializes at all.
    #[serde(default)]
    pub enabled: bool,
    /// Conversational backend URL.
    pub api_endpoint: Option<String>,
    /// Store API access key.
    #[serde(rename = "swAccessKey")]
    pub access_key: Option<String>,
    /// Public storefront URL.
    pub shop_url: Option<String>,
    /// Token endpoint override.
    pub context_endpoint: Option<String>,
    /// CSS color applied as a theme variable.
    pub primary_color: Option<String>,
    /// `bottom-right` or `bottom-left`.
    pub position: Option<String>,
    /// File the current token is mirrored to for debugging.
    pub token_mirror: Option<PathBuf>,
}

/// Validated widget configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Conversational backend URL.
    pub api_endpoint: Url,
    /// Store API access key, sent as `swAccessKey`.
    pub access_key: String,
    /// Storefront URL, sent verbatim as `shopUrl`.
    pub shop_url: String,
    /// Token endpoint.
    pub context_endpoint: Url,
    /// Presentation options.
    pub theme: Theme,
    /// Diagnostic token mirror file.
    pub token_mirror: Option<PathBuf>,
}

/// Presentation options handed to the UI adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// CSS color for `--agentic-primary-color`.
    pub primary_color: String,
    /// Corner the toggle and panel are anchored to.
    pub position: WidgetPosition,
}

/// Horizontal offsets for the toggle button and the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub left: &'static str,
    pub right: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            position: WidgetPosition::default(),
        }
    }
}

impl Theme {
    /// CSS custom properties to set on the document root.
    #[must_use]
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![(PRIMARY_COLOR_VARIABLE, self.primary_color.clone())]
    }

    /// Offsets shared by the toggle button and the panel container.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        match self.position {
            WidgetPosition::BottomRight => Placement {
                left: "auto",
                right: "20px",
            },
            WidgetPosition::BottomLeft => Placement {
                left: "20px",
                right: "auto",
            },
        }
    }
}

impl HostConfig {
    /// Load settings from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFlag` if `AGENTIC_CHAT_ENABLED` is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFlag` if `AGENTIC_CHAT_ENABLED` is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let enabled = match lookup("AGENTIC_CHAT_ENABLED") {
            Some(value) => parse_flag("AGENTIC_CHAT_ENABLED", &value)?,
            None => false,
        };

        Ok(Self {
            enabled,
            api_endpoint: lookup("AGENTIC_CHAT_API_ENDPOINT"),
            access_key: lookup("AGENTIC_CHAT_ACCESS_KEY"),
            shop_url: lookup("AGENTIC_CHAT_SHOP_URL"),
            context_endpoint: lookup("AGENTIC_CHAT_CONTEXT_ENDPOINT"),
            primary_color: lookup("AGENTIC_CHAT_PRIMARY_COLOR"),
            position: lookup("AGENTIC_CHAT_POSITION"),
            token_mirror: lookup("AGENTIC_CHAT_TOKEN_MIRROR").map(PathBuf::from),
        })
    }

    /// Parse the host page's JSON configuration object.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Json` if it is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the settings and produce a [`WidgetConfig`].
    ///
    /// Blank strings count as missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Disabled` when the widget is switched off,
    /// `ConfigError::MissingField` when a required field is absent, and
    /// `ConfigError::InvalidUrl` when an endpoint cannot be parsed.
    pub fn validate(&self) -> Result<WidgetConfig, ConfigError> {
        if !self.enabled {
            return Err(ConfigError::Disabled);
        }

        let api_endpoint = required(self.api_endpoint.as_deref(), "apiEndpoint")?;
        let access_key = required(self.access_key.as_deref(), "swAccessKey")?;
        let shop_url = required(self.shop_url.as_deref(), "shopUrl")?;

        let api_endpoint = parse_url(api_endpoint, "apiEndpoint")?;
        let shop = parse_url(shop_url, "shopUrl")?;

        let context_endpoint = match present(self.context_endpoint.as_deref()) {
            Some(endpoint) => parse_url(endpoint, "contextEndpoint")?,
            None => shop
                .join(CONTEXT_TOKEN_PATH)
                .map_err(|source| ConfigError::InvalidUrl {
                    field: "shopUrl",
                    source,
                })?,
        };

        Ok(WidgetConfig {
            api_endpoint,
            access_key: access_key.to_string(),
            shop_url: shop_url.to_string(),
            context_endpoint,
            theme: self.theme(),
            token_mirror: self.token_mirror.clone(),
        })
    }

    /// Presentation options with defaults applied.
    #[must_use]
    pub fn theme(&self) -> Theme {
        let primary_color = present(self.primary_color.as_deref())
            .unwrap_or(DEFAULT_PRIMARY_COLOR)
            .to_string();

        let position = match present(self.position.as_deref()) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Unknown widget position, using bottom-right");
                WidgetPosition::BottomRight
            }),
            None => WidgetPosition::default(),
        };

        Theme {
            primary_color,
            position,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Treat blank strings as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Get a required field.
fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConfigError> {
    present(value).ok_or(ConfigError::MissingField(field))
}

fn parse_url(value: &str, field: &'static str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidFlag(key, other.to_string())),
    }
}
