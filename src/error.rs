//! Error types for the relay.

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Task sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Contacts error: {0}")]
    Contacts(#[from] ContactsError),

    #[error("No team registered for {number}")]
    NoTeam { number: String },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Team/employee table errors (load time only — lookups never fail).
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Failed to parse directory table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Directory table is empty: {0}")]
    Empty(String),
}

/// Inbound event validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Malformed webhook body: {0}")]
    MalformedBody(String),

    #[error("Event has no data.object payload")]
    MissingObject,

    #[error("Event is missing required field: {0}")]
    MissingField(&'static str),
}

/// Outbound task-creation errors.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Task API responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from task API: {0}")]
    InvalidResponse(String),
}

/// Contacts-lookup errors. Never fatal for a webhook request — the
/// pipeline falls back to the raw phone number.
#[derive(Debug, thiserror::Error)]
pub enum ContactsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Invalid response from contacts API: {0}")]
    InvalidResponse(String),
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
