//! # Error Handling
//!
//! Error taxonomy for the scanner. Every variant is fatal to the current
//! command; nothing is retried locally. Messages name the secret or
//! configuration value involved but never carry a secret value.

/// Custom result type for scanner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scanner
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Bad or missing credentials, or a token the provider rejected
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network or provider error while fetching secrets
    #[error("Fetch failed: {message}")]
    Fetch { message: String, status: Option<u16> },

    /// Malformed snapshot input
    #[error("Invalid snapshot: {message}")]
    InvalidSnapshot { message: String, secret: Option<String> },

    /// Missing or invalid configuration value
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },
}

impl Error {
    /// Create an authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication { message: message.into() }
    }

    /// Create a fetch error without an HTTP status
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch { message: message.into(), status: None }
    }

    /// Create a fetch error carrying the provider's HTTP status
    pub fn fetch_with_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Fetch { message: message.into(), status: Some(status) }
    }

    /// Create an invalid snapshot error
    pub fn invalid_snapshot<S: Into<String>>(message: S) -> Self {
        Self::InvalidSnapshot { message: message.into(), secret: None }
    }

    /// Create an invalid snapshot error naming the offending secret
    pub fn invalid_secret<N: Into<String>, S: Into<String>>(name: N, message: S) -> Self {
        let name = name.into();
        Self::InvalidSnapshot { message: format!("secret '{}': {}", name, message.into()), secret: Some(name) }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(source: serde_json::Error, context: S) -> Self {
        Self::Serialization { source, context: context.into() }
    }

    /// Name of the secret that triggered the failure, when there is one
    pub fn secret_name(&self) -> Option<&str> {
        match self {
            Error::InvalidSnapshot { secret, .. } => secret.as_deref(),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect();
        fields.sort();

        Self::configuration(format!("Validation failed: {}", fields.join("; ")))
    }
}
