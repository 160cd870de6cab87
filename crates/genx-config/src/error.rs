//! Configuration errors
//!
//! These never reach feature modules as failures; the resolver turns them
//! into diagnostics and carries on without the offending layer.

/// A notation that could not contribute to the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed JSON in {attribute} on {selector}: {source}")]
    MalformedJson {
        attribute: String,
        selector: String,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON in {attribute} on {selector} is not an object")]
    NotAnObject {
        attribute: String,
        selector: String,
        raw: String,
    },
}

impl ConfigError {
    pub fn attribute(&self) -> &str {
        match self {
            Self::MalformedJson { attribute, .. } | Self::NotAnObject { attribute, .. } => attribute,
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Self::MalformedJson { selector, .. } | Self::NotAnObject { selector, .. } => selector,
        }
    }

    /// The offending attribute value
    pub fn raw(&self) -> &str {
        match self {
            Self::MalformedJson { raw, .. } | Self::NotAnObject { raw, .. } => raw,
        }
    }

    /// Underlying parser message
    pub fn reason(&self) -> String {
        match self {
            Self::MalformedJson { source, .. } => source.to_string(),
            Self::NotAnObject { .. } => "expected a JSON object".to_string(),
        }
    }
}
