//! Unified error type for the chatwire crate.
//!
//! Every failure the crate can report falls into one of a few kinds:
//! - malformed or schema-violating JSON ([`Error::Decode`])
//! - a function-call directive naming an unregistered function
//!   ([`Error::FunctionNotFound`])
//! - an entity that breaks one of its own invariants while being encoded
//!   ([`Error::InvariantViolation`])
//! - a registered callback that reported its own failure ([`Error::Callback`])

/// Result type alias for chatwire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by fallible callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for the chatwire crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// JSON could not be decoded into the expected shape.
    #[error("Decode error at `{context}`: {message}")]
    Decode {
        /// JSON path of the failing field, or the name of the function whose
        /// arguments failed to decode.
        context: String,
        /// Underlying parser message.
        message: String,
    },

    /// A value could not be rendered as JSON.
    #[error("Encode error in `{context}`: {message}")]
    Encode {
        /// What was being encoded.
        context: String,
        /// Underlying serializer message.
        message: String,
    },

    /// The requested function is not registered.
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    /// An entity violates one of its construction invariants.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A registered callback returned an error.
    #[error("Function '{name}' failed: {source}")]
    Callback {
        /// Name of the call as received from the model.
        name: String,
        /// Error reported by the callback.
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Create a decode error.
    #[must_use]
    pub fn decode(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an encode error.
    #[must_use]
    pub fn encode(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a function-not-found error.
    #[must_use]
    pub fn function_not_found(name: impl Into<String>) -> Self {
        Self::FunctionNotFound(name.into())
    }

    /// Create an invariant violation.
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Wrap a callback failure.
    #[must_use]
    pub fn callback(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Callback {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Returns `true` for decode failures.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns `true` when no function matched the call.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FunctionNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let context = format!("line {} column {}", err.line(), err.column());
        Self::decode(context, err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn decode_creates_error() {
        let err = Error::decode("choices[0].finish_reason", "unknown variant `done`");
        assert!(err.is_decode());
        assert!(err.to_string().contains("choices[0].finish_reason"));
        assert!(err.to_string().contains("done"));
    }

    #[test]
    fn function_not_found_names_function() {
        let err = Error::function_not_found("functions.lookup");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Function not found: functions.lookup");
    }

    #[test]
    fn invariant_creates_error() {
        let err = Error::invariant("function message requires a name");
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert!(err.to_string().contains("requires a name"));
    }

    #[test]
    fn callback_keeps_source() {
        let io = std::io::Error::other("disk on fire");
        let err = Error::callback("save", io);
        assert!(err.to_string().contains("save"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn from_json_syntax_error_is_decode() {
        let json_err = serde_json::from_str::<i32>("{oops").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.is_decode());
    }

    #[test]
    fn from_json_data_error_is_decode() {
        let json_err = serde_json::from_str::<u8>("\"text\"").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.is_decode());
    }
}
