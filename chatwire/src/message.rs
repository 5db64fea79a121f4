//! Chat message types.
//!
//! A [`ChatMessage`] is the unit exchanged in both directions: the caller
//! sends a list of them in a request, the model answers with one per choice.
//!
//! # Wire format
//!
//! ```json
//! {
//!     "role": "assistant",
//!     "content": null,
//!     "function_call": { "name": "get_time", "arguments": "{}" }
//! }
//! ```
//!
//! `content` is always written, as an explicit `null` when absent. `name` and
//! `function_call` are omitted when absent. `tokens` never leaves the process.

use std::borrow::Cow;
use std::fmt;

use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Longest name accepted by [`ChatMessage::is_valid_name`].
pub const MAX_NAME_LEN: usize = 64;

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    /// End user input.
    #[default]
    User,
    /// Instructions for the model.
    System,
    /// Model output.
    Assistant,
    /// Result of a function the model asked for.
    Function,
}

impl ChatMessageRole {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for ChatMessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function invocation requested by the model.
///
/// `arguments` is whatever the model produced. It is usually a string holding
/// a JSON object, but nothing guarantees it is well formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionCall {
    /// Name of the function to call, possibly namespaced (`functions.search`).
    pub name: String,
    /// Raw arguments as sent by the model.
    pub arguments: Value,
}

impl ChatFunctionCall {
    /// Create a new function call.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Returns the arguments as JSON text.
    ///
    /// A string value is returned as is; any other value is re-serialized.
    #[must_use]
    pub fn arguments_text(&self) -> Cow<'_, str> {
        match &self.arguments {
            Value::String(text) => Cow::Borrowed(text),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Returns the name with a leading namespace removed, if there is one.
    ///
    /// `functions.search` becomes `search`; `search` yields `None`.
    #[must_use]
    pub fn unqualified_name(&self) -> Option<&str> {
        self.name.split_once('.').map(|(_, rest)| rest)
    }
}

/// A single chat message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: ChatMessageRole,

    /// Text content; `None` only for assistant messages that carry a
    /// function call.
    #[serde(default)]
    pub content: Option<String>,

    /// Author name; required for [`ChatMessageRole::Function`].
    #[serde(default)]
    pub name: Option<String>,

    /// Function call requested by the model.
    #[serde(default)]
    pub function_call: Option<ChatFunctionCall>,

    /// Client-side token count, set by whoever keeps the conversation.
    #[serde(skip)]
    pub tokens: u32,
}

impl ChatMessage {
    /// Create a message with the given role and content.
    #[must_use]
    pub fn new(role: ChatMessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatMessageRole::User, content)
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatMessageRole::System, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatMessageRole::Assistant, content)
    }

    /// Create an assistant message that only carries a function call.
    #[must_use]
    pub fn assistant_function_call(call: ChatFunctionCall) -> Self {
        Self {
            role: ChatMessageRole::Assistant,
            function_call: Some(call),
            ..Self::default()
        }
    }

    /// Create a function result message.
    #[must_use]
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::Function,
            content: Some(content.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the author name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local token count.
    #[must_use]
    pub const fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = tokens;
        self
    }

    /// Returns the text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns `true` if the model asked for a function call.
    #[must_use]
    pub const fn has_function_call(&self) -> bool {
        self.function_call.is_some()
    }

    /// Returns `true` if `name` is 1 to 64 ASCII letters, digits or underscores.
    #[must_use]
    pub fn is_valid_name(name: &str) -> bool {
        (1..=MAX_NAME_LEN).contains(&name.len())
            && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    }

    /// Check the invariants a message must hold before it goes on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] when a function message has no
    /// name, or when content is missing from anything other than an
    /// assistant function call.
    pub fn validate(&self) -> Result<()> {
        if self.role == ChatMessageRole::Function
            && self.name.as_deref().is_none_or(str::is_empty)
        {
            return Err(Error::invariant("function message requires a name"));
        }
        let content_optional =
            self.role == ChatMessageRole::Assistant && self.function_call.is_some();
        if self.content.is_none() && !content_optional {
            return Err(Error::invariant(format!(
                "{} message requires content",
                self.role
            )));
        }
        Ok(())
    }
}

impl Serialize for ChatMessage {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.validate().map_err(S::Error::custom)?;

        let len = 2 + usize::from(self.name.is_some()) + usize::from(self.function_call.is_some());
        let mut state = serializer.serialize_struct("ChatMessage", len)?;
        state.serialize_field("role", &self.role)?;
        // Always present, `null` included.
        state.serialize_field("content", &self.content)?;
        if let Some(name) = &self.name {
            state.serialize_field("name", name)?;
        }
        if let Some(call) = &self.function_call {
            state.serialize_field("function_call", call)?;
        }
        state.end()
    }
}
