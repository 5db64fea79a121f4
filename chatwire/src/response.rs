//! Non-streaming chat completion responses and shared response records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::message::{ChatFunctionCall, ChatMessage};
use crate::usage::Usage;

/// Why the model stopped generating.
///
/// Every variant, `Null` included, is a string on the wire. A JSON `null` or
/// a missing field means "not finished yet" and is carried as `None` by the
/// choice types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of the answer or a stop sequence.
    Stop,
    /// Token limit reached.
    Length,
    /// The model wants a function called.
    FunctionCall,
    /// Output withheld by the content filter.
    ContentFilter,
    /// The literal `"null"` reason.
    #[default]
    Null,
}

impl FinishReason {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::FunctionCall => "function_call",
            Self::ContentFilter => "content_filter",
            Self::Null => "null",
        }
    }

    /// Returns `true` unless this is [`FinishReason::Null`].
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        !matches!(self, Self::Null)
    }

    /// Returns `true` if the model stopped to call a function.
    #[must_use]
    pub const fn is_function_call(&self) -> bool {
        matches!(self, Self::FunctionCall)
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinishReason {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(Self::Stop),
            "length" => Ok(Self::Length),
            "function_call" => Ok(Self::FunctionCall),
            "content_filter" => Ok(Self::ContentFilter),
            "null" => Ok(Self::Null),
            other => Err(Error::decode(
                "finish_reason",
                format!("unknown finish reason `{other}`"),
            )),
        }
    }
}

/// Outcome of one content-filter category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilterResult {
    /// Whether the content was filtered.
    pub filtered: bool,
    /// Severity label (`safe`, `low`, `medium`, `high`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Hate speech category result.
pub type Hate = ContentFilterResult;
/// Self-harm category result.
pub type SelfHarm = ContentFilterResult;
/// Sexual content category result.
pub type Sexual = ContentFilterResult;
/// Violence category result.
pub type Violence = ContentFilterResult;

/// Content-filter results per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilterResults {
    /// Hate speech.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hate: Option<Hate>,
    /// Self harm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_harm: Option<SelfHarm>,
    /// Sexual content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexual: Option<Sexual>,
    /// Violence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violence: Option<Violence>,
}

impl ContentFilterResults {
    /// Returns `true` if any category filtered the content.
    #[must_use]
    pub fn any_filtered(&self) -> bool {
        [&self.hate, &self.self_harm, &self.sexual, &self.violence]
            .into_iter()
            .flatten()
            .any(|result| result.filtered)
    }
}

/// Filter annotation on a prompt, sent with streaming responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptAnnotation {
    /// Index of the prompt the annotation refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_index: Option<u32>,
    /// Filter results for that prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_filter_results: Option<ContentFilterResults>,
}

/// One generated answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    /// Position among the generated choices.
    pub index: u32,
    /// The generated message.
    pub message: ChatMessage,
    /// Why generation stopped; `None` when the API sent `null` or nothing.
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// A complete (non-streaming) chat completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response identifier.
    pub id: String,
    /// Object type, `chat.completion`.
    pub object: String,
    /// Creation time.
    ///
    /// The wire carries whole Unix seconds; sub-second precision set on a
    /// value is dropped when it is encoded.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    /// Model that produced the response.
    pub model: String,
    /// Generated choices.
    pub choices: Vec<ChatCompletionChoice>,
    /// Token usage.
    #[serde(default)]
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Returns the first choice's message.
    #[must_use]
    pub fn message(&self) -> Option<&ChatMessage> {
        self.choices.first().map(|choice| &choice.message)
    }

    /// Returns the first choice's text content.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message().and_then(ChatMessage::text)
    }

    /// Returns the first choice's function call, if the model asked for one.
    #[must_use]
    pub fn function_call(&self) -> Option<&ChatFunctionCall> {
        self.message().and_then(|m| m.function_call.as_ref())
    }

    /// Returns the first choice's finish reason.
    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.choices.first().and_then(|choice| choice.finish_reason)
    }
}
