//! Streaming response frames.
//!
//! Each [`ChatCompletionStreamResponse`] is one frame of an in-progress
//! completion. A frame only carries what changed since the previous one, so
//! every field of a delta is optional. Turning the byte stream into frames is
//! the transport's job; [`StreamAggregator`] folds the frames back into a
//! complete message when the caller wants one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{ChatFunctionCall, ChatMessage, ChatMessageRole};
use crate::response::{ContentFilterResults, FinishReason, PromptAnnotation};

/// Partial function call inside a delta.
///
/// The first frame usually carries the name and an empty argument string;
/// following frames carry argument fragments only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFunctionCallDelta {
    /// Function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fragment of the argument text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// The part of a message that changed in one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionStreamChoiceDelta {
    /// Author role; normally only on the first frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatMessageRole>,
    /// Text fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Function call fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<ChatFunctionCallDelta>,
}

impl ChatCompletionStreamChoiceDelta {
    /// Returns `true` if the delta carries nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.role.is_none() && self.content.is_none() && self.function_call.is_none()
    }
}

/// One choice within a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionStreamChoice {
    /// Position among the generated choices.
    pub index: u32,
    /// What changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChatCompletionStreamChoiceDelta>,
    /// `None` until the final frame of this choice.
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
    /// Filter results for this fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_filter_results: Option<ContentFilterResults>,
}

/// One streaming frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionStreamResponse {
    /// Response identifier, shared by all frames of a completion.
    pub id: String,
    /// Object type, `chat.completion.chunk`.
    pub object: String,
    /// Creation time; whole Unix seconds on the wire, sub-second precision
    /// is dropped on encode.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    /// Model that produced the frame.
    pub model: String,
    /// Changed choices.
    pub choices: Vec<ChatCompletionStreamChoice>,
    /// Prompt filter annotations, usually on the first frame only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_annotations: Option<Vec<PromptAnnotation>>,
}

impl ChatCompletionStreamResponse {
    /// Returns the choice with the given index.
    #[must_use]
    pub fn choice(&self, index: u32) -> Option<&ChatCompletionStreamChoice> {
        self.choices.iter().find(|choice| choice.index == index)
    }

    /// Returns the first choice's text fragment.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.as_ref())
            .and_then(|delta| delta.content.as_deref())
    }
}

/// Folds the frames of one choice into a complete message.
///
/// - `role` is taken from the first delta that has one;
/// - `content` fragments are concatenated;
/// - the function name is taken once, argument fragments are concatenated;
/// - the finish reason is replaced by every finished value (neither `null`
///   nor `"null"`).
#[derive(Debug, Clone, Default)]
pub struct StreamAggregator {
    index: u32,
    role: Option<ChatMessageRole>,
    content: Option<String>,
    function_name: Option<String>,
    function_arguments: Option<String>,
    finish_reason: Option<FinishReason>,
    frames: usize,
}

impl StreamAggregator {
    /// Creates an aggregator for choice `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator for the given choice index.
    #[must_use]
    pub fn for_choice(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Applies one frame. Choices with other indices are ignored.
    pub fn apply(&mut self, frame: &ChatCompletionStreamResponse) {
        let Some(choice) = frame.choice(self.index) else {
            return;
        };
        self.frames += 1;

        if let Some(delta) = &choice.delta {
            self.apply_delta(delta);
        }
        if let Some(reason) = choice.finish_reason.filter(FinishReason::is_finished) {
            self.finish_reason = Some(reason);
        }
    }

    /// Applies a single delta.
    pub fn apply_delta(&mut self, delta: &ChatCompletionStreamChoiceDelta) {
        if self.role.is_none() {
            self.role = delta.role;
        }
        if let Some(fragment) = &delta.content {
            self.content
                .get_or_insert_with(String::new)
                .push_str(fragment);
        }
        if let Some(call) = &delta.function_call {
            if self.function_name.is_none() {
                self.function_name.clone_from(&call.name);
            }
            if let Some(fragment) = &call.arguments {
                self.function_arguments
                    .get_or_insert_with(String::new)
                    .push_str(fragment);
            }
        }
    }

    /// Returns the text accumulated so far.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the latest finish reason, if one has arrived.
    #[must_use]
    pub const fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// Returns `true` once a finish reason has arrived.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finish_reason.is_some()
    }

    /// Number of frames that touched this choice.
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Returns the assembled function call, if any fragment named one.
    #[must_use]
    pub fn function_call(&self) -> Option<ChatFunctionCall> {
        self.function_name.as_ref().map(|name| {
            let arguments = self.function_arguments.clone().unwrap_or_default();
            ChatFunctionCall::new(name.clone(), Value::String(arguments))
        })
    }

    /// Builds the complete message. The role defaults to assistant.
    ///
    /// Content is empty rather than absent when the stream produced neither
    /// text nor a function call.
    #[must_use]
    pub fn into_message(self) -> ChatMessage {
        let function_call = self.function_call();
        let content = match (self.content, &function_call) {
            (None, None) => Some(String::new()),
            (content, _) => content,
        };
        ChatMessage {
            role: self.role.unwrap_or(ChatMessageRole::Assistant),
            content,
            name: None,
            function_call,
            tokens: 0,
        }
    }
}
