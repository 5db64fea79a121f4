//! Chat completion requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatwire::prelude::*;
//!
//! let request = ChatCompletionRequest::new("gpt-3.5-turbo")
//!     .system("You are helpful.")
//!     .user("What time is it?")
//!     .functions(registry.functions())
//!     .function_call(FunctionCallDirective::auto());
//!
//! let body = chatwire::codec::encode(&request)?;
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::function::ChatFunction;
use crate::message::ChatMessage;

/// Stop condition: one sequence or several.
///
/// Serialized as a bare string or a bare array, whichever was set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequence {
    /// A single stop sequence.
    Single(String),
    /// Several stop sequences.
    Multiple(Vec<String>),
}

impl StopSequence {
    /// Returns the sequences as a slice-like list regardless of shape.
    #[must_use]
    pub fn as_vec(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Multiple(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for StopSequence {
    fn from(s: &str) -> Self {
        Self::Single(s.to_owned())
    }
}

impl From<String> for StopSequence {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<String>> for StopSequence {
    fn from(list: Vec<String>) -> Self {
        Self::Multiple(list)
    }
}

impl From<Vec<&str>> for StopSequence {
    fn from(list: Vec<&str>) -> Self {
        Self::Multiple(list.into_iter().map(str::to_owned).collect())
    }
}

/// How the model should use the advertised functions.
///
/// Either a mode string (`"none"`, `"auto"`) or a structured value such as
/// `{"name": "get_time"}`. Serialized as whichever shape was set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionCallDirective {
    /// Mode string.
    Mode(String),
    /// Any other JSON value.
    Value(Value),
}

impl FunctionCallDirective {
    /// The model must not call a function.
    #[must_use]
    pub fn none() -> Self {
        Self::Mode("none".to_owned())
    }

    /// The model decides whether to call a function.
    #[must_use]
    pub fn auto() -> Self {
        Self::Mode("auto".to_owned())
    }

    /// The model must call the named function.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Value(serde_json::json!({ "name": name.into() }))
    }
}

impl From<&str> for FunctionCallDirective {
    fn from(mode: &str) -> Self {
        Self::Mode(mode.to_owned())
    }
}

impl From<Value> for FunctionCallDirective {
    fn from(value: Value) -> Self {
        match value {
            Value::String(mode) => Self::Mode(mode),
            other => Self::Value(other),
        }
    }
}

const fn default_one_f32() -> f32 {
    1.0
}

const fn default_num_completions() -> u32 {
    1
}

/// A chat completion request.
///
/// Sampling parameters carry the API's defaults and are always written;
/// optional fields are omitted when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,

    /// Conversation so far, oldest first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(default = "default_one_f32")]
    pub temperature: f32,

    /// Nucleus sampling probability mass.
    #[serde(default = "default_one_f32")]
    pub top_p: f32,

    /// Number of choices to generate.
    #[serde(rename = "n", default = "default_num_completions")]
    pub num_completions: u32,

    /// Whether the response is streamed.
    #[serde(default)]
    pub stream: bool,

    /// Stop condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequence>,

    /// Presence penalty.
    #[serde(default)]
    pub presence_penalty: f32,

    /// Frequency penalty.
    #[serde(default)]
    pub frequency_penalty: f32,

    /// Token id to bias adjustments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f32>>,

    /// End-user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Functions the model may call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<ChatFunction>>,

    /// Function calling mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDirective>,
}

impl Default for ChatCompletionRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            max_tokens: None,
            temperature: 1.0,
            top_p: 1.0,
            num_completions: 1,
            stream: false,
            stop: None,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            logit_bias: None,
            user: None,
            functions: None,
            function_call: None,
        }
    }
}

impl ChatCompletionRequest {
    /// Creates a new request for the given model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Creates a request with messages.
    #[must_use]
    pub fn with_messages(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    /// Appends a message.
    #[must_use]
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Appends a system message.
    #[must_use]
    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::system(content))
    }

    /// Appends a user message.
    #[must_use]
    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::user(content))
    }

    /// Appends an assistant message.
    #[must_use]
    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::assistant(content))
    }

    /// Sets max tokens.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets top-p.
    #[must_use]
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the number of completions (`n` on the wire).
    #[must_use]
    pub const fn num_completions(mut self, n: u32) -> Self {
        self.num_completions = n;
        self
    }

    /// Enables or disables streaming.
    #[must_use]
    pub const fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Sets the stop condition.
    #[must_use]
    pub fn stop(mut self, stop: impl Into<StopSequence>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    /// Sets presence penalty.
    #[must_use]
    pub const fn presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = penalty;
        self
    }

    /// Sets frequency penalty.
    #[must_use]
    pub const fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = penalty;
        self
    }

    /// Sets the logit bias map.
    #[must_use]
    pub fn logit_bias(mut self, bias: HashMap<String, f32>) -> Self {
        self.logit_bias = Some(bias);
        self
    }

    /// Sets the end-user identifier.
    #[must_use]
    pub fn user_id(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the callable functions.
    #[must_use]
    pub fn functions(mut self, functions: Vec<ChatFunction>) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Sets the function calling mode.
    #[must_use]
    pub fn function_call(mut self, directive: impl Into<FunctionCallDirective>) -> Self {
        self.function_call = Some(directive.into());
        self
    }

    /// Returns `true` if any functions are attached.
    #[must_use]
    pub fn has_functions(&self) -> bool {
        self.functions.as_ref().is_some_and(|f| !f.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    mod stop_sequence {
        use super::*;

        #[test]
        fn single_encodes_as_string() {
            let request = ChatCompletionRequest::new("m").stop("END");
            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["stop"], json!("END"));
        }

        #[test]
        fn multiple_encodes_as_list() {
            let request = ChatCompletionRequest::new("m").stop(vec!["A", "B"]);
            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["stop"], json!(["A", "B"]));
        }

        #[test]
        fn decoding_preserves_shape() {
            let single: StopSequence = serde_json::from_value(json!("END")).unwrap();
            assert_eq!(single, StopSequence::Single("END".into()));

            let multiple: StopSequence = serde_json::from_value(json!(["A", "B"])).unwrap();
            assert_eq!(multiple, StopSequence::Multiple(vec!["A".into(), "B".into()]));

            // A one-element list stays a list.
            let one: StopSequence = serde_json::from_value(json!(["A"])).unwrap();
            assert!(matches!(one, StopSequence::Multiple(_)));
        }

        #[test]
        fn rejects_other_shapes() {
            assert!(serde_json::from_value::<StopSequence>(json!(42)).is_err());
            assert!(serde_json::from_value::<StopSequence>(json!([1, 2])).is_err());
            assert!(serde_json::from_value::<StopSequence>(json!({"s": "x"})).is_err());
        }

        #[test]
        fn as_vec_flattens() {
            assert_eq!(StopSequence::from("x").as_vec(), vec!["x"]);
            assert_eq!(StopSequence::from(vec!["a", "b"]).as_vec(), vec!["a", "b"]);
        }
    }

    mod function_call_directive {
        use super::*;

        #[test]
        fn mode_encodes_as_string() {
            let value = serde_json::to_value(FunctionCallDirective::auto()).unwrap();
            assert_eq!(value, json!("auto"));
        }

        #[test]
        fn named_encodes_as_object() {
            let value = serde_json::to_value(FunctionCallDirective::named("get_time")).unwrap();
            assert_eq!(value, json!({"name": "get_time"}));
        }

        #[test]
        fn decoding_distinguishes_shapes() {
            let mode: FunctionCallDirective = serde_json::from_value(json!("none")).unwrap();
            assert_eq!(mode, FunctionCallDirective::none());

            let value: FunctionCallDirective =
                serde_json::from_value(json!({"name": "search"})).unwrap();
            assert_eq!(value, FunctionCallDirective::named("search"));
        }

        #[test]
        fn from_json_string_is_mode() {
            assert_eq!(
                FunctionCallDirective::from(json!("auto")),
                FunctionCallDirective::auto()
            );
        }
    }

    mod chat_completion_request {
        use super::*;

        #[test]
        fn defaults_are_written() {
            let value = serde_json::to_value(ChatCompletionRequest::new("gpt-3.5-turbo")).unwrap();
            assert_eq!(
                value,
                json!({
                    "model": "gpt-3.5-turbo",
                    "messages": [],
                    "temperature": 1.0,
                    "top_p": 1.0,
                    "n": 1,
                    "stream": false,
                    "presence_penalty": 0.0,
                    "frequency_penalty": 0.0
                })
            );
        }

        #[test]
        fn num_completions_is_renamed() {
            let value =
                serde_json::to_value(ChatCompletionRequest::new("m").num_completions(3)).unwrap();
            assert_eq!(value["n"], 3);
            assert!(value.get("num_completions").is_none());
        }

        #[test]
        fn missing_fields_take_defaults() {
            let request: ChatCompletionRequest =
                serde_json::from_value(json!({"model": "m"})).unwrap();
            assert_eq!(request, ChatCompletionRequest::new("m"));
        }

        #[test]
        fn builder_sets_fields() {
            let mut bias = HashMap::new();
            bias.insert("50256".to_owned(), -100.0);

            let request = ChatCompletionRequest::new("m")
                .system("be brief")
                .user("hi")
                .max_tokens(16)
                .temperature(0.5)
                .top_p(0.9)
                .stream(true)
                .presence_penalty(0.1)
                .frequency_penalty(0.2)
                .logit_bias(bias)
                .user_id("user-1")
                .functions(vec![ChatFunction::new("f", json!({"type": "object"}))])
                .function_call("auto");

            assert_eq!(request.messages.len(), 2);
            assert!(request.has_functions());

            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["max_tokens"], 16);
            assert_eq!(value["temperature"], 0.5);
            assert_eq!(value["stream"], true);
            assert_eq!(value["logit_bias"]["50256"], -100.0);
            assert_eq!(value["user"], "user-1");
            assert_eq!(value["functions"][0]["name"], "f");
            assert_eq!(value["function_call"], "auto");
        }

        #[test]
        fn round_trips() {
            let request = ChatCompletionRequest::new("m")
                .user("hi")
                .stop(vec!["A", "B"])
                .function_call(FunctionCallDirective::named("f"));
            let text = serde_json::to_string(&request).unwrap();
            let back: ChatCompletionRequest = serde_json::from_str(&text).unwrap();
            assert_eq!(back, request);
        }

        #[test]
        fn invalid_message_fails_encoding() {
            let request =
                ChatCompletionRequest::new("m").message(ChatMessage::new(
                    crate::message::ChatMessageRole::Function,
                    "{}",
                ));
            assert!(serde_json::to_string(&request).is_err());
        }
    }
}
