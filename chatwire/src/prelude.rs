//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use chatwire::prelude::*;
//! ```

pub use crate::codec::{decode, encode};
pub use crate::error::{BoxError, Error, Result};
pub use crate::function::ChatFunction;
pub use crate::message::{ChatFunctionCall, ChatMessage, ChatMessageRole};
pub use crate::registry::{Function, FunctionRegistry, schema_for};
pub use crate::request::{ChatCompletionRequest, FunctionCallDirective, StopSequence};
pub use crate::response::{
    ChatCompletionChoice, ChatCompletionResponse, ContentFilterResult, ContentFilterResults,
    FinishReason, PromptAnnotation,
};
pub use crate::stream::{
    ChatCompletionStreamChoice, ChatCompletionStreamChoiceDelta, ChatCompletionStreamResponse,
    ChatFunctionCallDelta, StreamAggregator,
};
pub use crate::usage::Usage;
