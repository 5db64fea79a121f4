//! Chatwire - wire types and function dispatch for chat-completion APIs
//!
//! This crate defines the exact JSON shape of chat completion requests,
//! responses and streaming frames, and a registry that exposes typed Rust
//! callbacks to the model and runs them when the model asks.
//!
//! Transport, SSE framing and retries are left to the caller.

pub mod codec;
pub mod error;
pub mod function;
pub mod message;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod stream;
pub mod usage;

pub use error::{BoxError, Error, Result};
pub use function::ChatFunction;
pub use message::{ChatFunctionCall, ChatMessage, ChatMessageRole};
pub use registry::{Function, FunctionRegistry};
pub use request::{ChatCompletionRequest, FunctionCallDirective, StopSequence};
pub use response::{ChatCompletionChoice, ChatCompletionResponse, FinishReason};
pub use stream::{ChatCompletionStreamResponse, StreamAggregator};
