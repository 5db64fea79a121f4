//! Function registry and dispatcher.
//!
//! A [`FunctionRegistry`] holds callbacks the model may invoke. Each entry
//! pairs an advertised [`ChatFunction`] (name, description, JSON Schema of the
//! input) with a type-erased handler that turns raw argument text into the
//! callback's input type, runs the callback and renders its output as JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatwire::prelude::*;
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Search {
//!     query: String,
//! }
//!
//! let mut registry = FunctionRegistry::new();
//! registry.register("search", "Search the index", |args: Search| {
//!     vec![format!("result for {}", args.query)]
//! });
//!
//! let request = ChatCompletionRequest::new("gpt-3.5-turbo")
//!     .user("find rust books")
//!     .functions(registry.functions());
//!
//! // ... send the request, decode the response ...
//! if let Some(call) = response.function_call() {
//!     let reply = registry.execute(call)?;
//!     next_request = next_request.message(reply);
//! }
//! ```
//!
//! # Name resolution
//!
//! A call is matched against its literal name first. When that fails, the
//! part before the first `.` is dropped and the remainder is tried, so a
//! model that says `functions.search` still reaches `search`. The reply keeps
//! the literal name.
//!
//! # Concurrency
//!
//! The registry is `Send + Sync` but does no locking of its own. Register
//! everything up front, or wrap it in a lock if it changes while in use.

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BoxError, Error, Result};
use crate::function::ChatFunction;
use crate::message::{ChatFunctionCall, ChatMessage};
use crate::response::ChatCompletionResponse;

/// Derive the JSON Schema of `T` as a plain JSON value.
///
/// The `$schema` meta key is dropped; the API has no use for it.
#[must_use]
pub fn schema_for<T: JsonSchema>() -> Value {
    let root = schemars::schema_for!(T);
    let mut schema = serde_json::to_value(&root).unwrap_or_default();
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
    }
    schema
}

/// A function the model can call, implemented as a type.
///
/// For one-off callbacks [`FunctionRegistry::register`] with a closure is
/// usually shorter.
///
/// ```rust,ignore
/// struct Clock;
///
/// impl Function for Clock {
///     type Args = NoArgs;
///     type Output = serde_json::Value;
///     type Error = std::convert::Infallible;
///
///     fn name(&self) -> &str {
///         "get_time"
///     }
///
///     fn call(&self, _args: NoArgs) -> Result<Self::Output, Self::Error> {
///         Ok(serde_json::json!({ "time": "12:00" }))
///     }
/// }
/// ```
pub trait Function: Send + Sync {
    /// Input decoded from the model's arguments.
    type Args: DeserializeOwned + JsonSchema;

    /// Output rendered back to the model.
    type Output: Serialize;

    /// Failure reported by [`Function::call`].
    type Error: Into<BoxError>;

    /// Name the model uses to call the function.
    fn name(&self) -> &str;

    /// What the function does.
    fn description(&self) -> Option<String> {
        None
    }

    /// JSON Schema of the input; derived from [`Function::Args`] by default.
    fn parameters_schema(&self) -> Value {
        schema_for::<Self::Args>()
    }

    /// Run the function.
    ///
    /// # Errors
    ///
    /// Whatever the implementation reports.
    fn call(&self, args: Self::Args) -> std::result::Result<Self::Output, Self::Error>;

    /// Descriptor advertised in requests.
    fn definition(&self) -> ChatFunction {
        ChatFunction {
            name: self.name().to_owned(),
            parameters: self.parameters_schema(),
            description: self.description(),
        }
    }
}

/// Object-safe handler stored in the registry.
trait DynFunction: Send + Sync {
    /// Decode `arguments`, run the callback, and render its output.
    fn call_json(&self, call_name: &str, arguments: &str) -> Result<String>;
}

/// Adapts a [`Function`] implementation.
struct Typed<T>(T);

impl<T: Function> DynFunction for Typed<T> {
    fn call_json(&self, call_name: &str, arguments: &str) -> Result<String> {
        invoke(call_name, arguments, |args| self.0.call(args))
    }
}

/// Adapts a closure over a concrete input and output type.
struct Closure<I, O, E, F> {
    callback: F,
    _marker: PhantomData<fn(I) -> std::result::Result<O, E>>,
}

impl<I, O, E, F> Closure<I, O, E, F> {
    const fn new(callback: F) -> Self {
        Self {
            callback,
            _marker: PhantomData,
        }
    }
}

impl<I, O, E, F> DynFunction for Closure<I, O, E, F>
where
    I: DeserializeOwned,
    O: Serialize,
    E: Into<BoxError>,
    F: Fn(I) -> std::result::Result<O, E> + Send + Sync,
{
    fn call_json(&self, call_name: &str, arguments: &str) -> Result<String> {
        invoke(call_name, arguments, &self.callback)
    }
}

/// Decode, call, encode. The callback never runs if decoding fails.
fn invoke<I, O, E>(
    call_name: &str,
    arguments: &str,
    callback: impl FnOnce(I) -> std::result::Result<O, E>,
) -> Result<String>
where
    I: DeserializeOwned,
    O: Serialize,
    E: Into<BoxError>,
{
    let args: I =
        serde_json::from_str(arguments).map_err(|err| Error::decode(call_name, err.to_string()))?;
    let output = callback(args).map_err(|err| Error::callback(call_name, err))?;
    serde_json::to_string_pretty(&output).map_err(|err| Error::encode(call_name, err.to_string()))
}

struct Entry {
    definition: ChatFunction,
    handler: Box<dyn DynFunction>,
}

/// Named callbacks the model may invoke.
#[derive(Default)]
pub struct FunctionRegistry {
    entries: IndexMap<String, Entry>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infallible callback.
    ///
    /// The input schema is derived from `I`. Registering a name again
    /// replaces the earlier entry.
    pub fn register<I, O, F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        callback: F,
    ) -> &mut Self
    where
        I: DeserializeOwned + JsonSchema + 'static,
        O: Serialize + 'static,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        self.try_register(name, description, move |args: I| {
            Ok::<_, Infallible>(callback(args))
        })
    }

    /// Register a callback that may fail.
    ///
    /// A callback error is returned from [`FunctionRegistry::execute`] as
    /// [`Error::Callback`].
    pub fn try_register<I, O, E, F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        callback: F,
    ) -> &mut Self
    where
        I: DeserializeOwned + JsonSchema + 'static,
        O: Serialize + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(I) -> std::result::Result<O, E> + Send + Sync + 'static,
    {
        self.register_with_schema(name, description, schema_for::<I>(), callback)
    }

    /// Register a callback with a hand-written parameter schema.
    ///
    /// The schema is advertised as is; `I` only needs to deserialize.
    pub fn register_with_schema<I, O, E, F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        callback: F,
    ) -> &mut Self
    where
        I: DeserializeOwned + 'static,
        O: Serialize + 'static,
        E: Into<BoxError> + 'static,
        F: Fn(I) -> std::result::Result<O, E> + Send + Sync + 'static,
    {
        let name = name.into();
        let definition =
            ChatFunction::new(name.clone(), parameters).with_description(description);
        self.insert(
            name,
            Entry {
                definition,
                handler: Box::new(Closure::new(callback)),
            },
        );
        self
    }

    /// Register a [`Function`] implementation under its own name.
    pub fn register_function<T: Function + 'static>(&mut self, function: T) -> &mut Self {
        let definition = function.definition();
        self.insert(
            definition.name.clone(),
            Entry {
                definition,
                handler: Box::new(Typed(function)),
            },
        );
        self
    }

    fn insert(&mut self, name: String, entry: Entry) {
        // Re-registration moves the entry to the end of the advertised list.
        if self.entries.shift_remove(&name).is_some() {
            tracing::debug!(target: "chatwire", function = %name, "replacing registered function");
        } else {
            tracing::debug!(target: "chatwire", function = %name, "registered function");
        }
        self.entries.insert(name, entry);
    }

    /// Remove a function. Returns `true` if it was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.shift_remove(name).is_some()
    }

    /// Descriptors of all registered functions, in registration order.
    #[must_use]
    pub fn functions(&self) -> Vec<ChatFunction> {
        self.entries
            .values()
            .map(|entry| entry.definition.clone())
            .collect()
    }

    /// Descriptor of one function.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ChatFunction> {
        self.entries.get(name).map(|entry| &entry.definition)
    }

    /// Names of all registered functions, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Check whether a call name would resolve.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name).or_else(|| {
            name.split_once('.')
                .and_then(|(_, rest)| self.entries.get(rest))
        })
    }

    /// Run the function the model asked for.
    ///
    /// Returns a `function` message named after the call, whose content is
    /// the pretty-printed JSON output of the callback.
    ///
    /// # Errors
    ///
    /// - [`Error::FunctionNotFound`] if neither the literal nor the
    ///   namespace-stripped name is registered;
    /// - [`Error::Decode`] if the arguments do not fit the input type (the
    ///   callback is not invoked);
    /// - [`Error::Callback`] if the callback fails;
    /// - [`Error::Encode`] if the output cannot be rendered as JSON.
    pub fn execute(&self, call: &ChatFunctionCall) -> Result<ChatMessage> {
        let entry = self
            .resolve(&call.name)
            .ok_or_else(|| Error::function_not_found(&call.name))?;

        let arguments = call.arguments_text();
        tracing::debug!(
            target: "chatwire",
            function = %call.name,
            resolved = %entry.definition.name,
            "executing function"
        );
        tracing::trace!(target: "chatwire", function = %call.name, %arguments, "function arguments");

        let content = entry.handler.call_json(&call.name, &arguments)?;
        Ok(ChatMessage::function(call.name.clone(), content))
    }

    /// Run every function call found in a response's choices, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing call and returns its error.
    pub fn execute_all(&self, response: &ChatCompletionResponse) -> Result<Vec<ChatMessage>> {
        response
            .choices
            .iter()
            .filter_map(|choice| choice.message.function_call.as_ref())
            .map(|call| self.execute(call))
            .collect()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish_non_exhaustive()
    }
}
