//! Function-calling round trip without a network.
//!
//! Builds a request that advertises two functions, decodes a canned model
//! response that asks for one of them, dispatches the call and prints the
//! follow-up request body.
//!
//! ```bash
//! RUST_LOG=chatwire=debug cargo run --example function_calling
//! ```

#![allow(clippy::print_stdout)]

use chatwire::codec;
use chatwire::prelude::*;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Deserialize, JsonSchema)]
struct NoArgs {}

/// Arguments of the weather lookup.
#[derive(Deserialize, JsonSchema)]
struct WeatherArgs {
    /// City name.
    city: String,
    /// `celsius` or `fahrenheit`.
    #[serde(default)]
    unit: Option<String>,
}

const CANNED_RESPONSE: &str = r#"{
    "id": "chatcmpl-demo",
    "object": "chat.completion",
    "created": 1686000000,
    "model": "gpt-3.5-turbo-0613",
    "choices": [{
        "index": 0,
        "message": {
            "role": "assistant",
            "content": null,
            "function_call": {
                "name": "functions.get_weather",
                "arguments": "{\"city\": \"Lisbon\"}"
            }
        },
        "finish_reason": "function_call"
    }],
    "usage": {"prompt_tokens": 82, "completion_tokens": 18, "total_tokens": 100}
}"#;

fn main() -> chatwire::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = FunctionRegistry::new();
    registry
        .register("get_time", "Current wall-clock time", |_: NoArgs| {
            json!({ "time": "12:00" })
        })
        .register("get_weather", "Current weather for a city", |args: WeatherArgs| {
            json!({
                "city": args.city,
                "temperature": 21,
                "unit": args.unit.unwrap_or_else(|| "celsius".to_owned()),
            })
        });

    let request = ChatCompletionRequest::new("gpt-3.5-turbo-0613")
        .system("You are a helpful assistant.")
        .user("What's the weather in Lisbon?")
        .functions(registry.functions())
        .function_call(FunctionCallDirective::auto());

    println!("=== request ===\n{}", codec::encode_pretty(&request)?);

    let response: ChatCompletionResponse = codec::decode(CANNED_RESPONSE)?;
    if let Some(reason) = response.finish_reason() {
        println!("finish_reason: {reason}");
    }
    println!("usage: {}", response.usage);

    let replies = registry.execute_all(&response)?;
    let mut follow_up = request;
    if let Some(message) = response.message() {
        follow_up = follow_up.message(message.clone());
    }
    for reply in replies {
        follow_up = follow_up.message(reply);
    }

    println!("=== follow-up ===\n{}", codec::encode_pretty(&follow_up)?);
    Ok(())
}
