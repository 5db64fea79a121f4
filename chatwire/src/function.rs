//! Function descriptors advertised to the model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description of a callable function, embedded verbatim in a request's
/// `functions` array.
///
/// ```json
/// {
///     "name": "get_weather",
///     "description": "Current weather for a city",
///     "parameters": { "type": "object", "properties": { ... } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunction {
    /// Name the model uses to call the function.
    pub name: String,

    /// JSON Schema of the function's input.
    pub parameters: Value,

    /// What the function does; helps the model decide when to call it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChatFunction {
    /// Create a descriptor without a description.
    #[must_use]
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            parameters,
            description: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the function name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_parameters() -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string" }
            },
            "required": ["city"]
        })
    }

    #[test]
    fn description_is_omitted_when_absent() {
        let function = ChatFunction::new("get_weather", sample_parameters());
        let value = serde_json::to_value(&function).unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(value["parameters"], sample_parameters());
    }

    #[test]
    fn description_is_written_when_set() {
        let function =
            ChatFunction::new("get_weather", sample_parameters()).with_description("Weather now");
        let value = serde_json::to_value(&function).unwrap();
        assert_eq!(value["description"], "Weather now");
        assert_eq!(function.description(), Some("Weather now"));
    }

    #[test]
    fn parameters_accept_arbitrary_json() {
        let raw = json!({
            "name": "anything",
            "parameters": {"nested": [1, {"deep": true}], "x": null}
        });
        let function: ChatFunction = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(function.name(), "anything");
        assert_eq!(serde_json::to_value(&function).unwrap(), raw);
    }
}
