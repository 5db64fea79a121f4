//! Entry points between wire text and entities.
//!
//! Decoding records the JSON path of the first failing field, so a bad
//! payload reports `choices[0].finish_reason` rather than a bare column
//! number. Encoding a well-formed entity cannot fail; a failure means an
//! entity invariant was broken and is reported as
//! [`Error::InvariantViolation`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Decode JSON text into `T`.
///
/// # Errors
///
/// Returns [`Error::Decode`] naming the failing field path, or the target
/// type when the document itself is malformed.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(path_error::<T>)?;
    deserializer.end().map_err(|err| Error::decode(type_label::<T>(), err.to_string()))?;
    Ok(value)
}

/// Decode an already-parsed JSON value into `T`.
///
/// # Errors
///
/// Returns [`Error::Decode`] naming the failing field path.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(path_error::<T>)
}

/// Encode `value` as compact JSON text.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if the entity refuses to serialize.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| Error::invariant(err.to_string()))
}

/// Encode `value` as pretty-printed JSON text.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if the entity refuses to serialize.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|err| Error::invariant(err.to_string()))
}

/// Encode `value` as a JSON value.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if the entity refuses to serialize.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|err| Error::invariant(err.to_string()))
}

fn path_error<T>(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
    let path = err.path().to_string();
    let context = if path == "." {
        type_label::<T>()
    } else {
        path
    };
    Error::decode(context, err.into_inner().to_string())
}

/// Short type name with module paths removed, generic arguments included:
/// `alloc::vec::Vec<chatwire::message::ChatMessage>` becomes
/// `Vec<ChatMessage>`.
fn type_label<T>() -> String {
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let full = std::any::type_name::<T>();
    let mut label = String::with_capacity(full.len());
    let mut start = 0;
    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '&' | '[' | ']' | '(' | ')' | ';') {
            label.push_str(last_segment(&full[start..i]));
            label.push(c);
            start = i + c.len_utf8();
        }
    }
    label.push_str(last_segment(&full[start..]));
    label
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::message::{ChatMessage, ChatMessageRole};
    use crate::response::ChatCompletionResponse;
    use serde_json::json;

    #[test]
    fn decode_reports_field_path() {
        let raw = r#"{
            "id": "x", "object": "chat.completion", "created": 0, "model": "m",
            "choices": [{"index": 0, "message": {"role": "user", "content": "hi"}, "finish_reason": "done"}],
            "usage": {}
        }"#;
        let err = decode::<ChatCompletionResponse>(raw).unwrap_err();
        match err {
            Error::Decode { context, message } => {
                assert_eq!(context, "choices[0].finish_reason");
                assert!(message.contains("done"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_reports_unknown_enum_path() {
        let err = decode::<ChatMessage>(r#"{"role": "robot", "content": "hi"}"#).unwrap_err();
        assert!(matches!(err, Error::Decode { ref context, .. } if context == "role"));
    }

    #[test]
    fn decode_reports_type_for_syntax_errors() {
        let err = decode::<ChatMessage>("{not json").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn decode_rejects_trailing_garbage() {
        let err = decode::<ChatMessage>(r#"{"role": "user", "content": "hi"} extra"#).unwrap_err();
        assert!(matches!(err, Error::Decode { ref context, .. } if context == "ChatMessage"));
    }

    #[test]
    fn generic_targets_keep_their_arguments() {
        assert_eq!(type_label::<Vec<ChatMessage>>(), "Vec<ChatMessage>");
        assert_eq!(type_label::<Option<ChatMessage>>(), "Option<ChatMessage>");
        assert_eq!(type_label::<(u32, ChatMessage)>(), "(u32, ChatMessage)");
        let err = decode::<Vec<ChatMessage>>("[] extra").unwrap_err();
        assert!(matches!(err, Error::Decode { ref context, .. } if context == "Vec<ChatMessage>"));
    }

    #[test]
    fn decode_value_reports_field_path() {
        let err = decode_value::<ChatMessage>(json!({"role": "user", "content": 5})).unwrap_err();
        assert!(matches!(err, Error::Decode { ref context, .. } if context == "content"));
    }

    #[test]
    fn encode_surfaces_invariant_violations() {
        let msg = ChatMessage::new(ChatMessageRole::Function, "{}");
        let err = encode(&msg).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert!(err.to_string().contains("requires a name"));
    }

    #[test]
    fn encode_round_trips() {
        let msg = ChatMessage::user("hello");
        let text = encode(&msg).unwrap();
        assert_eq!(decode::<ChatMessage>(&text).unwrap(), msg);
        assert!(encode_pretty(&msg).unwrap().contains('\n'));
        assert_eq!(
            encode_value(&msg).unwrap(),
            json!({"role": "user", "content": "hello"})
        );
    }
}
