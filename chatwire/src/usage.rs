//! Token usage reported by the API.
//!
//! The crate only carries this value through a response; bookkeeping across
//! requests is left to the caller, which can sum records with `+` / `+=`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Token usage statistics for one completion.
///
/// ```json
/// { "prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21 }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the generated completion.
    #[serde(default)]
    pub completion_tokens: u32,

    /// Prompt plus completion.
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Create a new usage record; the total is computed.
    #[must_use]
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Returns `true` if no tokens were counted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_tokens == 0 && self.prompt_tokens == 0 && self.completion_tokens == 0
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::fmt::Display for Usage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} prompt + {} completion = {} tokens",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_computes_total() {
        let usage = Usage::new(9, 12);
        assert_eq!(usage.total_tokens, 21);
        assert!(!usage.is_empty());
    }

    #[test]
    fn default_is_empty() {
        assert!(Usage::default().is_empty());
    }

    #[test]
    fn serde_uses_api_names() {
        let json = serde_json::to_value(Usage::new(1, 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3})
        );
    }

    #[test]
    fn serde_default_on_missing_fields() {
        let usage: Usage = serde_json::from_str(r#"{"prompt_tokens": 4}"#).unwrap();
        assert_eq!(usage.prompt_tokens, 4);
        assert_eq!(usage.completion_tokens, 0);
    }

    #[test]
    fn add_and_add_assign() {
        let mut total = Usage::new(1, 1);
        total += Usage::new(2, 3);
        assert_eq!(total, Usage::new(3, 4));
        assert_eq!(Usage::new(1, 0) + Usage::new(0, 1), Usage::new(1, 1));
    }

    #[test]
    fn display() {
        assert_eq!(
            Usage::new(1, 2).to_string(),
            "1 prompt + 2 completion = 3 tokens"
        );
    }
}
