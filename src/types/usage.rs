//! Token usage accounting.

use serde::{Deserialize, Serialize};
use std::ops::Add;

use super::completion::UsageMetadata;

/// Token usage for one response.
///
/// Each counter is either reported (`Some`) or not reported (`None`). An
/// unreported counter is not the same as a zero count: `Usage::empty()` is
/// the state of a response for which the API sent no usage at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: Option<u32>,
    /// Tokens generated.
    pub completion_tokens: Option<u32>,
    /// Total tokens.
    pub total_tokens: Option<u32>,
}

impl Usage {
    /// Usage with nothing reported.
    pub const fn empty() -> Self {
        Self {
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
        }
    }

    /// Fully populated usage; the total is `prompt + completion`.
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            total_tokens: Some(prompt_tokens.saturating_add(completion_tokens)),
        }
    }

    /// Returns true if any counter was reported.
    pub fn is_reported(&self) -> bool {
        self.prompt_tokens.is_some() || self.completion_tokens.is_some() || self.total_tokens.is_some()
    }

    /// Prompt tokens, zero when unreported.
    pub fn prompt_count(&self) -> u32 {
        self.prompt_tokens.unwrap_or(0)
    }

    /// Completion tokens, zero when unreported.
    pub fn completion_count(&self) -> u32 {
        self.completion_tokens.unwrap_or(0)
    }

    /// Total tokens, zero when unreported.
    pub fn total_count(&self) -> u32 {
        self.total_tokens.unwrap_or(0)
    }
}

impl From<&UsageMetadata> for Usage {
    fn from(metadata: &UsageMetadata) -> Self {
        let prompt_tokens = metadata.prompt_token_count;
        let completion_tokens = metadata.candidates_token_count;
        let total_tokens = metadata.total_token_count.or(match (prompt_tokens, completion_tokens) {
            (Some(prompt), Some(completion)) => Some(prompt.saturating_add(completion)),
            _ => None,
        });

        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

fn add_counter(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (a, b) => a.or(b),
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: add_counter(self.prompt_tokens, rhs.prompt_tokens),
            completion_tokens: add_counter(self.completion_tokens, rhs.completion_tokens),
            total_tokens: add_counter(self.total_tokens, rhs.total_tokens),
        }
    }
}
