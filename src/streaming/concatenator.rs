//! Combines per-chunk snapshots into one final response.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::types::{
    AssistantMessage, ChatResponse, ChatResponseMetadata, Generation, GenerationMetadata, Role,
};

#[derive(Debug, Default)]
struct SlotBuffer {
    text: String,
    finish_reason: String,
    role: Option<Role>,
    metadata: HashMap<String, Value>,
}

/// Concatenates the generations of successive snapshots slot by slot.
///
/// For each slot:
/// - text fragments are appended in arrival order, with no separator
/// - the last non-empty finish reason wins
/// - the last reported role wins
///
/// Response metadata (usage, model, rate limit) is taken from the last
/// snapshot pushed, or the baseline when nothing was pushed.
#[derive(Debug, Default)]
pub struct MessageConcatenator {
    slots: BTreeMap<u32, SlotBuffer>,
    metadata: ChatResponseMetadata,
    snapshots: usize,
}

impl MessageConcatenator {
    /// Create an empty concatenator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a concatenator whose final response falls back to `metadata`
    /// when no snapshot is pushed.
    pub fn with_metadata(metadata: ChatResponseMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Number of snapshots pushed so far.
    pub fn len(&self) -> usize {
        self.snapshots
    }

    /// Returns true if no snapshot was pushed.
    pub fn is_empty(&self) -> bool {
        self.snapshots == 0
    }

    /// Add one snapshot.
    pub fn push(&mut self, snapshot: &ChatResponse) {
        for generation in &snapshot.results {
            let slot = self.slots.entry(generation.metadata.slot).or_default();
            slot.text.push_str(&generation.output.text);
            if !generation.metadata.finish_reason.is_empty() {
                slot.finish_reason = generation.metadata.finish_reason.clone();
            }
            if generation.metadata.role.is_some() {
                slot.role = generation.metadata.role.clone();
            }
            slot.metadata.extend(
                generation
                    .output
                    .metadata
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone())),
            );
        }

        self.metadata = snapshot.metadata.clone();
        self.snapshots += 1;
    }

    /// Produce the final response, results ordered by slot.
    pub fn finish(self) -> ChatResponse {
        let results = self
            .slots
            .into_iter()
            .map(|(slot, buffer)| Generation {
                output: AssistantMessage {
                    text: buffer.text,
                    metadata: buffer.metadata,
                },
                metadata: GenerationMetadata {
                    slot,
                    finish_reason: buffer.finish_reason,
                    role: buffer.role,
                },
            })
            .collect();

        ChatResponse::new(results, self.metadata)
    }
}

/// Concatenate a complete list of snapshots.
pub fn concatenate(snapshots: &[ChatResponse]) -> ChatResponse {
    let mut concatenator = MessageConcatenator::new();
    for snapshot in snapshots {
        concatenator.push(snapshot);
    }
    concatenator.finish()
}
