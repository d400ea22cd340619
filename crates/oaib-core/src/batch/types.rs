//! Data types for batch processing.

use crate::batch::error::ItemError;
use oaib_abstraction::ChatMessage;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Duration;

/// Keys written by [`Success`] itself. Caller data under these keys is shadowed.
pub const RESERVED_KEYS: [&str; 3] = ["input", "response", "result"];

/// One unit of work: a conversation plus caller data carried through to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Conversation sent verbatim to the generation client.
    pub messages: Vec<ChatMessage>,
    /// Caller-defined fields (e.g. an expected solution used for scoring later).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl BatchItem {
    /// Create an item without caller data.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages, data: Map::new() }
    }

    /// Create an item holding a single user turn.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::user(prompt)])
    }

    /// Attach a caller-defined field.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Content of the last message, which is what progress previews show.
    pub fn last_message_content(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

/// A successfully processed item.
///
/// Serializes as `{ ...input.data, input, response, result }`: caller data is
/// flattened at the top level and the three standard fields win on collision.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<P> {
    /// Position of the item in the submitted sequence.
    pub index: usize,
    /// The originating item.
    pub input: BatchItem,
    /// Messages echoed back by the provider.
    pub response: Vec<ChatMessage>,
    /// Value returned by the post-processor.
    pub result: P,
}

impl<P> Success<P> {
    /// Caller data that survives the merge, i.e. every key not in [`RESERVED_KEYS`].
    pub fn extra_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.input.data.iter().filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
    }

    /// Look up a merged caller field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        if RESERVED_KEYS.contains(&key) {
            return None;
        }
        self.input.data.get(key)
    }
}

impl<P: Serialize> Serialize for Success<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.extra_fields().count() + RESERVED_KEYS.len();
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in self.extra_fields() {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("input", &self.input)?;
        map.serialize_entry("response", &self.response)?;
        map.serialize_entry("result", &self.result)?;
        map.end()
    }
}

/// An item that failed, with its cause.
#[derive(Debug)]
pub struct Failure {
    /// Position of the item in the submitted sequence.
    pub index: usize,
    /// The originating item.
    pub item: BatchItem,
    /// Why it failed.
    pub error: ItemError,
}

impl Serialize for Failure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("item", &self.item)?;
        map.serialize_entry("error", &self.error.to_string())?;
        map.serialize_entry("kind", self.error.kind())?;
        map.end()
    }
}

/// Terminal result of one task.
#[derive(Debug)]
pub enum TaskOutcome<P> {
    Success(Success<P>),
    Failure(Failure),
}

impl<P> TaskOutcome<P> {
    /// Position of the item in the submitted sequence.
    pub fn index(&self) -> usize {
        match self {
            Self::Success(success) => success.index,
            Self::Failure(failure) => failure.index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Result of a batch run.
///
/// Both sequences are in completion order, not input order. Use the `index`
/// field of each entry to relate it back to the submitted items.
#[derive(Debug, Serialize)]
pub struct BatchReport<P> {
    /// Successfully processed items.
    pub successes: Vec<Success<P>>,
    /// Failed items with their causes.
    pub failures: Vec<Failure>,
    /// Wall-clock duration of the run.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl<P> BatchReport<P> {
    /// A report with no entries.
    pub fn empty() -> Self {
        Self { successes: Vec::new(), failures: Vec::new(), elapsed: Duration::ZERO }
    }

    /// Get total number of items processed.
    pub fn total_items(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all items were successful.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Success rate as a percentage (0.0 to 100.0). An empty report scores 0.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_items();
        if total == 0 {
            return 0.0;
        }
        (self.successes.len() as f64 / total as f64) * 100.0
    }
}
