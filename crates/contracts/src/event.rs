//! Event - a single timestamped record
//!
//! Records are schema-free; the dispatch stage only cares about how they are
//! owned and copied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered field name -> value mapping
pub type Record = Map<String, Value>;

/// Event time (seconds since the Unix epoch)
pub type EventTime = i64;

/// One entry of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event timestamp
    pub time: EventTime,

    /// Record payload, may be mutated in place by destinations
    pub record: Record,
}

impl Event {
    /// Create a new event
    pub fn new(time: EventTime, record: Record) -> Self {
        Self { time, record }
    }

    /// Create an event from a JSON object value
    ///
    /// Non-object values are wrapped under a `"message"` key.
    pub fn from_value(time: EventTime, value: Value) -> Self {
        let record = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("message".to_string(), other);
                map
            }
        };
        Self { time, record }
    }
}

impl From<(EventTime, Record)> for Event {
    fn from((time, record): (EventTime, Record)) -> Self {
        Self { time, record }
    }
}
