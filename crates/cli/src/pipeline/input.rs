//! JSON-lines event input.
//!
//! Each line is either an envelope `{"time": <secs>, "record": {...}}` or a
//! bare object, which is stamped with the current time.

use std::io::BufRead;

use contracts::{ContractError, Event, EventStream, EventTime};
use serde_json::Value;
use tracing::trace;

/// Parse one input line into an event
///
/// `now` is used when the line carries no `time` field.
pub fn parse_line(line: &str, now: EventTime) -> Result<Event, ContractError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| ContractError::source(format!("invalid JSON line: {e}")))?;

    let Value::Object(mut object) = value else {
        return Err(ContractError::source("input line is not a JSON object"));
    };

    let is_envelope = object.contains_key("record")
        && object.keys().all(|key| key == "time" || key == "record");
    if !is_envelope {
        return Ok(Event::new(now, object));
    }

    let time = match object.remove("time") {
        None => now,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| ContractError::source(format!("invalid event time: {n}")))?,
        Some(other) => {
            return Err(ContractError::source(format!(
                "event time must be a number, got {other}"
            )))
        }
    };
    let record = object.remove("record").unwrap_or(Value::Null);
    Ok(Event::from_value(time, record))
}

/// Splits a line-oriented reader into streaming batches
///
/// Lines are read eagerly per chunk but parsed only while the batch is
/// drained, so a bad line fails its batch at dispatch time.
pub struct JsonLineReader<R> {
    reader: R,
    batch_size: usize,
    line_number: usize,
    finished: bool,
}

impl<R: BufRead> JsonLineReader<R> {
    pub fn new(reader: R, batch_size: usize) -> Self {
        Self {
            reader,
            batch_size: batch_size.max(1),
            line_number: 0,
            finished: false,
        }
    }

    /// Lines consumed so far, blank lines included
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next batch of up to `batch_size` events, `None` at end of input
    pub fn next_batch(&mut self) -> Result<Option<EventStream>, ContractError> {
        if self.finished {
            return Ok(None);
        }

        let mut lines = Vec::with_capacity(self.batch_size);
        while lines.len() < self.batch_size {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                self.finished = true;
                break;
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push((self.line_number, trimmed.to_string()));
            }
        }

        if lines.is_empty() {
            return Ok(None);
        }
        trace!(lines = lines.len(), "read input chunk");

        let now = chrono::Utc::now().timestamp();
        Ok(Some(EventStream::new(lines.into_iter().map(
            move |(number, line)| {
                parse_line(&line, now)
                    .map_err(|e| ContractError::source(format!("line {number}: {e}")))
            },
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_envelope() {
        let event = parse_line(r#"{"time": 42, "record": {"a": 1}}"#, 0).unwrap();
        assert_eq!(event.time, 42);
        assert_eq!(event.record.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_parse_bare_object_uses_now() {
        let event = parse_line(r#"{"a": 1, "time": 3}"#, 100).unwrap();
        assert_eq!(event.time, 100);
        assert_eq!(event.record.get("time"), Some(&json!(3)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_line("[1, 2]", 0).is_err());
        assert!(parse_line("not json", 0).is_err());
        assert!(parse_line(r#"{"time": "x", "record": {}}"#, 0).is_err());
    }

    #[test]
    fn test_reader_chunks_and_skips_blank_lines() {
        let input = "{\"a\":1}\n\n{\"a\":2}\n{\"a\":3}\n";
        let mut reader = JsonLineReader::new(input.as_bytes(), 2);

        let first: Vec<_> = reader.next_batch().unwrap().unwrap().collect();
        assert_eq!(first.len(), 2);
        let second: Vec<_> = reader.next_batch().unwrap().unwrap().collect();
        assert_eq!(second.len(), 1);
        assert!(reader.next_batch().unwrap().is_none());
        assert_eq!(reader.line_number(), 4);
    }

    #[test]
    fn test_bad_line_fails_while_draining() {
        let mut reader = JsonLineReader::new("{\"a\":1}\noops\n".as_bytes(), 10);
        let stream = reader.next_batch().unwrap().unwrap();

        let err = contracts::EventBatch::from(stream)
            .ensure_repeatable()
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
