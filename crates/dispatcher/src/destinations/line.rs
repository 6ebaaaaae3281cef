//! JSON line encoding shared by the stdout and file destinations

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use serde_json::Value;

use contracts::{ContractError, Event, EventTime, Record};

/// How the event time is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// Integer seconds
    #[default]
    Unix,
    /// RFC 3339, UTC
    Rfc3339,
}

impl TimeFormat {
    /// Parse the `time_format` parameter
    pub fn from_param(value: Option<&str>) -> Result<Self, String> {
        match value {
            None | Some("unix") => Ok(Self::Unix),
            Some("rfc3339") => Ok(Self::Rfc3339),
            Some(other) => Err(format!("unknown time_format '{other}'")),
        }
    }

    fn render(self, time: EventTime) -> Value {
        match self {
            Self::Unix => Value::from(time),
            Self::Rfc3339 => match DateTime::from_timestamp(time, 0) {
                Some(dt) => Value::from(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
                None => Value::from(time),
            },
        }
    }
}

#[derive(Serialize)]
struct Line<'a> {
    tag: &'a str,
    time: Value,
    record: &'a Record,
}

/// Encode one event as a JSON line (no trailing newline)
pub(crate) fn encode(tag: &str, event: &Event, format: TimeFormat) -> Result<String, ContractError> {
    let line = Line {
        tag,
        time: format.render(event.time),
        record: &event.record,
    };
    Ok(serde_json::to_string(&line)?)
}
