//! MemoryDestination - keeps every emitted event in memory

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{ContractError, Destination, EventTime, OutputChain, Record, RepeatableBatch};

/// One event as seen by a destination
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub tag: String,
    pub time: EventTime,
    pub record: Record,
}

/// Shared view of what a MemoryDestination received
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    emissions: Arc<Mutex<Vec<Emission>>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Emission>> {
        self.emissions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every recorded `(tag, time, record)`, in arrival order
    pub fn emissions(&self) -> Vec<Emission> {
        self.lock().clone()
    }

    /// Recorded `(time, record)` pairs
    pub fn events(&self) -> Vec<(EventTime, Record)> {
        self.lock()
            .iter()
            .map(|e| (e.time, e.record.clone()))
            .collect()
    }

    /// Recorded tags, one per event
    pub fn tags(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.tag.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn record(&self, tag: &str, batch: &RepeatableBatch) {
        let mut emissions = self.lock();
        emissions.extend(batch.events().iter().map(|event| Emission {
            tag: tag.to_string(),
            time: event.time,
            record: event.record.clone(),
        }));
    }
}

/// Destination recording events for later inspection
///
/// The snapshot is taken at emit time, so later in-place changes made by
/// other destinations do not show up here.
pub struct MemoryDestination {
    name: String,
    recorder: MemoryRecorder,
}

impl MemoryDestination {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_recorder(name, MemoryRecorder::new())
    }

    /// Record into an existing recorder
    pub fn with_recorder(name: impl Into<String>, recorder: MemoryRecorder) -> Self {
        Self {
            name: name.into(),
            recorder,
        }
    }

    /// Handle to the recorded emissions
    pub fn recorder(&self) -> MemoryRecorder {
        self.recorder.clone()
    }
}

impl Destination for MemoryDestination {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        tag: &str,
        batch: &RepeatableBatch,
        chain: &mut dyn OutputChain,
    ) -> Result<(), ContractError> {
        self.recorder.record(tag, batch);
        chain.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Event, NullOutputChain};
    use serde_json::json;

    #[test]
    fn test_records_tag_and_events() {
        let destination = MemoryDestination::new("c0");
        let recorder = destination.recorder();

        let mut record = Record::new();
        record.insert("a".into(), json!(1));
        let batch = RepeatableBatch::from_events(vec![Event::new(5, record.clone())]);
        destination.emit("first", &batch, &mut NullOutputChain).unwrap();

        assert_eq!(
            recorder.emissions(),
            vec![Emission {
                tag: "first".into(),
                time: 5,
                record,
            }]
        );
        recorder.clear();
        assert!(recorder.is_empty());
    }
}
