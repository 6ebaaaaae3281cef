//! LogDestination - logs batch summary via tracing

use contracts::{ContractError, Destination, OutputChain, RepeatableBatch};
use tracing::{debug, info, instrument};

/// Destination that logs batch summaries for debugging
pub struct LogDestination {
    name: String,
}

impl LogDestination {
    /// Create a new LogDestination with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch_summary(&self, tag: &str, batch: &RepeatableBatch) {
        let events = batch.events();
        let first_time = events.first().map(|e| e.time);
        let last_time = events.last().map(|e| e.time);

        info!(
            destination = %self.name,
            tag = %tag,
            events = events.len(),
            first_time = ?first_time,
            last_time = ?last_time,
            "Batch received"
        );

        for event in events.iter() {
            debug!(
                destination = %self.name,
                tag = %tag,
                time = event.time,
                fields = event.record.len(),
                "Event"
            );
        }
    }
}

impl Destination for LogDestination {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_destination_emit",
        skip(self, batch, chain),
        fields(destination = %self.name)
    )]
    fn emit(
        &self,
        tag: &str,
        batch: &RepeatableBatch,
        chain: &mut dyn OutputChain,
    ) -> Result<(), ContractError> {
        self.log_batch_summary(tag, batch);
        chain.advance()
    }
}
