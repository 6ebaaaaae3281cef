//! StdoutDestination - one JSON line per event

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use contracts::{ContractError, Destination, OutputChain, RepeatableBatch};
use tracing::instrument;

use super::line::{self, TimeFormat};

/// Destination writing JSON lines to stdout (or any writer)
pub struct StdoutDestination {
    name: String,
    time_format: TimeFormat,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StdoutDestination {
    /// Write to the process stdout
    pub fn new(name: impl Into<String>, time_format: TimeFormat) -> Self {
        Self::with_writer(name, time_format, Box::new(io::stdout()))
    }

    /// Write to an arbitrary writer
    pub fn with_writer(
        name: impl Into<String>,
        time_format: TimeFormat,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            name: name.into(),
            time_format,
            writer: Mutex::new(writer),
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let time_format = TimeFormat::from_param(params.get("time_format").map(String::as_str))
            .map_err(|e| ContractError::config_validation(format!("{name}.time_format"), e))?;
        Ok(Self::new(name, time_format))
    }

    fn write_batch(&self, tag: &str, batch: &RepeatableBatch) -> Result<(), ContractError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for event in batch.events().iter() {
            let encoded = line::encode(tag, event, self.time_format)?;
            writeln!(writer, "{encoded}")
                .map_err(|e| ContractError::destination_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }
}

impl Destination for StdoutDestination {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "stdout_destination_emit",
        skip(self, batch, chain),
        fields(destination = %self.name, events = batch.len())
    )]
    fn emit(
        &self,
        tag: &str,
        batch: &RepeatableBatch,
        chain: &mut dyn OutputChain,
    ) -> Result<(), ContractError> {
        self.write_batch(tag, batch)?;
        chain.advance()
    }

    fn flush(&self) -> Result<(), ContractError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .flush()
            .map_err(|e| ContractError::destination_write(&self.name, e.to_string()))
    }
}
