//! FileDestination - appends JSON lines to a file

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use contracts::{ContractError, Destination, OutputChain, RepeatableBatch};
use tracing::{debug, error, instrument};

use super::line::{self, TimeFormat};

/// Configuration for FileDestination
#[derive(Debug, Clone)]
pub struct FileDestinationConfig {
    /// Output file, created if missing, appended to otherwise
    pub path: PathBuf,
    /// Event time rendering
    pub time_format: TimeFormat,
}

impl FileDestinationConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| "missing 'path' parameter".to_string())?;
        let time_format = TimeFormat::from_param(params.get("time_format").map(String::as_str))?;

        Ok(Self { path, time_format })
    }
}

/// Destination that appends events to a file as JSON lines
pub struct FileDestination {
    name: String,
    config: FileDestinationConfig,
    writer: Mutex<BufWriter<File>>,
}

impl FileDestination {
    /// Create a new FileDestination
    pub fn new(name: impl Into<String>, config: FileDestinationConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        let name = name.into();
        debug!(destination = %name, path = %config.path.display(), "FileDestination opened");

        Ok(Self {
            name,
            config,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = FileDestinationConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("{name}.params"), e))?;
        Self::new(&name, config)
            .map_err(|e| ContractError::destination_connection(&name, e.to_string()))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.config.path
    }

    fn write_batch(&self, tag: &str, batch: &RepeatableBatch) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for event in batch.events().iter() {
            let encoded = line::encode(tag, event, self.config.time_format)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{encoded}")?;
        }
        Ok(())
    }

    fn persist_batch(&self, tag: &str, batch: &RepeatableBatch) -> Result<(), ContractError> {
        self.write_batch(tag, batch).map_err(|e| {
            error!(destination = %self.name, tag = %tag, error = %e, "Write failed");
            ContractError::destination_write(&self.name, e.to_string())
        })
    }
}

impl Destination for FileDestination {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_destination_emit",
        skip(self, batch, chain),
        fields(destination = %self.name, events = batch.len())
    )]
    fn emit(
        &self,
        tag: &str,
        batch: &RepeatableBatch,
        chain: &mut dyn OutputChain,
    ) -> Result<(), ContractError> {
        self.persist_batch(tag, batch)?;
        chain.advance()
    }

    #[instrument(name = "file_destination_flush", skip(self))]
    fn flush(&self) -> Result<(), ContractError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .flush()
            .map_err(|e| ContractError::destination_write(&self.name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Event, NullOutputChain, Record};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_file_destination_write() {
        let dir = tempdir().unwrap();
        let config = FileDestinationConfig {
            path: dir.path().join("nested").join("out.jsonl"),
            time_format: TimeFormat::Rfc3339,
        };

        let destination = FileDestination::new("test_file", config).unwrap();
        let mut record = Record::new();
        record.insert("a".into(), json!(1));
        let batch = RepeatableBatch::from_events(vec![Event::new(0, record)]);

        destination.emit("app.log", &batch, &mut NullOutputChain).unwrap();
        destination.emit("app.log", &batch, &mut NullOutputChain).unwrap();
        destination.flush().unwrap();

        let content = fs::read_to_string(destination.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"tag":"app.log","time":"1970-01-01T00:00:00Z","record":{"a":1}}"#
        );
    }

    #[test]
    fn test_missing_path_param() {
        let err = FileDestination::from_params("archive", &HashMap::new())
            .err()
            .unwrap();
        assert!(err.to_string().contains("missing 'path'"), "got: {err}");
    }
}
