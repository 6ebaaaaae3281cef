//! `run` command implementation.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use contracts::{ContractError, EventStream, FanoutConfig, NullOutputChain};
use dispatcher::{Coordinator, CopyMode, DestinationRegistry};

use crate::cli::RunArgs;
use crate::error::{self, CliError};
use crate::pipeline::{JsonLineReader, RunStats};

/// Execute the `run` command
pub fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut config = error::load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if args.deep_copy && !config.deep_copy {
        info!("Forcing deep-copy mode from CLI");
        config.deep_copy = true;
    }

    info!(
        stores = config.stores.len(),
        deep_copy = config.deep_copy,
        tag = %args.tag,
        "Configuration loaded"
    );

    let registry = DestinationRegistry::with_builtins();
    let coordinator = Coordinator::configure(&config, &registry).map_err(CliError::from)?;

    // Dry run - destinations are built, nothing is read
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config, &coordinator, &args.tag);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let source = args
        .input
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| CliError::input(path.display().to_string(), e))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    info!("Starting dispatch...");
    let stats = dispatch_all(&coordinator, reader, &source, args)?;

    info!(
        batches = stats.emits.total_batches,
        events = stats.emits.total_events,
        failed = stats.emits.failed_batches,
        duration_secs = stats.duration.as_secs_f64(),
        "Dispatch completed"
    );
    stats.print_summary();

    Ok(())
}

/// Feed every input batch through the coordinator
///
/// Batches go in as streams; the coordinator drains each one before any
/// destination runs.
fn dispatch_all<R: BufRead>(
    coordinator: &Coordinator,
    reader: R,
    source: &str,
    args: &RunArgs,
) -> crate::error::Result<RunStats> {
    let started = Instant::now();
    let mut reader = JsonLineReader::new(reader, args.batch_size);
    let mut stats = RunStats::default();

    while let Some(stream) = reader
        .next_batch()
        .map_err(|e| CliError::input(source, e))?
    {
        let batch = stats.emits.total_batches + 1;

        let drained = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&drained);
        let stream = EventStream::new(stream.inspect(move |item| {
            if item.is_ok() {
                counter.set(counter.get() + 1);
            }
        }));

        match coordinator.emit(&args.tag, stream, &mut NullOutputChain) {
            Ok(()) => stats.emits.update(drained.get(), true),
            Err(e) if args.continue_on_error => {
                warn!(batch, error = %e, "Batch failed, continuing");
                // a source failure discards the batch before any destination runs
                let delivered = match e {
                    ContractError::Source { .. } => 0,
                    _ => drained.get(),
                };
                stats.emits.update(delivered, false);
            }
            Err(e) => return Err(CliError::batch_failed(batch, e.to_string())),
        }
    }

    debug!(lines = reader.line_number(), "Input exhausted");

    coordinator
        .flush()
        .map_err(|e| CliError::flush(e.to_string()))?;
    stats.destinations = coordinator.metrics();
    stats.duration = started.elapsed();
    Ok(stats)
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &FanoutConfig, coordinator: &Coordinator, tag: &str) {
    println!("\n=== Configuration Summary ===\n");
    println!(
        "Copy mode: {}",
        match coordinator.copy_mode() {
            CopyMode::Shared => "shared",
            CopyMode::DeepCopy => "deep copy",
        }
    );
    println!("\nStores ({}):", config.stores.len());
    for route in coordinator.routes() {
        println!(
            "  - {} [{}] -> {}",
            route.name(),
            route.rule(),
            route.rule().apply(tag)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Destination, OutputChain, RepeatableBatch};
    use dispatcher::MemoryDestination;
    use std::path::PathBuf;

    struct Rejecting;

    impl Destination for Rejecting {
        fn name(&self) -> &str {
            "rejecting"
        }

        fn emit(
            &self,
            _tag: &str,
            _batch: &RepeatableBatch,
            _chain: &mut dyn OutputChain,
        ) -> std::result::Result<(), ContractError> {
            Err(ContractError::destination_write("rejecting", "disk full"))
        }
    }

    fn args(continue_on_error: bool) -> RunArgs {
        RunArgs {
            config: PathBuf::from("fanout.toml"),
            tag: "app".into(),
            input: None,
            batch_size: 2,
            deep_copy: false,
            continue_on_error,
            dry_run: false,
            metrics_port: 0,
        }
    }

    #[test]
    fn test_dispatch_all_counts_batches() {
        let memory = MemoryDestination::new("m");
        let recorder = memory.recorder();
        let coordinator = Coordinator::default().with_destination(memory, None);

        let input = "{\"a\":1}\n{\"a\":2}\n{\"time\":7,\"record\":{\"a\":3}}\n";
        let stats = dispatch_all(&coordinator, input.as_bytes(), "test", &args(false)).unwrap();

        assert_eq!(stats.emits.total_batches, 2);
        assert_eq!(stats.emits.total_events, 3);
        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.events()[2].0, 7);
        assert_eq!(stats.destinations[0].1.emit_count, 2);
    }

    #[test]
    fn test_bad_batch_aborts_without_continue() {
        let coordinator = Coordinator::default();
        let err = dispatch_all(&coordinator, "oops\n".as_bytes(), "test", &args(false)).unwrap_err();
        assert!(matches!(err, CliError::BatchFailed { batch: 1, .. }));
    }

    #[test]
    fn test_bad_batch_skipped_with_continue() {
        let memory = MemoryDestination::new("m");
        let recorder = memory.recorder();
        let coordinator = Coordinator::default().with_destination(memory, None);

        let input = "oops\n{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n";
        let stats = dispatch_all(&coordinator, input.as_bytes(), "test", &args(true)).unwrap();

        assert_eq!(stats.emits.failed_batches, 1);
        assert_eq!(stats.emits.total_events, 2);
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_failed_batch_counts_events_already_delivered() {
        let memory = MemoryDestination::new("m");
        let recorder = memory.recorder();
        let coordinator = Coordinator::default()
            .with_destination(memory, None)
            .with_destination(Rejecting, None);

        let input = "{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n";
        let stats = dispatch_all(&coordinator, input.as_bytes(), "test", &args(true)).unwrap();

        assert_eq!(stats.emits.failed_batches, 2);
        assert_eq!(stats.emits.total_events, 3);
        assert_eq!(recorder.len(), 3);
    }
}
