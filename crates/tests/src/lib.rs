//! # Integration Tests
//!
//! End-to-end checks of the fan-out stage: configuration text in, records
//! observed by in-memory destinations out.

#[cfg(test)]
mod support {
    use std::cell::RefCell;
    use std::rc::Rc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ContractError, Destination, EventTime, OutputChain, Record, RepeatableBatch,
    };
    use dispatcher::{Coordinator, DestinationRegistry, MemoryDestination, MemoryRecorder};
    use serde_json::json;

    /// Adds `foo: bar` to every record it sees, then continues
    pub struct Stamp {
        name: String,
    }

    impl Destination for Stamp {
        fn name(&self) -> &str {
            &self.name
        }

        fn emit(
            &self,
            _tag: &str,
            batch: &RepeatableBatch,
            chain: &mut dyn OutputChain,
        ) -> Result<(), ContractError> {
            for event in batch.events_mut().iter_mut() {
                event.record.insert("foo".into(), json!("bar"));
            }
            chain.advance()
        }
    }

    /// Registry whose `memory` stores report their recorder back to the test
    pub fn registry() -> (DestinationRegistry, Rc<RefCell<Vec<MemoryRecorder>>>) {
        let recorders = Rc::new(RefCell::new(Vec::new()));
        let mut registry = DestinationRegistry::with_builtins();

        let captured = Rc::clone(&recorders);
        registry
            .register("memory", move |name, _| {
                let destination = MemoryDestination::new(name);
                captured.borrow_mut().push(destination.recorder());
                Ok(Box::new(destination))
            })
            .register("stamp", |name, _| {
                Ok(Box::new(Stamp {
                    name: name.to_string(),
                }))
            });
        (registry, recorders)
    }

    /// Build a coordinator from TOML text
    pub fn coordinator(toml: &str) -> (Coordinator, Vec<MemoryRecorder>) {
        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let (registry, recorders) = registry();
        let coordinator = Coordinator::configure(&config, &registry).unwrap();
        let recorders = recorders.borrow().clone();
        (coordinator, recorders)
    }

    pub fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    /// `[(t, {a:1}), (t, {a:2})]`
    pub fn two_events(time: EventTime) -> RepeatableBatch {
        let batch = RepeatableBatch::new();
        batch.push(time, record(json!({"a": 1})));
        batch.push(time, record(json!({"a": 2})));
        batch
    }
}

#[cfg(test)]
mod fanout_tests {
    use super::support::*;

    use contracts::{FnChain, NullOutputChain};
    use dispatcher::{CopyMode, TagRule};
    use serde_json::json;

    const THREE_STORES: &str = r#"
[[stores]]
type = "memory"

[[stores]]
type = "memory"

[[stores]]
type = "memory"
"#;

    #[test]
    fn test_every_store_gets_the_batch() {
        let (coordinator, recorders) = coordinator(THREE_STORES);
        assert_eq!(coordinator.copy_mode(), CopyMode::Shared);

        let mut terminal_calls = 0;
        coordinator
            .emit(
                "test",
                two_events(100),
                &mut FnChain(|| {
                    terminal_calls += 1;
                    Ok(())
                }),
            )
            .unwrap();

        assert_eq!(terminal_calls, 1);
        for recorder in &recorders {
            assert_eq!(recorder.tags(), vec!["test", "test"]);
            assert_eq!(
                recorder.events(),
                vec![
                    (100, record(json!({"a": 1}))),
                    (100, record(json!({"a": 2}))),
                ]
            );
        }
    }

    #[test]
    fn test_shared_mode_mutation_is_visible_downstream() {
        let (coordinator, recorders) = coordinator(
            r#"
[[stores]]
type = "memory"

[[stores]]
type = "stamp"

[[stores]]
type = "memory"
"#,
        );

        let batch = two_events(0);
        coordinator.emit("test", batch.clone(), &mut NullOutputChain).unwrap();

        assert!(recorders[0].events().iter().all(|(_, r)| !r.contains_key("foo")));
        assert!(recorders[1]
            .events()
            .iter()
            .all(|(_, r)| r.get("foo") == Some(&json!("bar"))));
        // the caller's batch is the same shared list
        assert!(batch.events().iter().all(|e| e.record.contains_key("foo")));
    }

    #[test]
    fn test_deep_copy_mode_isolates_stores() {
        let (coordinator, recorders) = coordinator(
            r#"
deep_copy = true

[[stores]]
type = "memory"

[[stores]]
type = "stamp"

[[stores]]
type = "memory"
"#,
        );
        assert_eq!(coordinator.copy_mode(), CopyMode::DeepCopy);

        coordinator.emit("test", two_events(0), &mut NullOutputChain).unwrap();

        for recorder in &recorders {
            assert!(recorder.events().iter().all(|(_, r)| !r.contains_key("foo")));
            assert_eq!(recorder.len(), 2);
        }
    }

    #[test]
    fn test_fixed_tags_per_store() {
        let (coordinator, recorders) = coordinator(
            r#"
[[stores]]
type = "memory"
[stores.filter]
tag = "first"

[[stores]]
type = "memory"
[stores.filter]
tag = "second"
"#,
        );

        coordinator.emit("test", two_events(0), &mut NullOutputChain).unwrap();

        assert_eq!(recorders[0].tags(), vec!["first", "first"]);
        assert_eq!(recorders[1].tags(), vec!["second", "second"]);
    }

    #[test]
    fn test_prefix_and_suffix_rewrites() {
        let (coordinator, recorders) = coordinator(
            r#"
[[stores]]
type = "memory"
[stores.filter]
remove_tag_prefix = "first"

[[stores]]
type = "memory"
[stores.filter]
remove_tag_suffix = "test"

[[stores]]
type = "memory"
[stores.filter]
remove_tag_prefix = "first"
add_tag_prefix = "second"

[[stores]]
type = "memory"
[stores.filter]
add_tag_suffix = ".copy"
"#,
        );

        coordinator
            .emit("first.test", two_events(0), &mut NullOutputChain)
            .unwrap();

        let tags: Vec<String> = recorders.iter().map(|r| r.tags()[0].clone()).collect();
        assert_eq!(
            tags,
            vec!["test", "first", "second.test", "first.test.copy"]
        );
    }

    #[test]
    fn test_non_matching_prefix_leaves_tag() {
        let (coordinator, recorders) = coordinator(
            r#"
[[stores]]
type = "memory"
[stores.filter]
remove_tag_prefix = "orig"
"#,
        );

        coordinator.emit("nomatch", two_events(0), &mut NullOutputChain).unwrap();
        assert_eq!(recorders[0].tags()[0], "nomatch");
    }

    #[test]
    fn test_zero_stores_runs_terminal_only() {
        let (coordinator, recorders) = coordinator("");
        assert!(coordinator.is_empty());
        assert!(recorders.is_empty());

        let mut terminal_calls = 0;
        coordinator
            .emit(
                "test",
                two_events(0),
                &mut FnChain(|| {
                    terminal_calls += 1;
                    Ok(())
                }),
            )
            .unwrap();
        assert_eq!(terminal_calls, 1);
    }

    #[test]
    fn test_compiled_rules_are_deterministic() {
        let toml = r#"
[[stores]]
type = "memory"
[stores.filter]
remove_tag_prefix = "a"
add_tag_suffix = "z"
"#;
        let (first, _) = coordinator(toml);
        let (second, _) = coordinator(toml);

        let rules: Vec<&TagRule> = first.routes().iter().map(|r| r.rule()).collect();
        let again: Vec<&TagRule> = second.routes().iter().map(|r| r.rule()).collect();
        assert_eq!(rules, again);
        assert_eq!(rules[0].apply("a.b"), "b.z");
    }
}

#[cfg(test)]
mod source_tests {
    use super::support::*;

    use contracts::{ContractError, Event, EventStream, FnChain, NullOutputChain};
    use serde_json::json;

    const TWO_STORES: &str = r#"
[[stores]]
type = "memory"

[[stores]]
type = "memory"
"#;

    #[test]
    fn test_streaming_batch_reaches_every_store_in_order() {
        let (coordinator, recorders) = coordinator(TWO_STORES);

        let stream = EventStream::from_events(
            (0..3).map(|i| Event::new(i, record(json!({"seq": i})))),
        );
        coordinator.emit("stream", stream, &mut NullOutputChain).unwrap();

        for recorder in &recorders {
            let times: Vec<i64> = recorder.events().iter().map(|(t, _)| *t).collect();
            assert_eq!(times, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_failing_stream_runs_no_store() {
        let (coordinator, recorders) = coordinator(TWO_STORES);

        let stream = EventStream::new(vec![
            Ok(Event::new(0, record(json!({"a": 1})))),
            Err(ContractError::source("connection reset")),
        ]);
        let mut terminal_ran = false;
        let err = coordinator
            .emit(
                "stream",
                stream,
                &mut FnChain(|| {
                    terminal_ran = true;
                    Ok(())
                }),
            )
            .unwrap_err();

        assert!(matches!(err, ContractError::Source { .. }));
        assert!(recorders.iter().all(|r| r.is_empty()));
        assert!(!terminal_ran);
    }

    #[test]
    fn test_terminal_error_reaches_caller() {
        let (coordinator, recorders) = coordinator(TWO_STORES);

        let err = coordinator
            .emit(
                "test",
                two_events(0),
                &mut FnChain(|| Err(ContractError::Other("downstream full".into()))),
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "downstream full");
        assert!(recorders.iter().all(|r| r.len() == 2));
    }
}

#[cfg(test)]
mod config_tests {
    use super::support::*;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, NullOutputChain};
    use dispatcher::{Coordinator, DispatcherError};
    use std::io::Write;

    #[test]
    fn test_missing_type_names_store_index() {
        let err = ConfigLoader::load_from_str(
            r#"
[[stores]]
type = "memory"

[[stores]]
name = "untyped"
"#,
            ConfigFormat::Toml,
        )
        .unwrap_err();

        assert!(matches!(err, ContractError::MissingStoreType { index: 1 }));
        assert_eq!(err.to_string(), "missing 'type' parameter on store #1");
    }

    #[test]
    fn test_unknown_type_is_rejected_at_configure() {
        let config =
            ConfigLoader::load_from_str("[[stores]]\ntype = \"kafka\"\n", ConfigFormat::Toml)
                .unwrap();
        let (registry, _) = registry();

        let err = Coordinator::configure(&config, &registry).unwrap_err();
        assert!(matches!(err, DispatcherError::UnknownDestinationType { .. }));
    }

    #[test]
    fn test_unknown_filter_key_is_rejected() {
        let err = ConfigLoader::load_from_str(
            "[[stores]]\ntype = \"memory\"\n[stores.filter]\nadd_prefix = \"x\"\n",
            ConfigFormat::Toml,
        )
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_json_config_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.jsonl");

        let config_path = dir.path().join("fanout.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"{{"stores": [
                {{"type": "file", "name": "archive", "params": {{"path": "{}"}},
                  "filter": {{"add_tag_prefix": "archive"}}}},
                {{"type": "memory"}}
            ]}}"#,
            out.display()
        )
        .unwrap();
        drop(file);

        let config = ConfigLoader::load_from_path(&config_path).unwrap();
        let (registry, recorders) = registry();
        let coordinator = Coordinator::configure(&config, &registry).unwrap();

        coordinator
            .emit("app.access", two_events(1_700_000_000), &mut NullOutputChain)
            .unwrap();
        coordinator.flush().unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["tag"], "archive.app.access");
        assert_eq!(recorders.borrow()[0].tags()[0], "app.access");

        let metrics = coordinator.metrics();
        assert_eq!(metrics[0].0, "archive");
        assert_eq!(metrics[1].1.event_count, 2);
    }
}
