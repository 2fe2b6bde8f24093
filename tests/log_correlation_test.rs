//! Trace-Correlated Logging Tests
//!
//! Exercises the trace decorator through the public API over both the
//! in-memory and the JSON Lines sinks.

use otel_dbm::attr::{Attr, AttrValue};
use otel_dbm::context::{FixedContext, TraceContext, TraceContextReader};
use otel_dbm::log::{
    JsonSink, Level, LogRecord, LogSink, Logger, MemorySink, TraceSink, TraceSinkConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;

fn json_lines(sink: &JsonSink<Vec<u8>>) -> Vec<Value> {
    sink.with_writer(|buf| {
        String::from_utf8_lossy(buf)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    })
}

#[test]
fn test_invalid_context_preserves_attribute_set() {
    let memory = MemorySink::new();
    let logger = Logger::new(TraceSink::with_defaults(memory.clone()));

    logger.info(
        &TraceContext::invalid(),
        "no trace",
        [Attr::new("a", 1i64), Attr::new("b", "x")],
    );

    let captured = memory.last().unwrap();
    assert_eq!(captured.attrs, vec![Attr::new("a", 1i64), Attr::new("b", "x")]);
}

#[test]
fn test_valid_context_adds_exactly_default_keys() {
    let memory = MemorySink::new();
    let logger = Logger::new(TraceSink::with_defaults(memory.clone()));
    let cx = TraceContext::new(0xabc, 0xdef, false);

    logger.error(&cx, "query failed", [Attr::new("error", "timeout")]);

    let captured = memory.last().unwrap();
    assert_eq!(captured.keys(), vec!["error", "trace_id", "span_id", "trace_sampled"]);
    assert_eq!(
        captured.get("trace_id"),
        Some(&AttrValue::from("00000000000000000000000000000abc"))
    );
    assert_eq!(captured.get("span_id"), Some(&AttrValue::from("0000000000000def")));
    assert_eq!(captured.get("trace_sampled"), Some(&AttrValue::Bool(false)));
}

#[test]
fn test_configured_keys_replace_defaults() {
    let memory = MemorySink::new();
    let config = TraceSinkConfig::default()
        .with_trace_id_key("dd.trace_id")
        .with_span_id_key("dd.span_id")
        .with_trace_sampled_key("dd.sampled");
    let logger = Logger::new(TraceSink::new(memory.clone(), &config));

    logger.info(&TraceContext::new(1, 2, true), "m", []);

    assert_eq!(
        memory.last().unwrap().keys(),
        vec!["dd.trace_id", "dd.span_id", "dd.sampled"]
    );
}

#[test]
fn test_json_output_carries_trace_fields() {
    let base = JsonSink::new(Vec::new(), Level::Info);
    let sink = TraceSink::with_defaults(base.clone());
    let reader = FixedContext(TraceContext::new(1, 2, true));

    sink.handle(
        &reader.current(),
        LogRecord::new(Level::Info, "Computing product review statistics"),
    )
    .unwrap();

    let out = json_lines(&base);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["msg"], json!("Computing product review statistics"));
    assert_eq!(out[0]["trace_id"], json!("00000000000000000000000000000001"));
    assert_eq!(out[0]["span_id"], json!("0000000000000002"));
    assert_eq!(out[0]["trace_sampled"], json!(true));
}

#[test]
fn test_group_applies_to_trace_fields() {
    let base = JsonSink::new(Vec::new(), Level::Info);
    let sink = TraceSink::with_defaults(base.clone())
        .with_attrs(vec![Attr::new("service", "api")])
        .with_group("request");

    sink.handle(
        &TraceContext::new(1, 2, false),
        LogRecord::new(Level::Info, "handled").with_attr("status", 200i64),
    )
    .unwrap();

    let out = json_lines(&base);
    assert_eq!(out[0]["service"], json!("api"));
    assert_eq!(
        out[0]["request"],
        json!({
            "status": 200,
            "trace_id": "00000000000000000000000000000001",
            "span_id": "0000000000000002",
            "trace_sampled": false,
        })
    );
}

#[test]
fn test_derivation_does_not_touch_original() {
    let base = JsonSink::new(Vec::new(), Level::Info);
    let sink = TraceSink::with_defaults(base.clone());
    let _grouped = sink.with_group("g").with_attrs(vec![Attr::new("x", 1i64)]);

    sink.handle(&TraceContext::new(3, 4, true), LogRecord::new(Level::Info, "plain"))
        .unwrap();

    let out = json_lines(&base);
    let obj = out[0].as_object().unwrap();
    let keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["time", "level", "msg", "trace_id", "span_id", "trace_sampled"]
    );
}

#[test]
fn test_json_fields_keep_record_order() {
    let base = JsonSink::new(Vec::new(), Level::Info);
    let logger = Logger::new(TraceSink::with_defaults(base.clone()));

    logger.info(
        &TraceContext::new(5, 6, true),
        "ordered",
        [Attr::new("zeta", 1i64), Attr::new("alpha", 2i64)],
    );

    let out = json_lines(&base);
    let keys: Vec<&str> = out[0].as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["time", "level", "msg", "zeta", "alpha", "trace_id", "span_id", "trace_sampled"]
    );
}

#[test]
fn test_json_source_precedes_message() {
    let base = JsonSink::new(Vec::new(), Level::Info).with_source(true);
    let logger = Logger::new(TraceSink::with_defaults(base.clone()));

    let line = line!() + 1;
    logger.warn(&TraceContext::new(5, 6, true), "located", [Attr::new("k", "v")]);

    let out = json_lines(&base);
    let keys: Vec<&str> = out[0].as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["time", "level", "source", "msg", "k", "trace_id", "span_id", "trace_sampled"]
    );
    assert_eq!(out[0]["source"], json!({"file": file!(), "line": line}));
}

#[test]
fn test_concurrent_logging_keeps_records_separate() {
    let memory = MemorySink::new();
    let logger = Arc::new(Logger::new(TraceSink::with_defaults(memory.clone())));

    let handles: Vec<_> = (1..=8u64)
        .map(|i| {
            let logger = logger.clone();
            thread::spawn(move || {
                let cx = TraceContext::new(i as u128, i, true);
                for n in 0..50i64 {
                    logger.info(&cx, "tick", [Attr::new("worker", i), Attr::new("n", n)]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let records = memory.records();
    assert_eq!(records.len(), 400);
    for record in records {
        let worker = match record.get("worker") {
            Some(AttrValue::U64(w)) => *w,
            other => panic!("unexpected worker attr: {:?}", other),
        };
        assert_eq!(
            record.get("span_id"),
            Some(&AttrValue::Str(format!("{:016x}", worker)))
        );
    }
}
