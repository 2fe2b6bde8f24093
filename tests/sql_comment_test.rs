//! SQL Correlation Comment Tests
//!
//! Verifies the DBM comment contract end to end:
//! - pass-through without an active trace
//! - comment block shape, key order and id encodings
//! - quote escaping and non-idempotent re-annotation

use otel_dbm::context::TraceContext;
use otel_dbm::sql::{annotate, CorrelationMetadata, ServiceIdentity, SqlCommenter};
use otel_dbm::DatadogConfig;
use std::sync::Arc;
use std::thread;

const STATEMENTS: &[&str] = &[
    "SELECT 1",
    "",
    "   SELECT current_user   ",
    "SELECT '/*not a comment*/' AS s",
    "SELECT * FROM orders WHERE status = 'completed'",
    "/*dddbs='existing'*/ SELECT 1",
    "SELECT 1;\nSELECT 2;",
];

fn identity() -> ServiceIdentity {
    ServiceIdentity::new("testdb", "otel-go-dbm", "1.0.0")
        .with_resource_attributes("deployment.environment=staging,foo=bar")
}

fn contexts() -> Vec<TraceContext> {
    vec![
        TraceContext::new(1, 2, true),
        TraceContext::new(u128::MAX, u64::MAX, false),
        TraceContext::new(0x0af7651916cd43dd8448eb211c80319c, 0xb7ad6b7169203331, true),
        TraceContext::new(1 << 64, 1 << 32, false),
    ]
}

/// Split an annotated statement into (comment body, rest after the space)
fn split_comment(annotated: &str) -> (&str, &str) {
    assert!(annotated.starts_with("/*"), "missing comment: {}", annotated);
    let end = annotated.find("*/ ").expect("unterminated comment");
    (&annotated[2..end], &annotated[end + 3..])
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[test]
fn test_invalid_context_returns_statement_unchanged() {
    for statement in STATEMENTS {
        let out = annotate(statement, &TraceContext::invalid(), &identity());
        assert_eq!(out, *statement);
    }
}

#[test]
fn test_valid_context_prepends_one_block_and_one_space() {
    for cx in contexts() {
        for statement in STATEMENTS {
            let out = annotate(statement, &cx, &identity());
            let (_, rest) = split_comment(&out);
            assert_eq!(rest, *statement);
        }
    }
}

#[test]
fn test_key_order_and_traceparent_shape() {
    for cx in contexts() {
        let out = annotate("SELECT 1", &cx, &identity());
        let (body, _) = split_comment(&out);

        let keys: Vec<&str> = body
            .split(',')
            .map(|pair| pair.split_once('=').unwrap().0)
            .collect();
        assert_eq!(keys, vec!["dddbs", "dde", "ddps", "ddpv", "traceparent"]);

        let traceparent = body
            .rsplit_once("traceparent='")
            .and_then(|(_, tail)| tail.strip_suffix('\''))
            .unwrap();
        let parts: Vec<&str> = traceparent.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "00");
        assert!(is_lower_hex(parts[1], 32), "{}", parts[1]);
        assert!(is_lower_hex(parts[2], 16), "{}", parts[2]);
        assert_eq!(parts[3], if cx.sampled { "01" } else { "00" });
    }
}

#[test]
fn test_scenario_small_ids() {
    let out = annotate("SELECT 1", &TraceContext::new(1, 2, true), &identity());
    assert!(out.contains(
        "traceparent='00-00000000000000000000000000000001-0000000000000002-01'"
    ));
}

#[test]
fn test_environment_from_resource_attributes() {
    let metadata =
        CorrelationMetadata::resolve(&identity(), &TraceContext::new(1, 2, true)).unwrap();
    assert_eq!(metadata.environment, "staging");

    let out = annotate("SELECT 1", &TraceContext::new(1, 2, true), &identity());
    assert!(out.starts_with("/*dddbs='testdb',dde='staging',ddps='otel-go-dbm',ddpv='1.0.0',"));
}

#[test]
fn test_quotes_are_escaped_and_block_stays_closed() {
    let identity = ServiceIdentity::new("o'db", "svc'", "1'0").with_env("it's");
    let out = annotate("SELECT 1", &TraceContext::new(7, 7, true), &identity);

    assert!(out.starts_with(
        "/*dddbs='o\\'db',dde='it\\'s',ddps='svc\\'',ddpv='1\\'0',traceparent='"
    ));
    assert_eq!(out.matches("/*").count(), 1);
    assert_eq!(out.matches("*/").count(), 1);
    assert!(out.ends_with("*/ SELECT 1"));
}

#[test]
fn test_reannotation_nests_blocks() {
    let cx = TraceContext::new(1, 2, true);
    let once = annotate("SELECT 1", &cx, &identity()).into_owned();
    let twice = annotate(&once, &cx, &identity()).into_owned();

    assert_eq!(twice.matches("traceparent=").count(), 2);
    let (first_body, rest) = split_comment(&twice);
    assert!(first_body.starts_with("dddbs="));
    assert_eq!(rest, once);
}

#[test]
fn test_commenter_from_config() {
    let config = DatadogConfig {
        service_name: "api".to_string(),
        version: "3.1.4".to_string(),
        db_service: "orders".to_string(),
        env: Some("prod".to_string()),
        ..DatadogConfig::default()
    };
    let commenter = SqlCommenter::new(ServiceIdentity::from_config(&config));
    let out = commenter.annotate("SELECT 1", &TraceContext::new(1, 2, false));

    assert_eq!(
        out,
        "/*dddbs='orders',dde='prod',ddps='api',ddpv='3.1.4',\
         traceparent='00-00000000000000000000000000000001-0000000000000002-00'*/ SELECT 1"
    );
}

#[test]
fn test_concurrent_annotation() {
    let commenter = Arc::new(SqlCommenter::new(identity()));

    let handles: Vec<_> = (1..=8u64)
        .map(|i| {
            let commenter = commenter.clone();
            thread::spawn(move || {
                let cx = TraceContext::new(i as u128, i, i % 2 == 0);
                for _ in 0..100 {
                    let out = commenter.annotate("SELECT 1", &cx);
                    assert!(out.contains(&format!("{:016x}", i)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
