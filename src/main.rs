//! otel-dbm demo
//!
//! Loads configuration (TOML path as the first argument, otherwise the
//! environment), opens a driver-style query span, logs through the trace
//! decorator and prints the annotated statement. Application log lines and
//! the statement go to stdout; the diagnostic subscriber writes to stderr.

use otel_dbm::context::TraceContextReader;
use otel_dbm::log::{JsonSink, Logger, TraceSink};
use otel_dbm::observability::{context_reader, init_tracing, shutdown};
use otel_dbm::{Attr, DatadogConfig, ServiceIdentity, SqlCommenter};

const DEMO_STATEMENT: &str = "SELECT users.id, COUNT(orders.id) FROM users \
     LEFT JOIN orders ON orders.user_id = users.id GROUP BY users.id LIMIT 50";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match std::env::args().nth(1) {
        Some(path) => DatadogConfig::load(path)?,
        None => DatadogConfig::from_env(),
    };

    init_tracing(&config)?;

    let logger = Logger::new(TraceSink::new(
        JsonSink::stdout(config.log_level).with_source(config.log_source),
        &config.logging,
    ))
    .with([Attr::new("service", config.service_name.as_str())]);
    let commenter = SqlCommenter::new(ServiceIdentity::from_config(&config));
    let reader = context_reader();

    tracing::info!(
        service = %config.service_name,
        env = %config.environment(),
        db_service = %config.db_service,
        "Configuration loaded"
    );

    {
        let span = tracing::info_span!("sql.conn.query", db.system = "postgresql");
        let _guard = span.enter();

        let cx = reader.current();
        let statement = commenter.annotate(DEMO_STATEMENT, &cx);

        logger.info(
            &cx,
            "Executing analytics query",
            [
                Attr::new("db.name", config.db_service.as_str()),
                Attr::new("annotated", statement.len() != DEMO_STATEMENT.len()),
            ],
        );
        println!("{}", statement);
    }

    shutdown();
    Ok(())
}
