//! Datadog Observability Module
//!
//! Wires the correlation layer into a real trace pipeline:
//! - Distributed tracing via Datadog APM, with database spans classified
//! - Trace context read from the current `tracing` span
//!
//! # Usage
//!
//! ```rust,ignore
//! use otel_dbm::config::DatadogConfig;
//! use otel_dbm::context::TraceContextReader;
//! use otel_dbm::observability::{context_reader, init_tracing, shutdown};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DatadogConfig::from_env();
//!     init_tracing(&config).expect("Failed to initialize tracing");
//!
//!     let span = tracing::info_span!("sql.conn.query", db.system = "postgresql");
//!     let _guard = span.enter();
//!     let cx = context_reader().current();
//!
//!     // On shutdown
//!     shutdown();
//! }
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DD_SERVICE` | `otel-dbm` | Service name |
//! | `DD_ENV` | unset | Environment tag |
//! | `DD_VERSION` | pkg version | Service version |
//! | `DD_DBM_SERVICE` | `DB_NAME` or `testdb` | Database service in SQL comments |
//! | `DD_TRACE_AGENT_URL` | `http://127.0.0.1:8126` | APM agent URL |
//! | `DD_TRACE_SAMPLE_RATE` | `1.0` | Trace sampling rate |
//! | `DD_LOGS_INJECTION` | `false` | Enable JSON logs |
//! | `DD_LOG_SOURCE` | `true` | Call site in application log lines |
//! | `OTEL_RESOURCE_ATTRIBUTES` | `` | Resource attributes (k1=v1,k2=v2) |

pub mod context;
pub mod processor;
pub mod tracing_setup;

pub use context::{context_reader, from_span_context, OtelContextReader};
pub use tracing_setup::{init as init_tracing, shutdown};
