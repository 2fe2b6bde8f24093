//! No-op observability stubs
//!
//! Used when the datadog feature is disabled: no trace pipeline, so the
//! context reader never reports an active trace.

use tracing_subscriber::fmt::MakeWriter;

use crate::config::DatadogConfig;
use crate::context::AbsentContext;

/// Reader matching the enabled trace pipeline
#[inline(always)]
pub fn context_reader() -> AbsentContext {
    AbsentContext
}

/// Basic fmt subscriber writing to `make_writer`
pub fn subscriber<W>(config: &DatadogConfig, make_writer: W) -> Box<dyn tracing::Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(make_writer);
    if config.logs_injection {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    }
}

/// No-op tracing initialization - basic fmt subscriber on stderr
pub fn init_tracing(config: &DatadogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::subscriber::set_global_default(subscriber(config, std::io::stderr))?;
    Ok(())
}

/// No-op shutdown
#[inline(always)]
pub fn shutdown() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TraceContextReader;
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reader_is_absent() {
        assert!(!context_reader().current().is_valid());
    }

    #[test]
    fn test_subscriber_uses_given_writer() {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let config = DatadogConfig {
            logs_injection: true,
            ..DatadogConfig::default()
        };

        tracing::subscriber::with_default(subscriber(&config, move || writer.clone()), || {
            tracing::warn!(answer = 42, "diagnostic line");
        });

        let out = String::from_utf8(buffer.0.lock().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(line["fields"]["message"], "diagnostic line");
        assert_eq!(line["fields"]["answer"], 42);
    }
}
