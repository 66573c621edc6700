//! Error-report decoration over a base log sink.
//!
//! The decorator sits at the writer seam, below the fmt engine: every entry
//! the engine emits passes through it on the way to the real sink. Entries
//! that parse as JSON objects are inspected, and error-severity entries are
//! rewritten to carry the fields a cloud error-reporting pipeline keys on.
//! Anything else is written through byte-for-byte.

use std::io::{self, Write};

use serde_json::{Map, Value, json};
use tracing_subscriber::fmt::MakeWriter;

use crate::service::ServiceContext;

/// Key for the logger name injected into every entry.
pub const LOGGER_KEY: &str = "logger";
/// Key for the service identity on error entries.
pub const SERVICE_CONTEXT_KEY: &str = "serviceContext";
/// Key for the structured source location on error entries.
pub const SOURCE_LOCATION_KEY: &str = "logging.googleapis.com/sourceLocation";
/// Key for the error-report context on error entries.
pub const CONTEXT_KEY: &str = "context";

// Keys the fmt engine emits that the decoration reads.
const LEVEL_KEY: &str = "level";
const FILENAME_KEY: &str = "filename";
const LINE_NUMBER_KEY: &str = "line_number";
const TARGET_KEY: &str = "target";

const ERROR_LEVEL: &str = "ERROR";

/// Caller metadata lifted from an entry, when the engine captured it.
struct Caller {
    file: String,
    line: u64,
    function: String,
}

impl Caller {
    fn from_entry(entry: &Map<String, Value>) -> Option<Self> {
        let file = entry.get(FILENAME_KEY)?.as_str()?.to_owned();
        let line = entry
            .get(LINE_NUMBER_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        // The engine does not capture function symbols; the target (module
        // path) stands in.
        let function = entry
            .get(TARGET_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Some(Self {
            file,
            line,
            function,
        })
    }
}

/// Decorator over a base sink.
///
/// On error-severity JSON entries the service context, source location and
/// report context are appended, each skipped independently if the caller
/// already set the key. A configured logger name is injected into every
/// entry. Non-JSON lines pass through untouched.
#[derive(Debug)]
pub struct ErrorReportWriter<W> {
    inner: W,
    service_context: Option<ServiceContext>,
    logger_name: Option<String>,
}

impl<W: Write> ErrorReportWriter<W> {
    /// Wrap a sink with error-report decoration for the given service.
    pub fn new(inner: W, service_context: ServiceContext) -> Self {
        Self {
            inner,
            service_context: Some(service_context),
            logger_name: None,
        }
    }

    pub(crate) fn from_parts(
        inner: W,
        service_context: Option<ServiceContext>,
        logger_name: Option<String>,
    ) -> Self {
        Self {
            inner,
            service_context,
            logger_name,
        }
    }

    fn decorate(&self, entry: &mut Map<String, Value>) {
        if let Some(name) = &self.logger_name
            && !entry.contains_key(LOGGER_KEY)
        {
            entry.insert(LOGGER_KEY.to_owned(), Value::String(name.clone()));
        }

        if entry.get(LEVEL_KEY).and_then(Value::as_str) != Some(ERROR_LEVEL) {
            return;
        }
        let Some(service_context) = &self.service_context else {
            return;
        };

        let caller = Caller::from_entry(entry);

        if !entry.contains_key(SERVICE_CONTEXT_KEY) {
            entry.insert(
                SERVICE_CONTEXT_KEY.to_owned(),
                json!({
                    "service": service_context.service,
                    "version": service_context.version,
                }),
            );
        }

        let Some(caller) = caller else {
            return;
        };

        if !entry.contains_key(SOURCE_LOCATION_KEY) {
            entry.insert(
                SOURCE_LOCATION_KEY.to_owned(),
                json!({
                    "file": caller.file,
                    "line": caller.line.to_string(),
                    "function": caller.function,
                }),
            );
        }

        if !entry.contains_key(CONTEXT_KEY) {
            entry.insert(
                CONTEXT_KEY.to_owned(),
                json!({
                    "reportLocation": {
                        "filePath": caller.file,
                        "lineNumber": caller.line,
                        "functionName": caller.function,
                    }
                }),
            );
        }
    }
}

impl<W: Write> Write for ErrorReportWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(text) = std::str::from_utf8(buf)
            && let Ok(Value::Object(mut entry)) = serde_json::from_str::<Value>(text)
        {
            self.decorate(&mut entry);
            if let Ok(mut line) = serde_json::to_string(&entry) {
                if text.ends_with('\n') {
                    line.push('\n');
                }
                self.inner.write_all(line.as_bytes())?;
                // The engine handed us `buf`; report its length so it never
                // sees a short write.
                return Ok(buf.len());
            }
        }

        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// [`MakeWriter`] adapter so the decoration composes with any writer the
/// engine supports (stdout, rolling files, test buffers).
#[derive(Debug)]
pub struct ErrorReportMakeWriter<M> {
    inner: M,
    service_context: Option<ServiceContext>,
    logger_name: Option<String>,
}

impl<M> ErrorReportMakeWriter<M> {
    /// Wrap a writer factory with no injection configured yet.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            service_context: None,
            logger_name: None,
        }
    }

    /// Enable error-report injection for the given service.
    #[must_use]
    pub fn with_service_context(mut self, service_context: ServiceContext) -> Self {
        self.service_context = Some(service_context);
        self
    }

    /// Inject the logger name into every entry.
    #[must_use]
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for ErrorReportMakeWriter<M> {
    type Writer = ErrorReportWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        ErrorReportWriter::from_parts(
            self.inner.make_writer(),
            self.service_context.clone(),
            self.logger_name.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ServiceContext {
        ServiceContext::new("api", "1.2.3")
    }

    fn decorate(line: &str) -> Value {
        let mut out = Vec::new();
        ErrorReportWriter::new(&mut out, service())
            .write_all(line.as_bytes())
            .unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_error_entry_gains_report_fields() {
        let entry = decorate(
            r#"{"timestamp":"2026-01-05T10:00:00Z","level":"ERROR","message":"boom","target":"api::handler","filename":"src/handler.rs","line_number":42}"#,
        );

        assert_eq!(entry[SERVICE_CONTEXT_KEY]["service"], "api");
        assert_eq!(entry[SERVICE_CONTEXT_KEY]["version"], "1.2.3");
        assert_eq!(entry[SOURCE_LOCATION_KEY]["file"], "src/handler.rs");
        assert_eq!(entry[SOURCE_LOCATION_KEY]["line"], "42");
        assert_eq!(entry[SOURCE_LOCATION_KEY]["function"], "api::handler");
        assert_eq!(
            entry[CONTEXT_KEY]["reportLocation"]["filePath"],
            "src/handler.rs"
        );
        assert_eq!(entry[CONTEXT_KEY]["reportLocation"]["lineNumber"], 42);
        assert_eq!(
            entry[CONTEXT_KEY]["reportLocation"]["functionName"],
            "api::handler"
        );
        // Original fields survive.
        assert_eq!(entry["message"], "boom");
        assert_eq!(entry["level"], "ERROR");
    }

    #[test]
    fn test_info_entry_left_alone() {
        let entry = decorate(
            r#"{"level":"INFO","message":"served","filename":"src/handler.rs","line_number":7}"#,
        );

        assert!(entry.get(SERVICE_CONTEXT_KEY).is_none());
        assert!(entry.get(SOURCE_LOCATION_KEY).is_none());
        assert!(entry.get(CONTEXT_KEY).is_none());
    }

    #[test]
    fn test_caller_set_fields_not_clobbered() {
        let entry = decorate(
            r#"{"level":"ERROR","message":"boom","serviceContext":{"service":"mine"},"filename":"src/a.rs","line_number":1}"#,
        );

        // The explicit value wins, but the other fields are still appended.
        assert_eq!(entry[SERVICE_CONTEXT_KEY]["service"], "mine");
        assert!(entry.get(SERVICE_CONTEXT_KEY).unwrap().get("version").is_none());
        assert!(entry.get(SOURCE_LOCATION_KEY).is_some());
        assert!(entry.get(CONTEXT_KEY).is_some());
    }

    #[test]
    fn test_missing_caller_skips_locations() {
        let entry = decorate(r#"{"level":"ERROR","message":"boom"}"#);

        assert!(entry.get(SERVICE_CONTEXT_KEY).is_some());
        assert!(entry.get(SOURCE_LOCATION_KEY).is_none());
        assert!(entry.get(CONTEXT_KEY).is_none());
    }

    #[test]
    fn test_non_json_passthrough() {
        let mut out = Vec::new();
        let written = ErrorReportWriter::new(&mut out, service())
            .write(b"plain console line\n")
            .unwrap();

        assert_eq!(written, b"plain console line\n".len());
        assert_eq!(out, b"plain console line\n");
    }

    #[test]
    fn test_newline_preserved() {
        let mut out = Vec::new();
        ErrorReportWriter::new(&mut out, service())
            .write_all(b"{\"level\":\"INFO\",\"message\":\"served\"}\n")
            .unwrap();

        assert!(out.ends_with(b"\n"));
    }

    #[test]
    fn test_logger_name_injected_everywhere() {
        let mut out = Vec::new();
        {
            let mut writer =
                ErrorReportWriter::from_parts(&mut out, None, Some("web_server".to_owned()));
            writer
                .write_all(b"{\"level\":\"INFO\",\"message\":\"served\"}\n")
                .unwrap();
            writer
                .write_all(b"{\"level\":\"DEBUG\",\"logger\":\"mine\",\"message\":\"kept\"}\n")
                .unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let first: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        let second: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(first[LOGGER_KEY], "web_server");
        assert_eq!(second[LOGGER_KEY], "mine");
    }

    #[test]
    fn test_no_service_context_means_no_error_injection() {
        let mut out = Vec::new();
        ErrorReportWriter::from_parts(&mut out, None, None)
            .write_all(b"{\"level\":\"ERROR\",\"message\":\"boom\"}\n")
            .unwrap();

        let entry: Value = serde_json::from_slice(&out).unwrap();
        assert!(entry.get(SERVICE_CONTEXT_KEY).is_none());
    }
}
