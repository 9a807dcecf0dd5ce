//! Records — input framing for the runner.
//!
//! One record per line: `service message...` in text mode, or a JSON object
//! with `service` and `message` fields. Blank lines and `#` comments are
//! skipped, records without a message are dropped.

use serde::Deserialize;
use tokio::io::{AsyncBufRead, Lines};
use tracing::{trace, warn};

use crate::conf::InputFormat;
use crate::error::MinerError;
use crate::metrics::MinerMetrics;

/// Service name used when a JSON record carries none.
pub const DEFAULT_SERVICE: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub message: String,
}

impl LogRecord {
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Parse one input line. `Ok(None)` for lines that carry no record.
pub fn parse_line(line: &str, format: InputFormat) -> Result<Option<LogRecord>, MinerError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let record = match format {
        InputFormat::Text => {
            let Some((service, message)) = line.split_once(char::is_whitespace) else {
                return Ok(None);
            };
            LogRecord::new(service, message.trim())
        }
        InputFormat::Json => {
            let mut record: LogRecord =
                serde_json::from_str(line).map_err(|e| MinerError::Record(e.to_string()))?;
            if record.service.trim().is_empty() {
                record.service = DEFAULT_SERVICE.to_string();
            }
            record
        }
    };

    if record.message.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(record))
}

/// Read the next batch of at most `batch_size` records (0 = until end of
/// input). An empty batch means the input is exhausted.
pub async fn read_batch<R>(
    lines: &mut Lines<R>,
    format: InputFormat,
    batch_size: usize,
    metrics: &MinerMetrics,
) -> Result<Vec<LogRecord>, MinerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut batch = Vec::new();
    while batch_size == 0 || batch.len() < batch_size {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        metrics.record_line();
        match parse_line(&line, format) {
            Ok(Some(record)) => batch.push(record),
            Ok(None) => {
                trace!("skipped line without a record");
                metrics.record_skipped();
            }
            Err(e) => {
                warn!("Dropping malformed record: {}", e);
                metrics.record_skipped();
            }
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    // ── Text Lines ───────────────────────────────────────────────

    #[test]
    fn test_text_line_splits_service() {
        let rec = parse_line("sshd  Accepted password for bob", InputFormat::Text)
            .unwrap()
            .unwrap();
        assert_eq!(rec, LogRecord::new("sshd", "Accepted password for bob"));
    }

    #[test]
    fn test_text_line_without_message_dropped() {
        assert_eq!(parse_line("sshd", InputFormat::Text).unwrap(), None);
        assert_eq!(parse_line("sshd    ", InputFormat::Text).unwrap(), None);
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        assert_eq!(parse_line("   ", InputFormat::Text).unwrap(), None);
        assert_eq!(parse_line("# header", InputFormat::Json).unwrap(), None);
    }

    // ── JSON Lines ───────────────────────────────────────────────

    #[test]
    fn test_json_line() {
        let rec = parse_line(r#"{"service":"nginx","message":"GET / 200"}"#, InputFormat::Json)
            .unwrap()
            .unwrap();
        assert_eq!(rec, LogRecord::new("nginx", "GET / 200"));
    }

    #[test]
    fn test_json_missing_service_defaults() {
        let rec = parse_line(r#"{"message":"disk full"}"#, InputFormat::Json)
            .unwrap()
            .unwrap();
        assert_eq!(rec.service, DEFAULT_SERVICE);
    }

    #[test]
    fn test_json_empty_message_dropped() {
        assert_eq!(
            parse_line(r#"{"service":"a","message":"  "}"#, InputFormat::Json).unwrap(),
            None
        );
    }

    #[test]
    fn test_json_malformed_is_error() {
        let err = parse_line("{not json", InputFormat::Json).unwrap_err();
        assert!(matches!(err, MinerError::Record(_)));
    }

    // ── Batching ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_read_batch_respects_size() {
        let input: &[u8] = b"a one\n\nb two\n# c\nc three\n";
        let mut lines = BufReader::new(input).lines();
        let metrics = MinerMetrics::new();

        let first = read_batch(&mut lines, InputFormat::Text, 2, &metrics).await.unwrap();
        assert_eq!(first.len(), 2);
        let second = read_batch(&mut lines, InputFormat::Text, 2, &metrics).await.unwrap();
        assert_eq!(second, vec![LogRecord::new("c", "three")]);
        let done = read_batch(&mut lines, InputFormat::Text, 2, &metrics).await.unwrap();
        assert!(done.is_empty());

        let snap = metrics.snapshot();
        assert_eq!(snap.lines_read, 5);
        assert_eq!(snap.lines_skipped, 2);
    }

    #[tokio::test]
    async fn test_read_batch_unbounded() {
        let input: &[u8] = b"{\"message\":\"x\"}\nbroken\n{\"service\":\"s\",\"message\":\"y\"}\n";
        let mut lines = BufReader::new(input).lines();
        let metrics = MinerMetrics::new();
        let batch = read_batch(&mut lines, InputFormat::Json, 0, &metrics).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(metrics.snapshot().lines_skipped, 1);
    }
}
