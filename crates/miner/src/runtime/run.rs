//! Run — read batches from stdin, mine them, write one JSON line per record.

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::conf::MinerConfig;
use crate::error::MinerError;
use crate::records;
use crate::state::SharedState;
use crate::store::{BatchResult, LineOutcome};

#[derive(Serialize)]
struct OutputLine<'a> {
    service: &'a str,
    #[serde(flatten)]
    line: &'a LineOutcome,
}

/// Render a batch result as newline-terminated JSON lines.
pub fn render(result: &BatchResult) -> Result<String, MinerError> {
    let mut out = String::new();
    for line in &result.lines {
        out.push_str(&serde_json::to_string(&OutputLine {
            service: &result.service,
            line,
        })?);
        out.push('\n');
    }
    Ok(out)
}

/// Drive the batch loop until stdin is exhausted.
pub async fn run(state: SharedState, config: MinerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = state.pipeline();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let batch = records::read_batch(
            &mut lines,
            config.input_format,
            config.batch_size,
            &state.metrics,
        )
        .await?;
        if batch.is_empty() {
            break;
        }

        for result in pipeline.run_batch(batch).await? {
            stdout.write_all(render(&result)?.as_bytes()).await?;
        }
        stdout.flush().await?;
    }

    for (id, name) in state.store.services() {
        info!("Service {}: {} patterns", name, state.store.patterns(&id).len());
    }
    let snapshot = state.metrics.snapshot();
    info!(
        "Done: {} lines, {} matched, {} discovered, {} unmatched, {} skipped",
        snapshot.lines_read,
        snapshot.matched,
        snapshot.discovered,
        snapshot.unmatched,
        snapshot.lines_skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MatchedPattern;
    use sequence::PatternId;

    #[test]
    fn test_render_one_line_per_record() {
        let result = BatchResult {
            service: "cron".into(),
            service_id: "abc".into(),
            lines: vec![
                LineOutcome {
                    message: "job 7 failed".into(),
                    matched: Some(MatchedPattern {
                        id: PatternId::of("job %integer% failed"),
                        pattern: "job %integer% failed".into(),
                        tag_offsets: vec![4],
                        complexity: 1.0 / 3.0,
                        discovered: true,
                    }),
                },
                LineOutcome {
                    message: "???".into(),
                    matched: None,
                },
            ],
        };

        let text = render(&result).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["service"], "cron");
        assert_eq!(lines[0]["matched"]["pattern"], "job %integer% failed");
        assert_eq!(lines[0]["matched"]["tag_offsets"][0], 4);
        assert_eq!(lines[1]["message"], "???");
        assert!(lines[1]["matched"].is_null());
    }
}
