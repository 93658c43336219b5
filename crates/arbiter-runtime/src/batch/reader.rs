//! Line-delimited input reader.

use arbiter_core::EvaluationRequest;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{CancelToken, InputRecord};

/// Read every line of a line-delimited JSON stream into ordered
/// [`InputRecord`]s.
///
/// Blank lines are skipped silently (not counted, not erroring) but still
/// advance the line number, so diagnostics point at the real line. A line
/// that fails to parse becomes a [`InputRecord::Malformed`] carrying its
/// line number instead of aborting the read. Cancellation stops the scan
/// at the next line boundary; records read so far are returned.
///
/// Only a broken underlying stream is an error — malformed content never
/// is.
pub async fn read_records<R>(
    input: R,
    cancel: &CancelToken,
) -> std::io::Result<Vec<InputRecord>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut records = Vec::new();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;

        if cancel.is_cancelled() {
            tracing::warn!(line = line_number, "input scan cancelled");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<EvaluationRequest>(trimmed) {
            Ok(request) => records.push(InputRecord::Parsed {
                line_number,
                request,
            }),
            Err(err) => records.push(InputRecord::Malformed {
                line_number,
                error: format!("parse error: {err}"),
            }),
        }
    }

    Ok(records)
}
