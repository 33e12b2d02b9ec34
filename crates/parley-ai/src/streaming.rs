//! Server-Sent Events (SSE) streaming parser.
//!
//! Chat-completion APIs stream responses as SSE. This module turns any
//! byte source into a lazy stream of parsed events, so the consumer
//! controls pacing and can drop the stream to abort the request.

use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio_util::io::StreamReader;

use crate::AiError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type, when the server sends an `event:` field.
    pub event: Option<String>,
    /// The event data, with multi-line `data:` fields joined by `\n`.
    pub data: String,
}

/// Parse the body of a reqwest response as an SSE stream.
pub fn sse_events(response: reqwest::Response) -> BoxStream<'static, Result<SseEvent, AiError>> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    sse_events_from_reader(StreamReader::new(byte_stream))
}

/// Parse SSE events from any async reader.
pub fn sse_events_from_reader<R>(reader: R) -> BoxStream<'static, Result<SseEvent, AiError>>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let lines = BufReader::new(reader).lines();
    stream::try_unfold(Some(lines), |state| async move {
        let Some(mut lines) = state else {
            return Ok(None);
        };
        next_event(&mut lines)
            .await
            .map(|next| next.map(|(event, more)| (event, more.then_some(lines))))
    })
    .boxed()
}

/// Read lines until one event is complete. The flag is false once the
/// source is exhausted.
async fn next_event<R>(lines: &mut Lines<BufReader<R>>) -> Result<Option<(SseEvent, bool)>, AiError>
where
    R: AsyncRead + Unpin,
{
    let mut current_event: Option<String> = None;
    let mut current_data = String::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| AiError::NetworkError(e.to_string()))?
    {
        if line.is_empty() {
            // Empty line = end of event
            if !current_data.is_empty() {
                let event = SseEvent {
                    event: current_event.take(),
                    data: current_data,
                };
                return Ok(Some((event, true)));
            }
            current_event = None;
            continue;
        }

        if let Some(event_type) = field_value(&line, "event") {
            current_event = Some(event_type.to_string());
        } else if let Some(data) = field_value(&line, "data") {
            if !current_data.is_empty() {
                current_data.push('\n');
            }
            current_data.push_str(data);
        }
        // Ignore other fields (id:, retry:, comments)
    }

    // Flush any remaining event
    if current_data.is_empty() {
        Ok(None)
    } else {
        let event = SseEvent {
            event: current_event,
            data: current_data,
        };
        Ok(Some((event, false)))
    }
}

/// `name: value` or `name:value`; a single leading space is dropped.
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}
