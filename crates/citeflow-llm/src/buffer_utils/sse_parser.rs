use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use std::fmt::Display;

use super::buffering::CircularLineBuffer;
use crate::traits::FragmentStream;

/// Strategy pattern for parsing provider-specific SSE payloads into text fragments
pub trait SseLineParser: Send {
    /// Parse the payload of one `data:` line into zero or more fragments
    fn parse_data_line(&self, data: &str) -> Result<Vec<String>>;

    /// Check if this payload signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

/// Parse an HTTP SSE response body with the given strategy
pub fn parse_sse_stream<P: SseLineParser + 'static>(response: Response, parser: P) -> FragmentStream {
    parse_sse_bytes(response.bytes_stream(), parser)
}

/// Generic SSE parser over any byte-chunk stream.
///
/// Lines other than `data:` (comments, `event:`, `id:`) are skipped. The stream
/// ends at the done marker or when the body ends; a transport error or an
/// unparsable payload is yielded as an `Err` item.
pub fn parse_sse_bytes<S, B, E, P>(byte_stream: S, parser: P) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(byte_stream);
        let mut buffer = CircularLineBuffer::with_capacity(4096);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        let line = match line_result {
                            Ok(line) => line,
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        };

                        let Some(data) = data_payload(&line) else {
                            continue;
                        };

                        if parser.is_done_marker(data) {
                            return;
                        }

                        match parser.parse_data_line(data) {
                            Ok(fragments) => {
                                for fragment in fragments {
                                    yield Ok(fragment);
                                }
                            }
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    return;
                }
            }
        }

        // Body ended without a trailing newline
        if let Some(line_result) = buffer.take_remaining() {
            match line_result {
                Ok(line) => {
                    if let Some(data) = data_payload(&line) {
                        if !parser.is_done_marker(data) {
                            match parser.parse_data_line(data) {
                                Ok(fragments) => {
                                    for fragment in fragments {
                                        yield Ok(fragment);
                                    }
                                }
                                Err(e) => yield Err(e),
                            }
                        }
                    }
                }
                Err(e) => yield Err(e),
            }
        }
    })
}

fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start).filter(|d| !d.is_empty())
}
