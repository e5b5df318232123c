//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module handles parsing of the SSE streams produced by OpenAI-compatible
//! `/chat/completions` endpoints, converting raw byte streams into parsed
//! [`ChatCompletionChunk`] values.  The stream ends at the `[DONE]` sentinel or
//! when the underlying byte stream is exhausted.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::{ChatCompletionChunk, Error, Result};

/// Sentinel payload that terminates a completion stream.
const DONE: &str = "[DONE]";

/// One decoded SSE frame.
#[derive(Debug)]
enum Frame {
    Chunk(Result<ChatCompletionChunk>),
    Done,
    Skip,
}

/// Process a stream of bytes into a stream of completion chunks.
///
/// This function takes a byte stream from an HTTP response and converts it into
/// a stream of parsed chunks, handling SSE framing, buffering across arbitrary
/// byte boundaries (including split UTF-8 sequences), and in-band errors.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    // Convert transport errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    })
    .fuse();

    let buffer = String::new();
    let pending: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, pending),
        move |(mut stream, mut buffer, mut pending)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some((frame, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    match frame {
                        Frame::Chunk(chunk) => return Some((chunk, (stream, buffer, pending))),
                        Frame::Done => return None,
                        Frame::Skip => continue,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        pending.extend_from_slice(&bytes);
                        match decode_utf8_prefix(&mut pending) {
                            Ok(text) => push_normalized(&mut buffer, &text),
                            Err(e) => return Some((Err(e), (stream, buffer, pending))),
                        }
                    }
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer, pending)));
                    }
                    None => {
                        // End of stream: flush a trailing event with no blank line after it.
                        if !buffer.trim().is_empty() {
                            buffer.push_str("\n\n");
                            continue;
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Removes and returns the longest valid UTF-8 prefix of `pending`.
///
/// An incomplete multi-byte sequence at the end is left in `pending` for the
/// next read; an invalid sequence is an error.
fn decode_utf8_prefix(pending: &mut Vec<u8>) -> Result<String> {
    match std::str::from_utf8(pending) {
        Ok(text) => {
            let text = text.to_string();
            pending.clear();
            Ok(text)
        }
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            let rest = pending.split_off(valid);
            String::from_utf8(std::mem::replace(pending, rest)).map_err(|e| {
                Error::encoding(format!("Invalid UTF-8 in stream: {e}"), Some(Box::new(e)))
            })
        }
        Err(e) => {
            pending.clear();
            Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            ))
        }
    }
}

fn push_normalized(buffer: &mut String, text: &str) {
    buffer.push_str(text);
    if buffer.contains("\r\n") {
        *buffer = buffer.replace("\r\n", "\n");
    }
}

/// Extract a complete SSE event from a buffer string.
///
/// Events are delimited by a blank line.  Every `data:` line contributes to the
/// payload; comments (`:`) and other fields are ignored.
fn extract_event(buffer: &str) -> Option<(Frame, String)> {
    let (event_text, rest) = buffer.split_once("\n\n")?;
    let rest = rest.to_string();

    let data = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect::<Vec<_>>();
    if data.is_empty() {
        return Some((Frame::Skip, rest));
    }
    let data = data.join("\n");
    if data.trim() == DONE {
        return Some((Frame::Done, rest));
    }
    Some((parse_chunk(&data), rest))
}

fn parse_chunk(data: &str) -> Frame {
    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(ChatCompletionChunk {
            error: Some(error), ..
        }) => Frame::Chunk(Err(Error::api(
            500,
            Some(
                error
                    .error_type
                    .unwrap_or_else(|| "stream_error".to_string()),
            ),
            error.message,
            None,
        ))),
        Ok(chunk) => Frame::Chunk(Ok(chunk)),
        Err(e) => Frame::Chunk(Err(Error::serialization(
            format!("Failed to parse event JSON: {e}"),
            Some(Box::new(e)),
        ))),
    }
}
