//! Line-delimited event stream decoding
//!
//! The service writes one `data: <payload>` record per line. Transport chunks
//! carry no alignment guarantee, so the decoder keeps the unterminated tail
//! of each chunk and resumes it when the next chunk arrives.

use tracing::{debug, info};

/// Prefix of every record the decoder forwards
pub const DATA_PREFIX: &str = "data: ";

/// Payload the service sends after the last event
pub const STREAM_FINISHED: &str = "Stream finished.";

/// Incremental frame decoder. Single use per connection.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes after the last newline seen so far
    pending: Vec<u8>,
    /// Total bytes received
    bytes_received: usize,
    /// Frames handed out
    frames_decoded: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and iterate over the frames it completes.
    ///
    /// The returned iterator is lazy: lines are split off the buffer as it is
    /// advanced. Any part of the chunk left unconsumed (if the iterator is
    /// dropped early) stays buffered and is yielded by the next call.
    pub fn push<'a>(&'a mut self, chunk: &[u8]) -> impl Iterator<Item = String> + 'a {
        self.bytes_received += chunk.len();
        self.pending.extend_from_slice(chunk);
        debug!(
            "Frame chunk received: {} bytes (total: {} bytes)",
            chunk.len(),
            self.bytes_received
        );
        std::iter::from_fn(move || self.next_frame())
    }

    /// Split complete lines off the buffer until one yields a frame
    fn next_frame(&mut self) -> Option<String> {
        loop {
            let newline = self.pending.iter().position(|b| *b == b'\n')?;
            let line_bytes: Vec<u8> = self.pending.drain(..=newline).collect();
            // Newlines never occur inside a multi-byte sequence, so decoding
            // whole lines is independent of where chunks were cut.
            let line = String::from_utf8_lossy(&line_bytes[..newline]);
            let line = line.strip_suffix('\r').unwrap_or(&line);

            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            if payload == STREAM_FINISHED {
                debug!("Stream finished marker after {} frames", self.frames_decoded);
                continue;
            }
            self.frames_decoded += 1;
            return Some(payload.to_string());
        }
    }

    /// End of input. An unterminated tail is never a frame and is dropped.
    pub fn finish(self) {
        if !self.pending.is_empty() {
            debug!(
                "Discarding {} unterminated bytes at end of stream",
                self.pending.len()
            );
        }
        info!(
            "Frame decoder finished: {} frames, {} bytes",
            self.frames_decoded, self.bytes_received
        );
    }

    pub fn frames_decoded(&self) -> usize {
        self.frames_decoded
    }
}
