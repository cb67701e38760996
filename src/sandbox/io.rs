//! In-memory capture of the sandbox's stdout/stderr stream.

use std::sync::{Arc, Mutex};

/// A shared, byte-capped buffer that stands in for the standard output
/// stream during one execution.
///
/// Clones share the same underlying buffer, so the executor can read the
/// output-so-far from the async side while the interpreter thread is still
/// writing (the timeout path reports partial output).
#[derive(Clone, Debug)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
    max_bytes: usize,
}

impl CapturedOutput {
    /// Create a new capture buffer with the given byte cap.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            max_bytes,
        }
    }

    /// Append bytes, silently discarding anything beyond the cap.
    pub fn push_bytes(&self, data: &[u8]) {
        let mut buffer = self.buffer.lock().unwrap();
        let remaining = self.max_bytes.saturating_sub(buffer.len());
        let take = remaining.min(data.len());
        buffer.extend_from_slice(&data[..take]);
    }

    /// Get the captured output as a string.
    pub fn to_string_lossy(&self) -> String {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer).to_string()
    }

    /// Get the length of captured data.
    pub fn len(&self) -> usize {
        let buffer = self.buffer.lock().unwrap();
        buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
