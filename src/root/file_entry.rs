use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::http::date::http_date;
use crate::http::writer::ResponseWriter;

/// A file loaded from the document root.
///
/// `buffer` is shared by every response serving this file.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub buffer: Bytes,
    pub mime: &'static str,
    pub modified: Option<SystemTime>,
}

impl FileEntry {
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Entity tag derived from size and modification time.
    pub fn etag(&self) -> Option<String> {
        let secs = self
            .modified?
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_secs();

        Some(format!("\"{:x}-{:x}\"", self.size(), secs))
    }

    /// Entity headers for this file, in the order they are sent.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Content-Type: {}", self.mime),
            format!("Content-Length: {}", self.size()),
        ];

        if let Some(modified) = self.modified {
            lines.push(format!("Last-Modified: {}", http_date(modified)));
        }
        if let Some(etag) = self.etag() {
            lines.push(format!("ETag: {}", etag));
        }

        lines
    }

    /// A `200 OK` writer serving this file.
    pub fn responder<T, W>(&self) -> ResponseWriter<T, W> {
        ResponseWriter::new(self.buffer.clone(), self.header_lines())
    }
}
