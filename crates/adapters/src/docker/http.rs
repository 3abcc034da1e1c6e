// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal HTTP/1.1 client for the Docker Engine API over a Unix socket.
//!
//! One connection per request (`Connection: close`). Response bodies are
//! read with Content-Length framing, chunked transfer decoding (used by the
//! streaming image-pull endpoint), or read-to-EOF.

use super::DockerError;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Status and body of an Engine API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 2xx, or 304 (Engine's "already in that state" for start/stop).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) || self.status == 304
    }

    /// Convert non-success responses into [`DockerError::Status`].
    pub fn into_result(self) -> Result<String, DockerError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(DockerError::Status { status: self.status, body: self.body.trim().to_string() })
        }
    }
}

pub async fn request(
    socket_path: &Path,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<HttpResponse, DockerError> {
    let mut stream = UnixStream::connect(socket_path).await.map_err(|source| {
        DockerError::Connect { path: socket_path.to_path_buf(), source }
    })?;

    let request = match body {
        Some(body) => format!(
            "{} {} HTTP/1.1\r\nHost: docker\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            method,
            path,
            body.len(),
            body
        ),
        None => format!(
            "{} {} HTTP/1.1\r\nHost: docker\r\nConnection: close\r\nContent-Length: 0\r\n\r\n",
            method, path
        ),
    };
    stream.write_all(request.as_bytes()).await?;

    let mut reader = BufReader::new(&mut stream);
    read_http_response(&mut reader).await
}

/// Read and parse an HTTP/1.1 response from a buffered stream.
pub(crate) async fn read_http_response<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<HttpResponse, DockerError> {
    let mut status_line = String::new();
    reader.read_line(&mut status_line).await?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| DockerError::Protocol(format!("bad status line: {:?}", status_line.trim())))?;

    let mut content_length: Option<usize> = None;
    let mut chunked = false;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        let line_lower = line.to_ascii_lowercase();
        if let Some(val) = line_lower.strip_prefix("content-length:") {
            content_length = val.trim().parse().ok();
        } else if let Some(val) = line_lower.strip_prefix("transfer-encoding:") {
            chunked = val.contains("chunked");
        }
    }

    let bytes = if status == 204 || status == 304 {
        Vec::new()
    } else if chunked {
        read_chunked(reader).await?
    } else if let Some(len) = content_length {
        let mut buf = Vec::new();
        read_exactly(reader, len, &mut buf).await?;
        buf
    } else {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        buf
    };

    Ok(HttpResponse { status, body: String::from_utf8_lossy(&bytes).into_owned() })
}

async fn read_chunked<R: AsyncRead + Unpin>(reader: &mut BufReader<R>) -> Result<Vec<u8>, DockerError> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        if reader.read_line(&mut size_line).await? == 0 {
            return Err(DockerError::Protocol("connection closed mid-body".into()));
        }
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| DockerError::Protocol(format!("bad chunk size: {:?}", size_hex)))?;
        if size == 0 {
            // Trailer section ends with an empty line.
            loop {
                let mut trailer = String::new();
                if reader.read_line(&mut trailer).await? == 0 || trailer == "\r\n" {
                    return Ok(body);
                }
            }
        }
        read_exactly(reader, size, &mut body).await?;
        let mut crlf = String::new();
        reader.read_line(&mut crlf).await?;
    }
}

/// Append exactly `len` bytes to `buf`.
///
/// The buffer grows with what actually arrives, so a bogus length from the
/// peer cannot force a large allocation up front.
async fn read_exactly<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    len: usize,
    buf: &mut Vec<u8>,
) -> Result<(), DockerError> {
    let read = (&mut *reader).take(len as u64).read_to_end(buf).await?;
    if read < len {
        return Err(DockerError::Protocol(format!(
            "connection closed mid-body ({} of {} bytes)",
            read, len
        )));
    }
    Ok(())
}

/// Percent-encode a path segment or query value.
pub fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
